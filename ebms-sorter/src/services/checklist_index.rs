//! Checklist window index
//!
//! Parses the "My eBird Data" CSV export into closed time intervals, one
//! per checklist row, and answers point-in-window lookups from file capture
//! times. Rows are parsed in parallel but inserted in file order, so the
//! later row wins when two checklists overlap.

use chrono::{Duration, NaiveDateTime};
use ebms_common::time::CHECKLIST_DATETIME_FORMAT;
use ebms_common::{Error, Result};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::path::Path;

// Column positions in the eBird CSV export
const COL_SUB_ID: usize = 0;
const COL_REGION: usize = 5;
const COL_SUBREGION: usize = 6;
const COL_LOCATION: usize = 8;
const COL_DATE: usize = 11;
const COL_TIME: usize = 12;
const COL_DURATION_MIN: usize = 14;
const COL_ML_CATALOG: usize = 22;

/// One checklist's time window.
#[derive(Debug, Clone)]
struct Interval {
    begin: NaiveDateTime,
    end: NaiveDateTime,
    sub_id: String,
}

/// Per-checklist rollup used for the summary index.
#[derive(Debug, Clone)]
pub struct SubStats {
    pub begin: NaiveDateTime,
    /// State or province (subnational1)
    pub region: String,
    /// County, where the export has one
    pub subregion: Option<String>,
    pub loc_name: String,
    /// Media already uploaded to the Macaulay Library
    pub uploaded: u32,
    /// Local files placed into this checklist's folder this run
    pub local: u32,
}

/// Index of checklist windows and per-checklist stats.
#[derive(Debug, Default)]
pub struct ChecklistIndex {
    intervals: Vec<Interval>,
    stats: BTreeMap<String, SubStats>,
}

impl ChecklistIndex {
    /// Parse a checklist export CSV into an index.
    ///
    /// Rows without a date or start time cannot form a window and are
    /// skipped with a warning. Malformed values in present fields abort
    /// the run, since silently mis-windowing a checklist would misfile
    /// every photo taken during it.
    pub fn from_csv(path: &Path) -> Result<ChecklistIndex> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)?;

        let records: Vec<csv::StringRecord> =
            reader.records().collect::<std::result::Result<_, _>>()?;

        // Parse rows in parallel; collect preserves row order so overlap
        // resolution stays last-row-wins.
        let parsed: Vec<Option<(Interval, SubStats)>> = records
            .par_iter()
            .map(|record| parse_row(record))
            .collect::<Result<_>>()?;

        let mut index = ChecklistIndex::default();
        for (interval, stats) in parsed.into_iter().flatten() {
            // Repeat rows for the same checklist (one per species) share a
            // window; keep one interval and one stats entry.
            if !index.stats.contains_key(&interval.sub_id) {
                index.intervals.push(interval.clone());
            }
            index
                .stats
                .entry(interval.sub_id)
                .and_modify(|s| s.uploaded += stats.uploaded)
                .or_insert(stats);
        }

        tracing::info!(
            checklists = index.intervals.len(),
            path = %path.display(),
            "Checklist index built"
        );
        Ok(index)
    }

    /// Find the checklist whose window contains `dt`. Both window ends are
    /// inclusive; when windows overlap, the checklist latest in the file
    /// wins.
    pub fn lookup(&self, dt: NaiveDateTime) -> Option<&str> {
        self.intervals
            .iter()
            .rev()
            .find(|iv| iv.begin <= dt && dt <= iv.end)
            .map(|iv| iv.sub_id.as_str())
    }

    pub fn stats(&self, sub_id: &str) -> Option<&SubStats> {
        self.stats.get(sub_id)
    }

    /// Count a locally placed file against a checklist.
    pub fn mark_local(&mut self, sub_id: &str) {
        if let Some(stats) = self.stats.get_mut(sub_id) {
            stats.local += 1;
        }
    }

    /// Checklists in submission-id order, for the summary writer.
    pub fn all_stats(&self) -> impl Iterator<Item = (&str, &SubStats)> {
        self.stats.iter().map(|(id, s)| (id.as_str(), s))
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

fn parse_row(record: &csv::StringRecord) -> Result<Option<(Interval, SubStats)>> {
    let field = |i: usize| record.get(i).unwrap_or("").trim();

    let sub_id = field(COL_SUB_ID);
    if sub_id.is_empty() {
        return Ok(None);
    }

    let date = field(COL_DATE);
    let time = field(COL_TIME);
    if date.is_empty() || time.is_empty() {
        tracing::warn!(sub_id, "Checklist row without start time, skipping");
        return Ok(None);
    }

    let begin = NaiveDateTime::parse_from_str(
        &format!("{date} {time}"),
        CHECKLIST_DATETIME_FORMAT,
    )
    .map_err(|e| Error::Checklist(format!("{sub_id}: bad start time {date} {time}: {e}")))?;

    let duration = field(COL_DURATION_MIN);
    let minutes: i64 = if duration.is_empty() {
        0
    } else {
        duration
            .parse()
            .map_err(|e| Error::Checklist(format!("{sub_id}: bad duration {duration}: {e}")))?
    };
    if minutes <= 0 {
        // Incidental lists have no duration, so no window to match against
        tracing::warn!(sub_id, "Checklist row without duration, skipping");
        return Ok(None);
    }

    let uploaded = field(COL_ML_CATALOG).split_whitespace().count() as u32;

    let interval = Interval {
        begin,
        end: begin + Duration::minutes(minutes),
        sub_id: sub_id.to_string(),
    };
    let stats = SubStats {
        begin,
        region: field(COL_REGION).to_string(),
        subregion: Some(field(COL_SUBREGION))
            .filter(|s| !s.is_empty())
            .map(String::from),
        loc_name: field(COL_LOCATION).to_string(),
        uploaded,
        local: 0,
    };
    Ok(Some((interval, stats)))
}
