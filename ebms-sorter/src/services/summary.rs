//! Summary index writer
//!
//! Writes `checklistIndex_<timestamp>.csv` next to the sorted tree (the
//! output root, not inside it) listing every checklist that received local
//! media this run, with a direct link to its Macaulay Library media page.

use crate::services::checklist_index::ChecklistIndex;
use chrono::Utc;
use ebms_common::time::INDEX_DATETIME_FORMAT;
use ebms_common::Result;
use std::path::{Path, PathBuf};

const CHECKLIST_LINK_BASE: &str = "https://ebird.org/checklist";

/// Write the summary CSV into `output_dir`. Returns `None` when no
/// checklist received local media.
pub fn write_summary(index: &ChecklistIndex, output_dir: &Path) -> Result<Option<PathBuf>> {
    let rows: Vec<_> = index.all_stats().filter(|(_, s)| s.local > 0).collect();
    if rows.is_empty() {
        return Ok(None);
    }

    let stamp = Utc::now().timestamp_millis();
    let path = output_dir.join(format!("checklistIndex_{stamp}.csv"));

    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record([
        "Checklist Link",
        "Date",
        "Region",
        "Subregion",
        "Num Uploaded Assets",
        "Num Local Assets",
    ])?;

    for (sub_id, stats) in rows {
        writer.write_record([
            format!("{CHECKLIST_LINK_BASE}/{sub_id}/media"),
            stats.begin.format(INDEX_DATETIME_FORMAT).to_string(),
            stats.region.clone(),
            stats.subregion.clone().unwrap_or_default(),
            stats.uploaded.to_string(),
            stats.local.to_string(),
        ])?;
    }
    writer.flush()?;

    tracing::info!(path = %path.display(), "Summary index written");
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "Submission ID,Common Name,Scientific Name,Taxonomic Order,Count,State/Province,County,Location ID,Location,Latitude,Longitude,Date,Time,Protocol,Duration (Min),All Obs Reported,Distance Traveled (km),Area Covered (ha),Number of Observers,Breeding Code,Observation Details,Checklist Comments,ML Catalog Numbers";

    fn index_from(rows: &[&str]) -> ChecklistIndex {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "{HEADER}").unwrap();
        for row in rows {
            writeln!(f, "{row}").unwrap();
        }
        ChecklistIndex::from_csv(&path).unwrap()
    }

    #[test]
    fn no_local_media_means_no_summary() {
        let index = index_from(&[
            "S111,Wood Thrush,Hylocichla mustelina,1,2,Ohio,Franklin,L1,Spot A,40.0,-83.1,2023-05-01,07:00 AM,Traveling,60,1,,,1,,,,",
        ]);
        let dir = tempfile::tempdir().unwrap();
        assert!(write_summary(&index, dir.path()).unwrap().is_none());
    }

    #[test]
    fn summary_lists_checklists_with_local_media() {
        let mut index = index_from(&[
            "S111,Wood Thrush,Hylocichla mustelina,1,2,Ohio,Franklin,L1,Spot A,40.0,-83.1,2023-05-01,07:00 AM,Traveling,60,1,,,1,,,,ML100 ML101",
            "S222,Veery,Catharus fuscescens,1,1,Ohio,,L2,Spot B,40.0,-83.2,2023-05-02,08:00 AM,Stationary,30,1,,,1,,,,",
        ]);
        index.mark_local("S111");
        index.mark_local("S111");

        let dir = tempfile::tempdir().unwrap();
        let path = write_summary(&index, dir.path()).unwrap().unwrap();
        let text = std::fs::read_to_string(&path).unwrap();

        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("checklistIndex_"));
        assert!(text.contains("https://ebird.org/checklist/S111/media"));
        assert!(text.contains("2023-05-01 07:00"));
        assert!(text.contains("Ohio,Franklin,2,2")); // uploaded and local counts
        assert!(!text.contains("S222")); // nothing placed locally
    }
}
