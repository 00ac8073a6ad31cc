//! Destination path planning
//!
//! Maps a resolved capture time and optional checklist match to the folder
//! a file belongs in. Location names are sanitized for cross-platform
//! paths and truncated to 40 characters.

use crate::config::FolderGroup;
use crate::services::checklist_index::SubStats;
use chrono::NaiveDateTime;
use ebms_common::time::FOLDER_DATE_FORMAT;
use std::path::PathBuf;

const LOCATION_MAX_CHARS: usize = 40;

pub struct PathPlanner {
    folder_group: FolderGroup,
    sep_year: bool,
}

impl PathPlanner {
    pub fn new(folder_group: FolderGroup, sep_year: bool) -> Self {
        Self {
            folder_group,
            sep_year,
        }
    }

    /// Destination directory, relative to the output root, for a file
    /// captured at `dt`. `matched` carries the checklist data when the
    /// capture time fell inside a checklist window.
    pub fn dest_dir(&self, dt: NaiveDateTime, matched: Option<(&str, &SubStats)>) -> PathBuf {
        let mut dir = PathBuf::new();
        if self.sep_year {
            dir.push(dt.format("%Y").to_string());
        }
        let date = dt.format(FOLDER_DATE_FORMAT).to_string();

        let Some((sub_id, stats)) = matched else {
            // Unmatched files get a plain date folder
            dir.push(date);
            return dir;
        };

        let loc = sanitize_location(&stats.loc_name);
        match self.folder_group {
            FolderGroup::Date => {
                dir.push(date);
                let mut leaf = sanitize_location(&stats.region);
                if let Some(sub) = &stats.subregion {
                    leaf.push('_');
                    leaf.push_str(&sanitize_location(sub));
                }
                leaf.push('_');
                leaf.push_str(&loc);
                leaf.push('_');
                leaf.push_str(sub_id);
                dir.push(leaf);
            }
            FolderGroup::Location => {
                dir.push(sanitize_location(&stats.region));
                if let Some(sub) = &stats.subregion {
                    dir.push(sanitize_location(sub));
                }
                dir.push(loc);
                dir.push(format!("{date}_{sub_id}"));
            }
        }
        dir
    }
}

/// Clamp to 40 characters, then replace path-hostile characters. `:`
/// becomes a double dash so time-of-day in location names stays readable;
/// the clamp applies to the raw name, so the result may run one character
/// over per colon kept.
pub fn sanitize_location(name: &str) -> String {
    let mut out = String::with_capacity(LOCATION_MAX_CHARS + 2);
    for c in name.chars().take(LOCATION_MAX_CHARS) {
        match c {
            ':' => out.push_str("--"),
            ' ' | ',' | '.' | '/' | '\\' | '>' | '<' => out.push('-'),
            _ => out.push(c),
        }
    }
    out
}
