//! Filename pattern provider
//!
//! Recognizes the timestamped names written by common field recording apps:
//!
//! - Merlin: `2023-05-01 0745...` or `2023-05-01 07_45...`
//! - RecForge: `20230501_0745...` or `20230501-0745...`
//!
//! The leading 14 characters decide candidacy: they must start with a `1`
//! or `2` digit and contain a `-` or `_` separator.

use super::CreationDateProvider;
use chrono::NaiveDateTime;
use ebms_common::media;
use ebms_common::time::parse_time;
use std::path::Path;

pub struct FilenameProvider;

impl FilenameProvider {
    fn parse_stem(stem: &str) -> Option<NaiveDateTime> {
        // Candidacy looks at up to 14 characters; bare RecForge stems are
        // only 13, so short names must still qualify
        let prefix: String = stem.chars().take(14).collect();
        if !prefix.starts_with(['1', '2']) {
            return None;
        }
        if !prefix.contains('-') && !prefix.contains('_') {
            return None;
        }

        if prefix.matches('-').count() >= 2 {
            // Merlin: date uses two dashes
            if prefix.contains('_') {
                parse_time(stem.get(0..16)?, "%Y-%m-%d %H_%M")
            } else {
                parse_time(stem.get(0..15)?, "%Y-%m-%d %H%M")
            }
        } else if prefix.contains('_') {
            parse_time(stem.get(0..13)?, "%Y%m%d_%H%M")
        } else {
            parse_time(stem.get(0..13)?, "%Y%m%d-%H%M")
        }
    }
}

impl CreationDateProvider for FilenameProvider {
    fn name(&self) -> &'static str {
        "filename"
    }

    fn creation_date(&self, path: &Path) -> Option<NaiveDateTime> {
        let stem = media::file_stem(path)?;
        Self::parse_stem(&stem)
    }
}
