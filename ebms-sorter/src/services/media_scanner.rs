//! Media file discovery
//!
//! Recursive walk of the source directory collecting files with recognized
//! media extensions. Previous output trees (directories named `ebird` or
//! `ebird_<millis>`) are skipped so a re-run does not re-sort its own
//! results.

use ebms_common::MediaKind;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

pub struct MediaScanner {
    ignore_patterns: Vec<String>,
}

impl MediaScanner {
    pub fn new() -> Self {
        Self {
            ignore_patterns: vec![
                ".DS_Store".to_string(),
                "Thumbs.db".to_string(),
                ".git".to_string(),
            ],
        }
    }

    /// Collect media files under `root`, sorted by path for a stable
    /// placement order.
    pub fn scan(&self, root: &Path) -> Vec<PathBuf> {
        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| self.should_process_entry(e));

        let mut files = Vec::new();
        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file()
                        && MediaKind::from_path(entry.path()).is_some()
                    {
                        files.push(entry.path().to_path_buf());
                        if files.len() % 100 == 0 {
                            tracing::info!(queued = files.len(), "Media files queued");
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                }
            }
        }

        // Stable placement order: by file name, then full path for ties
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()).then_with(|| a.cmp(b)));
        tracing::debug!(count = files.len(), root = %root.display(), "Media scan complete");
        files
    }

    fn should_process_entry(&self, entry: &DirEntry) -> bool {
        let file_name = entry.file_name().to_string_lossy();

        if entry.file_type().is_dir() && is_output_dir(&file_name) {
            return false;
        }

        for pattern in &self.ignore_patterns {
            if file_name.contains(pattern.as_str()) {
                return false;
            }
        }

        true
    }
}

impl Default for MediaScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Matches the final output directory and in-progress temp directories.
fn is_output_dir(name: &str) -> bool {
    name == "ebird" || name.starts_with("ebird_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn finds_media_and_skips_other_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("trip1")).unwrap();
        fs::write(dir.path().join("trip1/IMG_0001.jpg"), b"x").unwrap();
        fs::write(dir.path().join("trip1/song.wav"), b"x").unwrap();
        fs::write(dir.path().join("trip1/notes.txt"), b"x").unwrap();
        fs::write(dir.path().join("clip.MOV"), b"x").unwrap();

        let files = MediaScanner::new().scan(dir.path());
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        // Sorted by file name regardless of containing directory
        assert_eq!(names, vec!["IMG_0001.jpg", "clip.MOV", "song.wav"]);
    }

    #[test]
    fn skips_previous_output_trees() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("ebird")).unwrap();
        fs::write(dir.path().join("ebird/sorted.jpg"), b"x").unwrap();
        fs::create_dir(dir.path().join("ebird_1714569600000")).unwrap();
        fs::write(dir.path().join("ebird_1714569600000/partial.jpg"), b"x").unwrap();
        fs::write(dir.path().join("fresh.jpg"), b"x").unwrap();

        let files = MediaScanner::new().scan(dir.path());
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("fresh.jpg"));
    }

    #[test]
    fn output_dir_name_matching() {
        assert!(is_output_dir("ebird"));
        assert!(is_output_dir("ebird_1714569600000"));
        assert!(!is_output_dir("ebird-notes"));
        assert!(!is_output_dir("my_ebird"));
    }
}
