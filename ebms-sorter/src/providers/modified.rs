//! Filesystem modification time provider
//!
//! Last resort in the chain. Files that stat with an epoch-zero mtime
//! (some copy tools zero it) get a 1900-01-01 placeholder instead, so the
//! date folder makes the bogus timestamp obvious.

use super::CreationDateProvider;
use chrono::{DateTime, Local, NaiveDateTime};
use ebms_common::time::epoch_default;
use std::path::Path;
use std::time::UNIX_EPOCH;

pub struct ModifiedProvider;

impl CreationDateProvider for ModifiedProvider {
    fn name(&self) -> &'static str {
        "modified"
    }

    fn creation_date(&self, path: &Path) -> Option<NaiveDateTime> {
        let mtime = match std::fs::metadata(path).and_then(|m| m.modified()) {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Cannot stat file");
                return None;
            }
        };

        match mtime.duration_since(UNIX_EPOCH) {
            Ok(d) if d.as_secs() == 0 => Some(epoch_default()),
            Ok(_) => Some(DateTime::<Local>::from(mtime).naive_local()),
            // Pre-epoch mtimes are as bogus as epoch-zero ones
            Err(_) => Some(epoch_default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn fresh_file_gets_current_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        fs::write(&path, b"data").unwrap();

        let dt = ModifiedProvider.creation_date(&path).unwrap();
        assert!(dt.and_utc().timestamp() > 0);
    }

    #[test]
    fn epoch_zero_mtime_maps_to_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("old.jpg");
        fs::write(&path, b"data").unwrap();
        let f = fs::File::options().write(true).open(&path).unwrap();
        f.set_modified(UNIX_EPOCH).unwrap();
        drop(f);

        let dt = ModifiedProvider.creation_date(&path).unwrap();
        assert_eq!(dt, epoch_default());
    }

    #[test]
    fn missing_file_yields_none() {
        assert!(ModifiedProvider.creation_date(Path::new("/no/such/file")).is_none());
    }
}
