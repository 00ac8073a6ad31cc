//! Creation date providers
//!
//! A file's capture time is resolved by asking providers in a fixed order:
//! embedded metadata, then recorder filename patterns, then the filesystem
//! modification time. The final provider always answers, so every file gets
//! a date.

mod filename;
mod metadata;
mod modified;

pub use filename::FilenameProvider;
pub use metadata::MetadataProvider;
pub use modified::ModifiedProvider;

use chrono::NaiveDateTime;
use std::path::Path;

/// A single source of capture timestamps. Providers answer `None` when the
/// file carries nothing they understand; read failures are logged and
/// treated the same way.
pub trait CreationDateProvider {
    /// Short name for log lines
    fn name(&self) -> &'static str;

    fn creation_date(&self, path: &Path) -> Option<NaiveDateTime>;
}

/// Resolve a capture time by consulting the standard provider chain.
///
/// `hrs_offset` shifts embedded metadata timestamps only; filename and
/// modification-time sources are already in local clock terms.
pub fn resolve_creation_date(path: &Path, hrs_offset: i64) -> NaiveDateTime {
    let metadata = MetadataProvider::new(hrs_offset);
    let providers: [&dyn CreationDateProvider; 3] =
        [&metadata, &FilenameProvider, &ModifiedProvider];

    for provider in providers {
        if let Some(dt) = provider.creation_date(path) {
            tracing::debug!(
                path = %path.display(),
                provider = provider.name(),
                date = %dt,
                "Resolved creation date"
            );
            return dt;
        }
    }

    // ModifiedProvider answers for any stat-able file; a file that cannot
    // even be stat-ed gets the epoch fallback.
    ebms_common::time::epoch_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn plain_file_falls_through_to_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("IMG_0001.jpg");
        fs::write(&path, b"not a real jpeg").unwrap();

        let resolved = resolve_creation_date(&path, 0);
        let mtime = ModifiedProvider.creation_date(&path).unwrap();
        assert_eq!(resolved, mtime);
    }

    #[test]
    fn filename_beats_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("20230501_0745.wav");
        fs::write(&path, b"RIFFxxxx").unwrap();

        let resolved = resolve_creation_date(&path, 0);
        assert_eq!(resolved.format("%Y-%m-%d %H:%M").to_string(), "2023-05-01 07:45");
    }

    #[test]
    fn missing_file_gets_epoch_default() {
        let resolved = resolve_creation_date(Path::new("/nonexistent/file.jpg"), 0);
        assert_eq!(resolved, ebms_common::time::epoch_default());
    }
}
