//! Collision-aware file placement
//!
//! Moves (or symlinks) a source file into its destination directory. A
//! same-named destination file of equal size is treated as an earlier run's
//! copy of the same file; one of different size is a genuine conflict and
//! the source is left untouched.

use ebms_common::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// What happened to one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceOutcome {
    /// Source moved (or linked) to the returned destination path
    Placed(PathBuf),
    /// Destination already held an equal-size copy; the source was removed
    DuplicateRemoved(PathBuf),
    /// Destination held a different-size file; source left in place
    Conflict,
}

pub struct FileMigrator {
    use_symlinks: bool,
}

impl FileMigrator {
    pub fn new(use_symlinks: bool) -> Self {
        Self { use_symlinks }
    }

    /// Place `source` into `dest_dir`, creating the directory as needed.
    pub fn place(&self, source: &Path, dest_dir: &Path) -> Result<PlaceOutcome> {
        let file_name = source
            .file_name()
            .ok_or_else(|| ebms_common::Error::InvalidInput(format!(
                "source has no file name: {}",
                source.display()
            )))?;
        let target = dest_dir.join(file_name);

        if target.exists() {
            let src_len = fs::metadata(source)?.len();
            let dst_len = fs::metadata(&target)?.len();
            if src_len == dst_len {
                tracing::info!(
                    source = %source.display(),
                    target = %target.display(),
                    "Duplicate at destination, removing source"
                );
                fs::remove_file(source)?;
                return Ok(PlaceOutcome::DuplicateRemoved(target));
            }
            tracing::warn!(
                source = %source.display(),
                target = %target.display(),
                src_len,
                dst_len,
                "Name collision with different size, leaving source in place"
            );
            return Ok(PlaceOutcome::Conflict);
        }

        fs::create_dir_all(dest_dir)?;

        if self.use_symlinks {
            make_symlink(source, &target)?;
        } else {
            move_file(source, &target)?;
        }
        Ok(PlaceOutcome::Placed(target))
    }
}

/// Rename, falling back to copy + remove across filesystems.
fn move_file(source: &Path, target: &Path) -> Result<()> {
    if fs::rename(source, target).is_ok() {
        return Ok(());
    }
    fs::copy(source, target)?;
    fs::remove_file(source)?;
    Ok(())
}

#[cfg(unix)]
fn make_symlink(source: &Path, target: &Path) -> Result<()> {
    let absolute = source.canonicalize()?;
    std::os::unix::fs::symlink(absolute, target)?;
    Ok(())
}

#[cfg(windows)]
fn make_symlink(source: &Path, target: &Path) -> Result<()> {
    let absolute = source.canonicalize()?;
    std::os::windows::fs::symlink_file(absolute, target)?;
    Ok(())
}
