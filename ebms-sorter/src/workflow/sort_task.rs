//! Sort task orchestrator
//!
//! Runs the full sort: parse checklist, scan media, place files into a
//! temporary output tree, post-process in place, then finalize the tree
//! and write the summary index.
//!
//! Files land in a `ebird_<epoch-millis>` temp directory first and the
//! whole tree is renamed to `ebird` at the end, so an interrupted run
//! never leaves a half-sorted tree that looks finished.

use crate::config::SortConfig;
use crate::providers::resolve_creation_date;
use crate::services::{
    summary, AdjustOutcome, ChecklistIndex, ExifAdjuster, FileMigrator, MediaScanner,
    PathPlanner, PlaceOutcome, Transcoder,
};
use ebms_common::{MediaKind, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;
use tracing::{info, warn};

use super::{SortEvent, SortPhase};

/// Outcome counts for a completed run.
#[derive(Debug, Default, Clone)]
pub struct SortReport {
    /// Root of the sorted tree; `None` when no eligible files were found
    pub output_dir: Option<PathBuf>,
    pub files_placed: usize,
    pub files_matched: usize,
    pub duplicates_removed: usize,
    pub conflicts: usize,
    pub exif_adjusted: usize,
    pub videos_transcoded: usize,
    pub audio_extracted: usize,
    pub summary_csv: Option<PathBuf>,
}

pub struct SortTask {
    config: SortConfig,
    transcoder: Arc<Transcoder>,
    event_tx: Option<mpsc::Sender<SortEvent>>,
}

impl SortTask {
    pub fn new(config: SortConfig) -> Self {
        Self {
            config,
            transcoder: Arc::new(Transcoder::new()),
            event_tx: None,
        }
    }

    /// Create a task with an event channel for progress reporting.
    pub fn with_events(config: SortConfig, event_tx: mpsc::Sender<SortEvent>) -> Self {
        Self {
            config,
            transcoder: Arc::new(Transcoder::new()),
            event_tx: Some(event_tx),
        }
    }

    /// Shared handle to the transcoder, for killing ffmpeg on cancel.
    pub fn transcoder(&self) -> Arc<Transcoder> {
        Arc::clone(&self.transcoder)
    }

    /// Run the sort to completion.
    pub fn run(&self) -> Result<SortReport> {
        self.config.validate()?;
        let mut report = SortReport::default();

        // Phase 1: checklist index
        let mut index = match &self.config.csv_path {
            Some(csv) => {
                self.emit(SortEvent::PhaseChanged(SortPhase::ParsingChecklist));
                ChecklistIndex::from_csv(csv)?
            }
            None => {
                info!("No checklist CSV configured, sorting by date only");
                ChecklistIndex::default()
            }
        };

        // Phase 2: media discovery
        self.emit(SortEvent::PhaseChanged(SortPhase::ScanningFiles));
        let files = MediaScanner::new().scan(&self.config.media_dir);
        self.emit(SortEvent::Log(format!("{} media files found", files.len())));
        info!(count = files.len(), "Media files discovered");

        if files.is_empty() {
            self.emit(SortEvent::Progress(1.0));
            self.emit(SortEvent::PhaseChanged(SortPhase::Done));
            info!("No eligible media files, nothing to do");
            return Ok(report);
        }

        let temp_root = self.create_temp_root()?;

        // Phase 3: placement
        self.emit(SortEvent::PhaseChanged(SortPhase::Placing));
        let planner = PathPlanner::new(self.config.folder_group, self.config.sep_year);
        let migrator = FileMigrator::new(self.config.use_symlinks);
        let mut post_targets: Vec<(PathBuf, chrono::NaiveDateTime)> = Vec::new();
        let total = files.len();

        for (i, file) in files.iter().enumerate() {
            let dt = resolve_creation_date(file, self.config.hrs_offset);
            let sub_id = index.lookup(dt).map(String::from);
            let matched = sub_id
                .as_deref()
                .and_then(|id| index.stats(id).map(|s| (id, s)));
            let dest = temp_root.join(planner.dest_dir(dt, matched));

            // A window match counts toward the checklist even when the
            // file turns out to be a duplicate of one already placed
            if let Some(id) = &sub_id {
                report.files_matched += 1;
                index.mark_local(id);
            }

            match migrator.place(file, &dest)? {
                PlaceOutcome::Placed(target) => {
                    report.files_placed += 1;
                    post_targets.push((target, dt));
                }
                PlaceOutcome::DuplicateRemoved(target) => {
                    report.duplicates_removed += 1;
                    // The surviving copy still gets its post-steps (an
                    // earlier run may have been interrupted before them)
                    post_targets.push((target, dt));
                }
                PlaceOutcome::Conflict => report.conflicts += 1,
            }
            self.emit(SortEvent::Progress((i + 1) as f64 / total as f64));
        }

        // Phase 4: post-processing of placed files
        self.emit(SortEvent::PhaseChanged(SortPhase::PostProcessing));
        self.post_process(&post_targets, &mut report);

        // Phase 5: finalize tree, write summary, prune emptied dirs.
        // Files are already in their sorted places, so I/O failures from
        // here on are logged and the run still reports completion.
        self.emit(SortEvent::PhaseChanged(SortPhase::Finalizing));
        let final_root = self.finalize_root(temp_root);
        report.summary_csv = match summary::write_summary(&index, self.config.output_root()) {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "Could not write summary index");
                None
            }
        };
        report.output_dir = Some(final_root);

        if !self.config.use_symlinks {
            remove_empty_dirs(&self.config.media_dir);
        }

        self.emit(SortEvent::PhaseChanged(SortPhase::Done));
        info!(
            placed = report.files_placed,
            matched = report.files_matched,
            duplicates = report.duplicates_removed,
            conflicts = report.conflicts,
            "Sort complete"
        );
        Ok(report)
    }

    fn post_process(&self, placed: &[(PathBuf, chrono::NaiveDateTime)], report: &mut SortReport) {
        let adjuster = ExifAdjuster;
        for (path, dt) in placed {
            // Capture time correction first, so transcode outputs inherit
            // the corrected metadata. Without an offset the embedded time
            // is already what was resolved.
            if self.config.hrs_offset != 0 {
                match adjuster.adjust(path, *dt) {
                    Ok(AdjustOutcome::Adjusted) => report.exif_adjusted += 1,
                    Ok(_) => {}
                    Err(e) => warn!(path = %path.display(), error = %e, "EXIF adjust failed"),
                }
            }

            if MediaKind::from_path(path) != Some(MediaKind::Video) {
                continue;
            }
            let mut audio_source = path.clone();
            if self.config.transcode_videos && self.transcoder.should_transcode(path) {
                match self.transcoder.transcode(path) {
                    Ok(out) => {
                        report.videos_transcoded += 1;
                        audio_source = out;
                    }
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Transcode failed");
                        continue;
                    }
                }
            }
            if self.config.extract_audio {
                match self.transcoder.extract_audio(&audio_source) {
                    Ok(_) => report.audio_extracted += 1,
                    Err(e) => {
                        warn!(path = %audio_source.display(), error = %e, "Audio extraction failed")
                    }
                }
            }
        }
    }

    fn create_temp_root(&self) -> Result<PathBuf> {
        let millis = chrono::Utc::now().timestamp_millis();
        let temp_root = self.config.output_root().join(format!("ebird_{millis}"));
        fs::create_dir_all(&temp_root)?;
        Ok(temp_root)
    }

    /// Rename the temp tree to its final `ebird` name, or unpack it into
    /// the output root when the subdirectory is not wanted. When a
    /// previous `ebird` tree already sits there, the timestamped name is
    /// kept. Failures here are logged, never fatal.
    fn finalize_root(&self, temp_root: PathBuf) -> PathBuf {
        if !self.config.create_subdir {
            let root = self.config.output_root().to_path_buf();
            match fs::read_dir(&temp_root) {
                Ok(entries) => {
                    for entry in entries.flatten() {
                        let target = root.join(entry.file_name());
                        if let Err(e) = fs::rename(entry.path(), &target) {
                            warn!(
                                from = %entry.path().display(),
                                to = %target.display(),
                                error = %e,
                                "Could not move sorted folder out of temp root"
                            );
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Could not list temp root for unpacking");
                    return temp_root;
                }
            }
            if let Err(e) = fs::remove_dir(&temp_root) {
                warn!(error = %e, "Could not remove temp root");
            }
            return root;
        }

        let final_root = self.config.output_root().join("ebird");
        if final_root.exists() {
            warn!(
                kept = %temp_root.display(),
                "Output directory 'ebird' already exists, keeping timestamped name"
            );
            return temp_root;
        }
        match fs::rename(&temp_root, &final_root) {
            Ok(()) => final_root,
            Err(e) => {
                warn!(error = %e, "Could not rename output tree, keeping timestamped name");
                temp_root
            }
        }
    }

    fn emit(&self, event: SortEvent) {
        if let Some(tx) = &self.event_tx {
            // Receiver hangup just means nobody is watching
            let _ = tx.send(event);
        }
    }
}

/// Depth-first removal of directories emptied by the move. The root itself
/// is kept. Best-effort: failures are logged and pruning continues.
fn remove_empty_dirs(root: &Path) {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %root.display(), error = %e, "Could not list directory for pruning");
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            remove_empty_dirs(&path);
            let is_empty = fs::read_dir(&path)
                .map(|mut it| it.next().is_none())
                .unwrap_or(false);
            if is_empty {
                match fs::remove_dir(&path) {
                    Ok(()) => info!(path = %path.display(), "Removed emptied directory"),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Could not remove directory")
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_dir_pruning_keeps_root_and_nonempty() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b/c")).unwrap();
        fs::create_dir(dir.path().join("keep")).unwrap();
        fs::write(dir.path().join("keep/file.txt"), b"x").unwrap();

        remove_empty_dirs(dir.path());

        assert!(!dir.path().join("a").exists());
        assert!(dir.path().join("keep/file.txt").exists());
        assert!(dir.path().exists());
    }

    #[test]
    fn pruning_missing_root_is_harmless() {
        remove_empty_dirs(Path::new("/nonexistent/media/tree"));
    }
}
