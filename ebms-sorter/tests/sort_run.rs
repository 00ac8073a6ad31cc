//! End-to-end sort run against a scratch directory
//!
//! Media files here carry no embedded metadata, so capture times come from
//! filename patterns and modification times. The checklist window covers a
//! whole day so mtime-dated files match it deterministically.

use chrono::{Local, NaiveDate, TimeZone};
use ebms_sorter::{SortConfig, SortEvent, SortPhase, SortTask};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::mpsc;
use std::time::SystemTime;

const HEADER: &str = "Submission ID,Common Name,Scientific Name,Taxonomic Order,Count,State/Province,County,Location ID,Location,Latitude,Longitude,Date,Time,Protocol,Duration (Min),All Obs Reported,Distance Traveled (km),Area Covered (ha),Number of Observers,Breeding Code,Observation Details,Checklist Comments,ML Catalog Numbers";

// All-day window: 12:01 AM plus 1438 minutes runs to 23:59
const CHECKLIST_ROW: &str = "S111,Wood Thrush,Hylocichla mustelina,1,2,Ohio,Franklin,L1,Spot A,40.0,-83.1,2023-05-01,12:01 AM,Traveling,1438,1,,,1,,,,ML100";

fn set_mtime(path: &Path, year: i32, month: u32, day: u32, hour: u32, min: u32) {
    let naive = NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, min, 0)
        .unwrap();
    let local = Local.from_local_datetime(&naive).earliest().unwrap();
    let mtime = SystemTime::from(local);
    let f = fs::File::options().write(true).open(path).unwrap();
    f.set_modified(mtime).unwrap();
}

fn setup(media: &Path) -> SortConfig {
    fs::create_dir_all(media.join("camera")).unwrap();

    // Dated by mtime, inside the checklist window
    let photo = media.join("camera/photo.jpg");
    fs::write(&photo, b"not a real jpeg but a photo").unwrap();
    set_mtime(&photo, 2023, 5, 1, 7, 45);

    // Dated by filename pattern, outside any window
    let recording = media.join("20230502_0930.wav");
    fs::write(&recording, b"RIFF junk").unwrap();

    let csv = media.join("MyEBirdData.csv");
    let mut f = fs::File::create(&csv).unwrap();
    writeln!(f, "{HEADER}").unwrap();
    writeln!(f, "{CHECKLIST_ROW}").unwrap();

    let mut config = SortConfig::new(media);
    config.csv_path = Some(csv);
    config
}

#[test]
fn full_run_places_and_summarizes() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());

    let report = SortTask::new(config).run().unwrap();

    let ebird = dir.path().join("ebird");
    assert_eq!(report.output_dir.as_deref(), Some(ebird.as_path()));
    assert_eq!(report.files_placed, 2);
    assert_eq!(report.files_matched, 1);
    assert_eq!(report.conflicts, 0);

    // Matched photo lands in its checklist folder
    let matched = ebird.join("2023-05-01/Ohio_Franklin_Spot-A_S111/photo.jpg");
    assert!(matched.is_file(), "missing {}", matched.display());

    // Filename-dated recording has no checklist, date folder only
    let unmatched = ebird.join("2023-05-02/20230502_0930.wav");
    assert!(unmatched.is_file(), "missing {}", unmatched.display());

    // Sources were moved out and the emptied directory pruned
    assert!(!dir.path().join("camera").exists());

    // Summary sits next to the sorted tree, not inside it
    let summary = report.summary_csv.expect("summary written");
    assert_eq!(summary.parent(), Some(dir.path()));
    let text = fs::read_to_string(&summary).unwrap();
    assert!(text.contains("https://ebird.org/checklist/S111/media"));
}

#[test]
fn rerun_keeps_timestamped_root_and_prior_tree() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());
    SortTask::new(config).run().unwrap();

    // Same files appear again (restored from a backup, say)
    let config = setup(dir.path());
    let report = SortTask::new(config).run().unwrap();

    // Prior tree is never rescanned or overwritten; the new run keeps its
    // timestamped root next to it
    let output = report.output_dir.expect("output tree");
    assert_ne!(output, dir.path().join("ebird"));
    assert_eq!(report.files_placed, 2);
    assert!(dir
        .path()
        .join("ebird/2023-05-01/Ohio_Franklin_Spot-A_S111/photo.jpg")
        .is_file());
    assert!(output
        .join("2023-05-01/Ohio_Franklin_Spot-A_S111/photo.jpg")
        .is_file());
}

#[test]
fn duplicate_video_still_gets_post_steps() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("a")).unwrap();
    fs::create_dir_all(dir.path().join("b")).unwrap();

    // Same clip twice; the second placement is an equal-size duplicate.
    // A same-stem mp3 in the source makes extraction short-circuit once
    // placed, so the post-step is observable without running ffmpeg.
    fs::write(dir.path().join("a/clip.mov"), b"same video bytes").unwrap();
    fs::write(dir.path().join("b/clip.mov"), b"same video bytes").unwrap();
    fs::write(dir.path().join("a/clip.mp3"), b"audio").unwrap();

    let mut config = SortConfig::new(dir.path());
    config.extract_audio = true;

    let report = SortTask::new(config).run().unwrap();
    assert_eq!(report.files_placed, 2); // one mov, the mp3
    assert_eq!(report.duplicates_removed, 1);
    // Both the placed mov and the duplicate's surviving copy went through
    // extraction, each finding the mp3 already present
    assert_eq!(report.audio_extracted, 2);
}

#[test]
fn empty_source_completes_without_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = SortConfig::new(dir.path());

    let report = SortTask::new(config).run().unwrap();
    assert!(report.output_dir.is_none());
    assert_eq!(report.files_placed, 0);
    assert!(!dir.path().join("ebird").exists());
}

#[test]
fn no_subdir_unpacks_into_root() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = setup(dir.path());
    config.create_subdir = false;

    let report = SortTask::new(config).run().unwrap();
    assert_eq!(report.output_dir.as_deref(), Some(dir.path()));
    assert!(dir
        .path()
        .join("2023-05-01/Ohio_Franklin_Spot-A_S111/photo.jpg")
        .is_file());
    assert!(!dir.path().join("ebird").exists());
}

#[test]
fn events_walk_through_phases() {
    let dir = tempfile::tempdir().unwrap();
    let config = setup(dir.path());

    let (tx, rx) = mpsc::channel();
    let task = SortTask::with_events(config, tx);
    task.run().unwrap();
    drop(task);

    let phases: Vec<SortPhase> = rx
        .iter()
        .filter_map(|e| match e {
            SortEvent::PhaseChanged(p) => Some(p),
            _ => None,
        })
        .collect();
    assert_eq!(
        phases,
        vec![
            SortPhase::ParsingChecklist,
            SortPhase::ScanningFiles,
            SortPhase::Placing,
            SortPhase::PostProcessing,
            SortPhase::Finalizing,
            SortPhase::Done,
        ]
    );
}

#[test]
fn symlink_mode_keeps_sources() {
    if cfg!(not(unix)) {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let mut config = setup(dir.path());
    config.use_symlinks = true;

    let report = SortTask::new(config).run().unwrap();
    assert_eq!(report.files_placed, 2);

    // Sources still in place, links in the output tree
    assert!(dir.path().join("camera/photo.jpg").is_file());
    let link = report
        .output_dir
        .expect("output tree")
        .join("2023-05-01/Ohio_Franklin_Spot-A_S111/photo.jpg");
    assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
}
