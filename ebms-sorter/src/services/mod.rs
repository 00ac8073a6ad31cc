//! Sorter services
//!
//! Focused building blocks the workflow composes: checklist window index,
//! media discovery, destination planning, file placement, EXIF adjustment,
//! ffmpeg post-processing, and the summary index writer.

pub mod checklist_index;
pub mod exif_adjuster;
pub mod file_migrator;
pub mod media_scanner;
pub mod path_planner;
pub mod summary;
pub mod transcoder;

pub use checklist_index::{ChecklistIndex, SubStats};
pub use exif_adjuster::{AdjustOutcome, ExifAdjuster};
pub use file_migrator::{FileMigrator, PlaceOutcome};
pub use media_scanner::MediaScanner;
pub use path_planner::PathPlanner;
pub use transcoder::Transcoder;
