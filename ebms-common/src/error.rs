//! Common error types for the media sorter

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for sorter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the sorter crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Checklist CSV decoding error (wraps csv::Error)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Checklist row with an undecipherable date, time, or duration.
    /// Placement cannot proceed without a decided index state, so these
    /// abort the run instead of being skipped.
    #[error("Checklist error: {0}")]
    Checklist(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Embedded metadata could not be read or understood
    #[error("Metadata error in {path}: {reason}")]
    Metadata { path: PathBuf, reason: String },

    /// ffmpeg invocation failure (spawn error or non-zero exit)
    #[error("ffmpeg error: {0}")]
    Ffmpeg(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Convenience constructor for metadata failures.
    pub fn metadata(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::Metadata {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
