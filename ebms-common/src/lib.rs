//! # eBird Media Sorter Common Library
//!
//! Shared code for the sorter engine and its CLI:
//! - Error and result types
//! - Timestamp formats and parsing helpers
//! - Media kind classification by file extension

pub mod error;
pub mod media;
pub mod time;

pub use error::{Error, Result};
pub use media::MediaKind;
