//! ebms-sorter library interface
//!
//! Engine for sorting eBird media files into checklist-aligned folders.
//! The binary in `main.rs` is a thin CLI over [`workflow::SortTask`].

pub mod config;
pub mod providers;
pub mod services;
pub mod workflow;

pub use config::{FolderGroup, SortConfig};
pub use workflow::{SortEvent, SortPhase, SortReport, SortTask};
