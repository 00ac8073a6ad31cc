//! Sort run orchestration

mod sort_task;

pub use sort_task::{SortReport, SortTask};

/// Phases a sort run moves through, in order. `ParsingChecklist` is skipped
/// when no CSV is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortPhase {
    Idle,
    ParsingChecklist,
    ScanningFiles,
    Placing,
    PostProcessing,
    Finalizing,
    Done,
}

/// Progress events emitted during a run.
#[derive(Debug, Clone)]
pub enum SortEvent {
    PhaseChanged(SortPhase),
    /// Fraction of the current phase complete, 0.0 to 1.0
    Progress(f64),
    Log(String),
}
