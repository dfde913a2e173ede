//! Stage status derivation.
//!
//! Everything here is a pure function of the stage table, the event log
//! and the in-flight flag. Derivation rescans the whole log on every change;
//! a log is bounded by one processing run.

mod deriver;
mod summary;

pub use deriver::{PipelineProgress, StageProgress, StageStatusDeriver};
pub use summary::{classify, LogEntry, LogEntryKind, LogSummary};
