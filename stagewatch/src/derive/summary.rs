//! Raw log classification and summary flags for the event log view.

use serde::Serialize;

use crate::core::vocabulary::{
    topics, BEGINNING_MARKER, COMPLETION_MARKER, ERROR_MARKER, RUN_COMPLETED, STARTED_MARKER,
};
use crate::core::{pipeline_stages, StageId, StepEvent};
use crate::utils::timestamps::time_of_day;

/// Attributes a label to a single stage.
///
/// When several stages match, the first in pipeline order wins.
#[must_use]
pub fn classify(label: &str) -> Option<StageId> {
    pipeline_stages()
        .iter()
        .find(|stage| stage.matches(label))
        .map(|stage| stage.id)
}

/// Topic of a raw log entry, used to pick its icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogEntryKind {
    /// Something started.
    Started,
    /// File handling or upload.
    Upload,
    /// Text recognition.
    Ocr,
    /// Language analysis.
    Nlp,
    /// Decision making.
    Decision,
    /// Something finished.
    Finished,
    /// A failure.
    Failure,
    /// Anything else.
    Other,
}

impl LogEntryKind {
    /// Classifies a label. Checks run in declaration order.
    #[must_use]
    pub fn of(label: &str) -> Self {
        let has = |fragment: &str| label.contains(fragment);
        if has(STARTED_MARKER) || has(BEGINNING_MARKER) {
            Self::Started
        } else if has(topics::FILE) || has(topics::UPLOADED) {
            Self::Upload
        } else if has(topics::OCR) {
            Self::Ocr
        } else if has(topics::NLP) || has(topics::ANALYSIS) {
            Self::Nlp
        } else if has(topics::DECISION) {
            Self::Decision
        } else if has(COMPLETION_MARKER) {
            Self::Finished
        } else if has(ERROR_MARKER) {
            Self::Failure
        } else {
            Self::Other
        }
    }
}

/// One row of the raw event log view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    /// The event, verbatim.
    pub event: StepEvent,
    /// Topic for the icon.
    pub kind: LogEntryKind,
    /// Stage the entry is attributed to, if any.
    pub stage: Option<StageId>,
    /// Whether the details flag the event as failed.
    pub failed: bool,
    /// Whether the label marks something finished.
    pub finished: bool,
    /// Receipt time of day.
    pub time: String,
}

impl LogEntry {
    /// Builds the view row for an event.
    #[must_use]
    pub fn from_event(event: &StepEvent) -> Self {
        Self {
            kind: LogEntryKind::of(&event.label),
            stage: classify(&event.label),
            failed: event.has_error_status(),
            finished: event.label_contains(COMPLETION_MARKER),
            time: time_of_day(&event.timestamp),
            event: event.clone(),
        }
    }
}

/// Summary flags and rows for the raw event log view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogSummary {
    /// Number of events.
    pub total: usize,
    /// Any event failed.
    pub has_error: bool,
    /// The run completion marker arrived.
    pub is_completed: bool,
    /// Events exist and the run neither completed nor failed.
    pub show_progress: bool,
    /// The most recent rows, always shown.
    pub recent: Vec<LogEntry>,
    /// Older rows, shown on demand.
    pub earlier: Vec<LogEntry>,
}

impl LogSummary {
    /// Summarizes a log, keeping the last `recent_window` rows apart.
    #[must_use]
    pub fn from_events(events: &[StepEvent], recent_window: usize) -> Self {
        let has_error = events
            .iter()
            .any(|e| e.label_contains(ERROR_MARKER) || e.has_error_status());
        // Stage completions also contain "Tamamlandı"; only the run marker ends the run.
        let is_completed = events.iter().any(|e| e.label_contains(RUN_COMPLETED));
        let split = events.len().saturating_sub(recent_window);

        Self {
            total: events.len(),
            has_error,
            is_completed,
            show_progress: !events.is_empty() && !is_completed && !has_error,
            earlier: events[..split].iter().map(LogEntry::from_event).collect(),
            recent: events[split..].iter().map(LogEntry::from_event).collect(),
        }
    }
}
