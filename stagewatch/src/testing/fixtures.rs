//! Message frames and event sequences for tests.

use serde_json::{json, Value};

use crate::core::vocabulary::steps;
use crate::core::StepEvent;

/// A `processing_step` frame without details.
#[must_use]
pub fn step_frame(label: &str) -> String {
    json!({"type": "processing_step", "data": {"step": label}}).to_string()
}

/// A `processing_step` frame with details.
#[must_use]
pub fn step_frame_with_details(label: &str, details: Value) -> String {
    json!({"type": "processing_step", "data": {"step": label, "details": details}}).to_string()
}

/// A `processing_complete` frame carrying a decision.
#[must_use]
pub fn complete_frame(decision: &str) -> String {
    json!({"type": "processing_complete", "data": {"decision": decision, "status": "completed"}})
        .to_string()
}

/// A `processing_error` frame.
#[must_use]
pub fn error_frame(error: &str) -> String {
    json!({"type": "processing_error", "data": {"error": error}}).to_string()
}

/// A `document_uploaded` frame with a numeric document id.
#[must_use]
pub fn document_uploaded_frame(document_id: u64, filename: &str) -> String {
    json!({"type": "document_uploaded", "data": {"document_id": document_id, "filename": filename}})
        .to_string()
}

/// The stream acknowledgement frame.
#[must_use]
pub fn connected_frame() -> String {
    json!({"type": "connected", "data": {"message": "SSE connection established"}}).to_string()
}

/// A keepalive frame.
#[must_use]
pub fn keepalive_frame() -> String {
    json!({"type": "keepalive"}).to_string()
}

/// Step labels of a successful run, in the order the backend emits them.
#[must_use]
pub fn full_document_run() -> Vec<&'static str> {
    vec![
        steps::RUN_STARTED,
        steps::FILE_READ,
        steps::FILE_TYPE_CHECKED,
        steps::DATABASE_RECORD,
        steps::OCR_STARTED,
        steps::OCR_COMPLETED,
        steps::NLP_STARTED,
        steps::NLP_COMPLETED,
        steps::DECISION_STARTED,
        steps::DECISION_COMPLETED,
    ]
}

/// Builds events with ids `1..` from labels.
#[must_use]
pub fn events_from_labels(labels: &[&str]) -> Vec<StepEvent> {
    labels
        .iter()
        .zip(1u64..)
        .map(|(label, id)| StepEvent::new(id, *label))
        .collect()
}
