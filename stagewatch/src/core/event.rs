//! Normalized step event type.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::utils::{now_utc, Timestamp};

/// Scalar details attached to a step event, keyed by name.
pub type StepDetails = BTreeMap<String, serde_json::Value>;

/// One normalized message describing progress within a run.
///
/// Events are created once on receipt and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepEvent {
    /// Monotonically increasing id derived from the receipt time.
    pub id: u64,

    /// Free-text description of what happened.
    pub label: String,

    /// Optional details; `status: "error"` marks a failure.
    #[serde(default)]
    pub details: StepDetails,

    /// When the client received the event.
    pub timestamp: Timestamp,
}

impl StepEvent {
    /// Creates a new step event stamped with the current time.
    #[must_use]
    pub fn new(id: u64, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            details: StepDetails::new(),
            timestamp: now_utc(),
        }
    }

    /// Creates a new step event with details.
    #[must_use]
    pub fn with_details(id: u64, label: impl Into<String>, details: StepDetails) -> Self {
        Self {
            id,
            label: label.into(),
            details,
            timestamp: now_utc(),
        }
    }

    /// Adds a detail field to the event.
    #[must_use]
    pub fn add_detail(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }

    /// Returns the `status` detail when it is a string.
    #[must_use]
    pub fn status_detail(&self) -> Option<&str> {
        self.details.get("status").and_then(serde_json::Value::as_str)
    }

    /// Returns true if the details flag this event as failed.
    #[must_use]
    pub fn has_error_status(&self) -> bool {
        self.status_detail() == Some("error")
    }

    /// Returns true if the label contains the given fragment.
    #[must_use]
    pub fn label_contains(&self, fragment: &str) -> bool {
        self.label.contains(fragment)
    }

    /// Returns the first `n` details in key order, with values rendered for display.
    #[must_use]
    pub fn detail_preview(&self, n: usize) -> Vec<(String, String)> {
        self.details
            .iter()
            .take(n)
            .map(|(k, v)| (k.clone(), render_value(v)))
            .collect()
    }
}

fn render_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
