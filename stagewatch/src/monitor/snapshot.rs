//! Point-in-time view of a monitor.

use serde::Serialize;
use uuid::Uuid;

use crate::core::{ConnectionState, StepEvent};
use crate::derive::{LogSummary, PipelineProgress};

/// Everything a progress view renders, taken from a single copy of the log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorSnapshot {
    /// Session the snapshot belongs to.
    pub session_id: Uuid,
    /// Stage statuses, current step and overall status.
    pub progress: PipelineProgress,
    /// Raw events in arrival order.
    pub events: Vec<StepEvent>,
    /// Raw log rows and flags.
    pub summary: LogSummary,
    /// Whether a run is in flight.
    pub in_flight: bool,
    /// Stream connection state.
    pub connection: ConnectionState,
    /// Last transport error, if the stream is down.
    pub last_error: Option<String>,
    /// Reconnects scheduled since the stream was last up.
    pub reconnect_attempts: u32,
}

impl MonitorSnapshot {
    /// Returns true if the view should show a connection problem.
    #[must_use]
    pub fn connection_degraded(&self) -> bool {
        self.connection == ConnectionState::Error
    }

    /// Returns the label of the most recent event.
    #[must_use]
    pub fn latest_label(&self) -> Option<&str> {
        self.events.last().map(|e| e.label.as_str())
    }
}
