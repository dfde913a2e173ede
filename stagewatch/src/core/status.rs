//! Stage, overall and connection status enums.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The derived status of one pipeline stage.
///
/// Statuses are computed from the event log on demand and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    /// No event for the stage has arrived.
    #[default]
    Pending,
    /// Some event for the stage arrived but no completion or error.
    Active,
    /// A completion event for the stage arrived.
    Completed,
    /// An error event for the stage arrived.
    Error,
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Active => write!(f, "active"),
            Self::Completed => write!(f, "completed"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Aggregate status of a processing run, for summary banners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    /// No run in flight and nothing finished.
    #[default]
    Idle,
    /// A run is in flight.
    InProgress,
    /// Every stage completed.
    Completed,
    /// At least one stage failed.
    Error,
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// State of the server-push connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No connection and none being attempted.
    #[default]
    Disconnected,
    /// An open is in progress.
    Connecting,
    /// The stream is open.
    Connected,
    /// The last attempt failed; a reconnect is scheduled.
    Error,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl ConnectionState {
    /// Returns true if the stream is open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_status_display() {
        assert_eq!(StageStatus::Pending.to_string(), "pending");
        assert_eq!(StageStatus::Active.to_string(), "active");
        assert_eq!(StageStatus::Completed.to_string(), "completed");
        assert_eq!(StageStatus::Error.to_string(), "error");
    }

    #[test]
    fn test_overall_status_serialize() {
        let json = serde_json::to_string(&OverallStatus::InProgress).unwrap();
        assert_eq!(json, r#""in_progress""#);

        let back: OverallStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, OverallStatus::InProgress);
    }

    #[test]
    fn test_connection_state_defaults() {
        assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
        assert!(ConnectionState::Connected.is_connected());
        assert!(!ConnectionState::Error.is_connected());
        assert_eq!(ConnectionState::Error.to_string(), "error");
    }
}
