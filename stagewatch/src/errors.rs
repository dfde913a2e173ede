//! Error types for stagewatch.
//!
//! Transport and protocol errors never escape the event-handling path; they
//! are converted to connection state or dropped messages. These types exist
//! so that the conversion points can log and match on them.

use thiserror::Error;

/// The main error type for stagewatch operations.
#[derive(Debug, Error)]
pub enum StagewatchError {
    /// A transport-level error occurred.
    #[error("{0}")]
    Transport(#[from] TransportError),

    /// A message could not be decoded.
    #[error("{0}")]
    Protocol(#[from] ProtocolError),

    /// The configuration is invalid.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while opening or reading the server-push stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The connection could not be established.
    #[error("Failed to open {endpoint}: {reason}")]
    Open {
        /// The endpoint being opened.
        endpoint: String,
        /// Why the open failed.
        reason: String,
    },

    /// The server answered with a non-success status.
    #[error("Stream endpoint {endpoint} returned HTTP {status}")]
    Status {
        /// The endpoint being opened.
        endpoint: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The stream failed while reading.
    #[error("Stream error: {0}")]
    Stream(String),

    /// The server closed the stream.
    #[error("Stream closed by server")]
    Closed,
}

impl TransportError {
    /// Creates an open error.
    #[must_use]
    pub fn open(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Open {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    /// Creates a stream error.
    #[must_use]
    pub fn stream(reason: impl Into<String>) -> Self {
        Self::Stream(reason.into())
    }
}

/// Errors raised while decoding a single server message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The frame is not valid JSON or lacks a `type`.
    #[error("Malformed message: {0}")]
    MalformedJson(String),

    /// The `data` payload does not fit the message type.
    #[error("Invalid {kind} payload: {reason}")]
    InvalidPayload {
        /// The message type.
        kind: String,
        /// Why the payload was rejected.
        reason: String,
    },
}

impl ProtocolError {
    /// Creates an invalid payload error.
    #[must_use]
    pub fn invalid_payload(kind: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPayload {
            kind: kind.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A field has an unusable value.
    #[error("Invalid config field '{field}': {reason}")]
    Invalid {
        /// The field name.
        field: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// The configuration source could not be parsed.
    #[error("Config parse error: {0}")]
    Parse(String),
}

impl ConfigError {
    /// Creates an invalid field error.
    #[must_use]
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
