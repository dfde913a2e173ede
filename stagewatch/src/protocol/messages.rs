//! Message envelope, typed payloads and normalization into step events.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use tracing::{debug, info};

use crate::core::vocabulary::{DEFAULT_RESULT, DOCUMENT_UPLOADED, RUN_COMPLETED, RUN_FAILED};
use crate::core::{StepDetails, StepEvent};
use crate::errors::ProtocolError;
use crate::utils::EventIdGenerator;

/// The `type` discriminator of a server message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    /// Stream acknowledgement.
    Connected,
    /// One backend step.
    ProcessingStep,
    /// The run finished.
    ProcessingComplete,
    /// The run failed.
    ProcessingError,
    /// A document row was created.
    DocumentUploaded,
    /// Liveness only.
    Keepalive,
    /// Anything else.
    Unknown(String),
}

impl MessageKind {
    fn parse(kind: &str) -> Self {
        match kind {
            "connected" => Self::Connected,
            "processing_step" => Self::ProcessingStep,
            "processing_complete" => Self::ProcessingComplete,
            "processing_error" => Self::ProcessingError,
            "document_uploaded" => Self::DocumentUploaded,
            "keepalive" => Self::Keepalive,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => write!(f, "connected"),
            Self::ProcessingStep => write!(f, "processing_step"),
            Self::ProcessingComplete => write!(f, "processing_complete"),
            Self::ProcessingError => write!(f, "processing_error"),
            Self::DocumentUploaded => write!(f, "document_uploaded"),
            Self::Keepalive => write!(f, "keepalive"),
            Self::Unknown(kind) => write!(f, "{kind}"),
        }
    }
}

/// Result of normalizing one server message.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Acknowledgement; carries the server's greeting if any.
    Ack(Option<String>),
    /// A step event to append to the log.
    Step(StepEvent),
    /// Keepalive; nothing to do.
    Keepalive,
    /// Unrecognized message type.
    Unknown(String),
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Default, Deserialize)]
struct ConnectedPayload {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StepPayload {
    step: String,
    #[serde(default)]
    details: Option<StepDetails>,
}

#[derive(Debug, Default, Deserialize)]
struct CompletePayload {
    #[serde(default)]
    decision: Option<Value>,
    #[serde(default)]
    status: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct UploadedPayload {
    #[serde(deserialize_with = "string_or_number")]
    document_id: String,
    filename: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Turns raw message payloads into [`Inbound`] values.
///
/// Owns the id generator so that every step event of a session gets a
/// strictly increasing id, across reconnects.
#[derive(Debug, Default)]
pub struct MessageNormalizer {
    ids: EventIdGenerator,
}

impl MessageNormalizer {
    /// Creates a new normalizer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and normalizes one message payload.
    pub fn normalize(&self, payload: &str) -> Result<Inbound, ProtocolError> {
        let envelope: Envelope = serde_json::from_str(payload)
            .map_err(|e| ProtocolError::MalformedJson(e.to_string()))?;
        let kind = MessageKind::parse(&envelope.kind);
        let data = match envelope.data {
            Value::Null => Value::Object(serde_json::Map::new()),
            other => other,
        };

        match kind {
            MessageKind::Connected => {
                let ack: ConnectedPayload = decode(&kind, data)?;
                info!(greeting = ?ack.message, "Event stream acknowledged");
                Ok(Inbound::Ack(ack.message))
            }
            MessageKind::ProcessingStep => {
                let step: StepPayload = decode(&kind, data)?;
                Ok(Inbound::Step(StepEvent::with_details(
                    self.ids.next_id(),
                    step.step,
                    step.details.unwrap_or_default(),
                )))
            }
            MessageKind::ProcessingComplete => {
                let done: CompletePayload = decode(&kind, data)?;
                let result = done
                    .decision
                    .filter(is_present)
                    .unwrap_or_else(|| Value::String(DEFAULT_RESULT.to_string()));
                let mut event =
                    StepEvent::new(self.ids.next_id(), RUN_COMPLETED).add_detail("result", result);
                if let Some(status) = done.status.filter(|s| !s.is_null()) {
                    event = event.add_detail("status", status);
                }
                Ok(Inbound::Step(event))
            }
            MessageKind::ProcessingError => {
                let failed: ErrorPayload = decode(&kind, data)?;
                let mut event = StepEvent::new(self.ids.next_id(), RUN_FAILED);
                if let Some(error) = failed.error.filter(|e| !e.is_null()) {
                    event = event.add_detail("error", error);
                }
                Ok(Inbound::Step(event.add_detail("status", Value::from("error"))))
            }
            MessageKind::DocumentUploaded => {
                let uploaded: UploadedPayload = decode(&kind, data)?;
                Ok(Inbound::Step(
                    StepEvent::new(self.ids.next_id(), DOCUMENT_UPLOADED)
                        .add_detail("document_id", Value::String(uploaded.document_id))
                        .add_detail("filename", Value::String(uploaded.filename)),
                ))
            }
            MessageKind::Keepalive => Ok(Inbound::Keepalive),
            MessageKind::Unknown(other) => {
                debug!(message_type = %other, "Ignoring unrecognized message type");
                Ok(Inbound::Unknown(other))
            }
        }
    }
}

fn decode<T: for<'de> Deserialize<'de>>(kind: &MessageKind, data: Value) -> Result<T, ProtocolError> {
    serde_json::from_value(data).map_err(|e| ProtocolError::invalid_payload(kind.to_string(), e.to_string()))
}
