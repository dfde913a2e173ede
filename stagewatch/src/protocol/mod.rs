//! Wire protocol for the processing-event stream.
//!
//! This module provides:
//! - An incremental server-sent-events frame decoder
//! - The JSON message envelope and its per-type payloads
//! - Normalization of messages into step events

mod messages;
mod sse;

pub use messages::{Inbound, MessageKind, MessageNormalizer};
pub use sse::SseDecoder;
