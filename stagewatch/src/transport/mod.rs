//! Server-push transport.
//!
//! This module provides:
//! - The [`EventSource`] seam that opens a stream of message payloads
//! - An HTTP implementation over `reqwest`
//! - [`EventStreamTransport`], which owns at most one live connection and
//!   reconnects after a fixed delay
//! - [`ReconnectTimer`], the cancellable handle for a scheduled reconnect

#[cfg(feature = "http")]
mod http;
mod source;
mod stream;
mod timer;

#[cfg(feature = "http")]
pub use http::HttpEventSource;
pub use source::{EventSource, FrameStream, Principal};
pub use stream::EventStreamTransport;
pub use timer::ReconnectTimer;
