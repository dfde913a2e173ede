//! # Stagewatch
//!
//! Real-time progress tracking for a multi-stage document pipeline.
//!
//! A backend pushes processing messages over a server-sent event stream.
//! Stagewatch keeps that stream alive, normalizes the messages into step
//! events, and derives per-stage status from them:
//!
//! - **Transport**: one live connection per session, fixed-delay reconnect,
//!   synchronous teardown
//! - **Event log**: ordered step events for the current run
//! - **Derivation**: keyword-driven stage statuses, focused step and overall
//!   status, recomputed from the full log on demand
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stagewatch::prelude::*;
//!
//! let monitor = ProcessingMonitor::with_http(MonitorConfig::load("stagewatch.json")?)?;
//! monitor.set_principal(Some(Principal::new("42").with_access_token(token)));
//! monitor.begin_run();
//!
//! let mut changes = monitor.subscribe();
//! while changes.changed().await.is_ok() {
//!     let snapshot = monitor.snapshot();
//!     render(&snapshot.progress);
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod core;
pub mod derive;
pub mod errors;
pub mod events;
pub mod monitor;
pub mod observability;
pub mod protocol;
pub mod testing;
pub mod transport;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::MonitorConfig;
    pub use crate::core::{
        ConnectionState, OverallStatus, StageDefinition, StageId, StageStatus, StepEvent,
    };
    pub use crate::derive::{LogSummary, PipelineProgress, StageProgress, StageStatusDeriver};
    pub use crate::errors::{ConfigError, ProtocolError, StagewatchError, TransportError};
    pub use crate::events::{LoggingStepSink, NoOpStepSink, StepEventLog, StepSink};
    pub use crate::monitor::{MonitorSnapshot, ProcessingMonitor};
    #[cfg(feature = "http")]
    pub use crate::transport::HttpEventSource;
    pub use crate::transport::{EventSource, EventStreamTransport, Principal};
    pub use crate::utils::{iso_timestamp, Timestamp};
}
