//! Core domain model types for stagewatch.
//!
//! This module contains the fundamental types used throughout the crate:
//! - Step events as normalized from the server stream
//! - The fixed pipeline stage table and the server's label vocabulary
//! - Stage, overall and connection status enums

mod event;
mod stage;
mod status;
pub mod vocabulary;

pub use event::{StepDetails, StepEvent};
pub use stage::{pipeline_stages, StageDefinition, StageId};
pub use status::{ConnectionState, OverallStatus, StageStatus};
