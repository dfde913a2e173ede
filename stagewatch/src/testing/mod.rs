//! Testing utilities for stagewatch clients.
//!
//! This module provides:
//! - A channel-backed [`MockEventSource`] and a recording sink
//! - Message frame fixtures
//! - Progress assertions and an async `eventually` helper

mod assertions;
pub mod fixtures;
mod mocks;

pub use assertions::{
    assert_overall, assert_stage_status, assert_stage_statuses, eventually, EVENTUALLY_TIMEOUT,
};
pub use mocks::{MockEventSource, RecordingStepSink};
