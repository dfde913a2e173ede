//! Step event sinks and the per-run event log.
//!
//! The transport delivers every normalized step event to a [`StepSink`].
//! [`StepEventLog`] is the sink that backs progress derivation.

mod log;
mod sink;

pub use log::StepEventLog;
pub use sink::{FanoutStepSink, LoggingStepSink, NoOpStepSink, StepSink};

#[cfg(test)]
pub use sink::MockStepSink;
