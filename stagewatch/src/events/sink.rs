//! Step sink trait and implementations.

use std::sync::Arc;
use tracing::{debug, info, Level};

use crate::core::StepEvent;

/// Receives normalized step events in arrival order.
///
/// Called synchronously from the transport's delivery path, so
/// implementations must not block and must not panic.
#[cfg_attr(test, mockall::automock)]
pub trait StepSink: Send + Sync {
    /// Accepts one step event.
    fn accept(&self, event: StepEvent);
}

/// A sink that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpStepSink;

impl StepSink for NoOpStepSink {
    fn accept(&self, _event: StepEvent) {}
}

/// A sink that logs events using the tracing framework.
#[derive(Debug, Clone)]
pub struct LoggingStepSink {
    level: Level,
}

impl Default for LoggingStepSink {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl LoggingStepSink {
    /// Creates a new logging sink with the specified level.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a debug-level logging sink.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }
}

impl StepSink for LoggingStepSink {
    fn accept(&self, event: StepEvent) {
        if self.level == Level::DEBUG {
            debug!(
                event_id = event.id,
                label = %event.label,
                details = ?event.details,
                "Step: {}", event.label
            );
        } else {
            info!(
                event_id = event.id,
                label = %event.label,
                details = ?event.details,
                "Step: {}", event.label
            );
        }
    }
}

/// Forwards every event to several sinks, in order.
#[derive(Default, Clone)]
pub struct FanoutStepSink {
    sinks: Vec<Arc<dyn StepSink>>,
}

impl FanoutStepSink {
    /// Creates an empty fanout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sink.
    #[must_use]
    pub fn with(mut self, sink: Arc<dyn StepSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Returns the number of sinks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    /// Returns true if there are no sinks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl std::fmt::Debug for FanoutStepSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FanoutStepSink")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl StepSink for FanoutStepSink {
    fn accept(&self, event: StepEvent) {
        if let Some((last, rest)) = self.sinks.split_last() {
            for sink in rest {
                sink.accept(event.clone());
            }
            last.accept(event);
        }
    }
}
