//! Append-only log of the step events of one processing run.

use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::debug;

use super::StepSink;
use crate::core::StepEvent;

/// An append-only, arrival-ordered record of step events.
///
/// Events are never reordered, deduplicated or mutated. A server re-delivery
/// with a different id appears twice. Every append and clear bumps a
/// revision counter that subscribers can await.
#[derive(Debug)]
pub struct StepEventLog {
    events: RwLock<Vec<StepEvent>>,
    revision: watch::Sender<u64>,
}

impl Default for StepEventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl StepEventLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            events: RwLock::new(Vec::new()),
            revision,
        }
    }

    /// Appends an event to the end of the log.
    pub fn append(&self, event: StepEvent) {
        self.events.write().push(event);
        self.bump();
    }

    /// Removes every event.
    pub fn clear(&self) {
        let removed = {
            let mut events = self.events.write();
            let n = events.len();
            events.clear();
            n
        };
        debug!(removed, "Step event log cleared");
        self.bump();
    }

    /// Returns a copy of all events in arrival order.
    #[must_use]
    pub fn events(&self) -> Vec<StepEvent> {
        self.events.read().clone()
    }

    /// Runs `f` over the events without copying them.
    pub fn with_events<R>(&self, f: impl FnOnce(&[StepEvent]) -> R) -> R {
        f(&self.events.read())
    }

    /// Returns the last `n` events in arrival order.
    #[must_use]
    pub fn recent(&self, n: usize) -> Vec<StepEvent> {
        let events = self.events.read();
        let start = events.len().saturating_sub(n);
        events[start..].to_vec()
    }

    /// Returns the number of events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Returns the current revision.
    #[must_use]
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Subscribes to revision changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn bump(&self) {
        self.revision.send_modify(|r| *r += 1);
    }
}

impl StepSink for StepEventLog {
    fn accept(&self, event: StepEvent) {
        self.append(event);
    }
}
