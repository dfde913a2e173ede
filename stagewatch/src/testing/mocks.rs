//! In-memory event sources and sinks for testing.

use async_trait::async_trait;
use futures::channel::mpsc;
use futures::StreamExt;
use parking_lot::Mutex;
use std::collections::VecDeque;

use crate::core::StepEvent;
use crate::errors::TransportError;
use crate::events::StepSink;
use crate::transport::{EventSource, FrameStream, Principal};

type FrameSender = mpsc::UnboundedSender<Result<String, TransportError>>;

/// An event source whose connections are driven by the test.
///
/// Each successful `open` creates a channel-backed stream. Frames are pushed
/// into the most recently opened connection.
#[derive(Debug, Default)]
pub struct MockEventSource {
    inner: Mutex<MockSourceState>,
}

#[derive(Debug, Default)]
struct MockSourceState {
    open_count: usize,
    open_failures: VecDeque<TransportError>,
    connections: Vec<FrameSender>,
    principals: Vec<Principal>,
}

impl MockEventSource {
    /// Creates a source that accepts every open.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `open` fail with `error`. Calls queue up.
    pub fn fail_next_open(&self, error: TransportError) {
        self.inner.lock().open_failures.push_back(error);
    }

    /// Returns how many times `open` was called.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.inner.lock().open_count
    }

    /// Returns how many opened streams are still held by a consumer.
    #[must_use]
    pub fn live_connections(&self) -> usize {
        self.inner
            .lock()
            .connections
            .iter()
            .filter(|tx| !tx.is_closed())
            .count()
    }

    /// Returns the principal of the latest `open` call.
    #[must_use]
    pub fn last_principal(&self) -> Option<Principal> {
        self.inner.lock().principals.last().cloned()
    }

    /// Pushes a payload into the latest connection.
    ///
    /// Returns false if there is no connection or its consumer is gone.
    pub fn send(&self, payload: impl Into<String>) -> bool {
        self.push(Ok(payload.into()))
    }

    /// Fails the latest connection with a transport error.
    pub fn break_connection(&self, error: TransportError) -> bool {
        let sent = self.push(Err(error));
        self.close_connection();
        sent
    }

    /// Ends the latest connection as if the server closed it.
    pub fn close_connection(&self) {
        if let Some(tx) = self.inner.lock().connections.last() {
            tx.close_channel();
        }
    }

    fn push(&self, item: Result<String, TransportError>) -> bool {
        self.inner
            .lock()
            .connections
            .last()
            .is_some_and(|tx| tx.unbounded_send(item).is_ok())
    }
}

#[async_trait]
impl EventSource for MockEventSource {
    async fn open(&self, principal: &Principal) -> Result<FrameStream, TransportError> {
        let mut state = self.inner.lock();
        state.open_count += 1;
        state.principals.push(principal.clone());
        if let Some(error) = state.open_failures.pop_front() {
            return Err(error);
        }
        let (tx, rx) = mpsc::unbounded();
        state.connections.push(tx);
        Ok(rx.boxed())
    }
}

/// A sink that keeps every accepted event.
#[derive(Debug, Default)]
pub struct RecordingStepSink {
    events: Mutex<Vec<StepEvent>>,
}

impl RecordingStepSink {
    /// Creates an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the accepted events in order.
    #[must_use]
    pub fn events(&self) -> Vec<StepEvent> {
        self.events.lock().clone()
    }

    /// Returns the accepted labels in order.
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.events.lock().iter().map(|e| e.label.clone()).collect()
    }

    /// Returns the number of accepted events.
    #[must_use]
    pub fn count(&self) -> usize {
        self.events.lock().len()
    }
}

impl StepSink for RecordingStepSink {
    fn accept(&self, event: StepEvent) {
        self.events.lock().push(event);
    }
}
