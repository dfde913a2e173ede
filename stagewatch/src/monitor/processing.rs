//! The session-scoped processing monitor.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};
use uuid::Uuid;

use super::MonitorSnapshot;
use crate::config::MonitorConfig;
use crate::core::ConnectionState;
use crate::derive::{LogSummary, PipelineProgress, StageStatusDeriver};
use crate::errors::StagewatchError;
use crate::events::{FanoutStepSink, LoggingStepSink, StepEventLog, StepSink};
use crate::transport::{EventSource, EventStreamTransport, Principal};

/// Ties the event stream, the event log and stage derivation to one
/// authenticated session.
///
/// Create one per session. Dropping it closes the stream.
pub struct ProcessingMonitor {
    session_id: Uuid,
    config: MonitorConfig,
    log: Arc<StepEventLog>,
    deriver: StageStatusDeriver,
    transport: EventStreamTransport,
    principal: Mutex<Option<Principal>>,
    in_flight: watch::Sender<bool>,
}

impl ProcessingMonitor {
    /// Creates a monitor over an event source. Nothing connects until a
    /// principal is set. The configuration is validated first.
    pub fn new(config: MonitorConfig, source: Arc<dyn EventSource>) -> Result<Self, StagewatchError> {
        Self::with_sink(config, source, None)
    }

    /// Creates a monitor that also forwards every step event to `sink`.
    pub fn with_sink(
        config: MonitorConfig,
        source: Arc<dyn EventSource>,
        sink: Option<Arc<dyn StepSink>>,
    ) -> Result<Self, StagewatchError> {
        config.validate()?;
        let log = Arc::new(StepEventLog::new());
        let mut fanout = FanoutStepSink::new()
            .with(log.clone())
            .with(Arc::new(LoggingStepSink::debug()));
        if let Some(sink) = sink {
            fanout = fanout.with(sink);
        }
        let transport =
            EventStreamTransport::new(source, Arc::new(fanout), config.reconnect_delay())?;
        let (in_flight, _) = watch::channel(false);

        let session_id = Uuid::new_v4();
        debug!(%session_id, endpoint = %config.endpoint, "Processing monitor created");
        Ok(Self {
            session_id,
            config,
            log,
            deriver: StageStatusDeriver::default(),
            transport,
            principal: Mutex::new(None),
            in_flight,
        })
    }

    /// Creates a monitor over the HTTP event stream at the configured endpoint.
    #[cfg(feature = "http")]
    pub fn with_http(config: MonitorConfig) -> Result<Self, StagewatchError> {
        let source = crate::transport::HttpEventSource::new(&config)?;
        Self::new(config, Arc::new(source))
    }

    /// Applies a session change.
    ///
    /// `Some` connects, replacing the stream if the user changed. `None`
    /// closes the stream and resets the run. Returns true if a new
    /// connection was started.
    pub fn set_principal(&self, principal: Option<Principal>) -> bool {
        let mut current = self.principal.lock();
        match principal {
            Some(next) => {
                if current.as_ref().is_some_and(|p| p.user_id() != next.user_id()) {
                    info!(session_id = %self.session_id, "Principal changed, restarting stream");
                    self.transport.disconnect();
                    self.reset_run();
                }
                *current = Some(next.clone());
                self.transport.connect(Some(next))
            }
            None => {
                if current.take().is_some() {
                    info!(session_id = %self.session_id, "Principal cleared");
                }
                self.transport.disconnect();
                self.reset_run();
                false
            }
        }
    }

    /// Starts a new run: clears the log and marks the run in flight.
    pub fn begin_run(&self) {
        self.log.clear();
        self.in_flight.send_replace(true);
        info!(session_id = %self.session_id, "Run started");
    }

    /// Marks the run as no longer in flight. The log is kept.
    pub fn finish_run(&self) {
        if self.in_flight.send_replace(false) {
            info!(session_id = %self.session_id, events = self.log.len(), "Run finished");
        }
    }

    /// Clears the log and ends any run.
    pub fn clear(&self) {
        self.reset_run();
    }

    /// Returns true while a run is in flight.
    #[must_use]
    pub fn in_flight(&self) -> bool {
        *self.in_flight.borrow()
    }

    /// Derives stage progress from the current log.
    #[must_use]
    pub fn progress(&self) -> PipelineProgress {
        let in_flight = self.in_flight();
        self.log.with_events(|events| self.deriver.derive(events, in_flight))
    }

    /// Returns everything a progress view needs, computed from one copy of
    /// the log.
    #[must_use]
    pub fn snapshot(&self) -> MonitorSnapshot {
        let in_flight = self.in_flight();
        let events = self.log.events();
        MonitorSnapshot {
            session_id: self.session_id,
            progress: self.deriver.derive(&events, in_flight),
            summary: LogSummary::from_events(&events, self.config.recent_window),
            events,
            in_flight,
            connection: self.transport.state(),
            last_error: self.transport.last_error(),
            reconnect_attempts: self.transport.reconnect_attempts(),
        }
    }

    /// Subscribes to log changes. The value is a revision counter.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.log.subscribe()
    }

    /// Subscribes to the in-flight flag.
    #[must_use]
    pub fn subscribe_run(&self) -> watch::Receiver<bool> {
        self.in_flight.subscribe()
    }

    /// Subscribes to connection state changes.
    #[must_use]
    pub fn subscribe_connection(&self) -> watch::Receiver<ConnectionState> {
        self.transport.subscribe_state()
    }

    /// Returns the connection state.
    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.transport.state()
    }

    /// Returns the event log.
    #[must_use]
    pub fn log(&self) -> &Arc<StepEventLog> {
        &self.log
    }

    /// Returns the transport.
    #[must_use]
    pub fn transport(&self) -> &EventStreamTransport {
        &self.transport
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Returns the id used to correlate this session's logs.
    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Closes the stream and cancels any pending reconnect. The log is kept.
    pub fn shutdown(&self) {
        self.principal.lock().take();
        self.transport.disconnect();
        debug!(session_id = %self.session_id, "Processing monitor shut down");
    }

    fn reset_run(&self) {
        self.log.clear();
        self.in_flight.send_replace(false);
    }
}

impl Drop for ProcessingMonitor {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for ProcessingMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessingMonitor")
            .field("session_id", &self.session_id)
            .field("events", &self.log.len())
            .field("in_flight", &self.in_flight())
            .field("transport", &self.transport)
            .finish()
    }
}
