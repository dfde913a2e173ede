//! Connection lifecycle for the processing-event stream.

use futures::StreamExt;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use super::{EventSource, Principal, ReconnectTimer};
use crate::core::{ConnectionState, StepEvent};
use crate::errors::{ConfigError, TransportError};
use crate::events::StepSink;
use crate::protocol::{Inbound, MessageNormalizer};

/// Owns at most one live server-push connection and delivers the step
/// events it carries to a sink.
///
/// After a transport error the connection is discarded and a reconnect is
/// scheduled after a fixed delay, indefinitely, while a principal is set.
/// [`disconnect`](Self::disconnect) (and `Drop`) synchronously aborts the
/// connection and any pending reconnect; no event is delivered after it
/// returns.
///
/// Sinks are called on the connection task and must not call back into
/// [`disconnect`](Self::disconnect).
pub struct EventStreamTransport {
    shared: Arc<Shared>,
}

struct Shared {
    source: Arc<dyn EventSource>,
    sink: Arc<dyn StepSink>,
    normalizer: MessageNormalizer,
    reconnect_delay: Duration,
    inner: Mutex<Inner>,
    /// Held while a message is delivered, so teardown can wait it out.
    delivery: Mutex<()>,
    state_tx: watch::Sender<ConnectionState>,
}

#[derive(Default)]
struct Inner {
    principal: Option<Principal>,
    /// Bumped on every open and teardown; stale tasks compare against it.
    generation: u64,
    connection: Option<JoinHandle<()>>,
    reconnect: Option<ReconnectTimer>,
    state: ConnectionState,
    last_error: Option<String>,
    reconnect_attempts: u32,
}

impl EventStreamTransport {
    /// Creates a disconnected transport.
    ///
    /// Fails if `reconnect_delay` is zero.
    pub fn new(
        source: Arc<dyn EventSource>,
        sink: Arc<dyn StepSink>,
        reconnect_delay: Duration,
    ) -> Result<Self, ConfigError> {
        if reconnect_delay.is_zero() {
            return Err(ConfigError::invalid("reconnect_delay", "must be greater than zero"));
        }
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);
        Ok(Self {
            shared: Arc::new(Shared {
                source,
                sink,
                normalizer: MessageNormalizer::new(),
                reconnect_delay,
                inner: Mutex::new(Inner::default()),
                delivery: Mutex::new(()),
                state_tx,
            }),
        })
    }

    /// Opens a connection for the principal.
    ///
    /// No-op when a connection already exists or no principal is given.
    /// Returns true if a new connection was started. Must be called from
    /// within a Tokio runtime.
    pub fn connect(&self, principal: Option<Principal>) -> bool {
        let Some(principal) = principal else {
            debug!("No principal, not connecting");
            return false;
        };

        let mut inner = self.shared.inner.lock();
        if inner.connection.is_some() {
            trace!("Connection already exists");
            return false;
        }
        inner.principal = Some(principal);
        self.shared.open_locked(&mut inner);
        true
    }

    /// Closes the connection and cancels any pending reconnect.
    ///
    /// Idempotent. Blocks until an in-flight message delivery finishes.
    pub fn disconnect(&self) {
        let was_active = {
            let mut inner = self.shared.inner.lock();
            inner.generation += 1;
            inner.principal = None;
            inner.last_error = None;
            inner.reconnect_attempts = 0;

            let was_active = inner.connection.is_some() || inner.reconnect.is_some();
            if let Some(connection) = inner.connection.take() {
                connection.abort();
            }
            if let Some(mut timer) = inner.reconnect.take() {
                timer.cancel();
            }
            self.shared.set_state(&mut inner, ConnectionState::Disconnected);
            was_active
        };

        drop(self.shared.delivery.lock());

        if was_active {
            info!("Event stream closed");
        }
    }

    /// Returns the connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.shared.inner.lock().state
    }

    /// Returns true if the stream is open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// Returns the last transport error, cleared by the next successful open.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.shared.inner.lock().last_error.clone()
    }

    /// Returns the number of reconnects scheduled since the last successful open.
    #[must_use]
    pub fn reconnect_attempts(&self) -> u32 {
        self.shared.inner.lock().reconnect_attempts
    }

    /// Returns true if a connection exists or is being opened.
    #[must_use]
    pub fn has_connection(&self) -> bool {
        self.shared.inner.lock().connection.is_some()
    }

    /// Returns true if a reconnect is scheduled.
    #[must_use]
    pub fn reconnect_pending(&self) -> bool {
        self.shared
            .inner
            .lock()
            .reconnect
            .as_ref()
            .is_some_and(|t| !t.is_finished())
    }

    /// Returns the configured reconnect delay.
    #[must_use]
    pub fn reconnect_delay(&self) -> Duration {
        self.shared.reconnect_delay
    }

    /// Subscribes to connection state changes.
    #[must_use]
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state_tx.subscribe()
    }
}

impl Drop for EventStreamTransport {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl std::fmt::Debug for EventStreamTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.shared.inner.lock();
        f.debug_struct("EventStreamTransport")
            .field("state", &inner.state)
            .field("principal", &inner.principal)
            .field("generation", &inner.generation)
            .field("last_error", &inner.last_error)
            .finish()
    }
}

impl Shared {
    fn open_locked(self: &Arc<Self>, inner: &mut Inner) {
        if let Some(mut timer) = inner.reconnect.take() {
            timer.cancel();
        }
        let Some(principal) = inner.principal.clone() else {
            return;
        };

        inner.generation += 1;
        let generation = inner.generation;
        if inner.state != ConnectionState::Error {
            self.set_state(inner, ConnectionState::Connecting);
        }

        info!(user_id = %principal.user_id(), generation, "Opening event stream");
        let shared = Arc::clone(self);
        inner.connection = Some(tokio::spawn(async move {
            shared.run_connection(generation, principal).await;
        }));
    }

    async fn run_connection(self: Arc<Self>, generation: u64, principal: Principal) {
        let mut stream = match self.source.open(&principal).await {
            Ok(stream) => stream,
            Err(e) => {
                self.fail(generation, &e);
                return;
            }
        };
        if !self.mark_connected(generation) {
            return;
        }

        while let Some(item) = stream.next().await {
            match item {
                Ok(payload) => {
                    if !self.deliver(generation, &payload) {
                        return;
                    }
                }
                Err(e) => {
                    self.fail(generation, &e);
                    return;
                }
            }
        }
        self.fail(generation, &TransportError::Closed);
    }

    fn mark_connected(&self, generation: u64) -> bool {
        let mut inner = self.inner.lock();
        if inner.generation != generation {
            return false;
        }
        inner.last_error = None;
        inner.reconnect_attempts = 0;
        self.set_state(&mut inner, ConnectionState::Connected);
        info!(generation, "Event stream connected");
        true
    }

    /// Handles one payload. Returns false if the connection is stale.
    fn deliver(&self, generation: u64, payload: &str) -> bool {
        let _delivery = self.delivery.lock();
        if self.inner.lock().generation != generation {
            return false;
        }

        match self.normalizer.normalize(payload) {
            Ok(Inbound::Step(event)) => self.accept(event),
            Ok(Inbound::Ack(_)) => {}
            Ok(Inbound::Keepalive) => trace!("Keepalive"),
            Ok(Inbound::Unknown(kind)) => debug!(message_type = %kind, "Unrecognized message dropped"),
            Err(e) => debug!(error = %e, payload = %payload, "Malformed message dropped"),
        }
        true
    }

    fn accept(&self, event: StepEvent) {
        if let Err(e) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            self.sink.accept(event);
        })) {
            warn!("Step sink panicked: {:?}", e);
        }
    }

    fn fail(self: &Arc<Self>, generation: u64, error: &TransportError) {
        let mut inner = self.inner.lock();
        if inner.generation != generation {
            return;
        }

        warn!(error = %error, generation, "Event stream error");
        inner.connection = None;
        inner.last_error = Some(error.to_string());
        self.set_state(&mut inner, ConnectionState::Error);

        if inner.principal.is_none() {
            return;
        }
        inner.reconnect_attempts += 1;
        info!(
            attempt = inner.reconnect_attempts,
            delay_ms = u64::try_from(self.reconnect_delay.as_millis()).unwrap_or(u64::MAX),
            "Scheduling event stream reconnect"
        );
        let weak = Arc::downgrade(self);
        inner.reconnect = Some(ReconnectTimer::schedule(self.reconnect_delay, move || {
            reconnect(&weak, generation);
        }));
    }

    fn set_state(&self, inner: &mut Inner, state: ConnectionState) {
        inner.state = state;
        self.state_tx.send_replace(state);
    }
}

fn reconnect(weak: &Weak<Shared>, generation: u64) {
    let Some(shared) = weak.upgrade() else {
        return;
    };
    let mut inner = shared.inner.lock();
    if inner.generation != generation {
        return;
    }
    if let Some(timer) = inner.reconnect.take() {
        timer.detach();
    }
    if inner.connection.is_some() || inner.principal.is_none() {
        return;
    }
    info!(attempt = inner.reconnect_attempts, "Reconnecting event stream");
    shared.open_locked(&mut inner);
}
