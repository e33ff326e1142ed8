// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Connection management: lifecycle, backoff, and event fan-out.
//!
//! The [`ConnectionManager`] owns exactly one logical connection to the
//! server and hides the transport lifecycle behind a message-oriented
//! interface. It has no business knowledge of items: inbound frames are
//! translated 1:1 into [`SyncEvent`]s and broadcast to subscribers.
//!
//! A single background session task drives the connect/pump/backoff loop.
//! At most one such task exists at a time, which guarantees that no event
//! from a superseded connection can interleave with a newer one.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;

use tally_core::protocol::{ClientMessage, ServerMessage};
use tally_core::Item;

use crate::config::ClientConfig;
use crate::transport::{Transport, TransportSink, TransportStream, WebSocketTransport};

/// Capacity of the broadcast channel for inbound events.
const EVENT_CAPACITY: usize = 64;
/// Capacity of the per-session outbound queue.
const OUTBOUND_CAPACITY: usize = 64;

/// Connection lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Phase {
    /// No socket; initial state, and the result of `disconnect()`.
    Idle = 0,
    /// Socket opening.
    Connecting = 1,
    /// Ready to send and receive.
    Open = 2,
    /// Socket closed, not by the user.
    Closed = 3,
    /// Backoff timer armed before the next attempt.
    ReconnectWait = 4,
    /// Retry budget exhausted; only an explicit `connect()` leaves this.
    GivenUp = 5,
}

impl Phase {
    fn from_u8(value: u8) -> Phase {
        match value {
            1 => Phase::Connecting,
            2 => Phase::Open,
            3 => Phase::Closed,
            4 => Phase::ReconnectWait,
            5 => Phase::GivenUp,
            _ => Phase::Idle,
        }
    }
}

/// Events fanned out to subscribers.
///
/// A closed enum with typed payloads; subscribing returns a receiver and
/// dropping the receiver unsubscribes.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// The connection opened (`true`) or closed (`false`).
    ConnectionChange(bool),
    /// Full authoritative list; replaces all client-side item state.
    SyncUpdate(Vec<Item>),
    /// Server echo of an accepted create.
    ItemAdded(Item),
    /// Server echo of an accepted update.
    ItemUpdated(Item),
    /// Server echo of an accepted delete.
    ItemDeleted(String),
    /// Advisory server-reported error.
    Error(String),
    /// The retry budget is exhausted; a manual reconnect is required.
    MaxRetriesReached,
}

/// Connection state visible to callers, updated only by the session task
/// and by `connect`/`disconnect`. Atomics allow lock-free status reads.
struct SharedState {
    phase: AtomicU8,
    retry_count: AtomicU32,
    last_error: Mutex<Option<String>>,
}

impl SharedState {
    fn new() -> Self {
        SharedState {
            phase: AtomicU8::new(Phase::Idle as u8),
            retry_count: AtomicU32::new(0),
            last_error: Mutex::new(None),
        }
    }

    fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::Acquire))
    }

    fn set_phase(&self, phase: Phase) {
        self.phase.store(phase as u8, Ordering::Release);
    }

    fn retry_count(&self) -> u32 {
        self.retry_count.load(Ordering::Acquire)
    }

    fn set_retry_count(&self, count: u32) {
        self.retry_count.store(count, Ordering::Release);
    }

    fn set_last_error(&self, error: String) {
        if let Ok(mut guard) = self.last_error.lock() {
            *guard = Some(error);
        }
    }

    fn last_error(&self) -> Option<String> {
        self.last_error.lock().ok().and_then(|guard| guard.clone())
    }
}

/// Handle to the live session task.
struct Session {
    cancel: CancellationToken,
    outbound: mpsc::Sender<ClientMessage>,
}

struct Inner<T: Transport> {
    config: ClientConfig,
    transport: T,
    shared: SharedState,
    events: broadcast::Sender<SyncEvent>,
    session: Mutex<Option<Session>>,
}

impl<T: Transport> Inner<T> {
    fn emit(&self, event: SyncEvent) {
        // No subscribers is fine; events are fire-and-forget.
        let _ = self.events.send(event);
    }

    fn dispatch(&self, msg: ServerMessage) {
        match msg {
            ServerMessage::SyncUpdate(items) => self.emit(SyncEvent::SyncUpdate(items)),
            ServerMessage::CreateItem(item) => self.emit(SyncEvent::ItemAdded(item)),
            ServerMessage::UpdateItem(item) => self.emit(SyncEvent::ItemUpdated(item)),
            ServerMessage::DeleteItem { id } => self.emit(SyncEvent::ItemDeleted(id)),
            ServerMessage::Error { message } => {
                tracing::warn!(%message, "server reported an error");
                self.emit(SyncEvent::Error(message));
            }
        }
    }
}

/// Maintains exactly one logical connection to the sync server.
///
/// Cheap to clone; all clones share the same connection. Construct one
/// instance at the application's composition root and inject it into the
/// store, so tests can build isolated instances.
pub struct ConnectionManager<T: Transport = WebSocketTransport> {
    inner: Arc<Inner<T>>,
}

impl<T: Transport> Clone for ConnectionManager<T> {
    fn clone(&self) -> Self {
        ConnectionManager {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl ConnectionManager<WebSocketTransport> {
    /// Create a manager with the production WebSocket transport.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, WebSocketTransport::new())
    }
}

impl<T: Transport> ConnectionManager<T> {
    /// Create a manager with a custom transport (for testing).
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        ConnectionManager {
            inner: Arc::new(Inner {
                config,
                transport,
                shared: SharedState::new(),
                events,
                session: Mutex::new(None),
            }),
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.inner.shared.phase()
    }

    /// Check if the connection is open.
    pub fn is_connected(&self) -> bool {
        self.phase() == Phase::Open
    }

    /// Number of reconnect attempts made since the last successful open.
    pub fn retry_count(&self) -> u32 {
        self.inner.shared.retry_count()
    }

    /// Most recent transport error, if any.
    pub fn last_error(&self) -> Option<String> {
        self.inner.shared.last_error()
    }

    /// Subscribe to connection events.
    ///
    /// Every subscriber sees every event; dropping the receiver
    /// unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.inner.events.subscribe()
    }

    /// Open the connection using the given opaque credential.
    ///
    /// No-op while a session is live (connecting, open, or waiting out a
    /// backoff); a second session would break the single-connection
    /// guarantee. Callable again from `Idle` and from `GivenUp` — the
    /// latter is the manual-retry affordance.
    ///
    /// On every successful open the manager resets the retry budget,
    /// emits `ConnectionChange(true)`, and sends `SYNC_REQUEST` so the
    /// server replies with full authoritative state.
    pub fn connect(&self, credential: &str) {
        match self.phase() {
            Phase::Idle | Phase::GivenUp => {}
            Phase::Connecting | Phase::Open | Phase::Closed | Phase::ReconnectWait => return,
        }

        let cancel = CancellationToken::new();
        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_CAPACITY);

        if let Ok(mut guard) = self.inner.session.lock() {
            *guard = Some(Session {
                cancel: cancel.clone(),
                outbound: outbound_tx,
            });
        }

        self.inner.shared.set_retry_count(0);
        self.inner.shared.set_phase(Phase::Connecting);

        let inner = Arc::clone(&self.inner);
        let url = self.inner.config.connect_url(credential);
        tokio::spawn(async move {
            run_session(inner, url, cancel, outbound_rx).await;
        });
    }

    /// Queue a message for transmission.
    ///
    /// Returns whether transmission was attempted: `false` whenever the
    /// phase is not `Open`, so callers can surface an offline state
    /// instead of crashing.
    pub fn send(&self, msg: ClientMessage) -> bool {
        if self.phase() != Phase::Open {
            return false;
        }
        let Ok(guard) = self.inner.session.lock() else {
            return false;
        };
        match guard.as_ref() {
            Some(session) => session.outbound.try_send(msg).is_ok(),
            None => false,
        }
    }

    /// Tear down the connection and cancel any pending retry.
    ///
    /// Unconditionally returns the manager to `Idle` from any phase; this
    /// is the only terminal exit that does not raise an error event.
    pub fn disconnect(&self) {
        if let Ok(mut guard) = self.inner.session.lock() {
            if let Some(session) = guard.take() {
                session.cancel.cancel();
            }
        }
        self.inner.shared.set_phase(Phase::Idle);
    }
}

/// Outcome of a single pumped connection.
enum PumpEnd {
    /// Torn down by the user; no retry.
    Cancelled,
    /// Lost without user intent; retry applies.
    Closed,
}

/// Session task: connect, pump, and back off until cancelled, given up,
/// or closed by the user.
async fn run_session<T: Transport>(
    inner: Arc<Inner<T>>,
    url: String,
    cancel: CancellationToken,
    mut outbound_rx: mpsc::Receiver<ClientMessage>,
) {
    loop {
        inner.shared.set_phase(Phase::Connecting);

        let connected = tokio::select! {
            _ = cancel.cancelled() => {
                inner.shared.set_phase(Phase::Idle);
                return;
            }
            result = inner.transport.connect(&url) => result,
        };

        match connected {
            Ok((mut sink, mut stream)) => {
                inner.shared.set_retry_count(0);
                inner.shared.set_phase(Phase::Open);
                tracing::info!("connected to sync server");
                inner.emit(SyncEvent::ConnectionChange(true));

                // Resynchronization point: ask for the full authoritative
                // list on every open, not only the first one.
                let baseline = sink.send(ClientMessage::SyncRequest).await;

                let end = if baseline.is_ok() {
                    pump(&inner, &cancel, &mut sink, &mut stream, &mut outbound_rx).await
                } else {
                    PumpEnd::Closed
                };

                tracing::info!("disconnected from sync server");
                inner.emit(SyncEvent::ConnectionChange(false));

                if matches!(end, PumpEnd::Cancelled) {
                    let _ = sink.close().await;
                    inner.shared.set_phase(Phase::Idle);
                    return;
                }
                inner.shared.set_phase(Phase::Closed);
            }
            Err(e) => {
                tracing::warn!(error = %e, "connection attempt failed");
                inner.shared.set_last_error(e.to_string());
            }
        }

        // Retry budget: delays double from the base up to the cap; once
        // the budget is spent the manager parks in GivenUp until an
        // explicit connect() call.
        let retries = inner.shared.retry_count();
        if retries >= inner.config.max_retries {
            inner.shared.set_phase(Phase::GivenUp);
            inner.emit(SyncEvent::MaxRetriesReached);
            return;
        }

        let delay = inner.config.backoff_delay(retries);
        inner.shared.set_retry_count(retries + 1);
        inner.shared.set_phase(Phase::ReconnectWait);

        tokio::select! {
            _ = cancel.cancelled() => {
                inner.shared.set_phase(Phase::Idle);
                return;
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

/// Pump one open connection: forward queued outbound messages and
/// dispatch inbound frames until the connection ends.
async fn pump<T: Transport>(
    inner: &Arc<Inner<T>>,
    cancel: &CancellationToken,
    sink: &mut Box<dyn TransportSink>,
    stream: &mut Box<dyn TransportStream>,
    outbound_rx: &mut mpsc::Receiver<ClientMessage>,
) -> PumpEnd {
    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                return PumpEnd::Cancelled;
            }

            queued = outbound_rx.recv() => {
                match queued {
                    Some(msg) => {
                        if let Err(e) = sink.send(msg).await {
                            inner.shared.set_last_error(e.to_string());
                            return PumpEnd::Closed;
                        }
                    }
                    // All manager handles dropped; treat as teardown.
                    None => return PumpEnd::Cancelled,
                }
            }

            inbound = stream.recv() => {
                match inbound {
                    Ok(Some(msg)) => inner.dispatch(msg),
                    Ok(None) => return PumpEnd::Closed,
                    Err(e) => {
                        inner.shared.set_last_error(e.to_string());
                        return PumpEnd::Closed;
                    }
                }
            }
        }
    }
}
