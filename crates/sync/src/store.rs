// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Synchronized list store: the domain side of the engine.
//!
//! The store owns the authoritative client-side item collection. Local
//! user intents become outbound protocol messages through the injected
//! [`ConnectionManager`]; inbound authoritative events flow back through
//! the reducer in [`run`](ListStore::run). The UI consumes read-only
//! snapshots via a watch channel and never mutates state directly.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;

use tally_core::protocol::ClientMessage;
use tally_core::{Item, ItemDraft};

use crate::cache::ItemCache;
use crate::connection::{ConnectionManager, SyncEvent};
use crate::error::{Error, Result};
use crate::state::{reduce, Action, ListState};
use crate::transport::{Transport, WebSocketTransport};

struct Inner<T: Transport> {
    manager: ConnectionManager<T>,
    state: watch::Sender<ListState>,
    /// Server-confirmed items only. The sole source for cache writes: the
    /// visible snapshot may carry unconfirmed optimistic edits, and a
    /// confirmed event must not drag those into the durable cache.
    confirmed: Mutex<Vec<Item>>,
    cache: ItemCache,
    credential: String,
}

/// Shared handle to the synchronized list.
///
/// Cheap to clone; all clones observe and mutate the same list. One clone
/// drives [`run`](ListStore::run) while others serve UI actions.
pub struct ListStore<T: Transport = WebSocketTransport> {
    inner: Arc<Inner<T>>,
}

impl<T: Transport> Clone for ListStore<T> {
    fn clone(&self) -> Self {
        ListStore {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transport> ListStore<T> {
    /// Creates a store over an injected connection manager.
    ///
    /// The credential is opaque to the engine; it is only threaded into
    /// the connect call.
    pub fn new(
        manager: ConnectionManager<T>,
        cache: ItemCache,
        credential: impl Into<String>,
    ) -> Self {
        let (state, _) = watch::channel(ListState::default());
        ListStore {
            inner: Arc::new(Inner {
                manager,
                state,
                confirmed: Mutex::new(Vec::new()),
                cache,
                credential: credential.into(),
            }),
        }
    }

    /// Subscribe to state snapshots. The receiver is a read-only
    /// projection; each send is a fresh immutable snapshot.
    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.inner.state.subscribe()
    }

    /// Current snapshot.
    pub fn state(&self) -> ListState {
        self.inner.state.borrow().clone()
    }

    /// Drive the store: hydrate from the cache, connect, and apply
    /// server events until cancelled.
    ///
    /// The cached content is provisional and is fully replaced by the
    /// first `SyncUpdate`; a reconnect re-baselines the same way.
    pub async fn run(&self, cancel: CancellationToken) {
        let mut events = self.inner.manager.subscribe();

        self.hydrate();
        self.inner.manager.connect(&self.inner.credential);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    self.inner.manager.disconnect();
                    return;
                }
                event = events.recv() => match event {
                    Ok(event) => self.apply_remote(event),
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        // Skipped events are reconciled by the next full
                        // SyncUpdate.
                        tracing::warn!(missed, "event subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => return,
                },
            }
        }
    }

    /// Send a create intent for the given fields.
    ///
    /// Defaults are normalized here (baseline unit, medium priority,
    /// empty notes). Nothing is inserted locally and no id is fabricated:
    /// the item becomes visible once the server echoes it back.
    pub fn add_item(&self, draft: ItemDraft) -> Result<()> {
        let msg = ClientMessage::create_item(draft.normalized());
        self.transmit(msg)
    }

    /// Send an update carrying the full item, applying it locally first.
    pub fn update_item(&self, mut item: Item) -> Result<()> {
        item.updated_at = Some(Utc::now());
        self.apply_local(Action::ItemUpdated(item.clone()));
        self.transmit(ClientMessage::update_item(item))
    }

    /// Send a delete for the given id, removing it locally first.
    pub fn delete_item(&self, id: &str) -> Result<()> {
        self.apply_local(Action::ItemDeleted(id.to_string()));
        self.transmit(ClientMessage::delete_item(id))
    }

    /// Flip the checked flag of an item and send the resulting update.
    ///
    /// Pure composition over [`update_item`](Self::update_item); there is
    /// no separate toggle wire message.
    pub fn toggle_item(&self, id: &str) -> Result<()> {
        let found = self.inner.state.borrow().item(id).cloned();
        let mut item = found.ok_or_else(|| Error::ItemNotFound(id.to_string()))?;
        item.checked = !item.checked;
        self.update_item(item)
    }

    /// Re-run the initial load path after a fatal load error or after the
    /// connection manager gave up: clear the error, re-hydrate, and ask
    /// for a fresh connection.
    pub fn retry(&self) {
        // A live connection already delivered (or will deliver) fresh
        // authoritative state; re-hydrating would overwrite it with a
        // stale cache and re-arm a loading flag nothing would clear.
        if self.inner.manager.is_connected() {
            return;
        }
        self.inner.state.send_modify(|state| {
            state.is_loading = true;
            state.error = None;
        });
        self.hydrate();
        self.inner.manager.connect(&self.inner.credential);
    }

    fn transmit(&self, msg: ClientMessage) -> Result<()> {
        // No message-level retry here: transport-level reconnection is
        // the manager's job, and an unacknowledged send is reconciled by
        // the next SyncUpdate.
        if self.inner.manager.send(msg) {
            Ok(())
        } else {
            Err(Error::ConnectionLost)
        }
    }

    fn hydrate(&self) {
        match self.inner.cache.load() {
            Ok(items) => {
                if !items.is_empty() {
                    // Cached content was confirmed when written, so it
                    // seeds the confirmed baseline as well.
                    if let Ok(mut confirmed) = self.inner.confirmed.lock() {
                        *confirmed = items.clone();
                    }
                    self.apply_local(Action::Hydrate(items));
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to read item cache");
                self.apply_local(Action::LoadFailed(e.to_string()));
            }
        }
    }

    /// Apply a locally-originated action. Optimistic state is never
    /// persisted; only confirmed (server-sourced) state reaches the cache.
    fn apply_local(&self, action: Action) {
        self.inner.state.send_modify(|state| {
            *state = reduce(state, action);
        });
    }

    fn apply_remote(&self, event: SyncEvent) {
        let action = match event {
            SyncEvent::ConnectionChange(is_connected) => Action::ConnectionChanged(is_connected),
            SyncEvent::SyncUpdate(items) => Action::SyncUpdate(items),
            SyncEvent::ItemAdded(item) => Action::ItemAdded(item),
            SyncEvent::ItemUpdated(item) => Action::ItemUpdated(item),
            SyncEvent::ItemDeleted(id) => Action::ItemDeleted(id),
            SyncEvent::Error(message) => Action::SyncError(message),
            SyncEvent::MaxRetriesReached => {
                Action::SyncError("connection lost: retry attempts exhausted".to_string())
            }
        };

        if matches!(
            action,
            Action::SyncUpdate(_)
                | Action::ItemAdded(_)
                | Action::ItemUpdated(_)
                | Action::ItemDeleted(_)
        ) {
            self.persist_confirmed(&action);
        }

        self.inner.state.send_modify(|state| {
            *state = reduce(state, action);
        });
    }

    /// Fold a server-sourced item transition into the confirmed baseline
    /// and mirror it to the durable cache. Runs the same reducer over the
    /// confirmed items, so optimistic edits in the visible snapshot can
    /// never leak into the cache.
    fn persist_confirmed(&self, action: &Action) {
        let Ok(mut confirmed) = self.inner.confirmed.lock() else {
            return;
        };
        let shadow = ListState {
            items: confirmed.clone(),
            ..ListState::default()
        };
        let next = reduce(&shadow, action.clone()).items;
        if next == *confirmed {
            return;
        }
        *confirmed = next;

        if self.inner.state.borrow().error.is_none() {
            if let Err(e) = self.inner.cache.save(&confirmed) {
                tracing::warn!(error = %e, "failed to persist item cache");
            }
        }
    }
}
