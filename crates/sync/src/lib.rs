// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tally-sync: realtime synchronization engine for a shared shopping list.
//!
//! Several devices in one family see the same list and converge on
//! identical state as items are added, edited, toggled, or removed
//! concurrently. The engine keeps a persistent websocket to the server,
//! translates local actions into outbound intents, applies server-pushed
//! authoritative state, recovers from disconnects with exponential
//! backoff, and mirrors confirmed state to a durable local cache for
//! offline resilience.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────┐ actions ┌───────────┐ messages ┌────────────────┐
//! │    UI    │────────►│ ListStore │─────────►│ ConnectionMgr  │──ws──► server
//! │          │◄────────│           │◄─────────│                │◄─ws─── server
//! └──────────┘  watch  └─────┬─────┘  events  └────────────────┘
//!                            ▼
//!                      ┌───────────┐
//!                      │ ItemCache │  (confirmed state only)
//!                      └───────────┘
//! ```
//!
//! The [`ConnectionManager`](connection::ConnectionManager) owns the
//! transport lifecycle and fans inbound frames out as typed
//! [`SyncEvent`](connection::SyncEvent)s; it knows nothing about items.
//! The [`ListStore`](store::ListStore) owns the item collection, applies
//! every change through a pure reducer, and exposes read-only snapshots.
//! Both are explicit instances wired together at the application's
//! composition root, so tests construct isolated engines.
//!
//! # Example
//!
//! ```rust,ignore
//! use tally_sync::{ClientConfig, ConnectionManager, ItemCache, ListStore};
//! use tokio_util::sync::CancellationToken;
//!
//! let config = ClientConfig::default();
//! let cache = ItemCache::new(tally_sync::config::default_cache_path().unwrap());
//! let store = ListStore::new(ConnectionManager::new(config), cache, token);
//!
//! let runner = store.clone();
//! let cancel = CancellationToken::new();
//! tokio::spawn(async move { runner.run(cancel).await });
//!
//! let mut ui = store.subscribe();
//! while ui.changed().await.is_ok() {
//!     render(&ui.borrow());
//! }
//! ```

pub mod cache;
pub mod config;
pub mod connection;
pub mod error;
pub mod state;
pub mod store;
pub mod transport;

pub use cache::ItemCache;
pub use config::ClientConfig;
pub use connection::{ConnectionManager, Phase, SyncEvent};
pub use error::{Error, Result};
pub use state::{reduce, Action, ListState, SyncStatus};
pub use store::ListStore;
pub use transport::{Transport, TransportError, TransportSink, TransportStream, WebSocketTransport};

#[cfg(test)]
mod test_helpers;




#[cfg(test)]
mod integration_tests;
