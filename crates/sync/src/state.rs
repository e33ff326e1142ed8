// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pure state machine for the synchronized list.
//!
//! All mutations of the item collection go through [`reduce`]: a pure
//! function of the previous state and one [`Action`], returning a new
//! snapshot. The store applies it; the UI only ever sees the snapshots.

use tally_core::Item;

/// User-facing connection/sync status.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncStatus {
    /// Whether the engine currently holds an open connection.
    pub is_connected: bool,
    /// Advisory sync error, cleared on the next successful connect.
    pub error: Option<String>,
}

/// One immutable snapshot of the synchronized list.
#[derive(Debug, Clone, PartialEq)]
pub struct ListState {
    /// The item collection. Exactly one authoritative list, no duplicate ids.
    pub items: Vec<Item>,
    /// True until the first authoritative sync (or a fatal load error).
    pub is_loading: bool,
    /// Fatal load error; only `retry()` clears it.
    pub error: Option<String>,
    pub sync: SyncStatus,
}

impl Default for ListState {
    fn default() -> Self {
        ListState {
            items: Vec::new(),
            is_loading: true,
            error: None,
            sync: SyncStatus::default(),
        }
    }
}

impl ListState {
    /// Look up an item by id.
    pub fn item(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == id)
    }
}

/// State transitions of the synchronized list.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Provisional content read from the durable cache at startup.
    Hydrate(Vec<Item>),
    /// The initial load failed; surfaced until the user retries.
    LoadFailed(String),
    /// Full authoritative replace from the server.
    SyncUpdate(Vec<Item>),
    /// Server echo of a create.
    ItemAdded(Item),
    /// Server echo of an update (or a local optimistic update).
    ItemUpdated(Item),
    /// Server echo of a delete (or a local optimistic delete).
    ItemDeleted(String),
    /// Local optimistic toggle of the checked flag.
    ToggleItem(String),
    /// Connection opened or closed.
    ConnectionChanged(bool),
    /// Advisory sync error.
    SyncError(String),
}

/// Applies one action to a snapshot, returning the next snapshot.
///
/// Reconciliation is last-write-wins by full-object replace: whichever
/// server echo arrives last for an id determines that item entirely, and
/// a `SyncUpdate` determines the whole collection. Concurrent edits to
/// different fields of the same item are not merged; that is a known
/// limitation of the protocol, not of this client.
pub fn reduce(state: &ListState, action: Action) -> ListState {
    let mut next = state.clone();
    match action {
        Action::Hydrate(items) => {
            // Cache content is provisional: show it, but stay loading
            // until the first authoritative SyncUpdate replaces it.
            next.items = items;
        }
        Action::LoadFailed(message) => {
            next.error = Some(message);
            next.is_loading = false;
        }
        Action::SyncUpdate(items) => {
            // The only path that removes stale optimistic entries.
            next.items = items;
            next.is_loading = false;
            next.error = None;
        }
        Action::ItemAdded(item) => {
            // Idempotent against duplicate delivery.
            if !next.items.iter().any(|existing| existing.id == item.id) {
                next.items.push(item);
            }
            next.is_loading = false;
        }
        Action::ItemUpdated(item) => {
            // Upsert: an update may arrive before its matching create.
            match next.items.iter_mut().find(|existing| existing.id == item.id) {
                Some(existing) => *existing = item,
                None => next.items.push(item),
            }
            next.is_loading = false;
        }
        Action::ItemDeleted(id) => {
            // Removing a non-existent id is a no-op, not an error.
            next.items.retain(|item| item.id != id);
        }
        Action::ToggleItem(id) => {
            if let Some(item) = next.items.iter_mut().find(|item| item.id == id) {
                item.checked = !item.checked;
            }
        }
        Action::ConnectionChanged(is_connected) => {
            next.sync.is_connected = is_connected;
            if is_connected {
                next.sync.error = None;
            }
        }
        Action::SyncError(message) => {
            // Advisory: never destructive to already-visible items.
            next.sync.error = Some(message);
        }
    }
    next
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
