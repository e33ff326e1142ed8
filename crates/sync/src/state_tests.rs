// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use tally_core::Item;

fn item(id: &str, name: &str) -> Item {
    Item::new(id, name, 1)
}

fn with_items(items: Vec<Item>) -> ListState {
    reduce(&ListState::default(), Action::SyncUpdate(items))
}

#[test]
fn default_state_is_loading_and_disconnected() {
    let state = ListState::default();
    assert!(state.is_loading);
    assert!(state.items.is_empty());
    assert!(!state.sync.is_connected);
}

#[test]
fn sync_update_replaces_everything() {
    let state = with_items(vec![item("1", "Milk"), item("2", "Eggs")]);

    // Items absent from the authoritative list are removed.
    let next = reduce(&state, Action::SyncUpdate(vec![item("2", "Eggs")]));
    assert_eq!(next.items, vec![item("2", "Eggs")]);
    assert!(!next.is_loading);
    assert!(next.error.is_none());
}

#[test]
fn item_added_is_idempotent() {
    let state = ListState::default();
    let once = reduce(&state, Action::ItemAdded(item("1", "Milk")));
    let twice = reduce(&once, Action::ItemAdded(item("1", "Milk")));

    assert_eq!(twice.items.len(), 1);
    assert_eq!(twice.items[0].id, "1");
}

#[test]
fn item_updated_replaces_by_id() {
    let state = with_items(vec![item("1", "Milk")]);
    let mut renamed = item("1", "Oat milk");
    renamed.checked = true;

    let next = reduce(&state, Action::ItemUpdated(renamed.clone()));
    assert_eq!(next.items, vec![renamed]);
}

#[test]
fn item_updated_inserts_when_update_precedes_create() {
    // Network interleaving: the update echo can outrun the create echo.
    let state = with_items(Vec::new());
    let next = reduce(&state, Action::ItemUpdated(item("9", "Jam")));
    assert_eq!(next.items, vec![item("9", "Jam")]);
}

#[test]
fn item_deleted_removes_and_tolerates_missing() {
    let state = with_items(vec![item("1", "Milk")]);

    let next = reduce(&state, Action::ItemDeleted("1".to_string()));
    assert!(next.items.is_empty());

    let again = reduce(&next, Action::ItemDeleted("1".to_string()));
    assert!(again.items.is_empty());
}

#[test]
fn toggle_flips_checked_in_place() {
    let state = with_items(vec![item("1", "Milk")]);

    let toggled = reduce(&state, Action::ToggleItem("1".to_string()));
    assert!(toggled.items[0].checked);

    let back = reduce(&toggled, Action::ToggleItem("1".to_string()));
    assert!(!back.items[0].checked);
}

#[test]
fn toggle_of_unknown_id_changes_nothing() {
    let state = with_items(vec![item("1", "Milk")]);
    let next = reduce(&state, Action::ToggleItem("ghost".to_string()));
    assert_eq!(next, state);
}

#[test]
fn connecting_clears_stale_sync_error() {
    let state = reduce(&ListState::default(), Action::SyncError("boom".to_string()));
    assert_eq!(state.sync.error.as_deref(), Some("boom"));

    let connected = reduce(&state, Action::ConnectionChanged(true));
    assert!(connected.sync.is_connected);
    assert!(connected.sync.error.is_none());
}

#[test]
fn disconnecting_keeps_items_visible() {
    let state = with_items(vec![item("1", "Milk")]);
    let next = reduce(&state, Action::ConnectionChanged(false));

    assert!(!next.sync.is_connected);
    assert_eq!(next.items, state.items);
}

#[test]
fn sync_error_is_advisory() {
    let state = with_items(vec![item("1", "Milk")]);
    let next = reduce(&state, Action::SyncError("quota".to_string()));

    assert_eq!(next.items, state.items);
    assert_eq!(next.sync.error.as_deref(), Some("quota"));
}

#[test]
fn hydrate_stays_provisional() {
    let state = reduce(&ListState::default(), Action::Hydrate(vec![item("1", "Milk")]));
    assert_eq!(state.items.len(), 1);
    // Loading until the first authoritative sync.
    assert!(state.is_loading);
}

#[test]
fn load_failure_surfaces_and_stops_loading() {
    let state = reduce(&ListState::default(), Action::LoadFailed("disk".to_string()));
    assert_eq!(state.error.as_deref(), Some("disk"));
    assert!(!state.is_loading);
}
