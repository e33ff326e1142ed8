// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Integration tests for the full engine: store + connection manager +
//! mock transport, exercising the end-to-end scenarios a real session
//! goes through.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use tempfile::tempdir;
use tokio_util::sync::CancellationToken;

use tally_core::protocol::{ClientMessage, ServerMessage};
use tally_core::{Item, Unit};

use crate::cache::ItemCache;
use crate::config::ClientConfig;
use crate::connection::ConnectionManager;
use crate::store::ListStore;
use crate::test_helpers::{milk, wait_for_state, wait_until};
use crate::transport_tests::MockTransport;

/// Full happy path: connect, receive the list, toggle, see the echo win.
#[tokio::test]
async fn milk_toggle_scenario() {
    let dir = tempdir().unwrap();
    let transport = MockTransport::new();
    let manager = ConnectionManager::with_transport(ClientConfig::default(), transport.clone());
    let store = ListStore::new(
        manager,
        ItemCache::new(dir.path().join("items.json")),
        "family-token",
    );

    let cancel = CancellationToken::new();
    let runner = store.clone();
    let run_cancel = cancel.clone();
    tokio::spawn(async move { runner.run(run_cancel).await });

    // Client connects and receives the authoritative list.
    wait_until(|| transport.sent().first() == Some(&ClientMessage::SyncRequest)).await;
    transport.push_server(ServerMessage::sync_update(vec![milk()]));

    let mut rx = store.subscribe();
    let state = wait_for_state(&mut rx, |s| !s.is_loading).await;
    assert_eq!(state.items.len(), 1);
    assert_eq!(state.items[0].name, "Milk");
    assert_eq!(state.items[0].unit, Unit::L);
    assert!(!state.items[0].checked);

    // The user checks Milk off; an UPDATE_ITEM goes out.
    store.toggle_item("1").unwrap();
    wait_until(|| transport.sent().len() == 2).await;
    match &transport.sent()[1] {
        ClientMessage::UpdateItem(item) => assert!(item.checked),
        other => panic!("expected UpdateItem, got {:?}", other),
    }

    // The server echoes the update; final state shows Milk checked.
    let mut checked_milk = milk();
    checked_milk.checked = true;
    transport.push_server(ServerMessage::update_item(checked_milk.clone()));
    let state = wait_for_state(&mut rx, |s| s.items == vec![checked_milk.clone()]).await;
    assert!(state.items[0].checked);

    cancel.cancel();
}

/// Connection drop mid-session: items stay visible while offline, and a
/// reconnect re-baselines through a fresh SYNC_REQUEST/SYNC_UPDATE pair.
#[tokio::test(start_paused = true)]
async fn drop_and_reconnect_rebaselines() {
    let dir = tempdir().unwrap();
    let cache_path = dir.path().join("items.json");
    let transport = MockTransport::new();
    let manager = ConnectionManager::with_transport(ClientConfig::default(), transport.clone());
    let store = ListStore::new(manager, ItemCache::new(&cache_path), "family-token");

    let cancel = CancellationToken::new();
    let runner = store.clone();
    let run_cancel = cancel.clone();
    tokio::spawn(async move { runner.run(run_cancel).await });

    wait_until(|| transport.sent().len() == 1).await;
    transport.push_server(ServerMessage::sync_update(vec![milk()]));

    let mut rx = store.subscribe();
    wait_for_state(&mut rx, |s| !s.is_loading).await;

    // The connection drops unexpectedly.
    transport.close_server();
    let state = wait_for_state(&mut rx, |s| !s.sync.is_connected).await;

    // Items are not cleared while offline.
    assert_eq!(state.items, vec![milk()]);

    // Backoff elapses (paused clock) and the engine reconnects with a
    // fresh SYNC_REQUEST.
    wait_until(|| transport.connect_count() == 2).await;
    wait_until(|| transport.sent().iter().filter(|m| **m == ClientMessage::SyncRequest).count() == 2)
        .await;

    // Another device changed the list while we were away; the new
    // baseline replaces local state entirely.
    let fresh = vec![Item::new("2", "Coffee", 1)];
    transport.push_server(ServerMessage::sync_update(fresh.clone()));
    let state = wait_for_state(&mut rx, |s| s.items == fresh && s.sync.is_connected).await;
    assert!(state.sync.error.is_none());

    // The durable cache follows the confirmed baseline.
    wait_until(|| {
        ItemCache::new(&cache_path)
            .load()
            .map(|cached| cached == fresh)
            .unwrap_or(false)
    })
    .await;

    cancel.cancel();
}

/// A cold start with a warm cache shows content immediately and then
/// defers entirely to the server.
#[tokio::test]
async fn warm_cache_cold_start() {
    let dir = tempdir().unwrap();
    let cache_path = dir.path().join("items.json");
    ItemCache::new(&cache_path).save(&[milk()]).unwrap();

    let transport = MockTransport::new();
    let manager = ConnectionManager::with_transport(ClientConfig::default(), transport.clone());
    let store = ListStore::new(manager, ItemCache::new(&cache_path), "family-token");

    let cancel = CancellationToken::new();
    let runner = store.clone();
    let run_cancel = cancel.clone();
    tokio::spawn(async move { runner.run(run_cancel).await });

    let mut rx = store.subscribe();
    let state = wait_for_state(&mut rx, |s| !s.items.is_empty()).await;
    assert_eq!(state.items, vec![milk()]);
    assert!(state.is_loading);

    // The server's first word is final: the cached entry disappears.
    wait_until(|| !transport.sent().is_empty()).await;
    transport.push_server(ServerMessage::sync_update(Vec::new()));
    let state = wait_for_state(&mut rx, |s| !s.is_loading).await;
    assert!(state.items.is_empty());

    cancel.cancel();
}
