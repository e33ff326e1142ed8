// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for the engine tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use std::time::Duration;

use tokio::sync::{broadcast, watch};

use tally_core::{Item, Unit};

use crate::connection::SyncEvent;
use crate::state::ListState;

/// Generous ceiling for awaited conditions. Paused-clock tests
/// auto-advance through it, so it only matters on failure.
const WAIT_CEILING: Duration = Duration::from_secs(60);

/// The canonical test item: two liters of milk, unchecked.
pub fn milk() -> Item {
    let mut item = Item::new("1", "Milk", 2);
    item.unit = Unit::L;
    item
}

/// A minimal item with the given id and name.
pub fn make_item(id: &str, name: &str) -> Item {
    Item::new(id, name, 1)
}

/// Receive the next connection event, failing the test on silence.
pub async fn next_event(rx: &mut broadcast::Receiver<SyncEvent>) -> SyncEvent {
    tokio::time::timeout(WAIT_CEILING, rx.recv())
        .await
        .unwrap()
        .unwrap()
}

/// Poll a condition until it holds.
pub async fn wait_until<F: Fn() -> bool>(condition: F) {
    tokio::time::timeout(WAIT_CEILING, async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
}

/// Wait for a state snapshot matching the predicate and return it.
pub async fn wait_for_state<F>(rx: &mut watch::Receiver<ListState>, predicate: F) -> ListState
where
    F: Fn(&ListState) -> bool,
{
    tokio::time::timeout(WAIT_CEILING, async {
        loop {
            if predicate(&rx.borrow()) {
                return rx.borrow().clone();
            }
            if rx.changed().await.is_err() {
                panic!("state channel closed before the expected snapshot");
            }
        }
    })
    .await
    .unwrap()
}
