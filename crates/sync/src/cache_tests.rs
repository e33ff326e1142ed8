// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use tempfile::tempdir;

#[test]
fn missing_file_reads_as_empty() {
    let dir = tempdir().unwrap();
    let cache = ItemCache::new(dir.path().join("items.json"));
    assert!(cache.load().unwrap().is_empty());
}

#[test]
fn save_load_roundtrip() {
    let dir = tempdir().unwrap();
    let cache = ItemCache::new(dir.path().join("items.json"));

    let mut item = Item::new("1", "Milk", 2);
    item.checked = true;
    cache.save(&[item.clone()]).unwrap();

    assert_eq!(cache.load().unwrap(), vec![item]);
}

#[test]
fn save_overwrites_wholesale() {
    let dir = tempdir().unwrap();
    let cache = ItemCache::new(dir.path().join("items.json"));

    cache
        .save(&[Item::new("1", "Milk", 2), Item::new("2", "Eggs", 12)])
        .unwrap();
    cache.save(&[Item::new("3", "Bread", 1)]).unwrap();

    let items = cache.load().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, "3");
}

#[test]
fn save_creates_parent_directories() {
    let dir = tempdir().unwrap();
    let cache = ItemCache::new(dir.path().join("nested").join("deep").join("items.json"));

    cache.save(&[Item::new("1", "Milk", 2)]).unwrap();
    assert_eq!(cache.load().unwrap().len(), 1);
}

#[test]
fn empty_file_reads_as_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("items.json");
    std::fs::write(&path, "").unwrap();

    let cache = ItemCache::new(&path);
    assert!(cache.load().unwrap().is_empty());
}

#[test]
fn corrupted_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("items.json");
    std::fs::write(&path, "{definitely not an item array").unwrap();

    let cache = ItemCache::new(&path);
    assert!(matches!(
        cache.load(),
        Err(CacheError::Serialization(_))
    ));
}
