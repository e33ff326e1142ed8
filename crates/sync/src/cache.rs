// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable local mirror of the confirmed item collection.
//!
//! One JSON file holds the serialized item array, overwritten wholesale on
//! every confirmed state change and fsynced. It is read once at startup as
//! a provisional cache; the server copy always supersedes it. Speculative
//! state is never written here, so a rejected optimistic write cannot be
//! resurrected by a reload.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tally_core::Item;

/// Error type for cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// File-backed item cache.
pub struct ItemCache {
    /// Path to the cache file.
    path: PathBuf,
}

impl ItemCache {
    /// Creates a cache at the given path. The file is created lazily on
    /// the first save; a missing file reads as an empty list.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ItemCache { path: path.into() }
    }

    /// Path of the cache file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the cached items.
    pub fn load(&self) -> CacheResult<Vec<Item>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    /// Overwrites the cache with the given items and fsyncs.
    pub fn save(&self, items: &[Item]) -> CacheResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string(items)?;
        let mut file = File::create(&self.path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        Ok(())
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;
