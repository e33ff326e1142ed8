// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration for the sync engine.
//!
//! Configuration can be built in code (`ClientConfig::default()` plus
//! field edits) or loaded from a TOML file. Only the connection URL and
//! the reconnect knobs live here; credentials are handed to
//! [`ConnectionManager::connect`](crate::connection::ConnectionManager::connect)
//! at call time and never stored.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

const CACHE_DIR_NAME: &str = "tally";
const CACHE_FILE_NAME: &str = "items.json";

/// Configuration for the sync engine.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the sync server (`ws://` or `wss://`).
    #[serde(default = "default_url")]
    pub url: String,
    /// Reconnect attempts before giving up.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Initial delay for exponential backoff (milliseconds).
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Cap on the backoff delay (milliseconds).
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_url() -> String {
    "ws://localhost:8080".to_string()
}

fn default_max_retries() -> u32 {
    5
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    10_000
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            url: default_url(),
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
        Ok(config)
    }

    /// Builds the websocket endpoint for the given credential.
    ///
    /// The credential is an opaque bearer token passed as a query
    /// parameter; the engine never inspects it.
    pub fn connect_url(&self, credential: &str) -> String {
        format!("{}/ws?token={}", self.url.trim_end_matches('/'), credential)
    }

    /// Backoff delay before the retry with the given count.
    ///
    /// `min(base_delay_ms * 2^retry_count, max_delay_ms)`; for the
    /// defaults this is 1000, 2000, 4000, 8000, 10000 ms for counts 0..4.
    pub fn backoff_delay(&self, retry_count: u32) -> Duration {
        let factor = 1u64.checked_shl(retry_count).unwrap_or(u64::MAX);
        let delay = self
            .base_delay_ms
            .saturating_mul(factor)
            .min(self.max_delay_ms);
        Duration::from_millis(delay)
    }
}

/// Default location of the durable item cache, under the per-user data
/// directory. `None` when the platform exposes no such directory.
pub fn default_cache_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join(CACHE_DIR_NAME).join(CACHE_FILE_NAME))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
