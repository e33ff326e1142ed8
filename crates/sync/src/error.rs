// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the sync engine.

use thiserror::Error;

use crate::cache::CacheError;

/// All possible errors surfaced by the sync engine to its callers.
///
/// Transport and protocol failures never appear here: they are contained
/// in the connection manager and reported through status events. Only the
/// store's own action calls reject.
#[derive(Debug, Error)]
pub enum Error {
    #[error("connection lost: message was not sent")]
    ConnectionLost,

    #[error("item not found: {0}")]
    ItemNotFound(String),

    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using the sync engine error.
pub type Result<T> = std::result::Result<T, Error>;
