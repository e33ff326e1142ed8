// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for tally-core operations.

use thiserror::Error;

/// All possible errors that can occur in tally-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid unit: '{0}'\n  hint: valid units are: pieces, kg, g, l, ml")]
    InvalidUnit(String),

    #[error("invalid priority: '{0}'\n  hint: valid priorities are: low, medium, high")]
    InvalidPriority(String),
}

/// Result type alias using the tally-core error.
pub type Result<T> = std::result::Result<T, Error>;
