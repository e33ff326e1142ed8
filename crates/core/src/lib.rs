// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tally-core: Shared library for the tally shopping-list sync engine
//!
//! This crate provides the data model and wire protocol shared by the
//! sync engine and any server or tooling that speaks the same protocol.

pub mod error;
pub mod item;
pub mod protocol;

pub use error::{Error, Result};
pub use item::{Item, ItemDraft, NewItem, Priority, Unit};
pub use protocol::{ClientMessage, ServerMessage};
