// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Core shopping-list item types.
//!
//! This module contains the fundamental data types: Item, Unit, Priority,
//! and the create payloads (ItemDraft, NewItem).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Measurement unit for an item quantity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    /// Discrete count. The baseline unit.
    #[default]
    Pieces,
    /// Kilograms.
    Kg,
    /// Grams.
    G,
    /// Liters.
    L,
    /// Milliliters.
    Ml,
}

impl Unit {
    /// Returns the string representation used on the wire and in display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Pieces => "pieces",
            Unit::Kg => "kg",
            Unit::G => "g",
            Unit::L => "l",
            Unit::Ml => "ml",
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Unit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pieces" => Ok(Unit::Pieces),
            "kg" => Ok(Unit::Kg),
            "g" => Ok(Unit::G),
            "l" => Ok(Unit::L),
            "ml" => Ok(Unit::Ml),
            _ => Err(Error::InvalidUnit(s.to_string())),
        }
    }
}

/// Shopping urgency of an item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Can wait.
    Low,
    /// Normal. The default for new items.
    #[default]
    Medium,
    /// Needed soon.
    High,
}

impl Priority {
    /// Returns the string representation used on the wire and in display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(Error::InvalidPriority(s.to_string())),
        }
    }
}

/// One shopping-list entry.
///
/// The `id` is assigned by the server and is the stable identity of the
/// item; clients never invent ids. Timestamps are server-owned and may be
/// absent on older entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Server-assigned stable identity.
    pub id: String,
    /// Non-empty display name.
    pub name: String,
    /// Positive count in `unit`.
    pub quantity: u32,
    #[serde(default)]
    pub unit: Unit,
    #[serde(default)]
    pub priority: Priority,
    /// Free-form note, empty when unset.
    #[serde(default)]
    pub notes: String,
    /// Whether the item has been picked up.
    #[serde(default)]
    pub checked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Item {
    /// Creates an unchecked item with default unit and priority.
    pub fn new(id: impl Into<String>, name: impl Into<String>, quantity: u32) -> Self {
        Item {
            id: id.into(),
            name: name.into(),
            quantity,
            unit: Unit::default(),
            priority: Priority::default(),
            notes: String::new(),
            checked: false,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Fields a caller supplies when creating an item.
///
/// Optional fields are filled with defaults by [`ItemDraft::normalized`];
/// validation beyond that is a UI concern.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDraft {
    pub name: String,
    pub quantity: u32,
    pub unit: Option<Unit>,
    pub priority: Option<Priority>,
    pub notes: Option<String>,
}

impl ItemDraft {
    /// Creates a draft with only the required fields set.
    pub fn new(name: impl Into<String>, quantity: u32) -> Self {
        ItemDraft {
            name: name.into(),
            quantity,
            unit: None,
            priority: None,
            notes: None,
        }
    }

    /// Fills unset fields with their defaults, producing the wire payload.
    pub fn normalized(self) -> NewItem {
        NewItem {
            name: self.name,
            quantity: self.quantity,
            unit: self.unit.unwrap_or_default(),
            priority: self.priority.unwrap_or_default(),
            notes: self.notes.unwrap_or_default(),
        }
    }
}

/// Wire payload for a create request: item fields sans `id` and `checked`.
///
/// The server assigns the id and defaults `checked` to false; the created
/// item becomes real on the client only via the server's echo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub name: String,
    pub quantity: u32,
    pub unit: Unit,
    pub priority: Priority,
    #[serde(default)]
    pub notes: String,
}

#[cfg(test)]
#[path = "item_tests.rs"]
mod tests;
