// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket protocol messages for client-server communication.
//!
//! Every frame is a tagged envelope `{ "type": <string>, "data": ... }`.
//! The client sends intents; the server replies with authoritative state
//! and broadcasts every accepted change (including echoes of the
//! originator's own intents) to all connected clients.

use serde::{Deserialize, Serialize};

use crate::item::{Item, NewItem};

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    /// Request the full authoritative list.
    ///
    /// Sent immediately after every successful connect, so a reconnect
    /// always re-establishes a consistent baseline.
    SyncRequest,

    /// Create an item. The client supplies no id; the server assigns one
    /// and echoes the created item back.
    CreateItem(NewItem),

    /// Replace an item wholesale. Carries the full item so the server
    /// never merges partial state.
    UpdateItem(Item),

    /// Delete an item by id.
    DeleteItem {
        /// Server-assigned id of the item to remove.
        id: String,
    },
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    /// The full authoritative list. Replaces all client-side state.
    SyncUpdate(Vec<Item>),

    /// Echo of an accepted create, now carrying the server-assigned id.
    CreateItem(Item),

    /// Echo of an accepted update.
    UpdateItem(Item),

    /// Echo of an accepted delete.
    DeleteItem {
        /// Id of the removed item.
        id: String,
    },

    /// Advisory error. Never invalidates already-visible items.
    Error {
        /// Human-readable error description.
        message: String,
    },
}

impl ClientMessage {
    /// Creates a SyncRequest message.
    pub fn sync_request() -> Self {
        ClientMessage::SyncRequest
    }

    /// Creates a CreateItem message.
    pub fn create_item(item: NewItem) -> Self {
        ClientMessage::CreateItem(item)
    }

    /// Creates an UpdateItem message.
    pub fn update_item(item: Item) -> Self {
        ClientMessage::UpdateItem(item)
    }

    /// Creates a DeleteItem message.
    pub fn delete_item(id: impl Into<String>) -> Self {
        ClientMessage::DeleteItem { id: id.into() }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    /// Creates a SyncUpdate message.
    pub fn sync_update(items: Vec<Item>) -> Self {
        ServerMessage::SyncUpdate(items)
    }

    /// Creates a CreateItem echo.
    pub fn create_item(item: Item) -> Self {
        ServerMessage::CreateItem(item)
    }

    /// Creates an UpdateItem echo.
    pub fn update_item(item: Item) -> Self {
        ServerMessage::UpdateItem(item)
    }

    /// Creates a DeleteItem echo.
    pub fn delete_item(id: impl Into<String>) -> Self {
        ServerMessage::DeleteItem { id: id.into() }
    }

    /// Creates an Error message.
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
