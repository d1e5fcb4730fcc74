//! Wire events exchanged with clients over the WebSocket gateway

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A chat message addressed to a room.
///
/// The recipient list is optional: when the client mirrors the room's
/// member list into the event it is used as-is, otherwise the relay falls
/// back to its own membership cache. The payload is opaque to the relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageEvent {
    pub sender: String,
    pub room_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipients: Option<Vec<String>>,
    pub payload: Value,
}

impl MessageEvent {
    pub fn new(sender: String, room_id: String, payload: Value) -> Self {
        Self {
            sender,
            room_id,
            recipients: None,
            payload,
        }
    }

    /// Message with an explicit recipient list supplied by the client
    pub fn with_recipients(
        sender: String,
        room_id: String,
        recipients: Vec<String>,
        payload: Value,
    ) -> Self {
        Self {
            sender,
            room_id,
            recipients: Some(recipients),
            payload,
        }
    }
}

/// Client-to-server event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// Identify the connection with a user id (first event on every socket)
    #[serde(rename = "setup")]
    Setup { user_id: String },

    /// Subscribe to a room's message events
    #[serde(rename = "join_room")]
    JoinRoom { room_id: String },

    /// Unsubscribe from a room
    #[serde(rename = "leave_room")]
    LeaveRoom { room_id: String },

    /// Send a message to a room
    #[serde(rename = "new_message")]
    NewMessage { message: MessageEvent },
}

/// Server-to-client event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// Acknowledgement sent after a successful setup
    #[serde(rename = "connected")]
    Connected {
        user_id: String,
        connection_id: String,
    },

    /// Message fanned out to a room member
    #[serde(rename = "new_message")]
    NewMessage {
        room_id: String,
        sender: String,
        payload: Value,
        timestamp: DateTime<Utc>,
    },

    /// Protocol error reported back to the offending connection
    #[serde(rename = "error")]
    Error { message: String },
}

impl ServerEvent {
    /// Build the outbound notification for a message event
    pub fn notification(event: &MessageEvent) -> Self {
        Self::NewMessage {
            room_id: event.room_id.clone(),
            sender: event.sender.clone(),
            payload: event.payload.clone(),
            timestamp: Utc::now(),
        }
    }
}
