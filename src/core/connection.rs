//! WebSocket connection management
//! Handles the lifecycle of client connections

use log::warn;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use uuid::Uuid;
use warp::ws::Message;

/// Represents the state of a single WebSocket connection.
///
/// A connection belongs to exactly one user identity, fixed at setup time.
/// A user may own several simultaneous connections (multi-device).
#[derive(Clone)]
pub struct Connection {
    pub id: String,
    pub user_id: String,
    pub sender: mpsc::UnboundedSender<Message>,
    pub connected_at: Instant,
}

impl Connection {
    /// Create a new connection with a unique ID
    pub fn new(user_id: String, sender: mpsc::UnboundedSender<Message>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            sender,
            connected_at: Instant::now(),
        }
    }

    /// Create a connection with a caller-provided ID
    pub fn with_id(id: String, user_id: String, sender: mpsc::UnboundedSender<Message>) -> Self {
        Self {
            id,
            user_id,
            sender,
            connected_at: Instant::now(),
        }
    }

    /// Send a text message through this connection.
    ///
    /// Fire-and-forget: the outbound queue is drained by the connection's
    /// forwarder task, so this never blocks the caller.
    pub fn send_text(&self, text: &str) -> bool {
        match self.sender.send(Message::text(text)) {
            Ok(_) => true,
            Err(_) => {
                warn!("Failed to send message to connection {}", self.id);
                false
            }
        }
    }

    /// Whether the receiving side of the outbound queue has gone away
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Calculate the connection duration
    pub fn connection_duration(&self) -> Duration {
        self.connected_at.elapsed()
    }
}
