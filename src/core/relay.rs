//! Fan-out relay coordinating the connection registry and room membership
//!
//! One hop, best effort: no acknowledgement, no retry, no ordering across
//! recipients. Per-connection ordering follows from each connection's
//! outbound queue being drained by a single forwarder task.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};
use tokio::time::interval;
use warp::ws::Message as WsMessage;

use crate::core::connection::Connection;
use crate::core::event::{MessageEvent, ServerEvent};
use crate::core::membership::RoomMembership;
use crate::core::registry::ConnectionRegistry;

/// Shared relay state: the only mutable state in the process.
///
/// All mutation goes through the write side of the locks; fan-out reads
/// snapshots so it never holds a lock while pushing to connections.
pub struct RelayManager {
    registry: Arc<RwLock<ConnectionRegistry>>,
    membership: Arc<RwLock<RoomMembership>>,
}

impl RelayManager {
    /// Create a new relay manager with empty registries
    pub fn new() -> Self {
        Self {
            registry: Arc::new(RwLock::new(ConnectionRegistry::new())),
            membership: Arc::new(RwLock::new(RoomMembership::new())),
        }
    }

    /// Register a connection for a user identity and return its handle
    pub async fn register_connection(
        &self,
        user_id: String,
        sender: mpsc::UnboundedSender<WsMessage>,
    ) -> Connection {
        let connection = Connection::new(user_id, sender);
        let mut registry = self.registry.write().await;
        registry.register(connection.clone());
        log::info!(
            "Connection {} registered for user {} ({} total)",
            connection.id,
            connection.user_id,
            registry.connection_count()
        );
        connection
    }

    /// Unregister a connection on disconnect or send failure.
    ///
    /// Safe to call for connections that were never registered. When this
    /// was the user's last connection, their room memberships are dropped
    /// with it so stale edges do not accumulate.
    pub async fn unregister_connection(&self, connection_id: &str) {
        let departed_user = {
            let mut registry = self.registry.write().await;
            match registry.unregister(connection_id) {
                Some(user_id) if !registry.is_online(&user_id) => Some(user_id),
                Some(_) => None,
                None => return,
            }
        };

        if let Some(user_id) = departed_user {
            let rooms = self.membership.write().await.remove_user(&user_id);
            if !rooms.is_empty() {
                log::debug!(
                    "User {} went offline, left {} room(s)",
                    user_id,
                    rooms.len()
                );
            }
        }
        log::info!("Connection {} unregistered", connection_id);
    }

    /// Subscribe a user to a room's message events
    pub async fn join_room(&self, room_id: String, user_id: String) {
        log::debug!("User {} joined room {}", user_id, room_id);
        self.membership.write().await.join(room_id, user_id);
    }

    /// Unsubscribe a user from a room
    pub async fn leave_room(&self, room_id: &str, user_id: &str) {
        log::debug!("User {} left room {}", user_id, room_id);
        self.membership.write().await.leave(room_id, user_id);
    }

    /// Fan a message event out to the room's members.
    ///
    /// Recipients come from the event's explicit list when present,
    /// otherwise from the membership cache. The sender's own connections
    /// are always skipped. Returns the number of successful pushes.
    pub async fn deliver(&self, event: &MessageEvent) -> usize {
        let recipients = match &event.recipients {
            Some(list) => list.clone(),
            None => self
                .membership
                .read()
                .await
                .members_of(&event.room_id)
                .into_iter()
                .collect(),
        };

        if recipients.is_empty() {
            log::debug!(
                "No recipients for message to room {}, dropping",
                event.room_id
            );
            return 0;
        }

        let outbound = ServerEvent::notification(event);
        let text = match serde_json::to_string(&outbound) {
            Ok(text) => text,
            Err(e) => {
                log::error!("Failed to serialize notification: {}", e);
                return 0;
            }
        };

        // Snapshot the connections up front so pushes happen lock-free
        let connections: Vec<Connection> = {
            let registry = self.registry.read().await;
            recipients
                .iter()
                .filter(|member| **member != event.sender)
                .flat_map(|member| registry.connections_for(member))
                .collect()
        };

        let mut delivered = 0;
        let mut dead = Vec::new();
        for connection in &connections {
            if connection.send_text(&text) {
                delivered += 1;
            } else {
                // Push failure means the socket is gone; reap it below and
                // keep fanning out to the remaining recipients.
                dead.push(connection.id.clone());
            }
        }

        for connection_id in dead {
            self.unregister_connection(&connection_id).await;
        }

        log::debug!(
            "Delivered message from {} to {} connection(s) in room {}",
            event.sender,
            delivered,
            event.room_id
        );
        delivered
    }

    /// Send an event to every live connection of a single user
    pub async fn send_to_user(&self, user_id: &str, event: &ServerEvent) -> usize {
        let text = match serde_json::to_string(event) {
            Ok(text) => text,
            Err(e) => {
                log::error!("Failed to serialize event for user {}: {}", user_id, e);
                return 0;
            }
        };

        let connections = self.registry.read().await.connections_for(user_id);
        connections
            .iter()
            .filter(|conn| conn.send_text(&text))
            .count()
    }

    /// Current number of live connections
    pub async fn connection_count(&self) -> usize {
        self.registry.read().await.connection_count()
    }

    /// Current number of rooms with members
    pub async fn room_count(&self) -> usize {
        self.membership.read().await.room_count()
    }

    /// Snapshot of a room's members
    pub async fn room_members(&self, room_id: &str) -> Vec<String> {
        self.membership
            .read()
            .await
            .members_of(room_id)
            .into_iter()
            .collect()
    }

    /// Start periodic reaping of connections whose outbound queue closed
    pub fn start_sweep_task(self: Arc<Self>, sweep_interval: Duration) {
        let relay = Arc::clone(&self);
        tokio::spawn(async move {
            let mut ticker = interval(sweep_interval);
            loop {
                ticker.tick().await;
                relay.sweep_closed_connections().await;
            }
        });
    }

    async fn sweep_closed_connections(&self) {
        let closed = self.registry.read().await.closed_connections();
        if closed.is_empty() {
            return;
        }
        log::info!("Sweeping {} closed connection(s)", closed.len());
        for connection_id in closed {
            self.unregister_connection(&connection_id).await;
        }
    }
}

impl Default for RelayManager {
    fn default() -> Self {
        Self::new()
    }
}

// Shared reference to the relay manager
pub type SharedRelayManager = Arc<RelayManager>;
