//! Connection registry: user identity -> live connections
//!
//! Lookups are O(1) in the identity and return snapshots, so a concurrent
//! unregister can never corrupt an in-flight fan-out iteration.

use std::collections::HashMap;

use crate::core::connection::Connection;

/// Tracks every live connection, indexed by owning user identity
pub struct ConnectionRegistry {
    /// user_id -> (connection_id -> connection)
    connections: HashMap<String, HashMap<String, Connection>>,
    /// connection_id -> user_id, for O(1) unregister
    owners: HashMap<String, String>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: HashMap::new(),
            owners: HashMap::new(),
        }
    }

    /// Register a connection under its user identity.
    ///
    /// Idempotent: re-registering the same connection replaces the stored
    /// entry. A user may hold any number of simultaneous connections.
    pub fn register(&mut self, connection: Connection) {
        self.owners
            .insert(connection.id.clone(), connection.user_id.clone());
        self.connections
            .entry(connection.user_id.clone())
            .or_default()
            .insert(connection.id.clone(), connection);
    }

    /// Remove a connection on disconnect or send failure.
    ///
    /// Never fails: unregistering an unknown connection is a no-op.
    /// Returns the owning user id when the connection was registered.
    pub fn unregister(&mut self, connection_id: &str) -> Option<String> {
        let user_id = self.owners.remove(connection_id)?;
        if let Some(conns) = self.connections.get_mut(&user_id) {
            conns.remove(connection_id);
            if conns.is_empty() {
                self.connections.remove(&user_id);
            }
        }
        Some(user_id)
    }

    /// Snapshot of the user's live connections (empty for unknown users)
    pub fn connections_for(&self, user_id: &str) -> Vec<Connection> {
        self.connections
            .get(user_id)
            .map(|conns| conns.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether the user has at least one live connection
    pub fn is_online(&self, user_id: &str) -> bool {
        self.connections.contains_key(user_id)
    }

    /// Total number of live connections across all users
    pub fn connection_count(&self) -> usize {
        self.owners.len()
    }

    /// Number of distinct users with at least one connection
    pub fn user_count(&self) -> usize {
        self.connections.len()
    }

    /// Ids of connections whose outbound queue has been closed
    pub fn closed_connections(&self) -> Vec<String> {
        self.owners
            .keys()
            .filter(|id| {
                self.connection(id)
                    .map(|conn| conn.is_closed())
                    .unwrap_or(true)
            })
            .cloned()
            .collect()
    }

    fn connection(&self, connection_id: &str) -> Option<&Connection> {
        let user_id = self.owners.get(connection_id)?;
        self.connections.get(user_id)?.get(connection_id)
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
