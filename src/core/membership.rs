//! Room membership: room identity -> subscribed user identities
//!
//! Membership only grants delivery eligibility. It never implies the user
//! has a live connection at send time; that is the registry's concern.

use std::collections::{HashMap, HashSet};

/// Many-to-many room/user membership edges
pub struct RoomMembership {
    /// room_id -> member user ids
    rooms: HashMap<String, HashSet<String>>,
    /// user_id -> rooms joined, for cleanup on disconnect
    user_rooms: HashMap<String, HashSet<String>>,
}

impl RoomMembership {
    pub fn new() -> Self {
        Self {
            rooms: HashMap::new(),
            user_rooms: HashMap::new(),
        }
    }

    /// Add a membership edge. Idempotent; unknown rooms are created lazily.
    ///
    /// No validation against the chat store happens here. Authorization is
    /// the gateway's (or an upstream collaborator's) responsibility.
    pub fn join(&mut self, room_id: String, user_id: String) {
        self.rooms
            .entry(room_id.clone())
            .or_default()
            .insert(user_id.clone());
        self.user_rooms.entry(user_id).or_default().insert(room_id);
    }

    /// Remove a membership edge. No-op when the edge does not exist.
    pub fn leave(&mut self, room_id: &str, user_id: &str) {
        if let Some(members) = self.rooms.get_mut(room_id) {
            members.remove(user_id);
            if members.is_empty() {
                self.rooms.remove(room_id);
            }
        }
        if let Some(rooms) = self.user_rooms.get_mut(user_id) {
            rooms.remove(room_id);
            if rooms.is_empty() {
                self.user_rooms.remove(user_id);
            }
        }
    }

    /// Drop every membership a user holds, e.g. when their session ends.
    /// Returns the rooms the user was removed from.
    pub fn remove_user(&mut self, user_id: &str) -> Vec<String> {
        let rooms: Vec<String> = self
            .user_rooms
            .remove(user_id)
            .map(|set| set.into_iter().collect())
            .unwrap_or_default();

        for room_id in &rooms {
            if let Some(members) = self.rooms.get_mut(room_id) {
                members.remove(user_id);
                if members.is_empty() {
                    self.rooms.remove(room_id);
                }
            }
        }

        rooms
    }

    /// Snapshot of the room's current members (empty for unknown rooms)
    pub fn members_of(&self, room_id: &str) -> HashSet<String> {
        self.rooms.get(room_id).cloned().unwrap_or_default()
    }

    /// Whether the user has joined the room
    pub fn is_member(&self, room_id: &str, user_id: &str) -> bool {
        self.rooms
            .get(room_id)
            .map(|members| members.contains(user_id))
            .unwrap_or(false)
    }

    /// Snapshot of the rooms a user has joined
    pub fn rooms_of(&self, user_id: &str) -> Vec<String> {
        self.user_rooms
            .get(user_id)
            .map(|rooms| rooms.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of rooms with at least one member
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

impl Default for RoomMembership {
    fn default() -> Self {
        Self::new()
    }
}
