//! Chat Relay - a room-based WebSocket fan-out relay
//!
//! This library provides the in-memory connection registry, room
//! membership, and one-hop message fan-out behind a real-time chat
//! backend. Persistence, auth, and the HTTP CRUD surface are external
//! collaborators.

pub mod config;
pub mod constants;
pub mod core;
pub mod error;
pub mod handlers;

// Re-export main components
pub use config::*;
pub use constants::*;
