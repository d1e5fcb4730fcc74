//! Core functionality for the relay server

pub mod connection;
pub mod event;
pub mod membership;
pub mod registry;
pub mod relay;

// Re-export main components for convenience
pub use connection::Connection;
pub use event::{ClientEvent, MessageEvent, ServerEvent};
pub use membership::RoomMembership;
pub use registry::ConnectionRegistry;
pub use relay::{RelayManager, SharedRelayManager};
