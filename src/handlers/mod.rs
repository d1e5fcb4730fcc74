//! Request handlers for the relay server

pub mod websocket;

pub use websocket::handle_ws_client;
