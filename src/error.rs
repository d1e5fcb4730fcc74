use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum ChatRelayError {
    // Connection errors
    ConnectionError(String),
    ConnectionClosed,

    // Event errors
    EventParseError(String),
    MalformedEvent(String),

    // Gateway errors
    NotIdentified,

    // Configuration errors
    ConfigError(String),
}

impl fmt::Display for ChatRelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionError(msg) => write!(f, "Connection error: {}", msg),
            Self::ConnectionClosed => write!(f, "Connection closed unexpectedly"),
            Self::EventParseError(msg) => write!(f, "Event parse error: {}", msg),
            Self::MalformedEvent(msg) => write!(f, "Malformed event: {}", msg),
            Self::NotIdentified => write!(f, "Connection has not completed setup"),
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl Error for ChatRelayError {}

// Generic result type for the relay
pub type Result<T> = std::result::Result<T, ChatRelayError>;
