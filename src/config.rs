//! Server configuration module
//! Handles dynamic configuration parameters for the relay server

use crate::constants::{DEFAULT_HOST, DEFAULT_PORT, DEFAULT_SWEEP_INTERVAL_SECS};
use crate::error::{ChatRelayError, Result};
use std::env;
use std::time::Duration;

/// Server configuration parameters
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Interval between sweeps for closed connections
    pub sweep_interval: Duration,
    /// Whether the closed-connection sweep task runs at all
    pub enable_sweep: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            enable_sweep: true,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables if available
    pub fn from_env() -> Result<Self> {
        let host = env::var("CHAT_RELAY_HOST").unwrap_or(DEFAULT_HOST.to_string());
        let port = match env::var("CHAT_RELAY_PORT") {
            Ok(p) => p.parse().map_err(|_| {
                ChatRelayError::ConfigError(format!("Invalid CHAT_RELAY_PORT value: {}", p))
            })?,
            Err(_) => DEFAULT_PORT,
        };

        let sweep_secs = env::var("CHAT_RELAY_SWEEP_INTERVAL")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS);

        let enable_sweep = env::var("CHAT_RELAY_ENABLE_SWEEP")
            .map(|v| v.to_lowercase() == "true" || v == "1")
            .unwrap_or(true);

        Ok(Self {
            host,
            port,
            sweep_interval: Duration::from_secs(sweep_secs),
            enable_sweep,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.enable_sweep);
    }

    #[test]
    fn test_from_env_uses_defaults_when_unset() {
        env::remove_var("CHAT_RELAY_HOST");
        env::remove_var("CHAT_RELAY_PORT");

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(
            config.sweep_interval,
            Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS)
        );
    }
}
