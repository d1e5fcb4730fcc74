// Fundamental configuration constants
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const WS_PATH: &str = "ws";

// Connection sweep configuration constants
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 30;
