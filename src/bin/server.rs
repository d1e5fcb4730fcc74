use log::{error, info, warn};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::{self, Filter};

use chat_relay::config::ServerConfig;
use chat_relay::constants::WS_PATH;
use chat_relay::core::relay::{RelayManager, SharedRelayManager};
use chat_relay::handlers::websocket::handle_ws_client;

#[tokio::main]
async fn main() {
    // Initialize env
    match dotenvy::dotenv() {
        Ok(_) => info!("Environment variables loaded from .env file"),
        Err(e) => warn!("Failed to load .env file: {}", e),
    };

    // Initialize logging
    env_logger::init();

    // Load config from the environment
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Configuration: host={}, port={}", config.host, config.port);

    // Create the shared relay state
    let relay: SharedRelayManager = Arc::new(RelayManager::new());

    if config.enable_sweep {
        Arc::clone(&relay).start_sweep_task(config.sweep_interval);
    }

    // Create WebSocket route
    let ws_route = warp::path(WS_PATH)
        .and(warp::ws())
        .and(with_relay(relay.clone()))
        .map(|ws: warp::ws::Ws, relay| {
            info!("New websocket connection");
            ws.on_upgrade(move |socket| handle_ws_client(socket, relay))
        });

    // Create health check route
    let health_route = warp::path("health").map(|| "OK");

    // Combine routes
    let routes = ws_route.or(health_route);

    // Build the server address
    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!("Failed to parse server address: {}", e);
            std::process::exit(1);
        }
    };

    // Start the server
    info!("Starting chat relay server on {}", addr);

    warp::serve(routes).run(addr).await;
}

// Helper function to include the relay state in requests
fn with_relay(
    relay: SharedRelayManager,
) -> impl Filter<Extract = (SharedRelayManager,), Error = Infallible> + Clone {
    warp::any().map(move || relay.clone())
}
