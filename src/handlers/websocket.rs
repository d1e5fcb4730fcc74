use futures_util::sink::SinkExt;
use futures_util::stream::StreamExt;
use log::{debug, error, info, warn};
use tokio::sync::mpsc;
use warp::ws::{Message, WebSocket};

use crate::core::connection::Connection;
use crate::core::event::{ClientEvent, ServerEvent};
use crate::core::relay::SharedRelayManager;

// Handle a WebSocket connection: pure translation between wire events and
// registry/membership/relay calls. The gateway owns no state of its own.
pub async fn handle_ws_client(ws: WebSocket, relay: SharedRelayManager) {
    let (mut ws_tx, mut ws_rx) = ws.split();
    let (tx, rx) = mpsc::unbounded_channel();

    // Spawn a task to forward messages from our channel to the WebSocket.
    // Draining a single queue per connection preserves emission order.
    tokio::task::spawn(async move {
        let mut rx = rx;
        while let Some(message) = rx.recv().await {
            if let Err(e) = ws_tx.send(message).await {
                debug!("WebSocket send failed, closing forwarder: {}", e);
                break;
            }
        }
    });

    // Set on the first `setup` event; immutable for the connection lifetime
    let mut connection: Option<Connection> = None;

    while let Some(result) = ws_rx.next().await {
        match result {
            Ok(msg) => {
                // Only process text frames
                if msg.is_text() {
                    process_event(msg, &mut connection, &tx, &relay).await;
                }
            }
            Err(e) => {
                error!("WebSocket error: {}", e);
                break;
            }
        }
    }

    // Client disconnected
    if let Some(conn) = connection {
        relay.unregister_connection(&conn.id).await;
        info!(
            "Client disconnected: user {} ({} connections remain)",
            conn.user_id,
            relay.connection_count().await
        );
    }
}

// Process a single inbound event frame
async fn process_event(
    msg: Message,
    connection: &mut Option<Connection>,
    tx: &mpsc::UnboundedSender<Message>,
    relay: &SharedRelayManager,
) {
    let msg_str = match msg.to_str() {
        Ok(s) => s,
        Err(_) => {
            warn!("Failed to extract text from frame");
            return;
        }
    };

    // Malformed events are logged and dropped, never answered
    let event = match serde_json::from_str::<ClientEvent>(msg_str) {
        Ok(event) => event,
        Err(e) => {
            warn!("Failed to parse client event: {}", e);
            return;
        }
    };

    match event {
        ClientEvent::Setup { user_id } => {
            if let Some(conn) = connection {
                warn!(
                    "Connection {} sent setup twice, keeping user {}",
                    conn.id, conn.user_id
                );
                return;
            }

            let conn = relay.register_connection(user_id, tx.clone()).await;
            let ack = ServerEvent::Connected {
                user_id: conn.user_id.clone(),
                connection_id: conn.id.clone(),
            };
            match serde_json::to_string(&ack) {
                Ok(text) => {
                    if tx.send(Message::text(text)).is_err() {
                        error!("Failed to send connected ack to {}", conn.id);
                    }
                }
                Err(e) => error!("Failed to serialize connected ack: {}", e),
            }
            info!("Client identified as user {}", conn.user_id);
            *connection = Some(conn);
        }

        ClientEvent::JoinRoom { room_id } => match connection {
            Some(conn) => {
                relay.join_room(room_id, conn.user_id.clone()).await;
            }
            None => reject_unidentified(tx, "join_room"),
        },

        ClientEvent::LeaveRoom { room_id } => match connection {
            Some(conn) => {
                relay.leave_room(&room_id, &conn.user_id).await;
            }
            None => reject_unidentified(tx, "leave_room"),
        },

        ClientEvent::NewMessage { message } => match connection {
            Some(conn) => {
                if message.sender != conn.user_id {
                    warn!(
                        "Connection {} claims sender {} but identified as {}",
                        conn.id, message.sender, conn.user_id
                    );
                }
                let delivered = relay.deliver(&message).await;
                debug!(
                    "Message to room {} delivered to {} connection(s)",
                    message.room_id, delivered
                );
            }
            None => reject_unidentified(tx, "new_message"),
        },
    }
}

// Events other than setup require an identified connection
fn reject_unidentified(tx: &mpsc::UnboundedSender<Message>, event_name: &str) {
    warn!("Dropping {} from unidentified connection", event_name);
    let error = ServerEvent::Error {
        message: format!("{} requires setup first", event_name),
    };
    if let Ok(text) = serde_json::to_string(&error) {
        let _ = tx.send(Message::text(text));
    }
}
