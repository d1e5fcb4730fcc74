// Fan-out behavior tests against the relay manager

use serde_json::{json, Value};
use tokio::sync::mpsc;
use warp::ws::Message;

use chat_relay::core::event::MessageEvent;
use chat_relay::core::relay::RelayManager;

// Drain everything currently queued on a connection's outbound channel
fn drain(rx: &mut mpsc::UnboundedReceiver<Message>) -> Vec<Value> {
    let mut received = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        let text = msg.to_str().expect("expected text frame");
        received.push(serde_json::from_str(text).expect("expected JSON frame"));
    }
    received
}

#[tokio::test]
async fn test_room_message_reaches_other_member_once() {
    let relay = RelayManager::new();

    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    let (tx_b, mut rx_b) = mpsc::unbounded_channel();
    relay.register_connection("alice".to_string(), tx_a).await;
    relay.register_connection("bob".to_string(), tx_b).await;
    relay.join_room("r1".to_string(), "alice".to_string()).await;
    relay.join_room("r1".to_string(), "bob".to_string()).await;

    let event = MessageEvent::new("alice".to_string(), "r1".to_string(), json!("hello"));
    let delivered = relay.deliver(&event).await;

    assert_eq!(delivered, 1);

    let to_bob = drain(&mut rx_b);
    assert_eq!(to_bob.len(), 1);
    assert_eq!(to_bob[0]["type"], "new_message");
    assert_eq!(to_bob[0]["payload"], "hello");
    assert_eq!(to_bob[0]["sender"], "alice");

    // The sender's own connection must receive nothing
    assert!(drain(&mut rx_a).is_empty());
}

#[tokio::test]
async fn test_sender_with_multiple_connections_receives_nothing() {
    let relay = RelayManager::new();

    let (tx_a1, mut rx_a1) = mpsc::unbounded_channel();
    let (tx_a2, mut rx_a2) = mpsc::unbounded_channel();
    let (tx_b, mut rx_b) = mpsc::unbounded_channel();
    relay.register_connection("alice".to_string(), tx_a1).await;
    relay.register_connection("alice".to_string(), tx_a2).await;
    relay.register_connection("bob".to_string(), tx_b).await;
    relay.join_room("r1".to_string(), "alice".to_string()).await;
    relay.join_room("r1".to_string(), "bob".to_string()).await;

    let event = MessageEvent::new("alice".to_string(), "r1".to_string(), json!("hi"));
    relay.deliver(&event).await;

    assert!(drain(&mut rx_a1).is_empty());
    assert!(drain(&mut rx_a2).is_empty());
    assert_eq!(drain(&mut rx_b).len(), 1);
}

#[tokio::test]
async fn test_multi_device_recipient_gets_push_on_each_connection() {
    let relay = RelayManager::new();

    let (tx_c1, mut rx_c1) = mpsc::unbounded_channel();
    let (tx_c2, mut rx_c2) = mpsc::unbounded_channel();
    let (tx_d, _rx_d) = mpsc::unbounded_channel();
    relay.register_connection("carol".to_string(), tx_c1).await;
    relay.register_connection("carol".to_string(), tx_c2).await;
    relay.register_connection("dave".to_string(), tx_d).await;
    relay.join_room("r1".to_string(), "carol".to_string()).await;
    relay.join_room("r1".to_string(), "dave".to_string()).await;

    let event = MessageEvent::new("dave".to_string(), "r1".to_string(), json!("ping"));
    let delivered = relay.deliver(&event).await;

    assert_eq!(delivered, 2);
    let first = drain(&mut rx_c1);
    let second = drain(&mut rx_c2);
    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_eq!(first[0]["payload"], "ping");
    assert_eq!(second[0]["payload"], "ping");
}

#[tokio::test]
async fn test_unknown_room_is_a_noop() {
    let relay = RelayManager::new();

    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    relay.register_connection("alice".to_string(), tx_a).await;

    let event = MessageEvent::new("alice".to_string(), "never-seen".to_string(), json!("x"));
    assert_eq!(relay.deliver(&event).await, 0);
    assert!(drain(&mut rx_a).is_empty());
}

#[tokio::test]
async fn test_explicit_recipient_list_overrides_membership() {
    let relay = RelayManager::new();

    let (tx_b, mut rx_b) = mpsc::unbounded_channel();
    let (tx_c, mut rx_c) = mpsc::unbounded_channel();
    relay.register_connection("bob".to_string(), tx_b).await;
    relay.register_connection("carol".to_string(), tx_c).await;
    // Only bob joined via the membership cache
    relay.join_room("r1".to_string(), "bob".to_string()).await;

    // But the event carries its own member list, mirroring the store
    let event = MessageEvent::with_recipients(
        "alice".to_string(),
        "r1".to_string(),
        vec!["carol".to_string()],
        json!("direct"),
    );
    let delivered = relay.deliver(&event).await;

    assert_eq!(delivered, 1);
    assert!(drain(&mut rx_b).is_empty());
    assert_eq!(drain(&mut rx_c).len(), 1);
}

#[tokio::test]
async fn test_offline_member_is_silently_skipped() {
    let relay = RelayManager::new();

    let (tx_a, _rx_a) = mpsc::unbounded_channel();
    relay.register_connection("alice".to_string(), tx_a).await;
    relay.join_room("r1".to_string(), "alice".to_string()).await;
    // bob is a member but has no live connection
    relay.join_room("r1".to_string(), "bob".to_string()).await;

    let event = MessageEvent::new("alice".to_string(), "r1".to_string(), json!("anyone?"));
    assert_eq!(relay.deliver(&event).await, 0);
}

#[tokio::test]
async fn test_failed_push_reaps_connection_and_continues() {
    let relay = RelayManager::new();

    let (tx_dead, rx_dead) = mpsc::unbounded_channel();
    let (tx_live, mut rx_live) = mpsc::unbounded_channel();
    relay.register_connection("bob".to_string(), tx_dead).await;
    drop(rx_dead); // bob's socket is already gone
    relay.register_connection("carol".to_string(), tx_live).await;
    relay.join_room("r1".to_string(), "bob".to_string()).await;
    relay.join_room("r1".to_string(), "carol".to_string()).await;
    relay.join_room("r1".to_string(), "alice".to_string()).await;

    let event = MessageEvent::new("alice".to_string(), "r1".to_string(), json!("still there?"));
    let delivered = relay.deliver(&event).await;

    // carol still got her push, bob's dead connection was unregistered
    assert_eq!(delivered, 1);
    assert_eq!(drain(&mut rx_live).len(), 1);
    assert_eq!(relay.connection_count().await, 1);
}

#[tokio::test]
async fn test_disconnect_drops_memberships_with_last_connection() {
    let relay = RelayManager::new();

    let (tx_a, _rx_a) = mpsc::unbounded_channel();
    let conn = relay.register_connection("alice".to_string(), tx_a).await;
    relay.join_room("r1".to_string(), "alice".to_string()).await;
    relay.join_room("r2".to_string(), "alice".to_string()).await;
    assert_eq!(relay.room_count().await, 2);

    relay.unregister_connection(&conn.id).await;

    assert_eq!(relay.connection_count().await, 0);
    assert_eq!(relay.room_count().await, 0);
    assert!(relay.room_members("r1").await.is_empty());
}

#[tokio::test]
async fn test_memberships_survive_while_another_device_remains() {
    let relay = RelayManager::new();

    let (tx_a1, _rx_a1) = mpsc::unbounded_channel();
    let (tx_a2, _rx_a2) = mpsc::unbounded_channel();
    let first = relay.register_connection("alice".to_string(), tx_a1).await;
    relay.register_connection("alice".to_string(), tx_a2).await;
    relay.join_room("r1".to_string(), "alice".to_string()).await;

    relay.unregister_connection(&first.id).await;

    // alice still has a device online, so her membership stands
    assert_eq!(relay.room_members("r1").await, vec!["alice".to_string()]);
}

#[tokio::test]
async fn test_unregister_unknown_connection_is_noop() {
    let relay = RelayManager::new();

    let (tx_a, _rx_a) = mpsc::unbounded_channel();
    relay.register_connection("alice".to_string(), tx_a).await;

    relay.unregister_connection("no-such-connection").await;
    assert_eq!(relay.connection_count().await, 1);
}
