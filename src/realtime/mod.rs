//! Realtime push gateway.
//!
//! One `Gateway` lives in `AppState`. Every websocket connection joins its
//! personal room (`user:<id>`) and the global broadcast channel; ad hoc rooms
//! are created on first subscribe. Delivery is fire-and-forget: publishing to
//! a room nobody listens to is a no-op, and missed frames are never replayed
//! (a late connector sees the message on its next poll instead).

pub mod connection;
pub mod protocol;

use std::collections::HashMap;

use tokio::sync::{broadcast, RwLock};

pub use connection::ws_handler;
pub use protocol::{ClientFrame, MessagePayload, ServerFrame};

const ROOM_CAPACITY: usize = 256;

pub struct Gateway {
    rooms: RwLock<HashMap<String, broadcast::Sender<ServerFrame>>>,
    all: broadcast::Sender<ServerFrame>,
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new()
    }
}

impl Gateway {
    pub fn new() -> Self {
        let (all, _) = broadcast::channel(ROOM_CAPACITY);
        Self {
            rooms: RwLock::new(HashMap::new()),
            all,
        }
    }

    pub fn user_room(user_id: &str) -> String {
        format!("user:{}", user_id)
    }

    /// Subscribe to a room, creating its channel on first use.
    pub async fn subscribe_room(&self, room: &str) -> broadcast::Receiver<ServerFrame> {
        let mut rooms = self.rooms.write().await;
        rooms
            .entry(room.to_string())
            .or_insert_with(|| broadcast::channel(ROOM_CAPACITY).0)
            .subscribe()
    }

    /// Subscribe to the global broadcast channel every connection receives.
    pub fn subscribe_all(&self) -> broadcast::Receiver<ServerFrame> {
        self.all.subscribe()
    }

    /// Push a frame to one user's personal room.
    pub async fn publish_to_user(&self, user_id: &str, frame: ServerFrame) {
        self.publish_room(&Self::user_room(user_id), frame).await;
    }

    /// Push a frame to a room. A room that was never subscribed, or whose
    /// subscribers have all disconnected, swallows the frame silently.
    pub async fn publish_room(&self, room: &str, frame: ServerFrame) {
        let rooms = self.rooms.read().await;
        if let Some(tx) = rooms.get(room) {
            let _ = tx.send(frame);
        }
    }

    /// Push a frame to every connected client.
    pub async fn publish_all(&self, frame: ServerFrame) {
        let _ = self.all.send(frame);
    }

    /// Drop room channels nobody listens to anymore. Called on disconnect.
    pub async fn prune(&self) {
        let mut rooms = self.rooms.write().await;
        rooms.retain(|_, tx| tx.receiver_count() > 0);
    }

    #[cfg(test)]
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_frame(content: &str) -> ServerFrame {
        ServerFrame::ReceiveMessage(MessagePayload {
            id: 1,
            sender: None,
            subject: None,
            content: content.to_string(),
            timestamp: "2024-09-01T12:00:00+00:00".to_string(),
            priority: "Normal".to_string(),
            message_type: "Direct".to_string(),
            title: None,
        })
    }

    #[tokio::test]
    async fn publish_reaches_room_subscriber() {
        let gateway = Gateway::new();
        let mut rx = gateway.subscribe_room("user:STU-1").await;
        gateway.publish_to_user("STU-1", test_frame("hello")).await;
        let frame = rx.recv().await.unwrap();
        match frame {
            ServerFrame::ReceiveMessage(payload) => assert_eq!(payload.content, "hello"),
            other => panic!("unexpected frame: {:?}", other),
        }
    }

    #[tokio::test]
    async fn publish_to_absent_room_is_silent() {
        let gateway = Gateway::new();
        // No subscribers anywhere: must not panic or error
        gateway.publish_to_user("STU-404", test_frame("lost")).await;
        gateway.publish_all(test_frame("lost too")).await;
    }

    #[tokio::test]
    async fn broadcast_reaches_all_subscribers() {
        let gateway = Gateway::new();
        let mut a = gateway.subscribe_all();
        let mut b = gateway.subscribe_all();
        gateway.publish_all(test_frame("everyone")).await;
        assert!(matches!(a.recv().await, Ok(ServerFrame::ReceiveMessage(_))));
        assert!(matches!(b.recv().await, Ok(ServerFrame::ReceiveMessage(_))));
    }

    #[tokio::test]
    async fn prune_drops_abandoned_rooms() {
        let gateway = Gateway::new();
        {
            let _rx = gateway.subscribe_room("user:FAC-9").await;
            assert_eq!(gateway.room_count().await, 1);
        }
        gateway.prune().await;
        assert_eq!(gateway.room_count().await, 0);
    }
}
