//! Wire frames for the websocket channel.
//!
//! All frames are JSON text messages tagged by `event`:
//!
//! ```json
//! // Client -> Server
//! {"event": "join:room", "data": {"room": "advisors"}}
//! {"event": "send:message", "data": {"room": null, "content": "hi all"}}
//!
//! // Server -> Client
//! {"event": "receive:message", "data": {"id": 7, "content": "...", ...}}
//! ```

use serde::{Deserialize, Serialize};

use crate::database::models::MessageView;

/// Frames a connected client may send.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientFrame {
    /// Subscribe this connection to an ad hoc room.
    #[serde(rename = "join:room")]
    JoinRoom { room: String },
    /// Relay-only broadcast to a room (or everyone). Never persisted.
    #[serde(rename = "send:message")]
    SendMessage {
        room: Option<String>,
        content: String,
    },
}

/// Frames the server pushes to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerFrame {
    #[serde(rename = "receive:message")]
    ReceiveMessage(MessagePayload),
    #[serde(rename = "room:joined")]
    RoomJoined { room: String },
    #[serde(rename = "error")]
    Error { message: String },
}

/// Notification payload for `receive:message`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePayload {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub content: String,
    pub timestamp: String,
    pub priority: String,
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl From<&MessageView> for MessagePayload {
    fn from(view: &MessageView) -> Self {
        let title = if view.message_type == "Broadcast" {
            view.subject.clone()
        } else {
            None
        };
        Self {
            id: view.id,
            sender: view.sender_name.clone(),
            subject: view.subject.clone(),
            content: view.content.clone(),
            timestamp: view.created_at.and_utc().to_rfc3339(),
            priority: view.priority.clone(),
            message_type: view.message_type.clone(),
            title,
        }
    }
}
