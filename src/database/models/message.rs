use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    Direct,
    Broadcast,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Direct => "Direct",
            MessageType::Broadcast => "Broadcast",
        }
    }
}

impl std::str::FromStr for MessageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Direct" => Ok(MessageType::Direct),
            "Broadcast" => Ok(MessageType::Broadcast),
            other => Err(format!("unknown message type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessagePriority {
    Normal,
    Urgent,
    Critical,
}

impl MessagePriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessagePriority::Normal => "Normal",
            MessagePriority::Urgent => "Urgent",
            MessagePriority::Critical => "Critical",
        }
    }
}

impl std::str::FromStr for MessagePriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Normal" => Ok(MessagePriority::Normal),
            "Urgent" => Ok(MessagePriority::Urgent),
            "Critical" => Ok(MessagePriority::Critical),
            other => Err(format!("unknown priority: {}", other)),
        }
    }
}

/// Message as listed in `/api/messages/my`, sender name joined in.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MessageView {
    pub id: i64,
    pub sender_id: Option<String>,
    pub sender_name: Option<String>,
    pub receiver_id: Option<String>,
    pub subject: Option<String>,
    pub content: String,
    pub message_type: String,
    pub priority: String,
    pub is_read: bool,
    pub created_at: NaiveDateTime,
}
