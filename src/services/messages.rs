use sqlx::SqlitePool;
use tracing::{debug, info, instrument};

use crate::database::models::{MessagePriority, MessageType, MessageView};
use crate::error::ApiError;
use crate::realtime::{Gateway, MessagePayload, ServerFrame};

#[derive(Debug, Clone)]
pub struct NewMessage {
    /// None for system-generated messages.
    pub sender_id: Option<String>,
    pub receiver_id: Option<String>,
    pub subject: Option<String>,
    pub content: String,
    pub message_type: MessageType,
    pub priority: MessagePriority,
}

/// Persist a message, then push it over the realtime gateway.
///
/// The push is fire-and-forget: with nobody connected the frame is dropped
/// and never replayed; clients that connect later pick the message up from
/// their next `/api/messages/my` fetch.
#[instrument(skip(pool, gateway, new), fields(message_type = new.message_type.as_str()))]
pub async fn create_message(
    pool: &SqlitePool,
    gateway: &Gateway,
    new: NewMessage,
) -> Result<MessageView, ApiError> {
    let receiver_id = match new.message_type {
        MessageType::Direct => match (&new.sender_id, &new.receiver_id) {
            (Some(_), Some(receiver)) => {
                let exists: Option<String> =
                    sqlx::query_scalar("SELECT id FROM users WHERE id = ?")
                        .bind(receiver)
                        .fetch_optional(pool)
                        .await?;
                if exists.is_none() {
                    return Err(ApiError::not_found(format!(
                        "Receiver {} not found",
                        receiver
                    )));
                }
                Some(receiver.clone())
            }
            _ => {
                return Err(ApiError::bad_request(
                    "Direct messages require both a sender and a receiver",
                ))
            }
        },
        // Broadcasts have no receiver; any supplied one is dropped
        MessageType::Broadcast => None,
    };

    let result = sqlx::query(
        "INSERT INTO messages (sender_id, receiver_id, subject, content, message_type, priority)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&new.sender_id)
    .bind(&receiver_id)
    .bind(&new.subject)
    .bind(&new.content)
    .bind(new.message_type.as_str())
    .bind(new.priority.as_str())
    .execute(pool)
    .await?;
    let id = result.last_insert_rowid();
    info!(message_id = id, "Message persisted");

    let view = get_message(pool, id).await?;

    let frame = ServerFrame::ReceiveMessage(MessagePayload::from(&view));
    match new.message_type {
        MessageType::Direct => {
            let receiver = receiver_id.as_deref().unwrap_or_default();
            gateway.publish_to_user(receiver, frame).await;
            debug!(message_id = id, receiver = %receiver, "Pushed direct message");
        }
        MessageType::Broadcast => {
            gateway.publish_all(frame).await;
            debug!(message_id = id, "Pushed broadcast message");
        }
    }

    Ok(view)
}

const MESSAGE_VIEW_SQL: &str = "
    SELECT m.id, m.sender_id, u.name AS sender_name, m.receiver_id,
           m.subject, m.content, m.message_type, m.priority, m.is_read, m.created_at
    FROM messages m
    LEFT JOIN users u ON u.id = m.sender_id
";

#[instrument(skip(pool))]
pub async fn get_message(pool: &SqlitePool, id: i64) -> Result<MessageView, ApiError> {
    let sql = format!("{} WHERE m.id = ?", MESSAGE_VIEW_SQL);
    let view: Option<MessageView> = sqlx::query_as(&sql).bind(id).fetch_optional(pool).await?;
    view.ok_or_else(|| ApiError::not_found(format!("Message {} not found", id)))
}

/// Direct messages addressed to the user plus every broadcast, newest first.
#[instrument(skip(pool))]
pub async fn my_messages(pool: &SqlitePool, user_id: &str) -> Result<Vec<MessageView>, ApiError> {
    let sql = format!(
        "{} WHERE (m.message_type = 'Direct' AND m.receiver_id = ?)
            OR m.message_type = 'Broadcast'
         ORDER BY m.created_at DESC, m.id DESC",
        MESSAGE_VIEW_SQL
    );
    let messages = sqlx::query_as(&sql).bind(user_id).fetch_all(pool).await?;
    Ok(messages)
}

#[instrument(skip(pool))]
pub async fn list_messages(pool: &SqlitePool) -> Result<Vec<MessageView>, ApiError> {
    let sql = format!("{} ORDER BY m.created_at DESC, m.id DESC", MESSAGE_VIEW_SQL);
    let messages = sqlx::query_as(&sql).fetch_all(pool).await?;
    Ok(messages)
}

/// Mark a direct message read. Only the receiver may do this; the read flag
/// is meaningless for broadcasts.
#[instrument(skip(pool))]
pub async fn mark_read(pool: &SqlitePool, user_id: &str, id: i64) -> Result<MessageView, ApiError> {
    let view = get_message(pool, id).await?;

    if view.message_type != "Direct" || view.receiver_id.as_deref() != Some(user_id) {
        return Err(ApiError::forbidden(
            "Only the receiver of a direct message can mark it read",
        ));
    }

    sqlx::query("UPDATE messages SET is_read = 1 WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    get_message(pool, id).await
}
