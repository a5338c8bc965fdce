use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Deserialize;
use validator::Validate;

use crate::database::models::{MessagePriority, MessageType, MessageView};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ADMINS, STAFF};
use crate::services::messages::{self, NewMessage};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMessageRequest {
    pub receiver_id: Option<String>,
    pub subject: Option<String>,
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(default = "default_priority")]
    pub priority: String,
}

fn default_priority() -> String {
    "Normal".to_string()
}

/// POST /api/messages (faculty, admin, superuser)
pub async fn create_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateMessageRequest>,
) -> ApiResult<MessageView> {
    auth.require_any(STAFF)?;
    body.validate()?;

    let message_type: MessageType = body
        .message_type
        .parse()
        .map_err(|e: String| ApiError::bad_request(e))?;
    let priority: MessagePriority = body
        .priority
        .parse()
        .map_err(|e: String| ApiError::bad_request(e))?;

    let message = messages::create_message(
        &state.pool,
        &state.gateway,
        NewMessage {
            sender_id: Some(auth.id.clone()),
            receiver_id: body.receiver_id,
            subject: body.subject,
            content: body.content,
            message_type,
            priority,
        },
    )
    .await?;
    Ok(ApiResponse::created(message))
}

/// GET /api/messages (admin, superuser)
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Vec<MessageView>> {
    auth.require_any(ADMINS)?;
    let messages = messages::list_messages(&state.pool).await?;
    Ok(ApiResponse::success(messages))
}

/// GET /api/messages/my
pub async fn my_messages(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Vec<MessageView>> {
    let messages = messages::my_messages(&state.pool, &auth.id).await?;
    Ok(ApiResponse::success(messages))
}

/// PUT /api/messages/:id/read
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<MessageView> {
    let message = messages::mark_read(&state.pool, &auth.id, id).await?;
    Ok(ApiResponse::success(message))
}
