// Public handlers: no authentication required.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::database::models::UserSummary;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "identifier is required"))]
    pub identifier: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserSummary,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<LoginResponse> {
    body.validate()?;

    let outcome = services::auth::login(&state.pool, &body.identifier, &body.password).await?;
    Ok(ApiResponse::success(LoginResponse {
        token: outcome.token,
        user: outcome.user,
    }))
}

/// GET /health
pub async fn health() -> &'static str {
    "OK"
}
