use axum::extract::{Path, State};
use axum::Extension;

use crate::database::models::MeetingView;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ADMINS};
use crate::services::schedules;
use crate::state::AppState;

/// GET /api/schedules/my
pub async fn my_schedule(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Vec<MeetingView>> {
    let meetings = schedules::my_schedule(&state.pool, &auth.id, auth.role).await?;
    Ok(ApiResponse::success(meetings))
}

/// DELETE /api/schedules/:id (admin, superuser)
pub async fn remove_meeting(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    auth.require_any(ADMINS)?;
    schedules::remove_meeting(&state.pool, id).await?;
    Ok(ApiResponse::success(()).with_message("Meeting removed"))
}
