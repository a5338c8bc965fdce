use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::Deserialize;
use validator::Validate;

use crate::auth::Role;
use crate::database::models::{Department, UserSummary};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::users::{self, NewUser, UserUpdate};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
    pub role: Role,
    pub department_id: Option<i64>,
    pub enrollment_year: Option<i64>,
    pub designation: Option<String>,
    pub office: Option<String>,
}

/// POST /api/users (admin, superuser)
pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<CreateUserRequest>,
) -> ApiResult<UserSummary> {
    body.validate()?;

    let user = users::create_user(
        &state.pool,
        NewUser {
            name: body.name,
            email: body.email,
            password: body.password,
            role: body.role,
            department_id: body.department_id,
            enrollment_year: body.enrollment_year,
            designation: body.designation,
            office: body.office,
        },
    )
    .await?;
    Ok(ApiResponse::created(user))
}

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub role: Option<String>,
}

/// GET /api/users (admin, superuser)
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<ListUsersQuery>,
) -> ApiResult<Vec<UserSummary>> {
    let role_filter = match query.role.as_deref() {
        Some(raw) => Some(
            raw.parse::<Role>()
                .map_err(|e| ApiError::bad_request(e))?,
        ),
        None => None,
    };

    let users = users::list_users(&state.pool, role_filter).await?;
    Ok(ApiResponse::success(users))
}

/// GET /api/users/me
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<UserSummary> {
    let user = users::get_user(&state.pool, &auth.id).await?;
    Ok(ApiResponse::success(user))
}

/// GET /api/users/departments
pub async fn departments(State(state): State<AppState>) -> ApiResult<Vec<Department>> {
    let departments = users::list_departments(&state.pool).await?;
    Ok(ApiResponse::success(departments))
}

/// GET /api/users/:id (admin, superuser)
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<UserSummary> {
    let user = users::get_user(&state.pool, &id).await?;
    Ok(ApiResponse::success(user))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, message = "name cannot be empty"))]
    pub name: Option<String>,
    #[validate(email(message = "must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: Option<String>,
    pub profile_picture: Option<String>,
    // Doubly optional: absent leaves the department alone, null clears it
    #[serde(default, deserialize_with = "double_option")]
    pub department_id: Option<Option<i64>>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<i64>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}

/// PUT /api/users/:id (admin, superuser)
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateUserRequest>,
) -> ApiResult<UserSummary> {
    body.validate()?;

    let user = users::update_user(
        &state.pool,
        &id,
        UserUpdate {
            name: body.name,
            email: body.email,
            password: body.password,
            profile_picture: body.profile_picture,
            department_id: body.department_id,
        },
    )
    .await?;
    Ok(ApiResponse::success(user))
}

/// DELETE /api/users/:id (admin, superuser)
pub async fn delete_user(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<()> {
    users::delete_user(&state.pool, &id).await?;
    Ok(ApiResponse::success(()).with_message("User deleted"))
}
