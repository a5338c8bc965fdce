use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Deserialize;
use validator::Validate;

use crate::database::models::{ScheduleItem, SectionBasic, SectionView};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ADMINS};
use crate::services::{schedules, sections};
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSectionRequest {
    pub course_id: i64,
    pub semester_id: i64,
    #[validate(length(equal = 1, message = "letter must be a single character"))]
    pub letter: String,
    pub faculty_user_id: Option<String>,
}

/// GET /api/sections
pub async fn list_sections(State(state): State<AppState>) -> ApiResult<Vec<SectionView>> {
    let sections = sections::list_sections(&state.pool).await?;
    Ok(ApiResponse::success(sections))
}

/// GET /api/sections/basic
pub async fn list_sections_basic(State(state): State<AppState>) -> ApiResult<Vec<SectionBasic>> {
    let sections = sections::list_sections_basic(&state.pool).await?;
    Ok(ApiResponse::success(sections))
}

/// GET /api/sections/:id
pub async fn get_section(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<SectionView> {
    let section = sections::get_section(&state.pool, id).await?;
    Ok(ApiResponse::success(section))
}

/// POST /api/sections (admin, superuser)
pub async fn create_section(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateSectionRequest>,
) -> ApiResult<SectionView> {
    auth.require_any(ADMINS)?;
    body.validate()?;

    let letter = body
        .letter
        .chars()
        .next()
        .filter(|c| c.is_ascii_alphabetic())
        .ok_or_else(|| ApiError::bad_request("letter must be an ASCII letter"))?;

    let section = sections::create_section(
        &state.pool,
        sections::NewSection {
            course_id: body.course_id,
            semester_id: body.semester_id,
            letter,
            faculty_user_id: body.faculty_user_id,
        },
    )
    .await?;
    Ok(ApiResponse::created(section))
}

/// DELETE /api/sections/:id (admin, superuser)
pub async fn delete_section(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    auth.require_any(ADMINS)?;
    sections::delete_section(&state.pool, id).await?;
    Ok(ApiResponse::success(()).with_message("Section deleted"))
}

#[derive(Debug, Deserialize)]
pub struct AssignFacultyRequest {
    pub faculty_user_id: Option<String>,
}

/// PUT /api/sections/:id/faculty (admin, superuser)
pub async fn assign_faculty(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(body): Json<AssignFacultyRequest>,
) -> ApiResult<SectionView> {
    auth.require_any(ADMINS)?;
    let section = sections::assign_faculty(&state.pool, id, body.faculty_user_id).await?;
    Ok(ApiResponse::success(section))
}

#[derive(Debug, Deserialize, Validate)]
pub struct EnrollRequest {
    #[validate(length(min = 1, message = "student_user_id is required"))]
    pub student_user_id: String,
}

/// POST /api/sections/:id/enroll (admin, superuser)
pub async fn enroll_student(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(body): Json<EnrollRequest>,
) -> ApiResult<()> {
    auth.require_any(ADMINS)?;
    body.validate()?;

    sections::enroll_student(&state.pool, id, &body.student_user_id).await?;
    Ok(ApiResponse::created(()).with_message("Student enrolled"))
}

/// DELETE /api/sections/:id/enroll (admin, superuser)
pub async fn unenroll_student(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(body): Json<EnrollRequest>,
) -> ApiResult<()> {
    auth.require_any(ADMINS)?;
    sections::unenroll_student(&state.pool, id, &body.student_user_id).await?;
    Ok(ApiResponse::success(()).with_message("Student unenrolled"))
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddMeetingRequest {
    #[validate(range(min = 0, max = 6, message = "day_of_week must be 0-6"))]
    pub day_of_week: i64,
    #[validate(length(equal = 5, message = "start_time must be HH:MM"))]
    pub start_time: String,
    #[validate(length(equal = 5, message = "end_time must be HH:MM"))]
    pub end_time: String,
    #[validate(length(min = 1, message = "room is required"))]
    pub room: String,
}

/// GET /api/sections/:id/schedule
pub async fn list_section_schedule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<ScheduleItem>> {
    let items = schedules::list_for_section(&state.pool, id).await?;
    Ok(ApiResponse::success(items))
}

/// POST /api/sections/:id/schedule (admin, superuser)
pub async fn add_meeting(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(body): Json<AddMeetingRequest>,
) -> ApiResult<ScheduleItem> {
    auth.require_any(ADMINS)?;
    body.validate()?;

    let item = schedules::add_meeting(
        &state.pool,
        id,
        schedules::NewMeeting {
            day_of_week: body.day_of_week,
            start_time: body.start_time,
            end_time: body.end_time,
            room: body.room,
        },
    )
    .await?;
    Ok(ApiResponse::created(item))
}
