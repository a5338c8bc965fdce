use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Deserialize;
use validator::Validate;

use crate::database::models::{Course, Department, Semester};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, ADMINS};
use crate::services::catalog;
use crate::services::users;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDepartmentRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
}

/// GET /api/departments
pub async fn list_departments(State(state): State<AppState>) -> ApiResult<Vec<Department>> {
    let departments = users::list_departments(&state.pool).await?;
    Ok(ApiResponse::success(departments))
}

/// POST /api/departments (admin, superuser)
pub async fn create_department(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateDepartmentRequest>,
) -> ApiResult<Department> {
    auth.require_any(ADMINS)?;
    body.validate()?;

    let department = catalog::create_department(&state.pool, &body.name).await?;
    Ok(ApiResponse::created(department))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCourseRequest {
    #[validate(length(min = 1, message = "code is required"))]
    pub code: String,
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    #[validate(range(min = 1, max = 12, message = "credits must be between 1 and 12"))]
    pub credits: i64,
    pub department_id: Option<i64>,
}

/// GET /api/courses
pub async fn list_courses(State(state): State<AppState>) -> ApiResult<Vec<Course>> {
    let courses = catalog::list_courses(&state.pool).await?;
    Ok(ApiResponse::success(courses))
}

/// POST /api/courses (admin, superuser)
pub async fn create_course(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateCourseRequest>,
) -> ApiResult<Course> {
    auth.require_any(ADMINS)?;
    body.validate()?;

    let course = catalog::create_course(
        &state.pool,
        &body.code,
        &body.title,
        body.credits,
        body.department_id,
    )
    .await?;
    Ok(ApiResponse::created(course))
}

/// DELETE /api/courses/:id (admin, superuser)
pub async fn delete_course(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    auth.require_any(ADMINS)?;
    catalog::delete_course(&state.pool, id).await?;
    Ok(ApiResponse::success(()).with_message("Course deleted"))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSemesterRequest {
    #[validate(length(min = 1, message = "term is required"))]
    pub term: String,
    #[validate(range(min = 2000, max = 2100, message = "year is out of range"))]
    pub year: i64,
}

/// GET /api/semesters
pub async fn list_semesters(State(state): State<AppState>) -> ApiResult<Vec<Semester>> {
    let semesters = catalog::list_semesters(&state.pool).await?;
    Ok(ApiResponse::success(semesters))
}

/// POST /api/semesters (admin, superuser)
pub async fn create_semester(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateSemesterRequest>,
) -> ApiResult<Semester> {
    auth.require_any(ADMINS)?;
    body.validate()?;

    let semester = catalog::create_semester(&state.pool, &body.term, body.year).await?;
    Ok(ApiResponse::created(semester))
}

/// DELETE /api/semesters/:id (admin, superuser)
pub async fn delete_semester(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    auth.require_any(ADMINS)?;
    catalog::delete_semester(&state.pool, id).await?;
    Ok(ApiResponse::success(()).with_message("Semester deleted"))
}
