use sqlx::SqlitePool;
use tracing::{info, instrument};

use crate::database::models::{Course, Department, Semester};
use crate::error::ApiError;

#[instrument(skip(pool))]
pub async fn create_department(pool: &SqlitePool, name: &str) -> Result<Department, ApiError> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM departments WHERE name = ?")
        .bind(name)
        .fetch_optional(pool)
        .await?;
    if existing.is_some() {
        return Err(ApiError::conflict("Department already exists"));
    }

    let result = sqlx::query("INSERT INTO departments (name) VALUES (?)")
        .bind(name)
        .execute(pool)
        .await?;
    info!(department = %name, "Department created");

    Ok(Department {
        id: result.last_insert_rowid(),
        name: name.to_string(),
    })
}

#[instrument(skip(pool))]
pub async fn list_courses(pool: &SqlitePool) -> Result<Vec<Course>, ApiError> {
    let courses = sqlx::query_as(
        "SELECT id, code, title, credits, department_id FROM courses ORDER BY code",
    )
    .fetch_all(pool)
    .await?;
    Ok(courses)
}

#[instrument(skip(pool, title))]
pub async fn create_course(
    pool: &SqlitePool,
    code: &str,
    title: &str,
    credits: i64,
    department_id: Option<i64>,
) -> Result<Course, ApiError> {
    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM courses WHERE code = ?")
        .bind(code)
        .fetch_optional(pool)
        .await?;
    if existing.is_some() {
        return Err(ApiError::conflict("Course code already exists"));
    }

    if let Some(dept_id) = department_id {
        let dept: Option<i64> = sqlx::query_scalar("SELECT id FROM departments WHERE id = ?")
            .bind(dept_id)
            .fetch_optional(pool)
            .await?;
        if dept.is_none() {
            return Err(ApiError::not_found(format!(
                "Department {} not found",
                dept_id
            )));
        }
    }

    let result =
        sqlx::query("INSERT INTO courses (code, title, credits, department_id) VALUES (?, ?, ?, ?)")
            .bind(code)
            .bind(title)
            .bind(credits)
            .bind(department_id)
            .execute(pool)
            .await?;
    info!(course = %code, "Course created");

    Ok(Course {
        id: result.last_insert_rowid(),
        code: code.to_string(),
        title: title.to_string(),
        credits,
        department_id,
    })
}

/// Deleting a course is blocked while sections still reference it.
#[instrument(skip(pool))]
pub async fn delete_course(pool: &SqlitePool, id: i64) -> Result<(), ApiError> {
    let sections: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sections WHERE course_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if sections > 0 {
        return Err(ApiError::bad_request(
            "Cannot delete a course that still has sections",
        ));
    }

    let result = sqlx::query("DELETE FROM courses WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found(format!("Course {} not found", id)));
    }
    Ok(())
}

#[instrument(skip(pool))]
pub async fn list_semesters(pool: &SqlitePool) -> Result<Vec<Semester>, ApiError> {
    let semesters =
        sqlx::query_as("SELECT id, term, year FROM semesters ORDER BY year DESC, term")
            .fetch_all(pool)
            .await?;
    Ok(semesters)
}

#[instrument(skip(pool))]
pub async fn create_semester(
    pool: &SqlitePool,
    term: &str,
    year: i64,
) -> Result<Semester, ApiError> {
    let existing: Option<i64> =
        sqlx::query_scalar("SELECT id FROM semesters WHERE term = ? AND year = ?")
            .bind(term)
            .bind(year)
            .fetch_optional(pool)
            .await?;
    if existing.is_some() {
        return Err(ApiError::conflict("Semester already exists"));
    }

    let result = sqlx::query("INSERT INTO semesters (term, year) VALUES (?, ?)")
        .bind(term)
        .bind(year)
        .execute(pool)
        .await?;
    info!(term = %term, year, "Semester created");

    Ok(Semester {
        id: result.last_insert_rowid(),
        term: term.to_string(),
        year,
    })
}

/// Deleting a semester is blocked while sections still reference it.
#[instrument(skip(pool))]
pub async fn delete_semester(pool: &SqlitePool, id: i64) -> Result<(), ApiError> {
    let sections: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sections WHERE semester_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if sections > 0 {
        return Err(ApiError::bad_request(
            "Cannot delete a semester that still has sections",
        ));
    }

    let result = sqlx::query("DELETE FROM semesters WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found(format!("Semester {} not found", id)));
    }
    Ok(())
}
