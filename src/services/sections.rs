use sqlx::SqlitePool;
use tracing::{info, instrument};

use crate::auth::Role;
use crate::database::models::{SectionBasic, SectionView};
use crate::error::ApiError;

use super::users;

/// Fixed department-name abbreviation table for section codes. Unmapped
/// departments fall back to "GN" (general).
const DEPT_ABBREVIATIONS: &[(&str, &str)] = &[
    ("Computer Science", "CS"),
    ("Mathematics", "MA"),
    ("Physics", "PH"),
    ("Chemistry", "CH"),
    ("Biology", "BI"),
    ("English", "EN"),
    ("History", "HI"),
    ("Economics", "EC"),
    ("Business Administration", "BA"),
    ("Electrical Engineering", "EE"),
    ("Mechanical Engineering", "ME"),
    ("Civil Engineering", "CE"),
    ("Psychology", "PS"),
];

fn department_abbreviation(department: &str) -> &'static str {
    DEPT_ABBREVIATIONS
        .iter()
        .find(|(name, _)| *name == department)
        .map(|(_, abbr)| *abbr)
        .unwrap_or("GN")
}

/// Deterministic section code: department abbreviation + first letter of the
/// term + last two digits of the year + the caller-supplied letter,
/// uppercased. ("Computer Science", "Fall", 2024, 'a') -> "CSF24A".
pub fn generate_section_code(department: &str, term: &str, year: i64, letter: char) -> String {
    let term_initial = term
        .chars()
        .next()
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or('X');
    format!(
        "{}{}{:02}{}",
        department_abbreviation(department),
        term_initial,
        year.rem_euclid(100),
        letter.to_ascii_uppercase()
    )
}

const SECTION_VIEW_SQL: &str = "
    SELECT s.id, s.section_code,
           c.id AS course_id, c.code AS course_code, c.title AS course_title,
           sem.id AS semester_id, sem.term, sem.year,
           s.faculty_user_id, f.name AS faculty_name,
           (SELECT COUNT(*) FROM section_enrollments e WHERE e.section_id = s.id) AS enrolled_count
    FROM sections s
    JOIN courses c ON c.id = s.course_id
    JOIN semesters sem ON sem.id = s.semester_id
    LEFT JOIN users f ON f.id = s.faculty_user_id
";

#[instrument(skip(pool))]
pub async fn list_sections(pool: &SqlitePool) -> Result<Vec<SectionView>, ApiError> {
    let sql = format!("{} ORDER BY sem.year DESC, c.code, s.section_code", SECTION_VIEW_SQL);
    let sections = sqlx::query_as(&sql).fetch_all(pool).await?;
    Ok(sections)
}

#[instrument(skip(pool))]
pub async fn list_sections_basic(pool: &SqlitePool) -> Result<Vec<SectionBasic>, ApiError> {
    let sections =
        sqlx::query_as("SELECT id, section_code FROM sections ORDER BY section_code")
            .fetch_all(pool)
            .await?;
    Ok(sections)
}

#[instrument(skip(pool))]
pub async fn get_section(pool: &SqlitePool, id: i64) -> Result<SectionView, ApiError> {
    let sql = format!("{} WHERE s.id = ?", SECTION_VIEW_SQL);
    let section: Option<SectionView> = sqlx::query_as(&sql).bind(id).fetch_optional(pool).await?;
    section.ok_or_else(|| ApiError::not_found(format!("Section {} not found", id)))
}

#[derive(Debug, Clone)]
pub struct NewSection {
    pub course_id: i64,
    pub semester_id: i64,
    pub letter: char,
    pub faculty_user_id: Option<String>,
}

#[instrument(skip(pool, new), fields(course_id = new.course_id, semester_id = new.semester_id))]
pub async fn create_section(pool: &SqlitePool, new: NewSection) -> Result<SectionView, ApiError> {
    let department: Option<Option<String>> = sqlx::query_scalar(
        "SELECT d.name FROM courses c LEFT JOIN departments d ON d.id = c.department_id
         WHERE c.id = ?",
    )
    .bind(new.course_id)
    .fetch_optional(pool)
    .await?;
    let department = department
        .ok_or_else(|| ApiError::not_found(format!("Course {} not found", new.course_id)))?
        .unwrap_or_default();

    let semester: Option<(String, i64)> =
        sqlx::query_as("SELECT term, year FROM semesters WHERE id = ?")
            .bind(new.semester_id)
            .fetch_optional(pool)
            .await?;
    let (term, year) = semester
        .ok_or_else(|| ApiError::not_found(format!("Semester {} not found", new.semester_id)))?;

    if let Some(faculty_id) = &new.faculty_user_id {
        ensure_role(pool, faculty_id, Role::Faculty, "Assigned user is not faculty").await?;
    }

    let section_code = generate_section_code(&department, &term, year, new.letter);

    // Pre-insert existence check; the UNIQUE constraint is the backstop.
    let duplicate: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM sections WHERE course_id = ? AND semester_id = ? AND section_code = ?",
    )
    .bind(new.course_id)
    .bind(new.semester_id)
    .bind(&section_code)
    .fetch_optional(pool)
    .await?;
    if duplicate.is_some() {
        return Err(ApiError::conflict(format!(
            "Section {} already exists for this course and semester",
            section_code
        )));
    }

    let result = sqlx::query(
        "INSERT INTO sections (course_id, semester_id, section_code, faculty_user_id)
         VALUES (?, ?, ?, ?)",
    )
    .bind(new.course_id)
    .bind(new.semester_id)
    .bind(&section_code)
    .bind(&new.faculty_user_id)
    .execute(pool)
    .await?;
    info!(section_code = %section_code, "Section created");

    get_section(pool, result.last_insert_rowid()).await
}

#[instrument(skip(pool))]
pub async fn assign_faculty(
    pool: &SqlitePool,
    section_id: i64,
    faculty_user_id: Option<String>,
) -> Result<SectionView, ApiError> {
    get_section(pool, section_id).await?;

    if let Some(faculty_id) = &faculty_user_id {
        ensure_role(pool, faculty_id, Role::Faculty, "Assigned user is not faculty").await?;
    }

    sqlx::query("UPDATE sections SET faculty_user_id = ? WHERE id = ?")
        .bind(&faculty_user_id)
        .bind(section_id)
        .execute(pool)
        .await?;

    get_section(pool, section_id).await
}

#[instrument(skip(pool))]
pub async fn enroll_student(
    pool: &SqlitePool,
    section_id: i64,
    student_user_id: &str,
) -> Result<(), ApiError> {
    get_section(pool, section_id).await?;
    ensure_role(pool, student_user_id, Role::Student, "Only students can be enrolled").await?;

    let duplicate: Option<i64> = sqlx::query_scalar(
        "SELECT id FROM section_enrollments WHERE student_user_id = ? AND section_id = ?",
    )
    .bind(student_user_id)
    .bind(section_id)
    .fetch_optional(pool)
    .await?;
    if duplicate.is_some() {
        return Err(ApiError::conflict(
            "Student is already enrolled in this section",
        ));
    }

    sqlx::query("INSERT INTO section_enrollments (student_user_id, section_id) VALUES (?, ?)")
        .bind(student_user_id)
        .bind(section_id)
        .execute(pool)
        .await?;
    info!(student = %student_user_id, section_id, "Student enrolled");
    Ok(())
}

#[instrument(skip(pool))]
pub async fn unenroll_student(
    pool: &SqlitePool,
    section_id: i64,
    student_user_id: &str,
) -> Result<(), ApiError> {
    let result = sqlx::query(
        "DELETE FROM section_enrollments WHERE student_user_id = ? AND section_id = ?",
    )
    .bind(student_user_id)
    .bind(section_id)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Enrollment not found"));
    }
    Ok(())
}

/// Deleting a section is blocked while any enrollment references it.
#[instrument(skip(pool))]
pub async fn delete_section(pool: &SqlitePool, id: i64) -> Result<(), ApiError> {
    get_section(pool, id).await?;

    let enrollments: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM section_enrollments WHERE section_id = ?")
            .bind(id)
            .fetch_one(pool)
            .await?;
    if enrollments > 0 {
        return Err(ApiError::bad_request(
            "Cannot delete a section with enrolled students",
        ));
    }

    sqlx::query("DELETE FROM sections WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    info!(section_id = id, "Section deleted");
    Ok(())
}

async fn ensure_role(
    pool: &SqlitePool,
    user_id: &str,
    expected: Role,
    message: &str,
) -> Result<(), ApiError> {
    match users::resolve_role(pool, user_id).await {
        Ok(role) if role == expected => Ok(()),
        Ok(_) => Err(ApiError::bad_request(message)),
        Err(_) => Err(ApiError::not_found(format!("User {} not found", user_id))),
    }
}
