use sqlx::SqlitePool;
use tracing::{info, instrument};

use crate::auth::Role;
use crate::database::models::{MeetingView, ScheduleItem};
use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct NewMeeting {
    pub day_of_week: i64,
    pub start_time: String,
    pub end_time: String,
    pub room: String,
}

#[instrument(skip(pool, new), fields(section_id))]
pub async fn add_meeting(
    pool: &SqlitePool,
    section_id: i64,
    new: NewMeeting,
) -> Result<ScheduleItem, ApiError> {
    let section: Option<i64> = sqlx::query_scalar("SELECT id FROM sections WHERE id = ?")
        .bind(section_id)
        .fetch_optional(pool)
        .await?;
    if section.is_none() {
        return Err(ApiError::not_found(format!(
            "Section {} not found",
            section_id
        )));
    }

    if new.start_time >= new.end_time {
        return Err(ApiError::bad_request("Meeting must end after it starts"));
    }

    let result = sqlx::query(
        "INSERT INTO schedule_items (section_id, day_of_week, start_time, end_time, room)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(section_id)
    .bind(new.day_of_week)
    .bind(&new.start_time)
    .bind(&new.end_time)
    .bind(&new.room)
    .execute(pool)
    .await?;
    info!(section_id, "Meeting added");

    Ok(ScheduleItem {
        id: result.last_insert_rowid(),
        section_id,
        day_of_week: new.day_of_week,
        start_time: new.start_time,
        end_time: new.end_time,
        room: new.room,
    })
}

#[instrument(skip(pool))]
pub async fn remove_meeting(pool: &SqlitePool, id: i64) -> Result<(), ApiError> {
    let result = sqlx::query("DELETE FROM schedule_items WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found(format!("Meeting {} not found", id)));
    }
    Ok(())
}

#[instrument(skip(pool))]
pub async fn list_for_section(
    pool: &SqlitePool,
    section_id: i64,
) -> Result<Vec<ScheduleItem>, ApiError> {
    let items = sqlx::query_as(
        "SELECT id, section_id, day_of_week, start_time, end_time, room
         FROM schedule_items WHERE section_id = ?
         ORDER BY day_of_week, start_time",
    )
    .bind(section_id)
    .fetch_all(pool)
    .await?;
    Ok(items)
}

const MEETING_VIEW_SQL: &str = "
    SELECT si.id, si.section_id, s.section_code,
           c.code AS course_code, c.title AS course_title,
           si.day_of_week, si.start_time, si.end_time, si.room
    FROM schedule_items si
    JOIN sections s ON s.id = si.section_id
    JOIN courses c ON c.id = s.course_id
";

/// Personal timetable: students see meetings of sections they are enrolled
/// in, faculty see sections they teach, admins see everything.
#[instrument(skip(pool))]
pub async fn my_schedule(
    pool: &SqlitePool,
    user_id: &str,
    role: Role,
) -> Result<Vec<MeetingView>, ApiError> {
    let meetings = match role {
        Role::Student => {
            let sql = format!(
                "{} JOIN section_enrollments e ON e.section_id = s.id
                 WHERE e.student_user_id = ?
                 ORDER BY si.day_of_week, si.start_time",
                MEETING_VIEW_SQL
            );
            sqlx::query_as(&sql).bind(user_id).fetch_all(pool).await?
        }
        Role::Faculty => {
            let sql = format!(
                "{} WHERE s.faculty_user_id = ?
                 ORDER BY si.day_of_week, si.start_time",
                MEETING_VIEW_SQL
            );
            sqlx::query_as(&sql).bind(user_id).fetch_all(pool).await?
        }
        Role::Admin | Role::Superuser => {
            let sql = format!(
                "{} ORDER BY si.day_of_week, si.start_time",
                MEETING_VIEW_SQL
            );
            sqlx::query_as(&sql).fetch_all(pool).await?
        }
    };
    Ok(meetings)
}
