use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ScheduleItem {
    pub id: i64,
    pub section_id: i64,
    pub day_of_week: i64,
    pub start_time: String,
    pub end_time: String,
    pub room: String,
}

/// One meeting occurrence as it appears on a personal timetable.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MeetingView {
    pub id: i64,
    pub section_id: i64,
    pub section_code: String,
    pub course_code: String,
    pub course_title: String,
    pub day_of_week: i64,
    pub start_time: String,
    pub end_time: String,
    pub room: String,
}
