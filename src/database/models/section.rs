use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Denormalized section listing: course, semester and faculty joined in.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SectionView {
    pub id: i64,
    pub section_code: String,
    pub course_id: i64,
    pub course_code: String,
    pub course_title: String,
    pub semester_id: i64,
    pub term: String,
    pub year: i64,
    pub faculty_user_id: Option<String>,
    pub faculty_name: Option<String>,
    pub enrolled_count: i64,
}

/// Minimal shape for dropdowns and pickers.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SectionBasic {
    pub id: i64,
    pub section_code: String,
}
