use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::auth::Role;

/// Raw `users` row. The role is not stored here; it is derived from the
/// role-detail tables (see `services::users::resolve_role`).
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub profile_picture: Option<String>,
    pub department_id: Option<i64>,
}

/// Wire shape for user responses: row data joined with the department name
/// and the resolved role. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub profile_picture: Option<String>,
    pub department_id: Option<i64>,
    pub department: Option<String>,
}

impl UserSummary {
    pub fn from_row(row: UserRow, role: Role, department: Option<String>) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            role,
            profile_picture: row.profile_picture,
            department_id: row.department_id,
            department,
        }
    }
}
