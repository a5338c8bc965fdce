use sqlx::SqlitePool;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::Role;
use crate::config;
use crate::database::models::{Department, UserRow, UserSummary};
use crate::error::ApiError;

/// Probe order for role resolution. Fixed precedence: when a user somehow
/// has rows in more than one detail table, the earliest match wins.
const ROLE_PRECEDENCE: [Role; 4] = [Role::Student, Role::Faculty, Role::Admin, Role::Superuser];

pub(crate) fn detail_table(role: Role) -> &'static str {
    match role {
        Role::Student => "student_details",
        Role::Faculty => "faculty_details",
        Role::Admin => "admin_details",
        Role::Superuser => "superuser_details",
    }
}

pub fn generate_user_id(role: Role) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", role.id_prefix(), &suffix[..8])
}

/// Derive a user's role by probing the detail tables in precedence order.
/// No caching: every call re-queries.
#[instrument(skip(pool))]
pub async fn resolve_role(pool: &SqlitePool, user_id: &str) -> Result<Role, ApiError> {
    for role in ROLE_PRECEDENCE {
        let sql = format!(
            "SELECT user_id FROM {} WHERE user_id = ?",
            detail_table(role)
        );
        let hit: Option<String> = sqlx::query_scalar(&sql)
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
        if hit.is_some() {
            return Ok(role);
        }
    }
    Err(ApiError::internal_server_error(
        "User role is not configured",
    ))
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub department_id: Option<i64>,
    pub enrollment_year: Option<i64>,
    pub designation: Option<String>,
    pub office: Option<String>,
}

/// Create a user plus their role-detail row in one transaction, so a failed
/// detail insert can never leave an orphan user behind.
#[instrument(skip(pool, new), fields(email = %new.email, role = %new.role))]
pub async fn create_user(pool: &SqlitePool, new: NewUser) -> Result<UserSummary, ApiError> {
    let existing: Option<String> = sqlx::query_scalar("SELECT id FROM users WHERE email = ?")
        .bind(&new.email)
        .fetch_optional(pool)
        .await?;
    if existing.is_some() {
        return Err(ApiError::conflict("Email address already in use"));
    }

    let id = generate_user_id(new.role);
    let password_hash = bcrypt::hash(&new.password, config::config().security.bcrypt_cost)?;

    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, department_id) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&new.name)
    .bind(&new.email)
    .bind(&password_hash)
    .bind(new.department_id)
    .execute(&mut *tx)
    .await?;

    match new.role {
        Role::Student => {
            sqlx::query("INSERT INTO student_details (user_id, enrollment_year) VALUES (?, ?)")
                .bind(&id)
                .bind(new.enrollment_year)
                .execute(&mut *tx)
                .await?;
        }
        Role::Faculty => {
            sqlx::query("INSERT INTO faculty_details (user_id, designation) VALUES (?, ?)")
                .bind(&id)
                .bind(&new.designation)
                .execute(&mut *tx)
                .await?;
        }
        Role::Admin => {
            sqlx::query("INSERT INTO admin_details (user_id, office) VALUES (?, ?)")
                .bind(&id)
                .bind(&new.office)
                .execute(&mut *tx)
                .await?;
        }
        Role::Superuser => {
            sqlx::query("INSERT INTO superuser_details (user_id) VALUES (?)")
                .bind(&id)
                .execute(&mut *tx)
                .await?;
        }
    }

    tx.commit().await?;
    info!(user_id = %id, "User created");

    get_user(pool, &id).await
}

#[instrument(skip(pool))]
pub async fn get_user(pool: &SqlitePool, id: &str) -> Result<UserSummary, ApiError> {
    let row: Option<UserRow> = sqlx::query_as(
        "SELECT id, name, email, password_hash, profile_picture, department_id
         FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    let row = row.ok_or_else(|| ApiError::not_found(format!("User {} not found", id)))?;
    summarize(pool, row).await
}

pub(crate) async fn summarize(pool: &SqlitePool, row: UserRow) -> Result<UserSummary, ApiError> {
    let role = resolve_role(pool, &row.id).await?;
    let department = match row.department_id {
        Some(dept_id) => {
            sqlx::query_scalar("SELECT name FROM departments WHERE id = ?")
                .bind(dept_id)
                .fetch_optional(pool)
                .await?
        }
        None => None,
    };
    Ok(UserSummary::from_row(row, role, department))
}

#[instrument(skip(pool))]
pub async fn list_users(
    pool: &SqlitePool,
    role_filter: Option<Role>,
) -> Result<Vec<UserSummary>, ApiError> {
    let rows: Vec<UserRow> = match role_filter {
        Some(role) => {
            let sql = format!(
                "SELECT u.id, u.name, u.email, u.password_hash, u.profile_picture, u.department_id
                 FROM users u JOIN {} d ON d.user_id = u.id ORDER BY u.name",
                detail_table(role)
            );
            sqlx::query_as(&sql).fetch_all(pool).await?
        }
        None => {
            sqlx::query_as(
                "SELECT id, name, email, password_hash, profile_picture, department_id
                 FROM users ORDER BY name",
            )
            .fetch_all(pool)
            .await?
        }
    };

    let mut users = Vec::with_capacity(rows.len());
    for row in rows {
        users.push(summarize(pool, row).await?);
    }
    Ok(users)
}

#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub profile_picture: Option<String>,
    pub department_id: Option<Option<i64>>,
}

#[instrument(skip(pool, update))]
pub async fn update_user(
    pool: &SqlitePool,
    id: &str,
    update: UserUpdate,
) -> Result<UserSummary, ApiError> {
    // Existence check first so updates on unknown ids come back 404
    get_user(pool, id).await?;

    if let Some(name) = &update.name {
        sqlx::query("UPDATE users SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id)
            .execute(pool)
            .await?;
    }

    if let Some(email) = &update.email {
        let taken: Option<String> =
            sqlx::query_scalar("SELECT id FROM users WHERE email = ? AND id != ?")
                .bind(email)
                .bind(id)
                .fetch_optional(pool)
                .await?;
        if taken.is_some() {
            return Err(ApiError::conflict("Email address already in use"));
        }
        sqlx::query("UPDATE users SET email = ? WHERE id = ?")
            .bind(email)
            .bind(id)
            .execute(pool)
            .await?;
    }

    if let Some(password) = &update.password {
        let password_hash = bcrypt::hash(password, config::config().security.bcrypt_cost)?;
        sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(pool)
            .await?;
    }

    if let Some(picture) = &update.profile_picture {
        sqlx::query("UPDATE users SET profile_picture = ? WHERE id = ?")
            .bind(picture)
            .bind(id)
            .execute(pool)
            .await?;
    }

    if let Some(department_id) = update.department_id {
        sqlx::query("UPDATE users SET department_id = ? WHERE id = ?")
            .bind(department_id)
            .bind(id)
            .execute(pool)
            .await?;
    }

    get_user(pool, id).await
}

/// Delete a user. Detail rows go with the user via ON DELETE CASCADE;
/// message sender/receiver and section faculty references null out.
#[instrument(skip(pool))]
pub async fn delete_user(pool: &SqlitePool, id: &str) -> Result<(), ApiError> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::not_found(format!("User {} not found", id)));
    }
    info!(user_id = %id, "User deleted");
    Ok(())
}

#[instrument(skip(pool))]
pub async fn list_departments(pool: &SqlitePool) -> Result<Vec<Department>, ApiError> {
    let departments = sqlx::query_as("SELECT id, name FROM departments ORDER BY name")
        .fetch_all(pool)
        .await?;
    Ok(departments)
}
