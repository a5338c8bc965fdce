use sqlx::SqlitePool;
use tracing::{instrument, warn};

use crate::auth::{generate_jwt, Claims, Role};
use crate::database::models::{UserRow, UserSummary};
use crate::error::ApiError;

use super::users;

#[derive(Debug)]
pub struct LoginOutcome {
    pub token: String,
    pub user: UserSummary,
}

/// Authenticate an identifier/password pair and mint a bearer token.
///
/// A role-prefixed identifier (`STU-`, `FAC-`, `ADM-`, `SUP-`) probes the
/// matching detail table by user id; anything else is treated as an email.
/// Every lookup or verification failure maps to the same generic 401 so the
/// response never reveals which part was wrong.
#[instrument(skip(pool, password))]
pub async fn login(
    pool: &SqlitePool,
    identifier: &str,
    password: &str,
) -> Result<LoginOutcome, ApiError> {
    let probed_role = Role::from_id_prefix(identifier);

    let row = match probed_role {
        Some(role) => find_by_id_with_detail(pool, identifier, role).await?,
        None => find_by_email(pool, identifier).await?,
    };
    let row = row.ok_or_else(ApiError::invalid_credentials)?;

    if !bcrypt::verify(password, &row.password_hash).unwrap_or(false) {
        return Err(ApiError::invalid_credentials());
    }

    let resolved = users::resolve_role(pool, &row.id).await?;

    // Consistency check: the lookup path taken must agree with the derived
    // role. A mismatch is a data-integrity bug, not a user error.
    if let Some(probed) = probed_role {
        if probed != resolved {
            warn!(
                user_id = %row.id,
                probed = %probed,
                resolved = %resolved,
                "Role lookup path disagrees with derived role"
            );
            return Err(ApiError::internal_server_error(
                "Account role configuration is inconsistent",
            ));
        }
    }

    let claims = Claims::new(row.id.clone(), resolved);
    let token = generate_jwt(&claims).map_err(|e| {
        tracing::error!("Token generation failed: {}", e);
        ApiError::internal_server_error("Could not issue a session token")
    })?;

    let user = users::summarize(pool, row).await?;
    Ok(LoginOutcome { token, user })
}

async fn find_by_id_with_detail(
    pool: &SqlitePool,
    user_id: &str,
    role: Role,
) -> Result<Option<UserRow>, ApiError> {
    let sql = format!(
        "SELECT u.id, u.name, u.email, u.password_hash, u.profile_picture, u.department_id
         FROM users u JOIN {} d ON d.user_id = u.id WHERE u.id = ?",
        users::detail_table(role)
    );
    let row = sqlx::query_as(&sql).bind(user_id).fetch_optional(pool).await?;
    Ok(row)
}

async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<UserRow>, ApiError> {
    let row = sqlx::query_as(
        "SELECT id, name, email, password_hash, profile_picture, department_id
         FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}
