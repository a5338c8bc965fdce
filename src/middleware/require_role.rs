use axum::{extract::Request, middleware::Next, response::Response};

use crate::auth::Role;
use crate::error::ApiError;

use super::auth::AuthUser;

pub const ADMINS: &[Role] = &[Role::Admin, Role::Superuser];
pub const STAFF: &[Role] = &[Role::Faculty, Role::Admin, Role::Superuser];

/// Role allow-list middleware for route groups where every method shares the
/// same gate. Must run after `jwt_auth_middleware`.
pub async fn require_role(
    allowed: &'static [Role],
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    user.require_any(allowed)?;
    Ok(next.run(request).await)
}
