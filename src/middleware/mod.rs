pub mod auth;
pub mod require_role;
pub mod response;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use require_role::{require_role, ADMINS, STAFF};
pub use response::{ApiResponse, ApiResult};
