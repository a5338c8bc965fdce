// Protected handlers: require a valid bearer token (see
// `middleware::jwt_auth_middleware`), with role allow-lists on top.

pub mod catalog;
pub mod messages;
pub mod schedules;
pub mod sections;
pub mod users;
