pub mod auth;
pub mod catalog;
pub mod messages;
pub mod schedules;
pub mod sections;
pub mod users;
