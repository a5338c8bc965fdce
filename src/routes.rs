use axum::http::HeaderValue;
use axum::middleware::from_fn;
use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config;
use crate::handlers::protected::{catalog, messages, schedules, sections, users};
use crate::handlers::public;
use crate::middleware::{jwt_auth_middleware, require_role, ADMINS};
use crate::realtime;
use crate::state::AppState;

/// Assemble the full application router.
pub fn app(state: AppState) -> Router {
    // User administration is uniformly admin-gated, so the allow-list runs
    // as route middleware here. Mixed read/write paths below gate their
    // mutating handlers inline instead.
    let user_admin = Router::new()
        .route("/api/users", get(users::list_users).post(users::create_user))
        .route(
            "/api/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route_layer(from_fn(|req, next| require_role(ADMINS, req, next)));

    let protected = Router::new()
        .merge(user_admin)
        .route("/api/users/me", get(users::me))
        .route("/api/users/departments", get(users::departments))
        .route(
            "/api/departments",
            get(catalog::list_departments).post(catalog::create_department),
        )
        .route(
            "/api/courses",
            get(catalog::list_courses).post(catalog::create_course),
        )
        .route("/api/courses/:id", delete(catalog::delete_course))
        .route(
            "/api/semesters",
            get(catalog::list_semesters).post(catalog::create_semester),
        )
        .route("/api/semesters/:id", delete(catalog::delete_semester))
        .route(
            "/api/sections",
            get(sections::list_sections).post(sections::create_section),
        )
        .route("/api/sections/basic", get(sections::list_sections_basic))
        .route(
            "/api/sections/:id",
            get(sections::get_section).delete(sections::delete_section),
        )
        .route("/api/sections/:id/faculty", put(sections::assign_faculty))
        .route(
            "/api/sections/:id/enroll",
            post(sections::enroll_student).delete(sections::unenroll_student),
        )
        .route(
            "/api/sections/:id/schedule",
            get(sections::list_section_schedule).post(sections::add_meeting),
        )
        .route("/api/schedules/my", get(schedules::my_schedule))
        .route("/api/schedules/:id", delete(schedules::remove_meeting))
        .route(
            "/api/messages",
            get(messages::list_messages).post(messages::create_message),
        )
        .route("/api/messages/my", get(messages::my_messages))
        .route("/api/messages/:id/read", put(messages::mark_read))
        .route_layer(from_fn(jwt_auth_middleware));

    Router::new()
        .route("/health", get(public::health))
        .route("/api/auth/login", post(public::login))
        // The websocket endpoint authenticates its own token before upgrade
        .route("/ws", get(realtime::ws_handler))
        .merge(protected)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    let origins = &config::config().security.cors_origins;
    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    let parsed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods(Any)
        .allow_headers(Any)
}
