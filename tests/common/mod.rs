#![allow(dead_code)]

use std::str::FromStr;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tower::ServiceExt;

use campus_erp::auth::Role;
use campus_erp::database::models::UserSummary;
use campus_erp::services::users::{self, NewUser};
use campus_erp::{app, AppState};

/// In-memory database, one connection so every query sees the same file.
pub async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("memory options")
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("connect to in-memory sqlite");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");
    pool
}

pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    pub state: AppState,
}

pub async fn spawn_app() -> TestApp {
    let pool = test_pool().await;
    let state = AppState::new(pool.clone());
    TestApp {
        router: app(state.clone()),
        pool,
        state,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("route request");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    /// Seed a user directly through the service layer.
    pub async fn seed_user(&self, name: &str, email: &str, role: Role) -> UserSummary {
        users::create_user(
            &self.pool,
            NewUser {
                name: name.to_string(),
                email: email.to_string(),
                password: "correct horse".to_string(),
                role,
                department_id: None,
                enrollment_year: None,
                designation: None,
                office: None,
            },
        )
        .await
        .expect("seed user")
    }

    /// Log in over HTTP and return the bearer token.
    pub async fn login(&self, identifier: &str) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/api/auth/login",
                None,
                Some(serde_json::json!({
                    "identifier": identifier,
                    "password": "correct horse",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["data"]["token"]
            .as_str()
            .expect("token in login response")
            .to_string()
    }

    pub async fn seed_and_login(&self, name: &str, email: &str, role: Role) -> (UserSummary, String) {
        let user = self.seed_user(name, email, role).await;
        let token = self.login(&user.id).await;
        (user, token)
    }
}
