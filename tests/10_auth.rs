mod common;

use axum::http::StatusCode;
use campus_erp::auth::{validate_jwt, Role};
use serde_json::json;

#[tokio::test]
async fn login_with_user_id_returns_token_and_profile() {
    let app = common::spawn_app().await;
    let user = app.seed_user("Priya Raman", "praman@college.edu", Role::Admin).await;
    assert!(user.id.starts_with("ADM-"));

    let (status, body) = app
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "identifier": user.id, "password": "correct horse" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user"]["id"], user.id.as_str());
    assert_eq!(body["data"]["user"]["role"], "admin");

    let claims = validate_jwt(body["data"]["token"].as_str().unwrap()).unwrap();
    assert_eq!(claims.sub, user.id);
    assert_eq!(claims.role, Role::Admin);
}

#[tokio::test]
async fn login_with_email_works_for_any_role() {
    let app = common::spawn_app().await;
    let user = app.seed_user("Tom Okafor", "tokafor@college.edu", Role::Student).await;

    let (status, body) = app
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "identifier": "tokafor@college.edu", "password": "correct horse" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["id"], user.id.as_str());
    assert_eq!(body["data"]["user"]["role"], "student");
}

#[tokio::test]
async fn bad_password_and_unknown_identifier_are_indistinguishable() {
    let app = common::spawn_app().await;
    let user = app.seed_user("Ana Silva", "asilva@college.edu", Role::Faculty).await;

    let (wrong_pw_status, wrong_pw_body) = app
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "identifier": user.id, "password": "not the password" })),
        )
        .await;
    let (unknown_status, unknown_body) = app
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "identifier": "nobody@college.edu", "password": "correct horse" })),
        )
        .await;

    assert_eq!(wrong_pw_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw_body["message"], unknown_body["message"]);
    assert_eq!(wrong_pw_body["success"], false);
}

#[tokio::test]
async fn prefixed_identifier_only_matches_its_own_detail_table() {
    let app = common::spawn_app().await;
    let student = app.seed_user("Lena Fischer", "lfischer@college.edu", Role::Student).await;

    // A student id probed as faculty finds nothing, even with the right password
    let forged = student.id.replacen("STU", "FAC", 1);
    let (status, _) = app
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "identifier": forged, "password": "correct horse" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn inconsistent_role_rows_fail_login_loudly() {
    let app = common::spawn_app().await;

    // Hand-built account whose id prefix says faculty but whose detail rows
    // make the derived role student.
    let hash = bcrypt::hash("correct horse", 4).unwrap();
    sqlx::query("INSERT INTO users (id, name, email, password_hash) VALUES (?, ?, ?, ?)")
        .bind("FAC-deadbeef")
        .bind("Broken Account")
        .bind("broken@college.edu")
        .bind(&hash)
        .execute(&app.pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO faculty_details (user_id) VALUES ('FAC-deadbeef')")
        .execute(&app.pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO student_details (user_id) VALUES ('FAC-deadbeef')")
        .execute(&app.pool)
        .await
        .unwrap();

    let (status, body) = app
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "identifier": "FAC-deadbeef", "password": "correct horse" })),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Account role configuration is inconsistent");
}

#[tokio::test]
async fn protected_routes_reject_missing_or_garbage_tokens() {
    let app = common::spawn_app().await;

    let (status, _) = app.request("GET", "/api/users/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request("GET", "/api/users/me", Some("not.a.jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn health_needs_no_auth() {
    let app = common::spawn_app().await;
    let (status, _) = app.request("GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}
