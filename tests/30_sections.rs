mod common;

use axum::http::StatusCode;
use campus_erp::auth::Role;
use serde_json::{json, Value};

/// Department + course + semester fixture, returning (course_id, semester_id).
async fn seed_catalog(app: &common::TestApp, token: &str) -> (i64, i64) {
    let (status, dept) = app
        .request(
            "POST",
            "/api/departments",
            Some(token),
            Some(json!({ "name": "Computer Science" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let dept_id = dept["data"]["id"].as_i64().unwrap();

    let (status, course) = app
        .request(
            "POST",
            "/api/courses",
            Some(token),
            Some(json!({
                "code": "CS101",
                "title": "Intro to Programming",
                "credits": 4,
                "department_id": dept_id,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, semester) = app
        .request(
            "POST",
            "/api/semesters",
            Some(token),
            Some(json!({ "term": "Fall", "year": 2024 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    (
        course["data"]["id"].as_i64().unwrap(),
        semester["data"]["id"].as_i64().unwrap(),
    )
}

async fn create_section(
    app: &common::TestApp,
    token: &str,
    course_id: i64,
    semester_id: i64,
    letter: &str,
) -> (StatusCode, Value) {
    app.request(
        "POST",
        "/api/sections",
        Some(token),
        Some(json!({
            "course_id": course_id,
            "semester_id": semester_id,
            "letter": letter,
        })),
    )
    .await
}

#[tokio::test]
async fn section_code_is_derived_from_catalog_context() {
    let app = common::spawn_app().await;
    let (_, token) = app.seed_and_login("Admin One", "admin@college.edu", Role::Admin).await;
    let (course_id, semester_id) = seed_catalog(&app, &token).await;

    let (status, body) = create_section(&app, &token, course_id, semester_id, "a").await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["section_code"], "CSF24A");
    assert_eq!(body["data"]["course_code"], "CS101");
    assert_eq!(body["data"]["term"], "Fall");
    assert_eq!(body["data"]["enrolled_count"], 0);
    assert!(body["data"]["faculty_name"].is_null());
}

#[tokio::test]
async fn duplicate_section_letter_conflicts() {
    let app = common::spawn_app().await;
    let (_, token) = app.seed_and_login("Admin One", "admin@college.edu", Role::Admin).await;
    let (course_id, semester_id) = seed_catalog(&app, &token).await;

    let (status, _) = create_section(&app, &token, course_id, semester_id, "a").await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = create_section(&app, &token, course_id, semester_id, "A").await;
    assert_eq!(status, StatusCode::CONFLICT);

    // A different letter is fine
    let (status, _) = create_section(&app, &token, course_id, semester_id, "b").await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn section_creation_checks_references_and_role() {
    let app = common::spawn_app().await;
    let (_, token) = app.seed_and_login("Admin One", "admin@college.edu", Role::Admin).await;
    let (course_id, semester_id) = seed_catalog(&app, &token).await;
    let student = app.seed_user("Sam Student", "sam@college.edu", Role::Student).await;

    let (status, _) = create_section(&app, &token, 999, semester_id, "a").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = create_section(&app, &token, course_id, 999, "a").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // A student cannot be the section's faculty
    let (status, _) = app
        .request(
            "POST",
            "/api/sections",
            Some(&token),
            Some(json!({
                "course_id": course_id,
                "semester_id": semester_id,
                "letter": "a",
                "faculty_user_id": student.id,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(
            "POST",
            "/api/sections",
            Some(&token),
            Some(json!({
                "course_id": course_id,
                "semester_id": semester_id,
                "letter": "7",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn faculty_assignment_shows_in_the_section_view() {
    let app = common::spawn_app().await;
    let (_, token) = app.seed_and_login("Admin One", "admin@college.edu", Role::Admin).await;
    let (course_id, semester_id) = seed_catalog(&app, &token).await;
    let faculty = app.seed_user("Dr. Verma", "verma@college.edu", Role::Faculty).await;

    let (_, created) = create_section(&app, &token, course_id, semester_id, "a").await;
    let section_id = created["data"]["id"].as_i64().unwrap();

    let (status, body) = app
        .request(
            "PUT",
            &format!("/api/sections/{}/faculty", section_id),
            Some(&token),
            Some(json!({ "faculty_user_id": faculty.id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["faculty_name"], "Dr. Verma");

    // Null unassigns
    let (status, body) = app
        .request(
            "PUT",
            &format!("/api/sections/{}/faculty", section_id),
            Some(&token),
            Some(json!({ "faculty_user_id": null })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["faculty_name"].is_null());
}

#[tokio::test]
async fn enrollment_lifecycle_and_delete_guard() {
    let app = common::spawn_app().await;
    let (_, token) = app.seed_and_login("Admin One", "admin@college.edu", Role::Admin).await;
    let (course_id, semester_id) = seed_catalog(&app, &token).await;
    let student = app.seed_user("Sam Student", "sam@college.edu", Role::Student).await;
    let faculty = app.seed_user("Fay Faculty", "fay@college.edu", Role::Faculty).await;

    let (_, created) = create_section(&app, &token, course_id, semester_id, "a").await;
    let section_id = created["data"]["id"].as_i64().unwrap();
    let enroll_path = format!("/api/sections/{}/enroll", section_id);

    let (status, _) = app
        .request(
            "POST",
            &enroll_path,
            Some(&token),
            Some(json!({ "student_user_id": student.id })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    // Twice is a conflict, and only students can be enrolled
    let (status, _) = app
        .request(
            "POST",
            &enroll_path,
            Some(&token),
            Some(json!({ "student_user_id": student.id })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = app
        .request(
            "POST",
            &enroll_path,
            Some(&token),
            Some(json!({ "student_user_id": faculty.id })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app
        .request("GET", &format!("/api/sections/{}", section_id), Some(&token), None)
        .await;
    assert_eq!(body["data"]["enrolled_count"], 1);

    // Enrolled sections cannot be deleted
    let (status, body) = app
        .request("DELETE", &format!("/api/sections/{}", section_id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot delete a section with enrolled students");

    let (status, _) = app
        .request(
            "DELETE",
            &enroll_path,
            Some(&token),
            Some(json!({ "student_user_id": student.id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .request("DELETE", &format!("/api/sections/{}", section_id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .request("GET", &format!("/api/sections/{}", section_id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn section_mutations_are_admin_only() {
    let app = common::spawn_app().await;
    let (_, admin_token) = app.seed_and_login("Admin One", "admin@college.edu", Role::Admin).await;
    let (_, student_token) = app
        .seed_and_login("Sam Student", "sam@college.edu", Role::Student)
        .await;
    let (course_id, semester_id) = seed_catalog(&app, &admin_token).await;

    let (status, _) = create_section(&app, &student_token, course_id, semester_id, "a").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Reads stay open
    let (status, _) = app.request("GET", "/api/sections", Some(&student_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app
        .request("GET", "/api/sections/basic", Some(&student_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn meetings_validate_their_time_range() {
    let app = common::spawn_app().await;
    let (_, token) = app.seed_and_login("Admin One", "admin@college.edu", Role::Admin).await;
    let (course_id, semester_id) = seed_catalog(&app, &token).await;
    let (_, created) = create_section(&app, &token, course_id, semester_id, "a").await;
    let section_id = created["data"]["id"].as_i64().unwrap();
    let schedule_path = format!("/api/sections/{}/schedule", section_id);

    let (status, body) = app
        .request(
            "POST",
            &schedule_path,
            Some(&token),
            Some(json!({
                "day_of_week": 1,
                "start_time": "09:00",
                "end_time": "10:30",
                "room": "B-204",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["room"], "B-204");

    let (status, _) = app
        .request(
            "POST",
            &schedule_path,
            Some(&token),
            Some(json!({
                "day_of_week": 1,
                "start_time": "10:00",
                "end_time": "09:00",
                "room": "B-204",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app.request("GET", &schedule_path, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);

    let meeting_id = items[0]["id"].as_i64().unwrap();
    let (status, _) = app
        .request(
            "DELETE",
            &format!("/api/schedules/{}", meeting_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.request("GET", &schedule_path, Some(&token), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn my_schedule_follows_enrollment_and_teaching() {
    let app = common::spawn_app().await;
    let (_, admin_token) = app.seed_and_login("Admin One", "admin@college.edu", Role::Admin).await;
    let (student, student_token) = app
        .seed_and_login("Sam Student", "sam@college.edu", Role::Student)
        .await;
    let (faculty, faculty_token) = app
        .seed_and_login("Fay Faculty", "fay@college.edu", Role::Faculty)
        .await;
    let (course_id, semester_id) = seed_catalog(&app, &admin_token).await;

    let (_, created) = app
        .request(
            "POST",
            "/api/sections",
            Some(&admin_token),
            Some(json!({
                "course_id": course_id,
                "semester_id": semester_id,
                "letter": "a",
                "faculty_user_id": faculty.id,
            })),
        )
        .await;
    let section_id = created["data"]["id"].as_i64().unwrap();

    app.request(
        "POST",
        &format!("/api/sections/{}/schedule", section_id),
        Some(&admin_token),
        Some(json!({
            "day_of_week": 2,
            "start_time": "14:00",
            "end_time": "15:30",
            "room": "A-101",
        })),
    )
    .await;

    // Not yet enrolled: empty schedule
    let (_, body) = app
        .request("GET", "/api/schedules/my", Some(&student_token), None)
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    app.request(
        "POST",
        &format!("/api/sections/{}/enroll", section_id),
        Some(&admin_token),
        Some(json!({ "student_user_id": student.id })),
    )
    .await;

    let (_, body) = app
        .request("GET", "/api/schedules/my", Some(&student_token), None)
        .await;
    let mine = body["data"].as_array().unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0]["section_code"], "CSF24A");
    assert_eq!(mine[0]["room"], "A-101");

    // The assigned instructor sees the same meeting
    let (_, body) = app
        .request("GET", "/api/schedules/my", Some(&faculty_token), None)
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}
