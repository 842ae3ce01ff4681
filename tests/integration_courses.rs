mod common;

use axum::http::StatusCode;
use common::{Role, create_user, json_request, send, test_app};
use serde_json::{Value, json};
use sqlx::PgPool;

fn course_body(code: &str) -> Value {
    json!({
        "title": "Introduction to Computer Science",
        "description": "Algorithms, data structures and a little bit of everything",
        "code": code,
        "start_date": "2025-09-01",
        "end_date": "2025-12-15",
        "room": "Room 101",
        "schedule": [
            { "day_of_week": 3, "start_time": "10:00", "end_time": "12:00" },
            { "day_of_week": 1, "start_time": "10:00", "end_time": "12:00", "room": "Lab 2" }
        ]
    })
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires Postgres"]
async fn test_create_course_requires_teacher(pool: PgPool) {
    let app = test_app(pool.clone());
    let student = create_user(&pool, Role::Student).await;

    let (status, body) = send(
        &app,
        json_request("POST", "/api/courses", Some(&student.token), Some(course_body("cs101"))),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Teacher access required");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires Postgres"]
async fn test_course_lifecycle(pool: PgPool) {
    let app = test_app(pool.clone());
    let teacher = create_user(&pool, Role::Teacher).await;

    let (status, created) = send(
        &app,
        json_request("POST", "/api/courses", Some(&teacher.token), Some(course_body("cs101"))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["code"], "CS101");
    assert_eq!(created["teacher"]["id"], teacher.role_id.to_string());
    assert_eq!(created["schedules"].as_array().unwrap().len(), 2);

    let (status, duplicate) = send(
        &app,
        json_request("POST", "/api/courses", Some(&teacher.token), Some(course_body("CS101"))),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(duplicate["error"], "Course with this code already exists");

    let (status, fetched) =
        send(&app, json_request("GET", "/api/courses/cs101", Some(&teacher.token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["title"], "Introduction to Computer Science");

    let (status, schedules) = send(
        &app,
        json_request("GET", "/api/courses/CS101/schedules", Some(&teacher.token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(schedules["course"]["code"], "CS101");
    assert_eq!(schedules["schedules"][0]["day_of_week"], 1);
    assert_eq!(schedules["schedules"][1]["day_of_week"], 3);

    let (status, updated) = send(
        &app,
        json_request(
            "PUT",
            "/api/courses/CS101",
            Some(&teacher.token),
            Some(json!({
                "title": "CS Fundamentals",
                "schedule": [{ "day_of_week": 5, "start_time": "08:00", "end_time": "09:30" }]
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "CS Fundamentals");
    assert_eq!(updated["room"], "Room 101");
    assert_eq!(updated["schedules"].as_array().unwrap().len(), 1);

    let (status, _) =
        send(&app, json_request("DELETE", "/api/courses/CS101", Some(&teacher.token), None)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) =
        send(&app, json_request("GET", "/api/courses/CS101", Some(&teacher.token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Course with code CS101 not found");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires Postgres"]
async fn test_course_date_and_schedule_rules(pool: PgPool) {
    let app = test_app(pool.clone());
    let teacher = create_user(&pool, Role::Teacher).await;

    let mut body = course_body("MATH200");
    body["end_date"] = json!("2025-08-01");
    let (status, _) =
        send(&app, json_request("POST", "/api/courses", Some(&teacher.token), Some(body))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut body = course_body("MATH200");
    body["schedule"] = json!([{ "day_of_week": 2, "start_time": "14:00", "end_time": "13:00" }]);
    let (status, _) =
        send(&app, json_request("POST", "/api/courses", Some(&teacher.token), Some(body))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut body = course_body("MATH200");
    body["schedule"] = json!([{ "day_of_week": 7, "start_time": "10:00", "end_time": "11:00" }]);
    let (status, _) =
        send(&app, json_request("POST", "/api/courses", Some(&teacher.token), Some(body))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires Postgres"]
async fn test_only_owner_can_modify(pool: PgPool) {
    let app = test_app(pool.clone());
    let owner = create_user(&pool, Role::Teacher).await;
    let other = create_user(&pool, Role::Teacher).await;

    send(
        &app,
        json_request("POST", "/api/courses", Some(&owner.token), Some(course_body("HIST100"))),
    )
    .await;

    let (status, body) = send(
        &app,
        json_request(
            "PUT",
            "/api/courses/HIST100",
            Some(&other.token),
            Some(json!({ "title": "Stolen" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "You do not own this course");

    let (status, _) =
        send(&app, json_request("DELETE", "/api/courses/HIST100", Some(&other.token), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires Postgres"]
async fn test_renaming_to_taken_code_conflicts(pool: PgPool) {
    let app = test_app(pool.clone());
    let teacher = create_user(&pool, Role::Teacher).await;

    for code in ["BIO101", "BIO102"] {
        send(
            &app,
            json_request("POST", "/api/courses", Some(&teacher.token), Some(course_body(code))),
        )
        .await;
    }

    let (status, _) = send(
        &app,
        json_request(
            "PUT",
            "/api/courses/BIO102",
            Some(&teacher.token),
            Some(json!({ "code": "bio101" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires Postgres"]
async fn test_list_courses_filters_and_paginates(pool: PgPool) {
    let app = test_app(pool.clone());
    let teacher = create_user(&pool, Role::Teacher).await;
    let other = create_user(&pool, Role::Teacher).await;

    for (owner, code, title, start) in [
        (&teacher, "WEB101", "Web Development", "2025-09-01"),
        (&teacher, "WEB201", "Advanced Web", "2026-01-10"),
        (&other, "ART101", "Drawing", "2025-09-01"),
    ] {
        let mut body = course_body(code);
        body["title"] = json!(title);
        body["start_date"] = json!(start);
        body["end_date"] = json!("2026-06-30");
        let (status, _) =
            send(&app, json_request("POST", "/api/courses", Some(&owner.token), Some(body))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, page) =
        send(&app, json_request("GET", "/api/courses?search=web", Some(&teacher.token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["meta"]["total"], 2);

    let uri = format!("/api/courses?teacher_id={}", other.role_id);
    let (_, page) = send(&app, json_request("GET", &uri, Some(&teacher.token), None)).await;
    assert_eq!(page["meta"]["total"], 1);
    assert_eq!(page["data"][0]["code"], "ART101");
    assert_eq!(page["data"][0]["teacher"]["email"], other.email);

    let (_, page) =
        send(&app, json_request("GET", "/api/courses?code=web201", Some(&teacher.token), None)).await;
    assert_eq!(page["meta"]["total"], 1);

    // Matched the way codes are stored: trimmed and uppercased.
    let (_, page) = send(
        &app,
        json_request("GET", "/api/courses?code=%20Web201%20", Some(&teacher.token), None),
    )
    .await;
    assert_eq!(page["meta"]["total"], 1);
    assert_eq!(page["data"][0]["code"], "WEB201");

    let (_, page) = send(
        &app,
        json_request(
            "GET",
            "/api/courses?start_date_from=2026-01-01",
            Some(&teacher.token),
            None,
        ),
    )
    .await;
    assert_eq!(page["meta"]["total"], 1);

    let (_, page) = send(
        &app,
        json_request(
            "GET",
            "/api/courses?sort_by=code&sort_order=desc&limit=2",
            Some(&teacher.token),
            None,
        ),
    )
    .await;
    assert_eq!(page["meta"]["total"], 3);
    assert_eq!(page["meta"]["total_pages"], 2);
    assert_eq!(page["meta"]["has_next_page"], true);
    assert_eq!(page["data"][0]["code"], "WEB201");
    assert_eq!(page["data"].as_array().unwrap().len(), 2);
}
