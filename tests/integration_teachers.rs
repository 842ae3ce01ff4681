mod common;

use axum::http::StatusCode;
use common::{Role, TestUser, create_user, json_request, send, test_app};
use serde_json::{Value, json};
use sqlx::PgPool;
use uuid::Uuid;

async fn create_course(app: &axum::Router, teacher: &TestUser, code: &str) -> Uuid {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/courses",
            Some(&teacher.token),
            Some(json!({ "title": "Statistics", "code": code })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().parse().unwrap()
}

async fn enroll(app: &axum::Router, student: &TestUser, course_id: Uuid) {
    let (status, _) = send(
        app,
        json_request(
            "POST",
            "/api/enrollments",
            Some(&student.token),
            Some(json!({ "course_id": course_id })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

async fn assign(
    app: &axum::Router,
    teacher: &TestUser,
    student: &TestUser,
    course_id: Uuid,
    grade: f64,
) -> (StatusCode, Value) {
    send(
        app,
        json_request(
            "POST",
            "/api/teachers/grades",
            Some(&teacher.token),
            Some(json!({
                "student_id": student.role_id,
                "course_id": course_id,
                "grade": grade
            })),
        ),
    )
    .await
}

async fn role_rows(pool: &PgPool, user_id: Uuid) -> (bool, bool) {
    sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM teachers WHERE user_id = $1),
                EXISTS(SELECT 1 FROM students WHERE user_id = $1)",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires Postgres"]
async fn test_role_toggle_swaps_profiles(pool: PgPool) {
    let app = test_app(pool.clone());
    let teacher = create_user(&pool, Role::Teacher).await;
    let student = create_user(&pool, Role::Student).await;

    let toggle = |grant: bool| {
        json_request(
            "PATCH",
            "/api/teachers/users/role",
            Some(&teacher.token),
            Some(json!({ "user_id": student.id, "is_teacher": grant })),
        )
    };

    let (status, body) = send(&app, toggle(true)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Test User is now a teacher");
    assert_eq!(body["user"]["is_teacher"], true);
    assert_eq!(body["user"]["is_student"], false);
    assert_eq!(role_rows(&pool, student.id).await, (true, false));

    let (status, body) = send(&app, toggle(true)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "User is already a teacher");

    let (status, body) = send(&app, toggle(false)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Test User is no longer a teacher");
    assert_eq!(role_rows(&pool, student.id).await, (false, true));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires Postgres"]
async fn test_role_toggle_guards(pool: PgPool) {
    let app = test_app(pool.clone());
    let teacher = create_user(&pool, Role::Teacher).await;
    let student = create_user(&pool, Role::Student).await;

    let (status, body) = send(
        &app,
        json_request(
            "PATCH",
            "/api/teachers/users/role",
            Some(&student.token),
            Some(json!({ "user_id": teacher.id, "is_teacher": false })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Only teachers can assign roles");

    let (status, body) = send(
        &app,
        json_request(
            "PATCH",
            "/api/teachers/users/role",
            Some(&teacher.token),
            Some(json!({ "user_id": teacher.id, "is_teacher": false })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Cannot modify your own teacher role");

    let (status, _) = send(
        &app,
        json_request(
            "PATCH",
            "/api/teachers/users/role",
            Some(&teacher.token),
            Some(json!({ "user_id": Uuid::new_v4(), "is_teacher": true })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires Postgres"]
async fn test_teacher_profile_and_courses(pool: PgPool) {
    let app = test_app(pool.clone());
    let teacher = create_user(&pool, Role::Teacher).await;
    create_course(&app, &teacher, "STAT101").await;
    create_course(&app, &teacher, "STAT102").await;

    let (status, profile) =
        send(&app, json_request("GET", "/api/teachers/me", Some(&teacher.token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["total_courses"], 2);
    assert_eq!(profile["email"], teacher.email);

    let (status, page) = send(
        &app,
        json_request("GET", "/api/teachers/my-courses?limit=1", Some(&teacher.token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["meta"]["total"], 2);
    assert_eq!(page["data"].as_array().unwrap().len(), 1);
    assert!(page["data"][0]["schedules"].is_array());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires Postgres"]
async fn test_grade_assignment_rules(pool: PgPool) {
    let app = test_app(pool.clone());
    let teacher = create_user(&pool, Role::Teacher).await;
    let other_teacher = create_user(&pool, Role::Teacher).await;
    let student = create_user(&pool, Role::Student).await;
    let course_id = create_course(&app, &teacher, "STAT201").await;

    let (status, body) = assign(&app, &teacher, &student, course_id, 4.0).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Student is not enrolled in this course");

    enroll(&app, &student, course_id).await;

    let (status, _) = assign(&app, &other_teacher, &student, course_id, 4.0).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = assign(&app, &teacher, &student, course_id, 5.5).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, grade) = assign(&app, &teacher, &student, course_id, 4.0).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(grade["grade"], 4.0);

    let (status, body) = assign(&app, &teacher, &student, course_id, 3.0).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body["error"],
        "Grade already exists for this student in this course. Use PATCH to update."
    );

    let grade_uri = format!("/api/teachers/grades/{}", grade["id"].as_str().unwrap());
    let (status, body) = send(
        &app,
        json_request("PATCH", &grade_uri, Some(&other_teacher.token), Some(json!({ "grade": 1.0 }))),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "You cannot update this grade");

    let (status, updated) = send(
        &app,
        json_request("PATCH", &grade_uri, Some(&teacher.token), Some(json!({ "grade": 4.5 }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["grade"], 4.5);

    let missing = format!("/api/teachers/grades/{}", Uuid::new_v4());
    let (status, _) = send(
        &app,
        json_request("PATCH", &missing, Some(&teacher.token), Some(json!({ "grade": 2.0 }))),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires Postgres"]
async fn test_course_grades_and_statistics(pool: PgPool) {
    let app = test_app(pool.clone());
    let teacher = create_user(&pool, Role::Teacher).await;
    let course_id = create_course(&app, &teacher, "STAT301").await;

    let (status, empty) = send(
        &app,
        json_request(
            "GET",
            &format!("/api/teachers/courses/{}/statistics", course_id),
            Some(&teacher.token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(empty["total_students"], 0);
    assert_eq!(empty["average_grade"], 0.0);

    let mut students = Vec::new();
    for grade in [2.0, 3.0, 4.0, 5.0] {
        let student = create_user(&pool, Role::Student).await;
        enroll(&app, &student, course_id).await;
        let (status, _) = assign(&app, &teacher, &student, course_id, grade).await;
        assert_eq!(status, StatusCode::CREATED);
        students.push(student);
    }
    let ungraded = create_user(&pool, Role::Student).await;
    enroll(&app, &ungraded, course_id).await;

    let (status, stats) = send(
        &app,
        json_request(
            "GET",
            &format!("/api/teachers/courses/{}/statistics", course_id),
            Some(&teacher.token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_students"], 4);
    assert_eq!(stats["average_grade"], 3.5);
    assert_eq!(stats["highest_grade"], 5.0);
    assert_eq!(stats["lowest_grade"], 2.0);
    assert_eq!(stats["distribution"]["1-2"], 1);
    assert_eq!(stats["distribution"]["4-5"], 1);

    let (status, grades) = send(
        &app,
        json_request(
            "GET",
            &format!("/api/teachers/courses/{}/grades", course_id),
            Some(&teacher.token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(grades["grades"].as_array().unwrap().len(), 4);
    assert_eq!(grades["statistics"]["total_students"], 4);

    let (status, enrollments) = send(
        &app,
        json_request(
            "GET",
            &format!("/api/teachers/courses/{}/enrollments", course_id),
            Some(&teacher.token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(enrollments["total_enrolled"], 5);

    let (status, report) = send(
        &app,
        json_request("GET", "/api/courses/STAT301/statistics", Some(&teacher.token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["enrollment_stats"]["total_enrolled"], 5);
    assert_eq!(report["enrollment_stats"]["ungraded"], 1);
    assert_eq!(report["grade_stats"]["total_graded"], 4);
    assert_eq!(report["grade_stats"]["average_grade"], 3.5);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires Postgres"]
async fn test_enrollment_lifecycle(pool: PgPool) {
    let app = test_app(pool.clone());
    let teacher = create_user(&pool, Role::Teacher).await;
    let student = create_user(&pool, Role::Student).await;
    let course_id = create_course(&app, &teacher, "STAT401").await;

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/enrollments",
            Some(&teacher.token),
            Some(json!({ "course_id": course_id })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Student access required");

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/enrollments",
            Some(&student.token),
            Some(json!({ "course_id": Uuid::new_v4() })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    enroll(&app, &student, course_id).await;

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/enrollments",
            Some(&student.token),
            Some(json!({ "course_id": course_id })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    assign(&app, &teacher, &student, course_id, 3.5).await;

    let (status, mine) =
        send(&app, json_request("GET", "/api/enrollments/me", Some(&student.token), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine[0]["code"], "STAT401");
    assert_eq!(mine[0]["grade"], 3.5);
    assert_eq!(mine[0]["teacher_first_name"], "Test");

    let uri = format!("/api/enrollments/{}", course_id);
    let (status, _) = send(&app, json_request("DELETE", &uri, Some(&student.token), None)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, json_request("DELETE", &uri, Some(&student.token), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires Postgres"]
async fn test_revoking_a_teacher_without_student_row(pool: PgPool) {
    let app = test_app(pool.clone());
    let admin = create_user(&pool, Role::Teacher).await;
    let teacher = create_user(&pool, Role::Teacher).await;
    let student = create_user(&pool, Role::Student).await;
    assert_eq!(role_rows(&pool, teacher.id).await, (true, false));

    let course_id = create_course(&app, &teacher, "OWN101").await;
    enroll(&app, &student, course_id).await;

    let (status, body) = send(
        &app,
        json_request(
            "PATCH",
            "/api/teachers/users/role",
            Some(&admin.token),
            Some(json!({ "user_id": teacher.id, "is_teacher": false })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["is_teacher"], false);
    assert_eq!(body["user"]["is_student"], true);
    assert_eq!(role_rows(&pool, teacher.id).await, (false, true));

    // Owned courses go with the Teacher row, enrollments with them.
    let (courses, enrollments): (i64, i64) = sqlx::query_as(
        "SELECT (SELECT COUNT(*) FROM courses WHERE id = $1),
                (SELECT COUNT(*) FROM enrollments WHERE course_id = $1)",
    )
    .bind(course_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!((courses, enrollments), (0, 0));

    // The demoted account can no longer change roles.
    let (status, body) = send(
        &app,
        json_request(
            "PATCH",
            "/api/teachers/users/role",
            Some(&teacher.token),
            Some(json!({ "user_id": student.id, "is_teacher": true })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Only teachers can assign roles");
    assert_eq!(role_rows(&pool, student.id).await, (false, true));
}
