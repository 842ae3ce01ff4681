//! Router tests that never reach PostgreSQL: the pool points at a closed port
//! and every request here is answered before a query is made.

mod common;

use axum::http::StatusCode;
use common::{access_token_for, json_request, send, test_app, unique_email, unreachable_pool};
use coursebook_auth::create_password_reset_token;
use coursebook_config::JwtConfig;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn test_health_reports_unavailable_database() {
    let app = test_app(unreachable_pool());

    let (status, body) = send(&app, json_request("GET", "/health", None, None)).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "unavailable");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = test_app(unreachable_pool());

    let (status, body) = send(&app, json_request("GET", "/api-docs/openapi.json", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["info"]["title"], "Coursebook API");
    assert!(body["paths"]["/api/courses"].is_object());
}

#[tokio::test]
async fn test_protected_routes_require_a_token() {
    let app = test_app(unreachable_pool());

    for (method, uri) in [
        ("GET", "/api/courses"),
        ("GET", "/api/courses/CS101"),
        ("GET", "/api/auth/profile"),
        ("GET", "/api/auth/session"),
        ("POST", "/api/auth/logout"),
        ("GET", "/api/teachers/me"),
        ("GET", "/api/enrollments/me"),
    ] {
        let (status, body) = send(&app, json_request(method, uri, None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
        assert_eq!(body["error"], "Missing or invalid authorization header");
    }
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let app = test_app(unreachable_pool());

    let (status, _) = send(
        &app,
        json_request("GET", "/api/courses", Some("not-a-jwt"), None),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_missing_after_fresh_token() {
    let app = test_app(unreachable_pool());
    let token = access_token_for(Uuid::new_v4(), "nobody@test.com");

    let (status, body) = send(&app, json_request("GET", "/api/auth/session", Some(&token), None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "No active session");
}

#[tokio::test]
async fn test_signup_validation_errors() {
    let app = test_app(unreachable_pool());

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/signup",
            None,
            Some(json!({
                "email": "not-an-email",
                "password": "weak",
                "first_name": "Ada",
                "last_name": "Lovelace"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/signup",
            None,
            Some(json!({
                "email": unique_email(),
                "password": "Password123"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "first_name is required");
}

#[tokio::test]
async fn test_signup_without_content_type() {
    let app = test_app(unreachable_pool());

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/auth/signup")
        .body(axum::body::Body::from("{}"))
        .unwrap();
    let (status, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_refresh_requires_a_token() {
    let app = test_app(unreachable_pool());

    let (status, body) = send(
        &app,
        json_request("POST", "/api/auth/refresh", None, Some(json!({ "refresh_token": "" }))),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Refresh token is required");
}

#[tokio::test]
async fn test_reset_password_mismatch() {
    let app = test_app(unreachable_pool());

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/reset-password",
            None,
            Some(json!({
                "token": "anything",
                "new_password": "NewPass123",
                "confirm_password": "OtherPass123"
            })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Passwords do not match");
}

#[tokio::test]
async fn test_reset_password_invalid_token() {
    let app = test_app(unreachable_pool());

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/reset-password",
            None,
            Some(json!({
                "token": "not-a-reset-token",
                "new_password": "NewPass123",
                "confirm_password": "NewPass123"
            })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_reset_password_without_server_record() {
    let app = test_app(unreachable_pool());
    // Correctly signed, but never issued through forgot-password.
    let token =
        create_password_reset_token(Uuid::new_v4(), "nobody@test.com", &JwtConfig::default())
            .unwrap();

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/reset-password",
            None,
            Some(json!({
                "token": token,
                "new_password": "NewPass123",
                "confirm_password": "NewPass123"
            })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Reset token has already been used or has expired");
}

#[tokio::test]
async fn test_access_token_is_not_a_reset_token() {
    let app = test_app(unreachable_pool());
    let token = access_token_for(Uuid::new_v4(), "nobody@test.com");

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/reset-password",
            None,
            Some(json!({
                "token": token,
                "new_password": "NewPass123",
                "confirm_password": "NewPass123"
            })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_forgot_password_validates_email() {
    let app = test_app(unreachable_pool());

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/forgot-password",
            None,
            Some(json!({ "email": "nope" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let app = test_app(unreachable_pool());

    let (status, _) = send(&app, json_request("GET", "/api/nope", None, None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
