use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use coursebook_core::AppError;
use coursebook_models::{EnrollDto, Enrollment, MessageResponse, MyEnrollment};
use tracing::instrument;
use uuid::Uuid;

use super::service::EnrollmentService;
use crate::middleware::role::RequireStudent;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    post,
    path = "/api/enrollments",
    request_body = EnrollDto,
    responses(
        (status = 201, description = "Enrolled", body = Enrollment),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Student access required", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 409, description = "Already enrolled", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
#[instrument(skip(state, student, dto), fields(student_id = %student.student_id))]
pub async fn enroll(
    State(state): State<AppState>,
    student: RequireStudent,
    ValidatedJson(dto): ValidatedJson<EnrollDto>,
) -> Result<(StatusCode, Json<Enrollment>), AppError> {
    let enrollment = EnrollmentService::enroll(&state.db, student.student_id, dto).await?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}

/// The caller's courses, each with the caller's grade when one exists.
#[utoipa::path(
    get,
    path = "/api/enrollments/me",
    responses(
        (status = 200, description = "Caller's enrollments", body = Vec<MyEnrollment>),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Student access required", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
#[instrument(skip(state, student), fields(student_id = %student.student_id))]
pub async fn my_enrollments(
    State(state): State<AppState>,
    student: RequireStudent,
) -> Result<Json<Vec<MyEnrollment>>, AppError> {
    let enrollments = EnrollmentService::my_enrollments(&state.db, student.student_id).await?;
    Ok(Json(enrollments))
}

#[utoipa::path(
    delete,
    path = "/api/enrollments/{course_id}",
    params(("course_id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Unenrolled", body = MessageResponse),
        (status = 403, description = "Student access required", body = ErrorResponse),
        (status = 404, description = "Enrollment not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Enrollments"
)]
#[instrument(skip(state, student), fields(student_id = %student.student_id))]
pub async fn unenroll(
    State(state): State<AppState>,
    student: RequireStudent,
    Path(course_id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    EnrollmentService::unenroll(&state.db, student.student_id, course_id).await?;
    Ok(Json(MessageResponse::new("Unenrolled successfully")))
}
