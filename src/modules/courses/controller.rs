use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use coursebook_core::AppError;
use coursebook_models::{
    CourseDetail, CourseQuery, CourseSchedulesResponse, CourseStatisticsResponse, CreateCourseDto,
    EnrolledStudentsResponse, MessageResponse, PaginatedCoursesResponse, UpdateCourseDto,
};
use tracing::instrument;

use super::service::CourseService;
use crate::middleware::auth::AuthUser;
use crate::middleware::role::RequireTeacher;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// List courses with filters, sorting and pagination.
#[utoipa::path(
    get,
    path = "/api/courses",
    params(CourseQuery),
    responses(
        (status = 200, description = "Page of courses", body = PaginatedCoursesResponse),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, _auth_user))]
pub async fn list_courses(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Query(query): Query<CourseQuery>,
) -> Result<Json<PaginatedCoursesResponse>, AppError> {
    let courses = CourseService::list_courses(&state.db, query).await?;
    Ok(Json(courses))
}

#[utoipa::path(
    post,
    path = "/api/courses",
    request_body = CreateCourseDto,
    responses(
        (status = 201, description = "Course created", body = CourseDetail),
        (status = 400, description = "Invalid dates or schedule", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Teacher access required", body = ErrorResponse),
        (status = 409, description = "Course code already exists", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, teacher, dto), fields(teacher_id = %teacher.teacher_id))]
pub async fn create_course(
    State(state): State<AppState>,
    teacher: RequireTeacher,
    ValidatedJson(dto): ValidatedJson<CreateCourseDto>,
) -> Result<(StatusCode, Json<CourseDetail>), AppError> {
    let course = CourseService::create_course(&state.db, teacher.teacher_id, dto).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

#[utoipa::path(
    get,
    path = "/api/courses/{code}",
    params(("code" = String, Path, description = "Course code")),
    responses(
        (status = 200, description = "Course with teacher and schedules", body = CourseDetail),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_course(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(code): Path<String>,
) -> Result<Json<CourseDetail>, AppError> {
    let course = CourseService::get_course_by_code(&state.db, &code).await?;
    Ok(Json(course))
}

/// Update a course. A `schedule` array replaces every existing slot.
#[utoipa::path(
    put,
    path = "/api/courses/{code}",
    params(("code" = String, Path, description = "Course code")),
    request_body = UpdateCourseDto,
    responses(
        (status = 200, description = "Course updated", body = CourseDetail),
        (status = 400, description = "Invalid dates or schedule", body = ErrorResponse),
        (status = 403, description = "Not the course owner", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 409, description = "Course code already exists", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, teacher, dto), fields(teacher_id = %teacher.teacher_id))]
pub async fn update_course(
    State(state): State<AppState>,
    teacher: RequireTeacher,
    Path(code): Path<String>,
    ValidatedJson(dto): ValidatedJson<UpdateCourseDto>,
) -> Result<Json<CourseDetail>, AppError> {
    let course = CourseService::update_course(&state.db, teacher.teacher_id, &code, dto).await?;
    Ok(Json(course))
}

#[utoipa::path(
    delete,
    path = "/api/courses/{code}",
    params(("code" = String, Path, description = "Course code")),
    responses(
        (status = 200, description = "Course deleted", body = MessageResponse),
        (status = 403, description = "Not the course owner", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, teacher), fields(teacher_id = %teacher.teacher_id))]
pub async fn delete_course(
    State(state): State<AppState>,
    teacher: RequireTeacher,
    Path(code): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    CourseService::delete_course(&state.db, teacher.teacher_id, &code).await?;
    Ok(Json(MessageResponse::new("Course deleted successfully")))
}

#[utoipa::path(
    get,
    path = "/api/courses/{code}/enrolled-students",
    params(("code" = String, Path, description = "Course code")),
    responses(
        (status = 200, description = "Students enrolled in the course", body = EnrolledStudentsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_enrolled_students(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(code): Path<String>,
) -> Result<Json<EnrolledStudentsResponse>, AppError> {
    let students = CourseService::get_enrolled_students(&state.db, &code).await?;
    Ok(Json(students))
}

#[utoipa::path(
    get,
    path = "/api/courses/{code}/schedules",
    params(("code" = String, Path, description = "Course code")),
    responses(
        (status = 200, description = "Weekly schedule", body = CourseSchedulesResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_course_schedules(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(code): Path<String>,
) -> Result<Json<CourseSchedulesResponse>, AppError> {
    let schedules = CourseService::get_course_schedules(&state.db, &code).await?;
    Ok(Json(schedules))
}

#[utoipa::path(
    get,
    path = "/api/courses/{code}/statistics",
    params(("code" = String, Path, description = "Course code")),
    responses(
        (status = 200, description = "Enrollment and grade statistics", body = CourseStatisticsResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Courses"
)]
#[instrument(skip(state, _auth_user))]
pub async fn get_course_statistics(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(code): Path<String>,
) -> Result<Json<CourseStatisticsResponse>, AppError> {
    let stats = CourseService::get_course_statistics(&state.db, &code).await?;
    Ok(Json(stats))
}
