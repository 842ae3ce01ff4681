use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use coursebook_core::AppError;
use coursebook_core::pagination::PaginationParams;
use coursebook_models::{
    CourseGradeStatistics, CourseGradesResponse, CreateGradeDto, EnrolledStudentsResponse, Grade,
    PaginatedCoursesWithSchedules, RoleChangeResponse, TeacherProfile, UpdateGradeDto,
    UpdateUserRoleDto,
};
use tracing::instrument;
use uuid::Uuid;

use super::service::TeacherService;
use crate::middleware::auth::AuthUser;
use crate::middleware::role::RequireTeacher;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

/// Grant or revoke teacher status on another account.
///
/// Granting replaces the target's Student profile with a Teacher profile;
/// revoking does the opposite.
#[utoipa::path(
    patch,
    path = "/api/teachers/users/role",
    request_body = UpdateUserRoleDto,
    responses(
        (status = 200, description = "Role updated", body = RoleChangeResponse),
        (status = 400, description = "Cannot modify your own role", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Only teachers can assign roles", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "User already has the requested role", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Teachers"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_user_role(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<UpdateUserRoleDto>,
) -> Result<Json<RoleChangeResponse>, AppError> {
    let response =
        TeacherService::update_user_role(&state.db, &state.cache, auth_user.user_id()?, dto).await?;
    Ok(Json(response))
}

#[utoipa::path(
    get,
    path = "/api/teachers/me",
    responses(
        (status = 200, description = "Caller's teacher profile", body = TeacherProfile),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Teacher access required", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Teachers"
)]
#[instrument(skip(state, teacher), fields(teacher_id = %teacher.teacher_id))]
pub async fn get_my_profile(
    State(state): State<AppState>,
    teacher: RequireTeacher,
) -> Result<Json<TeacherProfile>, AppError> {
    let profile = TeacherService::get_my_profile(&state.db, teacher.teacher_id).await?;
    Ok(Json(profile))
}

#[utoipa::path(
    get,
    path = "/api/teachers/my-courses",
    params(PaginationParams),
    responses(
        (status = 200, description = "Courses owned by the caller", body = PaginatedCoursesWithSchedules),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Teacher access required", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Teachers"
)]
#[instrument(skip(state, teacher), fields(teacher_id = %teacher.teacher_id))]
pub async fn get_my_courses(
    State(state): State<AppState>,
    teacher: RequireTeacher,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedCoursesWithSchedules>, AppError> {
    let courses = TeacherService::get_my_courses(&state.db, teacher.teacher_id, pagination).await?;
    Ok(Json(courses))
}

#[utoipa::path(
    get,
    path = "/api/teachers/courses/{course_id}/enrollments",
    params(("course_id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Students enrolled in the course", body = EnrolledStudentsResponse),
        (status = 403, description = "Not the course owner", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Teachers"
)]
#[instrument(skip(state, teacher), fields(teacher_id = %teacher.teacher_id))]
pub async fn get_course_enrollments(
    State(state): State<AppState>,
    teacher: RequireTeacher,
    Path(course_id): Path<Uuid>,
) -> Result<Json<EnrolledStudentsResponse>, AppError> {
    let students =
        TeacherService::get_course_enrollments(&state.db, teacher.teacher_id, course_id).await?;
    Ok(Json(students))
}

#[utoipa::path(
    post,
    path = "/api/teachers/grades",
    request_body = CreateGradeDto,
    responses(
        (status = 201, description = "Grade assigned", body = Grade),
        (status = 400, description = "Student is not enrolled in this course", body = ErrorResponse),
        (status = 403, description = "Not the course owner", body = ErrorResponse),
        (status = 404, description = "Course or student not found", body = ErrorResponse),
        (status = 409, description = "Grade already exists", body = ErrorResponse),
        (status = 422, description = "Grade out of range", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Teachers"
)]
#[instrument(skip(state, teacher, dto), fields(teacher_id = %teacher.teacher_id))]
pub async fn assign_grade(
    State(state): State<AppState>,
    teacher: RequireTeacher,
    ValidatedJson(dto): ValidatedJson<CreateGradeDto>,
) -> Result<(StatusCode, Json<Grade>), AppError> {
    let grade = TeacherService::assign_grade(&state.db, teacher.teacher_id, dto).await?;
    Ok((StatusCode::CREATED, Json(grade)))
}

#[utoipa::path(
    patch,
    path = "/api/teachers/grades/{grade_id}",
    params(("grade_id" = Uuid, Path, description = "Grade ID")),
    request_body = UpdateGradeDto,
    responses(
        (status = 200, description = "Grade updated", body = Grade),
        (status = 403, description = "You cannot update this grade", body = ErrorResponse),
        (status = 404, description = "Grade not found", body = ErrorResponse),
        (status = 422, description = "Grade out of range", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Teachers"
)]
#[instrument(skip(state, teacher, dto), fields(teacher_id = %teacher.teacher_id))]
pub async fn update_grade(
    State(state): State<AppState>,
    teacher: RequireTeacher,
    Path(grade_id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateGradeDto>,
) -> Result<Json<Grade>, AppError> {
    let grade = TeacherService::update_grade(&state.db, teacher.teacher_id, grade_id, dto).await?;
    Ok(Json(grade))
}

#[utoipa::path(
    get,
    path = "/api/teachers/courses/{course_id}/grades",
    params(("course_id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Grades with statistics", body = CourseGradesResponse),
        (status = 403, description = "Not the course owner", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Teachers"
)]
#[instrument(skip(state, teacher), fields(teacher_id = %teacher.teacher_id))]
pub async fn get_course_grades(
    State(state): State<AppState>,
    teacher: RequireTeacher,
    Path(course_id): Path<Uuid>,
) -> Result<Json<CourseGradesResponse>, AppError> {
    let grades = TeacherService::get_course_grades(&state.db, teacher.teacher_id, course_id).await?;
    Ok(Json(grades))
}

#[utoipa::path(
    get,
    path = "/api/teachers/courses/{course_id}/statistics",
    params(("course_id" = Uuid, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Grade statistics", body = CourseGradeStatistics),
        (status = 403, description = "Not the course owner", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Teachers"
)]
#[instrument(skip(state, teacher), fields(teacher_id = %teacher.teacher_id))]
pub async fn get_course_statistics(
    State(state): State<AppState>,
    teacher: RequireTeacher,
    Path(course_id): Path<Uuid>,
) -> Result<Json<CourseGradeStatistics>, AppError> {
    let stats = TeacherService::course_statistics(&state.db, teacher.teacher_id, course_id).await?;
    Ok(Json(stats))
}
