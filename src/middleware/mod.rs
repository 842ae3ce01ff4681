//! Extractors and middleware for request processing.
//!
//! - [`auth`]: [`auth::AuthUser`], the bearer-token extractor
//! - [`role`]: [`role::RequireTeacher`] and [`role::RequireStudent`] guards
//! - [`rate_limit`]: per-IP rate limiting for the public auth endpoints
//!
//! Guards authenticate first, then look up the caller's Teacher or Student row.
//! The lookup happens on every request, so a role change is effective at once
//! instead of when the access token expires.
//!
//! ```ignore
//! async fn create_course(
//!     State(state): State<AppState>,
//!     teacher: RequireTeacher,
//!     ValidatedJson(dto): ValidatedJson<CreateCourseDto>,
//! ) -> Result<Json<Course>, AppError> {
//!     CourseService::create_course(&state.db, teacher.teacher_id, dto).await.map(Json)
//! }
//! ```

pub mod auth;
pub mod rate_limit;
pub mod role;
