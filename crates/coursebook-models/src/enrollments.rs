//! Student enrollments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Enrollment {
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub enrolled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct EnrollDto {
    pub course_id: Uuid,
}

/// One of the caller's enrollments with the course, its teacher and the
/// caller's grade if one has been given.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct MyEnrollment {
    pub enrollment_id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub code: String,
    pub room: Option<String>,
    pub teacher_first_name: String,
    pub teacher_last_name: String,
    pub grade: Option<f64>,
    pub enrolled_at: DateTime<Utc>,
}
