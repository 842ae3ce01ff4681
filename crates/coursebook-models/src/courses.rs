//! Courses, weekly schedules, listing filters and course reports.

use chrono::{DateTime, NaiveDate, Utc};
use coursebook_core::pagination::{PaginationMeta, PaginationParams};
use coursebook_core::serde::{deserialize_optional_i64, deserialize_optional_uuid, empty_string_as_none};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::grades::CourseGradeStatistics;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[schema(example = "CS101")]
    pub code: String,
    pub teacher_id: Uuid,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub room: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One weekly slot. `day_of_week` is 0 (Sunday) to 6 (Saturday).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Schedule {
    pub id: Uuid,
    pub course_id: Uuid,
    pub day_of_week: i16,
    #[schema(example = "10:00")]
    pub start_time: String,
    #[schema(example = "12:00")]
    pub end_time: String,
    pub room: Option<String>,
}

/// Validator hook for `HH:MM` (24h) times.
pub fn validate_time_of_day(value: &str) -> Result<(), ValidationError> {
    let valid = value.len() == 5
        && value.as_bytes()[2] == b':'
        && match (value[..2].parse::<u8>(), value[3..].parse::<u8>()) {
            (Ok(h), Ok(m)) => h < 24 && m < 60,
            _ => false,
        };

    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("time_of_day").with_message("Time must be in HH:MM format".into()))
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ScheduleDto {
    #[validate(range(min = 0, max = 6, message = "day_of_week must be between 0 and 6"))]
    pub day_of_week: i16,
    #[validate(custom(function = "validate_time_of_day"))]
    #[schema(example = "10:00")]
    pub start_time: String,
    #[validate(custom(function = "validate_time_of_day"))]
    #[schema(example = "12:00")]
    pub end_time: String,
    #[validate(length(max = 100))]
    pub room: Option<String>,
}

impl ScheduleDto {
    /// `HH:MM` strings compare correctly as text once validated.
    pub fn is_ordered(&self) -> bool {
        self.start_time < self.end_time
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCourseDto {
    #[validate(length(min = 1, max = 255))]
    #[schema(example = "Introduction to Computer Science")]
    pub title: String,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 50))]
    #[schema(example = "CS101")]
    pub code: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[validate(length(max = 100))]
    pub room: Option<String>,
    #[validate(nested)]
    pub schedule: Option<Vec<ScheduleDto>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCourseDto {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub code: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[validate(length(max = 100))]
    pub room: Option<String>,
    /// Replaces every existing slot when present
    #[validate(nested)]
    pub schedule: Option<Vec<ScheduleDto>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TeacherSummary {
    /// Teacher id
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// A course row joined with its teacher's user row.
#[derive(Debug, Clone, FromRow)]
pub struct CourseRow {
    #[sqlx(flatten)]
    pub course: Course,
    pub teacher_first_name: String,
    pub teacher_last_name: String,
    pub teacher_email: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseWithTeacher {
    #[serde(flatten)]
    pub course: Course,
    pub teacher: TeacherSummary,
}

impl From<CourseRow> for CourseWithTeacher {
    fn from(row: CourseRow) -> Self {
        let teacher = TeacherSummary {
            id: row.course.teacher_id,
            first_name: row.teacher_first_name,
            last_name: row.teacher_last_name,
            email: row.teacher_email,
        };
        Self {
            course: row.course,
            teacher,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub teacher: TeacherSummary,
    pub schedules: Vec<Schedule>,
}

/// A course with its schedule, used in a teacher's own course list.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseWithSchedules {
    #[serde(flatten)]
    pub course: Course,
    pub schedules: Vec<Schedule>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CourseSortBy {
    Title,
    Code,
    StartDate,
    EndDate,
    #[default]
    CreatedAt,
}

impl CourseSortBy {
    pub fn column(self) -> &'static str {
        match self {
            Self::Title => "c.title",
            Self::Code => "c.code",
            Self::StartDate => "c.start_date",
            Self::EndDate => "c.end_date",
            Self::CreatedAt => "c.created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Filters, sorting and paging for `GET /api/courses`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CourseQuery {
    /// Page number (1-indexed, default: 1)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
    /// Items per page (1-100, default: 10)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
    /// Case-insensitive match against title, code and description
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub search: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_uuid")]
    pub teacher_id: Option<Uuid>,
    /// Exact course code (case-insensitive)
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub code: Option<String>,
    /// Courses starting on or after this date
    pub start_date_from: Option<NaiveDate>,
    /// Courses ending on or before this date
    pub end_date_to: Option<NaiveDate>,
    #[param(inline)]
    pub sort_by: Option<CourseSortBy>,
    #[param(inline)]
    pub sort_order: Option<SortOrder>,
}

impl CourseQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams {
            page: self.page,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedCoursesResponse {
    pub data: Vec<CourseWithTeacher>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaginatedCoursesWithSchedules {
    pub data: Vec<CourseWithSchedules>,
    pub meta: PaginationMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudentUser {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct EnrolledStudentRow {
    pub enrollment_id: Uuid,
    pub student_id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub enrolled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EnrolledStudent {
    pub enrollment_id: Uuid,
    pub student_id: Uuid,
    pub user: StudentUser,
    pub enrolled_at: DateTime<Utc>,
}

impl From<EnrolledStudentRow> for EnrolledStudent {
    fn from(row: EnrolledStudentRow) -> Self {
        Self {
            enrollment_id: row.enrollment_id,
            student_id: row.student_id,
            user: StudentUser {
                id: row.user_id,
                email: row.email,
                first_name: row.first_name,
                last_name: row.last_name,
            },
            enrolled_at: row.enrolled_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EnrolledStudentsResponse {
    pub course_id: Uuid,
    pub course_title: String,
    pub total_enrolled: i64,
    pub students: Vec<EnrolledStudent>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct CourseBrief {
    pub id: Uuid,
    pub title: String,
    pub code: String,
    pub room: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseSchedulesResponse {
    pub course: CourseBrief,
    pub schedules: Vec<Schedule>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EnrollmentStats {
    pub total_enrolled: i64,
    pub ungraded: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GradeStats {
    pub total_graded: i64,
    pub average_grade: f64,
    pub highest_grade: f64,
    pub lowest_grade: f64,
}

impl From<&CourseGradeStatistics> for GradeStats {
    fn from(stats: &CourseGradeStatistics) -> Self {
        Self {
            total_graded: stats.total_students,
            average_grade: stats.average_grade,
            highest_grade: stats.highest_grade,
            lowest_grade: stats.lowest_grade,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseStatisticsResponse {
    pub course_id: Uuid,
    pub course_title: String,
    pub course_code: String,
    pub enrollment_stats: EnrollmentStats,
    pub grade_stats: GradeStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(day: i16, start: &str, end: &str) -> ScheduleDto {
        ScheduleDto {
            day_of_week: day,
            start_time: start.to_string(),
            end_time: end.to_string(),
            room: None,
        }
    }

    #[test]
    fn time_of_day_format() {
        assert!(validate_time_of_day("00:00").is_ok());
        assert!(validate_time_of_day("23:59").is_ok());
        assert!(validate_time_of_day("24:00").is_err());
        assert!(validate_time_of_day("9:00").is_err());
        assert!(validate_time_of_day("10:60").is_err());
        assert!(validate_time_of_day("ab:cd").is_err());
        assert!(validate_time_of_day("10-00").is_err());
    }

    #[test]
    fn schedule_day_range() {
        assert!(slot(0, "10:00", "12:00").validate().is_ok());
        assert!(slot(6, "10:00", "12:00").validate().is_ok());
        assert!(slot(7, "10:00", "12:00").validate().is_err());
        assert!(slot(-1, "10:00", "12:00").validate().is_err());
    }

    #[test]
    fn schedule_ordering() {
        assert!(slot(1, "10:00", "12:00").is_ordered());
        assert!(!slot(1, "12:00", "10:00").is_ordered());
        assert!(!slot(1, "10:00", "10:00").is_ordered());
    }

    #[test]
    fn nested_schedules_are_validated() {
        let dto = CreateCourseDto {
            title: "Intro".to_string(),
            description: None,
            code: "CS101".to_string(),
            start_date: None,
            end_date: None,
            room: None,
            schedule: Some(vec![slot(1, "10:00", "25:00")]),
        };
        assert!(dto.validate().is_err());
    }

    #[test]
    fn query_parses_filters() {
        let query: CourseQuery = serde_json::from_value(serde_json::json!({
            "page": "2",
            "limit": "5",
            "search": "intro",
            "teacher_id": "",
            "start_date_from": "2025-10-01",
            "sort_by": "start_date",
            "sort_order": "desc"
        }))
        .unwrap();

        assert_eq!(query.pagination().page(), 2);
        assert_eq!(query.pagination().limit(), 5);
        assert_eq!(query.search.as_deref(), Some("intro"));
        assert!(query.teacher_id.is_none());
        assert_eq!(
            query.start_date_from,
            NaiveDate::from_ymd_opt(2025, 10, 1)
        );
        assert_eq!(query.sort_by, Some(CourseSortBy::StartDate));
        assert_eq!(query.sort_order.unwrap_or_default().keyword(), "DESC");
    }

    #[test]
    fn unknown_sort_column_is_rejected() {
        let result: Result<CourseQuery, _> =
            serde_json::from_value(serde_json::json!({ "sort_by": "password" }));
        assert!(result.is_err());
    }

    #[test]
    fn sort_defaults() {
        assert_eq!(CourseSortBy::default().column(), "c.created_at");
        assert_eq!(SortOrder::default().keyword(), "ASC");
    }
}
