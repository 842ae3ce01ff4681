use coursebook_core::AppError;
use coursebook_models::{EnrollDto, Enrollment, MyEnrollment};
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::modules::courses::service::CourseService;
use crate::modules::{DbResultExt, conflict_on_unique};

const ALREADY_ENROLLED: &str = "Already enrolled in this course";

pub struct EnrollmentService;

impl EnrollmentService {
    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "enrollments"))]
    pub async fn enroll(
        db: &PgPool,
        student_id: Uuid,
        dto: EnrollDto,
    ) -> Result<Enrollment, AppError> {
        let course = CourseService::find_by_id(db, dto.course_id).await?;

        let enrollment = sqlx::query_as::<_, Enrollment>(
            "INSERT INTO enrollments (student_id, course_id)
             VALUES ($1, $2)
             RETURNING *",
        )
        .bind(student_id)
        .bind(course.id)
        .fetch_one(db)
        .await
        .map_err(|e| conflict_on_unique(e, ALREADY_ENROLLED, "Failed to enroll"))?;

        info!(student_id = %student_id, course_id = %course.id, "Student enrolled");
        Ok(enrollment)
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "enrollments"))]
    pub async fn my_enrollments(db: &PgPool, student_id: Uuid) -> Result<Vec<MyEnrollment>, AppError> {
        sqlx::query_as::<_, MyEnrollment>(
            "SELECT e.id AS enrollment_id, c.id AS course_id, c.title, c.code, c.room,
                    u.first_name AS teacher_first_name, u.last_name AS teacher_last_name,
                    g.grade, e.enrolled_at
             FROM enrollments e
             JOIN courses c ON c.id = e.course_id
             JOIN teachers t ON t.id = c.teacher_id
             JOIN users u ON u.id = t.user_id
             LEFT JOIN grades g ON g.course_id = e.course_id AND g.student_id = e.student_id
             WHERE e.student_id = $1
             ORDER BY e.enrolled_at DESC",
        )
        .bind(student_id)
        .fetch_all(db)
        .await
        .db_context("Failed to fetch enrollments")
    }

    /// Grades already given for the course are kept.
    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "enrollments"))]
    pub async fn unenroll(db: &PgPool, student_id: Uuid, course_id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM enrollments WHERE student_id = $1 AND course_id = $2")
            .bind(student_id)
            .bind(course_id)
            .execute(db)
            .await
            .db_context("Failed to unenroll")?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("Enrollment not found"));
        }

        info!(student_id = %student_id, course_id = %course_id, "Student unenrolled");
        Ok(())
    }
}
