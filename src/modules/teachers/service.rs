use std::collections::HashMap;

use coursebook_cache::{CacheStore, invalidate};
use coursebook_core::AppError;
use coursebook_core::pagination::PaginationParams;
use coursebook_models::{
    Course, CourseGradeStatistics, CourseGradesResponse, CourseWithSchedules, CreateGradeDto,
    EnrolledStudentsResponse, Grade, GradeWithStudent, PaginatedCoursesWithSchedules, RoleChange,
    RoleChangeResponse, RoleUser, Schedule, TeacherProfile, UpdateGradeDto, UpdateUserRoleDto,
    plan_role_change,
};
use sqlx::PgPool;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::metrics;
use crate::modules::courses::service::CourseService;
use crate::modules::{DbResultExt, conflict_on_unique};

const GRADE_EXISTS: &str =
    "Grade already exists for this student in this course. Use PATCH to update.";

pub struct TeacherService;

impl TeacherService {
    /// Grant or revoke the teacher role on another account. The Student and
    /// Teacher rows are swapped in one transaction with the target row locked.
    ///
    /// Revoking deletes the Teacher row, and with it (through `ON DELETE CASCADE`)
    /// every course the teacher owns along with its schedules, enrollments and
    /// grades. The number of removed courses is logged.
    #[instrument(skip(db, cache, dto), fields(db.operation = "UPDATE", db.table = "teachers", target = %dto.user_id))]
    pub async fn update_user_role(
        db: &PgPool,
        cache: &CacheStore,
        requester_id: Uuid,
        dto: UpdateUserRoleDto,
    ) -> Result<RoleChangeResponse, AppError> {
        let mut tx = db.begin().await.db_context("Failed to begin transaction")?;

        let requester_is_teacher: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM teachers WHERE user_id = $1)")
                .bind(requester_id)
                .fetch_one(&mut *tx)
                .await
                .db_context("Failed to check requester role")?;
        if !requester_is_teacher {
            return Err(AppError::forbidden("Only teachers can assign roles"));
        }

        if dto.user_id == requester_id {
            return Err(AppError::bad_request("Cannot modify your own teacher role"));
        }

        let target = sqlx::query_as::<_, RoleUser>(
            "SELECT u.id, u.email, u.first_name, u.last_name,
                    EXISTS(SELECT 1 FROM teachers t WHERE t.user_id = u.id) AS is_teacher,
                    EXISTS(SELECT 1 FROM students s WHERE s.user_id = u.id) AS is_student
             FROM users u
             WHERE u.id = $1
             FOR UPDATE OF u",
        )
        .bind(dto.user_id)
        .fetch_optional(&mut *tx)
        .await
        .db_context("Failed to fetch user")?
        .ok_or_else(|| AppError::not_found("User not found"))?;

        let change = plan_role_change(dto.is_teacher, target.is_teacher, target.is_student)?;

        match change {
            RoleChange::Grant { remove_student } => {
                sqlx::query("INSERT INTO teachers (user_id) VALUES ($1)")
                    .bind(target.id)
                    .execute(&mut *tx)
                    .await
                    .db_context("Failed to create teacher profile")?;

                if remove_student {
                    sqlx::query("DELETE FROM students WHERE user_id = $1")
                        .bind(target.id)
                        .execute(&mut *tx)
                        .await
                        .db_context("Failed to remove student profile")?;
                }
            }
            RoleChange::Revoke { create_student } => {
                let removed_courses: i64 = sqlx::query_scalar(
                    "SELECT COUNT(*) FROM courses c
                     JOIN teachers t ON t.id = c.teacher_id
                     WHERE t.user_id = $1",
                )
                .bind(target.id)
                .fetch_one(&mut *tx)
                .await
                .db_context("Failed to count owned courses")?;

                sqlx::query("DELETE FROM teachers WHERE user_id = $1")
                    .bind(target.id)
                    .execute(&mut *tx)
                    .await
                    .db_context("Failed to remove teacher profile")?;

                if removed_courses > 0 {
                    warn!(
                        user_id = %target.id,
                        removed_courses,
                        "Teacher role revoked, owned courses removed"
                    );
                }

                if create_student {
                    sqlx::query("INSERT INTO students (user_id) VALUES ($1)")
                        .bind(target.id)
                        .execute(&mut *tx)
                        .await
                        .db_context("Failed to create student profile")?;
                }
            }
        }

        tx.commit().await.db_context("Failed to commit role change")?;

        invalidate::user(cache, target.id).await;
        metrics::track_role_change(dto.is_teacher);

        let full_name = format!("{} {}", target.first_name, target.last_name);
        let (is_teacher, is_student) = change.resulting_flags();
        info!(user_id = %target.id, is_teacher, "Teacher role changed");

        Ok(RoleChangeResponse {
            message: change.message(&full_name),
            user: RoleUser {
                is_teacher,
                is_student,
                ..target
            },
        })
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "teachers"))]
    pub async fn get_my_profile(db: &PgPool, teacher_id: Uuid) -> Result<TeacherProfile, AppError> {
        sqlx::query_as::<_, TeacherProfile>(
            "SELECT t.id, t.user_id, u.email, u.first_name, u.last_name, u.avatar_url,
                    (SELECT COUNT(*) FROM courses c WHERE c.teacher_id = t.id) AS total_courses,
                    t.created_at
             FROM teachers t
             JOIN users u ON u.id = t.user_id
             WHERE t.id = $1",
        )
        .bind(teacher_id)
        .fetch_optional(db)
        .await
        .db_context("Failed to fetch teacher profile")?
        .ok_or_else(|| AppError::not_found("Teacher profile not found"))
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "courses"))]
    pub async fn get_my_courses(
        db: &PgPool,
        teacher_id: Uuid,
        pagination: PaginationParams,
    ) -> Result<PaginatedCoursesWithSchedules, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses WHERE teacher_id = $1")
            .bind(teacher_id)
            .fetch_one(db)
            .await
            .db_context("Failed to count courses")?;

        let courses = sqlx::query_as::<_, Course>(
            "SELECT * FROM courses
             WHERE teacher_id = $1
             ORDER BY created_at DESC, id
             LIMIT $2 OFFSET $3",
        )
        .bind(teacher_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(db)
        .await
        .db_context("Failed to fetch courses")?;

        let ids: Vec<Uuid> = courses.iter().map(|c| c.id).collect();
        let mut by_course: HashMap<Uuid, Vec<Schedule>> = HashMap::new();
        for schedule in CourseService::schedules_for(db, &ids).await? {
            by_course.entry(schedule.course_id).or_default().push(schedule);
        }

        let data = courses
            .into_iter()
            .map(|course| CourseWithSchedules {
                schedules: by_course.remove(&course.id).unwrap_or_default(),
                course,
            })
            .collect();

        Ok(PaginatedCoursesWithSchedules {
            data,
            meta: pagination.meta(total),
        })
    }

    async fn owned_course(db: &PgPool, teacher_id: Uuid, course_id: Uuid) -> Result<Course, AppError> {
        CourseService::ensure_owner(CourseService::find_by_id(db, course_id).await?, teacher_id)
    }

    pub async fn get_course_enrollments(
        db: &PgPool,
        teacher_id: Uuid,
        course_id: Uuid,
    ) -> Result<EnrolledStudentsResponse, AppError> {
        let course = Self::owned_course(db, teacher_id, course_id).await?;
        CourseService::enrolled_students(db, &course).await
    }

    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "grades"))]
    pub async fn assign_grade(
        db: &PgPool,
        teacher_id: Uuid,
        dto: CreateGradeDto,
    ) -> Result<Grade, AppError> {
        let course = Self::owned_course(db, teacher_id, dto.course_id).await?;

        let student_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM students WHERE id = $1)")
                .bind(dto.student_id)
                .fetch_one(db)
                .await
                .db_context("Failed to check student")?;
        if !student_exists {
            return Err(AppError::not_found("Student not found"));
        }

        let enrolled: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM enrollments WHERE student_id = $1 AND course_id = $2)",
        )
        .bind(dto.student_id)
        .bind(course.id)
        .fetch_one(db)
        .await
        .db_context("Failed to check enrollment")?;
        if !enrolled {
            return Err(AppError::bad_request("Student is not enrolled in this course"));
        }

        let graded: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM grades WHERE student_id = $1 AND course_id = $2 AND teacher_id = $3
             )",
        )
        .bind(dto.student_id)
        .bind(course.id)
        .bind(teacher_id)
        .fetch_one(db)
        .await
        .db_context("Failed to check existing grade")?;
        if graded {
            return Err(AppError::conflict(GRADE_EXISTS));
        }

        let grade = sqlx::query_as::<_, Grade>(
            "INSERT INTO grades (student_id, course_id, teacher_id, grade)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(dto.student_id)
        .bind(course.id)
        .bind(teacher_id)
        .bind(dto.grade)
        .fetch_one(db)
        .await
        .map_err(|e| conflict_on_unique(e, GRADE_EXISTS, "Failed to assign grade"))?;

        metrics::track_grade_assigned();
        info!(grade_id = %grade.id, course_id = %course.id, "Grade assigned");

        Ok(grade)
    }

    #[instrument(skip(db, dto), fields(db.operation = "UPDATE", db.table = "grades"))]
    pub async fn update_grade(
        db: &PgPool,
        teacher_id: Uuid,
        grade_id: Uuid,
        dto: UpdateGradeDto,
    ) -> Result<Grade, AppError> {
        let owner: Uuid = sqlx::query_scalar(
            "SELECT c.teacher_id FROM grades g JOIN courses c ON c.id = g.course_id WHERE g.id = $1",
        )
        .bind(grade_id)
        .fetch_optional(db)
        .await
        .db_context("Failed to fetch grade")?
        .ok_or_else(|| AppError::not_found("Grade not found"))?;

        if owner != teacher_id {
            return Err(AppError::forbidden("You cannot update this grade"));
        }

        let grade = sqlx::query_as::<_, Grade>(
            "UPDATE grades SET grade = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
        )
        .bind(dto.grade)
        .bind(grade_id)
        .fetch_optional(db)
        .await
        .db_context("Failed to update grade")?
        .ok_or_else(|| AppError::not_found("Grade not found"))?;

        info!(grade_id = %grade.id, "Grade updated");
        Ok(grade)
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "grades"))]
    pub async fn get_course_grades(
        db: &PgPool,
        teacher_id: Uuid,
        course_id: Uuid,
    ) -> Result<CourseGradesResponse, AppError> {
        let course = Self::owned_course(db, teacher_id, course_id).await?;

        let grades = sqlx::query_as::<_, GradeWithStudent>(
            "SELECT g.id, g.student_id, g.grade, u.first_name, u.last_name, u.email,
                    g.created_at, g.updated_at
             FROM grades g
             JOIN students s ON s.id = g.student_id
             JOIN users u ON u.id = s.user_id
             WHERE g.course_id = $1
             ORDER BY u.last_name, u.first_name",
        )
        .bind(course.id)
        .fetch_all(db)
        .await
        .db_context("Failed to fetch grades")?;

        let values: Vec<f64> = grades.iter().map(|g| g.grade).collect();

        Ok(CourseGradesResponse {
            course_id: course.id,
            statistics: CourseGradeStatistics::from_grades(&values),
            grades,
        })
    }

    pub async fn course_statistics(
        db: &PgPool,
        teacher_id: Uuid,
        course_id: Uuid,
    ) -> Result<CourseGradeStatistics, AppError> {
        let course = Self::owned_course(db, teacher_id, course_id).await?;
        let grades = CourseService::grades_of(db, course.id).await?;
        Ok(CourseGradeStatistics::from_grades(&grades))
    }
}
