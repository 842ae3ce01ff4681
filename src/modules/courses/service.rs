use chrono::NaiveDate;
use coursebook_core::AppError;
use coursebook_models::{
    Course, CourseBrief, CourseDetail, CourseGradeStatistics, CourseQuery, CourseRow,
    CourseSchedulesResponse, CourseStatisticsResponse, CourseWithTeacher, CreateCourseDto,
    EnrolledStudentRow, EnrolledStudentsResponse, EnrollmentStats, GradeStats,
    PaginatedCoursesResponse, Schedule, ScheduleDto, UpdateCourseDto,
};
use sqlx::{PgConnection, PgPool};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::metrics;
use crate::modules::{DbResultExt, conflict_on_unique};

const CODE_TAKEN: &str = "Course with this code already exists";

const COURSE_WITH_TEACHER: &str = "SELECT c.*,
        u.first_name AS teacher_first_name,
        u.last_name AS teacher_last_name,
        u.email AS teacher_email
 FROM courses c
 JOIN teachers t ON t.id = c.teacher_id
 JOIN users u ON u.id = t.user_id";

/// Listing filters; every parameter may be NULL, which disables the filter.
const LIST_FILTERS: &str = "WHERE ($1::text IS NULL
        OR c.title ILIKE $1 OR c.code ILIKE $1 OR c.description ILIKE $1)
   AND ($2::uuid IS NULL OR c.teacher_id = $2)
   AND ($3::text IS NULL OR c.code = $3)
   AND ($4::date IS NULL OR c.start_date >= $4)
   AND ($5::date IS NULL OR c.end_date <= $5)";

pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// `%term%` for ILIKE with the wildcard characters of `term` escaped.
fn search_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn check_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), AppError> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => {
            Err(AppError::bad_request("end_date must not be before start_date"))
        }
        _ => Ok(()),
    }
}

fn check_schedules(schedules: &[ScheduleDto]) -> Result<(), AppError> {
    if schedules.iter().all(ScheduleDto::is_ordered) {
        Ok(())
    } else {
        Err(AppError::bad_request(
            "Schedule start_time must be before end_time",
        ))
    }
}

pub struct CourseService;

impl CourseService {
    pub async fn find_by_code(db: &PgPool, code: &str) -> Result<Course, AppError> {
        let code = normalize_code(code);
        sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE code = $1")
            .bind(&code)
            .fetch_optional(db)
            .await
            .db_context("Failed to fetch course")?
            .ok_or_else(|| AppError::not_found(format!("Course with code {} not found", code)))
    }

    pub async fn find_by_id(db: &PgPool, course_id: Uuid) -> Result<Course, AppError> {
        sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = $1")
            .bind(course_id)
            .fetch_optional(db)
            .await
            .db_context("Failed to fetch course")?
            .ok_or_else(|| AppError::not_found("Course not found"))
    }

    /// The course if `teacher_id` owns it: 404 when missing, 403 otherwise.
    pub fn ensure_owner(course: Course, teacher_id: Uuid) -> Result<Course, AppError> {
        if course.teacher_id == teacher_id {
            Ok(course)
        } else {
            Err(AppError::forbidden("You do not own this course"))
        }
    }

    pub(crate) async fn schedules_for(db: &PgPool, course_ids: &[Uuid]) -> Result<Vec<Schedule>, AppError> {
        sqlx::query_as::<_, Schedule>(
            "SELECT * FROM schedules WHERE course_id = ANY($1) ORDER BY day_of_week, start_time",
        )
        .bind(course_ids)
        .fetch_all(db)
        .await
        .db_context("Failed to fetch schedules")
    }

    async fn insert_schedules(
        conn: &mut PgConnection,
        course_id: Uuid,
        schedules: &[ScheduleDto],
    ) -> Result<Vec<Schedule>, AppError> {
        let mut inserted = Vec::with_capacity(schedules.len());
        for slot in schedules {
            let schedule = sqlx::query_as::<_, Schedule>(
                "INSERT INTO schedules (course_id, day_of_week, start_time, end_time, room)
                 VALUES ($1, $2, $3, $4, $5)
                 RETURNING *",
            )
            .bind(course_id)
            .bind(slot.day_of_week)
            .bind(&slot.start_time)
            .bind(&slot.end_time)
            .bind(&slot.room)
            .fetch_one(&mut *conn)
            .await
            .db_context("Failed to create schedule")?;
            inserted.push(schedule);
        }
        Ok(inserted)
    }

    async fn detail(db: &PgPool, course_id: Uuid) -> Result<CourseDetail, AppError> {
        let row = sqlx::query_as::<_, CourseRow>(&format!("{} WHERE c.id = $1", COURSE_WITH_TEACHER))
            .bind(course_id)
            .fetch_optional(db)
            .await
            .db_context("Failed to fetch course")?
            .ok_or_else(|| AppError::not_found("Course not found"))?;

        let schedules = Self::schedules_for(db, &[course_id]).await?;
        let CourseWithTeacher { course, teacher } = row.into();

        Ok(CourseDetail {
            course,
            teacher,
            schedules,
        })
    }

    #[instrument(skip(db, dto), fields(db.operation = "INSERT", db.table = "courses"))]
    pub async fn create_course(
        db: &PgPool,
        teacher_id: Uuid,
        dto: CreateCourseDto,
    ) -> Result<CourseDetail, AppError> {
        check_dates(dto.start_date, dto.end_date)?;
        let schedules = dto.schedule.unwrap_or_default();
        check_schedules(&schedules)?;

        let code = normalize_code(&dto.code);

        let taken: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM courses WHERE code = $1)")
            .bind(&code)
            .fetch_one(db)
            .await
            .db_context("Failed to check course code")?;
        if taken {
            return Err(AppError::conflict(CODE_TAKEN));
        }

        let mut tx = db.begin().await.db_context("Failed to begin transaction")?;

        let course_id: Uuid = sqlx::query_scalar(
            "INSERT INTO courses (title, description, code, teacher_id, start_date, end_date, room)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id",
        )
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(&code)
        .bind(teacher_id)
        .bind(dto.start_date)
        .bind(dto.end_date)
        .bind(&dto.room)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, CODE_TAKEN, "Failed to create course"))?;

        Self::insert_schedules(&mut tx, course_id, &schedules).await?;

        tx.commit().await.db_context("Failed to commit course")?;

        metrics::track_course_created();
        info!(course_id = %course_id, code = %code, "Course created");

        Self::detail(db, course_id).await
    }

    #[instrument(skip(db, dto), fields(db.operation = "UPDATE", db.table = "courses"))]
    pub async fn update_course(
        db: &PgPool,
        teacher_id: Uuid,
        code: &str,
        dto: UpdateCourseDto,
    ) -> Result<CourseDetail, AppError> {
        let course = Self::ensure_owner(Self::find_by_code(db, code).await?, teacher_id)?;

        check_dates(
            dto.start_date.or(course.start_date),
            dto.end_date.or(course.end_date),
        )?;
        if let Some(schedules) = &dto.schedule {
            check_schedules(schedules)?;
        }

        let new_code = dto.code.as_deref().map(normalize_code);
        if let Some(new_code) = &new_code
            && *new_code != course.code
        {
            let taken: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM courses WHERE code = $1 AND id <> $2)",
            )
            .bind(new_code)
            .bind(course.id)
            .fetch_one(db)
            .await
            .db_context("Failed to check course code")?;
            if taken {
                return Err(AppError::conflict(CODE_TAKEN));
            }
        }

        let mut tx = db.begin().await.db_context("Failed to begin transaction")?;

        sqlx::query(
            "UPDATE courses
             SET title = COALESCE($1, title),
                 description = COALESCE($2, description),
                 code = COALESCE($3, code),
                 start_date = COALESCE($4, start_date),
                 end_date = COALESCE($5, end_date),
                 room = COALESCE($6, room),
                 updated_at = NOW()
             WHERE id = $7",
        )
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(&new_code)
        .bind(dto.start_date)
        .bind(dto.end_date)
        .bind(&dto.room)
        .bind(course.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, CODE_TAKEN, "Failed to update course"))?;

        if let Some(schedules) = &dto.schedule {
            sqlx::query("DELETE FROM schedules WHERE course_id = $1")
                .bind(course.id)
                .execute(&mut *tx)
                .await
                .db_context("Failed to replace schedules")?;
            Self::insert_schedules(&mut tx, course.id, schedules).await?;
        }

        tx.commit().await.db_context("Failed to commit course update")?;

        info!(course_id = %course.id, "Course updated");
        Self::detail(db, course.id).await
    }

    #[instrument(skip(db), fields(db.operation = "DELETE", db.table = "courses"))]
    pub async fn delete_course(db: &PgPool, teacher_id: Uuid, code: &str) -> Result<(), AppError> {
        let course = Self::ensure_owner(Self::find_by_code(db, code).await?, teacher_id)?;

        let mut tx = db.begin().await.db_context("Failed to begin transaction")?;

        sqlx::query("DELETE FROM schedules WHERE course_id = $1")
            .bind(course.id)
            .execute(&mut *tx)
            .await
            .db_context("Failed to delete schedules")?;

        sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(course.id)
            .execute(&mut *tx)
            .await
            .db_context("Failed to delete course")?;

        tx.commit().await.db_context("Failed to commit course deletion")?;

        info!(course_id = %course.id, code = %course.code, "Course deleted");
        Ok(())
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "courses"))]
    pub async fn list_courses(
        db: &PgPool,
        query: CourseQuery,
    ) -> Result<PaginatedCoursesResponse, AppError> {
        let pagination = query.pagination();
        let search = query.search.as_deref().map(search_pattern);
        let code = query.code.as_deref().map(normalize_code);
        let sort_by = query.sort_by.unwrap_or_default();
        let sort_order = query.sort_order.unwrap_or_default();

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM courses c {}",
            LIST_FILTERS
        ))
        .bind(&search)
        .bind(query.teacher_id)
        .bind(&code)
        .bind(query.start_date_from)
        .bind(query.end_date_to)
        .fetch_one(db)
        .await
        .db_context("Failed to count courses")?;

        let rows = sqlx::query_as::<_, CourseRow>(&format!(
            "{} {} ORDER BY {} {}, c.id LIMIT $6 OFFSET $7",
            COURSE_WITH_TEACHER,
            LIST_FILTERS,
            sort_by.column(),
            sort_order.keyword()
        ))
        .bind(&search)
        .bind(query.teacher_id)
        .bind(&code)
        .bind(query.start_date_from)
        .bind(query.end_date_to)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(db)
        .await
        .db_context("Failed to fetch courses")?;

        Ok(PaginatedCoursesResponse {
            data: rows.into_iter().map(CourseWithTeacher::from).collect(),
            meta: pagination.meta(total),
        })
    }

    pub async fn get_course_by_code(db: &PgPool, code: &str) -> Result<CourseDetail, AppError> {
        let course = Self::find_by_code(db, code).await?;
        Self::detail(db, course.id).await
    }

    pub async fn enrolled_students(
        db: &PgPool,
        course: &Course,
    ) -> Result<EnrolledStudentsResponse, AppError> {
        let rows = sqlx::query_as::<_, EnrolledStudentRow>(
            "SELECT e.id AS enrollment_id, s.id AS student_id, u.id AS user_id,
                    u.email, u.first_name, u.last_name, e.enrolled_at
             FROM enrollments e
             JOIN students s ON s.id = e.student_id
             JOIN users u ON u.id = s.user_id
             WHERE e.course_id = $1
             ORDER BY u.last_name, u.first_name",
        )
        .bind(course.id)
        .fetch_all(db)
        .await
        .db_context("Failed to fetch enrolled students")?;

        Ok(EnrolledStudentsResponse {
            course_id: course.id,
            course_title: course.title.clone(),
            total_enrolled: rows.len() as i64,
            students: rows.into_iter().map(Into::into).collect(),
        })
    }

    pub async fn get_enrolled_students(
        db: &PgPool,
        code: &str,
    ) -> Result<EnrolledStudentsResponse, AppError> {
        let course = Self::find_by_code(db, code).await?;
        Self::enrolled_students(db, &course).await
    }

    pub async fn get_course_schedules(
        db: &PgPool,
        code: &str,
    ) -> Result<CourseSchedulesResponse, AppError> {
        let course = Self::find_by_code(db, code).await?;
        let schedules = Self::schedules_for(db, &[course.id]).await?;

        Ok(CourseSchedulesResponse {
            course: CourseBrief {
                id: course.id,
                title: course.title,
                code: course.code,
                room: course.room,
            },
            schedules,
        })
    }

    pub async fn grades_of(db: &PgPool, course_id: Uuid) -> Result<Vec<f64>, AppError> {
        sqlx::query_scalar("SELECT grade FROM grades WHERE course_id = $1")
            .bind(course_id)
            .fetch_all(db)
            .await
            .db_context("Failed to fetch grades")
    }

    #[instrument(skip(db), fields(db.operation = "SELECT", db.table = "enrollments"))]
    pub async fn get_course_statistics(
        db: &PgPool,
        code: &str,
    ) -> Result<CourseStatisticsResponse, AppError> {
        let course = Self::find_by_code(db, code).await?;

        let (total_enrolled, ungraded): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*),
                    COUNT(*) FILTER (WHERE NOT EXISTS (
                        SELECT 1 FROM grades g
                        WHERE g.course_id = e.course_id AND g.student_id = e.student_id
                    ))
             FROM enrollments e
             WHERE e.course_id = $1",
        )
        .bind(course.id)
        .fetch_one(db)
        .await
        .db_context("Failed to count enrollments")?;

        let statistics = CourseGradeStatistics::from_grades(&Self::grades_of(db, course.id).await?);

        Ok(CourseStatisticsResponse {
            course_id: course.id,
            course_title: course.title,
            course_code: course.code,
            enrollment_stats: EnrollmentStats {
                total_enrolled,
                ungraded,
            },
            grade_stats: GradeStats::from(&statistics),
        })
    }
}
