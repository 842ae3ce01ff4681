//! Database seeding.
//!
//! [`seed_demo`] creates a fixed teacher, student and course so the API can be
//! tried right away; [`seed_all`] adds that plus bulk fake data generated in
//! parallel with `rayon`.

pub mod courses;
pub mod models;
pub mod users;

use chrono::NaiveDate;
use coursebook_core::hash_password;
use sqlx::PgPool;
use std::time::Instant;
use uuid::Uuid;

pub use models::{SeedConfig, SeedRole};

pub const DEMO_TEACHER_EMAIL: &str = "julia.nguyen@example.com";
pub const DEMO_TEACHER_PASSWORD: &str = "Teacher123!";
pub const DEMO_STUDENT_EMAIL: &str = "triesnha.ameilya@example.com";
pub const DEMO_STUDENT_PASSWORD: &str = "Student123!";
pub const DEMO_COURSE_CODE: &str = "CS101";

/// Password of every bulk-seeded account.
pub const SEED_PASSWORD: &str = "Password123!";

type SeedResult<T> = Result<T, Box<dyn std::error::Error>>;

async fn upsert_user(
    db: &PgPool,
    email: &str,
    password: &str,
    first_name: &str,
    last_name: &str,
    role: SeedRole,
) -> SeedResult<Uuid> {
    let hash = hash_password(password).map_err(|e| e.message())?;
    let mut tx = db.begin().await?;

    let user_id: Uuid = sqlx::query_scalar(
        "INSERT INTO users (email, password, first_name, last_name)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (email) DO UPDATE SET password = EXCLUDED.password
         RETURNING id",
    )
    .bind(email)
    .bind(&hash)
    .bind(first_name)
    .bind(last_name)
    .fetch_one(&mut *tx)
    .await?;

    let role_id: Uuid = sqlx::query_scalar(&format!(
        "INSERT INTO {} (user_id) VALUES ($1)
         ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
         RETURNING id",
        role.table()
    ))
    .bind(user_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(role_id)
}

/// Demo teacher, demo student, course CS101 (Mon/Wed 10:00-12:00) with the
/// student enrolled and graded 4.5. Safe to run repeatedly.
pub async fn seed_demo(db: &PgPool) -> SeedResult<()> {
    println!("🌱 Seeding demo accounts...");

    let teacher_id = upsert_user(
        db,
        DEMO_TEACHER_EMAIL,
        DEMO_TEACHER_PASSWORD,
        "Julia",
        "Nguyen",
        SeedRole::Teacher,
    )
    .await?;
    let student_id = upsert_user(
        db,
        DEMO_STUDENT_EMAIL,
        DEMO_STUDENT_PASSWORD,
        "Triesnha",
        "Ameilya",
        SeedRole::Student,
    )
    .await?;

    let mut tx = db.begin().await?;

    let course_id: Uuid = sqlx::query_scalar(
        "INSERT INTO courses (title, description, code, teacher_id, start_date, end_date, room)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         ON CONFLICT (code) DO UPDATE SET teacher_id = EXCLUDED.teacher_id
         RETURNING id",
    )
    .bind("Introduction to Computer Science")
    .bind("Fundamentals of programming, algorithms and data structures")
    .bind(DEMO_COURSE_CODE)
    .bind(teacher_id)
    .bind(NaiveDate::from_ymd_opt(2025, 10, 1))
    .bind(NaiveDate::from_ymd_opt(2026, 3, 31))
    .bind("Room 101")
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM schedules WHERE course_id = $1")
        .bind(course_id)
        .execute(&mut *tx)
        .await?;

    // Monday and Wednesday
    for day in [1i16, 3] {
        sqlx::query(
            "INSERT INTO schedules (course_id, day_of_week, start_time, end_time, room)
             VALUES ($1, $2, '10:00', '12:00', 'Room 101')",
        )
        .bind(course_id)
        .bind(day)
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query(
        "INSERT INTO enrollments (student_id, course_id) VALUES ($1, $2)
         ON CONFLICT (student_id, course_id) DO NOTHING",
    )
    .bind(student_id)
    .bind(course_id)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        "INSERT INTO grades (student_id, course_id, teacher_id, grade) VALUES ($1, $2, $3, 4.5)
         ON CONFLICT (student_id, course_id, teacher_id) DO NOTHING",
    )
    .bind(student_id)
    .bind(course_id)
    .bind(teacher_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    println!("   ✓ Teacher: {} / {}", DEMO_TEACHER_EMAIL, DEMO_TEACHER_PASSWORD);
    println!("   ✓ Student: {} / {}", DEMO_STUDENT_EMAIL, DEMO_STUDENT_PASSWORD);
    println!("   ✓ Course:  {}", DEMO_COURSE_CODE);
    Ok(())
}

pub async fn seed_all(db: &PgPool, config: SeedConfig) -> SeedResult<()> {
    let start_time = Instant::now();

    seed_demo(db).await?;

    let password_hash = hash_password(SEED_PASSWORD).map_err(|e| e.message())?;

    println!("👩‍🏫 Seeding {} teachers...", config.teachers);
    let teachers = users::generate_users(SeedRole::Teacher, config.teachers, &password_hash);
    let teacher_ids = users::seed_users(db, &teachers).await?;

    println!("🎓 Seeding {} students...", config.students);
    let students = users::generate_users(SeedRole::Student, config.students, &password_hash);
    let student_ids = users::seed_users(db, &students).await?;

    println!(
        "📚 Seeding {} courses...",
        teacher_ids.len() * config.courses_per_teacher
    );
    let course_seeds = courses::generate_courses(&teacher_ids, config.courses_per_teacher);
    let course_ids = courses::seed_courses(db, &course_seeds).await?;

    println!("📝 Seeding enrollments and grades...");
    courses::seed_enrollments_and_grades(
        db,
        &student_ids,
        &course_ids,
        config.enrollments_per_student,
    )
    .await?;

    println!("\n✅ Seeding finished in {:?}", start_time.elapsed());
    println!("   Bulk accounts use the password {}", SEED_PASSWORD);
    Ok(())
}

/// Deletes every seeded account; courses, schedules, enrollments and grades
/// go with them through the cascades.
pub async fn clear_all(db: &PgPool) -> SeedResult<u64> {
    let start_time = Instant::now();
    println!("🗑️  Clearing seeded data...");

    let result = sqlx::query("DELETE FROM users WHERE email LIKE $1")
        .bind(format!("%@{}", users::SEED_EMAIL_DOMAIN))
        .execute(db)
        .await?;

    println!(
        "   ✓ Removed {} users in {:?}",
        result.rows_affected(),
        start_time.elapsed()
    );
    Ok(result.rows_affected())
}
