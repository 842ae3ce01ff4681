//! Fake courses, schedules, enrollments and grades.

use fake::Fake;
use fake::faker::lorem::en::{Sentence, Words};
use rayon::prelude::*;
use sqlx::PgPool;
use std::time::Instant;
use uuid::Uuid;

use super::models::CourseSeed;

const SUBJECTS: &[&str] = &["CS", "MATH", "PHYS", "CHEM", "BIO", "HIST", "ECON", "LIT"];

pub fn generate_courses(teacher_ids: &[Uuid], per_teacher: usize) -> Vec<CourseSeed> {
    teacher_ids
        .par_iter()
        .enumerate()
        .flat_map(|(teacher_idx, &teacher_id)| {
            (0..per_teacher)
                .map(|course_idx| {
                    let n = teacher_idx * per_teacher + course_idx;
                    let words: Vec<String> = Words(2..4).fake();
                    let subject = SUBJECTS[n % SUBJECTS.len()];

                    CourseSeed {
                        title: capitalize(&words.join(" ")),
                        description: Some(Sentence(6..12).fake()),
                        // 200+ keeps clear of hand-made codes such as CS101
                        code: format!("{}{}", subject, 200 + n),
                        teacher_id,
                        room: Some(format!("Room {}", 100 + (n % 40))),
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Inserts courses with two weekly slots each. Returns `(course_id, teacher_id)`.
pub async fn seed_courses(
    db: &PgPool,
    courses: &[CourseSeed],
) -> Result<Vec<(Uuid, Uuid)>, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    let mut tx = db.begin().await?;
    let mut ids = Vec::with_capacity(courses.len());

    for (idx, course) in courses.iter().enumerate() {
        let course_id: Uuid = sqlx::query_scalar(
            "INSERT INTO courses (title, description, code, teacher_id, room, start_date, end_date)
             VALUES ($1, $2, $3, $4, $5, CURRENT_DATE, CURRENT_DATE + INTERVAL '4 months')
             RETURNING id",
        )
        .bind(&course.title)
        .bind(&course.description)
        .bind(&course.code)
        .bind(course.teacher_id)
        .bind(&course.room)
        .fetch_one(&mut *tx)
        .await?;

        let first_day = (idx % 5 + 1) as i16;
        for day in [first_day, first_day % 5 + 1] {
            sqlx::query(
                "INSERT INTO schedules (course_id, day_of_week, start_time, end_time, room)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(course_id)
            .bind(day)
            .bind("09:00")
            .bind("10:30")
            .bind(&course.room)
            .execute(&mut *tx)
            .await?;
        }

        ids.push((course_id, course.teacher_id));
    }

    tx.commit().await?;

    println!(
        "   ✓ Inserted {} courses in {:?}",
        ids.len(),
        start_time.elapsed()
    );

    Ok(ids)
}

/// Enrolls each student in up to `per_student` random courses and grades about
/// half of those enrollments.
pub async fn seed_enrollments_and_grades(
    db: &PgPool,
    student_ids: &[Uuid],
    courses: &[(Uuid, Uuid)],
    per_student: usize,
) -> Result<(usize, usize), Box<dyn std::error::Error>> {
    if courses.is_empty() {
        return Ok((0, 0));
    }

    let start_time = Instant::now();
    let mut tx = db.begin().await?;
    let mut enrolled = 0;
    let mut graded = 0;

    for &student_id in student_ids {
        let offset: usize = (0..courses.len()).fake();

        for i in 0..per_student.min(courses.len()) {
            let (course_id, teacher_id) = courses[(offset + i) % courses.len()];

            sqlx::query(
                "INSERT INTO enrollments (student_id, course_id) VALUES ($1, $2)
                 ON CONFLICT (student_id, course_id) DO NOTHING",
            )
            .bind(student_id)
            .bind(course_id)
            .execute(&mut *tx)
            .await?;
            enrolled += 1;

            if (0..2u8).fake::<u8>() == 0 {
                // half-point steps between 1.0 and 5.0
                let grade = (2..=10u8).fake::<u8>() as f64 / 2.0;
                sqlx::query(
                    "INSERT INTO grades (student_id, course_id, teacher_id, grade)
                     VALUES ($1, $2, $3, $4)
                     ON CONFLICT (student_id, course_id, teacher_id) DO NOTHING",
                )
                .bind(student_id)
                .bind(course_id)
                .bind(teacher_id)
                .bind(grade)
                .execute(&mut *tx)
                .await?;
                graded += 1;
            }
        }
    }

    tx.commit().await?;

    println!(
        "   ✓ Inserted {} enrollments and {} grades in {:?}",
        enrolled,
        graded,
        start_time.elapsed()
    );

    Ok((enrolled, graded))
}
