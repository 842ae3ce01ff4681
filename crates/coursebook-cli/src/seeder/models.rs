//! Seed records and seeding configuration.

use uuid::Uuid;

/// Which role row a seeded user receives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeedRole {
    Teacher,
    Student,
}

impl SeedRole {
    pub fn table(self) -> &'static str {
        match self {
            Self::Teacher => "teachers",
            Self::Student => "students",
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            Self::Teacher => "teacher",
            Self::Student => "student",
        }
    }
}

pub struct UserSeed {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: SeedRole,
}

pub struct CourseSeed {
    pub title: String,
    pub description: Option<String>,
    pub code: String,
    pub teacher_id: Uuid,
    pub room: Option<String>,
}

#[derive(Clone, Debug)]
pub struct SeedConfig {
    pub teachers: usize,
    pub students: usize,
    pub courses_per_teacher: usize,
    pub enrollments_per_student: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            teachers: 5,
            students: 50,
            courses_per_teacher: 3,
            enrollments_per_student: 3,
        }
    }
}
