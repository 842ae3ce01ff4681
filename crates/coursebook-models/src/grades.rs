//! Grades and grade statistics.
//!
//! Grades are on a 0 to 5 scale. The distribution uses half-open buckets
//! `(lower, upper]`, plus `[0, 1]` so every legal grade lands in exactly one bucket:
//!
//! | grade | bucket |
//! |-------|--------|
//! | 0.0, 1.0 | `0-1` |
//! | 1.5, 2.0 | `1-2` |
//! | 2.5, 3.0 | `2-3` |
//! | 3.5, 4.0 | `3-4` |
//! | 4.5, 5.0 | `4-5` |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

pub const MIN_GRADE: f64 = 0.0;
pub const MAX_GRADE: f64 = 5.0;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Grade {
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub teacher_id: Uuid,
    pub grade: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A grade joined with the graded student's name and email.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct GradeWithStudent {
    pub id: Uuid,
    pub student_id: Uuid,
    pub grade: f64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateGradeDto {
    pub student_id: Uuid,
    pub course_id: Uuid,
    #[validate(range(min = 0.0, max = 5.0, message = "Grade must be between 0 and 5"))]
    #[schema(example = 4.5)]
    pub grade: f64,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateGradeDto {
    #[validate(range(min = 0.0, max = 5.0, message = "Grade must be between 0 and 5"))]
    pub grade: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct GradeDistribution {
    #[serde(rename = "0-1")]
    pub up_to_1: i64,
    #[serde(rename = "1-2")]
    pub from_1_to_2: i64,
    #[serde(rename = "2-3")]
    pub from_2_to_3: i64,
    #[serde(rename = "3-4")]
    pub from_3_to_4: i64,
    #[serde(rename = "4-5")]
    pub from_4_to_5: i64,
}

impl GradeDistribution {
    fn record(&mut self, grade: f64) {
        let in_bucket = |lower: f64, upper: f64| grade > lower && grade <= upper;

        if in_bucket(4.0, 5.0) {
            self.from_4_to_5 += 1;
        } else if in_bucket(3.0, 4.0) {
            self.from_3_to_4 += 1;
        } else if in_bucket(2.0, 3.0) {
            self.from_2_to_3 += 1;
        } else if in_bucket(1.0, 2.0) {
            self.from_1_to_2 += 1;
        } else if (MIN_GRADE..=1.0).contains(&grade) {
            self.up_to_1 += 1;
        }
    }

    pub fn total(&self) -> i64 {
        self.up_to_1 + self.from_1_to_2 + self.from_2_to_3 + self.from_3_to_4 + self.from_4_to_5
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CourseGradeStatistics {
    /// Number of grades recorded for the course
    pub total_students: i64,
    /// Mean grade rounded to 2 decimals
    pub average_grade: f64,
    pub highest_grade: f64,
    pub lowest_grade: f64,
    pub distribution: GradeDistribution,
}

impl CourseGradeStatistics {
    /// Summarize a set of grades. An empty set yields all zeros.
    pub fn from_grades(grades: &[f64]) -> Self {
        if grades.is_empty() {
            return Self::default();
        }

        let mut distribution = GradeDistribution::default();
        for &grade in grades {
            distribution.record(grade);
        }

        let sum: f64 = grades.iter().sum();
        let average = sum / grades.len() as f64;

        Self {
            total_students: grades.len() as i64,
            average_grade: round2(average),
            highest_grade: grades.iter().copied().fold(f64::MIN, f64::max),
            lowest_grade: grades.iter().copied().fold(f64::MAX, f64::min),
            distribution,
        }
    }
}

/// Grades of one course with their students, plus the course statistics.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CourseGradesResponse {
    pub course_id: Uuid,
    pub grades: Vec<GradeWithStudent>,
    pub statistics: CourseGradeStatistics,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_of_four_grades() {
        let stats = CourseGradeStatistics::from_grades(&[2.0, 3.0, 4.0, 5.0]);
        assert_eq!(stats.total_students, 4);
        assert_eq!(stats.average_grade, 3.5);
        assert_eq!(stats.highest_grade, 5.0);
        assert_eq!(stats.lowest_grade, 2.0);
        assert_eq!(
            stats.distribution,
            GradeDistribution {
                up_to_1: 0,
                from_1_to_2: 1,
                from_2_to_3: 1,
                from_3_to_4: 1,
                from_4_to_5: 1,
            }
        );
    }

    #[test]
    fn boundaries_belong_to_the_lower_bucket() {
        let one = |g: f64| CourseGradeStatistics::from_grades(&[g]).distribution;

        assert_eq!(one(1.0).up_to_1, 1);
        assert_eq!(one(2.0).from_1_to_2, 1);
        assert_eq!(one(3.0).from_2_to_3, 1);
        assert_eq!(one(4.0).from_3_to_4, 1);
        assert_eq!(one(5.0).from_4_to_5, 1);
    }

    #[test]
    fn zero_and_values_between_boundaries() {
        let stats = CourseGradeStatistics::from_grades(&[0.0, 0.5, 1.5, 2.5, 3.5, 4.5]);
        let d = &stats.distribution;
        assert_eq!(d.up_to_1, 2);
        assert_eq!(d.from_1_to_2, 1);
        assert_eq!(d.from_2_to_3, 1);
        assert_eq!(d.from_3_to_4, 1);
        assert_eq!(d.from_4_to_5, 1);
        assert_eq!(d.total(), 6);
        assert_eq!(stats.lowest_grade, 0.0);
    }

    #[test]
    fn empty_set_is_all_zeros() {
        let stats = CourseGradeStatistics::from_grades(&[]);
        assert_eq!(stats, CourseGradeStatistics::default());
        assert_eq!(stats.average_grade, 0.0);
        assert_eq!(stats.distribution.total(), 0);
    }

    #[test]
    fn average_is_rounded_to_two_decimals() {
        let stats = CourseGradeStatistics::from_grades(&[4.0, 4.5, 5.0]);
        assert_eq!(stats.average_grade, 4.5);

        let stats = CourseGradeStatistics::from_grades(&[1.0, 2.0, 2.0]);
        assert_eq!(stats.average_grade, 1.67);
    }

    #[test]
    fn distribution_serializes_with_range_names() {
        let json = serde_json::to_value(GradeDistribution::default()).unwrap();
        assert!(json.get("0-1").is_some());
        assert!(json.get("4-5").is_some());
    }

    #[test]
    fn grade_range_is_validated() {
        let dto = UpdateGradeDto { grade: 5.5 };
        assert!(dto.validate().is_err());
        let dto = UpdateGradeDto { grade: 0.0 };
        assert!(dto.validate().is_ok());
    }
}
