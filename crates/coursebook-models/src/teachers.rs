//! Teacher profile and teacher-role changes.

use chrono::{DateTime, Utc};
use coursebook_core::AppError;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::users::RoleUser;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Teacher {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct TeacherProfile {
    /// Teacher id
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar_url: Option<String>,
    pub total_courses: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRoleDto {
    pub user_id: Uuid,
    /// `true` grants the teacher role, `false` revokes it
    pub is_teacher: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoleChangeResponse {
    pub message: String,
    pub user: RoleUser,
}

/// Row changes needed to move a user into or out of the teacher role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleChange {
    /// Insert a Teacher row, deleting the Student row if there is one.
    Grant { remove_student: bool },
    /// Delete the Teacher row, inserting a Student row if there is none.
    Revoke { create_student: bool },
}

impl RoleChange {
    pub fn message(&self, full_name: &str) -> String {
        match self {
            Self::Grant { .. } => format!("{} is now a teacher", full_name),
            Self::Revoke { .. } => format!("{} is no longer a teacher", full_name),
        }
    }

    /// Role flags after the change has been applied.
    pub fn resulting_flags(&self) -> (bool, bool) {
        match self {
            Self::Grant { .. } => (true, false),
            Self::Revoke { .. } => (false, true),
        }
    }
}

/// Decide the row changes from the target's current rows. Asking for the role
/// the user already has (or lacks) is a conflict.
pub fn plan_role_change(
    grant: bool,
    is_teacher: bool,
    is_student: bool,
) -> Result<RoleChange, AppError> {
    match (grant, is_teacher) {
        (true, true) => Err(AppError::conflict("User is already a teacher")),
        (false, false) => Err(AppError::conflict("User is not a teacher")),
        (true, false) => Ok(RoleChange::Grant {
            remove_student: is_student,
        }),
        (false, true) => Ok(RoleChange::Revoke {
            create_student: !is_student,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn granting_swaps_out_the_student_row() {
        assert_eq!(
            plan_role_change(true, false, true).unwrap(),
            RoleChange::Grant {
                remove_student: true
            }
        );
        assert_eq!(
            plan_role_change(true, false, false).unwrap(),
            RoleChange::Grant {
                remove_student: false
            }
        );
    }

    #[test]
    fn revoking_creates_a_student_row_when_missing() {
        assert_eq!(
            plan_role_change(false, true, false).unwrap(),
            RoleChange::Revoke {
                create_student: true
            }
        );
        assert_eq!(
            plan_role_change(false, true, true).unwrap(),
            RoleChange::Revoke {
                create_student: false
            }
        );
    }

    #[test]
    fn repeating_the_current_role_conflicts() {
        let err = plan_role_change(true, true, false).unwrap_err();
        assert_eq!(err.status.as_u16(), 409);
        assert_eq!(err.message(), "User is already a teacher");

        let err = plan_role_change(false, false, true).unwrap_err();
        assert_eq!(err.status.as_u16(), 409);
        assert_eq!(err.message(), "User is not a teacher");
    }

    #[test]
    fn result_always_holds_exactly_one_role() {
        for grant in [true, false] {
            for is_teacher in [true, false] {
                for is_student in [true, false] {
                    if let Ok(change) = plan_role_change(grant, is_teacher, is_student) {
                        let (teacher, student) = change.resulting_flags();
                        assert!(teacher ^ student);
                        assert_eq!(teacher, grant);
                    }
                }
            }
        }
    }

    #[test]
    fn messages_name_the_user() {
        let grant = RoleChange::Grant {
            remove_student: true,
        };
        assert_eq!(grant.message("Ada Lovelace"), "Ada Lovelace is now a teacher");
        let revoke = RoleChange::Revoke {
            create_student: true,
        };
        assert_eq!(
            revoke.message("Ada Lovelace"),
            "Ada Lovelace is no longer a teacher"
        );
    }
}
