use anyhow::Context;
use axum::{extract::FromRequestParts, http::request::Parts};
use sqlx::PgPool;
use uuid::Uuid;

use coursebook_core::AppError;

use super::auth::AuthUser;
use crate::state::AppState;

/// Role rows are looked up by user; the table name is never user input.
async fn role_row_id(db: &PgPool, table: &'static str, user_id: Uuid) -> Result<Option<Uuid>, AppError> {
    sqlx::query_scalar::<_, Uuid>(&format!("SELECT id FROM {} WHERE user_id = $1", table))
        .bind(user_id)
        .fetch_optional(db)
        .await
        .with_context(|| format!("Failed to look up {} row", table))
        .map_err(AppError::database)
}

/// Authenticated caller that holds a Teacher profile.
#[derive(Debug, Clone)]
pub struct RequireTeacher {
    pub user: AuthUser,
    pub user_id: Uuid,
    pub teacher_id: Uuid,
}

impl FromRequestParts<AppState> for RequireTeacher {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        let user_id = user.user_id()?;

        let teacher_id = role_row_id(&state.db, "teachers", user_id)
            .await?
            .ok_or_else(|| AppError::forbidden("Teacher access required"))?;

        Ok(Self {
            user,
            user_id,
            teacher_id,
        })
    }
}

/// Authenticated caller that holds a Student profile.
#[derive(Debug, Clone)]
pub struct RequireStudent {
    pub user: AuthUser,
    pub user_id: Uuid,
    pub student_id: Uuid,
}

impl FromRequestParts<AppState> for RequireStudent {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        let user_id = user.user_id()?;

        let student_id = role_row_id(&state.db, "students", user_id)
            .await?
            .ok_or_else(|| AppError::forbidden("Student access required"))?;

        Ok(Self {
            user,
            user_id,
            student_id,
        })
    }
}
