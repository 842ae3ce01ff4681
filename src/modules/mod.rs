//! Feature modules. Each has a `controller` (HTTP handlers), a `service`
//! (queries and business rules) and a `router`.

pub mod auth;
pub mod courses;
pub mod enrollments;
pub mod teachers;
pub mod users;

use anyhow::Context;
use coursebook_core::AppError;

/// Maps a unique-constraint violation to 409 with `conflict`, anything else to 500.
pub(crate) fn conflict_on_unique(err: sqlx::Error, conflict: &str, context: &'static str) -> AppError {
    match err {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::conflict(conflict)
        }
        err => AppError::database(anyhow::Error::from(err).context(context)),
    }
}

/// `Result<T, sqlx::Error>` to `Result<T, AppError>` with a context message.
pub(crate) trait DbResultExt<T> {
    fn db_context(self, context: &'static str) -> Result<T, AppError>;
}

impl<T> DbResultExt<T> for Result<T, sqlx::Error> {
    fn db_context(self, context: &'static str) -> Result<T, AppError> {
        self.context(context).map_err(AppError::database)
    }
}
