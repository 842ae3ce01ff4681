use axum::{
    Router,
    routing::{delete, get, post},
};

use super::controller::{enroll, my_enrollments, unenroll};
use crate::state::AppState;

pub fn init_enrollments_router() -> Router<AppState> {
    Router::new()
        .route("/", post(enroll))
        .route("/me", get(my_enrollments))
        .route("/{course_id}", delete(unenroll))
}
