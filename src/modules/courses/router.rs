use axum::{Router, routing::get};

use super::controller::{
    create_course, delete_course, get_course, get_course_schedules, get_course_statistics,
    get_enrolled_students, list_courses, update_course,
};
use crate::state::AppState;

pub fn init_courses_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_courses).post(create_course))
        .route(
            "/{code}",
            get(get_course).put(update_course).delete(delete_course),
        )
        .route("/{code}/enrolled-students", get(get_enrolled_students))
        .route("/{code}/schedules", get(get_course_schedules))
        .route("/{code}/statistics", get(get_course_statistics))
}
