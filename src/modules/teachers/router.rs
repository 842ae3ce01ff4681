use axum::{
    Router,
    routing::{get, patch, post},
};

use super::controller::{
    assign_grade, get_course_enrollments, get_course_grades, get_course_statistics,
    get_my_courses, get_my_profile, update_grade, update_user_role,
};
use crate::state::AppState;

pub fn init_teachers_router() -> Router<AppState> {
    Router::new()
        .route("/users/role", patch(update_user_role))
        .route("/me", get(get_my_profile))
        .route("/my-courses", get(get_my_courses))
        .route("/courses/{course_id}/enrollments", get(get_course_enrollments))
        .route("/courses/{course_id}/grades", get(get_course_grades))
        .route("/courses/{course_id}/statistics", get(get_course_statistics))
        .route("/grades", post(assign_grade))
        .route("/grades/{grade_id}", patch(update_grade))
}
