use axum::{
    Router,
    routing::{get, post},
};
use coursebook_config::RateLimitConfig;

use super::controller::{
    forgot_password, get_session, login, logout, refresh, reset_password, signup,
};
use crate::middleware::rate_limit::limited;
use crate::state::AppState;

pub fn init_auth_router(rate_limit_config: &RateLimitConfig) -> Router<AppState> {
    Router::new()
        .route(
            "/signup",
            limited(post(signup), rate_limit_config.signup_governor_config()),
        )
        .route(
            "/login",
            limited(post(login), rate_limit_config.login_governor_config()),
        )
        .route(
            "/forgot-password",
            limited(
                post(forgot_password),
                rate_limit_config.forgot_password_governor_config(),
            ),
        )
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/session", get(get_session))
        .route("/reset-password", post(reset_password))
}
