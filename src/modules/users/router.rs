use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, patch, put},
};

use super::controller::{change_password, get_profile, update_avatar, update_profile};
use crate::state::AppState;

/// Headroom over the file size for multipart boundaries and headers.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Profile routes, mounted under `/auth` next to the auth routes.
pub fn init_users_router(max_avatar_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route(
            "/avatar",
            put(update_avatar).layer(DefaultBodyLimit::max(max_avatar_bytes + MULTIPART_OVERHEAD)),
        )
        .route("/change-password", patch(change_password))
}
