use axum::Json;
use axum::extract::{Multipart, State};
use coursebook_core::AppError;
use coursebook_models::{AvatarResponse, ChangePasswordDto, MessageResponse, UpdateProfileDto, UserProfile};
use tracing::instrument;

use super::service::UserService;
use crate::middleware::auth::AuthUser;
use crate::modules::auth::controller::ErrorResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

#[utoipa::path(
    get,
    path = "/api/auth/profile",
    responses(
        (status = 200, description = "Current user's profile", body = UserProfile),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
#[instrument(skip(state, auth_user))]
pub async fn get_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<UserProfile>, AppError> {
    let profile = UserService::get_profile(&state.db, &state.cache, auth_user.user_id()?).await?;
    Ok(Json(profile))
}

#[utoipa::path(
    put,
    path = "/api/auth/profile",
    request_body = UpdateProfileDto,
    responses(
        (status = 200, description = "Profile updated", body = UserProfile),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_profile(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<UpdateProfileDto>,
) -> Result<Json<UserProfile>, AppError> {
    let profile =
        UserService::update_profile(&state.db, &state.cache, auth_user.user_id()?, dto).await?;
    Ok(Json(profile))
}

/// Upload an avatar as multipart field `avatar` (JPEG, PNG or WebP).
#[utoipa::path(
    put,
    path = "/api/auth/avatar",
    request_body(content_type = "multipart/form-data", description = "Form with an `avatar` file field"),
    responses(
        (status = 200, description = "Avatar updated", body = AvatarResponse),
        (status = 400, description = "Missing, empty or unsupported file", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
#[instrument(skip(state, auth_user, multipart))]
pub async fn update_avatar(
    State(state): State<AppState>,
    auth_user: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<AvatarResponse>, AppError> {
    let user_id = auth_user.user_id()?;
    let multipart_error =
        |e: axum::extract::multipart::MultipartError| AppError::new(e.status(), anyhow::Error::msg(e.body_text()));

    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some("avatar") {
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field.bytes().await.map_err(multipart_error)?;
            upload = Some((content_type, bytes));
            break;
        }
    }

    let (content_type, bytes) =
        upload.ok_or_else(|| AppError::bad_request("avatar file is required"))?;

    let avatar_url = UserService::update_avatar(
        &state.db,
        &state.cache,
        &state.storage,
        user_id,
        &content_type,
        &bytes,
    )
    .await?;

    Ok(Json(AvatarResponse {
        message: "Avatar updated successfully".to_string(),
        avatar_url,
    }))
}

#[utoipa::path(
    patch,
    path = "/api/auth/change-password",
    request_body = ChangePasswordDto,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Passwords do not match or unchanged", body = ErrorResponse),
        (status = 401, description = "Current password is incorrect", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn change_password(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<ChangePasswordDto>,
) -> Result<Json<MessageResponse>, AppError> {
    UserService::change_password(&state.db, &state.cache, auth_user.user_id()?, dto).await?;
    Ok(Json(MessageResponse::new(
        "Password changed successfully. Please log in again.",
    )))
}
