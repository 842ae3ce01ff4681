use coursebook_cache::{CacheStore, invalidate, keys};
use coursebook_core::{AppError, FileStorage, LocalFileStorage, StorageError, hash_password, verify_password};
use coursebook_models::{ChangePasswordDto, UpdateProfileDto, UserProfile};
use sqlx::PgPool;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::modules::{DbResultExt, conflict_on_unique};

const PROFILE_QUERY: &str = "SELECT u.id, u.email, u.first_name, u.last_name, u.avatar_url,
        EXISTS(SELECT 1 FROM teachers t WHERE t.user_id = u.id) AS is_teacher,
        EXISTS(SELECT 1 FROM students s WHERE s.user_id = u.id) AS is_student,
        u.created_at, u.updated_at
 FROM users u
 WHERE u.id = $1";

fn storage_error(err: StorageError) -> AppError {
    if err.is_client_error() {
        AppError::bad_request(err.to_string())
    } else {
        AppError::internal(err)
    }
}

pub struct UserService;

impl UserService {
    #[instrument(skip(db, cache), fields(db.operation = "SELECT", db.table = "users"))]
    pub async fn get_profile(
        db: &PgPool,
        cache: &CacheStore,
        user_id: Uuid,
    ) -> Result<UserProfile, AppError> {
        let key = keys::users::by_id(user_id);
        if let Some(profile) = cache.get::<UserProfile>(&key).await {
            return Ok(profile);
        }

        let profile = sqlx::query_as::<_, UserProfile>(PROFILE_QUERY)
            .bind(user_id)
            .fetch_optional(db)
            .await
            .db_context("Failed to fetch profile")?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        cache.put(&key, &profile, keys::USER_TTL).await;
        Ok(profile)
    }

    #[instrument(skip(db, cache, dto), fields(db.operation = "UPDATE", db.table = "users"))]
    pub async fn update_profile(
        db: &PgPool,
        cache: &CacheStore,
        user_id: Uuid,
        dto: UpdateProfileDto,
    ) -> Result<UserProfile, AppError> {
        if dto.is_empty() {
            return Self::get_profile(db, cache, user_id).await;
        }

        let new_email = dto.email.as_deref().map(|e| e.trim().to_lowercase());

        if let Some(email) = &new_email {
            let taken: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND id <> $2)",
            )
            .bind(email)
            .bind(user_id)
            .fetch_one(db)
            .await
            .db_context("Failed to check email")?;
            if taken {
                return Err(AppError::conflict("User with this email already exists"));
            }
        }

        let old_email: String = sqlx::query_scalar("SELECT email FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(db)
            .await
            .db_context("Failed to fetch user")?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        sqlx::query(
            "UPDATE users
             SET email = COALESCE($1, email),
                 first_name = COALESCE($2, first_name),
                 last_name = COALESCE($3, last_name),
                 updated_at = NOW()
             WHERE id = $4",
        )
        .bind(&new_email)
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(user_id)
        .execute(db)
        .await
        .map_err(|e| {
            conflict_on_unique(e, "User with this email already exists", "Failed to update profile")
        })?;

        invalidate::user(cache, user_id).await;
        invalidate::login(cache, &old_email).await;
        if let Some(email) = &new_email {
            invalidate::login(cache, email).await;
        }

        info!(user_id = %user_id, "Profile updated");
        Self::get_profile(db, cache, user_id).await
    }

    /// Stores a new avatar and returns its public URL. The previous file is
    /// removed best-effort once the new URL is recorded.
    #[instrument(skip(db, cache, storage, content), fields(db.operation = "UPDATE", db.table = "users", size = content.len()))]
    pub async fn update_avatar(
        db: &PgPool,
        cache: &CacheStore,
        storage: &LocalFileStorage,
        user_id: Uuid,
        content_type: &str,
        content: &[u8],
    ) -> Result<String, AppError> {
        let extension = storage
            .validate_upload(content_type, content.len())
            .map_err(storage_error)?;

        let key = format!("avatars/{}-{}.{}", user_id, Uuid::new_v4().simple(), extension);
        storage.save(&key, content).await.map_err(storage_error)?;
        let url = storage.get_url(&key).map_err(storage_error)?;

        let previous: Option<Option<String>> = sqlx::query_scalar(
            "WITH old AS (SELECT avatar_url FROM users WHERE id = $2 FOR UPDATE)
             UPDATE users u
             SET avatar_url = $1, updated_at = NOW()
             FROM old
             WHERE u.id = $2
             RETURNING old.avatar_url",
        )
        .bind(&url)
        .bind(user_id)
        .fetch_optional(db)
        .await
        .db_context("Failed to update avatar")?;

        let Some(previous) = previous else {
            if let Err(e) = storage.delete(&key).await {
                warn!(error = %e, key = %key, "Failed to remove orphaned avatar");
            }
            return Err(AppError::not_found("User not found"));
        };

        if let Some(old_key) = previous.as_deref().and_then(|url| storage.key_from_url(url))
            && let Err(e) = storage.delete(&old_key).await
        {
            warn!(error = %e, key = %old_key, "Failed to delete previous avatar");
        }

        invalidate::user(cache, user_id).await;
        info!(user_id = %user_id, "Avatar updated");
        Ok(url)
    }

    #[instrument(skip(db, cache, dto), fields(db.operation = "UPDATE", db.table = "users"))]
    pub async fn change_password(
        db: &PgPool,
        cache: &CacheStore,
        user_id: Uuid,
        dto: ChangePasswordDto,
    ) -> Result<(), AppError> {
        if dto.new_password != dto.confirm_password {
            return Err(AppError::bad_request("Passwords do not match"));
        }

        let (email, current_hash): (String, String) =
            sqlx::query_as("SELECT email, password FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(db)
                .await
                .db_context("Failed to fetch user")?
                .ok_or_else(|| AppError::not_found("User not found"))?;

        if !verify_password(&dto.current_password, &current_hash)? {
            return Err(AppError::unauthorized("Current password is incorrect"));
        }

        if verify_password(&dto.new_password, &current_hash)? {
            return Err(AppError::bad_request(
                "New password must be different from the current password",
            ));
        }

        let new_hash = hash_password(&dto.new_password)?;

        sqlx::query(
            "UPDATE users SET password = $1, refresh_token_hash = NULL, updated_at = NOW()
             WHERE id = $2",
        )
        .bind(&new_hash)
        .bind(user_id)
        .execute(db)
        .await
        .db_context("Failed to update password")?;

        invalidate::session(cache, user_id).await;
        invalidate::login(cache, &email).await;

        info!(user_id = %user_id, "Password changed");
        Ok(())
    }
}
