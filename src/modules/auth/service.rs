use coursebook_auth::{
    TokenPair, create_password_reset_token, issue_token_pair, token_digest,
    verify_password_reset_token, verify_refresh_token,
};
use coursebook_cache::{CacheStore, invalidate, keys};
use coursebook_config::{EmailConfig, JwtConfig};
use coursebook_core::{AppError, hash_password, verify_password};
use coursebook_models::{
    AuthResponse, ForgotPasswordRequest, LoginRecord, LoginRequest, ResetPasswordRequest,
    ResetTokenRecord, SessionInfo, SignupRequest,
};
use sqlx::PgPool;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::metrics;
use crate::modules::{DbResultExt, conflict_on_unique};
use crate::utils::email::EmailService;

pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account with that email exists, a password reset link has been sent";

const EMAIL_TAKEN: &str = "User with this email already exists";

pub struct AuthService;

impl AuthService {
    #[instrument(skip(db, cache, jwt_config, dto), fields(db.operation = "INSERT", db.table = "users"))]
    pub async fn signup(
        db: &PgPool,
        cache: &CacheStore,
        jwt_config: &JwtConfig,
        dto: SignupRequest,
    ) -> Result<AuthResponse, AppError> {
        let email = dto.email.trim().to_lowercase();

        let taken: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(&email)
            .fetch_one(db)
            .await
            .db_context("Failed to check email")?;
        if taken {
            return Err(AppError::conflict(EMAIL_TAKEN));
        }

        let password_hash = hash_password(&dto.password)?;

        let mut tx = db.begin().await.db_context("Failed to begin transaction")?;

        let user_id: Uuid = sqlx::query_scalar(
            "INSERT INTO users (email, password, first_name, last_name)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(&email)
        .bind(&password_hash)
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, EMAIL_TAKEN, "Failed to create user"))?;

        sqlx::query("INSERT INTO students (user_id) VALUES ($1)")
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .db_context("Failed to create student profile")?;

        let tokens = issue_token_pair(user_id, &email, jwt_config)?;

        sqlx::query("UPDATE users SET refresh_token_hash = $1 WHERE id = $2")
            .bind(token_digest(&tokens.refresh_token))
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .db_context("Failed to store refresh token")?;

        tx.commit().await.db_context("Failed to commit signup")?;

        Self::start_session(cache, user_id, &email).await;
        metrics::track_signup();
        info!(user_id = %user_id, "User signed up");

        Ok(AuthResponse {
            id: user_id,
            email,
            first_name: dto.first_name,
            last_name: dto.last_name,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        })
    }

    /// Credentials for `email`, from the login cache when present.
    async fn find_login(
        db: &PgPool,
        cache: &CacheStore,
        email: &str,
    ) -> Result<Option<LoginRecord>, AppError> {
        let key = keys::logins::by_email(email);
        if let Some(record) = cache.get::<LoginRecord>(&key).await {
            return Ok(Some(record));
        }

        let record = sqlx::query_as::<_, LoginRecord>(
            "SELECT id, email, password AS password_hash, first_name, last_name
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(db)
        .await
        .db_context("Failed to fetch user")?;

        if let Some(record) = &record {
            cache.put(&key, record, keys::LOGIN_TTL).await;
        }

        Ok(record)
    }

    #[instrument(skip(db, cache, jwt_config, dto), fields(db.operation = "SELECT", db.table = "users"))]
    pub async fn login(
        db: &PgPool,
        cache: &CacheStore,
        jwt_config: &JwtConfig,
        dto: LoginRequest,
    ) -> Result<AuthResponse, AppError> {
        let email = dto.email.trim().to_lowercase();

        let Some(record) = Self::find_login(db, cache, &email).await? else {
            metrics::track_login("unknown_user");
            return Err(AppError::unauthorized("Invalid credentials"));
        };

        if !verify_password(&dto.password, &record.password_hash)? {
            metrics::track_login("wrong_password");
            return Err(AppError::unauthorized("Invalid credentials"));
        }

        let tokens = issue_token_pair(record.id, &record.email, jwt_config)?;
        Self::store_refresh_digest(db, record.id, &tokens).await?;
        Self::start_session(cache, record.id, &record.email).await;

        metrics::track_login("success");
        info!(user_id = %record.id, "User logged in");

        Ok(AuthResponse {
            id: record.id,
            email: record.email,
            first_name: record.first_name,
            last_name: record.last_name,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        })
    }

    async fn store_refresh_digest(db: &PgPool, user_id: Uuid, tokens: &TokenPair) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET refresh_token_hash = $1, updated_at = NOW() WHERE id = $2")
            .bind(token_digest(&tokens.refresh_token))
            .bind(user_id)
            .execute(db)
            .await
            .db_context("Failed to store refresh token")?;
        Ok(())
    }

    async fn start_session(cache: &CacheStore, user_id: Uuid, email: &str) {
        cache
            .put(
                &keys::sessions::by_user(user_id),
                &SessionInfo::start(user_id, email),
                keys::SESSION_TTL,
            )
            .await;
    }

    /// Exchanges a refresh token for a new pair. The stored digest is swapped
    /// only if it still matches the presented token, so each refresh token is
    /// accepted at most once.
    #[instrument(skip_all, fields(db.operation = "UPDATE", db.table = "users"))]
    pub async fn refresh(
        db: &PgPool,
        jwt_config: &JwtConfig,
        refresh_token: &str,
    ) -> Result<TokenPair, AppError> {
        if refresh_token.trim().is_empty() {
            return Err(AppError::bad_request("Refresh token is required"));
        }

        let claims = verify_refresh_token(refresh_token, jwt_config).inspect_err(|_| {
            metrics::track_token_refresh("invalid");
        })?;
        let user_id = claims.user_id()?;

        let email: Option<String> = sqlx::query_scalar("SELECT email FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(db)
            .await
            .db_context("Failed to fetch user")?;
        let Some(email) = email else {
            metrics::track_token_refresh("invalid");
            return Err(AppError::unauthorized("Invalid refresh token"));
        };

        let tokens = issue_token_pair(user_id, &email, jwt_config)?;

        let rotated = sqlx::query(
            "UPDATE users SET refresh_token_hash = $1, updated_at = NOW()
             WHERE id = $2 AND refresh_token_hash = $3",
        )
        .bind(token_digest(&tokens.refresh_token))
        .bind(user_id)
        .bind(token_digest(refresh_token))
        .execute(db)
        .await
        .db_context("Failed to rotate refresh token")?;

        if rotated.rows_affected() == 0 {
            metrics::track_token_refresh("reused");
            warn!(user_id = %user_id, "Refresh token rejected: not the current token");
            return Err(AppError::unauthorized("Invalid refresh token"));
        }

        metrics::track_token_refresh("success");
        Ok(tokens)
    }

    #[instrument(skip(db, cache), fields(db.operation = "UPDATE", db.table = "users"))]
    pub async fn logout(db: &PgPool, cache: &CacheStore, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET refresh_token_hash = NULL, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(db)
            .await
            .db_context("Failed to revoke refresh token")?;

        invalidate::session(cache, user_id).await;
        info!(user_id = %user_id, "User logged out");
        Ok(())
    }

    /// Active session for the user, or 404 when logged out or expired.
    pub async fn session(cache: &CacheStore, user_id: Uuid) -> Result<SessionInfo, AppError> {
        cache
            .get::<SessionInfo>(&keys::sessions::by_user(user_id))
            .await
            .ok_or_else(|| AppError::not_found("No active session"))
    }

    /// Issues a reset token when the account exists. The outcome is never
    /// revealed to the caller; the email goes out in a background task.
    #[instrument(skip_all, fields(db.operation = "SELECT", db.table = "users"))]
    pub async fn forgot_password(
        db: &PgPool,
        cache: &CacheStore,
        jwt_config: &JwtConfig,
        email_config: &EmailConfig,
        dto: ForgotPasswordRequest,
    ) -> Result<(), AppError> {
        let email = dto.email.trim().to_lowercase();

        let user: Option<(Uuid, String, String)> = sqlx::query_as(
            "SELECT id, first_name, last_name FROM users WHERE email = $1",
        )
        .bind(&email)
        .fetch_optional(db)
        .await
        .db_context("Failed to fetch user")?;

        let Some((user_id, first_name, last_name)) = user else {
            info!("Password reset requested for unknown email");
            return Ok(());
        };

        let token = create_password_reset_token(user_id, &email, jwt_config)?;
        let record = ResetTokenRecord {
            user_id,
            email: email.clone(),
        };
        // A failed write must look like any other request to the caller.
        if let Err(e) = cache
            .set_with_ttl(&keys::reset_tokens::by_token(&token), &record, keys::RESET_TOKEN_TTL)
            .await
        {
            warn!(user_id = %user_id, error = %e, "Failed to store password reset token");
            return Ok(());
        }

        let email_service = EmailService::new(email_config.clone());
        let name = format!("{} {}", first_name, last_name);
        tokio::spawn(async move {
            if let Err(e) = email_service
                .send_password_reset_email(&email, &name, &token)
                .await
            {
                warn!(error = %e.message(), "Failed to send password reset email");
            }
        });

        info!(user_id = %user_id, "Password reset token issued");
        Ok(())
    }

    #[instrument(skip_all, fields(db.operation = "UPDATE", db.table = "users"))]
    pub async fn reset_password(
        db: &PgPool,
        cache: &CacheStore,
        jwt_config: &JwtConfig,
        email_config: &EmailConfig,
        dto: ResetPasswordRequest,
    ) -> Result<(), AppError> {
        if dto.new_password != dto.confirm_password {
            return Err(AppError::bad_request("Passwords do not match"));
        }

        let claims = verify_password_reset_token(&dto.token, jwt_config)?;
        let user_id = claims.user_id()?;

        // Consumed before the password is written: of two concurrent resets
        // with the same token only one gets the record.
        let record = cache
            .take::<ResetTokenRecord>(&keys::reset_tokens::by_token(&dto.token))
            .await
            .map_err(AppError::internal)?
            .filter(|record| record.user_id == user_id)
            .ok_or_else(|| {
                AppError::unauthorized("Reset token has already been used or has expired")
            })?;

        let password_hash = hash_password(&dto.new_password)?;

        let user: Option<(String, String, String)> = sqlx::query_as(
            "UPDATE users
             SET password = $1, refresh_token_hash = NULL, updated_at = NOW()
             WHERE id = $2
             RETURNING email, first_name, last_name",
        )
        .bind(&password_hash)
        .bind(user_id)
        .fetch_optional(db)
        .await
        .db_context("Failed to update password")?;

        let Some((email, first_name, last_name)) = user else {
            return Err(AppError::unauthorized("Invalid or expired reset token"));
        };

        // The address may have changed since the reset was requested.
        invalidate::login(cache, &email).await;
        if record.email != email {
            invalidate::login(cache, &record.email).await;
        }
        invalidate::session(cache, user_id).await;
        metrics::track_password_reset();
        info!(user_id = %user_id, "Password reset");

        let email_service = EmailService::new(email_config.clone());
        let name = format!("{} {}", first_name, last_name);
        if let Err(e) = email_service
            .send_password_reset_confirmation(&email, &name)
            .await
        {
            warn!(error = %e.message(), "Failed to send password reset confirmation");
        }

        Ok(())
    }
}
