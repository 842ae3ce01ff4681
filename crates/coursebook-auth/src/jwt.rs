//! Token creation and verification.
//!
//! Access and password-reset tokens are signed with `JwtConfig::access_secret`,
//! refresh tokens with `JwtConfig::refresh_secret`. Verification checks the
//! signature, the expiry and the `token_type` tag.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};
use utoipa::ToSchema;
use uuid::Uuid;

use coursebook_config::JwtConfig;
use coursebook_core::AppError;

use crate::claims::{Claims, PasswordResetClaims, RefreshTokenClaims, TokenType};

/// An access token together with its refresh token.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// `(iat, exp)` for a token living `ttl_seconds`.
fn timestamps(ttl_seconds: i64) -> (usize, usize) {
    let now = Utc::now().timestamp();
    (now as usize, (now + ttl_seconds).max(0) as usize)
}

fn sign<T: Serialize>(claims: &T, secret: &str, what: &str) -> Result<String, AppError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::internal_error(format!("Failed to create {}: {}", what, e)))
}

fn decode_claims<T: DeserializeOwned>(token: &str, secret: &str) -> Option<T> {
    decode::<T>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .ok()
}

pub fn create_access_token(
    user_id: Uuid,
    email: &str,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let (iat, exp) = timestamps(jwt_config.access_token_expiry);
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        token_type: TokenType::Access,
        exp,
        iat,
    };

    sign(&claims, &jwt_config.access_secret, "token")
}

/// Verifies an access token. Refresh and reset tokens are rejected.
pub fn verify_access_token(token: &str, jwt_config: &JwtConfig) -> Result<Claims, AppError> {
    decode_claims::<Claims>(token, &jwt_config.access_secret)
        .filter(|claims| claims.token_type == TokenType::Access)
        .ok_or_else(|| AppError::unauthorized("Invalid or expired token"))
}

pub fn create_refresh_token(
    user_id: Uuid,
    email: &str,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let (iat, exp) = timestamps(jwt_config.refresh_token_expiry);
    let claims = RefreshTokenClaims {
        sub: user_id.to_string(),
        email: email.to_string(),
        token_type: TokenType::Refresh,
        exp,
        iat,
        jti: Uuid::new_v4().to_string(),
    };

    sign(&claims, &jwt_config.refresh_secret, "refresh token")
}

pub fn verify_refresh_token(
    token: &str,
    jwt_config: &JwtConfig,
) -> Result<RefreshTokenClaims, AppError> {
    decode_claims::<RefreshTokenClaims>(token, &jwt_config.refresh_secret)
        .filter(|claims| claims.token_type == TokenType::Refresh)
        .ok_or_else(|| AppError::unauthorized("Invalid refresh token"))
}

pub fn create_password_reset_token(
    user_id: Uuid,
    email: &str,
    jwt_config: &JwtConfig,
) -> Result<String, AppError> {
    let (iat, exp) = timestamps(jwt_config.reset_token_expiry);
    let claims = PasswordResetClaims {
        sub: user_id.to_string(),
        email: email.to_string(),
        token_type: TokenType::PasswordReset,
        exp,
        iat,
        jti: Uuid::new_v4().to_string(),
    };

    sign(&claims, &jwt_config.access_secret, "reset token")
}

pub fn verify_password_reset_token(
    token: &str,
    jwt_config: &JwtConfig,
) -> Result<PasswordResetClaims, AppError> {
    decode_claims::<PasswordResetClaims>(token, &jwt_config.access_secret)
        .filter(|claims| claims.token_type == TokenType::PasswordReset)
        .ok_or_else(|| AppError::unauthorized("Invalid or expired reset token"))
}

pub fn issue_token_pair(
    user_id: Uuid,
    email: &str,
    jwt_config: &JwtConfig,
) -> Result<TokenPair, AppError> {
    Ok(TokenPair {
        access_token: create_access_token(user_id, email, jwt_config)?,
        refresh_token: create_refresh_token(user_id, email, jwt_config)?,
    })
}

/// Hex SHA-256 of a token. Tokens are only ever stored in this form.
pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
