//! # Coursebook Auth
//!
//! Token types and JWT utilities for the Coursebook API.
//!
//! - [`claims`]: claim structures for access, refresh and password-reset tokens
//! - [`jwt`]: token creation, verification and digests
//!
//! Every token carries a [`TokenType`] tag and every verifier checks it, so an
//! access token is never accepted where a refresh or reset token is expected.
//!
//! ```ignore
//! use coursebook_auth::{issue_token_pair, verify_access_token};
//! use coursebook_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let pair = issue_token_pair(user_id, "user@example.com", &config)?;
//! let claims = verify_access_token(&pair.access_token, &config)?;
//! ```

pub mod claims;
pub mod jwt;

pub use claims::{Claims, PasswordResetClaims, RefreshTokenClaims, TokenType};
pub use jwt::{
    TokenPair, create_access_token, create_password_reset_token, create_refresh_token,
    issue_token_pair, token_digest, verify_access_token, verify_password_reset_token,
    verify_refresh_token,
};
