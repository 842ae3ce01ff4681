//! Token secrets and lifetimes.
//!
//! Access and refresh tokens are signed with different secrets. Password-reset
//! tokens reuse the access secret and are told apart by their `token_type` claim.

use tracing::warn;

const DEV_ACCESS_SECRET: &str = "coursebook-dev-access-secret-change-me";
const DEV_REFRESH_SECRET: &str = "coursebook-dev-refresh-secret-change-me";

#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    /// Seconds.
    pub access_token_expiry: i64,
    pub refresh_token_expiry: i64,
    pub reset_token_expiry: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_secret: DEV_ACCESS_SECRET.to_string(),
            refresh_secret: DEV_REFRESH_SECRET.to_string(),
            access_token_expiry: 900,       // 15 minutes
            refresh_token_expiry: 604_800,  // 7 days
            reset_token_expiry: 3600,       // 1 hour
        }
    }
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(crate::env_lookup)
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let access_secret = lookup("JWT_SECRET").filter(|s| !s.is_empty());
        let refresh_secret = lookup("JWT_REFRESH_SECRET").filter(|s| !s.is_empty());

        if access_secret.is_none() || refresh_secret.is_none() {
            warn!("JWT_SECRET or JWT_REFRESH_SECRET not set, using development secrets");
        }

        Self {
            access_secret: access_secret.unwrap_or(defaults.access_secret),
            refresh_secret: refresh_secret.unwrap_or(defaults.refresh_secret),
            access_token_expiry: crate::parse_or(
                &lookup,
                "JWT_ACCESS_EXPIRY",
                defaults.access_token_expiry,
            ),
            refresh_token_expiry: crate::parse_or(
                &lookup,
                "JWT_REFRESH_EXPIRY",
                defaults.refresh_token_expiry,
            ),
            reset_token_expiry: crate::parse_or(
                &lookup,
                "JWT_RESET_EXPIRY",
                defaults.reset_token_expiry,
            ),
        }
    }
}
