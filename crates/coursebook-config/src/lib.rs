//! # Coursebook Config
//!
//! Configuration types for the Coursebook API, loaded from environment variables
//! (after `dotenvy` has read `.env` in the binaries):
//!
//! - [`jwt`]: token secrets and lifetimes
//! - [`cors`]: allowed origins
//! - [`email`]: SMTP settings
//! - [`rate_limit`]: per-IP limits on the public auth endpoints
//! - [`server`]: listen addresses
//! - [`storage`]: avatar upload location and limits
//!
//! Every struct also has a `from_lookup` constructor taking a lookup closure, so
//! parsing can be tested without touching the process environment.
//!
//! ```ignore
//! use coursebook_config::{JwtConfig, RateLimitConfig};
//!
//! let jwt = JwtConfig::from_env();
//! let rate_limit = RateLimitConfig::from_env();
//! ```

pub mod cors;
pub mod email;
pub mod jwt;
pub mod rate_limit;
pub mod server;
pub mod storage;

pub use cors::CorsConfig;
pub use email::EmailConfig;
pub use jwt::JwtConfig;
pub use rate_limit::{AuthGovernorConfig, RateLimitConfig};
pub use server::ServerConfig;
pub use storage::StorageConfig;

use std::str::FromStr;

pub(crate) fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Parse a variable, falling back to `default` when it is unset or malformed.
pub(crate) fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

pub(crate) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let owned: Vec<(String, String)> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| {
        owned
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }
}
