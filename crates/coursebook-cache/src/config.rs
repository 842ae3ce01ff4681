//! Cache configuration.
//!
//! - `REDIS_URL`: connection URL; when unset, `REDIS_HOST` (and optional
//!   `REDIS_PORT`, `REDIS_PASSWORD`) are assembled into one. With neither, the
//!   in-process store is used.
//! - `CACHE_TTL_SECONDS`: default TTL (default: 3600)
//! - `CACHE_PREFIX`: prefix for every key (default: `coursebook`)

use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub redis_url: Option<String>,
    pub default_ttl_seconds: u64,
    pub key_prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            redis_url: None,
            default_ttl_seconds: 3600,
            key_prefix: "coursebook".into(),
        }
    }
}

impl CacheConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let redis_url = lookup("REDIS_URL")
            .filter(|u| !u.trim().is_empty())
            .or_else(|| {
                let host = lookup("REDIS_HOST").filter(|h| !h.trim().is_empty())?;
                let port = lookup("REDIS_PORT").unwrap_or_else(|| "6379".into());
                Some(match lookup("REDIS_PASSWORD").filter(|p| !p.is_empty()) {
                    Some(password) => format!("redis://:{}@{}:{}", password, host, port),
                    None => format!("redis://{}:{}", host, port),
                })
            });

        Self {
            redis_url,
            default_ttl_seconds: lookup("CACHE_TTL_SECONDS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_ttl_seconds),
            key_prefix: lookup("CACHE_PREFIX")
                .filter(|p| !p.is_empty())
                .unwrap_or(defaults.key_prefix),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_seconds)
    }

    /// `"{prefix}:{key}"`
    pub fn prefixed_key(&self, key: &str) -> String {
        format!("{}:{}", self.key_prefix, key)
    }
}
