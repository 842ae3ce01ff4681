//! # Coursebook Cache
//!
//! Key-value store with per-entry TTLs, used for login lookups, user profiles,
//! sessions and password-reset tokens.
//!
//! [`CacheStore`] talks to Redis when `REDIS_URL` (or `REDIS_HOST`) is set and the
//! server answers at startup; otherwise it keeps entries in an in-process map.
//! Values are stored as JSON.
//!
//! ```ignore
//! use coursebook_cache::{CacheConfig, CacheStore, keys};
//!
//! let cache = CacheStore::connect(&CacheConfig::from_env()).await;
//! cache.set_with_ttl(&keys::users::by_id(id), &profile, keys::USER_TTL).await?;
//! let profile: Option<Profile> = cache.get(&keys::users::by_id(id)).await;
//! ```

pub mod config;
pub mod keys;
pub mod memory;
pub mod redis;
pub mod store;

pub use config::CacheConfig;
pub use keys::invalidate;
pub use memory::MemoryCache;
pub use redis::RedisCache;
pub use store::CacheStore;

/// Error type for cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Redis connection error: {0}")]
    Connection(#[from] ::redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Timed out connecting to Redis")]
    Timeout,
}
