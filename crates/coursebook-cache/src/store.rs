//! Backend-agnostic cache handle stored in the application state.

use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::{CacheConfig, CacheError, MemoryCache, RedisCache};

#[derive(Clone, Debug)]
enum Backend {
    Redis(RedisCache),
    Memory(MemoryCache),
}

/// Cache handle. Keys passed in are namespaced with the configured prefix.
#[derive(Clone, Debug)]
pub struct CacheStore {
    backend: Backend,
    config: CacheConfig,
}

impl CacheStore {
    /// Connects to Redis when configured, falling back to the in-process store
    /// when no URL is set or the server does not answer.
    pub async fn connect(config: &CacheConfig) -> Self {
        let backend = match config.redis_url.as_deref() {
            Some(url) => match RedisCache::new(url).await {
                Ok(cache) => {
                    info!("Redis cache connected");
                    Backend::Redis(cache)
                }
                Err(e) => {
                    warn!(error = %e, "Redis unavailable, using in-memory cache");
                    Backend::Memory(MemoryCache::new())
                }
            },
            None => {
                info!("REDIS_URL not set, using in-memory cache");
                Backend::Memory(MemoryCache::new())
            }
        };

        Self {
            backend,
            config: config.clone(),
        }
    }

    /// In-process store with default settings.
    pub fn memory() -> Self {
        Self {
            backend: Backend::Memory(MemoryCache::new()),
            config: CacheConfig::default(),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self.backend {
            Backend::Redis(_) => "redis",
            Backend::Memory(_) => "memory",
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.config.default_ttl()
    }

    fn key(&self, key: &str) -> String {
        self.config.prefixed_key(key)
    }

    /// Gets a value; backend and decoding failures are logged and read as a miss.
    pub async fn get<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        match self.try_get(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(cache.key = %key, error = %e, "Cache read failed");
                None
            }
        }
    }

    pub async fn try_get<T>(&self, key: &str) -> Result<Option<T>, CacheError>
    where
        T: DeserializeOwned,
    {
        let key = self.key(key);
        match &self.backend {
            Backend::Redis(cache) => cache.try_get(&key).await,
            Backend::Memory(cache) => cache.try_get(&key).await,
        }
    }

    pub async fn set_with_ttl<T>(&self, key: &str, value: &T, ttl: Duration) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let key = self.key(key);
        match &self.backend {
            Backend::Redis(cache) => cache.set_with_ttl(&key, value, ttl).await,
            Backend::Memory(cache) => cache.set_with_ttl(&key, value, ttl).await,
        }
    }

    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        self.set_with_ttl(key, value, self.default_ttl()).await
    }

    /// Best-effort write: failures are logged, never returned.
    pub async fn put<T>(&self, key: &str, value: &T, ttl: Duration)
    where
        T: Serialize,
    {
        if let Err(e) = self.set_with_ttl(key, value, ttl).await {
            warn!(cache.key = %key, error = %e, "Cache write failed");
        }
    }

    pub async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        let key = self.key(key);
        match &self.backend {
            Backend::Redis(cache) => cache.invalidate(&key).await,
            Backend::Memory(cache) => cache.invalidate(&key).await,
        }
    }

    /// Atomically reads and removes a value. At most one caller receives it.
    pub async fn take<T>(&self, key: &str) -> Result<Option<T>, CacheError>
    where
        T: DeserializeOwned,
    {
        let key = self.key(key);
        let value = match &self.backend {
            Backend::Redis(cache) => cache.take(&key).await?,
            Backend::Memory(cache) => cache.take(&key).await?,
        };
        debug!(cache.key = %key, found = value.is_some(), "Cache take");
        Ok(value)
    }

    pub async fn exists(&self, key: &str) -> bool {
        let key = self.key(key);
        match &self.backend {
            Backend::Redis(cache) => cache.exists(&key).await,
            Backend::Memory(cache) => cache.exists(&key).await,
        }
    }
}
