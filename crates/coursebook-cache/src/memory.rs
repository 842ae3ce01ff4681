//! In-process backend for single-node deployments and tests.
//!
//! Entries are JSON strings with an expiry instant; expired entries are dropped
//! when read and swept on every write.

use serde::{Serialize, de::DeserializeOwned};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

use crate::CacheError;

#[derive(Clone, Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, (String, Instant)>>>,
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache").finish_non_exhaustive()
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn try_get<T>(&self, key: &str) -> Result<Option<T>, CacheError>
    where
        T: DeserializeOwned,
    {
        let entries = self.entries.read().await;

        match entries.get(key) {
            Some((value, expires_at)) if *expires_at > Instant::now() => {
                debug!(cache.key = %key, "Cache hit");
                Ok(Some(serde_json::from_str(value)?))
            }
            _ => {
                debug!(cache.key = %key, "Cache miss");
                Ok(None)
            }
        }
    }

    pub async fn set_with_ttl<T>(&self, key: &str, value: &T, ttl: Duration) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let json = serde_json::to_string(value)?;
        let now = Instant::now();

        let mut entries = self.entries.write().await;
        entries.retain(|_, (_, expires_at)| *expires_at > now);
        entries.insert(key.to_string(), (json, now + ttl));

        debug!(cache.key = %key, cache.ttl_secs = %ttl.as_secs(), "Cache set");
        Ok(())
    }

    pub async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        self.entries.write().await.remove(key);
        debug!(cache.key = %key, "Cache invalidated");
        Ok(())
    }

    /// Removes and returns a live entry under the write lock.
    pub async fn take<T>(&self, key: &str) -> Result<Option<T>, CacheError>
    where
        T: DeserializeOwned,
    {
        let removed = self.entries.write().await.remove(key);

        match removed {
            Some((value, expires_at)) if expires_at > Instant::now() => {
                Ok(Some(serde_json::from_str(&value)?))
            }
            _ => Ok(None),
        }
    }

    pub async fn exists(&self, key: &str) -> bool {
        self.entries
            .read()
            .await
            .get(key)
            .is_some_and(|(_, expires_at)| *expires_at > Instant::now())
    }
}
