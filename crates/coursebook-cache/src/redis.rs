//! Redis backend.

use redis::{AsyncCommands, Client, aio::ConnectionManager};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, error, instrument};

use crate::CacheError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache").finish_non_exhaustive()
    }
}

impl RedisCache {
    /// Connects and pings the server.
    pub async fn new(redis_url: &str) -> Result<Self, CacheError> {
        let client = Client::open(redis_url)?;
        let mut conn = tokio::time::timeout(CONNECT_TIMEOUT, ConnectionManager::new(client))
            .await
            .map_err(|_| CacheError::Timeout)??;

        let _: String = redis::cmd("PING").query_async(&mut conn).await?;

        Ok(Self { conn })
    }

    pub async fn try_get<T>(&self, key: &str) -> Result<Option<T>, CacheError>
    where
        T: DeserializeOwned,
    {
        let mut conn = self.conn.clone();

        match conn.get::<_, Option<String>>(key).await? {
            Some(value) => {
                debug!(cache.key = %key, "Cache hit");
                Ok(Some(serde_json::from_str(&value)?))
            }
            None => {
                debug!(cache.key = %key, "Cache miss");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, value), fields(cache.operation = "SETEX"))]
    pub async fn set_with_ttl<T>(&self, key: &str, value: &T, ttl: Duration) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let mut conn = self.conn.clone();
        let json = serde_json::to_string(value)?;

        conn.set_ex::<_, _, ()>(key, json, ttl.as_secs().max(1)).await?;

        debug!(cache.key = %key, cache.ttl_secs = %ttl.as_secs(), "Cache set");
        Ok(())
    }

    #[instrument(skip(self), fields(cache.operation = "DEL"))]
    pub async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(key).await?;

        debug!(cache.key = %key, "Cache invalidated");
        Ok(())
    }

    /// Reads and deletes a key in one `GETDEL`, so only one caller can obtain it.
    #[instrument(skip(self), fields(cache.operation = "GETDEL"))]
    pub async fn take<T>(&self, key: &str) -> Result<Option<T>, CacheError>
    where
        T: DeserializeOwned,
    {
        let mut conn = self.conn.clone();

        let value: Option<String> = redis::cmd("GETDEL")
            .arg(key)
            .query_async(&mut conn)
            .await?;

        value
            .map(|v| serde_json::from_str(&v))
            .transpose()
            .map_err(CacheError::from)
    }

    #[instrument(skip(self), fields(cache.operation = "EXISTS"))]
    pub async fn exists(&self, key: &str) -> bool {
        let mut conn = self.conn.clone();

        match conn.exists::<_, bool>(key).await {
            Ok(exists) => exists,
            Err(e) => {
                error!(cache.key = %key, error = %e, "Redis EXISTS error");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestData {
        id: i32,
        name: String,
    }

    #[tokio::test]
    #[ignore = "requires Redis"]
    async fn set_get_and_take() {
        let cache = RedisCache::new("redis://localhost:6379").await.unwrap();

        let data = TestData {
            id: 1,
            name: "test".to_string(),
        };

        cache
            .set_with_ttl("coursebook-test:key", &data, Duration::from_secs(60))
            .await
            .unwrap();
        assert!(cache.exists("coursebook-test:key").await);

        let taken: Option<TestData> = cache.take("coursebook-test:key").await.unwrap();
        assert_eq!(taken, Some(data));

        let again: Option<TestData> = cache.take("coursebook-test:key").await.unwrap();
        assert!(again.is_none());
    }
}
