//! Redis-backed items cache.
//!
//! Entries are plain strings written with `SET key value PX <ttl>`, so
//! expiry is enforced by the server and a restart loses nothing that matters.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::redis;
use tracing::debug;

use crate::domain::ports::{CacheError, CacheKey, ItemsCache};
use crate::outbound::redis::RedisPool;

/// Cache adapter storing projections in Redis with a fixed TTL.
#[derive(Clone)]
pub struct RedisItemsCache {
    pool: RedisPool,
    ttl_millis: u64,
}

impl RedisItemsCache {
    /// Create a cache whose entries expire after `ttl` (minimum 1 ms).
    pub fn new(pool: RedisPool, ttl: Duration) -> Self {
        Self {
            pool,
            ttl_millis: ttl_millis(ttl),
        }
    }
}

/// `PX` rejects zero, so sub-millisecond TTLs round up.
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

fn map_redis_error(error: &redis::RedisError) -> CacheError {
    debug!(kind = ?error.kind(), "redis cache command failed");
    CacheError::backend(error.to_string())
}

#[async_trait]
impl ItemsCache for RedisItemsCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| CacheError::backend(err.into_message()))?;
        let payload: Option<String> = redis::cmd("GET")
            .arg(key.as_str())
            .query_async(&mut *conn)
            .await
            .map_err(|err| map_redis_error(&err))?;
        Ok(payload)
    }

    async fn set(&self, key: &CacheKey, payload: &str) -> Result<(), CacheError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| CacheError::backend(err.into_message()))?;
        let reply: String = redis::cmd("SET")
            .arg(key.as_str())
            .arg(payload)
            .arg("PX")
            .arg(self.ttl_millis)
            .query_async(&mut *conn)
            .await
            .map_err(|err| map_redis_error(&err))?;
        debug!(key = %key, reply = %reply, "items cached");
        Ok(())
    }
}
