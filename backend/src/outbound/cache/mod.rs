//! Items cache adapters.
//!
//! - [`RedisItemsCache`]: production adapter (`GET` / `SET .. PX`).
//! - [`NoOpItemsCache`]: always misses; used when no Redis URL is configured.
//! - [`InMemoryItemsCache`]: process-local map with clock-driven expiry.

mod redis_items_cache;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;

use crate::domain::ports::{CacheError, CacheKey, ItemsCache};

pub use redis_items_cache::RedisItemsCache;

/// Default time to live of cached projections.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(2);

/// Cache that never stores anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpItemsCache;

#[async_trait]
impl ItemsCache for NoOpItemsCache {
    async fn get(&self, _key: &CacheKey) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _key: &CacheKey, _payload: &str) -> Result<(), CacheError> {
        Ok(())
    }
}

struct Entry {
    payload: String,
    /// `None` when the TTL is too large to represent.
    expires_at: Option<DateTime<Utc>>,
}

/// Process-local cache whose entries expire according to an injected clock.
pub struct InMemoryItemsCache {
    entries: Mutex<HashMap<String, Entry>>,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl InMemoryItemsCache {
    /// Create an empty cache with a fixed `ttl`.
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            clock,
        }
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Entry>>, CacheError> {
        self.entries
            .lock()
            .map_err(|_| CacheError::backend("in-memory cache lock poisoned"))
    }
}

#[async_trait]
impl ItemsCache for InMemoryItemsCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError> {
        let now = self.clock.utc();
        let mut entries = self.entries()?;
        let live = entries
            .get(key.as_str())
            .map(|entry| (entry.expires_at.is_none_or(|at| now < at), entry.payload.clone()));
        match live {
            Some((true, payload)) => Ok(Some(payload)),
            Some((false, _)) => {
                entries.remove(key.as_str());
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &CacheKey, payload: &str) -> Result<(), CacheError> {
        let expires_at = self.clock.utc().checked_add_signed(self.ttl);
        self.entries()?.insert(
            key.as_str().to_owned(),
            Entry {
                payload: payload.to_owned(),
                expires_at,
            },
        );
        Ok(())
    }
}
