//! Port interface for the short-lived owned-items cache.
use async_trait::async_trait;

use super::{CacheKey, define_port_error};

define_port_error! {
    /// Errors surfaced by items cache adapters.
    pub enum CacheError {
        /// Cache backend is unavailable or timing out.
        Backend { message: String } => "items cache backend failure: {message}",
        /// Serialisation or deserialisation of cached content failed.
        Serialization { message: String } => "items cache serialisation failed: {message}",
    }
}

/// Key/value cache with a fixed per-entry time to live.
///
/// Callers treat every error as a miss; the cache only ever accelerates
/// reads and is never the source of truth.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemsCache: Send + Sync {
    /// Read the payload stored under `key`; `None` is a miss.
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, CacheError>;

    /// Store `payload` under `key`, replacing any previous entry.
    async fn set(&self, key: &CacheKey, payload: &str) -> Result<(), CacheError>;
}
