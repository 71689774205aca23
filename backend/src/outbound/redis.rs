//! Pooled Redis connections shared by the cache and the event publisher.

use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::{Pool, PooledConnection};

use crate::outbound::pool::{PoolConfig, PoolError};

/// `bb8` pool of multiplexed Redis connections.
#[derive(Clone)]
pub struct RedisPool {
    inner: Pool<RedisConnectionManager>,
}

impl RedisPool {
    /// Build a pool for the Redis server at `config.url()`.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Build` if the URL is malformed or the initial idle
    /// connections cannot be opened.
    pub async fn new(config: &PoolConfig) -> Result<Self, PoolError> {
        let manager = RedisConnectionManager::new(config.url())
            .map_err(|err| PoolError::build(err.to_string()))?;

        let pool = Pool::builder()
            .max_size(config.max_size())
            .min_idle(config.min_idle())
            .connection_timeout(config.connection_timeout())
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;

        Ok(Self { inner: pool })
    }

    /// Check out a connection.
    ///
    /// # Errors
    ///
    /// Returns `PoolError::Checkout` when no connection frees up within the
    /// configured timeout or the server is unreachable.
    pub async fn get(&self) -> Result<PooledConnection<'_, RedisConnectionManager>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }
}
