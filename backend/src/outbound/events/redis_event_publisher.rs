//! Redis pub/sub event publisher.
//!
//! `PUBLISH` is acknowledged once the server has fanned the message out to
//! current subscribers; the reply (subscriber count) is only logged.

use async_trait::async_trait;
use bb8_redis::redis;
use tracing::debug;

use crate::domain::ports::{EventPublisher, PublishError, ReadEvent};
use crate::outbound::redis::RedisPool;

/// Publishes read events to a Redis channel.
#[derive(Clone)]
pub struct RedisEventPublisher {
    pool: RedisPool,
    channel: String,
}

impl RedisEventPublisher {
    /// Publish to `channel` using connections from `pool`.
    pub fn new(pool: RedisPool, channel: impl Into<String>) -> Self {
        Self {
            pool,
            channel: channel.into(),
        }
    }

    /// Destination channel.
    pub fn channel(&self) -> &str {
        self.channel.as_str()
    }
}

fn map_redis_error(error: &redis::RedisError) -> PublishError {
    if error.is_io_error()
        || error.is_connection_refusal()
        || error.is_connection_dropped()
        || error.is_timeout()
    {
        PublishError::unavailable(error.to_string())
    } else {
        PublishError::rejected(error.to_string())
    }
}

#[async_trait]
impl EventPublisher for RedisEventPublisher {
    async fn publish(&self, event: &ReadEvent) -> Result<(), PublishError> {
        let payload = event.to_payload()?;
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| PublishError::unavailable(err.into_message()))?;
        let receivers: i64 = redis::cmd("PUBLISH")
            .arg(self.channel.as_str())
            .arg(payload)
            .query_async(&mut *conn)
            .await
            .map_err(|err| map_redis_error(&err))?;
        debug!(channel = %self.channel, receivers, user_id = %event.id, "read event published");
        Ok(())
    }
}
