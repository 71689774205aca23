//! Read-event publisher adapters.

mod redis_event_publisher;

use async_trait::async_trait;
use tracing::trace;

use crate::domain::ports::{EventPublisher, PublishError, ReadEvent};

pub use redis_event_publisher::RedisEventPublisher;

/// Default broker channel for read events.
pub const DEFAULT_TOPIC: &str = "user-items-reads";

/// Publisher that acknowledges every event without sending it anywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventPublisher;

#[async_trait]
impl EventPublisher for NoOpEventPublisher {
    async fn publish(&self, event: &ReadEvent) -> Result<(), PublishError> {
        trace!(user_id = %event.id, "read event dropped (no broker configured)");
        Ok(())
    }
}
