//! Port for emitting read notifications to a message broker.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised while publishing a read event.
    pub enum PublishError {
        /// Broker could not be reached.
        Unavailable { message: String } => "event broker unavailable: {message}",
        /// Broker refused the message.
        Rejected { message: String } => "event rejected by broker: {message}",
        /// Event could not be encoded.
        Serialization { message: String } => "event serialisation failed: {message}",
    }
}

/// Notification that a user's items were read.
///
/// Serialised as `{"id": "<user_id>", "rev": "<revision>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadEvent {
    /// User whose items were read.
    pub id: UserId,
    /// Deployed service revision.
    pub rev: String,
}

impl ReadEvent {
    /// Build an event for `user_id` at `revision`.
    pub fn new(user_id: UserId, revision: impl Into<String>) -> Self {
        Self {
            id: user_id,
            rev: revision.into(),
        }
    }

    /// JSON wire payload.
    ///
    /// # Errors
    /// Returns [`PublishError::Serialization`] if encoding fails.
    pub fn to_payload(&self) -> Result<String, PublishError> {
        serde_json::to_string(self).map_err(|err| PublishError::serialization(err.to_string()))
    }
}

/// Delivers [`ReadEvent`]s to a broker.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish one event, resolving once the broker acknowledged it.
    async fn publish(&self, event: &ReadEvent) -> Result<(), PublishError>;
}
