//! Driving port for the owned-items read.

use async_trait::async_trait;

use crate::domain::{UserId, UserItemRow, UserItemsError};

/// Read use case served through the cache-aside path.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserItemsQuery: Send + Sync {
    /// Items owned by `user_id`; may be stale by up to the cache TTL.
    ///
    /// # Errors
    /// Store errors on a cache miss only. Any id is accepted; cache and
    /// publish failures are never returned.
    async fn user_items(&self, user_id: &UserId) -> Result<Vec<UserItemRow>, UserItemsError>;
}
