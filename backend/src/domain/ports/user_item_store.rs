//! Port abstraction for the transactional users/items store.
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{ItemId, TransactionTag, UserId, UserItemRow};

use super::define_port_error;

define_port_error! {
    /// Errors raised by store adapters.
    pub enum StoreError {
        /// Store connection could not be established or was lost.
        Connection { message: String } => "store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "store query failed: {message}",
        /// A row with the same primary key already exists.
        UniqueViolation { message: String } => "store unique constraint violated: {message}",
        /// A referenced user or item does not exist.
        ForeignKeyViolation { message: String } => "store foreign key violated: {message}",
        /// The request deadline elapsed before the store answered.
        DeadlineExceeded => "store call exceeded the request deadline",
    }
}

/// User row to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Primary key.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// Used for both `created_at` and `updated_at`.
    pub timestamp: DateTime<Utc>,
}

/// Ownership row to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserItem {
    /// Owning user.
    pub user_id: UserId,
    /// Owned item.
    pub item_id: ItemId,
    /// Used for both `created_at` and `updated_at`.
    pub timestamp: DateTime<Utc>,
}

/// Transactional access to `users`, `items`, and `user_items`.
///
/// Each call runs in its own transaction tagged with `tag`. Writes either
/// fully commit or leave no trace; reads observe one consistent snapshot.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserItemStore: Send + Sync {
    /// Insert one user; returns the number of rows written.
    async fn create_user(&self, user: &NewUser, tag: &TransactionTag) -> Result<u64, StoreError>;

    /// Insert one ownership row; returns the number of rows written.
    async fn add_item_to_user(
        &self,
        item: &NewUserItem,
        tag: &TransactionTag,
    ) -> Result<u64, StoreError>;

    /// Items owned by `user_id`, in store order. Unknown users own nothing.
    async fn user_items(
        &self,
        user_id: &UserId,
        tag: &TransactionTag,
    ) -> Result<Vec<UserItemRow>, StoreError>;
}
