//! Driving port for user and ownership writes.
//!
//! HTTP handlers call [`UserItemsCommand`] to create users and record item
//! ownership without importing persistence concerns.

use async_trait::async_trait;

use crate::domain::{ItemId, User, UserId, UserItemsError};

/// Request to create a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateUserRequest {
    /// Identifier to assign.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
}

impl CreateUserRequest {
    /// Create a user with a freshly generated UUID-v4 identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(UserId::random(), name)
    }

    /// Create a user with a caller-supplied identifier.
    ///
    /// A duplicate identifier fails with a unique-violation store error.
    pub fn with_id(user_id: UserId, name: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
        }
    }
}

/// Request to record that a user owns an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddItemRequest {
    /// Owning user.
    pub user_id: UserId,
    /// Owned item.
    pub item_id: ItemId,
}

impl AddItemRequest {
    /// Build a request from its parts.
    pub fn new(user_id: UserId, item_id: ItemId) -> Self {
        Self { user_id, item_id }
    }
}

/// Write use cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserItemsCommand: Send + Sync {
    /// Create one user and return it.
    ///
    /// # Errors
    /// Validation failures and store errors.
    async fn create_user(&self, request: CreateUserRequest) -> Result<User, UserItemsError>;

    /// Record ownership of an item. Does not touch the read cache.
    ///
    /// # Errors
    /// Validation failures and store errors, including a foreign-key
    /// violation when the user or item does not exist.
    async fn add_item_to_user(&self, request: AddItemRequest) -> Result<(), UserItemsError>;
}
