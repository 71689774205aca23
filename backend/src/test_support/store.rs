//! In-memory store enforcing the relational constraints of the real schema.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::lock;
use crate::domain::ports::{NewUser, NewUserItem, StoreError, UserItemStore};
use crate::domain::{TransactionTag, UserId, UserItemRow};

struct UserRecord {
    name: String,
    created_at: DateTime<Utc>,
}

struct OwnershipRecord {
    user_id: String,
    item_id: String,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
    users: HashMap<String, UserRecord>,
    items: HashMap<String, String>,
    user_items: Vec<OwnershipRecord>,
}

/// Store double with primary-key and foreign-key checks.
///
/// Counts reads and writes, records every transaction tag, and can be told
/// to fail or stall each call.
#[derive(Default)]
pub struct InMemoryUserItemStore {
    tables: Mutex<Tables>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    tags: Mutex<Vec<TransactionTag>>,
    failure: Mutex<Option<StoreError>>,
    delay: Option<Duration>,
}

impl InMemoryUserItemStore {
    /// Seed a reference item.
    pub fn with_item(self, item_id: &str, item_name: &str) -> Self {
        lock(&self.tables)
            .items
            .insert(item_id.to_owned(), item_name.to_owned());
        self
    }

    /// Stall every call for `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fail subsequent calls with `error` until cleared with `None`.
    pub fn fail_with(&self, error: Option<StoreError>) {
        *lock(&self.failure) = error;
    }

    /// Completed and attempted `user_items` calls.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Completed and attempted write calls.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Tags of every transaction opened, in call order.
    pub fn tags(&self) -> Vec<TransactionTag> {
        lock(&self.tags).clone()
    }

    /// Name stored for `user_id`.
    pub fn user_name(&self, user_id: &UserId) -> Option<String> {
        lock(&self.tables)
            .users
            .get(user_id.as_str())
            .map(|user| user.name.clone())
    }

    /// Creation timestamp stored for `user_id`.
    pub fn user_created_at(&self, user_id: &UserId) -> Option<DateTime<Utc>> {
        lock(&self.tables)
            .users
            .get(user_id.as_str())
            .map(|user| user.created_at)
    }

    /// Number of ownership rows.
    pub fn ownership_count(&self) -> usize {
        lock(&self.tables).user_items.len()
    }

    /// Creation timestamp of the ownership row, if present.
    pub fn ownership_created_at(&self, user_id: &str, item_id: &str) -> Option<DateTime<Utc>> {
        lock(&self.tables)
            .user_items
            .iter()
            .find(|row| row.user_id == user_id && row.item_id == item_id)
            .map(|row| row.created_at)
    }

    async fn enter(&self, tag: &TransactionTag) -> Result<(), StoreError> {
        lock(&self.tags).push(tag.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match lock(&self.failure).clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl UserItemStore for InMemoryUserItemStore {
    async fn create_user(&self, user: &NewUser, tag: &TransactionTag) -> Result<u64, StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.enter(tag).await?;
        let mut tables = lock(&self.tables);
        if tables.users.contains_key(user.user_id.as_str()) {
            return Err(StoreError::unique_violation("users_pkey"));
        }
        tables.users.insert(
            user.user_id.as_str().to_owned(),
            UserRecord {
                name: user.name.clone(),
                created_at: user.timestamp,
            },
        );
        Ok(1)
    }

    async fn add_item_to_user(
        &self,
        item: &NewUserItem,
        tag: &TransactionTag,
    ) -> Result<u64, StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.enter(tag).await?;
        let mut tables = lock(&self.tables);
        if !tables.users.contains_key(item.user_id.as_str()) {
            return Err(StoreError::foreign_key_violation("user_items_user_id_fkey"));
        }
        if !tables.items.contains_key(item.item_id.as_str()) {
            return Err(StoreError::foreign_key_violation("user_items_item_id_fkey"));
        }
        let duplicate = tables
            .user_items
            .iter()
            .any(|row| row.user_id == item.user_id.as_str() && row.item_id == item.item_id.as_str());
        if duplicate {
            return Err(StoreError::unique_violation("user_items_pkey"));
        }
        tables.user_items.push(OwnershipRecord {
            user_id: item.user_id.as_str().to_owned(),
            item_id: item.item_id.as_str().to_owned(),
            created_at: item.timestamp,
        });
        Ok(1)
    }

    async fn user_items(
        &self,
        user_id: &UserId,
        tag: &TransactionTag,
    ) -> Result<Vec<UserItemRow>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.enter(tag).await?;
        let tables = lock(&self.tables);
        let Some(user) = tables.users.get(user_id.as_str()) else {
            return Ok(Vec::new());
        };
        let rows = tables
            .user_items
            .iter()
            .filter(|row| row.user_id == user_id.as_str())
            .filter_map(|row| {
                tables
                    .items
                    .get(&row.item_id)
                    .map(|item_name| UserItemRow::new(&user.name, item_name, &row.item_id))
            })
            .collect();
        Ok(rows)
    }
}
