//! User/items domain service.
//!
//! Implements the write and read driving ports on top of the transactional
//! store, the short-lived items cache, and the read-event notifier:
//! - writes are validated before any store access;
//! - writes run as one tagged transaction and never touch the cache;
//! - reads go cache-aside and emit one read event once the result is known;
//! - cache calls get a short budget of their own so a stalled cache leaves
//!   time for the store read.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{Instrument, debug, info_span, warn};

use crate::domain::ports::{
    AddItemRequest, CacheKey, CreateUserRequest, ItemsCache, NewUser, NewUserItem, StoreError,
    UserItemStore, UserItemsCommand, UserItemsQuery,
};
use crate::domain::{
    ItemParams, ReadEventNotifier, RequestDeadline, StoreOperation, TransactionTag, User, UserId,
    UserItemRow, UserItemsError, UserParams, ValidationError, Validator,
};

/// Default bound on one request's store and cache calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default bound on a single cache call.
pub const DEFAULT_CACHE_TIMEOUT: Duration = Duration::from_secs(1);

/// Default deployment environment recorded in transaction tags.
pub const DEFAULT_ENVIRONMENT: &str = "dev";

/// Domain service implementing [`UserItemsCommand`] and [`UserItemsQuery`].
#[derive(Clone)]
pub struct UserItemsService<S> {
    store: Arc<S>,
    cache: Arc<dyn ItemsCache>,
    notifier: ReadEventNotifier,
    validator: Validator,
    clock: Arc<dyn Clock>,
    environment: String,
    request_timeout: Duration,
    cache_timeout: Duration,
}

impl<S> UserItemsService<S> {
    /// Create a service with the reference validator, the `dev` environment,
    /// a 30 second request timeout and a 1 second cache timeout.
    pub fn new(
        store: Arc<S>,
        cache: Arc<dyn ItemsCache>,
        notifier: ReadEventNotifier,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            cache,
            notifier,
            validator: Validator::default(),
            clock,
            environment: DEFAULT_ENVIRONMENT.to_owned(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            cache_timeout: DEFAULT_CACHE_TIMEOUT,
        }
    }

    /// Replace the validation rules.
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = validator;
        self
    }

    /// Set the environment recorded in transaction tags.
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    /// Set the per-request deadline.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the bound on each cache call. It never extends past the request
    /// deadline.
    pub fn with_cache_timeout(mut self, timeout: Duration) -> Self {
        self.cache_timeout = timeout;
        self
    }

    fn tag(&self, operation: StoreOperation) -> TransactionTag {
        TransactionTag::new(operation, &self.environment)
    }

    fn deadline(&self) -> RequestDeadline {
        RequestDeadline::after(self.request_timeout)
    }
}

impl<S> UserItemsService<S>
where
    S: UserItemStore,
{
    async fn cached_rows(
        &self,
        key: &CacheKey,
        deadline: &RequestDeadline,
    ) -> Option<Vec<UserItemRow>> {
        let span = info_span!("cache_get", key = %key);
        async {
            let budget = deadline.capped(self.cache_timeout);
            let payload = match budget.bound(self.cache.get(key)).await {
                Ok(Ok(Some(payload))) => payload,
                Ok(Ok(None)) => return None,
                Ok(Err(err)) => {
                    warn!(error = %err, "items cache read failed; treating as miss");
                    return None;
                }
                Err(elapsed) => {
                    warn!(error = %elapsed, "items cache read timed out; treating as miss");
                    return None;
                }
            };
            match serde_json::from_str(&payload) {
                Ok(rows) => Some(rows),
                Err(err) => {
                    warn!(error = %err, "cached items payload is corrupt; treating as miss");
                    None
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn populate_cache(
        &self,
        key: &CacheKey,
        rows: &[UserItemRow],
        deadline: &RequestDeadline,
    ) {
        let span = info_span!("cache_set", key = %key, rows = rows.len());
        async {
            let payload = match serde_json::to_string(rows) {
                Ok(payload) => payload,
                Err(err) => {
                    warn!(error = %err, "failed to encode items for cache");
                    return;
                }
            };
            let budget = deadline.capped(self.cache_timeout);
            match budget.bound(self.cache.set(key, &payload)).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => warn!(error = %err, "items cache write failed"),
                Err(elapsed) => warn!(error = %elapsed, "items cache write timed out"),
            }
        }
        .instrument(span)
        .await;
    }

    async fn load_rows(
        &self,
        user_id: &UserId,
        deadline: &RequestDeadline,
    ) -> Result<Vec<UserItemRow>, StoreError> {
        let tag = self.tag(StoreOperation::UserItems);
        let span = info_span!("transaction", tag = %tag.transaction_tag());
        deadline
            .bound(self.store.user_items(user_id, &tag))
            .instrument(span)
            .await
            .map_err(|_| StoreError::deadline_exceeded())?
    }

    fn validate<F>(&self, check: F) -> Result<(), UserItemsError>
    where
        F: FnOnce(&Validator) -> Result<(), ValidationError>,
    {
        info_span!("validate").in_scope(|| check(&self.validator).map_err(UserItemsError::from))
    }
}

#[async_trait]
impl<S> UserItemsCommand for UserItemsService<S>
where
    S: UserItemStore,
{
    async fn create_user(&self, request: CreateUserRequest) -> Result<User, UserItemsError> {
        self.validate(|validator| {
            validator.check_user(&UserParams {
                user_id: request.user_id.as_str(),
                user_name: Some(request.name.as_str()),
            })
        })?;

        let deadline = self.deadline();
        let tag = self.tag(StoreOperation::CreateUser);
        let row = NewUser {
            user_id: request.user_id.clone(),
            name: request.name.clone(),
            timestamp: self.clock.utc(),
        };
        let span = info_span!("transaction", tag = %tag.transaction_tag());
        let written = deadline
            .bound(self.store.create_user(&row, &tag))
            .instrument(span)
            .await
            .map_err(|_| StoreError::deadline_exceeded())??;
        debug!(rows = written, user_id = %request.user_id, "user created");

        Ok(User::new(request.user_id, request.name))
    }

    async fn add_item_to_user(&self, request: AddItemRequest) -> Result<(), UserItemsError> {
        self.validate(|validator| {
            validator.check_user_item(
                &UserParams::id_only(request.user_id.as_str()),
                &ItemParams {
                    item_id: request.item_id.as_str(),
                },
            )
        })?;

        let deadline = self.deadline();
        let tag = self.tag(StoreOperation::AddItemToUser);
        let row = NewUserItem {
            user_id: request.user_id,
            item_id: request.item_id,
            timestamp: self.clock.utc(),
        };
        let span = info_span!("transaction", tag = %tag.transaction_tag());
        let written = deadline
            .bound(self.store.add_item_to_user(&row, &tag))
            .instrument(span)
            .await
            .map_err(|_| StoreError::deadline_exceeded())??;
        // The cached projection is left alone; readers see the item once the
        // entry expires.
        debug!(rows = written, user_id = %row.user_id, item_id = %row.item_id, "item added");
        Ok(())
    }
}

#[async_trait]
impl<S> UserItemsQuery for UserItemsService<S>
where
    S: UserItemStore,
{
    async fn user_items(&self, user_id: &UserId) -> Result<Vec<UserItemRow>, UserItemsError> {
        let deadline = self.deadline();
        let key = CacheKey::user_items(user_id);
        let rows = match self.cached_rows(&key, &deadline).await {
            Some(rows) => {
                debug!(user_id = %user_id, rows = rows.len(), "items served from cache");
                rows
            }
            None => {
                let rows = self.load_rows(user_id, &deadline).await?;
                debug!(user_id = %user_id, rows = rows.len(), "items loaded from store");
                self.populate_cache(&key, &rows, &deadline).await;
                rows
            }
        };

        self.notifier.notify(user_id, &deadline).await;
        Ok(rows)
    }
}

#[cfg(test)]
#[path = "user_items_service_tests.rs"]
mod tests;
