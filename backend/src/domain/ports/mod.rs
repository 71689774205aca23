//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod cache_key;
mod event_publisher;
mod items_cache;
mod user_item_store;
mod user_items_command;
mod user_items_query;

pub use cache_key::{CacheKey, CacheKeyValidationError, USER_ITEMS_KEY_PREFIX};
#[cfg(test)]
pub use event_publisher::MockEventPublisher;
pub use event_publisher::{EventPublisher, PublishError, ReadEvent};
#[cfg(test)]
pub use items_cache::MockItemsCache;
pub use items_cache::{CacheError, ItemsCache};
#[cfg(test)]
pub use user_item_store::MockUserItemStore;
pub use user_item_store::{NewUser, NewUserItem, StoreError, UserItemStore};
#[cfg(test)]
pub use user_items_command::MockUserItemsCommand;
pub use user_items_command::{AddItemRequest, CreateUserRequest, UserItemsCommand};
#[cfg(test)]
pub use user_items_query::MockUserItemsQuery;
pub use user_items_query::UserItemsQuery;
