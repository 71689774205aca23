//! Domain primitives, ports, and services.
//!
//! Purpose: define strongly typed entities and the use cases that operate on
//! them without depending on any transport or storage technology. Outbound
//! adapters implement the traits in [`ports`]; inbound adapters drive the
//! services through the command and query ports.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic error payload.
//! - User, UserId, ItemId, UserItemRow: the records the service manages.
//! - Validator and friends: structural request checks.
//! - UserItemsService: cache-aside reads and tagged writes.

pub mod deadline;
pub mod error;
pub mod ports;
pub mod read_events;
pub mod trace_id;
pub mod transaction_tag;
pub mod user;
pub mod user_items_error;
pub mod user_items_service;
pub mod validation;

pub use self::deadline::{DeadlineElapsed, RequestDeadline};
pub use self::error::{Error, ErrorCode};
pub use self::read_events::{PublishMode, ReadEventNotifier};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::transaction_tag::{StatementAction, StoreOperation, TransactionTag};
pub use self::user::{ItemId, User, UserId, UserItemRow};
pub use self::user_items_error::UserItemsError;
pub use self::user_items_service::{
    DEFAULT_CACHE_TIMEOUT, DEFAULT_ENVIRONMENT, DEFAULT_REQUEST_TIMEOUT, UserItemsService,
};
pub use self::validation::{
    Constraint, Field, FieldRule, ITEM_ID_MAX_LEN, ItemParams, USER_ID_MAX_LEN,
    USER_NAME_MAX_LEN, UserParams, ValidationError, Validator, Violation,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use stockroom::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::invalid_request("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
