//! Failure type of the user/items use cases and its mapping to the
//! transport-agnostic [`Error`] payload.

use serde_json::json;
use thiserror::Error as ThisError;

use crate::domain::ports::StoreError;
use crate::domain::{Error, ValidationError};

/// Errors returned by [`crate::domain::UserItemsService`] operations.
///
/// Cache and publish failures never appear here; they are absorbed by the
/// service and only logged.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum UserItemsError {
    /// Request parameters failed structural validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The transactional store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<UserItemsError> for Error {
    fn from(err: UserItemsError) -> Self {
        match err {
            UserItemsError::Validation(validation) => {
                Self::invalid_request(validation.to_string())
                    .with_details(json!({ "violations": validation.violations() }))
            }
            UserItemsError::Store(store) => match store {
                StoreError::Connection { .. } => Self::service_unavailable(store.to_string()),
                StoreError::DeadlineExceeded => Self::gateway_timeout(store.to_string()),
                StoreError::Query { .. }
                | StoreError::UniqueViolation { .. }
                | StoreError::ForeignKeyViolation { .. } => Self::internal(store.to_string()),
            },
        }
    }
}
