//! Observability tags attached to store transactions and statements.
//!
//! Tags never change semantics. The persistence adapter records the
//! transaction tag as the session `application_name` and prefixes each
//! statement with a SQL comment holding the request tag.

use std::fmt;

/// Store operation a transaction performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    /// Insert one user row.
    CreateUser,
    /// Insert one ownership row.
    AddItemToUser,
    /// Read the items a user owns.
    UserItems,
}

impl StoreOperation {
    /// Name used in tags (`func=<name>`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateUser => "CreateUser",
            Self::AddItemToUser => "AddItemToUser",
            Self::UserItems => "UserItems",
        }
    }
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of statement executed inside a tagged transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementAction {
    /// A row insert.
    Insert,
    /// A read query.
    Query,
}

impl StatementAction {
    /// Name used in request tags (`action=<name>`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Query => "query",
        }
    }
}

/// Tag identifying a transaction by operation and deployment environment.
///
/// # Examples
/// ```
/// use stockroom::domain::{StatementAction, StoreOperation, TransactionTag};
///
/// let tag = TransactionTag::new(StoreOperation::CreateUser, "dev");
/// assert_eq!(tag.transaction_tag(), "func=CreateUser,env=dev");
/// assert_eq!(
///     tag.request_tag(StatementAction::Insert),
///     "func=CreateUser,env=dev,action=insert"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransactionTag {
    operation: StoreOperation,
    environment: String,
}

impl TransactionTag {
    /// Build a tag; characters outside `[A-Za-z0-9_.-]` in the environment
    /// are replaced with `_` so the tag is safe inside a SQL comment.
    pub fn new(operation: StoreOperation, environment: &str) -> Self {
        let environment = environment
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        Self {
            operation,
            environment,
        }
    }

    /// Operation the transaction performs.
    pub const fn operation(&self) -> StoreOperation {
        self.operation
    }

    /// Sanitised environment name.
    pub fn environment(&self) -> &str {
        self.environment.as_str()
    }

    /// Tag attached to the whole transaction.
    pub fn transaction_tag(&self) -> String {
        format!("func={},env={}", self.operation, self.environment)
    }

    /// Tag attached to one statement within the transaction.
    pub fn request_tag(&self, action: StatementAction) -> String {
        format!("{},action={}", self.transaction_tag(), action.as_str())
    }
}
