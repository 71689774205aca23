//! PostgreSQL-backed users/items store.
//!
//! Every call runs in its own transaction. The transaction tag is written to
//! the transaction-local `application_name`; each statement carries its
//! request tag as a leading SQL comment so it shows up in
//! `pg_stat_activity` and the server log.

use diesel::QueryableByName;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_query;
use diesel::sql_types::{Text, Timestamptz};
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{NewUser, NewUserItem, StoreError, UserItemStore};
use crate::domain::{StatementAction, TransactionTag, UserId, UserItemRow};
use crate::outbound::pool::PoolError;

use super::pool::DbPool;

const SET_TRANSACTION_TAG_SQL: &str = "SELECT set_config('application_name', $1, true)";

const INSERT_USER_SQL: &str =
    "INSERT INTO users (user_id, name, created_at, updated_at) VALUES ($1, $2, $3, $3)";

const INSERT_USER_ITEM_SQL: &str =
    "INSERT INTO user_items (user_id, item_id, created_at, updated_at) VALUES ($1, $2, $3, $3)";

const SELECT_USER_ITEMS_SQL: &str = r#"
SELECT users.name AS user_name, items.item_name, user_items.item_id
FROM user_items
JOIN items ON items.item_id = user_items.item_id
JOIN users ON users.user_id = user_items.user_id
WHERE user_items.user_id = $1
"#;

#[derive(QueryableByName)]
struct UserItemRecord {
    #[diesel(sql_type = Text)]
    user_name: String,
    #[diesel(sql_type = Text)]
    item_name: String,
    #[diesel(sql_type = Text)]
    item_id: String,
}

impl From<UserItemRecord> for UserItemRow {
    fn from(record: UserItemRecord) -> Self {
        Self {
            user_name: record.user_name,
            item_name: record.item_name,
            item_id: record.item_id,
        }
    }
}

/// Prefix `sql` with the statement's request tag.
///
/// Tags only contain `[A-Za-z0-9_.,=-]`, so they cannot close the comment.
fn tagged(tag: &TransactionTag, action: StatementAction, sql: &str) -> String {
    format!("/* {} */ {}", tag.request_tag(action), sql.trim())
}

fn map_pool_error(error: PoolError) -> StoreError {
    StoreError::connection(error.into_message())
}

fn map_diesel_error(error: DieselError) -> StoreError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            StoreError::unique_violation(info.constraint_name().unwrap_or(info.message()))
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            StoreError::foreign_key_violation(info.constraint_name().unwrap_or(info.message()))
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _)
        | DieselError::BrokenTransactionManager => {
            StoreError::connection("database connection error")
        }
        other => StoreError::query(other.to_string()),
    }
}

fn rows_written(count: usize) -> u64 {
    u64::try_from(count).unwrap_or(u64::MAX)
}

/// Diesel-backed implementation of the [`UserItemStore`] port.
#[derive(Clone)]
pub struct DieselUserItemStore {
    pool: DbPool,
}

impl DieselUserItemStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserItemStore for DieselUserItemStore {
    async fn create_user(&self, user: &NewUser, tag: &TransactionTag) -> Result<u64, StoreError> {
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let transaction_tag = tag.transaction_tag();
        let statement = tagged(tag, StatementAction::Insert, INSERT_USER_SQL);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let written = conn
            .build_transaction()
            .read_write()
            .run(|conn| {
                async move {
                    sql_query(SET_TRANSACTION_TAG_SQL)
                        .bind::<Text, _>(transaction_tag.as_str())
                        .execute(conn)
                        .await?;
                    sql_query(statement.as_str())
                        .bind::<Text, _>(user.user_id.as_str())
                        .bind::<Text, _>(user.name.as_str())
                        .bind::<Timestamptz, _>(user.timestamp)
                        .execute(conn)
                        .await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        debug!(rows = written, tag = %tag.request_tag(StatementAction::Insert), "user inserted");
        Ok(rows_written(written))
    }

    async fn add_item_to_user(
        &self,
        item: &NewUserItem,
        tag: &TransactionTag,
    ) -> Result<u64, StoreError> {
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let transaction_tag = tag.transaction_tag();
        let statement = tagged(tag, StatementAction::Insert, INSERT_USER_ITEM_SQL);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let written = conn
            .build_transaction()
            .read_write()
            .run(|conn| {
                async move {
                    sql_query(SET_TRANSACTION_TAG_SQL)
                        .bind::<Text, _>(transaction_tag.as_str())
                        .execute(conn)
                        .await?;
                    sql_query(statement.as_str())
                        .bind::<Text, _>(item.user_id.as_str())
                        .bind::<Text, _>(item.item_id.as_str())
                        .bind::<Timestamptz, _>(item.timestamp)
                        .execute(conn)
                        .await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        debug!(
            rows = written,
            tag = %tag.request_tag(StatementAction::Insert),
            "ownership inserted"
        );
        Ok(rows_written(written))
    }

    async fn user_items(
        &self,
        user_id: &UserId,
        tag: &TransactionTag,
    ) -> Result<Vec<UserItemRow>, StoreError> {
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let transaction_tag = tag.transaction_tag();
        let statement = tagged(tag, StatementAction::Query, SELECT_USER_ITEMS_SQL);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // Read-only repeatable read gives the query one consistent snapshot;
        // the transaction ends on every exit path, decoding errors included.
        let records: Vec<UserItemRecord> = conn
            .build_transaction()
            .read_only()
            .repeatable_read()
            .run(|conn| {
                async move {
                    sql_query(SET_TRANSACTION_TAG_SQL)
                        .bind::<Text, _>(transaction_tag.as_str())
                        .execute(conn)
                        .await?;
                    sql_query(statement.as_str())
                        .bind::<Text, _>(user_id.as_str())
                        .load::<UserItemRecord>(conn)
                        .await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Ok(records.into_iter().map(UserItemRow::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StoreOperation;
    use rstest::rstest;

    #[rstest]
    fn statements_carry_request_tag_comment() {
        let tag = TransactionTag::new(StoreOperation::CreateUser, "prod");
        let sql = tagged(&tag, StatementAction::Insert, INSERT_USER_SQL);
        assert!(sql.starts_with("/* func=CreateUser,env=prod,action=insert */ INSERT INTO users"));
    }

    #[rstest]
    fn hostile_environment_cannot_close_comment() {
        let tag = TransactionTag::new(StoreOperation::UserItems, "x */ DROP TABLE users; --");
        let sql = tagged(&tag, StatementAction::Query, SELECT_USER_ITEMS_SQL);
        assert_eq!(sql.matches("*/").count(), 1);
    }

    #[rstest]
    fn closed_connection_maps_to_connection_error() {
        let err = map_diesel_error(DieselError::BrokenTransactionManager);
        assert_eq!(err, StoreError::connection("database connection error"));
    }

    #[rstest]
    fn not_found_maps_to_query_error() {
        let err = map_diesel_error(DieselError::NotFound);
        assert!(matches!(err, StoreError::Query { .. }));
    }

    #[rstest]
    fn pool_checkout_failure_is_a_connection_error() {
        let err = map_pool_error(PoolError::checkout("timed out"));
        assert_eq!(err, StoreError::connection("timed out"));
    }
}
