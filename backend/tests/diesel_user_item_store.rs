//! Integration tests for `DieselUserItemStore` against embedded PostgreSQL.
//!
//! Each test provisions its own migrated database, so tests can run in
//! parallel without sharing rows.
//!
//! # Runtime Strategy
//!
//! Cluster bootstrap and database teardown use blocking clients that must not
//! run inside a Tokio runtime. Tests therefore stay synchronous and drive the
//! async store through a runtime owned by the test world.

use std::time::Duration;

use chrono::{TimeZone, Utc};
use diesel::pg::PgConnection;
use diesel::sql_types::Text;
use diesel::{Connection, RunQueryDsl, sql_query};
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;
use uuid::Uuid;

use stockroom::domain::ports::{NewUser, NewUserItem, StoreError, UserItemStore};
use stockroom::domain::{ItemId, StoreOperation, TransactionTag, UserId, UserItemRow};
use stockroom::outbound::PoolConfig;
use stockroom::outbound::persistence::{DbPool, DieselUserItemStore};

#[path = "support/pg_embed.rs"]
mod pg_embed;

use pg_embed::{TestDatabase, handle_cluster_setup_failure, test_database};

// -----------------------------------------------------------------------------
// Test World
// -----------------------------------------------------------------------------

/// Fields drop in declaration order: the pool goes before its runtime, and
/// the database is dropped last once no connection is left.
struct StoreWorld {
    store: DieselUserItemStore,
    runtime: Runtime,
    database: TestDatabase,
}

impl StoreWorld {
    fn block_on<F: std::future::Future>(&self, fut: F) -> F::Output {
        self.runtime.block_on(fut)
    }

    /// Insert a reference item directly; the store never writes `items`.
    fn seed_item(&self, item_id: &str, item_name: &str) {
        let mut conn = PgConnection::establish(self.database.url()).expect("connect to test database");
        sql_query("INSERT INTO items (item_id, item_name) VALUES ($1, $2)")
            .bind::<Text, _>(item_id)
            .bind::<Text, _>(item_name)
            .execute(&mut conn)
            .expect("seed item");
    }

    fn create_user(&self, name: &str) -> UserId {
        let user_id = UserId::random();
        self.block_on(self.store.create_user(&new_user(&user_id, name), &tag(StoreOperation::CreateUser)))
            .expect("insert user");
        user_id
    }

    fn read(&self, user_id: &UserId) -> Vec<UserItemRow> {
        self.block_on(self.store.user_items(user_id, &tag(StoreOperation::UserItems)))
            .expect("read items")
    }
}

fn setup_world() -> Result<StoreWorld, String> {
    let database = test_database()?;
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let config = PoolConfig::new(database.url())
        .with_max_size(2)
        .with_min_idle(None);
    let pool = runtime
        .block_on(DbPool::new(&config))
        .map_err(|err| err.to_string())?;

    Ok(StoreWorld {
        store: DieselUserItemStore::new(pool),
        runtime,
        database,
    })
}

#[fixture]
fn world() -> Option<StoreWorld> {
    match setup_world() {
        Ok(world) => Some(world),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

fn fresh_id() -> String {
    Uuid::new_v4().to_string()
}

fn tag(operation: StoreOperation) -> TransactionTag {
    TransactionTag::new(operation, "it")
}

fn new_user(user_id: &UserId, name: &str) -> NewUser {
    NewUser {
        user_id: user_id.clone(),
        name: name.to_owned(),
        timestamp: Utc
            .with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
            .single()
            .expect("valid time"),
    }
}

fn ownership(user_id: &UserId, item_id: &str) -> NewUserItem {
    NewUserItem {
        user_id: user_id.clone(),
        item_id: ItemId::new(item_id),
        timestamp: Utc::now(),
    }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[rstest]
fn create_add_and_read_back(world: Option<StoreWorld>) {
    let Some(world) = world else { return };
    let item_id = fresh_id();
    world.seed_item(&item_id, "Iron Sword");

    let user_id = world.create_user("foo");
    assert!(world.read(&user_id).is_empty());

    let written = world
        .block_on(
            world
                .store
                .add_item_to_user(&ownership(&user_id, &item_id), &tag(StoreOperation::AddItemToUser)),
        )
        .expect("insert ownership");

    assert_eq!(written, 1);
    assert_eq!(
        world.read(&user_id),
        vec![UserItemRow::new("foo", "Iron Sword", item_id)]
    );
}

#[rstest]
fn unknown_user_reads_as_empty(world: Option<StoreWorld>) {
    let Some(world) = world else { return };

    assert!(world.read(&UserId::new("0123456789-0123456789-0123456789-0123")).is_empty());
}

#[rstest]
fn reads_only_return_the_requested_users_items(world: Option<StoreWorld>) {
    let Some(world) = world else { return };
    let sword = fresh_id();
    let bow = fresh_id();
    world.seed_item(&sword, "Iron Sword");
    world.seed_item(&bow, "Bow");
    let foo = world.create_user("foo");
    let bar = world.create_user("bar");

    for (user_id, item_id) in [(&foo, &sword), (&bar, &bow)] {
        world
            .block_on(
                world
                    .store
                    .add_item_to_user(&ownership(user_id, item_id), &tag(StoreOperation::AddItemToUser)),
            )
            .expect("insert ownership");
    }

    assert_eq!(world.read(&foo), vec![UserItemRow::new("foo", "Iron Sword", sword)]);
    assert_eq!(world.read(&bar), vec![UserItemRow::new("bar", "Bow", bow)]);
}

#[rstest]
fn duplicate_user_is_a_unique_violation(world: Option<StoreWorld>) {
    let Some(world) = world else { return };
    let user_id = UserId::random();
    let user = new_user(&user_id, "foo");

    world
        .block_on(world.store.create_user(&user, &tag(StoreOperation::CreateUser)))
        .expect("first insert");
    let err = world
        .block_on(world.store.create_user(&user, &tag(StoreOperation::CreateUser)))
        .expect_err("second insert fails");

    assert_eq!(err, StoreError::unique_violation("users_pkey"));
}

#[rstest]
fn duplicate_ownership_is_a_unique_violation(world: Option<StoreWorld>) {
    let Some(world) = world else { return };
    let item_id = fresh_id();
    world.seed_item(&item_id, "Shield");
    let user_id = world.create_user("foo");
    let row = ownership(&user_id, &item_id);

    world
        .block_on(world.store.add_item_to_user(&row, &tag(StoreOperation::AddItemToUser)))
        .expect("first insert");
    let err = world
        .block_on(world.store.add_item_to_user(&row, &tag(StoreOperation::AddItemToUser)))
        .expect_err("second insert fails");

    assert_eq!(err, StoreError::unique_violation("user_items_pkey"));
}

#[rstest]
fn unknown_item_is_a_foreign_key_violation(world: Option<StoreWorld>) {
    let Some(world) = world else { return };
    let user_id = world.create_user("foo");

    let err = world
        .block_on(
            world
                .store
                .add_item_to_user(&ownership(&user_id, &fresh_id()), &tag(StoreOperation::AddItemToUser)),
        )
        .expect_err("dangling item");

    assert_eq!(err, StoreError::foreign_key_violation("user_items_item_id_fkey"));
    assert!(world.read(&user_id).is_empty());
}

#[rstest]
fn unknown_user_is_a_foreign_key_violation(world: Option<StoreWorld>) {
    let Some(world) = world else { return };
    let item_id = fresh_id();
    world.seed_item(&item_id, "Bow");

    let err = world
        .block_on(
            world
                .store
                .add_item_to_user(&ownership(&UserId::random(), &item_id), &tag(StoreOperation::AddItemToUser)),
        )
        .expect_err("dangling user");

    assert_eq!(err, StoreError::foreign_key_violation("user_items_user_id_fkey"));
}

#[rstest]
#[tokio::test]
async fn unreachable_database_is_a_connection_error() {
    let pool = DbPool::new(
        &PoolConfig::new("postgres://nobody@127.0.0.1:1/none")
            .with_min_idle(None)
            .with_connection_timeout(Duration::from_millis(200)),
    )
    .await
    .expect("lazy pool builds without connecting");
    let store = DieselUserItemStore::new(pool);

    let err = store
        .user_items(&UserId::random(), &tag(StoreOperation::UserItems))
        .await
        .expect_err("no server listening");

    assert!(matches!(err, StoreError::Connection { .. }));
}
