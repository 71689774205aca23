//! Embedded PostgreSQL for the store integration suite.
//!
//! One cluster from `pg-embed-setup-unpriv` is shared by the test binary and
//! every test gets its own migrated temporary database on it.
//!
//! - `STOCKROOM_TEST_DATABASE_URL` points the suite at an existing server
//!   instead of the embedded cluster.
//! - `SKIP_TEST_CLUSTER=1` skips the suite where no cluster can start;
//!   without it a setup failure fails the test.
//!
//! Bootstrap uses blocking clients, so call these helpers outside any Tokio
//! runtime.

use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};

/// Embedded migrations from the backend/migrations directory.
const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

const DATABASE_URL_VAR: &str = "STOCKROOM_TEST_DATABASE_URL";
const SHARED_CLUSTER_RETRIES: usize = 5;
const SHARED_CLUSTER_RETRY_DELAY: Duration = Duration::from_millis(500);

static EXTERNAL_MIGRATED: OnceLock<Mutex<bool>> = OnceLock::new();

/// Database a single test may migrate and write to.
///
/// Embedded databases are dropped with this value.
pub struct TestDatabase {
    url: String,
    _database: Option<TemporaryDatabase>,
}

impl TestDatabase {
    /// Connection URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Returns true when `SKIP_TEST_CLUSTER` is "1", "true" or "yes".
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip when `SKIP_TEST_CLUSTER` is set; otherwise fail loudly.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

fn external_database_url() -> Option<String> {
    std::env::var(DATABASE_URL_VAR)
        .ok()
        .filter(|url| !url.trim().is_empty())
}

fn shared_cluster() -> Result<&'static ClusterHandle, String> {
    let mut attempt = 1;
    loop {
        match pg_embedded_setup_unpriv::test_support::shared_cluster_handle() {
            Ok(handle) => return Ok(handle),
            Err(err) if attempt < SHARED_CLUSTER_RETRIES => {
                eprintln!("pg-embed: attempt {attempt}/{SHARED_CLUSTER_RETRIES} failed: {err:?}");
                std::thread::sleep(SHARED_CLUSTER_RETRY_DELAY);
                attempt += 1;
            }
            Err(err) => return Err(format!("start embedded cluster: {err:?}")),
        }
    }
}

/// Runs all pending Diesel migrations against `url`.
pub fn migrate_schema(url: &str) -> Result<(), String> {
    let mut conn = PgConnection::establish(url).map_err(|err| format!("connect: {err}"))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map(|_| ())
        .map_err(|err| format!("migration: {err}"))
}

/// Provision a migrated database for one test.
pub fn test_database() -> Result<TestDatabase, String> {
    if let Some(url) = external_database_url() {
        let mut migrated = EXTERNAL_MIGRATED
            .get_or_init(|| Mutex::new(false))
            .lock()
            .unwrap_or_else(|err| err.into_inner());
        if !*migrated {
            migrate_schema(&url)?;
            *migrated = true;
        }
        return Ok(TestDatabase {
            url,
            _database: None,
        });
    }

    let database = shared_cluster()?
        .temporary_database(format!("test_{}", uuid::Uuid::new_v4()))
        .map_err(|err| format!("create database: {err:?}"))?;
    let url = database.url().to_string();
    migrate_schema(&url)?;
    Ok(TestDatabase {
        url,
        _database: Some(database),
    })
}
