//! PostgreSQL persistence adapters using Diesel.
//!
//! Adapters are thin: they translate between SQL rows and domain types and
//! map Diesel failures to [`crate::domain::ports::StoreError`]. Connections
//! come from a `bb8` pool through `diesel-async`.
//!
//! # Example
//!
//! ```no_run
//! use stockroom::outbound::PoolConfig;
//! use stockroom::outbound::persistence::{DbPool, DieselUserItemStore};
//!
//! # async fn wire() -> Result<(), stockroom::outbound::PoolError> {
//! let pool = DbPool::new(&PoolConfig::new("postgres://localhost/stockroom")).await?;
//! let store = DieselUserItemStore::new(pool);
//! # let _ = store;
//! # Ok(())
//! # }
//! ```

mod diesel_user_item_store;
mod pool;

pub use diesel_user_item_store::DieselUserItemStore;
pub use pool::DbPool;
