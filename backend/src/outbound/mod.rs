//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL store via Diesel and `diesel-async`.
//! - **cache**: Redis, in-memory, and no-op items caches.
//! - **events**: Redis pub/sub and no-op read-event publishers.
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

pub mod cache;
pub mod events;
pub mod persistence;
mod pool;
pub mod redis;

pub use pool::{PoolConfig, PoolError};
