//! Test utilities for the stockroom crate.
//!
//! Shared doubles for unit tests (in `src/`) and integration tests (in
//! `tests/`). Compiled for `cfg(test)` and behind the `test-support` feature.

mod clock;
mod events;
mod store;

pub use clock::MutableClock;
pub use events::{FailingItemsCache, RecordingEventPublisher};
pub use store::InMemoryUserItemStore;

/// Lock a mutex, panicking on poison; test doubles never recover.
fn lock<T>(mutex: &std::sync::Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("test double mutex poisoned"),
    }
}
