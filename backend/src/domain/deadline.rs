//! Per-request deadline shared by every store and cache call.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

/// Raised when a bounded call outlives its request deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("request deadline elapsed")]
pub struct DeadlineElapsed;

/// Absolute point in time by which a request must finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestDeadline {
    at: Instant,
}

impl RequestDeadline {
    /// Deadline `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self {
            at: Instant::now() + timeout,
        }
    }

    /// The earlier of this deadline and `limit` from now.
    ///
    /// Gives a sub-call its own budget without letting it outlive the
    /// request.
    pub fn capped(&self, limit: Duration) -> Self {
        Self {
            at: self.at.min(Instant::now() + limit),
        }
    }

    /// Time left before the deadline; zero once it has passed.
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    /// Whether the deadline has already passed.
    pub fn is_elapsed(&self) -> bool {
        self.remaining().is_zero()
    }

    /// Run `fut`, abandoning it if the deadline passes first.
    ///
    /// Dropping the future on expiry cancels whatever it was doing; for a
    /// pooled transaction the connection is rolled back before reuse.
    ///
    /// # Errors
    /// Returns [`DeadlineElapsed`] if the deadline passes before `fut`
    /// completes.
    pub async fn bound<F>(&self, fut: F) -> Result<F::Output, DeadlineElapsed>
    where
        F: Future,
    {
        tokio::time::timeout_at(self.at, fut)
            .await
            .map_err(|_| DeadlineElapsed)
    }
}
