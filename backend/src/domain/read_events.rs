//! Delivery of read notifications under a deployment-time mode.
//!
//! [`ReadEventNotifier`] wraps an [`EventPublisher`] and decides whether the
//! request waits for broker acknowledgement. In both modes a publish failure
//! is logged and never reaches the caller.

use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::{Instrument, debug, info_span, warn};

use crate::domain::ports::{EventPublisher, ReadEvent};
use crate::domain::{RequestDeadline, TraceId, UserId};

/// How read events are delivered relative to the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PublishMode {
    /// Await broker acknowledgement before responding.
    #[default]
    Synchronous,
    /// Publish on a detached task; the response never waits.
    Asynchronous,
}

impl PublishMode {
    /// Mode selected by the `async_publish` setting.
    pub const fn from_async_flag(async_publish: bool) -> Self {
        if async_publish {
            Self::Asynchronous
        } else {
            Self::Synchronous
        }
    }
}

/// Emits one [`ReadEvent`] per read.
#[derive(Clone)]
pub struct ReadEventNotifier {
    publisher: Arc<dyn EventPublisher>,
    mode: PublishMode,
    revision: String,
    runtime: Option<Handle>,
}

impl ReadEventNotifier {
    /// Build a notifier publishing events stamped with `revision`.
    pub fn new(
        publisher: Arc<dyn EventPublisher>,
        mode: PublishMode,
        revision: impl Into<String>,
    ) -> Self {
        Self {
            publisher,
            mode,
            revision: revision.into(),
            runtime: None,
        }
    }

    /// Spawn asynchronous publications on `handle` instead of the current
    /// runtime.
    pub fn with_runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    /// Delivery mode in effect.
    pub const fn mode(&self) -> PublishMode {
        self.mode
    }

    /// Publish a read event for `user_id`.
    ///
    /// Synchronous mode awaits the publisher, bounded by `deadline`.
    /// Asynchronous mode returns immediately after spawning the publication.
    pub async fn notify(&self, user_id: &UserId, deadline: &RequestDeadline) {
        let event = ReadEvent::new(user_id.clone(), self.revision.as_str());
        match self.mode {
            PublishMode::Synchronous => {
                let span = info_span!("publish", mode = "sync", user_id = %user_id);
                async {
                    match deadline.bound(self.publisher.publish(&event)).await {
                        Ok(Ok(())) => debug!("read event published"),
                        Ok(Err(err)) => warn!(error = %err, "read event publish failed"),
                        Err(elapsed) => warn!(error = %elapsed, "read event publish timed out"),
                    }
                }
                .instrument(span)
                .await;
            }
            PublishMode::Asynchronous => self.spawn_publish(event),
        }
    }

    fn spawn_publish(&self, event: ReadEvent) {
        let publisher = Arc::clone(&self.publisher);
        let span = info_span!("publish", mode = "async", user_id = %event.id);
        let task = async move {
            match publisher.publish(&event).await {
                Ok(()) => debug!("read event published"),
                Err(err) => warn!(error = %err, "read event publish failed"),
            }
        }
        .instrument(span);

        // Task-locals do not cross spawn boundaries; carry the trace id over.
        let handle = self.runtime.clone().unwrap_or_else(Handle::current);
        match TraceId::current() {
            Some(trace_id) => drop(handle.spawn(TraceId::scope(trace_id, task))),
            None => drop(handle.spawn(task)),
        }
    }
}
