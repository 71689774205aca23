//! Recording publisher and failing cache doubles.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Notify, watch};

use super::lock;
use crate::domain::TraceId;
use crate::domain::ports::{
    CacheError, CacheKey, EventPublisher, ItemsCache, PublishError, ReadEvent,
};

/// Publisher that records delivered events and the trace id seen by each.
///
/// Optionally fails every call, sleeps before acknowledging, or blocks
/// until [`RecordingEventPublisher::open_gate`] is called.
pub struct RecordingEventPublisher {
    events: Mutex<Vec<ReadEvent>>,
    trace_ids: Mutex<Vec<Option<TraceId>>>,
    attempts: AtomicUsize,
    failure: Option<PublishError>,
    delay: Option<Duration>,
    gate: Option<watch::Sender<bool>>,
    changed: Notify,
}

impl Default for RecordingEventPublisher {
    fn default() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            trace_ids: Mutex::new(Vec::new()),
            attempts: AtomicUsize::new(0),
            failure: None,
            delay: None,
            gate: None,
            changed: Notify::new(),
        }
    }
}

impl RecordingEventPublisher {
    /// Fail every publish with `error` after counting the attempt.
    pub fn failing(error: PublishError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    /// Sleep for `delay` before acknowledging.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Block every publish until the gate opens.
    pub fn gated(mut self) -> Self {
        let (tx, _rx) = watch::channel(false);
        self.gate = Some(tx);
        self
    }

    /// Release publishes blocked by [`Self::gated`].
    pub fn open_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.send_replace(true);
        }
    }

    /// Events acknowledged so far.
    pub fn events(&self) -> Vec<ReadEvent> {
        lock(&self.events).clone()
    }

    /// Trace id in scope for each acknowledged event.
    pub fn trace_ids(&self) -> Vec<Option<TraceId>> {
        lock(&self.trace_ids).clone()
    }

    /// Publish calls started, including failed ones.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Wait until `count` events were acknowledged; panics after 5 s.
    pub async fn wait_for_events(&self, count: usize) {
        let wait = async {
            loop {
                let notified = self.changed.notified();
                if lock(&self.events).len() >= count {
                    return;
                }
                notified.await;
            }
        };
        if tokio::time::timeout(Duration::from_secs(5), wait)
            .await
            .is_err()
        {
            panic!("timed out waiting for {count} read events");
        }
    }
}

#[async_trait]
impl EventPublisher for RecordingEventPublisher {
    async fn publish(&self, event: &ReadEvent) -> Result<(), PublishError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            let mut rx = gate.subscribe();
            if rx.wait_for(|open| *open).await.is_err() {
                return Err(PublishError::unavailable("gate dropped"));
            }
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = &self.failure {
            self.changed.notify_waiters();
            return Err(error.clone());
        }
        lock(&self.events).push(event.clone());
        lock(&self.trace_ids).push(TraceId::current());
        self.changed.notify_waiters();
        Ok(())
    }
}

/// Cache whose backend is always unreachable.
#[derive(Default)]
pub struct FailingItemsCache {
    gets: AtomicUsize,
    sets: AtomicUsize,
}

impl FailingItemsCache {
    /// `get` calls observed.
    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    /// `set` calls observed.
    pub fn sets(&self) -> usize {
        self.sets.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ItemsCache for FailingItemsCache {
    async fn get(&self, _key: &CacheKey) -> Result<Option<String>, CacheError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::backend("connection refused"))
    }

    async fn set(&self, _key: &CacheKey, _payload: &str) -> Result<(), CacheError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        Err(CacheError::backend("connection refused"))
    }
}
