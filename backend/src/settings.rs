//! Service configuration loaded via OrthoConfig.
//!
//! Values come from `STOCKROOM_*` environment variables, the command line,
//! and an optional configuration file, in the precedence OrthoConfig applies.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::{
    DEFAULT_CACHE_TIMEOUT, DEFAULT_ENVIRONMENT, DEFAULT_REQUEST_TIMEOUT, PublishMode,
};
use crate::outbound::cache::DEFAULT_CACHE_TTL;
use crate::outbound::events::DEFAULT_TOPIC;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
/// Revision stamped on read events when none is configured.
pub const DEFAULT_REVISION: &str = "unknown";

/// Runtime settings for the HTTP service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "STOCKROOM")]
pub struct ServiceSettings {
    /// PostgreSQL connection string. Required to serve traffic.
    pub database_url: Option<String>,
    /// Redis connection string. When absent, caching and read events are disabled.
    pub redis_url: Option<String>,
    /// Listen address.
    pub bind_addr: Option<String>,
    /// Deployment environment recorded in transaction tags.
    pub environment: Option<String>,
    /// Build revision stamped on read events.
    pub revision: Option<String>,
    /// Pub/sub channel for read events.
    pub topic: Option<String>,
    /// Publish read events without waiting for the broker.
    #[ortho_config(default = false)]
    pub async_publish: bool,
    /// Lifetime of cached item listings, in milliseconds.
    pub cache_ttl_ms: Option<u64>,
    /// Bound on store and cache calls per request, in milliseconds.
    pub request_timeout_ms: Option<u64>,
    /// Bound on each cache call and on Redis checkout, in milliseconds.
    pub cache_timeout_ms: Option<u64>,
}

impl ServiceSettings {
    /// Configured PostgreSQL URL, if any.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref()
    }

    /// Configured Redis URL, if any.
    pub fn redis_url(&self) -> Option<&str> {
        self.redis_url.as_deref()
    }

    /// Listen address, `0.0.0.0:8080` by default.
    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// Environment recorded in transaction tags, `dev` by default.
    pub fn environment(&self) -> &str {
        self.environment.as_deref().unwrap_or(DEFAULT_ENVIRONMENT)
    }

    /// Revision stamped on read events, `unknown` by default.
    pub fn revision(&self) -> &str {
        self.revision.as_deref().unwrap_or(DEFAULT_REVISION)
    }

    /// Read-event channel, `user-items-reads` by default.
    pub fn topic(&self) -> &str {
        self.topic.as_deref().unwrap_or(DEFAULT_TOPIC)
    }

    /// Delivery mode for read events.
    pub fn publish_mode(&self) -> PublishMode {
        PublishMode::from_async_flag(self.async_publish)
    }

    /// Lifetime of cached listings, 2 seconds by default.
    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_CACHE_TTL)
    }

    /// Per-request deadline, 30 seconds by default.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT)
    }

    /// Bound on a single cache call, 1 second by default.
    pub fn cache_timeout(&self) -> Duration {
        self.cache_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_CACHE_TIMEOUT)
    }
}
