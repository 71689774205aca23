//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::time::Duration;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

use stockroom::domain::{
    DEFAULT_CACHE_TIMEOUT, DEFAULT_ENVIRONMENT, DEFAULT_REQUEST_TIMEOUT, PublishMode,
};
use stockroom::outbound::cache::DEFAULT_CACHE_TTL;
use stockroom::outbound::events::DEFAULT_TOPIC;
use stockroom::outbound::persistence::DbPool;
use stockroom::outbound::redis::RedisPool;
use stockroom::settings::{DEFAULT_REVISION, ServiceSettings};

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) redis_pool: Option<RedisPool>,
    pub(crate) environment: String,
    pub(crate) revision: String,
    pub(crate) topic: String,
    pub(crate) publish_mode: PublishMode,
    pub(crate) cache_ttl: Duration,
    pub(crate) request_timeout: Duration,
    pub(crate) cache_timeout: Duration,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Construct a configuration with default service tuning.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, db_pool: DbPool) -> Self {
        Self {
            bind_addr,
            db_pool,
            redis_pool: None,
            environment: DEFAULT_ENVIRONMENT.to_owned(),
            revision: DEFAULT_REVISION.to_owned(),
            topic: DEFAULT_TOPIC.to_owned(),
            publish_mode: PublishMode::default(),
            cache_ttl: DEFAULT_CACHE_TTL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            cache_timeout: DEFAULT_CACHE_TIMEOUT,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Attach a Redis pool backing the items cache and read events.
    ///
    /// Without one, reads always hit the store and events are dropped.
    #[must_use]
    pub fn with_redis_pool(mut self, pool: RedisPool) -> Self {
        self.redis_pool = Some(pool);
        self
    }

    /// Copy service tuning from loaded settings.
    #[must_use]
    pub fn with_settings(mut self, settings: &ServiceSettings) -> Self {
        self.environment = settings.environment().to_owned();
        self.revision = settings.revision().to_owned();
        self.topic = settings.topic().to_owned();
        self.publish_mode = settings.publish_mode();
        self.cache_ttl = settings.cache_ttl();
        self.request_timeout = settings.request_timeout();
        self.cache_timeout = settings.cache_timeout();
        self
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware serving `/metrics`.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
