//! Builders wiring outbound adapters into the HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;
use tokio::runtime::Handle;
use tracing::info;

use stockroom::domain::ports::{EventPublisher, ItemsCache};
use stockroom::domain::{PublishMode, ReadEventNotifier, UserItemsService};
use stockroom::inbound::http::state::HttpState;
use stockroom::outbound::cache::{NoOpItemsCache, RedisItemsCache};
use stockroom::outbound::events::{NoOpEventPublisher, RedisEventPublisher};
use stockroom::outbound::persistence::DieselUserItemStore;

use super::ServerConfig;

fn build_cache(config: &ServerConfig) -> Arc<dyn ItemsCache> {
    match &config.redis_pool {
        Some(pool) => Arc::new(RedisItemsCache::new(pool.clone(), config.cache_ttl)),
        None => {
            info!("no redis configured; item listings are not cached");
            Arc::new(NoOpItemsCache)
        }
    }
}

fn build_publisher(config: &ServerConfig) -> Arc<dyn EventPublisher> {
    match &config.redis_pool {
        Some(pool) => Arc::new(RedisEventPublisher::new(pool.clone(), config.topic.clone())),
        None => {
            info!("no redis configured; read events are dropped");
            Arc::new(NoOpEventPublisher)
        }
    }
}

/// Asynchronous publications run on the runtime that built the server, off
/// the request workers.
fn build_notifier(config: &ServerConfig) -> ReadEventNotifier {
    let notifier = ReadEventNotifier::new(
        build_publisher(config),
        config.publish_mode,
        config.revision.clone(),
    );
    match (config.publish_mode, Handle::try_current()) {
        (PublishMode::Asynchronous, Ok(handle)) => notifier.with_runtime(handle),
        _ => notifier,
    }
}

/// Assemble the user/items service over PostgreSQL and the optional Redis
/// adapters.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let store = Arc::new(DieselUserItemStore::new(config.db_pool.clone()));
    let service = Arc::new(
        UserItemsService::new(
            store,
            build_cache(config),
            build_notifier(config),
            Arc::new(DefaultClock),
        )
        .with_environment(config.environment.clone())
        .with_request_timeout(config.request_timeout)
        .with_cache_timeout(config.cache_timeout),
    );
    web::Data::new(HttpState::new(service.clone(), service))
}
