//! Stockroom entry-point: loads settings, connects the stores, and serves
//! the REST API.

mod server;

use std::net::SocketAddr;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use stockroom::inbound::http::health::HealthState;
use stockroom::outbound::PoolConfig;
use stockroom::outbound::persistence::DbPool;
use stockroom::outbound::redis::RedisPool;
use stockroom::settings::ServiceSettings;

use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServiceSettings::load()
        .map_err(|err| std::io::Error::other(format!("failed to load settings: {err}")))?;

    let bind_addr: SocketAddr = settings.bind_addr().parse().map_err(|err| {
        std::io::Error::other(format!(
            "invalid bind address {}: {err}",
            settings.bind_addr()
        ))
    })?;

    let database_url = settings
        .database_url()
        .ok_or_else(|| std::io::Error::other("STOCKROOM_DATABASE_URL must be set"))?;
    let db_pool = DbPool::new(&PoolConfig::new(database_url))
        .await
        .map_err(|err| std::io::Error::other(format!("database pool: {err}")))?;

    let mut config = ServerConfig::new(bind_addr, db_pool).with_settings(&settings);
    if let Some(redis_url) = settings.redis_url() {
        let redis_config =
            PoolConfig::new(redis_url).with_connection_timeout(settings.cache_timeout());
        let redis_pool = RedisPool::new(&redis_config)
            .await
            .map_err(|err| std::io::Error::other(format!("redis pool: {err}")))?;
        config = config.with_redis_pool(redis_pool);
    }

    #[cfg(feature = "metrics")]
    let config = config.with_metrics(server::prometheus_metrics());

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, environment = settings.environment(), "stockroom listening");
    server.await
}
