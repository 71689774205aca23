//! Server assembly: readiness signalling and the optional metrics endpoint.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{test, web};
use chrono::Utc;
use rstest::{fixture, rstest};

use stockroom::domain::{
    DEFAULT_CACHE_TIMEOUT, PublishMode, ReadEventNotifier, UserItemsService,
};
use stockroom::inbound::http::health::HealthState;
use stockroom::inbound::http::state::HttpState;
use stockroom::outbound::PoolConfig;
use stockroom::outbound::cache::NoOpItemsCache;
use stockroom::outbound::events::NoOpEventPublisher;
use stockroom::outbound::persistence::DbPool;
use stockroom::settings::DEFAULT_REVISION;
use stockroom::test_support::{InMemoryUserItemStore, MutableClock};

use super::{ServerConfig, build_app, create_server};

#[fixture]
fn health_state() -> web::Data<HealthState> {
    web::Data::new(HealthState::new())
}

#[fixture]
fn http_state() -> web::Data<HttpState> {
    let notifier = ReadEventNotifier::new(
        Arc::new(NoOpEventPublisher),
        PublishMode::Synchronous,
        "rev-test",
    );
    let service = Arc::new(UserItemsService::new(
        Arc::new(InMemoryUserItemStore::default()),
        Arc::new(NoOpItemsCache),
        notifier,
        Arc::new(MutableClock::new(Utc::now())),
    ));
    web::Data::new(HttpState::new(service.clone(), service))
}

/// Pool that never connects; `min_idle(None)` keeps construction lazy.
async fn idle_pool() -> DbPool {
    DbPool::new(&PoolConfig::new("postgres://nobody@127.0.0.1:1/none").with_min_idle(None))
        .await
        .expect("lazy pool builds without connecting")
}

#[rstest]
#[actix_rt::test]
async fn create_server_marks_ready(health_state: web::Data<HealthState>) {
    assert!(!health_state.is_ready(), "state should start unready");
    let config = ServerConfig::new("127.0.0.1:0".parse().expect("socket addr"), idle_pool().await);

    let _server = create_server(health_state.clone(), config).expect("server should build");

    assert!(health_state.is_ready(), "server creation should mark readiness");
}

#[rstest]
#[actix_rt::test]
async fn unconfigured_server_uses_service_defaults() {
    let config = ServerConfig::new("127.0.0.1:0".parse().expect("socket addr"), idle_pool().await);

    assert_eq!(config.revision, DEFAULT_REVISION);
    assert_eq!(config.cache_timeout, DEFAULT_CACHE_TIMEOUT);
}

#[rstest]
#[actix_rt::test]
async fn openapi_document_is_served(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) {
    let app = test::init_service(build_app(health_state, http_state)).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/api-docs/openapi.json").to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::OK);
    let doc: serde_json::Value = test::read_body_json(res).await;
    assert!(doc["paths"]["/api/user_id/{user_id}"].is_object());
}

#[cfg(feature = "metrics")]
mod metrics {
    use super::*;
    use crate::server::metrics::{METRICS_PATH, MetricsLayer};
    use crate::server::prometheus_metrics;

    #[rstest]
    #[actix_rt::test]
    async fn metrics_endpoint_reports_served_requests(
        health_state: web::Data<HealthState>,
        http_state: web::Data<HttpState>,
    ) {
        let layer = MetricsLayer::from_option(prometheus_metrics());
        let app = test::init_service(build_app(health_state, http_state).wrap(layer)).await;

        let ping = test::call_service(&app, test::TestRequest::get().uri("/ping").to_request()).await;
        assert_eq!(ping.status(), StatusCode::OK);
        // Requests are counted once their body has been streamed.
        let _ = test::read_body(ping).await;

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri(METRICS_PATH).to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::OK);
        let body = test::read_body(res).await;
        let exposition = std::str::from_utf8(&body).expect("utf8 exposition");
        assert!(exposition.contains("stockroom_http_requests_total"));
    }

    #[rstest]
    #[actix_rt::test]
    async fn disabled_metrics_leave_the_endpoint_unrouted(
        health_state: web::Data<HealthState>,
        http_state: web::Data<HttpState>,
    ) {
        let app = test::init_service(
            build_app(health_state, http_state).wrap(MetricsLayer::from_option(None)),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri(METRICS_PATH).to_request(),
        )
        .await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
