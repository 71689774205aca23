//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint from the inbound layer together
//! with the domain payloads they exchange. The document is served by the
//! binary at `/api-docs/openapi.json`.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode, User, UserItemRow};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Stockroom API",
        description = "Users, the items they own, and health probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::user_items::user_items,
        crate::inbound::http::user_items::create_user,
        crate::inbound::http::user_items::add_item_to_user,
        crate::inbound::http::health::ping,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(User, UserItemRow, Error, ErrorCode)),
    tags(
        (name = "user_items", description = "Users and item ownership"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
