//! User and item ownership handlers.
//!
//! ```text
//! GET  /api/user_id/{user_id}
//! POST /api/user/{user_name}
//! PUT  /api/user_id/{user_id}/{item_id}
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use serde_json::json;

use crate::domain::ports::{AddItemRequest, CreateUserRequest};
use crate::domain::{Error, ItemId, User, UserId, UserItemRow};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// List the items a user owns.
///
/// Served from the short-lived cache when possible; an unknown user yields
/// an empty list.
#[utoipa::path(
    get,
    path = "/api/user_id/{user_id}",
    params(("user_id" = String, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Owned items", body = [UserItemRow]),
        (status = 503, description = "Store unavailable", body = Error),
        (status = 504, description = "Request deadline exceeded", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["user_items"],
    operation_id = "userItems"
)]
#[get("/user_id/{user_id}")]
pub async fn user_items(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<UserItemRow>>> {
    let user_id = UserId::new(path.into_inner());
    let rows = state.query.user_items(&user_id).await?;
    Ok(web::Json(rows))
}

/// Create a user with a fresh identifier.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use stockroom::inbound::http::user_items::create_user;
///
/// let app = App::new().service(web::scope("/api").service(create_user));
/// ```
#[utoipa::path(
    post,
    path = "/api/user/{user_name}",
    params(("user_name" = String, Path, description = "Name of the new user")),
    responses(
        (status = 200, description = "User created", body = User),
        (status = 400, description = "Invalid request", body = Error),
        (status = 503, description = "Store unavailable", body = Error),
        (status = 504, description = "Request deadline exceeded", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["user_items"],
    operation_id = "createUser"
)]
#[post("/user/{user_name}")]
pub async fn create_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<User>> {
    let user = state
        .command
        .create_user(CreateUserRequest::new(path.into_inner()))
        .await?;
    Ok(web::Json(user))
}

/// Record that a user owns an item.
///
/// Both the user and the item must already exist. Cached listings are not
/// refreshed; the item appears once the cached entry expires.
#[utoipa::path(
    put,
    path = "/api/user_id/{user_id}/{item_id}",
    params(
        ("user_id" = String, Path, description = "Owning user"),
        ("item_id" = String, Path, description = "Owned item")
    ),
    responses(
        (status = 200, description = "Ownership recorded"),
        (status = 400, description = "Invalid request", body = Error),
        (status = 503, description = "Store unavailable", body = Error),
        (status = 504, description = "Request deadline exceeded", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["user_items"],
    operation_id = "addItemToUser"
)]
#[put("/user_id/{user_id}/{item_id}")]
pub async fn add_item_to_user(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (user_id, item_id) = path.into_inner();
    state
        .command
        .add_item_to_user(AddItemRequest::new(
            UserId::new(user_id),
            ItemId::new(item_id),
        ))
        .await?;
    Ok(HttpResponse::Ok().json(json!({})))
}
