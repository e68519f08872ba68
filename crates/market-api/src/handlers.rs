use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use market_auth::Identity;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::error::{ApiResult, ServiceError};
use crate::models::*;
use crate::AppState;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================
// Authentication
// ============================================================

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered", body = UserResponse),
        (status = 400, description = "Invalid username or password", body = ErrorResponse),
        (status = 409, description = "Username already taken", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    debug!("Registering user: {}", req.username);

    let user = state.users.register(req).await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Log in and receive an access token and a refresh token
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user = state.users.authenticate(&req.username, &req.password).await?;

    let pair = state
        .tokens
        .issue_pair(user.id, &user.username)
        .map_err(|e| {
            error!("Failed to issue tokens for user {}: {}", user.id, e);
            ServiceError::Internal
        })?;

    info!("User {} logged in", user.id);

    Ok(Json(LoginResponse {
        token: pair.token,
        refresh_token: pair.refresh_token,
    }))
}

/// Exchange a refresh token for a new access token
#[utoipa::path(
    post,
    path = "/api/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token", body = RefreshResponse),
        (status = 401, description = "Invalid, expired or wrong-kind token", body = ErrorResponse)
    ),
    tag = "auth"
)]
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let token = state.tokens.refresh(&req.refresh_token).map_err(|e| {
        debug!("Refresh rejected: {}", e);
        ServiceError::Unauthenticated
    })?;

    Ok(Json(RefreshResponse { token }))
}

// ============================================================
// Users
// ============================================================

/// List users
#[utoipa::path(
    get,
    path = "/api/users",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of users", body = Vec<UserResponse>),
        (status = 401, description = "Unauthenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = state.users.list(query.page_info()).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User", body = UserResponse),
        (status = 400, description = "Invalid ID", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<UserResponse>> {
    let user = state.users.get(id).await?;
    Ok(Json(user.into()))
}

/// Update the caller's own account
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Not your account", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Username already taken", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Identity>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user = state.users.update(id, req, &caller).await?;
    Ok(Json(user.into()))
}

/// Delete the caller's own account
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "Not your account", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Identity>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    state.users.delete(id, &caller).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================
// Items
// ============================================================

/// List items
#[utoipa::path(
    get,
    path = "/api/items",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of items", body = Vec<ItemResponse>),
        (status = 401, description = "Unauthenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "items"
)]
pub async fn list_items(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Vec<ItemResponse>>> {
    let items = state.items.list(query.page_info()).await?;
    Ok(Json(items.into_iter().map(ItemResponse::from).collect()))
}

/// Create an item owned by the caller
#[utoipa::path(
    post,
    path = "/api/items",
    request_body = NewItemRequest,
    responses(
        (status = 201, description = "Item created", body = ItemResponse),
        (status = 400, description = "Invalid name or price", body = ErrorResponse),
        (status = 401, description = "Unauthenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "items"
)]
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Identity>,
    Json(req): Json<NewItemRequest>,
) -> ApiResult<(StatusCode, Json<ItemResponse>)> {
    let item = state.items.create(req, &caller).await?;
    Ok((StatusCode::CREATED, Json(item.into())))
}

/// Get an item by ID
#[utoipa::path(
    get,
    path = "/api/items/{id}",
    params(("id" = i32, Path, description = "Item ID")),
    responses(
        (status = 200, description = "Item", body = ItemResponse),
        (status = 400, description = "Invalid ID", body = ErrorResponse),
        (status = 404, description = "Item not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "items"
)]
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<ItemResponse>> {
    let item = state.items.get(id).await?;
    Ok(Json(item.into()))
}

/// Update an item the caller owns
#[utoipa::path(
    put,
    path = "/api/items/{id}",
    params(("id" = i32, Path, description = "Item ID")),
    request_body = UpdateItemRequest,
    responses(
        (status = 200, description = "Updated item", body = ItemResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Item not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "items"
)]
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Identity>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateItemRequest>,
) -> ApiResult<Json<ItemResponse>> {
    let item = state.items.update(id, req, &caller).await?;
    Ok(Json(item.into()))
}

/// Delete an item the caller owns
#[utoipa::path(
    delete,
    path = "/api/items/{id}",
    params(("id" = i32, Path, description = "Item ID")),
    responses(
        (status = 204, description = "Item deleted"),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Item not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "items"
)]
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Identity>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    state.items.delete(id, &caller).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================
// Deals
// ============================================================

/// List deals
#[utoipa::path(
    get,
    path = "/api/deals",
    params(PageQuery),
    responses(
        (status = 200, description = "Page of deals", body = Vec<DealResponse>),
        (status = 401, description = "Unauthenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "deals"
)]
pub async fn list_deals(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Vec<DealResponse>>> {
    let deals = state.deals.list(query.page_info()).await?;
    Ok(Json(deals.into_iter().map(DealResponse::from).collect()))
}

/// Create a deal made by the caller
#[utoipa::path(
    post,
    path = "/api/deals",
    request_body = NewDealRequest,
    responses(
        (status = 201, description = "Deal created", body = DealResponse),
        (status = 400, description = "Invalid price", body = ErrorResponse),
        (status = 404, description = "Item not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "deals"
)]
pub async fn create_deal(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Identity>,
    Json(req): Json<NewDealRequest>,
) -> ApiResult<(StatusCode, Json<DealResponse>)> {
    let deal = state.deals.create(req, &caller).await?;
    Ok((StatusCode::CREATED, Json(deal.into())))
}

/// Get a deal by ID
#[utoipa::path(
    get,
    path = "/api/deals/{id}",
    params(("id" = i32, Path, description = "Deal ID")),
    responses(
        (status = 200, description = "Deal", body = DealResponse),
        (status = 400, description = "Invalid ID", body = ErrorResponse),
        (status = 404, description = "Deal not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "deals"
)]
pub async fn get_deal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
) -> ApiResult<Json<DealResponse>> {
    let deal = state.deals.get(id).await?;
    Ok(Json(deal.into()))
}

/// Update a deal the caller made
#[utoipa::path(
    put,
    path = "/api/deals/{id}",
    params(("id" = i32, Path, description = "Deal ID")),
    request_body = UpdateDealRequest,
    responses(
        (status = 200, description = "Updated deal", body = DealResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Not your deal", body = ErrorResponse),
        (status = 404, description = "Deal or item not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "deals"
)]
pub async fn update_deal(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Identity>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateDealRequest>,
) -> ApiResult<Json<DealResponse>> {
    let deal = state.deals.update(id, req, &caller).await?;
    Ok(Json(deal.into()))
}

/// Delete a deal the caller made
#[utoipa::path(
    delete,
    path = "/api/deals/{id}",
    params(("id" = i32, Path, description = "Deal ID")),
    responses(
        (status = 204, description = "Deal deleted"),
        (status = 403, description = "Not your deal", body = ErrorResponse),
        (status = 404, description = "Deal not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "deals"
)]
pub async fn delete_deal(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<Identity>,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    state.deals.delete(id, &caller).await?;
    Ok(StatusCode::NO_CONTENT)
}
