pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod normalize;
pub mod services;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use market_auth::{TokenConfig, TokenError, TokenService};
use market_db::{SeaOrmDealRepository, SeaOrmItemRepository, SeaOrmUserRepository};
use sea_orm::DatabaseConnection;
use std::{net::SocketAddr, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use services::{DealService, ItemService, UserService};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub users: UserService,
    pub items: ItemService,
    pub deals: DealService,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    /// Wire the SeaORM repositories into the services
    pub fn new(db: DatabaseConnection, tokens: Arc<TokenService>) -> Self {
        let items = Arc::new(SeaOrmItemRepository::new(db.clone()));

        Self {
            users: UserService::new(Arc::new(SeaOrmUserRepository::new(db.clone()))),
            items: ItemService::new(items.clone()),
            deals: DealService::new(Arc::new(SeaOrmDealRepository::new(db)), items),
            tokens,
        }
    }
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Market API",
        version = "0.1.0",
        description = "REST API for users, items and deals with token authentication"
    ),
    paths(
        handlers::health_check,
        handlers::register,
        handlers::login,
        handlers::refresh,
        handlers::list_users,
        handlers::get_user,
        handlers::update_user,
        handlers::delete_user,
        handlers::list_items,
        handlers::create_item,
        handlers::get_item,
        handlers::update_item,
        handlers::delete_item,
        handlers::list_deals,
        handlers::create_deal,
        handlers::get_deal,
        handlers::update_deal,
        handlers::delete_deal,
    ),
    components(
        schemas(
            models::ErrorResponse,
            models::HealthResponse,
            models::RegisterRequest,
            models::LoginRequest,
            models::LoginResponse,
            models::RefreshRequest,
            models::RefreshResponse,
            models::UserResponse,
            models::UpdateUserRequest,
            models::NewItemRequest,
            models::UpdateItemRequest,
            models::ItemResponse,
            models::NewDealRequest,
            models::UpdateDealRequest,
            models::DealResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration, login and token refresh"),
        (name = "users", description = "User account endpoints"),
        (name = "items", description = "Item endpoints"),
        (name = "deals", description = "Deal endpoints"),
        (name = "system", description = "System health and info endpoints")
    )
)]
struct ApiDoc;

/// API server configuration
pub struct ApiServerConfig {
    /// Address to bind the API server
    pub bind_addr: SocketAddr,
    /// Enable CORS for localhost origins (for development)
    pub enable_cors: bool,
    /// Token signing secret and lifetimes
    pub token_config: TokenConfig,
}

/// API Server
pub struct ApiServer {
    config: ApiServerConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    /// Create a new API server
    ///
    /// Fails if the token secret is empty.
    pub fn new(config: ApiServerConfig, db: DatabaseConnection) -> Result<Self, TokenError> {
        let tokens = Arc::new(TokenService::new(config.token_config.clone())?);
        let state = Arc::new(AppState::new(db, tokens));

        Ok(Self { config, state })
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let api_doc = ApiDoc::openapi();

        let auth_state = Arc::new(middleware::AuthState::new(self.state.tokens.clone()));

        // Build PUBLIC routes (no authentication required)
        let public_router = Router::new()
            .route("/api/health", get(handlers::health_check))
            .route("/api/register", post(handlers::register))
            .route("/api/login", post(handlers::login))
            .route("/api/refresh", post(handlers::refresh))
            .with_state(self.state.clone());

        // Build PROTECTED routes (require an access token)
        let protected_router = Router::new()
            .route("/api/users", get(handlers::list_users))
            .route(
                "/api/users/{id}",
                get(handlers::get_user)
                    .put(handlers::update_user)
                    .delete(handlers::delete_user),
            )
            .route(
                "/api/items",
                get(handlers::list_items).post(handlers::create_item),
            )
            .route(
                "/api/items/{id}",
                get(handlers::get_item)
                    .put(handlers::update_item)
                    .delete(handlers::delete_item),
            )
            .route(
                "/api/deals",
                get(handlers::list_deals).post(handlers::create_deal),
            )
            .route(
                "/api/deals/{id}",
                get(handlers::get_deal)
                    .put(handlers::update_deal)
                    .delete(handlers::delete_deal),
            )
            .with_state(self.state.clone())
            .layer(axum_middleware::from_fn_with_state(
                auth_state,
                middleware::require_auth,
            ));

        let api_router = public_router.merge(protected_router);

        // SwaggerUi serves the document at /api/openapi.json
        let router = Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", api_doc))
            .merge(api_router);

        let mut router = router.layer(TraceLayer::new_for_http());

        if self.config.enable_cors {
            use tower_http::cors::AllowOrigin;

            let cors = CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
                .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _| {
                    let origin_str = origin.to_str().unwrap_or("");
                    origin_str.starts_with("http://localhost:")
                        || origin_str.starts_with("http://127.0.0.1:")
                        || origin_str.starts_with("https://localhost:")
                        || origin_str.starts_with("https://127.0.0.1:")
                }));

            router = router.layer(cors);
        }

        router
    }

    /// Start the API server
    pub async fn start(self) -> Result<(), anyhow::Error> {
        let router = self.build_router();

        info!("Starting API server on {}", self.config.bind_addr);
        info!(
            "OpenAPI spec: http://{}/api/openapi.json",
            self.config.bind_addr
        );
        info!("Swagger UI: http://{}/swagger-ui", self.config.bind_addr);

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;

        axum::serve(listener, router)
            .await
            .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

        Ok(())
    }
}
