//! Bearer token guard
//!
//! Extracts the access token from the `Authorization` header, validates it
//! and makes the caller's [`Identity`] available to handlers via Axum's
//! Extension.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use market_auth::{Identity, TokenService};
use std::sync::Arc;
use tracing::debug;

use crate::models::ErrorResponse;

/// Token validation state shared across middleware instances
#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<TokenService>,
}

impl AuthState {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }
}

fn unauthenticated() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: "Unauthenticated".to_string(),
            code: Some("UNAUTHENTICATED".to_string()),
        }),
    )
}

/// Authentication middleware for protected routes
///
/// # Requirements
/// - `Authorization: Bearer <token>` header
/// - Token signed with the server secret and not expired
/// - Token kind is `access` (refresh tokens are rejected)
///
/// Every failure produces the same 401 body; the reason is only logged.
pub async fn require_auth(
    State(state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            debug!("Rejected request: missing or malformed Authorization header");
            unauthenticated()
        })?;

    let claims = state.tokens.validate_access(token).map_err(|e| {
        debug!("Rejected request: {}", e);
        unauthenticated()
    })?;

    request.extensions_mut().insert(Identity::from(claims));

    Ok(next.run(request).await)
}
