//! API Middleware
//!
//! Request guards applied in front of protected routes.

pub mod auth;

pub use auth::{require_auth, AuthState};
