//! Request-scoped caller identity

use serde::{Deserialize, Serialize};

use crate::token::Claims;

/// Authenticated caller, derived from a validated access token
///
/// Lives for one request only and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: i32,
    pub username: String,
}

impl Identity {
    pub fn new(user_id: i32, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
        }
    }

    /// Whether this caller is the owner recorded on a resource
    pub fn owns(&self, owner_id: i32) -> bool {
        self.user_id == owner_id
    }
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
        }
    }
}
