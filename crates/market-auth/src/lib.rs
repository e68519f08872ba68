//! Credential storage, token issuance and request identity for the market API

pub mod identity;
pub mod password;
pub mod token;

pub use identity::Identity;
pub use password::{
    generate_salt, hash_password, verify_password, Credential, PasswordError,
    MAX_PASSWORD_INPUT_BYTES,
};
pub use token::{Claims, TokenConfig, TokenError, TokenKind, TokenPair, TokenService};

// Re-export useful types
pub use chrono::Duration;
