//! Signed access and refresh tokens (JWT, HMAC-SHA256)

use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default lifetime of an access token
pub const DEFAULT_ACCESS_TTL_MINUTES: i64 = 15;
/// Default lifetime of a refresh token
pub const DEFAULT_REFRESH_TTL_DAYS: i64 = 7;

/// What a token may be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived, accepted by protected routes
    Access,
    /// Long-lived, only accepted by the refresh endpoint
    Refresh,
}

/// JWT claims carried by every market token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject user ID
    pub user_id: i32,
    pub username: String,
    /// Explicit token kind; never inferred from the TTL
    pub kind: TokenKind,
    /// Issued at (timestamp)
    pub iat: i64,
    /// Expiration time (timestamp)
    pub exp: i64,
}

impl Claims {
    /// Claims valid for `validity` from now
    ///
    /// `exp` is whole seconds, rounded up, so a token never expires before
    /// its full validity and may outlive it by under a second.
    pub fn new(user_id: i32, username: String, kind: TokenKind, validity: Duration) -> Self {
        let now = Utc::now();
        let expires_at = now + validity;
        let exp = if expires_at.timestamp_subsec_nanos() > 0 {
            expires_at.timestamp() + 1
        } else {
            expires_at.timestamp()
        };

        Self {
            user_id,
            username,
            kind,
            iat: now.timestamp(),
            exp,
        }
    }

    /// A token is valid while `now < exp`
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Token errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token signing secret is not configured")]
    MissingSecret,

    #[error("Token encoding error: {0}")]
    Encoding(String),

    #[error("Token expired")]
    Expired,

    #[error("Invalid token")]
    Invalid,

    #[error("Token is not an access token")]
    NotAnAccessToken,

    #[error("Token is not a refresh token")]
    NotARefreshToken,
}

/// Token settings, loaded once at startup
#[derive(Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_ttl: Duration::minutes(DEFAULT_ACCESS_TTL_MINUTES),
            refresh_ttl: Duration::days(DEFAULT_REFRESH_TTL_DAYS),
        }
    }

    pub fn with_access_ttl(mut self, ttl: Duration) -> Self {
        self.access_ttl = ttl;
        self
    }

    pub fn with_refresh_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_ttl = ttl;
        self
    }
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

/// Access and refresh token minted together at login
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenPair {
    pub token: String,
    pub refresh_token: String,
}

/// Issues and validates tokens with one immutable signing key
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    /// Create a token service from startup configuration
    ///
    /// Validates ONLY:
    /// - Signature (HS256, no other algorithm accepted)
    /// - Expiration, with zero leeway
    ///
    /// An empty secret is rejected; there is no per-call fallback.
    pub fn new(config: TokenConfig) -> Result<Self, TokenError> {
        if config.secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            access_ttl: config.access_ttl,
            refresh_ttl: config.refresh_ttl,
        })
    }

    fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    /// Sign a new token of the given kind
    pub fn issue(&self, user_id: i32, username: &str, kind: TokenKind) -> Result<String, TokenError> {
        let claims = Claims::new(user_id, username.to_string(), kind, self.ttl(kind));
        self.encode(&claims)
    }

    /// Mint an access token and a refresh token for the same identity
    pub fn issue_pair(&self, user_id: i32, username: &str) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            token: self.issue(user_id, username, TokenKind::Access)?,
            refresh_token: self.issue(user_id, username, TokenKind::Refresh)?,
        })
    }

    pub fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Verify signature, structure and expiry of any token kind
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    _ => TokenError::Invalid,
                }
            })?;

        if token_data.claims.is_expired() {
            return Err(TokenError::Expired);
        }

        Ok(token_data.claims)
    }

    /// Validate a token and require it to be an access token
    pub fn validate_access(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = self.validate(token)?;
        if claims.kind != TokenKind::Access {
            return Err(TokenError::NotAnAccessToken);
        }
        Ok(claims)
    }

    /// Exchange a refresh token for a new access token
    ///
    /// The refresh token itself is left untouched and stays usable until it
    /// expires.
    pub fn refresh(&self, refresh_token: &str) -> Result<String, TokenError> {
        let claims = self.validate(refresh_token)?;
        if claims.kind != TokenKind::Refresh {
            return Err(TokenError::NotARefreshToken);
        }

        self.issue(claims.user_id, &claims.username, TokenKind::Access)
    }
}
