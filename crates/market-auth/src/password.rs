//! Salted password hashing and verification using Argon2id

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;

/// Largest `password + salt` input accepted by [`hash_password`], in bytes
pub const MAX_PASSWORD_INPUT_BYTES: usize = 72;

/// Error types for password operations
#[derive(Error, Debug)]
pub enum PasswordError {
    /// Password and salt together exceed [`MAX_PASSWORD_INPUT_BYTES`]
    #[error("Password is too long ({0} bytes with salt, max {MAX_PASSWORD_INPUT_BYTES})")]
    PasswordTooLong(usize),

    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashingFailed(String),
}

/// Generate a per-user salt
///
/// 16 bytes from the OS random source, encoded as unpadded base64. The
/// result is opaque and printable, suitable for a text column.
pub fn generate_salt() -> String {
    SaltString::generate(&mut OsRng).as_str().to_string()
}

/// Hash a password together with its per-user salt
///
/// The salt is appended to the password before hashing. Argon2id adds its
/// own random salt on every call, so hashing the same input twice gives two
/// different PHC strings that both verify.
///
/// # Returns
/// * `Ok(String)` - PHC-formatted hash string (suitable for storage)
/// * `Err(PasswordError::PasswordTooLong)` - If the combined input is too long
///
/// # Example
/// ```
/// use market_auth::password::{generate_salt, hash_password};
///
/// let salt = generate_salt();
/// let hash = hash_password("MySecurePassword123!", &salt).unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str, salt: &str) -> Result<String, PasswordError> {
    let combined = format!("{}{}", password, salt);
    if combined.len() > MAX_PASSWORD_INPUT_BYTES {
        return Err(PasswordError::PasswordTooLong(combined.len()));
    }

    let internal_salt = SaltString::generate(&mut OsRng);

    let password_hash = Argon2::default()
        .hash_password(combined.as_bytes(), &internal_salt)
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

    Ok(password_hash.to_string())
}

/// Verify a candidate against a stored hash
///
/// `candidate` must already include the salt (see [`Credential::verify`]).
/// A malformed stored hash verifies as `false`. The digest comparison is
/// constant-time.
pub fn verify_password(candidate: &str, stored_hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(stored_hash) {
        Ok(hash) => hash,
        Err(e) => {
            tracing::warn!("Stored password hash is malformed: {}", e);
            return false;
        }
    };

    Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Stored credential of one user
///
/// Salt and hash are only ever produced together by [`Credential::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub password_hash: String,
    pub salt: String,
}

impl Credential {
    /// Derive a fresh credential (new salt, new hash) for `password`
    pub fn new(password: &str) -> Result<Self, PasswordError> {
        let salt = generate_salt();
        let password_hash = hash_password(password, &salt)?;

        Ok(Self {
            password_hash,
            salt,
        })
    }

    /// Rebuild a credential from stored columns
    pub fn from_parts(password_hash: String, salt: String) -> Self {
        Self {
            password_hash,
            salt,
        }
    }

    pub fn verify(&self, password: &str) -> bool {
        verify_password(&format!("{}{}", password, self.salt), &self.password_hash)
    }
}
