use std::sync::{Arc, LazyLock};

use market_auth::{Credential, Identity, PasswordError};
use market_db::{entities::user, DbError, NewUser, PageInfo, UserRepository};
use tracing::{debug, error, info, warn};

use super::{validate_id, validate_page};
use crate::error::ServiceError;
use crate::models::{RegisterRequest, UpdateUserRequest};
use crate::normalize::normalize_name;

/// Verified against when the username is unknown, so both login failures
/// cost one Argon2 verification.
static DUMMY_CREDENTIAL: LazyLock<Credential> = LazyLock::new(|| {
    Credential::new("dummy_startup_value").unwrap_or_else(|_| {
        Credential::from_parts(
            "$argon2id$v=19$m=19456,t=2,p=1$dW5rbm93bnNhbHQ$yHbOQnCsaG6H1LaVugaXPqXBI1EX1DddZtqfXtrk4mI"
                .to_string(),
            "dW5rbm93bnNhbHQ".to_string(),
        )
    })
});

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

fn checked_username(raw: &str) -> Result<String, ServiceError> {
    let username = normalize_name(raw);
    if username.is_empty() {
        return Err(ServiceError::Validation(
            "Username cannot be empty".to_string(),
        ));
    }
    Ok(username)
}

fn new_credential(password: &str) -> Result<Credential, ServiceError> {
    if password.is_empty() {
        return Err(ServiceError::Validation(
            "Password cannot be empty".to_string(),
        ));
    }

    Credential::new(password).map_err(|e| match e {
        PasswordError::PasswordTooLong(_) => ServiceError::Validation(e.to_string()),
        PasswordError::HashingFailed(reason) => {
            error!("Failed to hash password: {}", reason);
            ServiceError::Internal
        }
    })
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    /// Register a new user with a fresh salted credential
    pub async fn register(&self, request: RegisterRequest) -> Result<user::Model, ServiceError> {
        let username = checked_username(&request.username)?;
        let credential = new_credential(&request.password)?;

        let created = self
            .repo
            .create(NewUser {
                username,
                email: request.email,
                password_hash: credential.password_hash,
                salt: credential.salt,
            })
            .await
            .map_err(|e| ServiceError::from_store("User", e))?;

        info!("Registered user {} ({})", created.id, created.username);
        Ok(created)
    }

    /// Check a username/password pair
    ///
    /// Unknown user and wrong password are indistinguishable to the caller.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<user::Model, ServiceError> {
        let username = normalize_name(username);

        let user = match self.repo.get_by_username(&username).await {
            Ok(user) => user,
            Err(DbError::NotFound) => {
                let _ = DUMMY_CREDENTIAL.verify(password);
                debug!("Login failed: unknown user {}", username);
                return Err(ServiceError::Unauthenticated);
            }
            Err(e) => return Err(ServiceError::from_store("User", e)),
        };

        let credential = Credential::from_parts(user.password_hash.clone(), user.salt.clone());
        if !credential.verify(password) {
            debug!("Login failed: wrong password for user {}", user.id);
            return Err(ServiceError::Unauthenticated);
        }

        Ok(user)
    }

    pub async fn get(&self, id: i32) -> Result<user::Model, ServiceError> {
        validate_id("user", id)?;

        self.repo
            .get(id)
            .await
            .map_err(|e| ServiceError::from_store("User", e))
    }

    pub async fn list(&self, page: PageInfo) -> Result<Vec<user::Model>, ServiceError> {
        validate_page(page)?;

        self.repo
            .get_all(page)
            .await
            .map_err(|e| ServiceError::from_store("User", e))
    }

    /// Update the caller's own account
    ///
    /// A new password replaces salt and hash together.
    pub async fn update(
        &self,
        id: i32,
        request: UpdateUserRequest,
        caller: &Identity,
    ) -> Result<user::Model, ServiceError> {
        validate_id("user", id)?;

        if !caller.owns(id) {
            warn!("User {} tried to update user {}", caller.user_id, id);
            return Err(ServiceError::Forbidden(
                "You can only update your own account".to_string(),
            ));
        }

        let mut user = self
            .repo
            .get(id)
            .await
            .map_err(|e| ServiceError::from_store("User", e))?;

        user.username = checked_username(&request.username)?;
        if let Some(email) = request.email {
            user.email = email;
        }
        if let Some(password) = request.password {
            let credential = new_credential(&password)?;
            user.password_hash = credential.password_hash;
            user.salt = credential.salt;
        }

        self.repo
            .update(user.clone())
            .await
            .map_err(|e| ServiceError::from_store("User", e))?;

        Ok(user)
    }

    pub async fn delete(&self, id: i32, caller: &Identity) -> Result<(), ServiceError> {
        validate_id("user", id)?;

        if !caller.owns(id) {
            warn!("User {} tried to delete user {}", caller.user_id, id);
            return Err(ServiceError::Forbidden(
                "You can only delete your own account".to_string(),
            ));
        }

        self.repo
            .delete(id)
            .await
            .map_err(|e| ServiceError::from_store("User", e))?;

        info!("Deleted user {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use market_db::MockUserRepository;

    fn stored_user(id: i32, username: &str, password: &str) -> user::Model {
        let credential = Credential::new(password).unwrap();
        user::Model {
            id,
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password_hash: credential.password_hash,
            salt: credential.salt,
            created_at: Utc::now(),
        }
    }

    fn register_request(username: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: String::new(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_stores_verifiable_credential() {
        let mut repo = MockUserRepository::new();
        repo.expect_create()
            .withf(|new_user| {
                new_user.username == "alice"
                    && !new_user.salt.is_empty()
                    && new_user.password_hash.starts_with("$argon2id$")
            })
            .times(1)
            .returning(|new_user| {
                Ok(user::Model {
                    id: 1,
                    username: new_user.username,
                    email: new_user.email,
                    password_hash: new_user.password_hash,
                    salt: new_user.salt,
                    created_at: Utc::now(),
                })
            });

        let service = UserService::new(Arc::new(repo));
        let created = service
            .register(register_request("  alice\t", "pw123"))
            .await
            .unwrap();

        let credential = Credential::from_parts(created.password_hash, created.salt);
        assert!(credential.verify("pw123"));
        assert!(!credential.verify("pw124"));
    }

    #[tokio::test]
    async fn test_register_rejects_empty_fields() {
        let mut repo = MockUserRepository::new();
        repo.expect_create().never();
        let service = UserService::new(Arc::new(repo));

        assert!(matches!(
            service.register(register_request(" \n ", "pw123")).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            service.register(register_request("alice", "")).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_register_rejects_oversized_password() {
        let mut repo = MockUserRepository::new();
        repo.expect_create().never();
        let service = UserService::new(Arc::new(repo));

        let result = service
            .register(register_request("alice", &"x".repeat(100)))
            .await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_duplicate_is_conflict() {
        let mut repo = MockUserRepository::new();
        repo.expect_create()
            .returning(|_| Err(DbError::UniqueViolation("users.username".to_string())));

        let service = UserService::new(Arc::new(repo));
        let result = service.register(register_request("alice", "pw123")).await;

        assert_eq!(
            result,
            Err(ServiceError::Conflict("User already exists".to_string()))
        );
    }

    #[tokio::test]
    async fn test_authenticate() {
        let stored = stored_user(1, "alice", "pw123");
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_username().returning(move |username| {
            if username == "alice" {
                Ok(stored.clone())
            } else {
                Err(DbError::NotFound)
            }
        });

        let service = UserService::new(Arc::new(repo));

        let user = service.authenticate(" alice ", "pw123").await.unwrap();
        assert_eq!(user.id, 1);

        assert_eq!(
            service.authenticate("alice", "wrong").await,
            Err(ServiceError::Unauthenticated)
        );
        assert_eq!(
            service.authenticate("mallory", "pw123").await,
            Err(ServiceError::Unauthenticated)
        );
    }

    #[tokio::test]
    async fn test_unknown_user_still_runs_a_hash_verification() {
        let mut repo = MockUserRepository::new();
        repo.expect_get_by_username()
            .times(1)
            .returning(|_| Err(DbError::NotFound));

        let service = UserService::new(Arc::new(repo));
        let result = service.authenticate("mallory", "pw123").await;
        assert_eq!(result, Err(ServiceError::Unauthenticated));

        // The stand-in credential is a real Argon2id hash that no input matches
        assert!(DUMMY_CREDENTIAL.password_hash.starts_with("$argon2id$"));
        assert!(!DUMMY_CREDENTIAL.verify("pw123"));
        assert!(!DUMMY_CREDENTIAL.verify(""));
    }

    #[tokio::test]
    async fn test_update_other_user_is_forbidden() {
        let mut repo = MockUserRepository::new();
        repo.expect_get().never();
        repo.expect_update().never();

        let service = UserService::new(Arc::new(repo));
        let result = service
            .update(
                1,
                UpdateUserRequest {
                    username: "mallory".to_string(),
                    ..Default::default()
                },
                &Identity::new(2, "bob"),
            )
            .await;

        assert!(matches!(result, Err(ServiceError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_update_password_regenerates_salt_and_hash() {
        let stored = stored_user(1, "alice", "pw123");
        let old_salt = stored.salt.clone();
        let old_hash = stored.password_hash.clone();

        let mut repo = MockUserRepository::new();
        repo.expect_get().returning(move |_| Ok(stored.clone()));
        repo.expect_update()
            .withf(move |user| user.salt != old_salt && user.password_hash != old_hash)
            .times(1)
            .returning(|_| Ok(()));

        let service = UserService::new(Arc::new(repo));
        let updated = service
            .update(
                1,
                UpdateUserRequest {
                    username: "alice".to_string(),
                    email: Some("new@example.com".to_string()),
                    password: Some("newpass".to_string()),
                },
                &Identity::new(1, "alice"),
            )
            .await
            .unwrap();

        assert_eq!(updated.email, "new@example.com");
        let credential = Credential::from_parts(updated.password_hash, updated.salt);
        assert!(credential.verify("newpass"));
        assert!(!credential.verify("pw123"));
    }

    #[tokio::test]
    async fn test_update_without_password_keeps_credential() {
        let stored = stored_user(1, "alice", "pw123");
        let old_salt = stored.salt.clone();

        let mut repo = MockUserRepository::new();
        repo.expect_get().returning(move |_| Ok(stored.clone()));
        repo.expect_update().times(1).returning(|_| Ok(()));

        let service = UserService::new(Arc::new(repo));
        let updated = service
            .update(
                1,
                UpdateUserRequest {
                    username: "alice  smith".to_string(),
                    ..Default::default()
                },
                &Identity::new(1, "alice"),
            )
            .await
            .unwrap();

        assert_eq!(updated.username, "alice smith");
        assert_eq!(updated.salt, old_salt);
    }

    #[tokio::test]
    async fn test_delete_other_user_is_forbidden() {
        let mut repo = MockUserRepository::new();
        repo.expect_delete().never();

        let service = UserService::new(Arc::new(repo));
        let result = service.delete(1, &Identity::new(2, "bob")).await;

        assert!(matches!(result, Err(ServiceError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_self() {
        let mut repo = MockUserRepository::new();
        repo.expect_delete()
            .withf(|id| *id == 1)
            .times(1)
            .returning(|_| Ok(()));

        let service = UserService::new(Arc::new(repo));
        assert!(service.delete(1, &Identity::new(1, "alice")).await.is_ok());
    }
}
