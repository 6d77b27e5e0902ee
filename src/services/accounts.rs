use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::core::error::AuthError;
use crate::metrics::collector::Metrics;
use crate::models::account::{LoginRequest, RegisterRequest};
use crate::models::user::{User, UserId};
use crate::security::password::{hash_password, verify_password};
use crate::stores::user_store::UserStore;

/// Registration and credential checks. Session issuance is left to the HTTP layer.
pub struct AccountService {
    users: Arc<UserStore>,
    metrics: Arc<Metrics>,
    bcrypt_cost: u32,
}

impl AccountService {
    pub fn new(users: Arc<UserStore>, metrics: Arc<Metrics>, bcrypt_cost: u32) -> Self {
        Self {
            users,
            metrics,
            bcrypt_cost,
        }
    }

    #[instrument(name = "Registering new user", skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: RegisterRequest) -> Result<Arc<User>, AuthError> {
        let request = request.validate()?;

        if self.users.find_by_email(&request.email).is_some() {
            warn!("Registration rejected: email already registered");
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = hash_password(request.password, self.bcrypt_cost).await?;
        let user = User::new(request.email, password_hash, request.first_name, request.last_name);

        // a racing registration for the same email surfaces here as EmailTaken
        let user = self.users.insert(user)?;

        self.metrics.increment_registrations();
        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    #[instrument(name = "Login attempt", skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> Result<Arc<User>, AuthError> {
        let request = request.validate()?;

        let Some(user) = self.users.find_by_email(&request.email) else {
            warn!("Login failed: unknown email");
            self.metrics.increment_failed_logins();
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(request.password, user.password_hash.clone()).await? {
            warn!(user_id = %user.id, "Login failed: wrong password");
            self.metrics.increment_failed_logins();
            return Err(AuthError::InvalidCredentials);
        }

        self.metrics.increment_successful_logins();
        info!(user_id = %user.id, "User authenticated");
        Ok(user)
    }

    pub fn profile(&self, user_id: UserId) -> Result<Arc<User>, AuthError> {
        self.users.find_by_id(user_id).ok_or(AuthError::UserNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wal::wal::Wal;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn service() -> (AccountService, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let wal = Wal::new(temp_dir.path().join("accounts.wal")).unwrap();
        let users = Arc::new(UserStore::new(Arc::new(wal)));
        (AccountService::new(users, Arc::new(Metrics::new()), 4), temp_dir)
    }

    fn registration(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            first_name: "Grace".to_string(),
            last_name: "Hopper".to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_stores_hash_not_password() {
        let (accounts, _dir) = service();
        let user = accounts.register(registration("x@y.com", "secret1")).await.unwrap();

        assert_eq!(user.email, "x@y.com");
        assert_ne!(user.password_hash, "secret1");
        assert!(user.password_hash.starts_with("$2"));
    }

    #[tokio::test]
    async fn test_duplicate_registration_rejected() {
        let (accounts, _dir) = service();
        accounts.register(registration("x@y.com", "secret1")).await.unwrap();

        let result = accounts.register(registration("x@y.com", "other-pass")).await;
        assert!(matches!(result, Err(AuthError::UserAlreadyExists)));
    }

    #[tokio::test]
    async fn test_login_round_trip() {
        let (accounts, _dir) = service();
        let registered = accounts.register(registration("x@y.com", "secret1")).await.unwrap();

        let user = accounts.login(login("x@y.com", "secret1")).await.unwrap();
        assert_eq!(user.id, registered.id);
        assert_eq!(accounts.metrics.successful_logins.load(std::sync::atomic::Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_look_the_same() {
        let (accounts, _dir) = service();
        accounts.register(registration("x@y.com", "secret1")).await.unwrap();

        let wrong_password = accounts.login(login("x@y.com", "secret2")).await.unwrap_err();
        let unknown_email = accounts.login(login("nobody@y.com", "secret1")).await.unwrap_err();

        assert_eq!(wrong_password.to_string(), "Invalid credentials");
        assert_eq!(unknown_email.to_string(), "Invalid credentials");
    }

    #[tokio::test]
    async fn test_invalid_login_input_is_validation_error() {
        let (accounts, _dir) = service();
        let result = accounts.login(login("x@y.com", "123")).await;

        assert!(matches!(result, Err(AuthError::Validation(_))));
    }

    #[tokio::test]
    async fn test_profile_lookup() {
        let (accounts, _dir) = service();
        let user = accounts.register(registration("x@y.com", "secret1")).await.unwrap();

        assert_eq!(accounts.profile(user.id).unwrap().first_name, "Grace");
        assert!(matches!(accounts.profile(Uuid::new_v4()), Err(AuthError::UserNotFound)));
    }
}
