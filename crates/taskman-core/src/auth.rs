//! Registration and login

use std::sync::Arc;
use taskman_auth::{AuthError, TokenService, hash_password, verify_password};
use taskman_db::{DbError, NewUser, User, UserStore};
use tracing::{debug, info, warn};

use crate::error::ServiceError;
use crate::validation::{
    MAX_PASSWORD_LENGTH, validate_email, validate_full_name, validate_password, validate_username,
};

/// Verified against when the username is unknown so that both failure
/// paths cost one Argon2 verification. Never matches any password.
const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$dGFza21hbi1kdW1teS1sb2dpbi1zYWx0$BwgJCgsMDQ4PEBESExQVFhcYGRobHB0eHyAhIiMkJSY";

/// Registration input
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
}

/// Successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub expires_in: i64,
    pub user: User,
}

/// Registration, login and profile lookup
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, tokens: Arc<TokenService>) -> Self {
        Self { users, tokens }
    }

    /// Register a new user
    pub async fn register(&self, input: RegisterInput) -> Result<User, ServiceError> {
        let username = input.username.trim().to_string();
        let email = input.email.trim().to_lowercase();
        let full_name = input.full_name.trim().to_string();

        validate_username(&username)?;
        validate_email(&email)?;
        validate_password(&input.password)?;
        validate_full_name(&full_name)?;

        if self.users.find_by_username(&username).await?.is_some() {
            return Err(ServiceError::DuplicateUsername);
        }
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(ServiceError::DuplicateEmail);
        }

        let password_hash = hash_blocking(input.password).await?;

        // The lookups above race with concurrent registrations; the
        // table's unique constraints are the final arbiter.
        let user = self
            .users
            .create(NewUser {
                username,
                email,
                password_hash,
                full_name,
            })
            .await
            .map_err(|e| match e {
                DbError::Duplicate(msg) if msg.contains("email") => ServiceError::DuplicateEmail,
                DbError::Duplicate(_) => ServiceError::DuplicateUsername,
                other => ServiceError::Database(other),
            })?;

        info!("Registered user {} (id {})", user.username, user.id);
        Ok(user)
    }

    /// Authenticate with username and password and issue a token
    ///
    /// Unknown usernames and wrong passwords fail identically with
    /// [`ServiceError::InvalidCredentials`].
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome, ServiceError> {
        if password.len() > MAX_PASSWORD_LENGTH {
            return Err(ServiceError::InvalidCredentials);
        }

        debug!("Login attempt for user: {}", username);

        let user = self.users.find_by_username(username.trim()).await?;
        let hash = user
            .as_ref()
            .map(|u| u.password_hash.clone())
            .unwrap_or_else(|| DUMMY_HASH.to_string());

        let password_valid = verify_blocking(password.to_string(), hash).await?;

        let user = match (user, password_valid) {
            (Some(u), true) => u,
            _ => return Err(ServiceError::InvalidCredentials),
        };

        let token = self.tokens.issue(user.id)?;

        info!("User {} logged in successfully", user.username);

        Ok(LoginOutcome {
            token,
            expires_in: self.tokens.expires_in_secs(),
            user,
        })
    }

    /// Look up the authenticated caller's own record
    pub async fn profile(&self, user_id: i64) -> Result<User, ServiceError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(ServiceError::NotFound("User"))
    }
}

/// Hash on the blocking pool; Argon2 is deliberately slow
async fn hash_blocking(password: String) -> Result<String, ServiceError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ServiceError::Internal(format!("Task join error: {}", e)))?
        .map_err(ServiceError::from)
}

/// Verify on the blocking pool; a corrupt stored hash counts as a mismatch
async fn verify_blocking(password: String, hash: String) -> Result<bool, ServiceError> {
    let result = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| ServiceError::Internal(format!("Task join error: {}", e)))?;

    match result {
        Ok(valid) => Ok(valid),
        Err(AuthError::MalformedHash(reason)) => {
            warn!("Stored password hash is malformed: {}", reason);
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use taskman_auth::authenticate;
    use taskman_db::Database;

    async fn service() -> (AuthService, Arc<TokenService>) {
        let db = Arc::new(Database::in_memory().await.unwrap());
        let tokens = Arc::new(TokenService::new("core-test-secret", Duration::hours(24)));
        (AuthService::new(db, tokens.clone()), tokens)
    }

    fn input(username: &str, email: &str, password: &str) -> RegisterInput {
        RegisterInput {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            full_name: String::new(),
        }
    }

    #[tokio::test]
    async fn test_register_login_and_gate() {
        let (auth, tokens) = service().await;

        let alice = auth
            .register(input("alice", "alice@x.com", "secret1"))
            .await
            .unwrap();
        assert_ne!(alice.password_hash, "secret1");

        let outcome = auth.login("alice", "secret1").await.unwrap();
        assert_eq!(outcome.user.id, alice.id);
        assert_eq!(outcome.expires_in, 24 * 3600);

        let header = format!("Bearer {}", outcome.token);
        let user = authenticate(Some(&header), &tokens).unwrap();
        assert_eq!(user.id, alice.id);

        assert!(authenticate(Some("Bearer garbage"), &tokens).is_err());
        assert!(authenticate(None, &tokens).is_err());
    }

    #[tokio::test]
    async fn test_duplicate_registration() {
        let (auth, _) = service().await;
        auth.register(input("alice", "alice@x.com", "secret1"))
            .await
            .unwrap();

        assert!(matches!(
            auth.register(input("alice", "other@x.com", "secret1")).await,
            Err(ServiceError::DuplicateUsername)
        ));
        assert!(matches!(
            auth.register(input("alice2", "ALICE@x.com", "secret1")).await,
            Err(ServiceError::DuplicateEmail)
        ));
    }

    /// Passes the pre-insert lookups, then loses the race at insert time
    struct RacingUserStore {
        conflict: &'static str,
    }

    #[async_trait::async_trait]
    impl UserStore for RacingUserStore {
        async fn find_by_username(&self, _username: &str) -> Result<Option<User>, DbError> {
            Ok(None)
        }

        async fn find_by_email(&self, _email: &str) -> Result<Option<User>, DbError> {
            Ok(None)
        }

        async fn find_by_id(&self, _id: i64) -> Result<Option<User>, DbError> {
            Ok(None)
        }

        async fn create(&self, _user: NewUser) -> Result<User, DbError> {
            Err(DbError::Duplicate(self.conflict.to_string()))
        }
    }

    fn racing_service(conflict: &'static str) -> AuthService {
        let tokens = Arc::new(TokenService::new("core-test-secret", Duration::hours(24)));
        AuthService::new(Arc::new(RacingUserStore { conflict }), tokens)
    }

    #[tokio::test]
    async fn test_insert_time_conflicts_map_to_field() {
        let auth = racing_service("UNIQUE constraint failed: users.email");
        assert!(matches!(
            auth.register(input("alice", "alice@x.com", "secret1")).await,
            Err(ServiceError::DuplicateEmail)
        ));

        let auth = racing_service("UNIQUE constraint failed: users.username");
        assert!(matches!(
            auth.register(input("alice", "alice@x.com", "secret1")).await,
            Err(ServiceError::DuplicateUsername)
        ));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let (auth, _) = service().await;
        auth.register(input("alice", "alice@x.com", "secret1"))
            .await
            .unwrap();

        let wrong_password = auth.login("alice", "wrong-password").await.unwrap_err();
        let unknown_user = auth.login("nobody", "secret1").await.unwrap_err();

        assert!(matches!(wrong_password, ServiceError::InvalidCredentials));
        assert!(matches!(unknown_user, ServiceError::InvalidCredentials));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[tokio::test]
    async fn test_register_validates_input() {
        let (auth, _) = service().await;

        assert!(matches!(
            auth.register(input("al", "al@x.com", "secret1")).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            auth.register(input("alice", "not-an-email", "secret1")).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            auth.register(input("alice", "alice@x.com", "123")).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_profile() {
        let (auth, _) = service().await;
        let alice = auth
            .register(input("alice", "alice@x.com", "secret1"))
            .await
            .unwrap();

        assert_eq!(auth.profile(alice.id).await.unwrap().username, "alice");
        assert!(matches!(
            auth.profile(alice.id + 1).await,
            Err(ServiceError::NotFound("User"))
        ));
    }

    #[test]
    fn test_dummy_hash_is_well_formed() {
        assert!(!verify_password("secret1", DUMMY_HASH).unwrap());
    }
}
