//! # Sessions & Authentication
//!
//! Explicit session state and the auth service that manages it.
//!
//! ## Session Model
//! There is exactly one operator per running app instance, so the session
//! is a single shared `Option<Session>` behind a mutex rather than a
//! token map. Every mutating service call goes through
//! [`SessionState::require_at_least`], which makes role gating explicit
//! at the seam instead of implied by which screens exist.
//!
//! ## Role Gating
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  admin   item mutations, user role changes, everything below           │
//! │  biller  sale / claim / prize mutations, loyalty lookups               │
//! │  user    read-only views, own points                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Passwords
//! Argon2id with a per-user random salt. The stored hash string embeds the
//! salt and parameters; verification never needs anything else.

use std::sync::{Arc, Mutex};

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};
use dukaan_core::validation::{validate_email, validate_name, validate_phone};
use dukaan_core::{Role, User};
use dukaan_db::repository::user::NewUser;
use dukaan_db::Database;

// =============================================================================
// Session
// =============================================================================

/// The signed-in operator.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub username: String,
    pub role: Role,
    pub started_at: DateTime<Utc>,
}

/// Shared session slot.
///
/// Cloning shares the slot; all services observe the same sign-in state.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    inner: Arc<Mutex<Option<Session>>>,
}

impl SessionState {
    /// Creates an empty (signed-out) session state.
    pub fn new() -> Self {
        SessionState::default()
    }

    /// Returns the current session, if signed in.
    pub fn current(&self) -> Option<Session> {
        self.inner.lock().expect("session lock poisoned").clone()
    }

    /// Replaces the current session.
    pub fn set(&self, session: Session) {
        *self.inner.lock().expect("session lock poisoned") = Some(session);
    }

    /// Clears the current session.
    pub fn clear(&self) {
        *self.inner.lock().expect("session lock poisoned") = None;
    }

    /// Requires any active session.
    pub fn require(&self) -> ApiResult<Session> {
        self.current().ok_or_else(ApiError::unauthorized)
    }

    /// Requires an active session with at least the given role.
    pub fn require_at_least(&self, role: Role, action: &str) -> ApiResult<Session> {
        let session = self.require()?;
        if !session.role.is_at_least(role) {
            warn!(user = %session.username, ?role, action, "Role gate refused");
            return Err(ApiError::forbidden(action));
        }
        Ok(session)
    }
}

// =============================================================================
// Auth Service
// =============================================================================

/// Sign-up, login and logout against the user repository.
#[derive(Debug, Clone)]
pub struct AuthService {
    db: Database,
    state: SessionState,
}

impl AuthService {
    /// Creates a new AuthService over a shared session slot.
    pub fn new(db: Database, state: SessionState) -> Self {
        AuthService { db, state }
    }

    /// Registers a new user.
    ///
    /// The first registered user becomes the admin regardless of the
    /// requested role; later sign-ups get the requested role (default
    /// `user`, promotion is an admin action).
    pub async fn sign_up(
        &self,
        username: &str,
        email: &str,
        phone_number: &str,
        password: &str,
        role: Role,
    ) -> ApiResult<User> {
        validate_name(username)?;
        validate_email(email)?;
        validate_phone(phone_number)?;

        if password.len() < 6 {
            return Err(ApiError::validation(
                "password must be at least 6 characters",
            ));
        }

        let role = if self.db.users().count().await? == 0 {
            Role::Admin
        } else {
            role
        };

        let password_hash = hash_password(password)?;

        let user = self
            .db
            .users()
            .insert(NewUser {
                username: username.trim().to_string(),
                email: email.trim().to_lowercase(),
                phone_number: phone_number.trim().to_string(),
                role,
                password_hash,
            })
            .await?;

        info!(user = %user.username, role = ?user.role, "User registered");
        Ok(user)
    }

    /// Signs in with email and password, populating the session slot.
    ///
    /// Unknown email and wrong password return the same error so the
    /// login form cannot be used to probe registered addresses.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<Session> {
        let user = self
            .db
            .users()
            .find_by_email(email)
            .await?
            .ok_or_else(invalid_credentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(invalid_credentials());
        }

        let session = Session {
            user_id: user.id,
            username: user.username,
            role: user.role,
            started_at: Utc::now(),
        };

        info!(user = %session.username, "Signed in");
        self.state.set(session.clone());
        Ok(session)
    }

    /// Signs out, clearing the session slot.
    pub fn logout(&self) {
        if let Some(session) = self.state.current() {
            info!(user = %session.username, "Signed out");
        }
        self.state.clear();
    }

    /// Returns the shared session state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }
}

fn invalid_credentials() -> ApiError {
    ApiError::new(crate::error::ErrorCode::Unauthorized, "Invalid credentials")
}

/// Hashes a password with Argon2id and a fresh random salt.
fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::internal(format!("Password hashing failed: {}", e)))?;
    Ok(hash.to_string())
}

/// Verifies a password against a stored Argon2 hash string.
fn verify_password(password: &str, stored: &str) -> ApiResult<bool> {
    let parsed = PasswordHash::new(stored)
        .map_err(|e| ApiError::internal(format!("Corrupt password hash: {}", e)))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use dukaan_db::DbConfig;

    async fn auth() -> AuthService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        AuthService::new(db, SessionState::new())
    }

    #[tokio::test]
    async fn test_first_user_becomes_admin() {
        let auth = auth().await;

        let first = auth
            .sign_up("ali", "ali@example.com", "", "secret1", Role::User)
            .await
            .unwrap();
        assert_eq!(first.role, Role::Admin);

        let second = auth
            .sign_up("bilal", "bilal@example.com", "", "secret1", Role::User)
            .await
            .unwrap();
        assert_eq!(second.role, Role::User);
    }

    #[tokio::test]
    async fn test_login_round_trip() {
        let auth = auth().await;
        auth.sign_up("ali", "ali@example.com", "", "secret1", Role::User)
            .await
            .unwrap();

        let session = auth.login("ali@example.com", "secret1").await.unwrap();
        assert_eq!(session.username, "ali");
        assert!(auth.state().current().is_some());

        auth.logout();
        assert!(auth.state().current().is_none());
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_look_identical() {
        let auth = auth().await;
        auth.sign_up("ali", "ali@example.com", "", "secret1", Role::User)
            .await
            .unwrap();

        let wrong_pw = auth.login("ali@example.com", "nope99").await.unwrap_err();
        let unknown = auth.login("ghost@example.com", "secret1").await.unwrap_err();

        assert_eq!(wrong_pw.code, ErrorCode::Unauthorized);
        assert_eq!(wrong_pw.message, unknown.message);
    }

    #[tokio::test]
    async fn test_role_gate() {
        let state = SessionState::new();
        assert_eq!(
            state.require().unwrap_err().code,
            ErrorCode::Unauthorized
        );

        state.set(Session {
            user_id: "u1".to_string(),
            username: "ali".to_string(),
            role: Role::Biller,
            started_at: Utc::now(),
        });

        assert!(state.require_at_least(Role::Biller, "create sales").is_ok());
        assert_eq!(
            state
                .require_at_least(Role::Admin, "edit items")
                .unwrap_err()
                .code,
            ErrorCode::Forbidden
        );
    }

    #[tokio::test]
    async fn test_short_password_rejected() {
        let auth = auth().await;
        let err = auth
            .sign_up("ali", "ali@example.com", "", "abc", Role::User)
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
