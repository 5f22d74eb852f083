//! Fixed-identity authentication stub.
//!
//! Every call succeeds without looking at its arguments. The signed-in user
//! is always the store's owner. Sign-up returns a user but no session, so
//! callers exercise their "confirm your email" branch.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::store::{RecordStore, seed};

/// An authenticated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// An active session. The stub never issues one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub access_token: String,
    pub user: User,
}

/// Error shape of the hosted auth service. Never produced by the stub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct AuthError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

/// The `{ data, error }` pair every auth call resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthResponse<T> {
    pub data: T,
    pub error: Option<AuthError>,
}

impl<T> AuthResponse<T> {
    const fn ok(data: T) -> Self {
        Self { data, error: None }
    }
}

/// Payload of `get_user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserData {
    pub user: Option<User>,
}

/// Payload of `sign_up`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignUpData {
    pub user: Option<User>,
    pub session: Option<Session>,
}

/// Placeholder payload for calls whose data callers ignore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Empty {}

/// Email and password sign-in.
#[derive(Debug, Clone, Default)]
pub struct PasswordCredentials {
    pub email: String,
    pub password: String,
}

/// Sign-up request. Metadata is accepted and ignored.
#[derive(Debug, Clone, Default)]
pub struct SignUpOptions {
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub email_redirect_to: Option<String>,
}

/// One-time sign-in link request.
#[derive(Debug, Clone, Default)]
pub struct OtpOptions {
    pub email: String,
    pub email_redirect_to: Option<String>,
    pub should_create_user: bool,
}

/// Authentication surface backed by the store's fixed identity.
#[derive(Debug, Clone)]
pub struct AuthStub {
    store: Arc<RecordStore>,
}

#[allow(clippy::unused_async)]
impl AuthStub {
    #[must_use]
    pub const fn new(store: Arc<RecordStore>) -> Self {
        Self { store }
    }

    fn current_user(&self) -> User {
        let owner_id = self.store.owner_id();
        let email = self
            .store
            .rows(crate::store::Table::People)
            .iter()
            .find(|row| row.get("id").and_then(serde_json::Value::as_str) == Some(owner_id))
            .and_then(|row| row.get("email").and_then(serde_json::Value::as_str))
            .unwrap_or(seed::MOCK_OWNER_EMAIL);
        User {
            id: owner_id.to_string(),
            email: email.to_string(),
            created_at: Some(seed::MOCK_OWNER_CREATED_AT.to_string()),
        }
    }

    pub async fn get_user(&self) -> AuthResponse<UserData> {
        AuthResponse::ok(UserData {
            user: Some(self.current_user()),
        })
    }

    pub async fn sign_out(&self) -> AuthResponse<Empty> {
        debug!("mock sign-out");
        AuthResponse::ok(Empty {})
    }

    pub async fn sign_in_with_password(&self, _credentials: PasswordCredentials) -> AuthResponse<Empty> {
        debug!("mock password sign-in accepted");
        AuthResponse::ok(Empty {})
    }

    /// Returns the fixed user with no session.
    pub async fn sign_up(&self, _options: SignUpOptions) -> AuthResponse<SignUpData> {
        let mut user = self.current_user();
        user.created_at = None;
        AuthResponse::ok(SignUpData {
            user: Some(user),
            session: None,
        })
    }

    pub async fn sign_in_with_otp(&self, _options: OtpOptions) -> AuthResponse<Empty> {
        debug!("mock one-time link issued");
        AuthResponse::ok(Empty {})
    }

    pub async fn exchange_code_for_session(&self, _code: &str) -> AuthResponse<Empty> {
        AuthResponse::ok(Empty {})
    }
}
