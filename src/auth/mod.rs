//! Login, logout and per-request caller identity
//!
//! Sessions live in a [`SessionStore`]; the identity of the caller is
//! resolved once per request into an [`AuthContext`] and passed explicitly
//! to whatever needs it.

pub mod password;
pub mod session;

pub use session::{Session, SessionStore};

use std::borrow::Cow;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;
use validator::{Validate, ValidationError};
use crate::Error;
use crate::entity::User;
use crate::storage::SqliteStore;
use crate::users::UserService;

/// Credentials submitted to the login endpoint
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Invalid email address")
    )]
    pub email: String,
    #[serde(default)]
    #[validate(custom(function = "password_length"))]
    pub password: String,
}

impl LoginRequest {
    /// Check the form before touching the store. Reports the first
    /// problem, email before password.
    pub fn check_form(&self) -> crate::Result<()> {
        let Err(errors) = self.validate() else {
            return Ok(());
        };
        let fields = errors.field_errors();
        let message = ["email", "password"]
            .iter()
            .filter_map(|name| fields.get(*name))
            .flat_map(|errs| errs.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| errors.to_string());
        Err(Error::InvalidInput(message))
    }
}

fn password_length(password: &str) -> Result<(), ValidationError> {
    let message = match password.chars().count() {
        0 => "Password is required",
        1..=5 => "Password must be at least 6 characters long.",
        6..=100 => return Ok(()),
        _ => "Password must be at most 100 characters long.",
    };
    Err(ValidationError::new("length").with_message(Cow::Borrowed(message)))
}

/// Outcome of a login attempt
#[derive(Debug, Clone, Serialize)]
pub struct AuthResult {
    pub success: bool,
    pub message: String,
    pub user: Option<User>,
    /// Session id to hand back to the client
    #[serde(skip_serializing)]
    pub token: Option<Uuid>,
}

impl AuthResult {
    fn rejected(message: &str) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            user: None,
            token: None,
        }
    }
}

/// Who is calling. Built once per request and passed down explicitly.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    pub user: Option<User>,
    pub session: Option<Uuid>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Label for log lines
    pub fn caller(&self) -> &str {
        self.user.as_ref().map(|u| u.email.as_str()).unwrap_or("anonymous")
    }
}

pub struct AuthService<'a> {
    users: UserService<'a>,
    sessions: &'a SessionStore,
}

impl<'a> AuthService<'a> {
    pub fn new(store: &'a SqliteStore, sessions: &'a SessionStore) -> Self {
        Self {
            users: UserService::new(store),
            sessions,
        }
    }

    /// Authenticate and open a session
    pub fn login(&self, email: &str, password: &str) -> AuthResult {
        match self.users.authenticate(email, password) {
            Ok(Some(user)) => {
                let session = self.sessions.create(&user);
                info!(email, "User logged in successfully");
                AuthResult {
                    success: true,
                    message: "Login successful".to_string(),
                    user: Some(user),
                    token: Some(session.id),
                }
            }
            Ok(None) => AuthResult::rejected("Invalid email or password"),
            Err(e) => {
                error!(error = %e, email, "Error during login");
                AuthResult::rejected("An error occurred during login")
            }
        }
    }

    /// Close a session. Returns false if it was not open.
    pub fn logout(&self, token: &Uuid) -> bool {
        let removed = self.sessions.remove(token);
        if removed {
            info!("User logged out successfully");
        }
        removed
    }

    /// Resolve a session token into the caller's identity. Stale sessions
    /// and sessions whose user has been deleted resolve to anonymous.
    pub fn context(&self, token: Option<Uuid>) -> crate::Result<AuthContext> {
        let Some(session) = token.and_then(|t| self.sessions.get(&t)) else {
            return Ok(AuthContext::anonymous());
        };

        let user = self.users.get_by_id(session.user_id)?;
        Ok(AuthContext {
            session: user.as_ref().map(|_| session.id),
            user,
        })
    }
}
