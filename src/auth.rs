//! Identity provider port and the signed-in session built on it.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::bus::{BusReader, BusWriter, ValueBus};
use crate::errors::AuthError;
use crate::types::Email;

/// A signed-in user as reported by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: String,
    pub email: Email,
    pub signed_in_at: DateTime<Utc>,
}

/// Hosted identity provider capability.
pub trait AuthProvider: Send + Sync {
    /// Verify credentials and return the user.
    fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError>;
    /// Ask the provider to email a password reset link.
    fn send_password_reset(&self, email: &str) -> Result<(), AuthError>;
    /// End the provider-side session.
    fn sign_out(&self) {}
}

/// In-memory identity provider used by tests and local runs.
#[derive(Default)]
pub struct InMemoryAuthProvider {
    accounts: HashMap<Email, String>,
    reset_requests: Mutex<Vec<Email>>,
}

impl InMemoryAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account.
    pub fn with_account(mut self, email: impl Into<Email>, password: impl Into<String>) -> Self {
        self.accounts.insert(email.into(), password.into());
        self
    }

    /// Emails that requested a password reset, oldest first.
    pub fn reset_requests(&self) -> Vec<Email> {
        self.reset_requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AuthProvider for InMemoryAuthProvider {
    fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        match self.accounts.get(email) {
            Some(expected) if expected == password => Ok(User {
                uid: format!("local::{email}"),
                email: email.to_string(),
                signed_in_at: Utc::now(),
            }),
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    fn send_password_reset(&self, email: &str) -> Result<(), AuthError> {
        if !self.accounts.contains_key(email) {
            return Err(AuthError::Provider(format!("no account for {email}")));
        }
        self.reset_requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(email.to_string());
        Ok(())
    }
}

/// Signed-in state, published to readers on a value bus.
pub struct AuthSession<P> {
    provider: P,
    user: BusWriter<Option<User>>,
}

impl<P: AuthProvider> AuthSession<P> {
    pub fn new(provider: P) -> Self {
        let (user, _) = ValueBus::new(None);
        Self { provider, user }
    }

    /// Reader that observes sign-in and sign-out.
    pub fn user_reader(&self) -> BusReader<Option<User>> {
        self.user.reader()
    }

    /// Sign in and publish the user on success.
    pub fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        match self.provider.sign_in(email.trim(), password) {
            Ok(user) => {
                info!(email = user.email.as_str(), "user logged in");
                self.user.publish(Some(user.clone()));
                Ok(user)
            }
            Err(err) => {
                warn!(email, error = %err, "login failed");
                Err(err)
            }
        }
    }

    /// Sign out and publish `None`.
    pub fn logout(&self) {
        self.provider.sign_out();
        self.user.publish(None);
    }

    /// Request a password reset email; an empty address is rejected locally.
    pub fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AuthError::MissingEmail);
        }
        self.provider.send_password_reset(email).inspect_err(|err| {
            warn!(email, error = %err, "password reset failed");
        })?;
        info!(email, "password reset email sent");
        Ok(())
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.current().is_some()
    }

    pub fn current_user(&self) -> Option<User> {
        self.user.current()
    }

    pub fn user_email(&self) -> Option<Email> {
        self.user.current().map(|user| user.email)
    }
}
