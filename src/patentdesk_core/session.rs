//! Local login gate.
//!
//! Identities live only in memory and are compared in plaintext. This keeps a session-local
//! "who is using the tool" marker and is not a security boundary.

use thiserror::Error;
use tracing::{debug, info};

use super::types::{Identity, Username};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("username `{username}` is already registered")]
    DuplicateUsername { username: String },
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("username and password are required")]
    MissingCredentials,
    #[error("log out before registering another identity")]
    AlreadyAuthenticated,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

impl AuthMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::Register => "Register",
        }
    }

    fn toggled(self) -> Self {
        match self {
            Self::Login => Self::Register,
            Self::Register => Self::Login,
        }
    }
}

#[derive(Debug, Default)]
pub struct SessionManager {
    identities: Vec<Identity>,
    active: Option<Username>,
    mode: AuthMode,
    error: Option<AuthError>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, username: &str, password: &str) -> Result<Identity, AuthError> {
        if self.active.is_some() {
            return Err(self.fail(AuthError::AlreadyAuthenticated));
        }

        if username.is_empty() || password.is_empty() {
            return Err(self.fail(AuthError::MissingCredentials));
        }

        if self.identities.iter().any(|identity| identity.username.as_str() == username) {
            return Err(self.fail(AuthError::DuplicateUsername { username: username.to_string() }));
        }

        let identity = Identity::new(username, password);
        self.identities.push(identity.clone());
        self.mode = AuthMode::Login;
        self.error = None;
        info!(username, identities = self.identities.len(), "registered identity");
        Ok(identity)
    }

    pub fn login(&mut self, username: &str, password: &str) -> Result<Identity, AuthError> {
        let Some(identity) =
            self.identities.iter().find(|identity| identity.matches(username, password)).cloned()
        else {
            debug!(username, "login rejected");
            return Err(self.fail(AuthError::InvalidCredentials));
        };

        self.active = Some(identity.username.clone());
        self.error = None;
        info!(username, "logged in");
        Ok(identity)
    }

    pub fn logout(&mut self) {
        if let Some(username) = self.active.take() {
            info!(username = %username, "logged out");
        }
    }

    pub fn switch_mode(&mut self) {
        self.mode = self.mode.toggled();
        self.error = None;
    }

    pub fn current_user(&self) -> Option<&Username> {
        self.active.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.active.is_some()
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn error(&self) -> Option<&AuthError> {
        self.error.as_ref()
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    pub fn identity_count(&self) -> usize {
        self.identities.len()
    }

    fn fail(&mut self, error: AuthError) -> AuthError {
        self.error = Some(error.clone());
        error
    }
}
