//! Signed-in principal and the gate in front of every backend command.
//!
//! Sign-in itself happens in the external identity provider. This module
//! only holds the account identifier it produced and refuses to proceed
//! without one.

use thiserror::Error;

use crate::config::Settings;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Not signed in. Set NARELLE_USER, add `username` to the config file, or pass --user.")]
    NotSignedIn,
}

/// The signed-in account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    username: String,
}

impl Principal {
    /// Returns `None` for a blank identifier.
    pub fn new(username: &str) -> Option<Self> {
        let username = username.trim();
        (!username.is_empty()).then(|| Self {
            username: username.to_string(),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    principal: Option<Principal>,
}

impl Session {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            principal: settings.username.as_deref().and_then(Principal::new),
        }
    }

    pub fn signed_in(username: &str) -> Self {
        Self {
            principal: Principal::new(username),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.principal.is_some()
    }

    /// The principal, or `NotSignedIn`.
    pub fn require(&self) -> Result<&Principal, SessionError> {
        self.principal.as_ref().ok_or(SessionError::NotSignedIn)
    }
}
