//! Authenticated identity context.
//!
//! The identity provider (external collaborator) supplies a stable user id
//! and display name. Rather than an ambient global observed through a
//! callback subscription, the identity is carried as an explicit
//! [`UserContext`] handed to the ledger operations, with an
//! [`AuthSession`] owning the init/teardown lifecycle. Without an
//! authenticated identity there is nothing to persist, so callers simply
//! skip ledger calls.

use serde::{Deserialize, Serialize};

// ============================================================================
// UserContext
// ============================================================================

/// Identity of the acting user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContext {
    /// Stable user id from the identity provider
    pub user_id: String,
    /// Display name, if the user set one
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub display_name: Option<String>,
}

impl UserContext {
    /// Creates a context for an authenticated user.
    pub fn new(user_id: impl Into<String>, display_name: Option<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name,
        }
    }

    /// Display name with the fallback shown to other users.
    pub fn display_name_or_friend(&self) -> &str {
        self.display_name.as_deref().unwrap_or("a friend")
    }
}

// ============================================================================
// AuthSession
// ============================================================================

/// Holds the current identity between sign-in and sign-out.
#[derive(Debug, Default)]
pub struct AuthSession {
    current: Option<UserContext>,
}

impl AuthSession {
    /// Creates a session with no authenticated identity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the identity once the provider has acquired it.
    pub fn init(&mut self, context: UserContext) {
        self.current = Some(context);
    }

    /// Clears the identity on sign-out.
    pub fn teardown(&mut self) {
        self.current = None;
    }

    /// Returns the current identity, if signed in.
    pub fn current(&self) -> Option<&UserContext> {
        self.current.as_ref()
    }

    /// Returns true if an identity is installed.
    pub fn is_signed_in(&self) -> bool {
        self.current.is_some()
    }
}

// ============================================================================
// Tests
// ============================================================================
