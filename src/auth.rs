//! Signed-in / signed-out view over an external identity provider.
//!
//! Sessions are owned by the fronting auth proxy. This module only reads the
//! current user from the request and asks the provider to sign out.

use async_trait::async_trait;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::AuthError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub email: Option<String>,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    fn current_user(&self, headers: &HeaderMap) -> Option<AuthUser>;

    async fn sign_out(&self, headers: &HeaderMap) -> Result<(), AuthError>;

    /// Where the UI should navigate to sign in, and after signing out.
    fn sign_in_path(&self) -> &str;
}

/// Reads the user's email from a header injected by the auth proxy.
#[derive(Debug, Clone)]
pub struct ForwardedAuth {
    config: AuthConfig,
}

impl ForwardedAuth {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl AuthProvider for ForwardedAuth {
    fn current_user(&self, headers: &HeaderMap) -> Option<AuthUser> {
        let email = headers
            .get(self.config.email_header.as_str())
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())?;
        Some(AuthUser { email: Some(email.to_string()) })
    }

    async fn sign_out(&self, _headers: &HeaderMap) -> Result<(), AuthError> {
        // The proxy drops its session once the browser lands on the sign-in path
        Ok(())
    }

    fn sign_in_path(&self) -> &str {
        &self.config.sign_in_path
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthAction {
    SignIn,
    SignOut,
}

/// What the header's auth control should render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthView {
    pub signed_in: bool,
    pub email: Option<String>,
    pub avatar_initial: Option<String>,
    pub action: AuthAction,
    pub sign_in_path: String,
}

impl AuthView {
    pub fn from_user(user: Option<&AuthUser>, sign_in_path: &str) -> Self {
        match user {
            Some(user) => Self {
                signed_in: true,
                email: user.email.clone(),
                avatar_initial: Some(avatar_initial(user.email.as_deref())),
                action: AuthAction::SignOut,
                sign_in_path: sign_in_path.to_string(),
            },
            None => Self {
                signed_in: false,
                email: None,
                avatar_initial: None,
                action: AuthAction::SignIn,
                sign_in_path: sign_in_path.to_string(),
            },
        }
    }
}

fn avatar_initial(email: Option<&str>) -> String {
    email
        .and_then(|e| e.chars().next())
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_else(|| "U".to_string())
}
