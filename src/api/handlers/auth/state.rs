//! Auth configuration and shared handler state.

use crate::{
    password::CredentialVerifier,
    token::TokenService,
    users::UserStore,
};
use anyhow::{Context, Result};
use std::sync::Arc;

const DEFAULT_FRONTEND_BASE_URL: &str = "http://localhost:3000";

#[derive(Clone, Debug)]
pub struct AuthConfig {
    frontend_base_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new(DEFAULT_FRONTEND_BASE_URL.to_string())
    }
}

impl AuthConfig {
    #[must_use]
    pub fn new(frontend_base_url: String) -> Self {
        Self { frontend_base_url }
    }

    pub(crate) fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    /// Only mark cookies secure when the frontend is served over HTTPS.
    pub(crate) fn session_cookie_secure(&self) -> bool {
        self.frontend_base_url.starts_with("https://")
    }
}

/// Everything the auth handlers need, shared behind an `Arc` extension.
pub struct AuthState {
    config: AuthConfig,
    tokens: Arc<TokenService>,
    credentials: CredentialVerifier,
    users: Arc<dyn UserStore>,
    // Verified against when the email is unknown so both failure paths cost a hash.
    decoy_hash: String,
}

impl AuthState {
    /// # Errors
    /// Returns an error if the decoy hash cannot be computed with the configured work factor.
    pub fn new(
        config: AuthConfig,
        tokens: Arc<TokenService>,
        credentials: CredentialVerifier,
        users: Arc<dyn UserStore>,
    ) -> Result<Self> {
        let decoy_hash = credentials
            .hash("tessera-decoy-password")
            .context("Failed to compute decoy password hash")?;
        Ok(Self {
            config,
            tokens,
            credentials,
            users,
            decoy_hash,
        })
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    #[must_use]
    pub fn users(&self) -> &dyn UserStore {
        self.users.as_ref()
    }

    pub(crate) fn decoy_hash(&self) -> &str {
        &self.decoy_hash
    }

    /// Hash on the blocking pool; argon2 is deliberately slow.
    pub(crate) async fn hash_password(&self, plaintext: String) -> Result<String> {
        let credentials = self.credentials.clone();
        let hash = tokio::task::spawn_blocking(move || credentials.hash(&plaintext))
            .await
            .context("password hashing task failed")?;
        Ok(hash?)
    }

    /// Verify on the blocking pool. A panicked task counts as a mismatch.
    pub(crate) async fn verify_password(&self, plaintext: String, stored_hash: String) -> bool {
        let credentials = self.credentials.clone();
        tokio::task::spawn_blocking(move || credentials.verify(&plaintext, &stored_hash))
            .await
            .unwrap_or(false)
    }
}

impl std::fmt::Debug for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthState")
            .field("config", &self.config)
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secure_cookies_follow_frontend_scheme() {
        assert!(AuthConfig::new("https://app.tessera.dev".to_string()).session_cookie_secure());
        assert!(!AuthConfig::new("http://localhost:3000".to_string()).session_cookie_secure());
        assert!(!AuthConfig::default().session_cookie_secure());
    }
}
