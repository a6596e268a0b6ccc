//! Path-based access decisions.
//!
//! [`Gate::decide`] is a pure function of the request path, the presented token
//! and the current time. It never fails: every input maps to [`Decision::Allow`]
//! or [`Decision::Redirect`].

use crate::token::{now_unix_seconds, TokenService};
use std::sync::Arc;
use url::form_urlencoded;

pub const DEFAULT_LOGIN_PATH: &str = "/login";
pub const DEFAULT_LANDING_PATH: &str = "/dashboard";
pub const CALLBACK_PARAM: &str = "callbackUrl";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateConfig {
    /// Paths starting with any of these require a valid token.
    protected_prefixes: Vec<String>,
    /// Paths only meaningful to anonymous users (matched exactly).
    auth_only_paths: Vec<String>,
    /// Never evaluated; matched on whole path segments.
    excluded_prefixes: Vec<String>,
    login_path: String,
    landing_path: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            protected_prefixes: vec![DEFAULT_LANDING_PATH.to_string()],
            auth_only_paths: vec![DEFAULT_LOGIN_PATH.to_string(), "/register".to_string()],
            excluded_prefixes: ["/api", "/static", "/images", "/favicon.ico"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            landing_path: DEFAULT_LANDING_PATH.to_string(),
        }
    }
}

impl GateConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_protected_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.protected_prefixes = prefixes;
        self
    }

    #[must_use]
    pub fn with_auth_only_paths(mut self, paths: Vec<String>) -> Self {
        self.auth_only_paths = paths;
        self
    }

    #[must_use]
    pub fn with_excluded_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.excluded_prefixes = prefixes;
        self
    }

    #[must_use]
    pub fn with_login_path(mut self, path: String) -> Self {
        self.login_path = path;
        self
    }

    #[must_use]
    pub fn with_landing_path(mut self, path: String) -> Self {
        self.landing_path = path;
        self
    }

    #[must_use]
    pub fn protected_prefixes(&self) -> &[String] {
        &self.protected_prefixes
    }

    #[must_use]
    pub fn auth_only_paths(&self) -> &[String] {
        &self.auth_only_paths
    }

    fn is_excluded(&self, path: &str) -> bool {
        self.excluded_prefixes.iter().any(|prefix| {
            path == prefix
                || path
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }

    fn is_protected(&self, path: &str) -> bool {
        self.protected_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
    }

    fn is_auth_only(&self, path: &str) -> bool {
        self.auth_only_paths.iter().any(|candidate| candidate == path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect {
        path: String,
        /// Original request path to return to after login.
        callback: Option<String>,
    },
}

impl Decision {
    /// `Location` header value for a redirect, `None` for `Allow`.
    #[must_use]
    pub fn location(&self) -> Option<String> {
        match self {
            Self::Allow => None,
            Self::Redirect {
                path,
                callback: None,
            } => Some(path.clone()),
            Self::Redirect {
                path,
                callback: Some(callback),
            } => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair(CALLBACK_PARAM, callback)
                    .finish();
                Some(format!("{path}?{query}"))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Gate {
    config: GateConfig,
    tokens: Arc<TokenService>,
}

impl Gate {
    #[must_use]
    pub fn new(config: GateConfig, tokens: Arc<TokenService>) -> Self {
        Self { config, tokens }
    }

    #[must_use]
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    #[must_use]
    pub fn decide(&self, path: &str, token: Option<&str>) -> Decision {
        self.decide_at(path, token, now_unix_seconds())
    }

    #[must_use]
    pub fn decide_at(&self, path: &str, token: Option<&str>, now: i64) -> Decision {
        if self.config.is_excluded(path) {
            return Decision::Allow;
        }

        let is_authenticated =
            token.is_some_and(|token| self.tokens.verify_at(token, now).is_valid());

        // Protected prefixes are checked first and win on overlap.
        if self.config.is_protected(path) && !is_authenticated {
            return Decision::Redirect {
                path: self.config.login_path.clone(),
                callback: Some(path.to_string()),
            };
        }

        if self.config.is_auth_only(path) && is_authenticated {
            return Decision::Redirect {
                path: self.config.landing_path.clone(),
                callback: None,
            };
        }

        Decision::Allow
    }
}
