//! HTTP side of the session: talks to `/api/auth/*` with a cookie jar and
//! feeds the outcome into a [`SessionStore`].

use super::{SessionEvent, SessionStore};
use crate::{users::UserProfile, APP_USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const FETCH_USER_FAILED: &str = "Failed to fetch user";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    #[error("Request failed ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("Response error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

#[derive(Deserialize)]
struct UserEnvelope {
    user: UserProfile,
}

#[derive(Deserialize)]
struct MessageEnvelope {
    message: String,
}

/// Cookie-holding client bound to one server and one [`SessionStore`].
#[derive(Debug, Clone)]
pub struct SessionClient {
    http: Client,
    base_url: Url,
    store: SessionStore,
}

impl SessionClient {
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot be built.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| ClientError::Config(format!("invalid base URL {base_url}: {err}")))?;
        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(|err| ClientError::Config(err.to_string()))?;

        Ok(Self {
            http,
            base_url,
            store: SessionStore::new(),
        })
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Load the current user into the store.
    ///
    /// Only runs from `idle`; while a fetch is in flight or after one has
    /// settled this is a no-op. Every failure lands in the store as
    /// `failed` with a message rather than being returned.
    #[instrument(skip(self))]
    pub async fn fetch_current_user(&self) {
        if !self.store.begin_fetch() {
            debug!(status = ?self.store.status(), "Skipping user fetch");
            return;
        }

        let event = match self.get_current_user().await {
            Ok(user) => SessionEvent::FetchFulfilled(user),
            Err(err) => {
                if is_unauthenticated(&err) {
                    debug!("No active session: {err}");
                } else {
                    warn!("User fetch failed: {err}");
                }
                SessionEvent::FetchRejected(rejection_message(&err))
            }
        };
        self.store.dispatch(event);
    }

    /// Sign in; on success the store holds the returned user.
    ///
    /// # Errors
    /// Returns the server's message for rejected credentials or invalid input.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, ClientError> {
        let body = json!({ "email": email, "password": password });
        let user = self.post_for_user("/api/auth/login", &body).await?;
        self.store.dispatch(SessionEvent::SetUser(user.clone()));
        Ok(user)
    }

    /// Create an account; on success the store holds the new user.
    ///
    /// # Errors
    /// Returns the server's message for invalid input or a taken email.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, ClientError> {
        let body = json!({ "name": name, "email": email, "password": password });
        let user = self.post_for_user("/api/auth/register", &body).await?;
        self.store.dispatch(SessionEvent::SetUser(user.clone()));
        Ok(user)
    }

    /// Ask the server to clear the cookie, then clear local state regardless
    /// of the outcome.
    ///
    /// # Errors
    /// Returns the transport or HTTP error; the store is cleared either way.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), ClientError> {
        let result = self.post_logout().await;
        self.store.dispatch(SessionEvent::ClearUser);
        result
    }

    async fn post_logout(&self) -> Result<(), ClientError> {
        let response = self.http.post(self.url("/api/auth/logout")?).send().await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn get_current_user(&self) -> Result<UserProfile, ClientError> {
        let response = self.http.get(self.url("/api/auth/me")?).send().await?;
        let envelope: UserEnvelope = parse_json(ensure_success(response).await?).await?;
        Ok(envelope.user)
    }

    async fn post_for_user(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<UserProfile, ClientError> {
        let response = self.http.post(self.url(path)?).json(body).send().await?;
        let envelope: UserEnvelope = parse_json(ensure_success(response).await?).await?;
        Ok(envelope.user)
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::Config(format!("invalid path {path}: {err}")))
    }
}

async fn ensure_success(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<MessageEnvelope>()
        .await
        .map(|envelope| envelope.message)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });
    Err(ClientError::Http {
        status: status.as_u16(),
        message,
    })
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    response
        .json::<T>()
        .await
        .map_err(|err| ClientError::Parse(err.to_string()))
}

fn rejection_message(err: &ClientError) -> String {
    match err {
        ClientError::Http { .. } => FETCH_USER_FAILED.to_string(),
        ClientError::Timeout(_) => format!("{FETCH_USER_FAILED}: request timed out"),
        other => format!("{FETCH_USER_FAILED}: {other}"),
    }
}

/// `true` for statuses that mean "no valid session" rather than a server fault.
fn is_unauthenticated(err: &ClientError) -> bool {
    matches!(
        err,
        ClientError::Http { status, .. }
            if *status == StatusCode::UNAUTHORIZED.as_u16()
                || *status == StatusCode::NOT_FOUND.as_u16()
    )
}
