//! Client-side session state.
//!
//! [`AuthSessionState`] mirrors what the server says about the current token.
//! It only changes through [`reduce`], driven by [`SessionEvent`]s, and the
//! [`SessionStore`] publishes every new state to subscribers. The network side
//! lives in [`client`].

pub mod client;

pub use client::{ClientError, SessionClient};

use crate::users::UserProfile;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSessionState {
    pub user: Option<UserProfile>,
    pub is_authenticated: bool,
    pub status: Status,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A current-user fetch was dispatched.
    FetchPending,
    FetchFulfilled(UserProfile),
    FetchRejected(String),
    /// Direct assignment after a successful login or registration.
    SetUser(UserProfile),
    /// Logout.
    ClearUser,
}

/// Pure transition function.
///
/// Fetch outcomes only apply while a fetch is in flight, so a response that
/// lands after `ClearUser` cannot resurrect a logged-out session.
#[must_use]
pub fn reduce(state: &AuthSessionState, event: SessionEvent) -> AuthSessionState {
    match event {
        SessionEvent::FetchPending => AuthSessionState {
            status: Status::Loading,
            ..state.clone()
        },
        SessionEvent::FetchFulfilled(user) if state.status == Status::Loading => {
            AuthSessionState {
                user: Some(user),
                is_authenticated: true,
                status: Status::Succeeded,
                error: None,
            }
        }
        SessionEvent::FetchRejected(message) if state.status == Status::Loading => {
            AuthSessionState {
                user: None,
                is_authenticated: false,
                status: Status::Failed,
                error: Some(message),
            }
        }
        SessionEvent::FetchFulfilled(_) | SessionEvent::FetchRejected(_) => state.clone(),
        SessionEvent::SetUser(user) => AuthSessionState {
            user: Some(user),
            is_authenticated: true,
            status: Status::Succeeded,
            error: None,
        },
        SessionEvent::ClearUser => AuthSessionState::default(),
    }
}

/// Observable container for [`AuthSessionState`].
#[derive(Debug, Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<AuthSessionState>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(AuthSessionState::default());
        Self { tx: Arc::new(tx) }
    }

    #[must_use]
    pub fn state(&self) -> AuthSessionState {
        self.tx.borrow().clone()
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.tx.borrow().status
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthSessionState> {
        self.tx.subscribe()
    }

    pub fn dispatch(&self, event: SessionEvent) {
        self.tx.send_modify(|state| *state = reduce(state, event));
    }

    /// Move `idle` to `loading` and return `true`; any other state is left
    /// untouched and `false` is returned. Check and transition are atomic, so
    /// at most one fetch is in flight per store.
    pub fn begin_fetch(&self) -> bool {
        self.tx.send_if_modified(|state| {
            if state.status == Status::Idle {
                *state = reduce(state, SessionEvent::FetchPending);
                true
            } else {
                false
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn al() -> UserProfile {
        UserProfile {
            id: "u-1".to_string(),
            name: "Al".to_string(),
            email: "a@b.com".to_string(),
        }
    }

    #[test]
    fn starts_idle_and_anonymous() {
        let state = AuthSessionState::default();
        assert_eq!(state.status, Status::Idle);
        assert!(!state.is_authenticated);
        assert!(state.user.is_none());
        assert!(state.error.is_none());
    }

    #[test]
    fn fetch_success_then_logout() {
        let state = AuthSessionState::default();
        let state = reduce(&state, SessionEvent::FetchPending);
        assert_eq!(state.status, Status::Loading);

        let state = reduce(&state, SessionEvent::FetchFulfilled(al()));
        assert_eq!(state.status, Status::Succeeded);
        assert!(state.is_authenticated);
        assert_eq!(state.user, Some(al()));

        let state = reduce(&state, SessionEvent::ClearUser);
        assert_eq!(state, AuthSessionState::default());
    }

    #[test]
    fn fetch_failure_clears_user_and_records_error() {
        let loading = AuthSessionState {
            user: Some(al()),
            is_authenticated: true,
            status: Status::Loading,
            error: None,
        };
        let state = reduce(&loading, SessionEvent::FetchRejected("Unauthorized".to_string()));
        assert_eq!(state.status, Status::Failed);
        assert!(!state.is_authenticated);
        assert!(state.user.is_none());
        assert_eq!(state.error.as_deref(), Some("Unauthorized"));
    }

    #[test]
    fn set_user_from_any_state() {
        for status in [Status::Idle, Status::Loading, Status::Succeeded, Status::Failed] {
            let before = AuthSessionState {
                status,
                error: Some("stale".to_string()),
                ..AuthSessionState::default()
            };
            let state = reduce(&before, SessionEvent::SetUser(al()));
            assert_eq!(state.status, Status::Succeeded);
            assert!(state.is_authenticated);
            assert_eq!(state.user, Some(al()));
            assert!(state.error.is_none());
        }
    }

    #[test]
    fn clear_user_from_any_state() {
        for status in [Status::Idle, Status::Loading, Status::Succeeded, Status::Failed] {
            let before = AuthSessionState {
                user: Some(al()),
                is_authenticated: true,
                status,
                error: Some("boom".to_string()),
            };
            assert_eq!(
                reduce(&before, SessionEvent::ClearUser),
                AuthSessionState::default()
            );
        }
    }

    #[test]
    fn late_fetch_outcome_is_ignored() {
        let idle = AuthSessionState::default();
        assert_eq!(reduce(&idle, SessionEvent::FetchFulfilled(al())), idle);
        assert_eq!(
            reduce(&idle, SessionEvent::FetchRejected("late".to_string())),
            idle
        );
    }

    #[test]
    fn refetch_from_resolved_states_goes_back_to_loading() {
        let failed = AuthSessionState {
            status: Status::Failed,
            error: Some("boom".to_string()),
            ..AuthSessionState::default()
        };
        assert_eq!(
            reduce(&failed, SessionEvent::FetchPending).status,
            Status::Loading
        );
    }

    #[test]
    fn store_only_begins_fetch_from_idle() {
        let store = SessionStore::new();
        assert!(store.begin_fetch());
        assert_eq!(store.status(), Status::Loading);
        assert!(!store.begin_fetch());

        store.dispatch(SessionEvent::FetchFulfilled(al()));
        assert!(!store.begin_fetch());
        assert_eq!(store.status(), Status::Succeeded);

        store.dispatch(SessionEvent::ClearUser);
        assert!(store.begin_fetch());
    }

    #[test]
    fn store_publishes_changes() {
        let store = SessionStore::new();
        let mut rx = store.subscribe();
        store.dispatch(SessionEvent::SetUser(al()));
        assert!(rx.has_changed().unwrap_or(false));
        assert!(rx.borrow_and_update().is_authenticated);
    }

    #[test]
    fn state_serializes_like_the_frontend_store() -> anyhow::Result<()> {
        let value = serde_json::to_value(AuthSessionState::default())?;
        assert_eq!(
            value,
            serde_json::json!({
                "user": null,
                "isAuthenticated": false,
                "status": "idle",
                "error": null,
            })
        );
        Ok(())
    }
}
