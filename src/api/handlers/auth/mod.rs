//! Auth endpoints: sign-in, registration, current session and logout.
//!
//! Successful sign-in and registration mint a token with the
//! [`TokenService`](crate::token::TokenService) and hand it back as the
//! `HttpOnly` `token` cookie. Every failure on the credential path answers with
//! the same generic message, and every token failure (absent, malformed,
//! forged, expired) is the same `401`, so responses never tell an attacker
//! which part was wrong.

pub(crate) mod cookie;
mod error;
pub(crate) mod login;
pub(crate) mod logout;
pub(crate) mod me;
pub(crate) mod register;
mod state;
pub(crate) mod types;
mod utils;

pub use cookie::TOKEN_COOKIE_NAME;
pub use state::{AuthConfig, AuthState};
