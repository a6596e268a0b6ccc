//! # Tessera
//!
//! Stateless token authentication and route authorization.
//!
//! A user signs in with email and password; the service checks the password
//! against a salted argon2id hash and answers with a signed, seven day token in an
//! `HttpOnly` cookie. Nothing is stored per session: every later request is
//! authenticated by verifying the token's signature and expiry.
//!
//! ## Pieces
//!
//! - [`password`]: hashing and constant-shape verification of passwords.
//! - [`token`]: signing and verifying HS256 tokens carrying the user identity.
//! - [`gate`]: the per-path decision (allow, or redirect to login / landing).
//! - [`session`]: the client-side session state machine and an HTTP client that drives it.
//! - [`users`]: the user store, in memory or `PostgreSQL` (`sql/schema.sql`).
//! - [`api`]: the axum application exposing `/api/auth/*`, `/health` and the OpenAPI document.
//!
//! Logging out only clears the cookie. A token copied elsewhere stays valid
//! until it expires; there is no server-side revocation.

pub mod api;
pub mod cli;
pub mod gate;
pub mod password;
pub mod session;
pub mod token;
pub mod users;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
