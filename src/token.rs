//! Signed session tokens.
//!
//! Tokens are HS256 JWTs carrying [`TokenClaims`]. Validity is a pure function
//! of the signature and `exp`: nothing is stored server side, so a token stays
//! cryptographically valid until it expires even after the client discards it
//! on logout.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::debug;

/// Fixed token lifetime: 7 days.
pub const TOKEN_TTL_SECONDS: i64 = 60 * 60 * 24 * 7;

#[derive(Debug, Error)]
pub enum Error {
    #[error("token secret must not be empty")]
    EmptySecret,
    #[error("failed to sign token: {0}")]
    Sign(#[from] jsonwebtoken::errors::Error),
}

/// The principal a token is minted for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub name: String,
}

/// Payload embedded in every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    pub user_id: String,
    pub email: String,
    pub name: String,
    #[serde(rename = "iat")]
    pub issued_at: i64,
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

impl TokenClaims {
    #[must_use]
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.user_id.clone(),
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }
}

/// Outcome of [`TokenService::verify`]. Expired, forged and malformed tokens
/// all collapse into `Invalid`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Valid(TokenClaims),
    Invalid,
}

impl Verification {
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    #[must_use]
    pub fn into_claims(self) -> Option<TokenClaims> {
        match self {
            Self::Valid(claims) => Some(claims),
            Self::Invalid => None,
        }
    }
}

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &Algorithm::HS256)
            .field("ttl_seconds", &TOKEN_TTL_SECONDS)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Build the service around the process-wide signing secret.
    ///
    /// # Errors
    /// Returns [`Error::EmptySecret`] for an empty or blank secret.
    pub fn new(secret: &SecretString) -> Result<Self, Error> {
        let secret = secret.expose_secret();
        if secret.trim().is_empty() {
            return Err(Error::EmptySecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked in `verify_at` against an explicit clock with no leeway.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    /// Mint a token for `identity`, valid for [`TOKEN_TTL_SECONDS`] from now.
    ///
    /// # Errors
    /// Returns [`Error::Sign`] if the claims cannot be encoded.
    pub fn sign(&self, identity: &Identity) -> Result<String, Error> {
        self.sign_at(identity, now_unix_seconds())
    }

    /// Same as [`sign`](Self::sign) with an explicit issue time.
    ///
    /// # Errors
    /// Returns [`Error::Sign`] if the claims cannot be encoded.
    pub fn sign_at(&self, identity: &Identity, now: i64) -> Result<String, Error> {
        let claims = TokenClaims {
            user_id: identity.user_id.clone(),
            email: identity.email.clone(),
            name: identity.name.clone(),
            issued_at: now,
            expires_at: now.saturating_add(TOKEN_TTL_SECONDS),
        };
        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?)
    }

    #[must_use]
    pub fn verify(&self, token: &str) -> Verification {
        self.verify_at(token, now_unix_seconds())
    }

    /// Verify `token` as of `now` (Unix seconds).
    #[must_use]
    pub fn verify_at(&self, token: &str, now: i64) -> Verification {
        let claims = match decode::<TokenClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => data.claims,
            Err(err) => {
                debug!("token rejected: {err}");
                return Verification::Invalid;
            }
        };

        if claims.expires_at <= now {
            debug!("token rejected: expired at {}", claims.expires_at);
            return Verification::Invalid;
        }

        Verification::Valid(claims)
    }
}

/// Current time in Unix seconds; clocks before the epoch read as 0.
#[must_use]
pub fn now_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX)
        })
}

#[cfg(test)]
pub(crate) fn test_service(secret: &str) -> TokenService {
    TokenService::new(&SecretString::from(secret.to_string()))
        .unwrap_or_else(|err| panic!("test secret rejected: {err}"))
}
