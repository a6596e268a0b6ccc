//! The `token` cookie: issuing, clearing and reading it back.

use axum::http::{
    header::{InvalidHeaderValue, AUTHORIZATION, COOKIE},
    HeaderMap, HeaderValue,
};

use super::state::AuthConfig;
use crate::token::TOKEN_TTL_SECONDS;

pub const TOKEN_COOKIE_NAME: &str = "token";

/// Build the `HttpOnly` cookie carrying a freshly signed token.
pub(crate) fn token_cookie(
    config: &AuthConfig,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{TOKEN_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Strict; Max-Age={TOKEN_TTL_SECONDS}"
    );
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Overwrite the cookie with an empty, already-expired value.
pub(crate) fn clear_token_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie =
        format!("{TOKEN_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0");
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Token from the `token` cookie; empty values count as absent.
pub(crate) fn token_from_cookies(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (key, val) = pair.trim().split_once('=')?;
            (key.trim() == TOKEN_COOKIE_NAME).then(|| val.trim().to_string())
        })
        .filter(|token| !token.is_empty())
}

/// Token from the cookie, falling back to `Authorization: Bearer` for non-browser clients.
pub(crate) fn token_from_request(headers: &HeaderMap) -> Option<String> {
    token_from_cookies(headers).or_else(|| bearer_token(headers))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            if let Ok(value) = HeaderValue::from_str(value) {
                map.append(*name, value);
            }
        }
        map
    }

    #[test]
    fn issued_cookie_attributes() -> Result<(), InvalidHeaderValue> {
        let cookie = token_cookie(&AuthConfig::new("http://localhost:3000".to_string()), "abc")?;
        assert_eq!(
            cookie,
            "token=abc; Path=/; HttpOnly; SameSite=Strict; Max-Age=604800"
        );
        let secure = token_cookie(&AuthConfig::new("https://tessera.dev".to_string()), "abc")?;
        assert!(secure.to_str().is_ok_and(|value| value.ends_with("; Secure")));
        Ok(())
    }

    #[test]
    fn cleared_cookie_expires_immediately() -> Result<(), InvalidHeaderValue> {
        let cookie = clear_token_cookie(&AuthConfig::new("http://localhost:3000".to_string()))?;
        assert_eq!(cookie, "token=; Path=/; HttpOnly; SameSite=Strict; Max-Age=0");
        Ok(())
    }

    #[test]
    fn reads_token_among_other_cookies() {
        let map = headers(&[("cookie", "theme=dark; token=abc.def.ghi; lang=en")]);
        assert_eq!(token_from_cookies(&map).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn reads_token_from_any_cookie_header() {
        let map = headers(&[("cookie", "theme=dark"), ("cookie", "token=xyz")]);
        assert_eq!(token_from_cookies(&map).as_deref(), Some("xyz"));
    }

    #[test]
    fn ignores_similar_names_and_empty_values() {
        assert!(token_from_cookies(&headers(&[("cookie", "tokens=abc")])).is_none());
        assert!(token_from_cookies(&headers(&[("cookie", "token=")])).is_none());
        assert!(token_from_cookies(&HeaderMap::new()).is_none());
    }

    #[test]
    fn bearer_is_a_fallback() {
        let map = headers(&[("authorization", "Bearer abc")]);
        assert_eq!(token_from_request(&map).as_deref(), Some("abc"));
        assert!(token_from_cookies(&map).is_none());

        let both = headers(&[("authorization", "Bearer abc"), ("cookie", "token=xyz")]);
        assert_eq!(token_from_request(&both).as_deref(), Some("xyz"));

        assert!(token_from_request(&headers(&[("authorization", "Bearer ")])).is_none());
        assert!(token_from_request(&headers(&[("authorization", "Basic abc")])).is_none());
    }
}
