//! Input normalization and validation for auth payloads.

use regex::Regex;

use super::types::{FieldError, LoginRequest, RegisterRequest};

pub(crate) const MIN_NAME_CHARS: usize = 2;
pub(crate) const MIN_PASSWORD_CHARS: usize = 8;

/// Normalize an email for lookup/uniqueness checks.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
pub(crate) fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

/// Validated sign-in input.
#[derive(Debug)]
pub(crate) struct Credentials {
    pub email: String,
    pub password: String,
}

/// Validated registration input.
#[derive(Debug)]
pub(crate) struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

pub(crate) fn validate_login(request: LoginRequest) -> Result<Credentials, Vec<FieldError>> {
    let email = normalize_email(&request.email);
    let mut errors = Vec::new();
    if !valid_email(&email) {
        errors.push(FieldError::new("email", "Invalid email"));
    }
    if request.password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    }

    if errors.is_empty() {
        Ok(Credentials {
            email,
            password: request.password,
        })
    } else {
        Err(errors)
    }
}

pub(crate) fn validate_registration(
    request: RegisterRequest,
) -> Result<Registration, Vec<FieldError>> {
    let name = request.name.trim().to_string();
    let email = normalize_email(&request.email);
    let mut errors = Vec::new();
    if name.chars().count() < MIN_NAME_CHARS {
        errors.push(FieldError::new(
            "name",
            "Name must contain at least 2 characters",
        ));
    }
    if !valid_email(&email) {
        errors.push(FieldError::new("email", "Invalid email"));
    }
    if request.password.chars().count() < MIN_PASSWORD_CHARS {
        errors.push(FieldError::new(
            "password",
            "Password must contain at least 8 characters",
        ));
    }

    if errors.is_empty() {
        Ok(Registration {
            name,
            email,
            password: request.password,
        })
    } else {
        Err(errors)
    }
}
