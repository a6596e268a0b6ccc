//! Request/response types for auth endpoints.

use crate::users::UserProfile;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Missing fields deserialize as empty strings so validation can report them
// per field instead of rejecting the whole body.
#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Returned by login and register alongside the `token` cookie.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    pub message: String,
    pub user: UserProfile,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MeResponse {
    pub user: UserProfile,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn login_request_tolerates_missing_fields() -> Result<()> {
        let decoded: LoginRequest = serde_json::from_value(serde_json::json!({
            "email": "a@b.com"
        }))?;
        assert_eq!(decoded.email, "a@b.com");
        assert!(decoded.password.is_empty());
        Ok(())
    }

    #[test]
    fn error_response_omits_empty_field_errors() -> Result<()> {
        let value = serde_json::to_value(ErrorResponse {
            message: "Unauthorized".to_string(),
            errors: Vec::new(),
        })?;
        assert_eq!(value, serde_json::json!({ "message": "Unauthorized" }));
        Ok(())
    }
}
