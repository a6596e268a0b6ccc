//! Error outcomes of the auth endpoints and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use super::types::{ErrorResponse, FieldError};
use crate::users::StoreError;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug)]
pub(crate) enum ApiError {
    /// Malformed or missing input.
    Validation(Vec<FieldError>),
    /// Bad email/password pair. Never says which one was wrong.
    InvalidCredentials,
    /// Absent, malformed, forged or expired token.
    Unauthorized,
    Conflict(&'static str),
    NotFound(&'static str),
    Internal(anyhow::Error),
}

impl ApiError {
    pub(crate) fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict => Self::Conflict("User with this email already exists"),
            StoreError::Database(err) => Self::Internal(err.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Validation(errors) => ErrorResponse {
                message: "Invalid input data".to_string(),
                errors,
            },
            Self::InvalidCredentials => ErrorResponse {
                message: INVALID_CREDENTIALS.to_string(),
                errors: Vec::new(),
            },
            Self::Unauthorized => ErrorResponse {
                message: "Unauthorized".to_string(),
                errors: Vec::new(),
            },
            Self::Conflict(message) | Self::NotFound(message) => ErrorResponse {
                message: message.to_string(),
                errors: Vec::new(),
            },
            Self::Internal(err) => {
                error!("Internal error: {err:#}");
                ErrorResponse {
                    message: "Internal server error".to_string(),
                    errors: Vec::new(),
                }
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError::Validation(Vec::new()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Conflict("dup").status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::NotFound("gone").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn store_conflict_maps_to_409() {
        let err: ApiError = StoreError::Conflict.into();
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }
}
