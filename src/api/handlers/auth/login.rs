use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::{
    cookie::token_cookie,
    error::ApiError,
    state::AuthState,
    types::{AuthResponse, ErrorResponse, FieldError, LoginRequest},
    utils::validate_login,
};
use crate::users::User;

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful; sets the `token` cookie", body = AuthResponse),
        (status = 400, description = "Invalid input data", body = ErrorResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(auth_state, payload))]
pub async fn login(
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::Validation(vec![FieldError::new(
            "body",
            "Expected a JSON object",
        )]));
    };
    let credentials = validate_login(request).map_err(ApiError::Validation)?;

    let user = auth_state.users().find_by_email(&credentials.email).await?;
    let user = authenticate(&auth_state, user, credentials.password).await?;

    let token = auth_state
        .tokens()
        .sign(&user_identity(&user))
        .map_err(|err| ApiError::Internal(err.into()))?;
    let mut headers = HeaderMap::new();
    headers.insert(
        SET_COOKIE,
        token_cookie(auth_state.config(), &token).map_err(|err| ApiError::Internal(err.into()))?,
    );

    debug!(user_id = %user.id, "Login successful");

    Ok((
        StatusCode::OK,
        headers,
        Json(AuthResponse {
            message: "Login successful".to_string(),
            user: user.profile(),
        }),
    ))
}

/// Check the password, spending one hash verification whether or not the user exists.
async fn authenticate(
    auth_state: &AuthState,
    user: Option<User>,
    password: String,
) -> Result<User, ApiError> {
    match user {
        Some(user) => {
            if auth_state
                .verify_password(password, user.password_hash.clone())
                .await
            {
                Ok(user)
            } else {
                debug!("Password mismatch");
                Err(ApiError::InvalidCredentials)
            }
        }
        None => {
            let _ = auth_state
                .verify_password(password, auth_state.decoy_hash().to_string())
                .await;
            debug!("Unknown email");
            Err(ApiError::InvalidCredentials)
        }
    }
}

pub(super) fn user_identity(user: &User) -> crate::token::Identity {
    crate::token::Identity {
        user_id: user.id.clone(),
        email: user.email.clone(),
        name: user.name.clone(),
    }
}
