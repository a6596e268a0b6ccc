use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    cookie::token_cookie,
    error::ApiError,
    login::user_identity,
    state::AuthState,
    types::{AuthResponse, ErrorResponse, FieldError, RegisterRequest},
    utils::validate_registration,
};
use crate::users::NewUser;

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered; sets the `token` cookie", body = AuthResponse),
        (status = 400, description = "Invalid input data", body = ErrorResponse),
        (status = 409, description = "User with this email already exists", body = ErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(auth_state, payload))]
pub async fn register(
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<RegisterRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::Validation(vec![FieldError::new(
            "body",
            "Expected a JSON object",
        )]));
    };
    let registration = validate_registration(request).map_err(ApiError::Validation)?;

    // Cheap pre-check; the store still enforces uniqueness for concurrent signups.
    if auth_state
        .users()
        .find_by_email(&registration.email)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict("User with this email already exists"));
    }

    let password_hash = auth_state
        .hash_password(registration.password)
        .await
        .map_err(ApiError::Internal)?;

    let user = auth_state
        .users()
        .create(NewUser {
            name: registration.name,
            email: registration.email,
            password_hash,
        })
        .await?;

    let token = auth_state
        .tokens()
        .sign(&user_identity(&user))
        .map_err(|err| ApiError::Internal(err.into()))?;
    let mut headers = HeaderMap::new();
    headers.insert(
        SET_COOKIE,
        token_cookie(auth_state.config(), &token).map_err(|err| ApiError::Internal(err.into()))?,
    );

    info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        headers,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            user: user.profile(),
        }),
    ))
}
