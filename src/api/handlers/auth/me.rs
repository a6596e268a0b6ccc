use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::{debug, instrument};

use super::{
    cookie::token_from_request,
    error::ApiError,
    state::AuthState,
    types::{ErrorResponse, MeResponse},
};
use crate::token::Verification;

#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Missing, invalid or expired token", body = ErrorResponse),
        (status = 404, description = "User no longer exists", body = ErrorResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(headers, auth_state))]
pub async fn me(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(token) = token_from_request(&headers) else {
        return Err(ApiError::Unauthorized);
    };

    let Verification::Valid(claims) = auth_state.tokens().verify(&token) else {
        return Err(ApiError::Unauthorized);
    };

    let Some(user) = auth_state.users().find_by_id(&claims.user_id).await? else {
        debug!(user_id = %claims.user_id, "Token refers to a missing user");
        return Err(ApiError::NotFound("User not found"));
    };

    Ok((
        StatusCode::OK,
        Json(MeResponse {
            user: user.profile(),
        }),
    ))
}
