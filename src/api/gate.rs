use crate::{api::handlers::auth::cookie::token_from_cookies, gate::Gate};
use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tracing::debug;

/// Wraps every route and the fallback, so unmatched page paths are gated too.
pub async fn enforce(State(gate): State<Arc<Gate>>, request: Request<Body>, next: Next) -> Response {
    let token = token_from_cookies(request.headers());
    let decision = gate.decide(request.uri().path(), token.as_deref());

    match decision.location() {
        Some(location) => {
            debug!(path = %request.uri().path(), %location, "Gate redirect");
            Redirect::temporary(&location).into_response()
        }
        None => next.run(request).await,
    }
}
