//! Optional bearer token guard for conversion routes

use adgate_core::{unauthorized, Problem};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::warn;

use super::types::AppState;

/// Reject requests without the configured bearer token.
///
/// Passes everything through when no token is configured.
pub async fn require_api_token(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.api_token.as_deref() else {
        return next.run(request).await;
    };

    let auth_header = request
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok());

    match auth_header.and_then(|header| header.strip_prefix("Bearer ")) {
        Some(token) if token == expected => next.run(request).await,
        Some(_) => {
            warn!("Rejected request with an invalid API token");
            unauthorized_response("Invalid API token")
        }
        None => unauthorized_response(
            "Missing or malformed authorization header. Use: Bearer <token>",
        ),
    }
}

fn unauthorized_response(detail: &str) -> Response {
    let problem: Problem = unauthorized().detail(detail).build();
    problem.into_response()
}
