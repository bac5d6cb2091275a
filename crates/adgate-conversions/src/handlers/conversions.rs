//! Conversion upload handlers

use adgate_core::{bad_request, internal_server_error, unprocessable_entity, Problem};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use std::sync::Arc;
use tracing::debug;

use super::types::{AppState, ConversionResponse, GoogleConversionRequest};
use crate::errors::ConversionError;
use crate::services::UploadOutcome;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/v1/conversions/google", post(upload_google_conversion))
}

/// Upload a conversion to Google Ads
///
/// Identity fields are normalized and SHA-256 hashed before upload; raw
/// values never leave the gateway.
#[utoipa::path(
    tag = "Conversions",
    post,
    path = "/v1/conversions/google",
    request_body = GoogleConversionRequest,
    responses(
        (status = 201, description = "Conversion uploaded", body = ConversionResponse),
        (status = 400, description = "Google Ads rejected the conversion (partial failure)"),
        (status = 401, description = "Missing or invalid API token"),
        (status = 422, description = "Request failed validation"),
        (status = 500, description = "Google Ads API error")
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload_google_conversion(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GoogleConversionRequest>, JsonRejection>,
) -> Result<impl IntoResponse, Problem> {
    // Undecodable bodies are validation failures, like any other bad input
    let Json(request) = payload
        .map_err(|rejection| unprocessable_entity().detail(rejection.body_text()).build())?;

    let event = request.into_event().map_err(validation_problem)?;

    debug!("Received conversion for gclid {}", event.gclid);

    let outcome = state
        .conversion_service
        .upload_click_conversion(&event)
        .await
        .map_err(validation_problem)?;

    match outcome {
        UploadOutcome::Success(receipt) => Ok((
            StatusCode::CREATED,
            Json(ConversionResponse::from(receipt)),
        )),
        UploadOutcome::PartialFailure { detail } => Err(bad_request()
            .title("Partial Failure")
            .detail(detail)
            .value("error_code", "PARTIAL_FAILURE")
            .build()),
        UploadOutcome::UpstreamError { detail } => Err(internal_server_error()
            .title("Upstream Error")
            .detail(detail)
            .value("error_code", "UPSTREAM_ERROR")
            .build()),
    }
}

fn validation_problem(error: ConversionError) -> Problem {
    match error {
        ConversionError::Validation(msg) => unprocessable_entity().detail(msg).build(),
        other => internal_server_error().detail(other.to_string()).build(),
    }
}
