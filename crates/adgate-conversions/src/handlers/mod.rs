//! HTTP handlers for the conversion gateway

mod auth;
mod conversions;
mod types;

pub use auth::require_api_token;
pub use types::{AppState, ConversionResponse, GoogleConversionRequest, HealthResponse};

use axum::{middleware, routing::get, Json, Router};
use std::sync::Arc;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Configure gateway routes.
///
/// Conversion routes sit behind [`require_api_token`]; `/health` is open.
pub fn configure_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let conversion_routes = conversions::routes()
        .route_layer(middleware::from_fn_with_state(state, require_api_token));

    Router::new()
        .route("/health", get(health))
        .merge(conversion_routes)
}

/// Liveness check
#[utoipa::path(
    tag = "Health",
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut http_scheme = Http::new(HttpAuthScheme::Bearer);
        http_scheme.description =
            Some("API token set with `ADGATE_API_TOKEN`. Use format: `Bearer <token>`.".to_string());

        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme("bearer_auth", SecurityScheme::Http(http_scheme));
    }
}

#[derive(OpenApi)]
#[openapi(
    info(title = "Adgate Conversion Gateway", description = "Server-side conversion uploads to Google Ads"),
    paths(
        conversions::upload_google_conversion,
        health,
    ),
    components(
        schemas(
            types::GoogleConversionRequest,
            types::ConversionResponse,
            types::HealthResponse,
            adgate_core::ProblemDetails,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Conversions", description = "Conversion uploads to advertising platforms"),
        (name = "Health", description = "Service health")
    )
)]
pub struct ConversionApiDoc;
