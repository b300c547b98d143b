//! HTTP surface: router, CORS, body limit and the JSON handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use server_api::ActionResponse;
use shared::{
    error::{ApiError, ErrorCode},
    protocol::UserAction,
};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
};
use tracing::warn;

use crate::{app_state::AppState, config::Settings, stream::stream_ui};

pub(crate) const MAX_BODY_BYTES: usize = 1024 * 1024;

pub(crate) fn build_router(state: Arc<AppState>, settings: &Settings) -> Router {
    Router::new()
        .route("/api/a2ui/stream", get(stream_ui))
        .route("/api/a2ui/action", post(handle_action))
        .route("/health", get(health))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(cors_layer(&settings.cors_origins))
        .with_state(state)
}

/// Configured origins only, with credentials. Wildcards and unparseable
/// origins are skipped.
pub(crate) fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) if value != "*" => Some(value),
            _ => {
                warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

async fn handle_action(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<UserAction>, JsonRejection>,
) -> Result<Json<ActionResponse>, (StatusCode, Json<ApiError>)> {
    let Json(action) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "rejected action body");
        (
            rejection.status(),
            Json(ApiError::new(ErrorCode::Validation, rejection.body_text())),
        )
    })?;
    Ok(Json(server_api::handle_action(&state.api, &action).await))
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
