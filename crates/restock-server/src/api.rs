//! HTTP surface: the reconciled subscriber list and a liveness probe.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use restock_core::{AppConfig, EnrichedSignupRecord};
use restock_pipeline::run_reconciliation;

use crate::middleware::request_id;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
}

/// Success body: `{ "subscribers": [...] }`.
#[derive(Debug, Serialize)]
struct SubscribersResponse {
    subscribers: Vec<EnrichedSignupRecord>,
}

/// Total-failure body: `{ "error": "...", "subscribers": [] }`.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    subscribers: Vec<EnrichedSignupRecord>,
}

#[derive(Debug, Serialize)]
struct HealthData {
    status: &'static str,
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/subscribers", get(list_subscribers))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id))
                .layer(TraceLayer::new_for_http())
                .layer(build_cors()),
        )
        .with_state(state)
}

async fn health() -> Json<HealthData> {
    Json(HealthData { status: "ok" })
}

/// Runs one reconciliation and renders the ordered record list.
///
/// Only a total failure (profile-list fetch, client construction) produces a
/// non-2xx status; every partial upstream failure has already been degraded
/// to empty data or unknown fields inside the pipeline.
async fn list_subscribers(State(state): State<AppState>) -> Response {
    match run_reconciliation(&state.config).await {
        Ok(subscribers) => (StatusCode::OK, Json(SubscribersResponse { subscribers })).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "reconciliation run failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: e.to_string(),
                    subscribers: Vec::new(),
                }),
            )
                .into_response()
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE])
}
