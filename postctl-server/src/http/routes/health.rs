//! Liveness and storage reachability

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::http::server::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` when the store answers, `unavailable` otherwise
    pub status: &'static str,
    pub database: &'static str,
    pub version: &'static str,
}

/// GET /health
///
/// 503 while the content store cannot be reached.
async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let version = env!("CARGO_PKG_VERSION");

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                database: "reachable",
                version,
            }),
        ),
        Err(err) => {
            tracing::warn!("health check: store unreachable: {}", err);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable",
                    database: "unreachable",
                    version,
                }),
            )
        }
    }
}

/// Health routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health))
}
