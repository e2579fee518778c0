use axum::extract::State;
use axum::{routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use sensorlink_core::reading::Freshness;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `"ok"` while readings are fresh, `"degraded"` otherwise.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    pub freshness: Freshness,
    /// Readings published since startup.
    pub readings_received: u64,
}

/// GET /health -- reports whether the device is delivering data.
///
/// Always 200: a silent device is a degraded service, not a dead one.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let freshness = state
        .store
        .latest()
        .freshness(Utc::now(), state.config.stale_after());

    let status = match freshness {
        Freshness::Fresh => "ok",
        Freshness::Waiting | Freshness::Stale => "degraded",
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        freshness,
        readings_received: state.store.published_count(),
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
