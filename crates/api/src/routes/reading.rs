use axum::extract::State;
use axum::{routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use sensorlink_core::reading::{Freshness, Reading};

use crate::response::DataResponse;
use crate::state::AppState;

/// JSON view of the latest reading.
#[derive(Debug, Serialize)]
pub struct ReadingResponse {
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub device_time: String,
    /// `null` until the first reading arrives.
    pub received_at: Option<DateTime<Utc>>,
    pub freshness: Freshness,
}

impl ReadingResponse {
    pub fn from_reading(reading: &Reading, freshness: Freshness) -> Self {
        Self {
            temperature: reading.temperature(),
            humidity: reading.humidity(),
            pressure: reading.pressure(),
            device_time: reading.device_time().to_string(),
            received_at: (!reading.is_placeholder()).then(|| reading.received_at()),
            freshness,
        }
    }
}

/// GET /api/v1/reading
async fn latest_reading(State(state): State<AppState>) -> Json<DataResponse<ReadingResponse>> {
    let reading = state.store.latest();
    let freshness = reading.freshness(Utc::now(), state.config.stale_after());

    Json(DataResponse {
        data: ReadingResponse::from_reading(&reading, freshness),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/reading", get(latest_reading))
}
