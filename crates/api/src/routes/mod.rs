pub mod health;
pub mod page;
pub mod reading;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /reading        GET latest reading as JSON
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().merge(reading::router())
}
