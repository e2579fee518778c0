use std::sync::Arc;

use sensorlink_core::store::LatestValueStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Latest reading published by the acquisition loop. Handlers only read it.
    pub store: Arc<LatestValueStore>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
