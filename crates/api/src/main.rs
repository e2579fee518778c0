//! `sensorlink-api` -- sensor station server.
//!
//! Reads environmental samples from a serial-attached microcontroller on a
//! background task and serves the most recent one over HTTP.
//!
//! Configuration is read from the environment (and `.env`); see
//! [`AcquisitionConfig::from_env`] and [`ServerConfig::from_env`].

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sensorlink_agent::acquisition::{self, Acquisition};
use sensorlink_agent::config::AcquisitionConfig;
use sensorlink_api::config::ServerConfig;
use sensorlink_api::router::build_app_router;
use sensorlink_api::state::AppState;
use sensorlink_core::store::LatestValueStore;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "sensorlink_api=info,sensorlink_agent=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let server_config = ServerConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid server configuration");
        std::process::exit(1);
    });
    let acquisition_config = AcquisitionConfig::from_env().unwrap_or_else(|e| {
        tracing::error!(error = %e, "Invalid acquisition configuration");
        std::process::exit(1);
    });
    tracing::info!(
        host = %server_config.host,
        port = server_config.port,
        serial_port = %acquisition_config.port,
        baud_rate = acquisition_config.baud_rate,
        "Loaded configuration",
    );

    // --- Acquisition ---
    let store = Arc::new(LatestValueStore::new());
    let cancel = CancellationToken::new();
    let acquisition_handle = acquisition::spawn(
        Acquisition::serial(&acquisition_config, Arc::clone(&store)),
        cancel.clone(),
    );

    // --- App state ---
    let state = AppState {
        store,
        config: Arc::new(server_config.clone()),
    };
    let app = build_app_router(state, &server_config);

    // --- Start server ---
    let ip = server_config.host.parse::<IpAddr>().unwrap_or_else(|e| {
        tracing::error!(host = %server_config.host, error = %e, "Invalid HOST address");
        std::process::exit(1);
    });
    let addr = SocketAddr::new(ip, server_config.port);
    tracing::info!(%addr, "Starting server");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "Failed to bind to address");
            cancel.cancel();
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "Server error");
    }

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, stopping acquisition");
    cancel.cancel();
    let wait = Duration::from_secs(server_config.shutdown_timeout_secs);
    if tokio::time::timeout(wait, acquisition_handle).await.is_err() {
        tracing::warn!("Acquisition loop did not stop in time");
    }

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
