//! Server startup and graceful shutdown

use anyhow::Result;
use axum::Router;
use backlot_core::Config;
use std::net::SocketAddr;

/// Bind the listener and serve until a shutdown signal arrives.
///
/// The app is served with connect info so rate limiting can fall back to the
/// peer address when no proxy headers are present.
pub async fn start_server(config: &Config, app: Router) -> Result<()> {
    let addr = format!("0.0.0.0:{}", config.server_port);
    tracing::info!(addr = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        environment = %config.environment,
        asset_cdn = %config.asset_cdn_base_url,
        contact_rate_limit = config.contact_rate_limit_max,
        contact_window_secs = config.contact_rate_limit_window_secs,
        "Server ready and accepting connections"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves when SIGINT or SIGTERM is received.
///
/// # Panics
///
/// Panics if the signal handlers cannot be installed.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
    backlot_infra::telemetry::shutdown_telemetry().await;
}
