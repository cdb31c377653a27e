//! Application setup and initialization
//!
//! Initialization logic extracted from main.rs for better organization and
//! testability. Integration tests call [`routes::setup_routes`] directly with
//! fake services; the binary goes through [`initialize_app`].

pub mod routes;
pub mod server;
pub mod services;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use backlot_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    validation::validate_config(&config).context("Configuration validation failed")?;

    backlot_infra::telemetry::init_telemetry()
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!("Configuration loaded and validated successfully");

    let state = services::initialize_services(&config)?;

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
