//! Server binary for the ambulance crew roster.
//!
//! Loads configuration, opens the data directory, and serves the HTTP
//! API until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `roster-config.yaml` and the environment
//! 3. Open the data directory, creating missing collection files
//! 4. Serve the HTTP API

mod config;
mod error;

use std::sync::Arc;

use roster_store::Database;
use roster_web::{AppState, ServerConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::error::AppError;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, the data directory, or the HTTP
/// listener cannot be set up.
#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("roster-server starting");

    // 2. Load configuration.
    let config = AppConfig::load()?;
    info!(
        host = config.server.host,
        port = config.server.port,
        data_dir = %config.storage.data_dir.display(),
        "Configuration loaded"
    );
    if config.uses_placeholder_secret() {
        warn!("SESSION_SECRET is not set; using the built-in placeholder");
    }

    // 3. Open the data directory.
    let db = Database::open(config.storage.data_dir.clone())?;
    let state = Arc::new(AppState::new(db));

    // 4. Serve.
    let server_config = ServerConfig {
        host: config.server.host,
        port: config.server.port,
    };
    roster_web::start_server(&server_config, state).await?;

    info!("roster-server exited cleanly");
    Ok(())
}
