//! Listener setup and shutdown for the roster API.
//!
//! [`start_server`] resolves the configured host (an IP address or a name
//! such as `localhost`), serves [`build_router`] on it, and drains
//! in-flight requests when `Ctrl-C` arrives. Store calls already run on
//! the blocking pool, so a slow disk never stalls the accept loop.

use std::io;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::router::build_router;
use crate::state::AppState;

/// Where the API listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host name or IP address to bind.
    pub host: String,
    /// TCP port; `0` picks a free one.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 5000,
        }
    }
}

impl ServerConfig {
    /// `host:port` as written in the configuration.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Serve the roster API until `Ctrl-C`.
///
/// # Errors
///
/// Returns [`ServerError::Bind`] if the address cannot be resolved or
/// bound, and [`ServerError::Serve`] if the accept loop fails.
pub async fn start_server(config: &ServerConfig, state: Arc<AppState>) -> Result<(), ServerError> {
    let listener = TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|source| ServerError::Bind {
            address: config.address(),
            source,
        })?;
    let local = listener.local_addr().map_err(|source| ServerError::Bind {
        address: config.address(),
        source,
    })?;

    info!(addr = %local, data_dir = %state.db.store().data_dir().display(), "Roster API listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|source| ServerError::Serve { source })?;

    info!("Roster API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Could not listen for Ctrl-C; running until killed");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining requests");
}

/// Errors from starting or running the API listener.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The address could not be resolved or bound.
    #[error("cannot listen on {address}: {source}")]
    Bind {
        /// `host:port` from the configuration.
        address: String,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The accept loop failed.
    #[error("server stopped unexpectedly: {source}")]
    Serve {
        /// The underlying I/O error.
        source: io::Error,
    },
}
