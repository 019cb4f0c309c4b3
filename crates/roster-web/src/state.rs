//! Shared application state for the roster HTTP API.
//!
//! [`AppState`] holds the opened [`Database`]. Repository calls do
//! blocking file I/O, so handlers go through [`AppState::run`], which
//! moves the call onto Tokio's blocking pool.

use roster_store::{Database, StoreError};

use crate::error::ApiError;

/// State shared by every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The data directory handle.
    pub db: Database,
}

impl AppState {
    /// Wrap an opened database.
    pub const fn new(db: Database) -> Self {
        Self { db }
    }

    /// Run a data-layer operation on the blocking pool.
    ///
    /// # Errors
    ///
    /// Returns the operation's [`StoreError`] as [`ApiError::Store`], or
    /// [`ApiError::Internal`] if the blocking task panicked or was
    /// cancelled.
    pub async fn run<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T, StoreError> + Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || op(&db))
            .await
            .map_err(|e| ApiError::Internal(format!("blocking task failed: {e}")))?
            .map_err(ApiError::from)
    }
}
