//! Error types for the roster server binary.
//!
//! [`AppError`] is the top-level error type that wraps every failure
//! mode during startup and serving.

/// Top-level error for the roster server binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: crate::config::ConfigError,
    },

    /// The data directory could not be opened.
    #[error("storage error: {source}")]
    Storage {
        /// The underlying store error.
        #[from]
        source: roster_store::StoreError,
    },

    /// The HTTP server failed to bind or serve.
    #[error("server error: {source}")]
    Server {
        /// The underlying server error.
        #[from]
        source: roster_web::ServerError,
    },
}
