//! HTTP API for the ambulance crew roster.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **CRUD endpoints** for employees, ambulances, shifts, teams, and
//!   tasks, with field-equality filters on the list endpoints
//! - **CSV export** of any collection or filtered view
//! - **Dashboard** counts and the 30-day shift trend
//! - **Roster** month grid and single-cell assignment
//! - **Arabic status page** (`GET /`) and a health check
//!
//! # Architecture
//!
//! Handlers are thin: they extract the request, hand the work to
//! [`roster_store::Database`] on Tokio's blocking pool, and serialize the
//! result. Data-layer errors and unreadable requests become JSON error
//! bodies with an Arabic message via [`ApiError`](error::ApiError).

pub mod error;
pub mod extract;
pub mod handlers;
pub mod overview;
pub mod roster;
pub mod router;
pub mod server;
pub mod state;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
