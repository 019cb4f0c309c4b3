//! Axum router construction for the roster API.
//!
//! Assembles all routes into a single [`Router`] with CORS and request
//! tracing middleware.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use roster_store::{CsvRecord, Entity};
use roster_types::{Ambulance, Employee, Shift, Task, Team};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, overview, roster};

/// Register the CRUD and export routes of one collection.
fn collection_routes<E: Entity + CsvRecord>(router: Router<Arc<AppState>>) -> Router<Arc<AppState>> {
    let base = format!("/api/{}", E::COLLECTION.as_str());
    router
        .route(
            &base,
            get(handlers::list::<E>).post(handlers::create::<E>),
        )
        .route(&format!("{base}/export"), get(handlers::export::<E>))
        .route(
            &format!("{base}/{{id}}"),
            get(handlers::get::<E>)
                .patch(handlers::update::<E>)
                .delete(handlers::delete::<E>),
        )
}

/// Build the complete Axum router for the roster server.
///
/// The router includes:
/// - `GET /` -- Arabic status page
/// - `GET /health` -- data directory health check
/// - `GET /api/dashboard` -- dashboard counts and shift trend
/// - `/api/{collection}[/{id}|/export]` for employees, ambulances,
///   shifts, teams, and tasks
/// - `POST /api/tasks/{id}/complete` -- complete a task
/// - `POST /api/teams/upsert` -- team entry upsert by date
/// - `GET /api/roster` -- monthly roster grid
/// - `POST /api/roster/assign` -- set one roster cell
///
/// CORS allows any origin so a separately served front end can call the
/// API.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new()
        // Status
        .route("/", get(overview::index))
        .route("/health", get(overview::health))
        .route("/api/dashboard", get(overview::dashboard))
        // Roster and workflow actions
        .route("/api/roster", get(roster::monthly))
        .route("/api/roster/assign", post(roster::assign))
        .route("/api/teams/upsert", post(roster::upsert_team))
        .route("/api/tasks/{id}/complete", post(roster::complete_task));

    let router = collection_routes::<Employee>(router);
    let router = collection_routes::<Ambulance>(router);
    let router = collection_routes::<Shift>(router);
    let router = collection_routes::<Team>(router);
    let router = collection_routes::<Task>(router);

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
