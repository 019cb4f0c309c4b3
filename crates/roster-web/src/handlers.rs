//! Collection endpoint handlers.
//!
//! Every collection exposes the same five operations plus CSV export.
//! Handlers are generic over the record kind and registered once per
//! collection by [`build_router`](crate::router::build_router).
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/{collection}` | List records (query string = filters) |
//! | `POST` | `/api/{collection}` | Create a record |
//! | `GET` | `/api/{collection}/{id}` | Get one record |
//! | `PATCH` | `/api/{collection}/{id}` | Merge fields into a record |
//! | `DELETE` | `/api/{collection}/{id}` | Delete a record |
//! | `GET` | `/api/{collection}/export` | CSV download (query string = filters) |

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use roster_store::{CsvRecord, Entity, Filters, export as csv_export, file_name};
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;

/// Raw query string parameters.
pub type QueryParams = ApiQuery<BTreeMap<String, String>>;

// ---------------------------------------------------------------------------
// GET /api/{collection}
// ---------------------------------------------------------------------------

/// List records matching the query-string filters.
pub async fn list<E: Entity>(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): QueryParams,
) -> Result<impl IntoResponse, ApiError> {
    let filters = Filters::from(params);
    let records = state.run(move |db| db.list::<E>(&filters)).await?;

    Ok(Json(serde_json::json!({
        "collection": E::COLLECTION,
        "count": records.len(),
        "records": records,
    })))
}

// ---------------------------------------------------------------------------
// POST /api/{collection}
// ---------------------------------------------------------------------------

/// Create a record from a JSON object of fields.
pub async fn create<E: Entity>(
    State(state): State<Arc<AppState>>,
    ApiJson(fields): ApiJson<Map<String, Value>>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state.run(move |db| db.create::<E>(&fields)).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

// ---------------------------------------------------------------------------
// GET /api/{collection}/{id}
// ---------------------------------------------------------------------------

/// Return a single record.
pub async fn get<E: Entity>(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<u64>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state.run(move |db| db.get::<E>(id)).await?;
    Ok(Json(record))
}

// ---------------------------------------------------------------------------
// PATCH /api/{collection}/{id}
// ---------------------------------------------------------------------------

/// Merge the given fields into a record.
pub async fn update<E: Entity>(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<u64>,
    ApiJson(fields): ApiJson<Map<String, Value>>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state.run(move |db| db.update::<E>(id, &fields)).await?;
    Ok(Json(record))
}

// ---------------------------------------------------------------------------
// DELETE /api/{collection}/{id}
// ---------------------------------------------------------------------------

/// Delete a record and return it.
pub async fn delete<E: Entity>(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<u64>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state.run(move |db| db.delete::<E>(id)).await?;
    Ok(Json(serde_json::json!({ "deleted": record })))
}

// ---------------------------------------------------------------------------
// GET /api/{collection}/export
// ---------------------------------------------------------------------------

/// Download the filtered collection as CSV.
pub async fn export<E: Entity + CsvRecord>(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): QueryParams,
) -> Result<impl IntoResponse, ApiError> {
    let filters = Filters::from(params);
    let name = file_name(E::COLLECTION, &filters, chrono::Local::now().date_naive());
    let bytes = state.run(move |db| csv_export::<E>(db, &filters)).await?;

    Ok((
        [
            (header::CONTENT_TYPE, String::from("text/csv; charset=utf-8")),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{name}\""),
            ),
        ],
        bytes,
    ))
}
