//! Roster grid, team preparation, and task completion endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use roster_store::{Fields, parse_cell};
use roster_types::EmployeeId;
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;

/// Query parameters for `GET /api/roster`.
#[derive(Debug, serde::Deserialize)]
pub struct RosterQuery {
    /// Month to show (`YYYY-MM`). Defaults to the current month.
    pub month: Option<String>,
}

// ---------------------------------------------------------------------------
// GET /api/roster
// ---------------------------------------------------------------------------

/// Return the monthly roster grid.
pub async fn monthly(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<RosterQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let month = params
        .month
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| chrono::Local::now().format("%Y-%m").to_string());

    let roster = state.run(move |db| db.monthly_roster(&month)).await?;
    Ok(Json(roster))
}

// ---------------------------------------------------------------------------
// POST /api/roster/assign
// ---------------------------------------------------------------------------

/// Set one roster cell.
///
/// Body: `{ "employee_id": 3, "date": "2025-08-14", "shift_type": "D" }`.
/// A blank `shift_type`, `O`, or `off` clears the day.
pub async fn assign(
    State(state): State<Arc<AppState>>,
    ApiJson(fields): ApiJson<Map<String, Value>>,
) -> Result<impl IntoResponse, ApiError> {
    let change = state
        .run(move |db| {
            let view = Fields::new(&fields);
            let employee = EmployeeId::new(view.required_id("employee_id")?);
            let date = view.required_date("date")?;
            let cell = view.optional_text("shift_type")?.unwrap_or_default();
            let shift_type = parse_cell(&cell)?;
            db.assign_roster(employee, date, shift_type)
        })
        .await?;

    Ok(Json(change))
}

// ---------------------------------------------------------------------------
// POST /api/teams/upsert
// ---------------------------------------------------------------------------

/// Create or update the team entry for a date and period.
///
/// Responds `201 Created` for a new entry and `200 OK` for an update.
pub async fn upsert_team(
    State(state): State<Arc<AppState>>,
    ApiJson(fields): ApiJson<Map<String, Value>>,
) -> Result<impl IntoResponse, ApiError> {
    let (team, created) = state.run(move |db| db.upsert_team(&fields)).await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(team)))
}

// ---------------------------------------------------------------------------
// POST /api/tasks/{id}/complete
// ---------------------------------------------------------------------------

/// Mark a task as done.
pub async fn complete_task(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<u64>,
) -> Result<impl IntoResponse, ApiError> {
    let task = state.run(move |db| db.complete_task(id)).await?;
    Ok(Json(task))
}
