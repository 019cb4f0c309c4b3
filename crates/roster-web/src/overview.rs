//! Status page, health check, and dashboard endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use roster_store::StoreError;
use roster_store::fields::parse_date;
use roster_types::{Ambulance, Employee};

use crate::error::ApiError;
use crate::extract::ApiQuery;
use crate::state::AppState;

/// Query parameters for `GET /api/dashboard`.
#[derive(Debug, serde::Deserialize)]
pub struct DashboardQuery {
    /// Day to compute the dashboard for (`YYYY-MM-DD`). Defaults to today.
    pub date: Option<String>,
}

// ---------------------------------------------------------------------------
// GET / -- Arabic status page
// ---------------------------------------------------------------------------

/// Serve a right-to-left status page with today's headline numbers and
/// links to the API.
pub async fn index(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let today = chrono::Local::now().date_naive();
    let summary = state.run(move |db| db.dashboard(today)).await?;

    let employees = summary.total_employees;
    let ambulances = summary.total_ambulances;
    let ready = summary.ready_ambulances;
    let shifts = summary.today_shifts.len();
    let teams = summary.today_teams.total;
    let open_tasks = summary.open_tasks;

    Ok(Html(format!(
        r#"<!DOCTYPE html>
<html lang="ar" dir="rtl">
<head>
    <meta charset="utf-8">
    <title>نظام جدولة طواقم الإسعاف</title>
    <style>
        body {{
            background: #f6f8fa;
            color: #24292f;
            font-family: 'Segoe UI', 'Noto Kufi Arabic', Tahoma, sans-serif;
            padding: 2rem;
            max-width: 900px;
            margin: 0 auto;
        }}
        h1 {{ color: #b31d28; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #57606a; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #ffffff;
            border: 1px solid #d0d7de;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0 0.5rem 0.5rem;
            min-width: 120px;
        }}
        .metric .label {{ color: #57606a; font-size: 0.85rem; }}
        .metric .value {{ color: #b31d28; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #0969da; text-decoration: none; }}
        ul {{ padding: 0 1rem 0 0; }}
        li {{ padding: 0.3rem 0; direction: ltr; text-align: right; }}
    </style>
</head>
<body>
    <h1>نظام جدولة طواقم الإسعاف</h1>
    <p class="subtitle">اليوم: {today}</p>

    <div>
        <div class="metric"><div class="label">الموظفين</div><div class="value">{employees}</div></div>
        <div class="metric"><div class="label">سيارات الإسعاف</div><div class="value">{ambulances}</div></div>
        <div class="metric"><div class="label">سيارات جاهزة</div><div class="value">{ready}</div></div>
        <div class="metric"><div class="label">ورديات اليوم</div><div class="value">{shifts}</div></div>
        <div class="metric"><div class="label">فرق اليوم</div><div class="value">{teams}</div></div>
        <div class="metric"><div class="label">مهام مفتوحة</div><div class="value">{open_tasks}</div></div>
    </div>

    <h2>الواجهات البرمجية</h2>
    <ul>
        <li><a href="/api/dashboard">/api/dashboard</a></li>
        <li><a href="/api/employees">/api/employees</a></li>
        <li><a href="/api/ambulances">/api/ambulances</a></li>
        <li><a href="/api/shifts">/api/shifts</a></li>
        <li><a href="/api/teams">/api/teams</a></li>
        <li><a href="/api/tasks">/api/tasks</a></li>
        <li><a href="/api/roster">/api/roster</a></li>
        <li><a href="/api/employees/export">/api/employees/export</a></li>
    </ul>
</body>
</html>"#
    )))
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Report that the data directory is readable.
pub async fn health(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    let (employees, ambulances) = state
        .run(|db| {
            Ok((
                db.repository::<Employee>().all()?.len(),
                db.repository::<Ambulance>().all()?.len(),
            ))
        })
        .await?;

    Ok(Json(serde_json::json!({
        "status": "ok",
        "employees": employees,
        "ambulances": ambulances,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/dashboard
// ---------------------------------------------------------------------------

/// Return the dashboard counts and the 30-day shift trend.
///
/// # Query Parameters
///
/// - `date`: `YYYY-MM-DD` (default: today, local time)
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<DashboardQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let today = match params.date.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => parse_date("date", text).map_err(StoreError::from)?,
        _ => chrono::Local::now().date_naive(),
    };

    let summary = state.run(move |db| db.dashboard(today)).await?;
    Ok(Json(summary))
}
