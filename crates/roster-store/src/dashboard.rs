//! Dashboard aggregates.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use roster_types::{Ambulance, AmbulanceStatus, Employee, Shift, Task, Team};
use serde::Serialize;

use crate::database::Database;
use crate::error::StoreError;

/// Number of days covered by the shift trend, today included.
pub const TREND_DAYS: u64 = 30;

/// Shift count for one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    /// The date.
    pub date: NaiveDate,
    /// Shifts scheduled on that date.
    pub count: usize,
}

/// Crews prepared for one day, summed over that day's team entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TeamCounts {
    /// Morning crews.
    pub morning: u32,
    /// Evening crews.
    pub evening: u32,
    /// 24-hour crews.
    pub full: u32,
    /// All crews.
    pub total: u32,
}

/// Everything the dashboard page shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    /// The day the summary was computed for.
    pub today: NaiveDate,
    /// Number of employees.
    pub total_employees: usize,
    /// Number of ambulances.
    pub total_ambulances: usize,
    /// Ambulances with status `active`.
    pub ready_ambulances: usize,
    /// Shifts scheduled today.
    pub today_shifts: Vec<Shift>,
    /// Team preparation for today.
    pub today_teams: TeamCounts,
    /// Tasks not yet completed.
    pub open_tasks: usize,
    /// Shifts per day over the last [`TREND_DAYS`] days, oldest first.
    pub trend: Vec<TrendPoint>,
}

impl Database {
    /// Compute the dashboard for `today`.
    pub fn dashboard(&self, today: NaiveDate) -> Result<DashboardSummary, StoreError> {
        let employees = self.repository::<Employee>().all()?;
        let ambulances = self.repository::<Ambulance>().all()?;
        let shifts = self.repository::<Shift>().all()?;
        let teams = self.repository::<Team>().all()?;
        let tasks = self.repository::<Task>().all()?;

        let today_teams = teams
            .iter()
            .filter(|t| t.date == today)
            .fold(TeamCounts::default(), |acc, t| TeamCounts {
                morning: acc.morning.saturating_add(t.morning_teams),
                evening: acc.evening.saturating_add(t.evening_teams),
                full: acc.full.saturating_add(t.full_teams),
                total: acc.total.saturating_add(t.total_teams()),
            });

        Ok(DashboardSummary {
            today,
            total_employees: employees.len(),
            total_ambulances: ambulances.len(),
            ready_ambulances: ambulances
                .iter()
                .filter(|a| a.status == AmbulanceStatus::Active)
                .count(),
            today_shifts: shifts.iter().filter(|s| s.date == today).cloned().collect(),
            today_teams,
            open_tasks: tasks.iter().filter(|t| t.is_open()).count(),
            trend: trend(&shifts, today),
        })
    }
}

/// Shift counts for the [`TREND_DAYS`] days ending at `today`.
pub fn trend(shifts: &[Shift], today: NaiveDate) -> Vec<TrendPoint> {
    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for shift in shifts {
        let count = per_day.entry(shift.date).or_default();
        *count = count.saturating_add(1);
    }

    (0..TREND_DAYS)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .map(|date| TrendPoint {
            date,
            count: per_day.get(&date).copied().unwrap_or(0),
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::database::object;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn empty_store_has_a_flat_trend() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path()).unwrap();
        let summary = db.dashboard(date("2025-08-14")).unwrap();

        assert_eq!(summary.total_employees, 0);
        assert_eq!(summary.trend.len(), 30);
        assert_eq!(summary.trend[0].date, date("2025-07-16"));
        assert_eq!(summary.trend[29].date, date("2025-08-14"));
        assert!(summary.trend.iter().all(|p| p.count == 0));
    }

    #[test]
    fn counts_reflect_the_collections() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path()).unwrap();
        let today = date("2025-08-14");

        db.create::<Employee>(&object(json!({"name": "a", "role": "driver"})))
            .unwrap();
        db.create::<Ambulance>(&object(json!({"plate": "A1", "status": "active"})))
            .unwrap();
        db.create::<Ambulance>(&object(json!({"plate": "A2", "status": "maintenance"})))
            .unwrap();
        for day in ["2025-08-14", "2025-08-14", "2025-08-10", "2025-06-01"] {
            db.create::<Shift>(&object(json!({
                "date": day,
                "shift_type": "morning",
                "employee_ids": [1]
            })))
            .unwrap();
        }
        db.create::<Team>(&object(json!({
            "date": "2025-08-14",
            "morning_teams": 2,
            "evening_teams": 1,
            "full_teams": 1
        })))
        .unwrap();
        let task: Task = db
            .create(&object(json!({
                "description": "x",
                "employee_id": 1,
                "supervisor_name": "s"
            })))
            .unwrap();
        db.create::<Task>(&object(json!({
            "description": "y",
            "employee_id": 1,
            "supervisor_name": "s"
        })))
        .unwrap();
        db.complete_task(task.id.into_inner()).unwrap();

        let summary = db.dashboard(today).unwrap();
        assert_eq!(summary.total_ambulances, 2);
        assert_eq!(summary.ready_ambulances, 1);
        assert_eq!(summary.today_shifts.len(), 2);
        assert_eq!(
            summary.today_teams,
            TeamCounts {
                morning: 2,
                evening: 1,
                full: 1,
                total: 4
            }
        );
        assert_eq!(summary.open_tasks, 1);
        assert_eq!(summary.trend[29].count, 2);
        assert_eq!(summary.trend[25].count, 1);
        assert_eq!(summary.trend.iter().map(|p| p.count).sum::<usize>(), 3);
    }
}
