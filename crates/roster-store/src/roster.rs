//! Monthly roster grid and per-cell assignment.
//!
//! The roster is a view over the shifts collection: one row per employee,
//! one column per day of the month. Assigning a cell edits the shifts
//! that hold that employee on that date.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use roster_types::{Employee, EmployeeId, Shift, ShiftType};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::database::{Database, object};
use crate::error::{StoreError, ValidationError};
use crate::fields::DATE_FORMAT;
use crate::repository::Batch;

/// Sector given to shifts created from the roster grid.
pub const DEFAULT_SECTOR: &str = "عام";

/// Parse a `YYYY-MM` month into its first day.
///
/// # Errors
///
/// Returns a [`ValidationError`] on the `month` field.
pub fn parse_month(text: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(&format!("{}-01", text.trim()), DATE_FORMAT)
        .map_err(|e| ValidationError::new("month", format!("must be a month (YYYY-MM): {e}")))
}

/// Parse a roster cell value: a shift type, or blank/`O`/`off` for a day
/// off.
///
/// # Errors
///
/// Returns a [`ValidationError`] on the `shift_type` field.
pub fn parse_cell(text: &str) -> Result<Option<ShiftType>, ValidationError> {
    let text = text.trim();
    if text.is_empty() || text.eq_ignore_ascii_case("o") || text.eq_ignore_ascii_case("off") {
        return Ok(None);
    }
    text.parse::<ShiftType>()
        .map(Some)
        .map_err(|e| ValidationError::new("shift_type", e.to_string()))
}

/// Every day of the month starting at `first`.
fn days_of_month(first: NaiveDate) -> Vec<NaiveDate> {
    first
        .iter_days()
        .take_while(|d| d.month() == first.month())
        .collect()
}

/// One employee's line in the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterRow {
    /// The employee.
    pub employee_id: EmployeeId,
    /// Employee name.
    pub name: String,
    /// Employee badge code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Job category.
    pub role: String,
    /// Assigned period per day. Days off are absent.
    pub assignments: BTreeMap<NaiveDate, ShiftType>,
    /// Hours worked over the month.
    pub total_hours: u32,
}

/// The roster for one month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyRoster {
    /// `YYYY-MM`.
    pub month: String,
    /// Every day of the month, in order.
    pub days: Vec<NaiveDate>,
    /// One row per employee, in employee order.
    pub rows: Vec<RosterRow>,
}

/// What an assignment did to the shifts collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "change", content = "shift", rename_all = "snake_case")]
pub enum RosterChange {
    /// A new single-employee shift was created.
    Created(Shift),
    /// The employee's shift changed period.
    Updated(Shift),
    /// The employee was taken off every shift on that date.
    Cleared,
    /// The roster already showed the requested value.
    Unchanged,
}

impl Database {
    /// Build the roster grid for `month` (`YYYY-MM`).
    pub fn monthly_roster(&self, month: &str) -> Result<MonthlyRoster, StoreError> {
        let first = parse_month(month)?;
        let days = days_of_month(first);
        let last = days.last().copied().unwrap_or(first);

        let employees = self.repository::<Employee>().all()?;
        let shifts: Vec<Shift> = self
            .repository::<Shift>()
            .all()?
            .into_iter()
            .filter(|s| s.date >= first && s.date <= last)
            .collect();

        let rows = employees
            .into_iter()
            .map(|emp| {
                let assignments: BTreeMap<NaiveDate, ShiftType> = shifts
                    .iter()
                    .filter(|s| s.includes(emp.id))
                    .map(|s| (s.date, s.shift_type))
                    .collect();
                let total_hours = assignments
                    .values()
                    .fold(0_u32, |acc, t| acc.saturating_add(t.hours()));
                RosterRow {
                    employee_id: emp.id,
                    name: emp.name,
                    code: emp.code,
                    role: emp.role,
                    assignments,
                    total_hours,
                }
            })
            .collect();

        Ok(MonthlyRoster {
            month: first.format("%Y-%m").to_string(),
            days,
            rows,
        })
    }

    /// Set one roster cell: put `employee` on a `shift_type` shift on
    /// `date`, or take them off duty for the day when `None`.
    ///
    /// A single-employee shift is reused and changed in place. Shared
    /// crews the employee belonged to on that date lose that employee.
    /// The whole cell edit runs under the shifts lock and is saved once.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] on `employee_id` when the employee
    /// does not exist.
    pub fn assign_roster(
        &self,
        employee: EmployeeId,
        date: NaiveDate,
        shift_type: Option<ShiftType>,
    ) -> Result<RosterChange, StoreError> {
        match self.get::<Employee>(employee.into_inner()) {
            Ok(_) => {}
            Err(StoreError::NotFound { .. }) => {
                return Err(ValidationError::unknown_reference("employee_id", employee.into_inner()).into());
            }
            Err(e) => return Err(e),
        }

        let change = self.repository::<Shift>().edit(|batch| {
            let on_day: Vec<Shift> = batch
                .records()
                .iter()
                .filter(|s| s.date == date && s.includes(employee))
                .cloned()
                .collect();

            if let (Some(wanted), [only]) = (shift_type, on_day.as_slice()) {
                if only.shift_type == wanted {
                    return Ok(RosterChange::Unchanged);
                }
            }
            if shift_type.is_none() && on_day.is_empty() {
                return Ok(RosterChange::Unchanged);
            }

            let mut reusable = None;
            for shift in on_day {
                if shift_type.is_some() && reusable.is_none() && shift.employee_ids == [employee] {
                    reusable = Some(shift);
                } else {
                    self.take_off_shift(batch, &shift, employee)?;
                }
            }

            Ok(match (shift_type, reusable) {
                (None, _) => RosterChange::Cleared,
                (Some(wanted), Some(shift)) => RosterChange::Updated(batch.merge(
                    shift.id.into_inner(),
                    &object(json!({ "shift_type": wanted.as_str() })),
                    |previous, record| self.check_written(previous, record),
                )?),
                (Some(wanted), None) => RosterChange::Created(batch.insert(
                    &object(json!({
                        "date": date.to_string(),
                        "shift_type": wanted.as_str(),
                        "employee_ids": [employee],
                        "sector": DEFAULT_SECTOR,
                    })),
                    |previous, record| self.check_written(previous, record),
                )?),
            })
        })?;

        info!(%employee, %date, shift_type = ?shift_type, "Roster cell assigned");
        Ok(change)
    }

    fn take_off_shift(
        &self,
        batch: &mut Batch<'_, Shift>,
        shift: &Shift,
        employee: EmployeeId,
    ) -> Result<(), StoreError> {
        let remaining: Vec<EmployeeId> = shift
            .employee_ids
            .iter()
            .copied()
            .filter(|id| *id != employee)
            .collect();
        if remaining.is_empty() {
            batch.remove(shift.id.into_inner())?;
        } else {
            batch.merge(
                shift.id.into_inner(),
                &object(json!({ "employee_ids": remaining })),
                |previous, record| self.check_written(previous, record),
            )?;
        }
        Ok(())
    }
}
