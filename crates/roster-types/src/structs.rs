//! Record structs, one per collection.
//!
//! Optional fields are omitted from the JSON document when unset, so a
//! record created from `{name, role}` is stored as exactly
//! `{id, name, role, created_at}`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{AmbulanceStatus, ShiftType};
use crate::ids::{AmbulanceId, EmployeeId, ShiftId, TaskId, TeamId};

/// Default status given to a new team preparation entry.
pub const DEFAULT_TEAM_STATUS: &str = "pending";

/// Default status given to a new task.
pub const DEFAULT_TASK_STATUS: &str = "open";

/// Status a task receives when it is completed.
pub const DONE_TASK_STATUS: &str = "done";

// ---------------------------------------------------------------------------
// Employee
// ---------------------------------------------------------------------------

/// A staff member who can be put on shifts and teams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier within the collection.
    pub id: EmployeeId,
    /// Full name.
    pub name: String,
    /// Job category (driver, paramedic, supervisor, ...).
    pub role: String,
    /// Badge code printed on the staff card. Unique when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Contact phone number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Ambulance
// ---------------------------------------------------------------------------

/// An ambulance vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ambulance {
    /// Unique identifier within the collection.
    pub id: AmbulanceId,
    /// Plate number, the vehicle code. Unique.
    pub plate: String,
    /// Vehicle make/model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Operational status.
    pub status: AmbulanceStatus,
    /// Date of the last workshop visit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_service: Option<NaiveDate>,
    /// Maintenance notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Shift
// ---------------------------------------------------------------------------

/// A crew assignment for one date and period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    /// Unique identifier within the collection.
    pub id: ShiftId,
    /// Calendar date of the shift.
    pub date: NaiveDate,
    /// Period covered.
    pub shift_type: ShiftType,
    /// Employees on the crew.
    pub employee_ids: Vec<EmployeeId>,
    /// Vehicle assigned to the crew.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ambulance_id: Option<AmbulanceId>,
    /// Sector the crew covers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    /// Name of the crew chief.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chief_name: Option<String>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl Shift {
    /// Whether the employee is on this shift's crew.
    pub fn includes(&self, employee: EmployeeId) -> bool {
        self.employee_ids.contains(&employee)
    }
}

// ---------------------------------------------------------------------------
// Team
// ---------------------------------------------------------------------------

/// Team preparation entry for a date.
///
/// Carries both the named members of a prepared team and the number of
/// crews readied for each period of the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Unique identifier within the collection.
    pub id: TeamId,
    /// Date the teams are prepared for.
    pub date: NaiveDate,
    /// Period the named members cover, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_type: Option<ShiftType>,
    /// Named team members.
    #[serde(default)]
    pub member_ids: Vec<EmployeeId>,
    /// Preparation status, free-form (`pending`, `ready`, ...).
    pub status: String,
    /// Crews prepared for the morning period.
    #[serde(default)]
    pub morning_teams: u32,
    /// Crews prepared for the evening period.
    #[serde(default)]
    pub evening_teams: u32,
    /// Crews prepared for 24-hour duty.
    #[serde(default)]
    pub full_teams: u32,
    /// Free-form notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl Team {
    /// Total crews prepared across all periods.
    pub const fn total_teams(&self) -> u32 {
        self.morning_teams
            .saturating_add(self.evening_teams)
            .saturating_add(self.full_teams)
    }
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

/// A logistics support task assigned to an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier within the collection.
    pub id: TaskId,
    /// What needs doing.
    pub description: String,
    /// Employee responsible for the task.
    pub employee_id: EmployeeId,
    /// Name of the supervising officer.
    pub supervisor_name: String,
    /// Free-form status (`open`, `done`, ...).
    pub status: String,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// When the task was completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Whether the task is still open.
    pub const fn is_open(&self) -> bool {
        self.completed_at.is_none()
    }
}
