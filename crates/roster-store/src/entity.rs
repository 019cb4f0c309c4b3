//! Per-collection record schemas.
//!
//! [`Entity`] ties a record struct to its collection and describes how to
//! build it from caller-supplied fields. The generic
//! [`Repository`](crate::repository::Repository) only talks to records
//! through this trait.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use roster_types::{
    Ambulance, AmbulanceId, AmbulanceStatus, CollectionKind, DEFAULT_TASK_STATUS,
    DEFAULT_TEAM_STATUS, Employee, EmployeeId, Shift, ShiftId, ShiftType, Task, TaskId, Team,
    TeamId,
};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::ValidationError;
use crate::fields::Fields;

/// Records that point at other collections, paired with the field that
/// holds each reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct References {
    /// Employee references.
    pub employees: Vec<(&'static str, EmployeeId)>,
    /// Ambulance references.
    pub ambulances: Vec<(&'static str, AmbulanceId)>,
}

impl References {
    /// References not already present in `previous`.
    ///
    /// An update only has to prove the references it introduces; ones
    /// carried over from the stored record may point at deleted records.
    #[must_use]
    pub fn added_since(&self, previous: &Self) -> Self {
        Self {
            employees: self
                .employees
                .iter()
                .filter(|r| !previous.employees.contains(r))
                .copied()
                .collect(),
            ambulances: self
                .ambulances
                .iter()
                .filter(|r| !previous.ambulances.contains(r))
                .copied()
                .collect(),
        }
    }

    /// Whether there are no references.
    pub fn is_empty(&self) -> bool {
        self.employees.is_empty() && self.ambulances.is_empty()
    }
}

/// Lookup data for searches that need another collection.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    employee_names: BTreeMap<EmployeeId, String>,
}

impl Directory {
    /// Build a directory from the employee list.
    pub fn from_employees(employees: &[Employee]) -> Self {
        Self {
            employee_names: employees.iter().map(|e| (e.id, e.name.clone())).collect(),
        }
    }

    /// Name of the employee, if it exists.
    pub fn employee_name(&self, id: EmployeeId) -> Option<&str> {
        self.employee_names.get(&id).map(String::as_str)
    }
}

/// A record kind stored in its own collection.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The collection holding records of this kind.
    const COLLECTION: CollectionKind;

    /// Query keys handled by [`Entity::matches_search`] instead of field
    /// equality.
    const SEARCH_KEYS: &'static [&'static str] = &[];

    /// The record's identifier.
    fn id(&self) -> u64;

    /// When the record was created.
    fn created_at(&self) -> DateTime<Utc>;

    /// Build a record from caller-supplied fields.
    ///
    /// `id` and `created_at` are assigned by the repository; everything
    /// else comes from `fields` and is validated here.
    fn from_fields(id: u64, created_at: DateTime<Utc>, fields: &Fields<'_>) -> Result<Self, ValidationError>;

    /// Natural keys that must be unique within the collection.
    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Other records this one points at.
    fn references(&self) -> References {
        References::default()
    }

    /// Stored form of a filter value, so `shift_type=D` finds `morning`.
    fn canonical_value(_field: &str, value: &str) -> String {
        value.to_owned()
    }

    /// Called on every successful update before the record is saved.
    fn touch(&mut self, _now: DateTime<Utc>) {}

    /// Evaluate one of [`Entity::SEARCH_KEYS`] against this record.
    fn matches_search(&self, _key: &str, _value: &str, _directory: &Directory) -> bool {
        true
    }
}

/// The stored tag for `value` if it parses as `T`, else `value` as given.
fn canonical_tag<T: FromStr + fmt::Display>(value: &str) -> String {
    value
        .parse::<T>()
        .map_or_else(|_| value.to_owned(), |parsed| parsed.to_string())
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.trim().to_lowercase())
}

impl Entity for Employee {
    const COLLECTION: CollectionKind = CollectionKind::Employees;

    fn id(&self) -> u64 {
        self.id.into_inner()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_fields(id: u64, created_at: DateTime<Utc>, fields: &Fields<'_>) -> Result<Self, ValidationError> {
        Ok(Self {
            id: EmployeeId(id),
            name: fields.required_text("name")?,
            role: fields.required_text("role")?,
            code: fields.optional_text("code")?,
            phone: fields.optional_text("phone")?,
            created_at,
        })
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        self.code.iter().map(|code| ("code", code.clone())).collect()
    }
}

impl Entity for Ambulance {
    const COLLECTION: CollectionKind = CollectionKind::Ambulances;

    fn id(&self) -> u64 {
        self.id.into_inner()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_fields(id: u64, created_at: DateTime<Utc>, fields: &Fields<'_>) -> Result<Self, ValidationError> {
        Ok(Self {
            id: AmbulanceId(id),
            plate: fields.required_text("plate")?,
            model: fields.optional_text("model")?,
            status: fields.required_parsed("status")?,
            last_service: fields.optional_date("last_service")?,
            notes: fields.optional_text("notes")?,
            created_at,
        })
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![("plate", self.plate.clone())]
    }

    fn canonical_value(field: &str, value: &str) -> String {
        match field {
            "status" => canonical_tag::<AmbulanceStatus>(value),
            _ => value.to_owned(),
        }
    }
}

impl Entity for Shift {
    const COLLECTION: CollectionKind = CollectionKind::Shifts;
    const SEARCH_KEYS: &'static [&'static str] = &["month"];

    fn id(&self) -> u64 {
        self.id.into_inner()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_fields(id: u64, created_at: DateTime<Utc>, fields: &Fields<'_>) -> Result<Self, ValidationError> {
        Ok(Self {
            id: ShiftId(id),
            date: fields.required_date("date")?,
            shift_type: fields.required_parsed("shift_type")?,
            employee_ids: fields
                .required_id_list("employee_ids")?
                .into_iter()
                .map(EmployeeId)
                .collect(),
            ambulance_id: fields.optional_id("ambulance_id")?.map(AmbulanceId),
            sector: fields.optional_text("sector")?,
            chief_name: fields.optional_text("chief_name")?,
            created_at,
        })
    }

    fn references(&self) -> References {
        References {
            employees: self.employee_ids.iter().map(|id| ("employee_ids", *id)).collect(),
            ambulances: self.ambulance_id.iter().map(|id| ("ambulance_id", *id)).collect(),
        }
    }

    fn canonical_value(field: &str, value: &str) -> String {
        match field {
            "shift_type" => canonical_tag::<ShiftType>(value),
            _ => value.to_owned(),
        }
    }

    fn matches_search(&self, key: &str, value: &str, _directory: &Directory) -> bool {
        match key {
            "month" => self.date.to_string().starts_with(value.trim()),
            _ => true,
        }
    }
}

impl Entity for Team {
    const COLLECTION: CollectionKind = CollectionKind::Teams;

    fn id(&self) -> u64 {
        self.id.into_inner()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_fields(id: u64, created_at: DateTime<Utc>, fields: &Fields<'_>) -> Result<Self, ValidationError> {
        Ok(Self {
            id: TeamId(id),
            date: fields.required_date("date")?,
            shift_type: fields.optional_parsed("shift_type")?,
            member_ids: fields
                .id_list("member_ids")?
                .into_iter()
                .map(EmployeeId)
                .collect(),
            status: fields.text_or("status", DEFAULT_TEAM_STATUS)?,
            morning_teams: fields.count("morning_teams")?,
            evening_teams: fields.count("evening_teams")?,
            full_teams: fields.count("full_teams")?,
            notes: fields.optional_text("notes")?,
            created_at,
        })
    }

    fn references(&self) -> References {
        References {
            employees: self.member_ids.iter().map(|id| ("member_ids", *id)).collect(),
            ambulances: Vec::new(),
        }
    }

    fn canonical_value(field: &str, value: &str) -> String {
        match field {
            "shift_type" => canonical_tag::<ShiftType>(value),
            _ => value.to_owned(),
        }
    }
}

impl Entity for Task {
    const COLLECTION: CollectionKind = CollectionKind::Tasks;
    const SEARCH_KEYS: &'static [&'static str] = &["employee", "supervisor"];

    fn id(&self) -> u64 {
        self.id.into_inner()
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn from_fields(id: u64, created_at: DateTime<Utc>, fields: &Fields<'_>) -> Result<Self, ValidationError> {
        Ok(Self {
            id: TaskId(id),
            description: fields.required_text("description")?,
            employee_id: EmployeeId(fields.required_id("employee_id")?),
            supervisor_name: fields.required_text("supervisor_name")?,
            status: fields.text_or("status", DEFAULT_TASK_STATUS)?,
            created_at,
            updated_at: fields.optional_timestamp("updated_at")?,
            completed_at: fields.optional_timestamp("completed_at")?,
        })
    }

    fn references(&self) -> References {
        References {
            employees: vec![("employee_id", self.employee_id)],
            ambulances: Vec::new(),
        }
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
    }

    fn matches_search(&self, key: &str, value: &str, directory: &Directory) -> bool {
        match key {
            "supervisor" => contains_ci(&self.supervisor_name, value),
            "employee" => {
                value.trim() == self.employee_id.to_string()
                    || directory
                        .employee_name(self.employee_id)
                        .is_some_and(|name| contains_ci(name, value))
            }
            _ => true,
        }
    }
}
