//! The application's handle on the data directory.
//!
//! [`Database`] owns the [`RecordStore`] and hands out typed
//! repositories. On top of plain CRUD it checks that shifts, teams, and
//! tasks only point at employees and ambulances that exist when they are
//! written, and it runs searches that need more than field equality.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use roster_types::{
    Ambulance, AmbulanceId, DONE_TASK_STATUS, Employee, EmployeeId, ShiftType, Task, Team,
};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::entity::{Directory, Entity, References};
use crate::error::{StoreError, ValidationError};
use crate::fields::Fields;
use crate::filter::Filters;
use crate::record_store::RecordStore;
use crate::repository::Repository;

/// Typed access to every collection in one data directory.
#[derive(Debug, Clone)]
pub struct Database {
    store: Arc<RecordStore>,
}

impl Database {
    /// Open (and initialize if needed) the data directory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Storage`] if the directory cannot be
    /// prepared.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Ok(Self {
            store: Arc::new(RecordStore::open(data_dir)?),
        })
    }

    /// The underlying record store.
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// A repository over the collection of `E`.
    pub fn repository<E: Entity>(&self) -> Repository<E> {
        Repository::new(Arc::clone(&self.store))
    }

    /// Records of `E` matching `filters`.
    ///
    /// Keys listed in [`Entity::SEARCH_KEYS`] are evaluated by the entity
    /// (month prefix, name search); all other keys are field equality.
    pub fn list<E: Entity>(&self, filters: &Filters) -> Result<Vec<E>, StoreError> {
        let (search, equality) = filters.partition(E::SEARCH_KEYS);
        let records = self.repository::<E>().list(&equality)?;
        if search.is_empty() {
            return Ok(records);
        }

        let directory = Directory::from_employees(&self.repository::<Employee>().all()?);
        Ok(records
            .into_iter()
            .filter(|record| {
                search
                    .iter()
                    .all(|(key, value)| record.matches_search(key, value, &directory))
            })
            .collect())
    }

    /// The record of `E` with identifier `id`.
    pub fn get<E: Entity>(&self, id: u64) -> Result<E, StoreError> {
        self.repository::<E>().get(id)
    }

    /// Create a record of `E`, rejecting dangling references.
    pub fn create<E: Entity>(&self, fields: &Map<String, Value>) -> Result<E, StoreError> {
        self.repository::<E>()
            .create_checked(fields, |previous, record| self.check_written(previous, record))
    }

    /// Merge `fields` into record `id` of `E`.
    ///
    /// Only references the update introduces must exist; references the
    /// record already held are kept even if their target was deleted.
    pub fn update<E: Entity>(&self, id: u64, fields: &Map<String, Value>) -> Result<E, StoreError> {
        self.repository::<E>()
            .update_checked(id, fields, |previous, record| self.check_written(previous, record))
    }

    /// Delete record `id` of `E`. Never cascades.
    pub fn delete<E: Entity>(&self, id: u64) -> Result<E, StoreError> {
        self.repository::<E>().delete(id)
    }

    /// Create or update the team entry for a date and period.
    ///
    /// An entry with the same `date` and `shift_type` is updated with
    /// `fields`; otherwise a new entry is created. Returns the entry and
    /// whether it was newly created.
    pub fn upsert_team(&self, fields: &Map<String, Value>) -> Result<(Team, bool), StoreError> {
        let view = Fields::new(fields);
        let date = view.required_date("date")?;
        let shift_type: Option<ShiftType> = view.optional_parsed("shift_type")?;

        let (team, created) = self.repository::<Team>().upsert_by(
            |team| team.date == date && team.shift_type == shift_type,
            fields,
            |previous, team| self.check_written(previous, team),
        )?;
        if !created {
            debug!(team_id = %team.id, %date, "Updated existing team entry");
        }
        Ok((team, created))
    }

    /// Mark task `id` as done now.
    pub fn complete_task(&self, id: u64) -> Result<Task, StoreError> {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        self.update(id, &object(json!({
            "status": DONE_TASK_STATUS,
            "completed_at": now,
        })))
    }

    /// Reject references in `record` that `previous` did not already hold
    /// and whose target does not exist.
    pub(crate) fn check_written<E: Entity>(
        &self,
        previous: Option<&E>,
        record: &E,
    ) -> Result<(), StoreError> {
        let refs = record.references();
        match previous {
            Some(previous) => self.check_references(&refs.added_since(&previous.references())),
            None => self.check_references(&refs),
        }
    }

    fn check_references(&self, refs: &References) -> Result<(), StoreError> {
        if !refs.employees.is_empty() {
            let known: BTreeSet<EmployeeId> = self
                .repository::<Employee>()
                .all()?
                .iter()
                .map(|e| e.id)
                .collect();
            if let Some((field, id)) = refs.employees.iter().find(|(_, id)| !known.contains(id)) {
                return Err(ValidationError::unknown_reference(*field, id.into_inner()).into());
            }
        }

        if !refs.ambulances.is_empty() {
            let known: BTreeSet<AmbulanceId> = self
                .repository::<Ambulance>()
                .all()?
                .iter()
                .map(|a| a.id)
                .collect();
            if let Some((field, id)) = refs.ambulances.iter().find(|(_, id)| !known.contains(id)) {
                return Err(ValidationError::unknown_reference(*field, id.into_inner()).into());
            }
        }

        Ok(())
    }
}

/// Unwrap a `json!({...})` literal into its field map.
pub(crate) fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use roster_types::Shift;

    fn open() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(dir.path()).unwrap();
        (dir, db)
    }

    #[test]
    fn shift_with_unknown_employee_is_rejected() {
        let (_dir, db) = open();
        let err = db
            .create::<Shift>(&object(json!({
                "date": "2025-08-01",
                "shift_type": "morning",
                "employee_ids": [7]
            })))
            .unwrap_err();
        assert_eq!(err.field(), Some("employee_ids"));
        assert!(db.repository::<Shift>().all().unwrap().is_empty());
    }

    #[test]
    fn shift_with_unknown_ambulance_is_rejected() {
        let (_dir, db) = open();
        db.create::<Employee>(&object(json!({"name": "a", "role": "driver"})))
            .unwrap();
        let err = db
            .create::<Shift>(&object(json!({
                "date": "2025-08-01",
                "shift_type": "morning",
                "employee_ids": [1],
                "ambulance_id": 3
            })))
            .unwrap_err();
        assert_eq!(err.field(), Some("ambulance_id"));
    }

    #[test]
    fn team_upsert_updates_same_date() {
        let (_dir, db) = open();
        let (first, created) = db
            .upsert_team(&object(json!({"date": "2025-08-01", "morning_teams": 2})))
            .unwrap();
        assert!(created);

        let (second, created) = db
            .upsert_team(&object(json!({"date": "2025-08-01", "evening_teams": 3})))
            .unwrap();
        assert!(!created);
        assert_eq!(second.id, first.id);
        assert_eq!(second.morning_teams, 2);
        assert_eq!(second.evening_teams, 3);

        let (_, created) = db
            .upsert_team(&object(json!({"date": "2025-08-02"})))
            .unwrap();
        assert!(created);
        assert_eq!(db.repository::<Team>().all().unwrap().len(), 2);
    }

    #[test]
    fn completing_a_task_stamps_it() {
        let (_dir, db) = open();
        db.create::<Employee>(&object(json!({"name": "a", "role": "driver"})))
            .unwrap();
        let task: Task = db
            .create(&object(json!({
                "description": "فحص المعدات",
                "employee_id": 1,
                "supervisor_name": "Khaled"
            })))
            .unwrap();
        assert!(task.is_open());
        assert!(task.updated_at.is_none());

        let done = db.complete_task(task.id.into_inner()).unwrap();
        assert_eq!(done.status, DONE_TASK_STATUS);
        assert!(!done.is_open());
        assert!(done.updated_at.is_some());
        assert_eq!(done.created_at, task.created_at);
    }

    #[test]
    fn records_pointing_at_a_deleted_employee_stay_editable() {
        let (_dir, db) = open();
        for name in ["a", "b"] {
            db.create::<Employee>(&object(json!({"name": name, "role": "driver"})))
                .unwrap();
        }
        db.create::<Task>(&object(json!({
            "description": "تعقيم السيارة",
            "employee_id": 1,
            "supervisor_name": "Khaled"
        })))
        .unwrap();
        db.create::<Shift>(&object(json!({
            "date": "2025-08-01",
            "shift_type": "D",
            "employee_ids": [1]
        })))
        .unwrap();

        db.delete::<Employee>(1).unwrap();

        let done = db.complete_task(1).unwrap();
        assert_eq!(done.employee_id, EmployeeId::new(1));
        assert!(!done.is_open());

        let shift: Shift = db.update(1, &object(json!({"sector": "north"}))).unwrap();
        assert_eq!(shift.sector.as_deref(), Some("north"));

        let shift: Shift = db.update(1, &object(json!({"employee_ids": [1, 2]}))).unwrap();
        assert_eq!(shift.employee_ids.len(), 2);

        let err = db
            .update::<Shift>(1, &object(json!({"employee_ids": [1, 2, 9]})))
            .unwrap_err();
        assert_eq!(err.field(), Some("employee_ids"));
        let err = db
            .update::<Task>(1, &object(json!({"employee_id": 7})))
            .unwrap_err();
        assert_eq!(err.field(), Some("employee_id"));
    }

    #[test]
    fn concurrent_upserts_share_one_team_entry() {
        let (_dir, db) = open();

        let handles: Vec<_> = (0..8_u32)
            .map(|n| {
                let db = db.clone();
                std::thread::spawn(move || {
                    db.upsert_team(&object(json!({
                        "date": "2025-08-01",
                        "morning_teams": n
                    })))
                    .unwrap()
                })
            })
            .collect();
        let created = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|(_, created)| *created)
            .count();

        assert_eq!(created, 1);
        assert_eq!(db.repository::<Team>().all().unwrap().len(), 1);
    }

    #[test]
    fn deleting_an_employee_leaves_shifts_intact() {
        let (_dir, db) = open();
        db.create::<Employee>(&object(json!({"name": "a", "role": "driver"})))
            .unwrap();
        let shift: Shift = db
            .create(&object(json!({
                "date": "2025-08-01",
                "shift_type": "N",
                "employee_ids": [1]
            })))
            .unwrap();

        db.delete::<Employee>(1).unwrap();

        let shifts: Vec<Shift> = db.list(&Filters::new()).unwrap();
        assert_eq!(shifts, vec![shift]);
    }
}
