//! Integration tests for the `roster-store` data layer.
//!
//! Each test opens a fresh data directory under a temporary path and
//! drives the public API the way the HTTP handlers do.

// Integration tests use unwrap extensively for clarity -- panicking on
// failure is the correct behavior in test code.
#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::missing_panics_doc,
    clippy::too_many_lines
)]

use std::sync::Arc;
use std::thread;

use roster_store::{Database, Filters, StoreError, UTF8_BOM, export};
use roster_types::{CollectionKind, Employee, Shift, Task};
use serde_json::{Map, Value, json};
use tempfile::TempDir;

fn fields(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

fn open() -> (TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path()).unwrap();
    (dir, db)
}

// =============================================================================
// Record lifecycle
// =============================================================================

#[test]
fn first_employee_gets_id_one_and_is_stored_verbatim() {
    let (dir, db) = open();
    let ahmed: Employee = db
        .create(&fields(json!({"name": "Ahmed", "role": "driver"})))
        .unwrap();
    assert_eq!(ahmed.id.into_inner(), 1);

    let raw = std::fs::read_to_string(dir.path().join("employees.json")).unwrap();
    let stored: Value = serde_json::from_str(&raw).unwrap();
    let record = stored[0].as_object().unwrap();
    let mut keys: Vec<&str> = record.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, vec!["created_at", "id", "name", "role"]);
    assert_eq!(record["name"], "Ahmed");
}

#[test]
fn export_after_create_has_header_and_one_row() {
    let (_dir, db) = open();
    let ahmed: Employee = db
        .create(&fields(json!({"name": "Ahmed", "role": "driver"})))
        .unwrap();

    let bytes = export::<Employee>(&db, &Filters::new()).unwrap();
    let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    let stamp = ahmed
        .created_at
        .to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true);
    assert!(lines[1].starts_with(&format!("1,Ahmed,driver,{stamp}")));
}

#[test]
fn get_of_unknown_id_is_not_found() {
    let (_dir, db) = open();
    db.create::<Employee>(&fields(json!({"name": "Ahmed", "role": "driver"})))
        .unwrap();

    let err = db.get::<Employee>(99).unwrap_err();
    assert!(matches!(
        err,
        StoreError::NotFound {
            collection: CollectionKind::Employees,
            id: 99
        }
    ));
}

#[test]
fn empty_create_names_the_first_missing_field() {
    let (_dir, db) = open();
    let err = db.create::<Employee>(&Map::new()).unwrap_err();
    assert_eq!(err.field(), Some("name"));
    assert!(db.list::<Employee>(&Filters::new()).unwrap().is_empty());
}

#[test]
fn delete_then_get_is_not_found() {
    let (_dir, db) = open();
    db.create::<Employee>(&fields(json!({"name": "Ahmed", "role": "driver"})))
        .unwrap();
    let removed = db.delete::<Employee>(1).unwrap();
    assert_eq!(removed.name, "Ahmed");
    assert!(matches!(
        db.get::<Employee>(1).unwrap_err(),
        StoreError::NotFound { .. }
    ));
    assert!(matches!(
        db.delete::<Employee>(1).unwrap_err(),
        StoreError::NotFound { .. }
    ));
}

#[test]
fn partial_update_leaves_other_fields_alone() {
    let (_dir, db) = open();
    let before: Employee = db
        .create(&fields(json!({
            "name": "Ahmed",
            "role": "driver",
            "code": "E-17",
            "phone": "0500000000"
        })))
        .unwrap();

    let after: Employee = db.update(1, &fields(json!({"role": "paramedic"}))).unwrap();
    assert_eq!(after.role, "paramedic");
    assert_eq!(after.name, before.name);
    assert_eq!(after.code, before.code);
    assert_eq!(after.phone, before.phone);
    assert_eq!(after.created_at, before.created_at);
    assert_eq!(db.get::<Employee>(1).unwrap(), after);
}

#[test]
fn deleting_a_referenced_employee_does_not_cascade() {
    let (_dir, db) = open();
    db.create::<Employee>(&fields(json!({"name": "Ahmed", "role": "driver"})))
        .unwrap();
    db.create::<Shift>(&fields(json!({
        "date": "2025-08-01",
        "shift_type": "morning",
        "employee_ids": [1]
    })))
    .unwrap();

    db.delete::<Employee>(1).unwrap();

    let shift = db.get::<Shift>(1).unwrap();
    assert_eq!(shift.employee_ids.len(), 1);
}

// =============================================================================
// Filters and search
// =============================================================================

#[test]
fn list_filters_by_field_and_month() {
    let (_dir, db) = open();
    for name in ["Ahmed", "Sara"] {
        db.create::<Employee>(&fields(json!({"name": name, "role": "medic"})))
            .unwrap();
    }
    for (date, sector) in [
        ("2025-07-31", "north"),
        ("2025-08-01", "north"),
        ("2025-08-02", "south"),
    ] {
        db.create::<Shift>(&fields(json!({
            "date": date,
            "shift_type": "evening",
            "employee_ids": [1, 2],
            "sector": sector
        })))
        .unwrap();
    }

    let august = db
        .list::<Shift>(&Filters::new().with("month", "2025-08"))
        .unwrap();
    assert_eq!(august.len(), 2);

    let north_august = db
        .list::<Shift>(&Filters::new().with("month", "2025-08").with("sector", "north"))
        .unwrap();
    assert_eq!(north_august.len(), 1);
    assert_eq!(north_august[0].id.into_inner(), 2);

    let with_sara = db
        .list::<Shift>(&Filters::new().with("employee_ids", "2"))
        .unwrap();
    assert_eq!(with_sara.len(), 3);
}

#[test]
fn task_search_by_employee_name() {
    let (_dir, db) = open();
    for name in ["Ahmed Salem", "Sara Nasser"] {
        db.create::<Employee>(&fields(json!({"name": name, "role": "medic"})))
            .unwrap();
    }
    for (employee, supervisor) in [(1, "Khaled"), (2, "Khaled"), (2, "Mona")] {
        db.create::<Task>(&fields(json!({
            "description": "نقل مستلزمات",
            "employee_id": employee,
            "supervisor_name": supervisor
        })))
        .unwrap();
    }

    let sara = db
        .list::<Task>(&Filters::new().with("employee", "sara"))
        .unwrap();
    assert_eq!(sara.len(), 2);

    let sara_mona = db
        .list::<Task>(&Filters::new().with("employee", "sara").with("supervisor", "mon"))
        .unwrap();
    assert_eq!(sara_mona.len(), 1);
    assert_eq!(sara_mona[0].id.into_inner(), 3);
}

// =============================================================================
// Persistence
// =============================================================================

#[test]
fn reopening_keeps_records_and_id_sequence() {
    let dir = tempfile::tempdir().unwrap();
    {
        let db = Database::open(dir.path()).unwrap();
        db.create::<Employee>(&fields(json!({"name": "Ahmed", "role": "driver"})))
            .unwrap();
    }

    let db = Database::open(dir.path()).unwrap();
    assert_eq!(db.list::<Employee>(&Filters::new()).unwrap().len(), 1);
    let next: Employee = db
        .create(&fields(json!({"name": "Sara", "role": "medic"})))
        .unwrap();
    assert_eq!(next.id.into_inner(), 2);
}

#[test]
fn concurrent_creates_get_distinct_ids() {
    let (_dir, db) = open();
    let db = Arc::new(db);

    let handles: Vec<_> = (0..8)
        .map(|n| {
            let db = Arc::clone(&db);
            thread::spawn(move || {
                db.create::<Employee>(&fields(json!({
                    "name": format!("worker {n}"),
                    "role": "driver"
                })))
                .unwrap()
                .id
                .into_inner()
            })
        })
        .collect();

    let mut ids: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    ids.sort_unstable();
    assert_eq!(ids, (1..=8).collect::<Vec<_>>());
    assert_eq!(db.list::<Employee>(&Filters::new()).unwrap().len(), 8);
}
