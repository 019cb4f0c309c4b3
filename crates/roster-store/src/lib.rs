//! Data layer for the ambulance crew roster.
//!
//! Each collection (employees, ambulances, shifts, teams, tasks) lives in
//! its own pretty-printed JSON file inside one data directory. Writes go
//! through a temporary file and a rename, so a crash never leaves a
//! half-written collection behind.
//!
//! # Modules
//!
//! - [`record_store`] -- Whole-collection load/save with atomic replace
//! - [`fields`] -- Typed reads and validation of caller-supplied fields
//! - [`entity`] -- Per-collection schema: construction, unique keys, references
//! - [`filter`] -- Field-equality filters
//! - [`repository`] -- Generic CRUD over one collection
//! - [`database`] -- Typed entry point with reference checks and searches
//! - [`export`] -- CSV export with Arabic headers
//! - [`dashboard`] -- Dashboard counts and the 30-day shift trend
//! - [`roster`] -- Monthly roster grid and cell assignment
//! - [`error`] -- Storage, not-found, and validation errors

pub mod dashboard;
pub mod database;
pub mod entity;
pub mod error;
pub mod export;
pub mod fields;
pub mod filter;
pub mod record_store;
pub mod repository;
pub mod roster;

pub use dashboard::{DashboardSummary, TREND_DAYS, TeamCounts, TrendPoint};
pub use database::Database;
pub use entity::{Directory, Entity, References};
pub use error::{StoreError, ValidationError};
pub use export::{CsvRecord, UTF8_BOM, export, file_name, to_csv};
pub use fields::Fields;
pub use filter::Filters;
pub use record_store::RecordStore;
pub use repository::{Batch, Repository};
pub use roster::{DEFAULT_SECTOR, MonthlyRoster, RosterChange, RosterRow, parse_cell, parse_month};
