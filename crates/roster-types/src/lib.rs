//! Shared record types for the ambulance crew roster.
//!
//! This crate is the single source of truth for the shapes persisted in
//! the data directory and returned by the dashboard API.
//!
//! # Modules
//!
//! - [`ids`] -- Typed integer identifiers for every collection
//! - [`enums`] -- Collection names, ambulance status, shift types
//! - [`structs`] -- Employee, ambulance, shift, team, and task records

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{AmbulanceStatus, CollectionKind, ParseEnumError, ShiftType};
pub use ids::{AmbulanceId, EmployeeId, ShiftId, TaskId, TeamId};
pub use structs::{
    Ambulance, DEFAULT_TASK_STATUS, DEFAULT_TEAM_STATUS, DONE_TASK_STATUS, Employee, Shift, Task,
    Team,
};
