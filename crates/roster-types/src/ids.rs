//! Type-safe integer identifier wrappers.
//!
//! Every record kind has its own identifier type so a shift cannot be
//! looked up with a task id by accident. Identifiers are plain positive
//! integers on disk (`"id": 3`); the repository hands out `max + 1` when a
//! record is created.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around `u64` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Wrap a raw integer identifier.
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Return the inner integer value.
            pub const fn into_inner(self) -> u64 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Identifier of an employee (paramedic, driver, supervisor, ...).
    EmployeeId
}

define_id! {
    /// Identifier of an ambulance vehicle.
    AmbulanceId
}

define_id! {
    /// Identifier of a scheduled shift.
    ShiftId
}

define_id! {
    /// Identifier of a team preparation entry.
    TeamId
}

define_id! {
    /// Identifier of a logistics support task.
    TaskId
}
