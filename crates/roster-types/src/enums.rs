//! Enumeration types for the roster records.
//!
//! Each enumeration serializes to a lowercase `snake_case` tag and also
//! accepts the short codes and Arabic labels used by the existing forms
//! (`D`/`N`/`F` for shift periods, `جاهز` for a ready vehicle).

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// A value could not be parsed into one of the roster enumerations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct ParseEnumError {
    /// Name of the enumeration that rejected the value.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

/// The five record collections persisted by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    /// Staff members.
    Employees,
    /// Ambulance vehicles.
    Ambulances,
    /// Scheduled shifts.
    Shifts,
    /// Daily team preparation entries.
    Teams,
    /// Logistics support tasks.
    Tasks,
}

impl CollectionKind {
    /// Every collection, in the order they are initialized on disk.
    pub const ALL: [Self; 5] = [
        Self::Employees,
        Self::Ambulances,
        Self::Shifts,
        Self::Teams,
        Self::Tasks,
    ];

    /// The collection name, also used as the JSON file stem.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Employees => "employees",
            Self::Ambulances => "ambulances",
            Self::Shifts => "shifts",
            Self::Teams => "teams",
            Self::Tasks => "tasks",
        }
    }

    /// Arabic display name of the collection.
    pub const fn label_ar(self) -> &'static str {
        match self {
            Self::Employees => "الموظفين",
            Self::Ambulances => "سيارات الإسعاف",
            Self::Shifts => "الورديات",
            Self::Teams => "الفرق",
            Self::Tasks => "المهام",
        }
    }
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseEnumError::new("collection", s))
    }
}

// ---------------------------------------------------------------------------
// Ambulance status
// ---------------------------------------------------------------------------

/// Operational status of an ambulance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbulanceStatus {
    /// Ready for dispatch.
    #[serde(alias = "جاهز")]
    Active,
    /// In the workshop.
    #[serde(alias = "صيانة")]
    Maintenance,
    /// Withdrawn from service.
    #[serde(alias = "خارج الخدمة")]
    OutOfService,
}

impl AmbulanceStatus {
    /// The `snake_case` tag stored on disk.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Maintenance => "maintenance",
            Self::OutOfService => "out_of_service",
        }
    }

    /// Arabic label used in exports.
    pub const fn label_ar(self) -> &'static str {
        match self {
            Self::Active => "جاهز",
            Self::Maintenance => "صيانة",
            Self::OutOfService => "خارج الخدمة",
        }
    }
}

impl fmt::Display for AmbulanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AmbulanceStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "active" | "جاهز" => Ok(Self::Active),
            "maintenance" | "صيانة" => Ok(Self::Maintenance),
            "out_of_service" | "out-of-service" | "خارج الخدمة" => Ok(Self::OutOfService),
            other => Err(ParseEnumError::new("ambulance status", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Shift type
// ---------------------------------------------------------------------------

/// The period a shift covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftType {
    /// Day period, 12 hours.
    #[serde(alias = "D")]
    Morning,
    /// Night period, 12 hours.
    #[serde(alias = "N")]
    Evening,
    /// Full 24-hour duty.
    #[serde(alias = "F", alias = "24_hour")]
    FullDay,
}

impl ShiftType {
    /// Every shift type, in roster order.
    pub const ALL: [Self; 3] = [Self::Morning, Self::Evening, Self::FullDay];

    /// The `snake_case` tag stored on disk.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Morning => "morning",
            Self::Evening => "evening",
            Self::FullDay => "full_day",
        }
    }

    /// One-letter roster code.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Morning => "D",
            Self::Evening => "N",
            Self::FullDay => "F",
        }
    }

    /// Hours credited to an employee for one shift of this type.
    pub const fn hours(self) -> u32 {
        match self {
            Self::Morning | Self::Evening => 12,
            Self::FullDay => 24,
        }
    }

    /// Arabic label used in exports.
    pub const fn label_ar(self) -> &'static str {
        match self {
            Self::Morning => "صباحي",
            Self::Evening => "مسائي",
            Self::FullDay => "24 ساعة",
        }
    }
}

impl fmt::Display for ShiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShiftType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "morning" | "D" | "d" => Ok(Self::Morning),
            "evening" | "N" | "n" => Ok(Self::Evening),
            "full_day" | "24_hour" | "24-hour" | "24h" | "F" | "f" => Ok(Self::FullDay),
            other => Err(ParseEnumError::new("shift type", other)),
        }
    }
}
