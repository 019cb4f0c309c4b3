//! Error types for the data layer.
//!
//! Every repository operation fails with a [`StoreError`]. The three kinds
//! map one-to-one onto the user-facing failures: a broken data file, a
//! missing record, or a bad form field.

use std::path::{Path, PathBuf};

use roster_types::CollectionKind;

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A collection file or the data directory could not be read,
    /// parsed, or written.
    #[error("storage error at {}: {message}", .path.display())]
    Storage {
        /// The file or directory that failed.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// No record with the requested identifier exists.
    #[error("{collection} record {id} not found")]
    NotFound {
        /// The collection that was searched.
        collection: CollectionKind,
        /// The identifier that was requested.
        id: u64,
    },

    /// A caller-supplied field is missing or malformed.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl StoreError {
    /// Build a [`StoreError::Storage`] for the given path.
    pub fn storage(path: &Path, message: impl Into<String>) -> Self {
        Self::Storage {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// The offending field name when this is a validation failure.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation(err) => Some(&err.field),
            Self::Storage { .. } | Self::NotFound { .. } => None,
        }
    }
}

/// A single field failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid field `{field}`: {reason}")]
pub struct ValidationError {
    /// Name of the offending field.
    pub field: String,
    /// Human-readable reason.
    pub reason: String,
}

impl ValidationError {
    /// A field with an arbitrary failure reason.
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// A required field is absent or blank.
    pub fn missing(field: impl Into<String>) -> Self {
        Self::new(field, "is required")
    }

    /// A natural key collides with an existing record.
    pub fn duplicate(field: impl Into<String>, value: &str) -> Self {
        Self::new(field, format!("value {value:?} is already in use"))
    }

    /// A reference points at a record that does not exist.
    pub fn unknown_reference(field: impl Into<String>, id: u64) -> Self {
        Self::new(field, format!("references unknown record {id}"))
    }

    /// A field that the store maintains was changed by the caller.
    pub fn read_only(field: impl Into<String>) -> Self {
        Self::new(field, "is read-only")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_names_the_field() {
        let err = StoreError::from(ValidationError::missing("name"));
        assert_eq!(err.field(), Some("name"));
        assert_eq!(err.to_string(), "invalid field `name`: is required");
    }

    #[test]
    fn not_found_has_no_field() {
        let err = StoreError::NotFound {
            collection: CollectionKind::Employees,
            id: 99,
        };
        assert_eq!(err.field(), None);
        assert_eq!(err.to_string(), "employees record 99 not found");
    }
}
