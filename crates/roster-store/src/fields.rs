//! Field-level validation of caller-supplied record fields.
//!
//! Forms and API clients send a flat JSON object. [`Fields`] reads typed
//! values out of it and reports the first bad field by name. Text is
//! trimmed; blank text, `null`, and absent keys all count as "not
//! provided".

use core::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};

use crate::error::ValidationError;

/// Date format accepted for calendar fields.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Read-only view over a field map.
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    /// Wrap a field map.
    pub const fn new(map: &'a Map<String, Value>) -> Self {
        Self { map }
    }

    /// The raw value of `name`, if present and not `null`.
    pub fn raw(&self, name: &str) -> Option<&'a Value> {
        self.map.get(name).filter(|v| !v.is_null())
    }

    /// Text value of `name`, or `None` when absent or blank.
    ///
    /// Numbers and booleans are accepted and converted to their text
    /// form, since HTML forms do not distinguish them.
    pub fn optional_text(&self, name: &str) -> Result<Option<String>, ValidationError> {
        let text = match self.raw(name) {
            None => return Ok(None),
            Some(Value::String(s)) => s.trim().to_owned(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            Some(_) => return Err(ValidationError::new(name, "must be text")),
        };
        Ok(Some(text).filter(|t| !t.is_empty()))
    }

    /// Text value of `name`, which must be present and non-blank.
    pub fn required_text(&self, name: &str) -> Result<String, ValidationError> {
        self.optional_text(name)?
            .ok_or_else(|| ValidationError::missing(name))
    }

    /// Text value of `name`, or `default` when absent or blank.
    pub fn text_or(&self, name: &str, default: &str) -> Result<String, ValidationError> {
        Ok(self
            .optional_text(name)?
            .unwrap_or_else(|| default.to_owned()))
    }

    /// Parse `name` with [`FromStr`] when provided.
    pub fn optional_parsed<T: FromStr>(&self, name: &str) -> Result<Option<T>, ValidationError>
    where
        T::Err: core::fmt::Display,
    {
        self.optional_text(name)?
            .map(|text| {
                text.parse::<T>()
                    .map_err(|e| ValidationError::new(name, e.to_string()))
            })
            .transpose()
    }

    /// Parse a required `name` with [`FromStr`].
    pub fn required_parsed<T: FromStr>(&self, name: &str) -> Result<T, ValidationError>
    where
        T::Err: core::fmt::Display,
    {
        self.optional_parsed(name)?
            .ok_or_else(|| ValidationError::missing(name))
    }

    /// A calendar date in `YYYY-MM-DD` form, when provided.
    pub fn optional_date(&self, name: &str) -> Result<Option<NaiveDate>, ValidationError> {
        self.optional_text(name)?
            .map(|text| parse_date(name, &text))
            .transpose()
    }

    /// A required calendar date in `YYYY-MM-DD` form.
    pub fn required_date(&self, name: &str) -> Result<NaiveDate, ValidationError> {
        self.optional_date(name)?
            .ok_or_else(|| ValidationError::missing(name))
    }

    /// An RFC 3339 timestamp, when provided.
    pub fn optional_timestamp(&self, name: &str) -> Result<Option<DateTime<Utc>>, ValidationError> {
        self.optional_text(name)?
            .map(|text| {
                DateTime::parse_from_rfc3339(&text)
                    .map(|t| t.with_timezone(&Utc))
                    .map_err(|e| ValidationError::new(name, format!("must be an RFC 3339 timestamp: {e}")))
            })
            .transpose()
    }

    /// A record identifier, when provided.
    pub fn optional_id(&self, name: &str) -> Result<Option<u64>, ValidationError> {
        self.raw(name).map(|v| parse_id(name, v)).transpose()
    }

    /// A required record identifier.
    pub fn required_id(&self, name: &str) -> Result<u64, ValidationError> {
        self.optional_id(name)?
            .ok_or_else(|| ValidationError::missing(name))
    }

    /// A list of record identifiers.
    ///
    /// Accepts a JSON array, a single identifier, or a comma-separated
    /// string (`"1,4,7"`). Absent means an empty list. Duplicates are
    /// dropped, first occurrence wins.
    pub fn id_list(&self, name: &str) -> Result<Vec<u64>, ValidationError> {
        let ids: Vec<u64> = match self.raw(name) {
            None => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|v| parse_id(name, v))
                .collect::<Result<_, _>>()?,
            Some(Value::String(s)) => s
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(|part| parse_id_text(name, part))
                .collect::<Result<_, _>>()?,
            Some(other) => vec![parse_id(name, other)?],
        };

        let mut unique = Vec::with_capacity(ids.len());
        for id in ids {
            if !unique.contains(&id) {
                unique.push(id);
            }
        }
        Ok(unique)
    }

    /// A non-empty list of record identifiers.
    pub fn required_id_list(&self, name: &str) -> Result<Vec<u64>, ValidationError> {
        let ids = self.id_list(name)?;
        if ids.is_empty() {
            return Err(ValidationError::missing(name));
        }
        Ok(ids)
    }

    /// A non-negative count, defaulting to zero.
    pub fn count(&self, name: &str) -> Result<u32, ValidationError> {
        let Some(value) = self.raw(name) else {
            return Ok(0);
        };
        let parsed = match value {
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(s) if s.trim().is_empty() => Some(0),
            Value::String(s) => s.trim().parse::<u32>().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| ValidationError::new(name, "must be a non-negative whole number"))
    }
}

/// Parse a `YYYY-MM-DD` date, naming `field` on failure.
pub fn parse_date(field: &str, text: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
        .map_err(|e| ValidationError::new(field, format!("must be a date (YYYY-MM-DD): {e}")))
}

fn parse_id(field: &str, value: &Value) -> Result<u64, ValidationError> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .filter(|id| *id > 0)
            .ok_or_else(|| ValidationError::new(field, "must be a positive identifier")),
        Value::String(s) => parse_id_text(field, s),
        _ => Err(ValidationError::new(field, "must be a positive identifier")),
    }
}

fn parse_id_text(field: &str, text: &str) -> Result<u64, ValidationError> {
    text.trim()
        .parse::<u64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ValidationError::new(field, "must be a positive identifier"))
}
