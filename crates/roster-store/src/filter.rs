//! Equality filters over record fields.

use std::collections::BTreeMap;

use serde_json::Value;

/// Field name to expected value pairs, all of which must match.
///
/// Values are compared against the text form of the stored field, so
/// `id=3`, `role=driver`, and `date=2025-08-01` all work. An array field
/// matches when any element does. Blank values are ignored, the way an
/// empty search box means "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters(BTreeMap<String, String>);

impl Filters {
    /// No filters: everything matches.
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Add a filter, builder style.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    /// Add a filter. Blank values are dropped.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        let value = value.trim();
        if !value.is_empty() {
            self.0.insert(field.into(), value.to_owned());
        }
    }

    /// Whether there are no filters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(field, value)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Split into `(selected, rest)` where `selected` holds the keys in
    /// `keys`.
    pub fn partition(&self, keys: &[&str]) -> (Self, Self) {
        let (selected, rest): (BTreeMap<_, _>, BTreeMap<_, _>) = self
            .0
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .partition(|(k, _)| keys.contains(&k.as_str()));
        (Self(selected), Self(rest))
    }

    /// Rewrite each value with `f(field, value)`.
    #[must_use]
    pub fn map_values(&self, f: impl Fn(&str, &str) -> String) -> Self {
        self.iter().map(|(field, value)| (field, f(field, value))).collect()
    }

    /// Whether a serialized record satisfies every filter.
    pub fn matches(&self, record: &Value) -> bool {
        self.0.iter().all(|(field, expected)| {
            record
                .get(field)
                .is_some_and(|actual| value_matches(actual, expected))
        })
    }
}

fn value_matches(actual: &Value, expected: &str) -> bool {
    match actual {
        Value::String(s) => s == expected,
        Value::Number(n) => n.to_string() == expected,
        Value::Bool(b) => b.to_string() == expected,
        Value::Array(items) => items.iter().any(|item| value_matches(item, expected)),
        Value::Null | Value::Object(_) => false,
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Filters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut filters = Self::new();
        for (k, v) in iter {
            filters.insert(k, v);
        }
        filters
    }
}

impl From<BTreeMap<String, String>> for Filters {
    fn from(map: BTreeMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn matches_text_numbers_and_arrays() {
        let record = json!({"id": 3, "role": "driver", "employee_ids": [1, 4]});
        assert!(Filters::new().with("role", "driver").matches(&record));
        assert!(Filters::new().with("id", "3").matches(&record));
        assert!(Filters::new().with("employee_ids", "4").matches(&record));
        assert!(!Filters::new().with("employee_ids", "2").matches(&record));
        assert!(!Filters::new().with("missing", "x").matches(&record));
    }

    #[test]
    fn blank_values_are_ignored() {
        let filters: Filters = [("role", "  "), ("date", "")].into_iter().collect();
        assert!(filters.is_empty());
    }

    #[test]
    fn map_values_rewrites_each_value() {
        let filters = Filters::new().with("shift_type", "D").with("sector", "north");
        let mapped = filters.map_values(|field, value| {
            if field == "shift_type" {
                String::from("morning")
            } else {
                value.to_owned()
            }
        });
        assert!(mapped.matches(&json!({"shift_type": "morning", "sector": "north"})));
        assert!(!filters.matches(&json!({"shift_type": "morning", "sector": "north"})));
    }

    #[test]
    fn partition_separates_search_keys() {
        let filters = Filters::new().with("month", "2025-08").with("sector", "north");
        let (search, rest) = filters.partition(&["month"]);
        assert_eq!(search.iter().collect::<Vec<_>>(), vec![("month", "2025-08")]);
        assert_eq!(rest.iter().collect::<Vec<_>>(), vec![("sector", "north")]);
    }
}
