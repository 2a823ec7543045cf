//! A fetched row as an ordered column-to-value association.
//!
//! Column order is the insertion order reported by the data source and is
//! preserved through diffing so report output stays stable. Column names
//! are canonicalized to lowercase on insert; lookups are by the lowercase
//! name.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use super::value::Value;

/// One row after fetch and normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty record with room for `capacity` columns.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Set a column value, lowercasing the name.
    ///
    /// A repeated name overwrites in place, keeping the first position.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into().to_lowercase();
        let value = value.into();
        if let Some(slot) = self.fields.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.fields.push((name, value));
        }
    }

    /// Look up a column by (case-insensitive) name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let name = name.to_lowercase();
        self.fields.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    /// Whether the record carries this column.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no columns.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Column names in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    /// (name, value) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (name, value) in iter {
            record.set(name, value);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Union of column names from two records: all of `a`'s columns in order,
/// then `b`-only columns in `b`'s order.
pub fn column_union(a: &Record, b: &Record) -> Vec<String> {
    let mut names: Vec<String> = a.columns().map(str::to_string).collect();
    for name in b.columns() {
        if !a.contains(name) {
            names.push(name.to_string());
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, Value)]) -> Record {
        pairs
            .iter()
            .map(|(n, v)| (n.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_set_lowercases_and_preserves_order() {
        let mut r = Record::new();
        r.set("ID", Value::Int(1));
        r.set("Email", Value::Text("a@x.com".into()));
        r.set("id", Value::Int(2)); // overwrite, same slot

        assert_eq!(r.len(), 2);
        assert_eq!(r.get("id"), Some(&Value::Int(2)));
        assert_eq!(r.columns().collect::<Vec<_>>(), vec!["id", "email"]);
    }

    #[test]
    fn test_get_is_case_insensitive() {
        let r = record(&[("name", Value::Text("bob".into()))]);
        assert_eq!(r.get("NAME"), Some(&Value::Text("bob".into())));
        assert!(r.get("missing").is_none());
    }

    #[test]
    fn test_column_union_preserves_order() {
        let a = record(&[("id", Value::Int(1)), ("email", Value::Null)]);
        let b = record(&[("id", Value::Int(1)), ("city", Value::Null)]);

        assert_eq!(column_union(&a, &b), vec!["id", "email", "city"]);
    }

    #[test]
    fn test_serialize_as_ordered_map() {
        let r = record(&[("id", Value::Int(1)), ("name", Value::Text("a".into()))]);
        assert_eq!(
            serde_json::to_string(&r).unwrap(),
            r#"{"id":1,"name":"a"}"#
        );
    }
}
