//! Composite-key row index for one side of a table comparison.

use std::collections::HashMap;

use tracing::debug;

use crate::core::{Record, Value};
use crate::normalize::normalize;

/// Delimiter between normalized key-column values. Not expected in data;
/// two records are the same entity iff their joined keys are equal.
const KEY_DELIMITER: &str = ":";

/// Identity of a row across both sides: the normalized key-column values
/// joined in key-column order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeKey(String);

impl CompositeKey {
    /// Build the key for one record. Null or absent key columns contribute
    /// nothing; a record whose key columns are all null/absent yields an
    /// empty key and is never matchable.
    pub fn for_record(record: &Record, key_columns: &[String]) -> Self {
        let parts: Vec<String> = key_columns
            .iter()
            .filter_map(|col| match record.get(col) {
                None | Some(Value::Null) => None,
                Some(v) => Some(normalize(v).to_string()),
            })
            .collect();
        CompositeKey(parts.join(KEY_DELIMITER))
    }

    /// Whether every key column was null or absent.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The joined key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Map of composite key to record for one side, preserving first-insertion
/// order for stable output.
///
/// Duplicate keys overwrite: the last-inserted record for a key survives
/// and earlier ones are silently dropped from the comparison. This is the
/// documented collision policy when the inferred key is not actually
/// unique; [`collisions`](RowIndex::collisions) reports how many rows were
/// lost so the orchestrator can log it.
#[derive(Debug, Default)]
pub struct RowIndex {
    order: Vec<CompositeKey>,
    map: HashMap<CompositeKey, Record>,
    collisions: usize,
}

/// Result of indexing one side: the keyed index plus the records that had
/// no usable key (all key columns null/absent), which are reported
/// directly as unmatched.
#[derive(Debug, Default)]
pub struct IndexedRows {
    /// Keyed records.
    pub index: RowIndex,
    /// Records excluded from the index for lack of a key.
    pub keyless: Vec<Record>,
}

impl RowIndex {
    /// Build an index in a single pass over the records.
    pub fn build(records: Vec<Record>, key_columns: &[String]) -> IndexedRows {
        let mut index = RowIndex::default();
        let mut keyless = Vec::new();

        for record in records {
            let key = CompositeKey::for_record(&record, key_columns);
            if key.is_empty() {
                keyless.push(record);
                continue;
            }
            index.insert(key, record);
        }

        if index.collisions > 0 {
            debug!(
                collisions = index.collisions,
                "duplicate composite keys collapsed (last row wins)"
            );
        }

        IndexedRows { index, keyless }
    }

    fn insert(&mut self, key: CompositeKey, record: Record) {
        if self.map.insert(key.clone(), record).is_some() {
            // Last write wins; first position in the order is kept.
            self.collisions += 1;
        } else {
            self.order.push(key);
        }
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the index holds no keys.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Number of rows dropped by duplicate-key overwrites.
    pub fn collisions(&self) -> usize {
        self.collisions
    }

    /// Look up a record by key.
    pub fn get(&self, key: &CompositeKey) -> Option<&Record> {
        self.map.get(key)
    }

    /// Whether the key is present.
    pub fn contains(&self, key: &CompositeKey) -> bool {
        self.map.contains_key(key)
    }

    /// Remove a record by key, keeping iteration order intact for the
    /// remaining keys.
    pub fn remove(&mut self, key: &CompositeKey) -> Option<Record> {
        self.map.remove(key)
    }

    /// Keys in first-insertion order, skipping removed entries.
    pub fn keys(&self) -> impl Iterator<Item = &CompositeKey> {
        self.order.iter().filter(|k| self.map.contains_key(k))
    }

    /// Consume the index, yielding (key, record) pairs in insertion order.
    pub fn into_entries(self) -> Vec<(CompositeKey, Record)> {
        let RowIndex {
            order, mut map, ..
        } = self;
        order
            .into_iter()
            .filter_map(|k| map.remove(&k).map(|r| (k, r)))
            .collect()
    }
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

    fn keys(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_composite_key_joins_normalized_values() {
        let r = record(&[
            ("id", Value::Int(7)),
            ("created", Value::Text("2023-01-01 00:00:00.0".into())),
        ]);
        let key = CompositeKey::for_record(&r, &keys(&["id", "created"]));
        assert_eq!(key.as_str(), "7:2023-01-01");
    }

    #[test]
    fn test_null_key_column_contributes_nothing() {
        let r = record(&[("id", Value::Null), ("code", Value::Text("A1".into()))]);
        let key = CompositeKey::for_record(&r, &keys(&["id", "code"]));
        assert_eq!(key.as_str(), "A1");
    }

    #[test]
    fn test_all_null_keys_are_keyless() {
        let rows = vec![
            record(&[("id", Value::Null), ("name", Value::Text("x".into()))]),
            record(&[("id", Value::Int(1)), ("name", Value::Text("y".into()))]),
        ];
        let indexed = RowIndex::build(rows, &keys(&["id"]));
        assert_eq!(indexed.index.len(), 1);
        assert_eq!(indexed.keyless.len(), 1);
        assert_eq!(
            indexed.keyless[0].get("name"),
            Some(&Value::Text("x".into()))
        );
    }

    #[test]
    fn test_duplicate_key_last_write_wins() {
        let rows = vec![
            record(&[("id", Value::Int(1)), ("name", Value::Text("first".into()))]),
            record(&[("id", Value::Int(1)), ("name", Value::Text("last".into()))]),
        ];
        let indexed = RowIndex::build(rows, &keys(&["id"]));

        // Exactly one entry survives and it is deterministically the last
        // inserted row, not an arbitrary winner.
        assert_eq!(indexed.index.len(), 1);
        assert_eq!(indexed.index.collisions(), 1);
        let key = CompositeKey::for_record(
            &record(&[("id", Value::Int(1))]),
            &keys(&["id"]),
        );
        assert_eq!(
            indexed.index.get(&key).unwrap().get("name"),
            Some(&Value::Text("last".into()))
        );
    }

    #[test]
    fn test_insertion_order_preserved() {
        let rows = vec![
            record(&[("id", Value::Int(3))]),
            record(&[("id", Value::Int(1))]),
            record(&[("id", Value::Int(2))]),
        ];
        let indexed = RowIndex::build(rows, &keys(&["id"]));
        let order: Vec<&str> = indexed.index.keys().map(CompositeKey::as_str).collect();
        assert_eq!(order, vec!["3", "1", "2"]);
    }

    #[test]
    fn test_remove_hides_key_from_iteration() {
        let rows = vec![
            record(&[("id", Value::Int(1))]),
            record(&[("id", Value::Int(2))]),
        ];
        let IndexedRows { mut index, .. } = RowIndex::build(rows, &keys(&["id"]));
        let key = CompositeKey::for_record(&record(&[("id", Value::Int(1))]), &keys(&["id"]));
        assert!(index.remove(&key).is_some());
        assert!(index.remove(&key).is_none());
        let order: Vec<&str> = index.keys().map(CompositeKey::as_str).collect();
        assert_eq!(order, vec!["2"]);
    }
}
