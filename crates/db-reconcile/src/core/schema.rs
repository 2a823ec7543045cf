//! Schema metadata types produced by the schema provider.

use serde::{Deserialize, Serialize};

/// Column metadata for one table on one side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name, canonical lowercase.
    pub name: String,

    /// Data type as reported by the dialect (e.g. "int", "varchar", "number").
    pub data_type: String,

    /// Whether the column allows NULL.
    pub is_nullable: bool,

    /// Maximum length for string/binary types (-1 for unbounded).
    pub max_length: i32,
}

impl ColumnDescriptor {
    /// Create a descriptor, lowercasing the name.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, is_nullable: bool) -> Self {
        Self {
            name: name.into().to_lowercase(),
            data_type: data_type.into(),
            is_nullable,
            max_length: -1,
        }
    }

    /// Set the maximum length.
    pub fn with_max_length(mut self, max_length: i32) -> Self {
        self.max_length = max_length;
        self
    }
}

/// Columns present on both sides, in source-side order (case-insensitive).
pub fn common_columns(source: &[ColumnDescriptor], target: &[ColumnDescriptor]) -> Vec<String> {
    source
        .iter()
        .filter(|s| target.iter().any(|t| t.name == s.name))
        .map(|s| s.name.clone())
        .collect()
}
