//! Row classification results and the two matching strategies.
//!
//! - [`exact`]: hash-map based classification with full field diffs
//! - [`fuzzy`]: tolerant, threshold-scored matching through the bulk
//!   collaborator

pub mod exact;
pub mod fuzzy;

use serde::Serialize;

use crate::core::{Record, Value};

/// How confident the matcher is that a differing pair is the same entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Exact-mode field mismatch on a key-matched pair.
    Mismatch,
    /// Fuzzy: few mismatching columns, probably the same record.
    PotentialMatch,
    /// Fuzzy: many mismatching columns, needs a human.
    ManualReview,
}

/// One differing field on a matched pair.
#[derive(Debug, Clone, Serialize)]
pub struct FieldDifference {
    /// Column name.
    pub field: String,
    /// Normalized source-side value (`Null` when source lacks the field).
    pub source_value: Value,
    /// Normalized target-side value (`Null` when target lacks the field).
    pub target_value: Value,
}

/// A key-matched pair whose fields differ.
#[derive(Debug, Clone, Serialize)]
pub struct DifferenceRecord {
    /// Table the pair belongs to.
    pub table: String,
    /// Composite key text of the pair.
    pub key: String,
    /// Source-side record.
    pub source_record: Record,
    /// Target-side record.
    pub target_record: Record,
    /// Differing fields only.
    pub field_differences: Vec<FieldDifference>,
    /// Match confidence band.
    pub severity: Severity,
}

/// Classification result for one table mapping, or the aggregate across
/// all mappings of a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconciliationResult {
    /// Pairs whose normalized fields all matched.
    pub identical_count: u64,

    /// Key-matched pairs with field differences.
    pub differences: Vec<DifferenceRecord>,

    /// Source records with no counterpart on the target side.
    pub unmatched_source: Vec<Record>,

    /// Target records with no counterpart on the source side.
    pub unmatched_target: Vec<Record>,
}

impl ReconciliationResult {
    /// Create an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold another result into this one (aggregation across mappings).
    pub fn merge(&mut self, other: ReconciliationResult) {
        self.identical_count += other.identical_count;
        self.differences.extend(other.differences);
        self.unmatched_source.extend(other.unmatched_source);
        self.unmatched_target.extend(other.unmatched_target);
    }

    /// Total classified source-side rows (identical + differing + unmatched).
    pub fn source_total(&self) -> u64 {
        self.identical_count + self.differences.len() as u64 + self.unmatched_source.len() as u64
    }

    /// Total classified target-side rows.
    pub fn target_total(&self) -> u64 {
        self.identical_count + self.differences.len() as u64 + self.unmatched_target.len() as u64
    }

    /// Whether nothing differed and nothing was unmatched.
    pub fn is_clean(&self) -> bool {
        self.differences.is_empty()
            && self.unmatched_source.is_empty()
            && self.unmatched_target.is_empty()
    }
}
