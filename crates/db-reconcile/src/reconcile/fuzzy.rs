//! Fuzzy/bulk reconciliation: tolerant, threshold-scored matching.
//!
//! Used when volumes make a full in-memory exact pass impractical or when
//! approximate matching is requested. The bulk collaborator executes the
//! full outer join; this module owns the matching and scoring policy:
//! which join predicate each key column gets, and how joined pairs are
//! banded by mismatch count.
//!
//! Banding: 0 mismatching columns is identical; 1..=potential_max is a
//! potential match (low severity); up to review_max is manual review
//! (high severity); beyond that the rows are treated as unrelated and
//! surface as unmatched on both sides.

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::config::FuzzyThresholds;
use crate::core::{column_union, values_equal, Record, Value};
use crate::error::Result;
use crate::normalize::normalize;
use crate::provider::{BulkProvider, JoinKeyExpr, JoinedRow};
use crate::reconcile::{DifferenceRecord, FieldDifference, ReconciliationResult, Severity};

/// Id-like numeric column names get the wider tolerance.
static ID_LIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(^id$|_id$)").expect("id-like regex"));

/// Content hash of a normalized value: SHA-256 hex of the canonical
/// rendering. Fixed-width and dialect-agnostic, suitable as a join key.
pub fn normalized_hash(value: &Value) -> String {
    let canonical = normalize(value).to_string();
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Fuzzy matcher for one table mapping.
pub struct FuzzyReconciler<'a> {
    thresholds: &'a FuzzyThresholds,
}

impl<'a> FuzzyReconciler<'a> {
    /// Create a matcher with the run's thresholds.
    pub fn new(thresholds: &'a FuzzyThresholds) -> Self {
        Self { thresholds }
    }

    /// Join predicate for one key column, by name policy:
    /// whitelisted exact columns join strictly; monetary/numeric names
    /// join with relative tolerance; id-like names get the id tolerance;
    /// everything else joins on a content hash of the normalized value.
    pub fn join_key_expr(&self, column: &str) -> JoinKeyExpr {
        let name = column.to_lowercase();

        if self.thresholds.exact_columns.iter().any(|c| *c == name) {
            return JoinKeyExpr::Exact { column: name };
        }
        if self
            .thresholds
            .tolerance_columns
            .iter()
            .any(|frag| name.contains(frag.as_str()))
        {
            return JoinKeyExpr::Tolerance {
                column: name,
                threshold: self.thresholds.numeric_tolerance,
            };
        }
        if ID_LIKE.is_match(&name) {
            return JoinKeyExpr::Tolerance {
                column: name,
                threshold: self.thresholds.id_tolerance,
            };
        }
        JoinKeyExpr::NormalizedHash { column: name }
    }

    /// Build the join key spec for the mapping's key columns.
    pub fn join_key_spec(&self, key_columns: &[String]) -> Vec<JoinKeyExpr> {
        key_columns.iter().map(|c| self.join_key_expr(c)).collect()
    }

    /// Reconcile one mapping through the bulk collaborator.
    pub async fn reconcile(
        &self,
        table: &str,
        source_rows: Vec<Record>,
        target_rows: Vec<Record>,
        key_columns: &[String],
        bulk: &dyn BulkProvider,
    ) -> Result<ReconciliationResult> {
        let spec = self.join_key_spec(key_columns);
        debug!(table = %table, spec = ?spec, "fuzzy join key spec");

        let joined = bulk.full_outer_join(source_rows, target_rows, &spec).await?;

        let mut result = ReconciliationResult::new();
        for row in joined {
            self.classify(table, row, key_columns, &mut result);
        }
        Ok(result)
    }

    fn classify(
        &self,
        table: &str,
        row: JoinedRow,
        key_columns: &[String],
        result: &mut ReconciliationResult,
    ) {
        let (source, target) = match (row.source, row.target) {
            (Some(s), Some(t)) => (s, t),
            (Some(s), None) => {
                result.unmatched_source.push(s);
                return;
            }
            (None, Some(t)) => {
                result.unmatched_target.push(t);
                return;
            }
            (None, None) => return,
        };

        let diffs = self.scored_differences(&source, &target);
        let mismatch_count = diffs.len() as u32;

        if mismatch_count == 0 {
            result.identical_count += 1;
        } else if mismatch_count <= self.thresholds.potential_max {
            result.differences.push(self.difference_record(
                table,
                &source,
                &target,
                key_columns,
                diffs,
                Severity::PotentialMatch,
            ));
        } else if mismatch_count <= self.thresholds.review_max {
            result.differences.push(self.difference_record(
                table,
                &source,
                &target,
                key_columns,
                diffs,
                Severity::ManualReview,
            ));
        } else {
            // Too far apart to be the same entity: not a match at all.
            result.unmatched_source.push(source);
            result.unmatched_target.push(target);
        }
    }

    /// Differences across the column union, honoring the per-column
    /// tolerance policy: a tolerance column within threshold contributes
    /// nothing; null-on-one-side or inequality contributes one.
    fn scored_differences(&self, source: &Record, target: &Record) -> Vec<FieldDifference> {
        let mut diffs = Vec::new();

        for field in column_union(source, target) {
            let src = normalize(source.get(&field).unwrap_or(&Value::Null));
            let tgt = normalize(target.get(&field).unwrap_or(&Value::Null));

            let equal = match self.join_key_expr(&field) {
                JoinKeyExpr::Tolerance { threshold, .. } => {
                    within_tolerance(&src, &tgt, threshold)
                }
                _ => values_equal(&src, &tgt),
            };

            if !equal {
                diffs.push(FieldDifference {
                    field,
                    source_value: src,
                    target_value: tgt,
                });
            }
        }

        diffs
    }

    fn difference_record(
        &self,
        table: &str,
        source: &Record,
        target: &Record,
        key_columns: &[String],
        diffs: Vec<FieldDifference>,
        severity: Severity,
    ) -> DifferenceRecord {
        let key = crate::index::CompositeKey::for_record(source, key_columns);
        DifferenceRecord {
            table: table.to_string(),
            key: key.to_string(),
            source_record: source.clone(),
            target_record: target.clone(),
            field_differences: diffs,
            severity,
        }
    }
}

/// Relative-tolerance numeric match: `|a - b| / max(|a|, |b|) < threshold`.
///
/// Non-numeric values degrade to normalized equality; a null on either
/// side never matches; two exact zeros match.
pub fn within_tolerance(a: &Value, b: &Value, threshold: f64) -> bool {
    if a.is_null() || b.is_null() {
        return false;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => {
            let denom = x.abs().max(y.abs());
            if denom == 0.0 {
                return true;
            }
            (x - y).abs() / denom < threshold
        }
        _ => values_equal(a, b),
    }
}
