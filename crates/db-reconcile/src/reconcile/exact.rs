//! Exact reconciliation: hash-map row classification with field diffs.
//!
//! Every source record is classified exactly once (identical, differing,
//! or unmatched-source) and every target record exactly once (matched or
//! unmatched-target). Classification counts are invariant to row fetch
//! order; list ordering follows index insertion order.

use crate::core::{column_union, values_equal, Record, Value};
use crate::index::RowIndex;
use crate::normalize::normalize;
use crate::reconcile::{DifferenceRecord, FieldDifference, ReconciliationResult, Severity};

/// Classify the rows of one table mapping.
///
/// Consumes both indexes: the target index acts as the working copy that
/// matched keys are removed from, so whatever remains at the end is
/// unmatched-target by construction.
pub fn reconcile(table: &str, source: RowIndex, mut target: RowIndex) -> ReconciliationResult {
    let mut result = ReconciliationResult::new();

    for (key, source_record) in source.into_entries() {
        match target.remove(&key) {
            Some(target_record) => {
                let diffs = field_differences(&source_record, &target_record);
                if diffs.is_empty() {
                    result.identical_count += 1;
                } else {
                    result.differences.push(DifferenceRecord {
                        table: table.to_string(),
                        key: key.to_string(),
                        source_record,
                        target_record,
                        field_differences: diffs,
                        severity: Severity::Mismatch,
                    });
                }
            }
            None => result.unmatched_source.push(source_record),
        }
    }

    for (_, record) in target.into_entries() {
        result.unmatched_target.push(record);
    }

    result
}

/// Field diffs over the union of both records' columns, comparing
/// normalized values. A field present on only one side diffs against
/// NULL.
pub fn field_differences(source: &Record, target: &Record) -> Vec<FieldDifference> {
    let mut diffs = Vec::new();

    for field in column_union(source, target) {
        let src = normalize(source.get(&field).unwrap_or(&Value::Null));
        let tgt = normalize(target.get(&field).unwrap_or(&Value::Null));

        if !values_equal(&src, &tgt) {
            diffs.push(FieldDifference {
                field,
                source_value: src,
                target_value: tgt,
            });
        }
    }

    diffs
}
