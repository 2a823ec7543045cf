//! Key inference: decide which columns identify a row when no explicit
//! key is configured.
//!
//! Four tiers, strict fallback order, first non-empty result wins:
//!
//! 1. primary keys shared by both sides
//! 2. business keys by naming pattern, NOT NULL on both sides
//! 3. statistically unique columns over the row sample
//! 4. all common columns (whole-row identity)
//!
//! A schema lookup failure degrades to the next tier rather than failing
//! the mapping. Tier 3/4 keys are not guaranteed unique; duplicate
//! composite keys collide in the row index with last-write-wins (see the
//! index module).

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use crate::config::{ConnectionProfile, TableMapping};
use crate::core::{common_columns, ColumnDescriptor, Record};
use crate::normalize::normalize;
use crate::provider::SchemaProvider;

/// Naming patterns that mark a column as a business key candidate.
static BUSINESS_KEY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(_id$|id$|_code$|_number$|reference|email|^uuid|^guid|unique|key$|identifier$)")
        .expect("business key regex")
});

/// Which tier produced the key, for logging and result metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTier {
    /// Shared primary key columns.
    PrimaryKeys,
    /// Name-pattern business keys, NOT NULL on both sides.
    BusinessKeys,
    /// Columns exceeding the distinct-ratio threshold over the sample.
    Statistical,
    /// Whole-row identity over all common columns.
    WholeRow,
}

/// An inferred key with its provenance.
#[derive(Debug, Clone)]
pub struct InferredKey {
    /// Ordered key column names.
    pub columns: Vec<String>,
    /// Tier that produced them.
    pub tier: KeyTier,
}

/// Key inference engine over the schema provider.
pub struct KeyInference<'a> {
    schema: &'a dyn SchemaProvider,
    uniqueness_threshold: f64,
}

impl<'a> KeyInference<'a> {
    /// Create an inference engine. `uniqueness_threshold` is the distinct
    /// ratio above which a sampled column counts as unique (0.8 per
    /// default configuration).
    pub fn new(schema: &'a dyn SchemaProvider, uniqueness_threshold: f64) -> Self {
        Self {
            schema,
            uniqueness_threshold,
        }
    }

    /// Infer the key columns for one mapping.
    ///
    /// `sample` is the available source row sample (in practice the fetched
    /// source rows). Returns an empty column list only when the two sides
    /// share no columns at all.
    pub async fn infer(
        &self,
        source: &ConnectionProfile,
        target: &ConnectionProfile,
        mapping: &TableMapping,
        source_cols: &[ColumnDescriptor],
        target_cols: &[ColumnDescriptor],
        sample: &[Record],
    ) -> InferredKey {
        let table = mapping.display_name();

        // Tier 1: shared primary keys
        let pks = self
            .shared_primary_keys(source, target, mapping, source_cols)
            .await;
        if !pks.is_empty() {
            debug!(table = %table, columns = ?pks, "key inference: primary keys");
            return InferredKey {
                columns: pks,
                tier: KeyTier::PrimaryKeys,
            };
        }

        // Tier 2: business keys by name, NOT NULL on both sides
        let business = business_keys(source_cols, target_cols);
        if !business.is_empty() {
            debug!(table = %table, columns = ?business, "key inference: business keys");
            return InferredKey {
                columns: business,
                tier: KeyTier::BusinessKeys,
            };
        }

        // Tier 3: statistical uniqueness over the sample
        let common = common_columns(source_cols, target_cols);
        let unique = statistically_unique(&common, sample, self.uniqueness_threshold);
        if !unique.is_empty() {
            debug!(table = %table, columns = ?unique, "key inference: statistical uniqueness");
            return InferredKey {
                columns: unique,
                tier: KeyTier::Statistical,
            };
        }

        // Tier 4: whole-row identity
        debug!(table = %table, columns = ?common, "key inference: whole-row fallback");
        InferredKey {
            columns: common,
            tier: KeyTier::WholeRow,
        }
    }

    /// Case-insensitive intersection of both sides' primary keys, in
    /// source key order. Lookup failures degrade to an empty set.
    async fn shared_primary_keys(
        &self,
        source: &ConnectionProfile,
        target: &ConnectionProfile,
        mapping: &TableMapping,
        source_cols: &[ColumnDescriptor],
    ) -> Vec<String> {
        let source_pks = match self
            .schema
            .list_primary_keys(source, &mapping.source_table)
            .await
        {
            Ok(pks) => pks,
            Err(e) => {
                warn!(table = %mapping.source_table, error = %e,
                      "source primary key lookup failed; falling back");
                return Vec::new();
            }
        };
        let target_pks = match self
            .schema
            .list_primary_keys(target, &mapping.target_table)
            .await
        {
            Ok(pks) => pks,
            Err(e) => {
                warn!(table = %mapping.target_table, error = %e,
                      "target primary key lookup failed; falling back");
                return Vec::new();
            }
        };

        let target_set: HashSet<String> =
            target_pks.iter().map(|c| c.to_lowercase()).collect();

        source_pks
            .into_iter()
            .map(|c| c.to_lowercase())
            .filter(|c| target_set.contains(c))
            // A PK column missing from the fetched column set would
            // produce permanently empty keys.
            .filter(|c| {
                source_cols.is_empty() || source_cols.iter().any(|d| &d.name == c)
            })
            .collect()
    }
}

/// Business key candidates present on both sides: name matches the fixed
/// pattern set AND declared NOT NULL on both sides.
fn business_keys(source_cols: &[ColumnDescriptor], target_cols: &[ColumnDescriptor]) -> Vec<String> {
    source_cols
        .iter()
        .filter(|s| !s.is_nullable && BUSINESS_KEY_PATTERN.is_match(&s.name))
        .filter(|s| {
            target_cols
                .iter()
                .any(|t| t.name == s.name && !t.is_nullable)
        })
        .map(|s| s.name.clone())
        .collect()
}

/// Columns whose distinct-normalized-value ratio over the sample exceeds
/// the threshold. Empty when the sample is empty.
fn statistically_unique(common: &[String], sample: &[Record], threshold: f64) -> Vec<String> {
    if sample.is_empty() {
        return Vec::new();
    }

    let total = sample.len() as f64;
    common
        .iter()
        .filter(|col| {
            let distinct: HashSet<String> = sample
                .iter()
                .map(|r| {
                    normalize(r.get(col).unwrap_or(&crate::core::Value::Null)).to_string()
                })
                .collect();
            distinct.len() as f64 / total > threshold
        })
        .cloned()
        .collect()
}
