//! Interfaces to out-of-scope collaborators.
//!
//! The engine reads schema metadata and rows through these traits and
//! never touches a driver directly. Implementations (JDBC-style pools,
//! a distributed compute cluster, test fixtures) live outside the crate.
//!
//! Contract shared by all implementations: every identifier returned —
//! table names, column names — is lowercase.

use async_trait::async_trait;

use crate::config::ConnectionProfile;
use crate::core::{ColumnDescriptor, Record};
use crate::error::Result;

/// Read-only access to schema metadata on one side.
#[async_trait]
pub trait SchemaProvider: Send + Sync {
    /// List table names, optionally restricted to a schema/catalog filter.
    async fn list_tables(
        &self,
        profile: &ConnectionProfile,
        schema_filter: Option<&str>,
    ) -> Result<Vec<String>>;

    /// List column metadata for one table.
    async fn list_columns(
        &self,
        profile: &ConnectionProfile,
        table: &str,
    ) -> Result<Vec<ColumnDescriptor>>;

    /// List primary key column names for one table, in key order.
    async fn list_primary_keys(
        &self,
        profile: &ConnectionProfile,
        table: &str,
    ) -> Result<Vec<String>>;

    /// List columns covered by single-column unique indexes.
    async fn list_unique_index_columns(
        &self,
        profile: &ConnectionProfile,
        table: &str,
    ) -> Result<Vec<String>>;
}

/// Row access for one side of a comparison.
///
/// Each call is expected to honor the caller's deadline; the orchestrator
/// additionally wraps fetches in its own timeout and treats expiry as a
/// mapping-level failure.
#[async_trait]
pub trait DataSourceProvider: Send + Sync {
    /// Fetch all rows of a table as records with lowercase column names.
    async fn fetch_rows(
        &self,
        profile: &ConnectionProfile,
        table: &str,
        schema_filter: Option<&str>,
    ) -> Result<Vec<Record>>;
}

/// Join predicate for one key column in bulk/fuzzy mode.
///
/// The engine owns the policy of which expression applies to which
/// column; the bulk collaborator owns executing the join at scale.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinKeyExpr {
    /// Relative-tolerance numeric match:
    /// `|src - tgt| / max(|src|, |tgt|) < threshold`.
    Tolerance { column: String, threshold: f64 },

    /// Strict equality on the raw value.
    Exact { column: String },

    /// Equality of a content hash of the normalized value. Keeps join
    /// keys fixed-width and dialect-agnostic.
    NormalizedHash { column: String },
}

impl JoinKeyExpr {
    /// The column this predicate applies to.
    pub fn column(&self) -> &str {
        match self {
            JoinKeyExpr::Tolerance { column, .. }
            | JoinKeyExpr::Exact { column }
            | JoinKeyExpr::NormalizedHash { column } => column,
        }
    }
}

/// One row of a full outer join: present on either or both sides.
#[derive(Debug, Clone)]
pub struct JoinedRow {
    /// Source-side record, if the join found one.
    pub source: Option<Record>,

    /// Target-side record, if the join found one.
    pub target: Option<Record>,
}

/// Bulk set operations delegated to an external compute collaborator
/// (a distributed engine in production, an in-memory fixture in tests).
#[async_trait]
pub trait BulkProvider: Send + Sync {
    /// Full outer join of two row sets on the given key predicates.
    async fn full_outer_join(
        &self,
        source: Vec<Record>,
        target: Vec<Record>,
        on: &[JoinKeyExpr],
    ) -> Result<Vec<JoinedRow>>;

    /// Row count of a set.
    async fn count(&self, rows: &[Record]) -> Result<u64>;

    /// Distinct count of one column's normalized values.
    async fn distinct_count(&self, rows: &[Record], column: &str) -> Result<u64>;
}
