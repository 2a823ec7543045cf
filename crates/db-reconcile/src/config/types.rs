//! Configuration type definitions.

use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Source database connection profile.
    pub source: ConnectionProfile,

    /// Target database connection profile.
    pub target: ConnectionProfile,

    /// Reconciliation behavior configuration.
    #[serde(default)]
    pub reconcile: ReconcileSettings,
}

/// Connection profile for one side of the comparison.
///
/// Opaque to the engine beyond the dialect name; the connection
/// collaborator turns it into an actual session.
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectionProfile {
    /// Dialect name ("mysql", "postgres", "mssql", "oracle" or an alias).
    pub dialect: String,

    /// Database host.
    pub host: String,

    /// Database port.
    pub port: u16,

    /// Database name.
    pub database: String,

    /// Username.
    pub username: String,

    /// Credential.
    #[serde(default)]
    pub password: String,

    /// Default schema filter for metadata and row fetches.
    #[serde(default)]
    pub schema_filter: Option<String>,
}

// Manual Debug keeps the credential out of logs.
impl std::fmt::Debug for ConnectionProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionProfile")
            .field("dialect", &self.dialect)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"[PROTECTED]")
            .field("schema_filter", &self.schema_filter)
            .finish()
    }
}

/// One source-table/target-table pair to reconcile.
///
/// `key_columns` may be empty; the key inference engine fills it in once
/// per comparison run and it is not mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableMapping {
    /// Source table name.
    pub source_table: String,

    /// Target table name.
    pub target_table: String,

    /// Ordered key columns; empty means "infer".
    #[serde(default)]
    pub key_columns: Vec<String>,

    /// Per-mapping schema filter override on the source side.
    #[serde(default)]
    pub source_schema_filter: Option<String>,

    /// Per-mapping schema filter override on the target side.
    #[serde(default)]
    pub target_schema_filter: Option<String>,
}

impl TableMapping {
    /// Create a mapping with keys left to inference.
    pub fn new(source_table: impl Into<String>, target_table: impl Into<String>) -> Self {
        Self {
            source_table: source_table.into(),
            target_table: target_table.into(),
            key_columns: Vec::new(),
            source_schema_filter: None,
            target_schema_filter: None,
        }
    }

    /// Create a mapping with explicit key columns.
    pub fn with_keys(
        source_table: impl Into<String>,
        target_table: impl Into<String>,
        key_columns: Vec<String>,
    ) -> Self {
        Self {
            key_columns,
            ..Self::new(source_table, target_table)
        }
    }

    /// Display name used in logs and error context.
    pub fn display_name(&self) -> String {
        if self.source_table.eq_ignore_ascii_case(&self.target_table) {
            self.source_table.clone()
        } else {
            format!("{} -> {}", self.source_table, self.target_table)
        }
    }
}

/// Reconciliation behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileSettings {
    /// Parallel workers. Size this to the number of connections each side
    /// can spare; defaults to 4.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,

    /// Per-fetch deadline in seconds (default: 30).
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// Row matching strategy (default: exact).
    #[serde(default)]
    pub strategy: MatchingStrategy,

    /// Distinct-ratio above which a column counts as statistically unique
    /// during key inference (default: 0.8).
    #[serde(default = "default_uniqueness_threshold")]
    pub uniqueness_threshold: f64,

    /// Table mappings to compare. Empty triggers automatic discovery of
    /// common table names.
    #[serde(default)]
    pub mappings: Vec<TableMapping>,
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            workers: None,
            fetch_timeout_secs: default_fetch_timeout(),
            strategy: MatchingStrategy::default(),
            uniqueness_threshold: default_uniqueness_threshold(),
            mappings: Vec::new(),
        }
    }
}

impl ReconcileSettings {
    /// Effective worker-pool size.
    pub fn effective_workers(&self) -> usize {
        self.workers.unwrap_or(4).max(1)
    }
}

/// Row matching strategy for a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MatchingStrategy {
    /// Hash-map based exact matching with full field diffs.
    #[default]
    Exact,

    /// Tolerant, threshold-scored matching through a bulk collaborator.
    Fuzzy(FuzzyThresholds),
}

/// Thresholds and column policies for fuzzy matching.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FuzzyThresholds {
    /// Relative tolerance for monetary/numeric columns (default: 0.9).
    #[serde(default = "default_numeric_tolerance")]
    pub numeric_tolerance: f64,

    /// Relative tolerance for id-like numeric columns (default: 1.0).
    #[serde(default = "default_id_tolerance")]
    pub id_tolerance: f64,

    /// Name fragments marking a column as monetary/numeric.
    #[serde(default = "default_tolerance_columns")]
    pub tolerance_columns: Vec<String>,

    /// Columns that always join on strict equality.
    #[serde(default = "default_exact_columns")]
    pub exact_columns: Vec<String>,

    /// Upper mismatch count for the "potential match" band (default: 2).
    #[serde(default = "default_potential_max")]
    pub potential_max: u32,

    /// Upper mismatch count for the "manual review" band (default: 5).
    /// Beyond this the rows are treated as unrelated.
    #[serde(default = "default_review_max")]
    pub review_max: u32,
}

impl Default for FuzzyThresholds {
    fn default() -> Self {
        Self {
            numeric_tolerance: default_numeric_tolerance(),
            id_tolerance: default_id_tolerance(),
            tolerance_columns: default_tolerance_columns(),
            exact_columns: default_exact_columns(),
            potential_max: default_potential_max(),
            review_max: default_review_max(),
        }
    }
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_uniqueness_threshold() -> f64 {
    0.8
}

fn default_numeric_tolerance() -> f64 {
    0.9
}

fn default_id_tolerance() -> f64 {
    1.0
}

fn default_tolerance_columns() -> Vec<String> {
    vec!["amount".to_string(), "price".to_string()]
}

fn default_exact_columns() -> Vec<String> {
    vec!["card_number".to_string()]
}

fn default_potential_max() -> u32 {
    2
}

fn default_review_max() -> u32 {
    5
}
