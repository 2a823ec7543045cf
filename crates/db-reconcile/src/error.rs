//! Error types for the reconciliation library.

use thiserror::Error;

/// Main error type for reconciliation operations.
#[derive(Error, Debug)]
pub enum ReconcileError {
    /// Configuration error (invalid YAML, missing fields, unknown dialect, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Schema metadata lookup failed for a table.
    ///
    /// Key inference degrades to the next fallback tier on this error;
    /// it only aborts a mapping when no tier can produce a key.
    #[error("Schema discovery failed for {table}: {message}")]
    SchemaDiscovery { table: String, message: String },

    /// Row fetch failed for a table (query error, driver error, bad dialect).
    #[error("Data fetch failed for {table}: {message}")]
    DataFetch { table: String, message: String },

    /// Row fetch exceeded the caller-supplied deadline.
    #[error("Data fetch timed out for {table} after {seconds}s")]
    FetchTimeout { table: String, seconds: u64 },

    /// No table mapping could be resolved for the run (nothing to compare).
    #[error("No table mappings could be resolved - nothing to compare")]
    NothingToCompare,

    /// Reconciliation was cancelled by the caller.
    #[error("Reconciliation cancelled")]
    Cancelled,

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReconcileError {
    /// Create a SchemaDiscovery error with table context.
    pub fn schema_discovery(table: impl Into<String>, message: impl Into<String>) -> Self {
        ReconcileError::SchemaDiscovery {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Create a DataFetch error with table context.
    pub fn data_fetch(table: impl Into<String>, message: impl Into<String>) -> Self {
        ReconcileError::DataFetch {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Check whether this error aborts only the owning table mapping,
    /// as opposed to the whole run.
    pub fn is_mapping_scoped(&self) -> bool {
        matches!(
            self,
            ReconcileError::SchemaDiscovery { .. }
                | ReconcileError::DataFetch { .. }
                | ReconcileError::FetchTimeout { .. }
        )
    }

    /// Format error with full details including error chain.
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for reconciliation operations.
pub type Result<T> = std::result::Result<T, ReconcileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_scoped_errors() {
        assert!(ReconcileError::data_fetch("orders", "boom").is_mapping_scoped());
        assert!(ReconcileError::schema_discovery("orders", "boom").is_mapping_scoped());
        assert!(ReconcileError::FetchTimeout {
            table: "orders".into(),
            seconds: 30
        }
        .is_mapping_scoped());

        assert!(!ReconcileError::Config("bad".into()).is_mapping_scoped());
        assert!(!ReconcileError::NothingToCompare.is_mapping_scoped());
        assert!(!ReconcileError::Cancelled.is_mapping_scoped());
    }

    #[test]
    fn test_error_display_carries_table_context() {
        let err = ReconcileError::data_fetch("dbo.orders", "connection reset");
        assert!(err.to_string().contains("dbo.orders"));
        assert!(err.to_string().contains("connection reset"));
    }
}
