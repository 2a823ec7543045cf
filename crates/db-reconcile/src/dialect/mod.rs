//! SQL dialect capability interface and registry.
//!
//! Engine-specific knowledge (connection URL shape, driver class name,
//! metadata queries, identifier quoting) lives behind the [`Dialect`]
//! trait, implemented once per engine and selected through the
//! [`DialectCatalog`] registry. The reconciliation engine itself depends
//! only on the trait; nothing else in the crate branches on a dialect
//! name string.

mod mssql;
mod mysql;
mod oracle;
mod postgres;

pub use mssql::MssqlDialect;
pub use mysql::MysqlDialect;
pub use oracle::OracleDialect;
pub use postgres::PostgresDialect;

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::ConnectionProfile;
use crate::error::{ReconcileError, Result};

/// SQL syntax and metadata capability for one database engine.
pub trait Dialect: Send + Sync {
    /// Canonical dialect identifier (e.g. "mysql", "postgres").
    fn name(&self) -> &str;

    /// Driver class name for JDBC-style connection collaborators.
    fn driver_name(&self) -> &str;

    /// Build the connection URL for a profile.
    fn connection_url(&self, profile: &ConnectionProfile) -> String;

    /// Quote an identifier (table name, column name, etc.).
    fn quote_ident(&self, name: &str) -> String;

    /// Parameterized query listing table names. Binds the schema/catalog
    /// filter unless [`binds_schema_filter`](Dialect::binds_schema_filter)
    /// is false.
    fn tables_query(&self) -> &str;

    /// Parameterized query listing column metadata for one table.
    fn columns_query(&self) -> &str;

    /// Parameterized query listing primary key columns for one table.
    fn primary_keys_query(&self) -> &str;

    /// Whether the metadata queries take a schema/catalog parameter.
    /// Oracle scopes metadata to the connected user instead.
    fn binds_schema_filter(&self) -> bool {
        true
    }
}

/// Normalize a dialect name or alias to its canonical form.
///
/// - "mysql", "mariadb" -> "mysql"
/// - "postgres", "postgresql", "pg" -> "postgres"
/// - "mssql", "sqlserver", "sql_server" -> "mssql"
/// - "oracle" -> "oracle"
pub fn normalize_dialect(name: &str) -> Result<&'static str> {
    match name.to_lowercase().as_str() {
        "mysql" | "mariadb" => Ok("mysql"),
        "postgres" | "postgresql" | "pg" => Ok("postgres"),
        "mssql" | "sqlserver" | "sql_server" => Ok("mssql"),
        "oracle" => Ok("oracle"),
        other => Err(ReconcileError::Config(format!(
            "Unknown database dialect: '{}'. Supported: mysql, postgres, mssql, oracle",
            other
        ))),
    }
}

/// Registry of dialects keyed by canonical name.
///
/// Explicitly constructed and injected rather than process-global, so
/// tests can register mock dialects and initialization stays
/// deterministic.
#[derive(Default)]
pub struct DialectCatalog {
    dialects: HashMap<String, Arc<dyn Dialect>>,
}

impl DialectCatalog {
    /// Create a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a catalog with the four built-in dialects registered.
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();
        catalog.register(MysqlDialect::new());
        catalog.register(PostgresDialect::new());
        catalog.register(MssqlDialect::new());
        catalog.register(OracleDialect::new());
        catalog
    }

    /// Register a dialect under its own name.
    pub fn register(&mut self, dialect: impl Dialect + 'static) {
        self.dialects
            .insert(dialect.name().to_string(), Arc::new(dialect));
    }

    /// Get a dialect by name or alias.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Dialect>> {
        let canonical = normalize_dialect(name).ok()?;
        self.dialects.get(canonical).cloned()
    }

    /// Get a dialect by name or alias, erroring if not registered.
    pub fn require(&self, name: &str) -> Result<Arc<dyn Dialect>> {
        let canonical = normalize_dialect(name)?;
        self.dialects.get(canonical).cloned().ok_or_else(|| {
            ReconcileError::Config(format!("Dialect not registered: {}", canonical))
        })
    }

    /// All registered dialect names.
    pub fn names(&self) -> Vec<&str> {
        self.dialects.keys().map(String::as_str).collect()
    }
}

impl std::fmt::Debug for DialectCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialectCatalog")
            .field("dialects", &self.dialects.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
pub(crate) fn test_profile(dialect: &str, port: u16) -> ConnectionProfile {
    ConnectionProfile {
        dialect: dialect.into(),
        host: "db.internal".into(),
        port,
        database: "sales".into(),
        username: "audit".into(),
        password: "pw".into(),
        schema_filter: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_dialect_aliases() {
        assert_eq!(normalize_dialect("MariaDB").unwrap(), "mysql");
        assert_eq!(normalize_dialect("pg").unwrap(), "postgres");
        assert_eq!(normalize_dialect("SQL_Server").unwrap(), "mssql");
        assert_eq!(normalize_dialect("oracle").unwrap(), "oracle");
        assert!(normalize_dialect("sqlite").is_err());
    }

    #[test]
    fn test_catalog_builtins() {
        let catalog = DialectCatalog::with_builtins();
        assert_eq!(catalog.names().len(), 4);

        // Alias resolution goes through the same registry entry.
        let by_alias = catalog.require("postgresql").unwrap();
        assert_eq!(by_alias.name(), "postgres");
    }

    #[test]
    fn test_catalog_require_unknown() {
        let catalog = DialectCatalog::new();
        assert!(catalog.require("mysql").is_err());
        assert!(catalog.get("mysql").is_none());
    }
}
