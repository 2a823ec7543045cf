//! Microsoft SQL Server dialect.

use super::Dialect;
use crate::config::ConnectionProfile;

/// SQL Server dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct MssqlDialect;

impl MssqlDialect {
    /// Create a new SQL Server dialect instance.
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for MssqlDialect {
    fn name(&self) -> &str {
        "mssql"
    }

    fn driver_name(&self) -> &str {
        "com.microsoft.sqlserver.jdbc.SQLServerDriver"
    }

    fn connection_url(&self, profile: &ConnectionProfile) -> String {
        format!(
            "jdbc:sqlserver://{}:{};databaseName={}",
            profile.host, profile.port, profile.database
        )
    }

    fn quote_ident(&self, name: &str) -> String {
        // Bracket quoting; embedded closing brackets doubled
        format!("[{}]", name.replace(']', "]]"))
    }

    // SQL Server metadata is scoped by catalog, not schema.
    fn tables_query(&self) -> &str {
        "SELECT table_name FROM information_schema.tables WHERE table_catalog = ?"
    }

    fn columns_query(&self) -> &str {
        "SELECT column_name, data_type, is_nullable, character_maximum_length \
         FROM information_schema.columns WHERE table_catalog = ? AND table_name = ?"
    }

    fn primary_keys_query(&self) -> &str {
        "SELECT kcu.column_name \
         FROM information_schema.table_constraints tc \
         JOIN information_schema.key_column_usage kcu \
           ON kcu.constraint_name = tc.constraint_name \
         WHERE tc.constraint_type = 'PRIMARY KEY' \
           AND tc.table_catalog = ? AND tc.table_name = ? \
         ORDER BY kcu.ordinal_position"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::test_profile;

    #[test]
    fn test_connection_url() {
        let dialect = MssqlDialect::new();
        assert_eq!(
            dialect.connection_url(&test_profile("mssql", 1433)),
            "jdbc:sqlserver://db.internal:1433;databaseName=sales"
        );
    }

    #[test]
    fn test_quote_ident() {
        let dialect = MssqlDialect::new();
        assert_eq!(dialect.quote_ident("orders"), "[orders]");
        assert_eq!(dialect.quote_ident("odd]name"), "[odd]]name]");
    }
}
