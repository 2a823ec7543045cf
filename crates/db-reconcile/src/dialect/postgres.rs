//! PostgreSQL dialect.

use super::Dialect;
use crate::config::ConnectionProfile;

/// PostgreSQL dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Create a new PostgreSQL dialect instance.
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &str {
        "postgres"
    }

    fn driver_name(&self) -> &str {
        "org.postgresql.Driver"
    }

    fn connection_url(&self, profile: &ConnectionProfile) -> String {
        format!(
            "jdbc:postgresql://{}:{}/{}",
            profile.host, profile.port, profile.database
        )
    }

    fn quote_ident(&self, name: &str) -> String {
        // Double-quote quoting; embedded quotes doubled
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    fn tables_query(&self) -> &str {
        "SELECT table_name FROM information_schema.tables WHERE table_schema = ?"
    }

    fn columns_query(&self) -> &str {
        "SELECT column_name, data_type, is_nullable, character_maximum_length \
         FROM information_schema.columns WHERE table_schema = ? AND table_name = ?"
    }

    fn primary_keys_query(&self) -> &str {
        "SELECT kcu.column_name \
         FROM information_schema.table_constraints tc \
         JOIN information_schema.key_column_usage kcu \
           ON kcu.constraint_name = tc.constraint_name \
          AND kcu.table_schema = tc.table_schema \
         WHERE tc.constraint_type = 'PRIMARY KEY' \
           AND tc.table_schema = ? AND tc.table_name = ? \
         ORDER BY kcu.ordinal_position"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::test_profile;

    #[test]
    fn test_connection_url() {
        let dialect = PostgresDialect::new();
        assert_eq!(
            dialect.connection_url(&test_profile("postgres", 5432)),
            "jdbc:postgresql://db.internal:5432/sales"
        );
    }

    #[test]
    fn test_quote_ident() {
        let dialect = PostgresDialect::new();
        assert_eq!(dialect.quote_ident("orders"), "\"orders\"");
        assert_eq!(dialect.quote_ident("odd\"name"), "\"odd\"\"name\"");
    }
}
