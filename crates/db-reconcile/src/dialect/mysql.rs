//! MySQL / MariaDB dialect.

use super::Dialect;
use crate::config::ConnectionProfile;

/// MySQL dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct MysqlDialect;

impl MysqlDialect {
    /// Create a new MySQL dialect instance.
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for MysqlDialect {
    fn name(&self) -> &str {
        "mysql"
    }

    fn driver_name(&self) -> &str {
        "com.mysql.cj.jdbc.Driver"
    }

    fn connection_url(&self, profile: &ConnectionProfile) -> String {
        format!(
            "jdbc:mysql://{}:{}/{}?serverTimezone=UTC",
            profile.host, profile.port, profile.database
        )
    }

    fn quote_ident(&self, name: &str) -> String {
        // Backtick quoting; embedded backticks doubled
        format!("`{}`", name.replace('`', "``"))
    }

    fn tables_query(&self) -> &str {
        "SELECT table_name FROM information_schema.tables WHERE table_schema = ?"
    }

    fn columns_query(&self) -> &str {
        "SELECT column_name, data_type, is_nullable, character_maximum_length \
         FROM information_schema.columns WHERE table_schema = ? AND table_name = ?"
    }

    fn primary_keys_query(&self) -> &str {
        "SELECT column_name FROM information_schema.key_column_usage \
         WHERE table_schema = ? AND table_name = ? AND constraint_name = 'PRIMARY' \
         ORDER BY ordinal_position"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::test_profile;

    #[test]
    fn test_connection_url() {
        let dialect = MysqlDialect::new();
        assert_eq!(
            dialect.connection_url(&test_profile("mysql", 3306)),
            "jdbc:mysql://db.internal:3306/sales?serverTimezone=UTC"
        );
    }

    #[test]
    fn test_quote_ident() {
        let dialect = MysqlDialect::new();
        assert_eq!(dialect.quote_ident("orders"), "`orders`");
        assert_eq!(dialect.quote_ident("odd`name"), "`odd``name`");
    }
}
