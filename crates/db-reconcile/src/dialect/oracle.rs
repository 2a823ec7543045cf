//! Oracle dialect.

use super::Dialect;
use crate::config::ConnectionProfile;

/// Oracle dialect implementation.
#[derive(Debug, Clone, Default)]
pub struct OracleDialect;

impl OracleDialect {
    /// Create a new Oracle dialect instance.
    pub fn new() -> Self {
        Self
    }
}

impl Dialect for OracleDialect {
    fn name(&self) -> &str {
        "oracle"
    }

    fn driver_name(&self) -> &str {
        "oracle.jdbc.OracleDriver"
    }

    fn connection_url(&self, profile: &ConnectionProfile) -> String {
        // Service-name form (double slashes), not the legacy SID form
        format!(
            "jdbc:oracle:thin:@//{}:{}/{}",
            profile.host, profile.port, profile.database
        )
    }

    fn quote_ident(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    // user_* views are scoped to the connected schema; no filter parameter.
    fn tables_query(&self) -> &str {
        "SELECT table_name FROM user_tables"
    }

    fn columns_query(&self) -> &str {
        "SELECT column_name, data_type, nullable AS is_nullable, \
         data_length AS character_maximum_length \
         FROM user_tab_columns WHERE table_name = ?"
    }

    fn primary_keys_query(&self) -> &str {
        "SELECT cols.column_name \
         FROM user_constraints cons \
         JOIN user_cons_columns cols ON cols.constraint_name = cons.constraint_name \
         WHERE cons.constraint_type = 'P' AND cols.table_name = ? \
         ORDER BY cols.position"
    }

    fn binds_schema_filter(&self) -> bool {
        false
    }
}
