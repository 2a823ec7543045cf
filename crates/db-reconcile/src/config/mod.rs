//! Configuration loading and validation.

mod types;
mod validation;

pub use types::*;

use crate::error::Result;
use std::path::Path;

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validation::validate(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_yaml_minimal() {
        let yaml = r#"
source:
  dialect: mysql
  host: src.internal
  port: 3306
  database: sales
  username: audit
target:
  dialect: postgres
  host: tgt.internal
  port: 5432
  database: sales
  username: audit
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.source.dialect, "mysql");
        assert_eq!(config.reconcile.fetch_timeout_secs, 30);
        assert!(config.reconcile.mappings.is_empty());
    }

    #[test]
    fn test_from_yaml_with_mappings_and_strategy() {
        let yaml = r#"
source:
  dialect: oracle
  host: src.internal
  port: 1521
  database: XE
  username: audit
target:
  dialect: sqlserver
  host: tgt.internal
  port: 1433
  database: sales
  username: audit
reconcile:
  workers: 2
  strategy:
    mode: fuzzy
    numeric_tolerance: 0.9
  mappings:
    - source_table: transactions
      target_table: transactions
      key_columns: [transaction_id]
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.reconcile.effective_workers(), 2);
        assert_eq!(config.reconcile.mappings.len(), 1);
        assert_eq!(
            config.reconcile.mappings[0].key_columns,
            vec!["transaction_id"]
        );
        assert!(matches!(
            config.reconcile.strategy,
            MatchingStrategy::Fuzzy(_)
        ));
    }

    #[test]
    fn test_from_yaml_rejects_invalid() {
        let yaml = r#"
source:
  dialect: db2
  host: src.internal
  port: 50000
  database: sales
  username: audit
target:
  dialect: postgres
  host: tgt.internal
  port: 5432
  database: sales
  username: audit
"#;
        assert!(Config::from_yaml(yaml).is_err());
    }
}
