//! Configuration validation.

use super::{Config, ConnectionProfile, MatchingStrategy};
use crate::dialect;
use crate::error::{ReconcileError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    validate_profile("source", &config.source)?;
    validate_profile("target", &config.target)?;

    if let Some(0) = config.reconcile.workers {
        return Err(ReconcileError::Config(
            "reconcile.workers must be at least 1".into(),
        ));
    }
    if config.reconcile.fetch_timeout_secs == 0 {
        return Err(ReconcileError::Config(
            "reconcile.fetch_timeout_secs must be at least 1".into(),
        ));
    }
    if !(0.0..=1.0).contains(&config.reconcile.uniqueness_threshold) {
        return Err(ReconcileError::Config(
            "reconcile.uniqueness_threshold must be between 0 and 1".into(),
        ));
    }

    for mapping in &config.reconcile.mappings {
        if mapping.source_table.is_empty() || mapping.target_table.is_empty() {
            return Err(ReconcileError::Config(
                "mapping source_table and target_table are required".into(),
            ));
        }
    }

    if let MatchingStrategy::Fuzzy(thresholds) = &config.reconcile.strategy {
        if !(0.0..=1.0).contains(&thresholds.numeric_tolerance) {
            return Err(ReconcileError::Config(
                "fuzzy numeric_tolerance must be between 0 and 1".into(),
            ));
        }
        if thresholds.potential_max > thresholds.review_max {
            return Err(ReconcileError::Config(format!(
                "fuzzy potential_max ({}) cannot exceed review_max ({})",
                thresholds.potential_max, thresholds.review_max
            )));
        }
    }

    Ok(())
}

fn validate_profile(side: &str, profile: &ConnectionProfile) -> Result<()> {
    if profile.host.is_empty() {
        return Err(ReconcileError::Config(format!("{side}.host is required")));
    }
    if profile.port == 0 {
        return Err(ReconcileError::Config(format!("{side}.port is required")));
    }
    if profile.database.is_empty() {
        return Err(ReconcileError::Config(format!(
            "{side}.database is required"
        )));
    }
    if profile.username.is_empty() {
        return Err(ReconcileError::Config(format!(
            "{side}.username is required"
        )));
    }

    // Unknown dialects fail here, before any connection is attempted.
    dialect::normalize_dialect(&profile.dialect)?;

    Ok(())
}
