//! # db-reconcile
//!
//! Cross-database data reconciliation engine.
//!
//! Given a pair of tables believed to hold the same data on two
//! heterogeneous databases (MySQL, PostgreSQL, SQL Server, Oracle), this
//! library classifies rows as identical, differing (with per-field
//! diffs), or present on only one side. It provides:
//!
//! - **Key inference** - discovering which columns identify a row when no
//!   explicit key is configured (primary keys, business-key naming
//!   patterns, statistical uniqueness)
//! - **Value normalization** - making values comparable across native
//!   types, date formats, and fractional-second precision
//! - **Exact matching** - hash-map row classification with field diffs
//! - **Fuzzy matching** - tolerant, threshold-scored classification for
//!   large volumes, delegating set operations to a bulk collaborator
//! - **Orchestration** - bounded-parallel comparison across many table
//!   mappings with per-table failure isolation and cancellation
//!
//! Connection pooling, HTTP, and report rendering are collaborators
//! behind the traits in [`provider`]; the engine holds no state across
//! runs.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use db_reconcile::{Config, Orchestrator};
//! # use db_reconcile::provider::{SchemaProvider, DataSourceProvider};
//! # fn providers() -> (Arc<dyn SchemaProvider>, Arc<dyn DataSourceProvider>) { unimplemented!() }
//!
//! #[tokio::main]
//! async fn main() -> db_reconcile::Result<()> {
//!     let config = Config::load("reconcile.yaml")?;
//!     let (schema, data) = providers();
//!     let orchestrator = Orchestrator::new(config, schema, data)?;
//!     let summary = orchestrator.run(None).await?;
//!     println!("{} identical rows", summary.result.identical_count);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod dialect;
pub mod error;
pub mod index;
pub mod infer;
pub mod normalize;
pub mod orchestrator;
pub mod provider;
pub mod reconcile;

// Re-exports for convenient access
pub use config::{
    Config, ConnectionProfile, FuzzyThresholds, MatchingStrategy, ReconcileSettings, TableMapping,
};
pub use core::{ColumnDescriptor, Record, Value};
pub use dialect::{Dialect, DialectCatalog};
pub use error::{ReconcileError, Result};
pub use index::{CompositeKey, RowIndex};
pub use infer::{InferredKey, KeyInference, KeyTier};
pub use normalize::normalize;
pub use orchestrator::{Orchestrator, RunSummary, SkippedTable};
pub use reconcile::{
    DifferenceRecord, FieldDifference, ReconciliationResult, Severity,
};
