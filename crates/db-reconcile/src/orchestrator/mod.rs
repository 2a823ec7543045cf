//! Reconciliation orchestrator - drives one or many table mappings.
//!
//! Mappings are independent and run under bounded parallelism (a worker
//! pool sized to the connections each side can spare). Within a mapping
//! the two row fetches run concurrently and the comparison waits on both.
//! A failure in one mapping is logged and skipped; the run always returns
//! whatever was successfully computed.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{watch, Semaphore};
use tokio::time::timeout;
use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::config::{
    Config, ConnectionProfile, FuzzyThresholds, MatchingStrategy, TableMapping,
};
use crate::core::{ColumnDescriptor, Record};
use crate::error::{ReconcileError, Result};
use crate::index::RowIndex;
use crate::infer::KeyInference;
use crate::provider::{BulkProvider, DataSourceProvider, SchemaProvider};
use crate::reconcile::{exact, fuzzy::FuzzyReconciler, ReconciliationResult};

/// A table mapping that could not be compared, with the reason.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedTable {
    /// Mapping display name.
    pub table: String,
    /// Why it was skipped.
    pub reason: String,
}

/// Result of a reconciliation run.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    /// Unique run identifier.
    pub run_id: String,

    /// Final status: "completed", "partial", or "cancelled".
    pub status: String,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// When the run completed.
    pub completed_at: DateTime<Utc>,

    /// Total duration in seconds.
    pub duration_seconds: f64,

    /// Mappings resolved for the run.
    pub tables_total: usize,

    /// Mappings successfully compared.
    pub tables_compared: usize,

    /// Mappings skipped due to per-table failures.
    pub skipped: Vec<SkippedTable>,

    /// Whether the caller cancelled before all mappings were dispatched.
    pub cancelled: bool,

    /// The mappings used, with inferred key columns filled in. The report
    /// renderer leads with these columns.
    pub mappings: Vec<TableMapping>,

    /// Aggregated classification across all compared mappings.
    pub result: ReconciliationResult,
}

impl RunSummary {
    /// Convert to a pretty JSON string for the report layer.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Reconciliation orchestrator.
pub struct Orchestrator {
    config: Arc<Config>,
    schema: Arc<dyn SchemaProvider>,
    data: Arc<dyn DataSourceProvider>,
    bulk: Option<Arc<dyn BulkProvider>>,
}

impl Orchestrator {
    /// Create a new orchestrator. Validates the configuration.
    pub fn new(
        config: Config,
        schema: Arc<dyn SchemaProvider>,
        data: Arc<dyn DataSourceProvider>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            schema,
            data,
            bulk: None,
        })
    }

    /// Attach the bulk compute collaborator (required for fuzzy strategy).
    pub fn with_bulk(mut self, bulk: Arc<dyn BulkProvider>) -> Self {
        self.bulk = Some(bulk);
        self
    }

    /// Run the reconciliation.
    pub async fn run(&self, cancel: Option<watch::Receiver<bool>>) -> Result<RunSummary> {
        let started_at = Utc::now();
        let run_id = uuid::Uuid::new_v4().to_string();

        let cancel = cancel.unwrap_or_else(|| {
            let (_, rx) = watch::channel(false);
            rx
        });

        if matches!(self.config.reconcile.strategy, MatchingStrategy::Fuzzy(_))
            && self.bulk.is_none()
        {
            return Err(ReconcileError::Config(
                "fuzzy strategy requires a bulk compute provider".into(),
            ));
        }

        info!(run_id = %run_id, "starting reconciliation run");

        let mappings = self.resolve_mappings().await?;
        if mappings.is_empty() {
            return Err(ReconcileError::NothingToCompare);
        }
        info!(run_id = %run_id, tables = mappings.len(), "resolved table mappings");

        let workers = self.config.reconcile.effective_workers();
        let semaphore = Arc::new(Semaphore::new(workers));
        let mut handles = Vec::new();
        let mut cancelled = false;

        for (idx, mapping) in mappings.iter().enumerate() {
            if *cancel.borrow() {
                info!(run_id = %run_id, "cancellation requested, stopping dispatch");
                cancelled = true;
                break;
            }

            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break, // semaphore closed; cannot happen in practice
            };

            let ctx = MappingContext {
                config: self.config.clone(),
                schema: self.schema.clone(),
                data: self.data.clone(),
                bulk: self.bulk.clone(),
                mapping: mapping.clone(),
                cancel: cancel.clone(),
            };
            let table_name = mapping.display_name();
            let span = info_span!("reconcile_mapping", run_id = %run_id, table = %table_name);

            let handle = tokio::spawn(
                async move {
                    let result = process_mapping(ctx).await;
                    drop(permit);
                    result
                }
                .instrument(span),
            );

            handles.push((idx, table_name, handle));
        }

        let mut aggregate = ReconciliationResult::new();
        let mut skipped = Vec::new();
        let mut compared = 0usize;
        let dispatched = handles.len();
        let mut resolved = mappings.clone();

        for (idx, table, handle) in handles {
            match handle.await {
                Ok(Ok((result, key_columns))) => {
                    info!(
                        table = %table,
                        identical = result.identical_count,
                        differing = result.differences.len(),
                        unmatched_source = result.unmatched_source.len(),
                        unmatched_target = result.unmatched_target.len(),
                        "mapping compared"
                    );
                    resolved[idx].key_columns = key_columns;
                    aggregate.merge(result);
                    compared += 1;
                }
                Ok(Err(ReconcileError::Cancelled)) => {
                    cancelled = true;
                    skipped.push(SkippedTable {
                        table,
                        reason: "cancelled".into(),
                    });
                }
                Ok(Err(e)) => {
                    error!(table = %table, error = %e, "mapping failed, skipping");
                    skipped.push(SkippedTable {
                        table,
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    error!(table = %table, error = %e, "mapping task panicked, skipping");
                    skipped.push(SkippedTable {
                        table,
                        reason: format!("task panicked: {}", e),
                    });
                }
            }
        }

        // Mappings never dispatched due to cancellation
        for mapping in mappings.iter().skip(dispatched) {
            skipped.push(SkippedTable {
                table: mapping.display_name(),
                reason: "cancelled before dispatch".into(),
            });
        }

        let completed_at = Utc::now();
        let duration = (completed_at - started_at).num_milliseconds() as f64 / 1000.0;

        let status = if cancelled {
            "cancelled"
        } else if skipped.is_empty() {
            "completed"
        } else {
            "partial"
        };

        let summary = RunSummary {
            run_id: run_id.clone(),
            status: status.to_string(),
            started_at,
            completed_at,
            duration_seconds: duration,
            tables_total: mappings.len(),
            tables_compared: compared,
            skipped,
            cancelled,
            mappings: resolved,
            result: aggregate,
        };

        info!(
            run_id = %run_id,
            status = %summary.status,
            tables = summary.tables_total,
            compared = summary.tables_compared,
            identical = summary.result.identical_count,
            differing = summary.result.differences.len(),
            "reconciliation run finished in {:.1}s",
            summary.duration_seconds
        );

        Ok(summary)
    }

    /// Use configured mappings, or discover tables common to both sides by
    /// case-insensitive name equality.
    async fn resolve_mappings(&self) -> Result<Vec<TableMapping>> {
        if !self.config.reconcile.mappings.is_empty() {
            return Ok(self.config.reconcile.mappings.clone());
        }

        let source = &self.config.source;
        let target = &self.config.target;

        let source_tables = self
            .schema
            .list_tables(source, source.schema_filter.as_deref())
            .await?;
        let target_tables = self
            .schema
            .list_tables(target, target.schema_filter.as_deref())
            .await?;

        let mut mappings = Vec::new();
        for src in &source_tables {
            if let Some(tgt) = target_tables
                .iter()
                .find(|t| t.eq_ignore_ascii_case(src))
            {
                mappings.push(TableMapping::new(src.clone(), tgt.clone()));
            }
        }

        debug!(
            source = source_tables.len(),
            target = target_tables.len(),
            common = mappings.len(),
            "automatic table discovery"
        );

        Ok(mappings)
    }
}

/// Everything one mapping task needs, owned.
struct MappingContext {
    config: Arc<Config>,
    schema: Arc<dyn SchemaProvider>,
    data: Arc<dyn DataSourceProvider>,
    bulk: Option<Arc<dyn BulkProvider>>,
    mapping: TableMapping,
    cancel: watch::Receiver<bool>,
}

/// Compare one table mapping end to end. Returns the classification plus
/// the key columns actually used (explicit or inferred).
async fn process_mapping(ctx: MappingContext) -> Result<(ReconciliationResult, Vec<String>)> {
    let table = ctx.mapping.display_name();
    let config = &ctx.config;
    let mut cancel = ctx.cancel.clone();

    let source_filter = ctx
        .mapping
        .source_schema_filter
        .clone()
        .or_else(|| config.source.schema_filter.clone());
    let target_filter = ctx
        .mapping
        .target_schema_filter
        .clone()
        .or_else(|| config.target.schema_filter.clone());

    // Fetch both sides concurrently; comparison waits on both. The select
    // lets caller cancellation drop in-flight fetches.
    let deadline = Duration::from_secs(config.reconcile.fetch_timeout_secs);
    let fetches = async {
        tokio::join!(
            timeout(
                deadline,
                ctx.data
                    .fetch_rows(&config.source, &ctx.mapping.source_table, source_filter.as_deref()),
            ),
            timeout(
                deadline,
                ctx.data
                    .fetch_rows(&config.target, &ctx.mapping.target_table, target_filter.as_deref()),
            ),
        )
    };

    let (source_fetch, target_fetch) = tokio::select! {
        results = fetches => results,
        _ = wait_for_cancel(&mut cancel) => return Err(ReconcileError::Cancelled),
    };

    let source_rows = source_fetch.map_err(|_| ReconcileError::FetchTimeout {
        table: ctx.mapping.source_table.clone(),
        seconds: config.reconcile.fetch_timeout_secs,
    })??;
    let target_rows = target_fetch.map_err(|_| ReconcileError::FetchTimeout {
        table: ctx.mapping.target_table.clone(),
        seconds: config.reconcile.fetch_timeout_secs,
    })??;

    debug!(
        table = %table,
        source_rows = source_rows.len(),
        target_rows = target_rows.len(),
        "rows fetched"
    );

    // Resolve key columns once per run if the mapping left them empty.
    let key_columns = if ctx.mapping.key_columns.is_empty() {
        resolve_keys(&ctx, &source_rows).await?
    } else {
        ctx.mapping.key_columns.clone()
    };

    let result = match &config.reconcile.strategy {
        MatchingStrategy::Exact => {
            reconcile_exact(&table, source_rows, target_rows, &key_columns)
        }
        MatchingStrategy::Fuzzy(thresholds) => {
            let bulk = ctx
                .bulk
                .as_deref()
                .ok_or_else(|| ReconcileError::Config("bulk provider missing".into()))?;
            reconcile_fuzzy(&table, source_rows, target_rows, &key_columns, thresholds, bulk)
                .await?
        }
    };

    Ok((result, key_columns))
}

async fn wait_for_cancel(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow() {
            return;
        }
        if cancel.changed().await.is_err() {
            // Sender dropped without cancelling; never resolve.
            std::future::pending::<()>().await;
        }
    }
}

async fn resolve_keys(ctx: &MappingContext, source_rows: &[Record]) -> Result<Vec<String>> {
    let config = &ctx.config;
    let table = ctx.mapping.display_name();

    let source_cols = list_columns_or_derive(
        ctx.schema.as_ref(),
        &config.source,
        &ctx.mapping.source_table,
        source_rows,
    )
    .await;
    let target_cols = list_columns_or_derive(
        ctx.schema.as_ref(),
        &config.target,
        &ctx.mapping.target_table,
        &[],
    )
    .await;

    // Column listing can fail on the target while rows still fetched; in
    // that case mirror the source descriptors so the intersection holds.
    let target_cols = if target_cols.is_empty() {
        source_cols.clone()
    } else {
        target_cols
    };

    let inference = KeyInference::new(ctx.schema.as_ref(), config.reconcile.uniqueness_threshold);
    let inferred = inference
        .infer(
            &config.source,
            &config.target,
            &ctx.mapping,
            &source_cols,
            &target_cols,
            source_rows,
        )
        .await;

    if inferred.columns.is_empty() {
        return Err(ReconcileError::schema_discovery(
            table,
            "no common columns between source and target",
        ));
    }

    info!(table = %table, tier = ?inferred.tier, columns = ?inferred.columns, "key columns resolved");
    Ok(inferred.columns)
}

/// Column metadata from the schema provider, or derived from fetched rows
/// (every column nullable) when the lookup fails.
async fn list_columns_or_derive(
    schema: &dyn SchemaProvider,
    profile: &ConnectionProfile,
    table: &str,
    rows: &[Record],
) -> Vec<ColumnDescriptor> {
    match schema.list_columns(profile, table).await {
        Ok(cols) if !cols.is_empty() => cols,
        Ok(_) => derive_columns(rows),
        Err(e) => {
            warn!(table = %table, error = %e, "column lookup failed; deriving from rows");
            derive_columns(rows)
        }
    }
}

fn derive_columns(rows: &[Record]) -> Vec<ColumnDescriptor> {
    rows.first()
        .map(|r| {
            r.columns()
                .map(|name| ColumnDescriptor::new(name, "unknown", true))
                .collect()
        })
        .unwrap_or_default()
}

fn reconcile_exact(
    table: &str,
    source_rows: Vec<Record>,
    target_rows: Vec<Record>,
    key_columns: &[String],
) -> ReconciliationResult {
    let source = RowIndex::build(source_rows, key_columns);
    let target = RowIndex::build(target_rows, key_columns);

    if source.index.collisions() > 0 || target.index.collisions() > 0 {
        warn!(
            table = %table,
            source_collisions = source.index.collisions(),
            target_collisions = target.index.collisions(),
            "duplicate composite keys dropped from comparison (last row wins)"
        );
    }

    let mut result = exact::reconcile(table, source.index, target.index);

    // Records with no usable key are unmatched by definition.
    result.unmatched_source.extend(source.keyless);
    result.unmatched_target.extend(target.keyless);

    result
}

async fn reconcile_fuzzy(
    table: &str,
    source_rows: Vec<Record>,
    target_rows: Vec<Record>,
    key_columns: &[String],
    thresholds: &FuzzyThresholds,
    bulk: &dyn BulkProvider,
) -> Result<ReconciliationResult> {
    FuzzyReconciler::new(thresholds)
        .reconcile(table, source_rows, target_rows, key_columns, bulk)
        .await
}
