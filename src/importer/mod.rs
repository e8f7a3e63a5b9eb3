//! Per-dataset import orchestration
//!
//! Drives discovery, provisioning and loading strictly sequentially: one
//! dataset at a time, one metadata fetch, one feature fetch and one bulk
//! insert per dataset. One dataset's failure never halts the run: it is
//! recorded in the summary and processing continues with the next id.

use serde_json::Value;
use tracing::{info, warn};

use crate::database::SpatialStore;
use crate::load::{BatchLoader, LoadError};
use crate::provision::{ProvisionError, TableProvisioner};
use crate::report::InventoryEntry;
use crate::schema::{self, SchemaError, SchemaMapper, dataset_display_name};
use crate::source::{DatasetSource, KeywordFilter, SourceError, SourceResult};

/// Error importing one dataset; fatal for that dataset only
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Provision(#[from] ProvisionError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// One discovered target dataset
#[derive(Debug, Clone)]
pub struct TargetDataset {
    pub dataset_id: i64,
    pub name: String,
    pub meta: Value,
}

/// Outcome of one successfully imported dataset
#[derive(Debug, Clone)]
pub struct DatasetOutcome {
    pub dataset_id: i64,
    pub table: String,
    pub rows_inserted: u64,
    /// Number of value-level coercion faults across the batch
    pub faults: usize,
}

/// One dataset that failed, with the rendered error
#[derive(Debug, Clone)]
pub struct FailedDataset {
    pub dataset_id: i64,
    pub error: String,
}

/// Summary of one import run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub imported: Vec<DatasetOutcome>,
    pub failed: Vec<FailedDataset>,
}

impl RunSummary {
    /// Whether every target dataset imported cleanly.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Total rows written across all datasets.
    pub fn total_rows(&self) -> u64 {
        self.imported.iter().map(|o| o.rows_inserted).sum()
    }
}

/// Sequential importer over one source and one store.
pub struct DatasetImporter<S: DatasetSource, D: SpatialStore> {
    source: S,
    store: D,
    filter: KeywordFilter,
    category: i64,
}

/// Discover the target datasets of one category: every id whose display
/// name matches the keyword filter.
///
/// A dataset whose metadata cannot be fetched is skipped with a warning;
/// discovery of the id list itself failing is fatal for the run.
pub async fn discover_targets<S: DatasetSource>(
    source: &S,
    filter: &KeywordFilter,
    category: i64,
) -> SourceResult<Vec<TargetDataset>> {
    let ids = source.dataset_ids(category).await?;
    info!(category, candidates = ids.len(), "discovered datasets");

    let mut targets = Vec::new();
    for dataset_id in ids {
        let meta = match source.dataset_metadata(dataset_id).await {
            Ok(meta) => meta,
            Err(e) => {
                warn!(dataset_id, "skipping dataset, metadata unavailable: {e}");
                continue;
            }
        };
        let Some(name) = dataset_display_name(&meta) else {
            continue;
        };
        if filter.matches(name) {
            targets.push(TargetDataset {
                dataset_id,
                name: name.to_string(),
                meta,
            });
        }
    }
    info!(targets = targets.len(), "keyword filter applied");
    Ok(targets)
}

/// Build inventory report entries for the target datasets of one category,
/// using the declared (unmapped) field types.
pub async fn build_inventory<S: DatasetSource>(
    source: &S,
    filter: &KeywordFilter,
    category: i64,
) -> SourceResult<Vec<InventoryEntry>> {
    let targets = discover_targets(source, filter, category).await?;
    Ok(targets
        .into_iter()
        .map(|target| {
            let fields = schema::raw_fields(&target.meta)
                .map(|entries| {
                    entries
                        .iter()
                        .filter_map(|entry| {
                            schema::field_name(entry).map(|name| {
                                (
                                    name.to_string(),
                                    schema::field_declared_type(entry).map(str::to_string),
                                )
                            })
                        })
                        .collect()
                })
                .unwrap_or_default();
            InventoryEntry {
                dataset_id: target.dataset_id,
                name: target.name,
                fields,
            }
        })
        .collect())
}

impl<S: DatasetSource, D: SpatialStore> DatasetImporter<S, D> {
    pub fn new(source: S, store: D, filter: KeywordFilter, category: i64) -> Self {
        Self {
            source,
            store,
            filter,
            category,
        }
    }

    /// Inventory report entries for this importer's target datasets.
    pub async fn inventory(&self) -> SourceResult<Vec<InventoryEntry>> {
        build_inventory(&self.source, &self.filter, self.category).await
    }

    /// Import one dataset: infer its schema, provision its table, fetch its
    /// features and bulk load them.
    pub async fn import_dataset(&self, dataset_id: i64) -> Result<DatasetOutcome, ImportError> {
        let meta = self.source.dataset_metadata(dataset_id).await?;
        let name = dataset_display_name(&meta)
            .map(str::to_string)
            .unwrap_or_else(|| format!("dataset_{dataset_id}"));

        let fields = SchemaMapper::infer(&meta)?;
        let handle = TableProvisioner::new(&self.store)
            .provision(dataset_id, &name, fields)
            .await?;

        let features = self.source.features(dataset_id).await?;
        let report = BatchLoader::new(&self.store).load(&handle, &features).await?;

        Ok(DatasetOutcome {
            dataset_id,
            table: handle.name,
            rows_inserted: report.rows_inserted,
            faults: report.faults.len(),
        })
    }

    /// Import every target dataset sequentially, isolating failures.
    pub async fn run(&self) -> SourceResult<RunSummary> {
        let targets = discover_targets(&self.source, &self.filter, self.category).await?;

        let mut summary = RunSummary::default();
        for target in &targets {
            match self.import_dataset(target.dataset_id).await {
                Ok(outcome) => {
                    info!(
                        dataset_id = outcome.dataset_id,
                        table = %outcome.table,
                        rows = outcome.rows_inserted,
                        "dataset imported"
                    );
                    summary.imported.push(outcome);
                }
                Err(e) => {
                    warn!(dataset_id = target.dataset_id, "dataset import failed: {e}");
                    summary.failed.push(FailedDataset {
                        dataset_id: target.dataset_id,
                        error: e.to_string(),
                    });
                }
            }
        }
        info!(
            imported = summary.imported.len(),
            failed = summary.failed.len(),
            rows = summary.total_rows(),
            "import run finished"
        );
        Ok(summary)
    }
}
