//! Bulk loading of transformed rows
//!
//! Drives the record transformer over all features of one dataset and issues
//! a single multi-row insert, committed once. An empty feature sequence is a
//! no-op; a store rejection aborts the whole dataset's load, leaving earlier
//! datasets' commits untouched.

use serde_json::Value;
use tracing::{debug, info};

use crate::database::{SpatialStore, StoreError};
use crate::models::{Row, TableHandle};
use crate::transform::{CoercionFault, RecordTransformer, feature_attributes};

/// Error during bulk loading
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Insert or its commit rejected by the store
    #[error("store rejected bulk load: {0}")]
    Store(#[from] StoreError),
}

/// Result type for bulk loading
pub type LoadResult<T> = Result<T, LoadError>;

/// Outcome of loading one dataset's features
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    /// Rows written by the single bulk insert
    pub rows_inserted: u64,
    /// Value-level coercion faults collected across the batch
    pub faults: Vec<CoercionFault>,
}

/// Loads all features of one dataset into its provisioned table.
pub struct BatchLoader<'a, S: SpatialStore> {
    store: &'a S,
}

impl<'a, S: SpatialStore> BatchLoader<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Transform every feature and insert all rows in one statement.
    pub async fn load(
        &self,
        handle: &TableHandle,
        features: &[Value],
    ) -> LoadResult<LoadReport> {
        if features.is_empty() {
            debug!(table = %handle.name, "no features, nothing to load");
            return Ok(LoadReport::default());
        }

        let transformer = RecordTransformer::for_table(handle);
        let mut rows: Vec<Row> = Vec::with_capacity(features.len());
        let mut faults = Vec::new();
        for feature in features {
            let attributes = feature_attributes(feature);
            let mut record = transformer.transform(&attributes);
            rows.push(record.row);
            faults.append(&mut record.faults);
        }

        let columns = handle.column_names();
        let rows_inserted = self.store.bulk_insert(&handle.name, &columns, &rows).await?;
        info!(
            table = %handle.name,
            rows = rows_inserted,
            faults = faults.len(),
            "bulk insert committed"
        );
        Ok(LoadReport {
            rows_inserted,
            faults,
        })
    }
}
