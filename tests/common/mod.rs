//! Shared test doubles: an in-memory spatial store and a static dataset
//! source.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use opendata_pg::database::{SpatialStore, StoreError, StoreResult};
use opendata_pg::models::{ColumnSpec, Row};
use opendata_pg::source::{DatasetSource, SourceError, SourceResult};

/// One recorded bulk insert
#[derive(Debug, Clone)]
pub struct InsertCall {
    pub table: String,
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

#[derive(Debug, Default)]
pub struct MockStoreState {
    /// Created tables and their column specs
    pub tables: HashMap<String, Vec<ColumnSpec>>,
    /// Number of DDL statements issued
    pub ddl_statements: usize,
    /// Recorded bulk inserts, in call order
    pub inserts: Vec<InsertCall>,
    /// Tables whose bulk inserts are rejected
    pub failing_tables: HashSet<String>,
}

/// In-memory [`SpatialStore`] recording every call
#[derive(Debug, Default)]
pub struct MockStore {
    pub state: Mutex<MockStoreState>,
}

#[async_trait]
impl<'a> SpatialStore for &'a MockStore {
    async fn table_exists(&self, table: &str) -> StoreResult<bool> {
        Ok(self.state.lock().unwrap().tables.contains_key(table))
    }

    async fn create_table(&self, table: &str, columns: &[ColumnSpec]) -> StoreResult<()> {
        let mut state = self.state.lock().unwrap();
        state.ddl_statements += 1;
        state.tables.insert(table.to_string(), columns.to_vec());
        Ok(())
    }

    async fn bulk_insert(
        &self,
        table: &str,
        columns: &[String],
        rows: &[Row],
    ) -> StoreResult<u64> {
        let mut state = self.state.lock().unwrap();
        if state.failing_tables.contains(table) {
            return Err(StoreError::InsertFailed(format!("{table}: rejected")));
        }
        state.inserts.push(InsertCall {
            table: table.to_string(),
            columns: columns.to_vec(),
            rows: rows.to_vec(),
        });
        Ok(rows.len() as u64)
    }
}

/// Static [`DatasetSource`] backed by fixture values
#[derive(Debug, Default)]
pub struct StaticSource {
    pub category_ids: Vec<i64>,
    pub metadata: HashMap<i64, Value>,
    pub features: HashMap<i64, Vec<Value>>,
    /// Datasets whose metadata endpoint fails
    pub broken_metadata: HashSet<i64>,
}

impl StaticSource {
    pub fn with_dataset(mut self, dataset_id: i64, meta: Value, features: Vec<Value>) -> Self {
        self.category_ids.push(dataset_id);
        self.metadata.insert(dataset_id, meta);
        self.features.insert(dataset_id, features);
        self
    }
}

#[async_trait]
impl<'a> DatasetSource for &'a StaticSource {
    async fn dataset_ids(&self, _category: i64) -> SourceResult<Vec<i64>> {
        Ok(self.category_ids.clone())
    }

    async fn dataset_metadata(&self, dataset_id: i64) -> SourceResult<Value> {
        if self.broken_metadata.contains(&dataset_id) {
            return Err(SourceError::Status {
                endpoint: format!("datasets/{dataset_id}"),
                status: 500,
            });
        }
        self.metadata
            .get(&dataset_id)
            .cloned()
            .ok_or(SourceError::Status {
                endpoint: format!("datasets/{dataset_id}"),
                status: 404,
            })
    }

    async fn features(&self, dataset_id: i64) -> SourceResult<Vec<Value>> {
        Ok(self.features.get(&dataset_id).cloned().unwrap_or_default())
    }
}
