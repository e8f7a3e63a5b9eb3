//! PostgreSQL/PostGIS store implementation
//!
//! Wraps a single tokio-postgres client. Every mutating operation opens an
//! explicit transaction and commits before returning; a failed operation
//! rolls back when the transaction is dropped.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::sql::{create_table_sql, insert_sql};
use super::{SpatialStore, StoreError, StoreResult};
use crate::models::{ColumnSpec, Row};

/// PostgreSQL store backend
pub struct PostgresStore {
    client: Arc<Mutex<tokio_postgres::Client>>,
}

impl PostgresStore {
    /// Connect to PostgreSQL.
    ///
    /// # Arguments
    /// * `connection_string` - libpq-style connection string
    pub async fn connect(connection_string: &str) -> StoreResult<Self> {
        let (client, connection) =
            tokio_postgres::connect(connection_string, tokio_postgres::NoTls)
                .await
                .map_err(|e| {
                    StoreError::ConnectionFailed(format!("failed to connect to PostgreSQL: {e}"))
                })?;

        // Drive the connection until the client is dropped
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("PostgreSQL connection error: {e}");
            }
        });

        Ok(Self {
            client: Arc::new(Mutex::new(client)),
        })
    }
}

#[async_trait]
impl SpatialStore for PostgresStore {
    async fn table_exists(&self, table: &str) -> StoreResult<bool> {
        let client = self.client.lock().await;
        let row = client
            .query_one("SELECT to_regclass($1)::text", &[&table])
            .await
            .map_err(|e| StoreError::QueryFailed(format!("existence check failed: {e}")))?;
        let resolved: Option<String> = row.get(0);
        Ok(resolved.is_some())
    }

    async fn create_table(&self, table: &str, columns: &[ColumnSpec]) -> StoreResult<()> {
        let ddl = create_table_sql(table, columns)?;

        let mut client = self.client.lock().await;
        let tx = client
            .transaction()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))?;
        tx.batch_execute(&ddl)
            .await
            .map_err(|e| StoreError::DdlFailed(format!("{table}: {e}")))?;
        tx.commit()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))?;
        Ok(())
    }

    async fn bulk_insert(
        &self,
        table: &str,
        columns: &[String],
        rows: &[Row],
    ) -> StoreResult<u64> {
        let statement = insert_sql(table, columns, rows)?;

        let mut client = self.client.lock().await;
        let tx = client
            .transaction()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))?;
        let inserted = tx
            .execute(&statement, &[])
            .await
            .map_err(|e| StoreError::InsertFailed(format!("{table}: {e}")))?;
        tx.commit()
            .await
            .map_err(|e| StoreError::TransactionFailed(e.to_string()))?;
        Ok(inserted)
    }
}
