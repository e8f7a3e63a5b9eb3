//! Relational+spatial store abstraction
//!
//! The importer talks to the store through the [`SpatialStore`] trait:
//! existence checks, table creation, and bulk inserts. Each mutating
//! operation runs inside its own transaction committed before the call
//! returns, so a crash between datasets leaves every finished dataset
//! durably committed.

use async_trait::async_trait;

use crate::models::{ColumnSpec, Row};

pub mod postgres;
pub mod sql;

pub use postgres::PostgresStore;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Failed to connect to the store
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Existence query failed
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Schema creation rejected by the store
    #[error("DDL failed: {0}")]
    DdlFailed(String),

    /// Bulk insert rejected by the store
    #[error("insert failed: {0}")]
    InsertFailed(String),

    /// Transaction begin or commit failed
    #[error("transaction failed: {0}")]
    TransactionFailed(String),

    /// Derived identifier failed charset validation
    #[error("invalid table identifier: {0}")]
    InvalidIdentifier(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Store operations the importer needs.
///
/// Implementations own their commit discipline: `create_table` and
/// `bulk_insert` must be durable once they return `Ok`.
#[async_trait]
pub trait SpatialStore: Send + Sync {
    /// Whether a table with the given identifier already exists.
    async fn table_exists(&self, table: &str) -> StoreResult<bool>;

    /// Create a table with the given columns and commit.
    async fn create_table(&self, table: &str, columns: &[ColumnSpec]) -> StoreResult<()>;

    /// Insert all rows in one statement, commit once, and return the number
    /// of rows written. Callers must not invoke this with an empty batch.
    async fn bulk_insert(
        &self,
        table: &str,
        columns: &[String],
        rows: &[Row],
    ) -> StoreResult<u64>;
}
