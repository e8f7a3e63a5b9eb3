//! opendata-pg - Importer for open geospatial dataset feeds
//!
//! Materializes each dataset of an open-data portal as a dedicated table in
//! PostgreSQL/PostGIS:
//! - Schema inference from loosely-typed dataset metadata
//! - Deterministic, idempotent table provisioning with a derived point column
//! - Record transformation with per-value coercion fault reporting
//! - One bulk insert, one commit, per dataset

pub mod config;
pub mod database;
pub mod geometry;
pub mod importer;
pub mod load;
pub mod models;
pub mod provision;
pub mod report;
pub mod schema;
pub mod source;
pub mod transform;

// Re-export commonly used types
pub use config::{ConfigError, ImporterConfig};
pub use database::{PostgresStore, SpatialStore, StoreError};
pub use geometry::{PointWgs84, SRID_WGS84};
pub use importer::{DatasetImporter, ImportError, RunSummary};
pub use load::{BatchLoader, LoadError, LoadReport};
pub use models::{FieldDescriptor, Row, SqlValue, StorageType, TableHandle};
pub use provision::{ProvisionError, TableProvisioner, slugify, table_name};
pub use schema::{SchemaError, SchemaMapper};
pub use source::{DatasetSource, HttpDatasetSource, KeywordFilter, SourceError};
pub use transform::{CoercionFault, RecordTransformer};
