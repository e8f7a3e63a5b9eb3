//! Core data model for dataset import
//!
//! Defines the typed field descriptors inferred from dataset metadata, the
//! table handle produced by provisioning, and the SQL-level value type used
//! for bulk loading.

pub mod field;
pub mod table;
pub mod value;

pub use field::{FieldDescriptor, LATITUDE_FIELD, LONGITUDE_FIELD, StorageType};
pub use table::{ColumnSpec, GEOMETRY_COLUMN, GEOMETRY_SQL_TYPE, TableHandle};
pub use value::{Row, SqlValue};
