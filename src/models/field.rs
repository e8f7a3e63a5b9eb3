//! Field descriptors inferred from dataset metadata

use serde::{Deserialize, Serialize};

/// Column name marker for the WGS84 longitude field (matched case-insensitively)
pub const LONGITUDE_FIELD: &str = "longitude_wgs84";

/// Column name marker for the WGS84 latitude field (matched case-insensitively)
pub const LATITUDE_FIELD: &str = "latitude_wgs84";

/// Storage type a source field's declared type is mapped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StorageType {
    Text,
    Integer,
    Numeric,
    Jsonb,
}

impl StorageType {
    /// SQL type name used in DDL
    pub fn sql_type(&self) -> &'static str {
        match self {
            StorageType::Text => "TEXT",
            StorageType::Integer => "INTEGER",
            StorageType::Numeric => "NUMERIC",
            StorageType::Jsonb => "JSONB",
        }
    }
}

impl std::fmt::Display for StorageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.sql_type())
    }
}

/// One typed field inferred from dataset metadata.
///
/// Immutable once derived; the descriptor order is significant and fixed for
/// the lifetime of the provisioned table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Attribute name as declared by the source
    pub name: String,
    /// Storage type the declared type maps to
    pub storage_type: StorageType,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, storage_type: StorageType) -> Self {
        Self {
            name: name.into(),
            storage_type,
        }
    }

    /// Whether this field carries the WGS84 longitude
    pub fn is_longitude(&self) -> bool {
        self.name.eq_ignore_ascii_case(LONGITUDE_FIELD)
    }

    /// Whether this field carries the WGS84 latitude
    pub fn is_latitude(&self) -> bool {
        self.name.eq_ignore_ascii_case(LATITUDE_FIELD)
    }
}
