//! Table handles produced by provisioning

use serde::{Deserialize, Serialize};

use super::field::FieldDescriptor;

/// Name of the derived spatial column, appended after all declared columns
pub const GEOMETRY_COLUMN: &str = "geom";

/// SQL type of the derived spatial column (2D point, WGS84)
pub const GEOMETRY_SQL_TYPE: &str = "geometry(Point,4326)";

/// One column of a `CREATE TABLE` statement.
///
/// The name may come from external metadata and is identifier-quoted by the
/// store before statement composition; the SQL type is always one of our own
/// constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub sql_type: String,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
        }
    }
}

/// Handle describing one provisioned dataset table.
///
/// The identifier is a pure function of dataset id and display name; once a
/// table exists its schema is treated as immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableHandle {
    /// Derived table identifier, restricted to `[a-z0-9_]`
    pub name: String,
    /// Declared fields in provisioning order
    pub fields: Vec<FieldDescriptor>,
    /// Whether the table carries the derived spatial column
    pub has_geometry: bool,
}

impl TableHandle {
    /// Insert column order: declared fields first, geometry (if any) last.
    pub fn column_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.fields.iter().map(|f| f.name.clone()).collect();
        if self.has_geometry {
            names.push(GEOMETRY_COLUMN.to_string());
        }
        names
    }

    /// Number of values every row for this table must carry.
    pub fn width(&self) -> usize {
        self.fields.len() + usize::from(self.has_geometry)
    }
}
