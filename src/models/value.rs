//! SQL-level values carried by transformed rows

use serde_json::Value;

/// One value of a bulk-insert row.
///
/// `Json` holds already-serialized JSON text destined for a JSONB column;
/// `Geometry` holds EWKB bytes for the derived point column.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Json(String),
    Geometry(Vec<u8>),
}

/// Ordered sequence of values positionally aligned to a table's columns
pub type Row = Vec<SqlValue>;

impl SqlValue {
    /// Map a raw attribute value onto a storage value.
    ///
    /// Structured values landing in a non-JSONB column are carried as their
    /// JSON text rather than dropped.
    pub fn from_json(value: &Value) -> SqlValue {
        match value {
            Value::Null => SqlValue::Null,
            Value::Bool(b) => SqlValue::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    SqlValue::Integer(i)
                } else {
                    n.as_f64().map(SqlValue::Float).unwrap_or(SqlValue::Null)
                }
            }
            Value::String(s) => SqlValue::Text(s.clone()),
            other => SqlValue::Text(other.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}
