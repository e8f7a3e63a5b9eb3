//! SQL statement composition
//!
//! Column names come straight from external metadata and are always
//! identifier-quoted before composition; string values are literal-quoted
//! with `''` doubling. Table identifiers have passed through slugification
//! and are additionally charset-validated here before any statement is
//! built.

use super::{StoreError, StoreResult};
use crate::models::{ColumnSpec, Row, SqlValue};

/// Validate a derived table identifier: non-empty, `[a-z0-9_]` only.
pub fn validate_table_identifier(table: &str) -> StoreResult<()> {
    let valid = !table.is_empty()
        && table
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidIdentifier(table.to_string()))
    }
}

/// Quote an identifier sourced from external metadata.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Quote a string as a SQL literal.
pub fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Render one row value as a SQL literal.
///
/// Geometry bytes render as a hex EWKB string literal, which the geometry
/// input function parses directly.
pub fn render_value(value: &SqlValue) -> String {
    match value {
        SqlValue::Null => "NULL".to_string(),
        SqlValue::Bool(true) => "TRUE".to_string(),
        SqlValue::Bool(false) => "FALSE".to_string(),
        SqlValue::Integer(i) => i.to_string(),
        SqlValue::Float(f) => f.to_string(),
        SqlValue::Text(s) | SqlValue::Json(s) => quote_literal(s),
        SqlValue::Geometry(bytes) => {
            let mut hex = String::with_capacity(bytes.len() * 2 + 2);
            hex.push('\'');
            for byte in bytes {
                hex.push_str(&format!("{byte:02X}"));
            }
            hex.push('\'');
            hex
        }
    }
}

/// Compose a `CREATE TABLE` statement.
pub fn create_table_sql(table: &str, columns: &[ColumnSpec]) -> StoreResult<String> {
    validate_table_identifier(table)?;
    let cols: Vec<String> = columns
        .iter()
        .map(|c| format!("{} {}", quote_ident(&c.name), c.sql_type))
        .collect();
    Ok(format!(
        "CREATE TABLE {} (\n    {}\n)",
        table,
        cols.join(",\n    ")
    ))
}

/// Compose a multi-row `INSERT` statement.
pub fn insert_sql(table: &str, columns: &[String], rows: &[Row]) -> StoreResult<String> {
    validate_table_identifier(table)?;
    let cols: Vec<String> = columns.iter().map(|c| quote_ident(c)).collect();
    let tuples: Vec<String> = rows
        .iter()
        .map(|row| {
            let values: Vec<String> = row.iter().map(render_value).collect();
            format!("({})", values.join(","))
        })
        .collect();
    Ok(format!(
        "INSERT INTO {} ({}) VALUES {}",
        table,
        cols.join(","),
        tuples.join(",")
    ))
}
