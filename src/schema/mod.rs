//! Schema inference from raw dataset metadata
//!
//! Open-data portals are loosely typed: the field list and the name/type of
//! each field can live under several alternative keys depending on the
//! dataset's age. Lookups go through explicit, ordered alias tables (the
//! first present key wins) rather than ad hoc conditionals.

use serde_json::Value;
use tracing::warn;

use crate::models::{FieldDescriptor, StorageType};

/// Keys the field list can live under, in priority order
pub const FIELD_LIST_ALIASES: [&str; 3] = ["Fields", "Columns", "Structure"];

/// Keys a field's name can live under, in priority order
pub const FIELD_NAME_ALIASES: [&str; 3] = ["Name", "ColumnName", "FieldName"];

/// Keys a field's declared type can live under, in priority order
pub const FIELD_TYPE_ALIASES: [&str; 2] = ["Type", "DataType"];

/// Keys a dataset's display name can live under, in priority order
pub const DATASET_NAME_ALIASES: [&str; 3] = ["Name", "Caption", "Title"];

/// Error during schema inference
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// No field-list alias resolved against the metadata tree
    #[error("metadata carries no field list under any of {FIELD_LIST_ALIASES:?}")]
    FieldListMissing,

    /// Every field entry was unusable (no resolvable name)
    #[error("metadata field list contains no entry with a resolvable name")]
    NoUsableFields,
}

/// Result type for schema inference
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Resolve the first alias present in a metadata object.
fn first_present<'a>(tree: &'a Value, aliases: &[&str]) -> Option<&'a Value> {
    aliases.iter().find_map(|key| tree.get(key))
}

/// Resolve a string through an alias table.
fn first_present_str<'a>(tree: &'a Value, aliases: &[&str]) -> Option<&'a str> {
    aliases
        .iter()
        .find_map(|key| tree.get(key).and_then(Value::as_str))
}

/// Dataset display name, resolved through [`DATASET_NAME_ALIASES`].
pub fn dataset_display_name(meta: &Value) -> Option<&str> {
    first_present_str(meta, &DATASET_NAME_ALIASES)
}

/// Raw field entries of a metadata tree, resolved through
/// [`FIELD_LIST_ALIASES`]. `None` when no alias matched or the value is not
/// an array.
pub fn raw_fields(meta: &Value) -> Option<&Vec<Value>> {
    first_present(meta, &FIELD_LIST_ALIASES).and_then(Value::as_array)
}

/// A raw field entry's name, resolved through [`FIELD_NAME_ALIASES`].
pub fn field_name(entry: &Value) -> Option<&str> {
    first_present_str(entry, &FIELD_NAME_ALIASES)
}

/// A raw field entry's declared type, resolved through
/// [`FIELD_TYPE_ALIASES`].
pub fn field_declared_type(entry: &Value) -> Option<&str> {
    first_present_str(entry, &FIELD_TYPE_ALIASES)
}

/// Map a declared source type onto a storage type.
///
/// Total over any input: unrecognized and absent types resolve to TEXT. The
/// declared type is uppercase-normalized before lookup.
pub fn map_type(declared: Option<&str>) -> StorageType {
    let normalized = declared.unwrap_or("STRING").trim().to_uppercase();
    match normalized.as_str() {
        "STRING" => StorageType::Text,
        "INTEGER" => StorageType::Integer,
        "NUMBER" => StorageType::Numeric,
        "DICTIONARY" | "CATALOG" | "LINK" => StorageType::Jsonb,
        _ => StorageType::Text,
    }
}

/// Infers an ordered list of typed field descriptors from a dataset's raw
/// metadata tree.
pub struct SchemaMapper;

impl SchemaMapper {
    /// Infer field descriptors, preserving source field order.
    ///
    /// A metadata tree without a resolvable field list fails with
    /// [`SchemaError::FieldListMissing`]. A field entry whose name resolves
    /// through no alias is skipped with a warning; an unnamed field must
    /// never reach column or identifier construction. If skipping leaves
    /// nothing usable the dataset fails with [`SchemaError::NoUsableFields`].
    pub fn infer(meta: &Value) -> SchemaResult<Vec<FieldDescriptor>> {
        let entries = raw_fields(meta).ok_or(SchemaError::FieldListMissing)?;

        let mut fields = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let Some(name) = field_name(entry) else {
                warn!(index, "skipping metadata field with no resolvable name");
                continue;
            };
            let storage_type = map_type(field_declared_type(entry));
            fields.push(FieldDescriptor::new(name, storage_type));
        }

        if fields.is_empty() {
            return Err(SchemaError::NoUsableFields);
        }
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_mapping_is_total() {
        assert_eq!(map_type(Some("STRING")), StorageType::Text);
        assert_eq!(map_type(Some("INTEGER")), StorageType::Integer);
        assert_eq!(map_type(Some("NUMBER")), StorageType::Numeric);
        assert_eq!(map_type(Some("DICTIONARY")), StorageType::Jsonb);
        assert_eq!(map_type(Some("CATALOG")), StorageType::Jsonb);
        assert_eq!(map_type(Some("LINK")), StorageType::Jsonb);
        assert_eq!(map_type(Some("GEOMETRY")), StorageType::Text);
        assert_eq!(map_type(Some("")), StorageType::Text);
        assert_eq!(map_type(None), StorageType::Text);
    }

    #[test]
    fn test_type_mapping_is_case_insensitive() {
        assert_eq!(map_type(Some("number")), StorageType::Numeric);
        assert_eq!(map_type(Some(" Dictionary ")), StorageType::Jsonb);
    }

    #[test]
    fn test_field_list_alias_priority() {
        let meta = json!({
            "Columns": [{"Name": "from_columns", "Type": "STRING"}],
            "Structure": [{"Name": "from_structure", "Type": "STRING"}],
        });
        let fields = SchemaMapper::infer(&meta).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "from_columns");
    }

    #[test]
    fn test_field_name_and_type_aliases() {
        let meta = json!({
            "Fields": [
                {"ColumnName": "a", "DataType": "NUMBER"},
                {"FieldName": "b"},
            ]
        });
        let fields = SchemaMapper::infer(&meta).unwrap();
        assert_eq!(
            fields,
            vec![
                FieldDescriptor::new("a", StorageType::Numeric),
                FieldDescriptor::new("b", StorageType::Text),
            ]
        );
    }

    #[test]
    fn test_source_order_is_preserved() {
        let meta = json!({
            "Fields": [
                {"Name": "z", "Type": "STRING"},
                {"Name": "a", "Type": "INTEGER"},
                {"Name": "m", "Type": "NUMBER"},
            ]
        });
        let names: Vec<_> = SchemaMapper::infer(&meta)
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, ["z", "a", "m"]);
    }

    #[test]
    fn test_missing_field_list_is_an_error() {
        assert!(matches!(
            SchemaMapper::infer(&json!({"Name": "no fields here"})),
            Err(SchemaError::FieldListMissing)
        ));
    }

    #[test]
    fn test_unnamed_field_is_skipped() {
        let meta = json!({
            "Fields": [
                {"Type": "STRING"},
                {"Name": "kept", "Type": "STRING"},
            ]
        });
        let fields = SchemaMapper::infer(&meta).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name, "kept");
    }

    #[test]
    fn test_all_fields_unnamed_is_an_error() {
        let meta = json!({"Fields": [{"Type": "STRING"}]});
        assert!(matches!(
            SchemaMapper::infer(&meta),
            Err(SchemaError::NoUsableFields)
        ));
    }

    #[test]
    fn test_dataset_display_name_aliases() {
        assert_eq!(
            dataset_display_name(&json!({"Caption": "Метро"})),
            Some("Метро")
        );
        assert_eq!(
            dataset_display_name(&json!({"Title": "t", "Name": "n"})),
            Some("n")
        );
        assert_eq!(dataset_display_name(&json!({})), None);
    }
}
