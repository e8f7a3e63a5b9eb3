//! Feature record transformation
//!
//! Converts one raw feature record into a typed row aligned to the
//! provisioned column order. Coercion failures are per-value, never
//! per-record: a record with an uncoercible coordinate still produces a full
//! row with a null in that position, and every failure is surfaced as a
//! [`CoercionFault`] rather than silently discarded.

use serde_json::{Map, Value};
use tracing::warn;

use crate::geometry::PointWgs84;
use crate::models::{FieldDescriptor, Row, SqlValue, StorageType, TableHandle};

/// One non-fatal value-level conversion failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoercionFault {
    /// Field the value belonged to
    pub field: String,
    /// What went wrong
    pub detail: String,
}

impl std::fmt::Display for CoercionFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.detail)
    }
}

/// A transformed record: the row plus any value-level faults
#[derive(Debug, Clone)]
pub struct TransformedRecord {
    pub row: Row,
    pub faults: Vec<CoercionFault>,
}

/// Attribute map of a raw feature, found under `properties.attributes`.
///
/// A feature without that path yields an empty map, which transforms into an
/// all-null row rather than an error.
pub fn feature_attributes(feature: &Value) -> Map<String, Value> {
    feature
        .pointer("/properties/attributes")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

/// Coerce a raw attribute value to a finite double.
fn coerce_f64(value: &Value) -> Result<f64, String> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .filter(|f| f.is_finite())
            .ok_or_else(|| format!("number {n} is not a finite double")),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .ok_or_else(|| format!("cannot parse {s:?} as a double")),
        other => Err(format!("cannot coerce {other} to a double")),
    }
}

/// Converts raw feature records into rows for one provisioned table.
pub struct RecordTransformer<'a> {
    fields: &'a [FieldDescriptor],
    has_geometry: bool,
}

impl<'a> RecordTransformer<'a> {
    pub fn new(fields: &'a [FieldDescriptor], has_geometry: bool) -> Self {
        Self {
            fields,
            has_geometry,
        }
    }

    pub fn for_table(handle: &'a TableHandle) -> Self {
        Self::new(&handle.fields, handle.has_geometry)
    }

    /// Produce exactly one row from an attribute map.
    ///
    /// The row always holds `fields.len()` values, plus one geometry value
    /// (point or null) when the table carries the derived spatial column.
    pub fn transform(&self, attributes: &Map<String, Value>) -> TransformedRecord {
        let mut row = Vec::with_capacity(self.fields.len() + 1);
        let mut faults = Vec::new();
        let mut lon: Option<f64> = None;
        let mut lat: Option<f64> = None;

        for field in self.fields {
            let raw = attributes.get(&field.name);

            if field.storage_type == StorageType::Jsonb {
                // JSONB columns always receive an object, never JSON null
                let payload = match raw {
                    None | Some(Value::Null) => "{}".to_string(),
                    Some(value) => value.to_string(),
                };
                row.push(SqlValue::Json(payload));
                continue;
            }

            if field.is_longitude() || field.is_latitude() {
                let coordinate = match raw {
                    None | Some(Value::Null) => None,
                    Some(value) => match coerce_f64(value) {
                        Ok(parsed) => Some(parsed),
                        Err(detail) => {
                            faults.push(CoercionFault {
                                field: field.name.clone(),
                                detail,
                            });
                            None
                        }
                    },
                };
                if field.is_longitude() {
                    lon = coordinate;
                } else {
                    lat = coordinate;
                }
                row.push(coordinate.map(SqlValue::Float).unwrap_or(SqlValue::Null));
                continue;
            }

            row.push(raw.map(SqlValue::from_json).unwrap_or(SqlValue::Null));
        }

        if self.has_geometry {
            let geometry = match (lon, lat) {
                (Some(lon), Some(lat)) => {
                    SqlValue::Geometry(PointWgs84::new(lon, lat).to_ewkb())
                }
                _ => SqlValue::Null,
            };
            row.push(geometry);
        }

        for fault in &faults {
            warn!(field = %fault.field, "value coercion failed: {}", fault.detail);
        }

        debug_assert_eq!(
            row.len(),
            self.fields.len() + usize::from(self.has_geometry)
        );
        TransformedRecord { row, faults }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::SRID_WGS84;
    use serde_json::json;

    fn fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("longitude_wgs84", StorageType::Numeric),
            FieldDescriptor::new("latitude_wgs84", StorageType::Numeric),
            FieldDescriptor::new("title", StorageType::Text),
        ]
    }

    fn attrs(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_string_coordinates_coerce_and_derive_geometry() {
        let fields = fields();
        let transformer = RecordTransformer::new(&fields, true);
        let record = transformer.transform(&attrs(json!({
            "longitude_wgs84": "37.62",
            "latitude_wgs84": "55.75",
            "title": "Охотный ряд",
        })));

        assert!(record.faults.is_empty());
        assert_eq!(record.row.len(), 4);
        assert_eq!(record.row[0], SqlValue::Float(37.62));
        assert_eq!(record.row[1], SqlValue::Float(55.75));
        assert_eq!(record.row[2], SqlValue::Text("Охотный ряд".to_string()));

        let SqlValue::Geometry(ewkb) = &record.row[3] else {
            panic!("expected a geometry value");
        };
        let (point, srid) = PointWgs84::from_ewkb(ewkb).unwrap();
        assert_eq!(point, PointWgs84::new(37.62, 55.75));
        assert_eq!(srid, SRID_WGS84);
    }

    #[test]
    fn test_malformed_coordinate_yields_null_without_shrinking_row() {
        let fields = fields();
        let transformer = RecordTransformer::new(&fields, true);
        let record = transformer.transform(&attrs(json!({
            "longitude_wgs84": "n/a",
            "latitude_wgs84": "55.75",
            "title": "x",
        })));

        assert_eq!(record.row.len(), 4);
        assert_eq!(record.row[0], SqlValue::Null);
        assert_eq!(record.row[1], SqlValue::Float(55.75));
        assert_eq!(record.row[3], SqlValue::Null);
        assert_eq!(record.faults.len(), 1);
        assert_eq!(record.faults[0].field, "longitude_wgs84");
    }

    #[test]
    fn test_missing_attributes_yield_nulls() {
        let fields = fields();
        let transformer = RecordTransformer::new(&fields, true);
        let record = transformer.transform(&Map::new());

        assert_eq!(record.row.len(), 4);
        assert!(record.row.iter().all(SqlValue::is_null));
        // absence is not a coercion failure
        assert!(record.faults.is_empty());
    }

    #[test]
    fn test_jsonb_null_becomes_empty_object() {
        let fields = vec![
            FieldDescriptor::new("links", StorageType::Jsonb),
            FieldDescriptor::new("extras", StorageType::Jsonb),
        ];
        let transformer = RecordTransformer::new(&fields, false);
        let record = transformer.transform(&attrs(json!({
            "links": {"href": "x"},
            "extras": null,
        })));

        assert_eq!(
            record.row[0],
            SqlValue::Json("{\"href\":\"x\"}".to_string())
        );
        assert_eq!(record.row[1], SqlValue::Json("{}".to_string()));
    }

    #[test]
    fn test_row_width_without_geometry() {
        let fields = vec![FieldDescriptor::new("title", StorageType::Text)];
        let transformer = RecordTransformer::new(&fields, false);
        let record = transformer.transform(&Map::new());
        assert_eq!(record.row.len(), 1);
    }

    #[test]
    fn test_numeric_coordinate_values_pass_through() {
        let fields = fields();
        let transformer = RecordTransformer::new(&fields, true);
        let record = transformer.transform(&attrs(json!({
            "longitude_wgs84": 37.62,
            "latitude_wgs84": 55.75,
        })));
        assert_eq!(record.row[0], SqlValue::Float(37.62));
        assert!(matches!(record.row[3], SqlValue::Geometry(_)));
    }

    #[test]
    fn test_feature_attributes_path() {
        let feature = json!({
            "geometry": {"type": "Point"},
            "properties": {"attributes": {"title": "A"}},
        });
        assert_eq!(feature_attributes(&feature).get("title"), Some(&json!("A")));
        assert!(feature_attributes(&json!({"properties": {}})).is_empty());
        assert!(feature_attributes(&json!("not an object")).is_empty());
    }
}
