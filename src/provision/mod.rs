//! Idempotent table provisioning
//!
//! Derives a deterministic table identifier from the dataset id and display
//! name, then creates the table once: if the identifier already resolves in
//! the store the existing table is reused as-is, with no drift detection and
//! no alteration path.

use tracing::{debug, info};

use crate::database::{SpatialStore, StoreError};
use crate::models::{ColumnSpec, FieldDescriptor, GEOMETRY_COLUMN, GEOMETRY_SQL_TYPE, TableHandle};

/// Slug substituted when a display name carries no usable characters
pub const FALLBACK_SLUG: &str = "dataset";

/// PostgreSQL identifier length limit
const MAX_IDENTIFIER_LEN: usize = 63;

/// Error during table provisioning
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    /// DDL or existence check rejected by the store
    #[error("store rejected provisioning: {0}")]
    Store(#[from] StoreError),
}

/// Result type for provisioning
pub type ProvisionResult<T> = Result<T, ProvisionError>;

/// GOST-style transliteration for one lowercase Cyrillic character.
///
/// Returns `None` for characters outside the Cyrillic alphabet; the hard and
/// soft signs map to the empty string rather than a separator.
fn transliterate(c: char) -> Option<&'static str> {
    Some(match c {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' | 'ё' | 'э' => "e",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "j",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "c",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "shch",
        'ъ' | 'ь' => "",
        'ы' => "y",
        'ю' => "yu",
        'я' => "ya",
        _ => return None,
    })
}

/// Derive a table-identifier slug from a display name.
///
/// Lowercases, transliterates Cyrillic to Latin, collapses every maximal run
/// of other characters to a single underscore, and strips edge underscores.
/// An empty result falls back to [`FALLBACK_SLUG`]. Idempotent: applying the
/// function to its own output is a no-op.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            slug.push(c);
        } else if let Some(mapped) = transliterate(c) {
            slug.push_str(mapped);
        } else if !slug.is_empty() && !slug.ends_with('_') {
            slug.push('_');
        }
    }
    let slug = slug.trim_matches('_');
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug.to_string()
    }
}

/// Derive the table identifier for a dataset.
///
/// Pure function of `(dataset_id, display_name)`; the slug is truncated so
/// the identifier never exceeds the PostgreSQL limit.
pub fn table_name(dataset_id: i64, display_name: &str) -> String {
    let prefix = format!("dataset_{dataset_id}_");
    let mut slug = slugify(display_name);
    if prefix.len() + slug.len() > MAX_IDENTIFIER_LEN {
        slug.truncate(MAX_IDENTIFIER_LEN - prefix.len());
        slug.truncate(slug.trim_end_matches('_').len());
    }
    format!("{prefix}{slug}")
}

/// Provisions one table per dataset, idempotently.
pub struct TableProvisioner<'a, S: SpatialStore> {
    store: &'a S,
}

impl<'a, S: SpatialStore> TableProvisioner<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Produce a [`TableHandle`] for the dataset, creating the table when it
    /// does not exist yet.
    ///
    /// The geometry column is appended, after all declared columns, exactly
    /// when the descriptors carry both coordinate markers. The creation
    /// statement is committed before this returns.
    pub async fn provision(
        &self,
        dataset_id: i64,
        display_name: &str,
        fields: Vec<FieldDescriptor>,
    ) -> ProvisionResult<TableHandle> {
        let has_geometry =
            fields.iter().any(|f| f.is_longitude()) && fields.iter().any(|f| f.is_latitude());
        let handle = TableHandle {
            name: table_name(dataset_id, display_name),
            fields,
            has_geometry,
        };

        if self.store.table_exists(&handle.name).await? {
            debug!(table = %handle.name, "table already exists, reusing");
            return Ok(handle);
        }

        let mut columns: Vec<ColumnSpec> = handle
            .fields
            .iter()
            .map(|f| ColumnSpec::new(&f.name, f.storage_type.sql_type()))
            .collect();
        if handle.has_geometry {
            columns.push(ColumnSpec::new(GEOMETRY_COLUMN, GEOMETRY_SQL_TYPE));
        }

        self.store.create_table(&handle.name, &columns).await?;
        info!(table = %handle.name, columns = columns.len(), "provisioned dataset table");
        Ok(handle)
    }
}
