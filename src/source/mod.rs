//! Dataset feed collaborators
//!
//! The importer consumes metadata and feature feeds through the
//! [`DatasetSource`] trait; the HTTP implementation for apidata-style
//! open-data portals lives in [`http`]. Discovery keeps only the datasets
//! whose display name matches a [`KeywordFilter`].

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use serde_json::Value;

pub mod http;

pub use http::HttpDatasetSource;

/// Error type for feed access
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Transport-level failure (connect, timeout, body read)
    #[error("request failed: {0}")]
    Http(String),

    /// Non-success response where one is required
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    /// Response body did not decode as expected
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Keyword pattern did not compile
    #[error("invalid keyword pattern: {0}")]
    InvalidFilter(String),
}

/// Result type for feed access
pub type SourceResult<T> = Result<T, SourceError>;

/// Read-only access to one open-data portal.
///
/// All calls are sequential; there is no retry policy here, and a failed
/// metadata fetch is fatal for that dataset only.
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// All dataset ids of one category.
    async fn dataset_ids(&self, category: i64) -> SourceResult<Vec<i64>>;

    /// Raw metadata tree of one dataset. Non-success responses are errors.
    async fn dataset_metadata(&self, dataset_id: i64) -> SourceResult<Value>;

    /// All features of one dataset. A non-success response yields an empty
    /// list ("nothing to load"), not an error.
    async fn features(&self, dataset_id: i64) -> SourceResult<Vec<Value>>;
}

/// Default discovery pattern: metro, MCD and MCC mentions plus inflected
/// forms of "diameter" and "ring"
pub const DEFAULT_KEYWORD_PATTERN: &str = r"метро|мцд|мцк|диаметр\w*|кольц\w*";

static DEFAULT_KEYWORDS: Lazy<Regex> = Lazy::new(|| {
    RegexBuilder::new(DEFAULT_KEYWORD_PATTERN)
        .case_insensitive(true)
        .build()
        .expect("default keyword pattern must compile")
});

/// Case-insensitive keyword match over dataset display names
#[derive(Debug, Clone)]
pub struct KeywordFilter {
    regex: Regex,
}

impl KeywordFilter {
    /// Build a filter from a user-supplied pattern.
    pub fn new(pattern: &str) -> SourceResult<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| SourceError::InvalidFilter(e.to_string()))?;
        Ok(Self { regex })
    }

    /// Whether a dataset display name matches.
    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

impl Default for KeywordFilter {
    fn default() -> Self {
        Self {
            regex: DEFAULT_KEYWORDS.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_matches_transit_names() {
        let filter = KeywordFilter::default();
        assert!(filter.matches("Станции Московского метро"));
        assert!(filter.matches("Остановки МЦК"));
        assert!(filter.matches("Московские центральные диаметры"));
        assert!(filter.matches("Кольцевые маршруты"));
        assert!(!filter.matches("Парковки"));
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let filter = KeywordFilter::default();
        assert!(filter.matches("МЕТРО"));
        assert!(filter.matches("метро"));
    }

    #[test]
    fn test_custom_pattern() {
        let filter = KeywordFilter::new("bike|velo").unwrap();
        assert!(filter.matches("Velobike stations"));
        assert!(!filter.matches("Metro"));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        assert!(matches!(
            KeywordFilter::new("(unclosed"),
            Err(SourceError::InvalidFilter(_))
        ));
    }
}
