//! HTTP dataset source for apidata-style open-data portals
//!
//! The portal exposes `/v1/categories` (OData-ish filtering),
//! `/v1/datasets/{id}` and `/v1/features/{id}`. The API key travels as a
//! query parameter on every request, and every request carries one fixed
//! bounded timeout. No retries: retry policy belongs to callers that want
//! one.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use super::{DatasetSource, SourceError, SourceResult};

/// Keys the category list can live under, in priority order
const CATEGORY_LIST_ALIASES: [&str; 2] = ["categories", "value"];

/// HTTP implementation of [`DatasetSource`]
pub struct HttpDatasetSource {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpDatasetSource {
    /// Build a client for one portal.
    ///
    /// # Arguments
    /// * `base_url` - portal root, e.g. `https://apidata.mos.ru/v1`
    /// * `api_key` - key appended to every request
    /// * `timeout` - per-request deadline
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> SourceResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Http(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    async fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> SourceResult<reqwest::Response> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%url, "portal request");
        self.http
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|e| SourceError::Http(format!("GET {path}: {e}")))
    }

    async fn decode(response: reqwest::Response, path: &str) -> SourceResult<Value> {
        response
            .json()
            .await
            .map_err(|e| SourceError::Decode(format!("{path}: {e}")))
    }
}

#[async_trait]
impl DatasetSource for HttpDatasetSource {
    async fn dataset_ids(&self, category: i64) -> SourceResult<Vec<i64>> {
        let filter = format!("Id eq {category}");
        let path = "categories";
        let response = self
            .get(path, &[("$filter", filter.as_str()), ("$top", "1")])
            .await?;
        if !response.status().is_success() {
            return Err(SourceError::Status {
                endpoint: path.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = Self::decode(response, path).await?;
        // The category list arrives in different wrappers depending on the
        // portal version; fall back to the body itself being the array.
        let categories = CATEGORY_LIST_ALIASES
            .iter()
            .find_map(|key| body.get(key))
            .unwrap_or(&body);
        let ids = categories
            .as_array()
            .and_then(|list| list.first())
            .and_then(|category| category.get("Datasets"))
            .and_then(Value::as_array)
            .map(|ids| ids.iter().filter_map(Value::as_i64).collect())
            .unwrap_or_default();
        Ok(ids)
    }

    async fn dataset_metadata(&self, dataset_id: i64) -> SourceResult<Value> {
        let path = format!("datasets/{dataset_id}");
        let response = self.get(&path, &[]).await?;
        if !response.status().is_success() {
            return Err(SourceError::Status {
                endpoint: path,
                status: response.status().as_u16(),
            });
        }
        Self::decode(response, &path).await
    }

    async fn features(&self, dataset_id: i64) -> SourceResult<Vec<Value>> {
        let path = format!("features/{dataset_id}");
        let response = self.get(&path, &[]).await?;
        if !response.status().is_success() {
            warn!(
                dataset_id,
                status = response.status().as_u16(),
                "feature feed unavailable, treating as empty"
            );
            return Ok(Vec::new());
        }

        let body = Self::decode(response, &path).await?;
        Ok(body
            .get("features")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }
}
