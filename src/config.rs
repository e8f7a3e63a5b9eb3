//! Importer configuration
//!
//! Environment-driven: credentials and connection details come from
//! environment variables, everything else has a sensible default that the
//! CLI can override per invocation.

use std::time::Duration;

use crate::source::DEFAULT_KEYWORD_PATTERN;

/// Environment variable for the portal API key (required)
pub const ENV_API_KEY: &str = "OPENDATA_API_KEY";

/// Environment variable for the PostgreSQL connection string
pub const ENV_DATABASE_URL: &str = "OPENDATA_DATABASE_URL";

/// Environment variable for the portal base URL
pub const ENV_BASE_URL: &str = "OPENDATA_BASE_URL";

/// Environment variable for the dataset category id
pub const ENV_CATEGORY: &str = "OPENDATA_CATEGORY";

/// Environment variable for the keyword pattern
pub const ENV_KEYWORDS: &str = "OPENDATA_KEYWORDS";

/// Default portal base URL
pub const DEFAULT_BASE_URL: &str = "https://apidata.mos.ru/v1";

/// Default dataset category ("roads and transport")
pub const DEFAULT_CATEGORY: i64 = 102;

/// Default PostgreSQL connection string for local development
pub const DEFAULT_DATABASE_URL: &str =
    "host=localhost port=5432 dbname=mos_transport user=mos password=mos";

/// Fixed per-request network deadline, in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required environment variable is absent
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    /// An environment variable carries an unusable value
    #[error("invalid value for {var}: {detail}")]
    InvalidVar { var: &'static str, detail: String },
}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Runtime configuration for one import run
#[derive(Debug, Clone)]
pub struct ImporterConfig {
    /// Portal API key, appended to every request
    pub api_key: String,
    /// PostgreSQL connection string
    pub database_url: String,
    /// Portal base URL
    pub base_url: String,
    /// Dataset category to discover
    pub category: i64,
    /// Keyword pattern for dataset name filtering
    pub keyword_pattern: String,
    /// Per-request network deadline
    pub request_timeout: Duration,
}

impl ImporterConfig {
    /// Build a configuration with defaults for everything but credentials.
    pub fn new(api_key: impl Into<String>, database_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            database_url: database_url.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            category: DEFAULT_CATEGORY,
            keyword_pattern: DEFAULT_KEYWORD_PATTERN.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    /// Load configuration from the environment.
    ///
    /// The API key is required; everything else falls back to its default.
    pub fn from_env() -> ConfigResult<Self> {
        let api_key =
            std::env::var(ENV_API_KEY).map_err(|_| ConfigError::MissingVar(ENV_API_KEY))?;
        let database_url =
            std::env::var(ENV_DATABASE_URL).unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let mut config = Self::new(api_key, database_url);
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply the optional environment overrides.
    pub fn apply_env_overrides(&mut self) -> ConfigResult<()> {
        if let Ok(base_url) = std::env::var(ENV_BASE_URL) {
            self.base_url = base_url;
        }
        if let Ok(category) = std::env::var(ENV_CATEGORY) {
            self.category = category.parse().map_err(|_| ConfigError::InvalidVar {
                var: ENV_CATEGORY,
                detail: format!("expected an integer, got {category:?}"),
            })?;
        }
        if let Ok(pattern) = std::env::var(ENV_KEYWORDS) {
            self.keyword_pattern = pattern;
        }
        Ok(())
    }
}
