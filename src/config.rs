use std::env;

use thiserror::Error;
use validator::Validate;

const DEFAULT_API_BASE: &str = "https://bigquery.googleapis.com/bigquery/v2";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("BIGQUERY_ACCESS_TOKEN is not set (an OAuth2 bearer token is required)")]
    MissingAccessToken,

    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Client settings with validation
#[derive(Clone, Debug, Validate)]
pub struct Settings {
    /// BigQuery REST API base URL
    #[validate(length(min = 1, message = "API base cannot be empty"))]
    pub api_base: String,

    /// OAuth2 bearer token used for every API call
    #[validate(length(min = 1, message = "Access token cannot be empty"))]
    pub access_token: String,

    /// Retries per request on transient failure (0-10)
    #[validate(range(max = 10, message = "Max retries must be at most 10"))]
    pub max_retries: u32,

    /// Initial backoff delay in milliseconds, doubled per retry
    #[validate(range(
        min = 1,
        max = 60_000,
        message = "Backoff must be between 1 and 60000 ms"
    ))]
    pub backoff_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            access_token: String::new(),
            max_retries: 3,
            backoff_ms: 500,
        }
    }
}

impl Settings {
    /// Create settings from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let settings = Self {
            api_base: env::var("BQFLATTEN_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            access_token: env::var("BIGQUERY_ACCESS_TOKEN")
                .map_err(|_| ConfigError::MissingAccessToken)?,
            max_retries: parse_env_var("BQFLATTEN_MAX_RETRIES", "3")?,
            backoff_ms: parse_env_var("BQFLATTEN_BACKOFF_MS", "500")?,
        };

        settings.validate()?;
        Ok(settings)
    }
}

/// Parse an environment variable with a default value
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}
