//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All optional:
//! - `MARKETPLACE_API_URL` - Backend origin (default: `http://127.0.0.1:8000`)
//! - `MARKETPLACE_PAGE_SIZE` - Products per listing page (default: 10)
//! - `MARKETPLACE_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `MARKETPLACE_SESSION_FILE` - Where login state is kept
//!   (default: `.marketplace/session.json`)

use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;

use marketplace_core::DEFAULT_PAGE_SIZE;
use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SESSION_FILE: &str = ".marketplace/session.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Marketplace client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend origin all endpoint paths are joined onto
    pub api_url: Url,
    /// Products per listing page
    pub page_size: NonZeroU32,
    /// Per-request timeout
    pub timeout: Duration,
    /// Location of the persisted session
    pub session_file: PathBuf,
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(get_optional_env)
    }

    /// Build the configuration from `lookup`, which maps a variable name to
    /// its value if set.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_url = lookup("MARKETPLACE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_owned());
        let api_url = parse_api_url(&raw_url)?;

        let page_size = match lookup("MARKETPLACE_PAGE_SIZE") {
            Some(raw) => raw
                .trim()
                .parse::<NonZeroU32>()
                .map_err(|e| invalid("MARKETPLACE_PAGE_SIZE", &e))?,
            None => DEFAULT_PAGE_SIZE,
        };

        let timeout_secs = match lookup("MARKETPLACE_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|e| invalid("MARKETPLACE_TIMEOUT_SECS", &e))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let session_file = lookup("MARKETPLACE_SESSION_FILE")
            .map_or_else(|| PathBuf::from(DEFAULT_SESSION_FILE), PathBuf::from);

        Ok(Self {
            api_url,
            page_size,
            timeout: Duration::from_secs(timeout_secs),
            session_file,
        })
    }

    /// Configuration pointing at `api_url` with every other setting at its
    /// default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `api_url` is not a valid URL.
    pub fn for_api_url(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: parse_api_url(api_url)?,
            page_size: DEFAULT_PAGE_SIZE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse the backend origin, normalising it to end with `/` so relative
/// endpoint paths join under it rather than replacing its last segment.
fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw).map_err(|e| {
        ConfigError::InvalidEnvVar("MARKETPLACE_API_URL".to_string(), e.to_string())
    })?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            "MARKETPLACE_API_URL".to_string(),
            "must be an http(s) origin".to_string(),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn invalid(key: &str, error: &impl std::fmt::Display) -> ConfigError {
    ConfigError::InvalidEnvVar(key.to_string(), error.to_string())
}
