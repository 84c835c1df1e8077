//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TAMARIND_BACKEND_URL` - Base URL of the external document store
//! - `TAMARIND_BACKEND_API_KEY` - API key sent with every backend request
//!
//! ## Optional
//! - `TAMARIND_SUBMIT_TIMEOUT_SECS` - Checkout submission deadline (default: 30)
//! - `TAMARIND_PRODUCT_CACHE_TTL_SECS` - Product query cache TTL (default: 300)
//! - `TAMARIND_ORDER_POLL_SECS` - Order watch poll interval (default: 15)

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_SUBMIT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PRODUCT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_ORDER_POLL_SECS: u64 = 15;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// External document store configuration.
    pub backend: BackendConfig,
    /// Deadline for the checkout create-order call.
    pub submit_timeout: Duration,
}

/// External document store configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct BackendConfig {
    /// Base URL of the document store's REST API.
    pub base_url: Url,
    /// API key sent with every request.
    pub api_key: SecretString,
    /// How long product query responses stay cached.
    pub product_cache_ttl: Duration,
    /// How often order watches poll for status changes.
    pub poll_interval: Duration,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[REDACTED]")
            .field("product_cache_ttl", &self.product_cache_ttl)
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a required variable is missing or a
    /// value cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = required("TAMARIND_BACKEND_URL")?;
        let base_url = Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("TAMARIND_BACKEND_URL".into(), e.to_string()))?;

        let api_key = SecretString::from(required("TAMARIND_BACKEND_API_KEY")?);

        let submit_timeout = Duration::from_secs(optional_u64(
            "TAMARIND_SUBMIT_TIMEOUT_SECS",
            DEFAULT_SUBMIT_TIMEOUT_SECS,
        )?);
        let product_cache_ttl = Duration::from_secs(optional_u64(
            "TAMARIND_PRODUCT_CACHE_TTL_SECS",
            DEFAULT_PRODUCT_CACHE_TTL_SECS,
        )?);
        let poll_interval = Duration::from_secs(optional_u64(
            "TAMARIND_ORDER_POLL_SECS",
            DEFAULT_ORDER_POLL_SECS,
        )?);

        Ok(Self {
            backend: BackendConfig {
                base_url,
                api_key,
                product_cache_ttl,
                poll_interval,
            },
            submit_timeout,
        })
    }

    /// Load a `.env` file if present, then read the environment.
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }
}

fn required(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_owned()))
}

fn optional_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidEnvVar(name.to_owned(), raw)),
        Err(_) => Ok(default),
    }
}
