//! # Backend Client Configuration
//!
//! Where the merchant backend lives and how long to wait for it.
//! Loaded from environment variables.

use checkout_core::{CheckoutError, CheckoutResult};
use std::env;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Merchant backend client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Base URL of the merchant backend (no trailing slash)
    pub base_url: String,

    /// Country forwarded as `?country=` on every call
    pub country: Option<String>,

    /// Per-request timeout
    pub timeout: Duration,
}

impl BackendConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `CHECKOUT_BACKEND_URL`
    ///
    /// Optional:
    /// - `CHECKOUT_COUNTRY`
    /// - `CHECKOUT_HTTP_TIMEOUT_SECS` (default 30)
    pub fn from_env() -> CheckoutResult<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let base_url = env::var("CHECKOUT_BACKEND_URL")
            .map_err(|_| CheckoutError::Config("CHECKOUT_BACKEND_URL not set".to_string()))?;

        let timeout_secs = match env::var("CHECKOUT_HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                CheckoutError::Config(format!(
                    "CHECKOUT_HTTP_TIMEOUT_SECS must be a whole number of seconds, got {:?}",
                    raw
                ))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        let mut config =
            Self::new(base_url).with_timeout(Duration::from_secs(timeout_secs));
        if let Ok(country) = env::var("CHECKOUT_COUNTRY") {
            if !country.is_empty() {
                config = config.with_country(country);
            }
        }
        Ok(config)
    }

    /// Create config with explicit values (for testing)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            country: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Builder: forward a country on every call
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Builder: set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Absolute URL for a backend path
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
