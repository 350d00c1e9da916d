//! # Backend Configuration
//!
//! Provider credentials and listen address, loaded from environment
//! variables. The credentials are required: the service refuses to start
//! without them.

use crate::error::{ApiError, ApiResult};
use checkout_core::Credential;
use std::env;
use std::net::SocketAddr;

/// Merchant backend configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Provider account the sessions and payments belong to
    pub account_code: String,

    /// Public key handed to the browser SDK (`sandbox_...`, `prod_...`)
    pub public_api_key: String,

    /// Private key, never leaves the server
    pub private_secret_key: String,

    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Provider base URL override (for testing/mocking)
    pub provider_url: Option<String>,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `ACCOUNT_CODE`
    /// - `PUBLIC_API_KEY`
    /// - `PRIVATE_SECRET_KEY`
    ///
    /// Optional: `HOST` (127.0.0.1), `PORT` (8080), `PROVIDER_API_URL`.
    pub fn from_env() -> ApiResult<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ApiError::Config(format!("PORT must be a port number, got {:?}", raw)))?,
            Err(_) => 8080,
        };

        Ok(Self {
            account_code: required("ACCOUNT_CODE")?,
            public_api_key: required("PUBLIC_API_KEY")?,
            private_secret_key: required("PRIVATE_SECRET_KEY")?,
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port,
            provider_url: env::var("PROVIDER_API_URL").ok().filter(|u| !u.is_empty()),
        })
    }

    /// Create config with explicit values (for testing)
    pub fn new(
        account_code: impl Into<String>,
        public_api_key: impl Into<String>,
        private_secret_key: impl Into<String>,
    ) -> Self {
        Self {
            account_code: account_code.into(),
            public_api_key: public_api_key.into(),
            private_secret_key: private_secret_key.into(),
            host: "127.0.0.1".to_string(),
            port: 8080,
            provider_url: None,
        }
    }

    /// Builder: point provider calls somewhere else
    pub fn with_provider_url(mut self, url: impl Into<String>) -> Self {
        self.provider_url = Some(url.into());
        self
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> ApiResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ApiError::Config(format!("invalid listen address: {}", e)))
    }

    /// Provider base URL: the override if set, otherwise derived from the
    /// public key's environment prefix
    pub fn provider_base_url(&self) -> ApiResult<String> {
        if let Some(url) = &self.provider_url {
            return Ok(url.trim_end_matches('/').to_string());
        }

        let prefix = Credential::new(self.public_api_key.as_str()).prefix().to_string();
        let suffix = match prefix.as_str() {
            "dev" => "-dev",
            "staging" => "-staging",
            "sandbox" => "-sandbox",
            "prod" => "",
            other => {
                return Err(ApiError::Config(format!(
                    "PUBLIC_API_KEY has unknown environment prefix {:?}",
                    other
                )))
            }
        };
        Ok(format!("https://api{}.y.uno", suffix))
    }
}

fn required(name: &str) -> ApiResult<String> {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::Config(format!("{} not set", name)))
}
