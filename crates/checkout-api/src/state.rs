//! # Application State
//!
//! Shared state for the Axum application.

use crate::config::ApiConfig;
use crate::error::ApiResult;
use crate::provider::ProviderClient;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ApiConfig>,
    pub provider: Arc<ProviderClient>,
}

impl AppState {
    /// Build state from environment configuration
    pub fn new() -> ApiResult<Self> {
        Self::with_config(ApiConfig::from_env()?)
    }

    /// Build state from explicit configuration
    pub fn with_config(config: ApiConfig) -> ApiResult<Self> {
        let provider = ProviderClient::new(&config)?;
        Ok(Self {
            config: Arc::new(config),
            provider: Arc::new(provider),
        })
    }
}
