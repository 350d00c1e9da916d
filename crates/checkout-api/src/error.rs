//! # API Errors
//!
//! Every failure leaves the service as `{ "error": ..., "data": ... }` with
//! the upstream status when the provider produced one.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Merchant backend error
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// The provider answered with a non-2xx status
    #[error("Provider returned HTTP {status} for {path}")]
    Provider {
        status: u16,
        path: String,
        data: Value,
    },

    /// The provider could not be reached
    #[error("Provider unreachable: {0}")]
    Network(String),
}

impl ApiError {
    /// Status relayed to the browser
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Provider { status, .. } => *status,
            ApiError::Config(_) | ApiError::Network(_) => 500,
        }
    }

    fn data(&self) -> Value {
        match self {
            ApiError::Provider { data, .. } => data.clone(),
            _ => Value::Null,
        }
    }
}

/// Error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub data: Value,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorResponse {
            error: self.to_string(),
            data: self.data(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type alias for backend operations
pub type ApiResult<T> = Result<T, ApiError>;
