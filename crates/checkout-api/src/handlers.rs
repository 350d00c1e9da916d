//! # Request Handlers
//!
//! Axum request handlers for the merchant backend. Provider JSON is relayed
//! unchanged on success; failures become [`ApiError`] responses.

use crate::country::DEFAULT_COUNTRY;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use checkout_core::PaymentRequest;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, instrument};

// =============================================================================
// Request/Response Types
// =============================================================================

/// `?country=XX`
#[derive(Debug, Deserialize)]
pub struct CountryQuery {
    #[serde(default)]
    pub country: Option<String>,
}

impl CountryQuery {
    pub fn country(&self) -> &str {
        self.country
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_COUNTRY)
    }
}

/// Public key response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyResponse {
    pub public_api_key: String,
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Liveness probe used by the browser SDK
pub async fn sdk_healthy() -> StatusCode {
    StatusCode::OK
}

/// Public key the browser SDK initializes with
pub async fn public_api_key(State(state): State<AppState>) -> Json<PublicKeyResponse> {
    Json(PublicKeyResponse {
        public_api_key: state.config.public_api_key.clone(),
    })
}

/// Create a checkout session
#[instrument(skip(state))]
pub async fn create_session(
    State(state): State<AppState>,
    Query(query): Query<CountryQuery>,
) -> ApiResult<Json<Value>> {
    state
        .provider
        .create_session(query.country())
        .await
        .map(Json)
        .map_err(log_failure("/checkout/sessions"))
}

/// Payment methods enabled for a session
#[instrument(skip(state))]
pub async fn payment_methods(
    State(state): State<AppState>,
    Path(session): Path<String>,
) -> ApiResult<Json<Value>> {
    state
        .provider
        .payment_methods(&session)
        .await
        .map(Json)
        .map_err(log_failure("/payment-methods"))
}

/// Create a payment from the SDK's one-time token
#[instrument(skip(state, request))]
pub async fn create_payment(
    State(state): State<AppState>,
    Query(query): Query<CountryQuery>,
    Json(request): Json<PaymentRequest>,
) -> ApiResult<Json<Value>> {
    info!(session = %request.checkout_session, country = query.country(), "Creating payment");

    state
        .provider
        .create_payment(query.country(), &request)
        .await
        .map(Json)
        .map_err(log_failure("/payments"))
}

/// Current payment status
#[instrument(skip(state))]
pub async fn payment_status(
    State(state): State<AppState>,
    Path(payment_id): Path<String>,
) -> ApiResult<Json<Value>> {
    state
        .provider
        .payment(&payment_id)
        .await
        .map(Json)
        .map_err(log_failure("/payments/{id}"))
}

fn log_failure(route: &'static str) -> impl Fn(ApiError) -> ApiError {
    move |err| {
        error!(route, status = err.status_code(), error = %err, "Request failed");
        err
    }
}
