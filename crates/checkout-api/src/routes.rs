//! # Routes
//!
//! Axum router configuration for the merchant backend.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - GET  /health, /sdk-web/healthy - Liveness
/// - GET  /public-api-key - Key the browser SDK initializes with
/// - POST /checkout/sessions?country=XX - Create a checkout session
/// - GET  /payment-methods/{session} - Methods enabled for a session
/// - POST /payments?country=XX - Create a payment from a one-time token
/// - GET  /payments/{payment_id} - Payment status
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let checkout_routes = Router::new()
        .route("/public-api-key", get(handlers::public_api_key))
        .route("/checkout/sessions", post(handlers::create_session))
        .route("/payment-methods/{session}", get(handlers::payment_methods))
        .route("/payments", post(handlers::create_payment))
        .route("/payments/{payment_id}", get(handlers::payment_status));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/sdk-web/healthy", get(handlers::sdk_healthy))
        .merge(checkout_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
