//! # checkout-api
//!
//! Merchant backend for the hosted checkout. Holds the provider's private
//! credentials and exposes the small HTTP surface the browser checkout
//! talks to: session creation, payment methods, payment creation and
//! payment status.

pub mod config;
pub mod country;
pub mod error;
pub mod handlers;
pub mod provider;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use provider::ProviderClient;
pub use state::AppState;
