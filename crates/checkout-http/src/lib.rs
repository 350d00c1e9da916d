//! # checkout-http
//!
//! Reaches the merchant backend over HTTP for checkout-core.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use checkout_http::HttpBackend;
//! use std::sync::Arc;
//!
//! // CHECKOUT_BACKEND_URL=http://localhost:8080
//! let backend = Arc::new(HttpBackend::from_env()?);
//! let checkout = Checkout::new(CheckoutConfig::default(), backend, sdk, surface);
//! ```

pub mod client;
pub mod config;

pub use client::HttpBackend;
pub use config::BackendConfig;
