//! # Backend Port
//!
//! The merchant backend as the checkout sees it. The orchestration never
//! talks to the payment provider directly; every call goes through this
//! trait so tests can substitute an in-memory backend.
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │             BackendApi (trait)               │
//! │  ├── fetch_credential()                      │
//! │  ├── create_session()                        │
//! │  ├── payment_methods(session_id)             │
//! │  ├── create_payment(request)                 │
//! │  └── payment_status(payment_id)              │
//! └──────────────────────────────────────────────┘
//!                       ▲
//!          ┌────────────┴────────────┐
//!  ┌───────┴───────┐         ┌───────┴───────┐
//!  │  HttpBackend  │         │  test fakes   │
//!  └───────────────┘         └───────────────┘
//! ```

use crate::error::CheckoutResult;
use crate::payment::{CreatedPayment, PaymentRequest, StatusReport};
use crate::session::{Credential, PaymentMethod, SessionGrant};
use async_trait::async_trait;
use std::sync::Arc;

/// Merchant backend consumed by the checkout.
///
/// Implementations report transport and HTTP failures as
/// [`CheckoutError::Network`](crate::CheckoutError::Network); deciding what a
/// missing field means is left to the caller.
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// Public credential for the vendor SDK, if the backend has one
    async fn fetch_credential(&self) -> CheckoutResult<Option<Credential>>;

    /// Create a checkout session
    async fn create_session(&self) -> CheckoutResult<SessionGrant>;

    /// Payment methods offered for a session
    async fn payment_methods(&self, session_id: &str) -> CheckoutResult<Vec<PaymentMethod>>;

    /// Submit a tokenized payment
    async fn create_payment(&self, request: &PaymentRequest) -> CheckoutResult<CreatedPayment>;

    /// Current status of a payment
    async fn payment_status(&self, payment_id: &str) -> CheckoutResult<StatusReport>;
}

/// Type alias for a shared backend (dynamic dispatch)
pub type BoxedBackend = Arc<dyn BackendApi>;
