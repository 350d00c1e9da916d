//! # Vendor SDK Gateway
//!
//! Capability interface over the hosted payment vendor SDK. The SDK renders
//! the payment form and tokenizes instrument data; the checkout only drives
//! it through these calls and reacts to the callbacks it emits.

use crate::error::CheckoutResult;
use crate::payment::PaymentStatus;
use crate::session::{Credential, MethodSelection, PaymentToken};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Opaque handle returned by [`SdkGateway::initialize`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SdkHandle(String);

impl SdkHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

/// Where the SDK draws the checkout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Inline, inside the element selector
    #[default]
    Element,
    /// Vendor modal over the page
    Modal,
}

/// Options for [`SdkGateway::start_checkout`], named as the vendor expects
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartCheckoutConfig {
    pub checkout_session: String,
    pub element_selector: String,
    pub country_code: String,
    pub language: String,
    pub show_loading: bool,
    pub keep_loader: bool,
    pub render_mode: RenderMode,
}

/// Error reported by the SDK through [`CheckoutCallbacks::on_error`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SdkError {
    pub message: String,
}

/// Coarse classification of SDK errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdkErrorKind {
    /// A form field the SDK wanted to read was not rendered yet.
    /// Happens when pay is clicked before the form finished mounting.
    FormElementMissing,
    Other,
}

impl SdkError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> SdkErrorKind {
        let msg = self.message.to_lowercase();
        let missing = msg.contains("doesn't exist") || msg.contains("does not exist");
        if missing && (msg.contains("cvv") || msg.contains("element")) {
            SdkErrorKind::FormElementMissing
        } else {
            SdkErrorKind::Other
        }
    }
}

/// Inbound events the SDK emits. The checkout supplies one implementation
/// to [`SdkGateway::start_checkout`].
#[async_trait]
pub trait CheckoutCallbacks: Send + Sync {
    /// Buyer picked a payment method
    async fn on_method_selected(&self, selection: MethodSelection);

    /// SDK tokenized the instrument. The SDK awaits the returned future
    /// before it continues.
    async fn on_create_payment(&self, token: PaymentToken);

    /// SDK finished its own continuation step
    async fn on_payment_result(&self, status: PaymentStatus);

    /// SDK reported an error
    async fn on_error(&self, error: SdkError);
}

/// Outbound calls into the vendor SDK.
///
/// Every call may fail; failures are reported back to the state machine as
/// non-fatal events, except during bootstrap.
#[async_trait]
pub trait SdkGateway: Send + Sync {
    /// Whether the vendor entry point is loaded
    fn is_available(&self) -> bool;

    async fn initialize(&self, credential: &Credential) -> CheckoutResult<SdkHandle>;

    async fn start_checkout(
        &self,
        handle: &SdkHandle,
        config: &StartCheckoutConfig,
        callbacks: Arc<dyn CheckoutCallbacks>,
    ) -> CheckoutResult<()>;

    fn mount_checkout(&self, handle: &SdkHandle) -> CheckoutResult<()>;

    /// Ask the SDK to tokenize; answered by `on_create_payment`
    fn start_payment(&self, handle: &SdkHandle) -> CheckoutResult<()>;

    fn continue_payment(&self, handle: &SdkHandle) -> CheckoutResult<()>;

    fn hide_loader(&self, handle: &SdkHandle) -> CheckoutResult<()>;
}

/// Type alias for a shared gateway (dynamic dispatch)
pub type BoxedGateway = Arc<dyn SdkGateway>;

/// Hide the SDK loader, swallowing failures. Safe to call repeatedly.
pub fn hide_loader_best_effort(gateway: &dyn SdkGateway, handle: &SdkHandle) {
    if let Err(e) = gateway.hide_loader(handle) {
        debug!(handle = handle.id(), "hide_loader failed (ignored): {}", e);
    }
}
