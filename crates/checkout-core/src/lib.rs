//! # checkout-core
//!
//! Checkout orchestration for a hosted payment vendor SDK.
//!
//! This crate provides:
//! - `CheckoutStateMachine`, the single owner of checkout state, with its
//!   `Trigger`s and `Effect`s
//! - `Checkout`, the orchestrator that feeds SDK callbacks and user actions
//!   into the machine and runs the resulting effects
//! - `SessionBootstrapper`, `FormReadinessDetector` and
//!   `PaymentStatusPoller`, the async leaves the orchestrator composes
//! - `BackendApi`, `SdkGateway`, `CheckoutCallbacks` and `FormSurface`, the
//!   capability traits for everything outside the crate
//! - `present` and `UiPresenter` for rendering state into the page
//! - `CheckoutError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use checkout_core::{Checkout, CheckoutConfig, TracingViewSink, UiPresenter};
//!
//! let checkout = Checkout::new(CheckoutConfig::default(), backend, sdk, surface);
//! tokio::spawn(UiPresenter::new(TracingViewSink).run(checkout.subscribe()));
//!
//! checkout.start().await?;
//! // the SDK now drives the flow through its callbacks;
//! // the page forwards clicks:
//! checkout.request_pay().await?;
//! ```

pub mod backend;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod form;
pub mod machine;
pub mod orchestrator;
pub mod payment;
pub mod poller;
pub mod presenter;
pub mod sdk;
pub mod session;

// Re-exports for convenience
pub use backend::{BackendApi, BoxedBackend};
pub use bootstrap::SessionBootstrapper;
pub use config::CheckoutConfig;
pub use error::{CheckoutError, CheckoutResult};
pub use form::{
    BoxedSurface, ElementInfo, FormReadinessDetector, FormSurface, MutationFeed, ReadinessMarkers,
};
pub use machine::{CheckoutState, CheckoutStateMachine, Effect, Trigger};
pub use orchestrator::Checkout;
pub use payment::{
    CreatedPayment, PaymentRecord, PaymentRequest, PaymentStatus, Settlement, StatusReport,
};
pub use poller::PaymentStatusPoller;
pub use presenter::{present, CheckoutView, TracingViewSink, UiPresenter, ViewSink};
pub use sdk::{
    hide_loader_best_effort, BoxedGateway, CheckoutCallbacks, RenderMode, SdkError, SdkErrorKind,
    SdkGateway, SdkHandle, StartCheckoutConfig,
};
pub use session::{
    Bootstrap, CheckoutSession, Credential, MethodSelection, PaymentMethod, PaymentToken,
    SessionGrant,
};
