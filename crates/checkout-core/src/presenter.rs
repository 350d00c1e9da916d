//! # UI Presenter
//!
//! Turns checkout state into what the page shows: whether pay is enabled,
//! whether a spinner is up, whether retry is offered, and a status label.
//! [`present`] is a pure function of the state; the presenter keeps nothing
//! of its own that could drift from the machine.

use crate::machine::CheckoutState;
use crate::payment::Settlement;
use serde::Serialize;
use tokio::sync::watch;
use tracing::info;

/// Rendered view of one checkout state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutView {
    pub pay_enabled: bool,
    pub busy: bool,
    pub retry_offered: bool,
    pub label: String,
}

impl CheckoutView {
    fn new(label: impl Into<String>) -> Self {
        Self {
            pay_enabled: false,
            busy: false,
            retry_offered: false,
            label: label.into(),
        }
    }

    fn busy(mut self) -> Self {
        self.busy = true;
        self
    }
}

/// Render a state
pub fn present(state: &CheckoutState) -> CheckoutView {
    match state {
        CheckoutState::Idle => CheckoutView::new("Loading checkout…").busy(),
        CheckoutState::MethodsLoaded => CheckoutView::new("Select a payment method"),
        CheckoutState::FormPending { .. } => CheckoutView::new("Preparing payment form…").busy(),
        CheckoutState::FormReady { .. } => CheckoutView {
            pay_enabled: true,
            ..CheckoutView::new("Pay")
        },
        CheckoutState::Submitting { .. } => CheckoutView::new("Processing payment…").busy(),
        CheckoutState::AwaitingSdkContinuation { .. } => {
            CheckoutView::new("Complete the verification step").busy()
        }
        CheckoutState::PollingStatus { .. } => CheckoutView::new("Confirming payment…").busy(),
        CheckoutState::Settled { record } => match record.settlement() {
            Settlement::Success => CheckoutView::new("Payment approved"),
            Settlement::Failure => {
                let label = match &record.sub_status {
                    Some(sub_status) => format!("Payment {} ({})", record.status, sub_status),
                    None => format!("Payment {}", record.status),
                };
                CheckoutView {
                    retry_offered: true,
                    ..CheckoutView::new(label)
                }
            }
            Settlement::Unknown => CheckoutView {
                retry_offered: true,
                ..CheckoutView::new(
                    "We could not confirm your payment yet. Retry or refresh to check again.",
                )
            },
        },
    }
}

/// Where rendered views go
pub trait ViewSink: Send {
    fn render(&mut self, view: &CheckoutView);
}

/// Sink that logs each view
#[derive(Debug, Default)]
pub struct TracingViewSink;

impl ViewSink for TracingViewSink {
    fn render(&mut self, view: &CheckoutView) {
        info!(
            pay_enabled = view.pay_enabled,
            busy = view.busy,
            retry_offered = view.retry_offered,
            "{}",
            view.label
        );
    }
}

/// Follows a state channel and renders every change into a sink
pub struct UiPresenter<S> {
    sink: S,
}

impl<S: ViewSink> UiPresenter<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Render the current state, then each change, until the checkout is
    /// dropped. Returns the sink.
    pub async fn run(mut self, mut states: watch::Receiver<CheckoutState>) -> S {
        loop {
            let view = {
                let state = states.borrow_and_update();
                present(&state)
            };
            self.sink.render(&view);

            if states.changed().await.is_err() {
                return self.sink;
            }
        }
    }
}
