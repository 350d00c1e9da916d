//! # Checkout Orchestrator
//!
//! [`Checkout`] wires the leaves together and is the only caller of the
//! state machine. SDK callbacks, user clicks and finished background work
//! all come in as triggers; the effects the machine hands back are run
//! here.
//!
//! The machine sits behind a `std::sync::Mutex` that is held only for the
//! duration of one `fire` call, never across an `.await`. Each state change
//! is published on a `watch` channel for presenters.

use crate::backend::BoxedBackend;
use crate::bootstrap::{lock, SessionBootstrapper};
use crate::config::CheckoutConfig;
use crate::error::{CheckoutError, CheckoutResult};
use crate::form::{BoxedSurface, FormReadinessDetector};
use crate::machine::{CheckoutState, CheckoutStateMachine, Effect, Trigger};
use crate::payment::{PaymentRecord, PaymentRequest, PaymentStatus, Settlement};
use crate::poller::PaymentStatusPoller;
use crate::sdk::{
    hide_loader_best_effort, BoxedGateway, CheckoutCallbacks, SdkError, SdkErrorKind, SdkGateway,
    SdkHandle, StartCheckoutConfig,
};
use crate::session::{CheckoutSession, MethodSelection, PaymentMethod, PaymentToken};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

const MAX_PROBE_BACKOFF: Duration = Duration::from_secs(1);

/// Session and SDK handle, present once the SDK is initialized
#[derive(Debug, Clone)]
struct SdkContext {
    session: CheckoutSession,
    handle: SdkHandle,
}

struct Inner {
    config: CheckoutConfig,
    backend: BoxedBackend,
    gateway: BoxedGateway,
    bootstrapper: SessionBootstrapper,
    detector: FormReadinessDetector,
    poller: PaymentStatusPoller,
    machine: Mutex<CheckoutStateMachine>,
    state_tx: watch::Sender<CheckoutState>,
    context: Mutex<Option<SdkContext>>,
    methods: Mutex<Vec<PaymentMethod>>,
    started: AtomicBool,
}

impl Inner {
    fn session_id(&self) -> Option<String> {
        lock(&self.context).as_ref().map(|c| c.session.id.clone())
    }

    fn handle(&self) -> Option<SdkHandle> {
        lock(&self.context).as_ref().map(|c| c.handle.clone())
    }

    /// Feed one trigger through the machine and publish the new state
    fn fire(&self, trigger: Trigger) -> CheckoutResult<Vec<Effect>> {
        let session_id = self.session_id().unwrap_or_default();
        let mut machine = lock(&self.machine);
        let result = machine.fire(trigger);

        match &result {
            Ok(_) => {
                let next = machine.state().clone();
                self.state_tx.send_if_modified(|current| {
                    if *current == next {
                        false
                    } else {
                        *current = next;
                        true
                    }
                });
            }
            Err(e @ CheckoutError::TokenIgnored { .. }) => {
                info!(session_id = %session_id, state = machine.state().name(), "{}", e);
            }
            Err(e) => {
                debug!(session_id = %session_id, state = machine.state().name(), "{}", e);
            }
        }

        result
    }
}

/// The checkout flow for one page load
#[derive(Clone)]
pub struct Checkout {
    inner: Arc<Inner>,
}

impl Checkout {
    pub fn new(
        config: CheckoutConfig,
        backend: BoxedBackend,
        gateway: BoxedGateway,
        surface: BoxedSurface,
    ) -> Self {
        let bootstrapper = SessionBootstrapper::new(
            backend.clone(),
            gateway.clone(),
            config.fallback_country.clone(),
        );
        let poller = PaymentStatusPoller::from_config(backend.clone(), &config);
        let (state_tx, _) = watch::channel(CheckoutState::Idle);

        Self {
            inner: Arc::new(Inner {
                config,
                backend,
                gateway,
                bootstrapper,
                detector: FormReadinessDetector::new(surface),
                poller,
                machine: Mutex::new(CheckoutStateMachine::new()),
                state_tx,
                context: Mutex::new(None),
                methods: Mutex::new(Vec::new()),
                started: AtomicBool::new(false),
            }),
        }
    }

    pub fn config(&self) -> &CheckoutConfig {
        &self.inner.config
    }

    /// Current state
    pub fn state(&self) -> CheckoutState {
        self.inner.state_tx.borrow().clone()
    }

    /// Receiver that sees every state change
    pub fn subscribe(&self) -> watch::Receiver<CheckoutState> {
        self.inner.state_tx.subscribe()
    }

    /// The bootstrapped session, once the SDK is initialized
    pub fn session(&self) -> Option<CheckoutSession> {
        lock(&self.inner.context).as_ref().map(|c| c.session.clone())
    }

    /// Payment methods fetched after mount (empty if the fetch failed)
    pub fn available_methods(&self) -> Vec<PaymentMethod> {
        lock(&self.inner.methods).clone()
    }

    /// Bring the checkout up: wait for the SDK, bootstrap the session,
    /// initialize, start and mount the SDK, then load payment methods.
    ///
    /// A call while another is running, or after success, does nothing.
    /// On failure the machine falls back to `Idle` and the next call
    /// bootstraps from scratch.
    #[instrument(skip(self))]
    pub async fn start(&self) -> CheckoutResult<()> {
        if self
            .inner
            .started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("checkout already started");
            return Ok(());
        }

        match self.bring_up().await {
            Ok(()) => Ok(()),
            Err(e) => {
                error!(state = %self.state(), "checkout bootstrap failed: {}", e);
                self.inner.fire(Trigger::BootstrapFailed).ok();
                self.inner.bootstrapper.reset();
                *lock(&self.inner.context) = None;
                self.inner.started.store(false, Ordering::Release);
                Err(e)
            }
        }
    }

    async fn bring_up(&self) -> CheckoutResult<()> {
        let inner = &self.inner;

        self.wait_for_sdk().await?;
        let bootstrap = inner.bootstrapper.bootstrap().await?;
        let session = bootstrap.session;

        let handle = inner.gateway.initialize(&bootstrap.credential).await?;
        info!(session_id = %session.id, handle = handle.id(), "payment SDK initialized");
        *lock(&inner.context) = Some(SdkContext {
            session: session.clone(),
            handle: handle.clone(),
        });

        let options = StartCheckoutConfig {
            checkout_session: session.id.clone(),
            element_selector: inner.config.element_selector.clone(),
            country_code: session.country_code.clone(),
            language: inner.config.language.clone(),
            show_loading: inner.config.show_loading,
            keep_loader: inner.config.keep_loader,
            render_mode: inner.config.render_mode,
        };
        let callbacks: Arc<dyn CheckoutCallbacks> = Arc::new(CallbackBridge {
            inner: Arc::downgrade(inner),
        });
        inner
            .gateway
            .start_checkout(&handle, &options, callbacks)
            .await?;
        inner.gateway.mount_checkout(&handle)?;
        info!(session_id = %session.id, "checkout mounted");

        // the SDK renders its own list; ours is informational
        match inner.backend.payment_methods(&session.id).await {
            Ok(methods) => {
                info!(session_id = %session.id, count = methods.len(), "payment methods loaded");
                *lock(&inner.methods) = methods;
            }
            Err(e) => {
                warn!(session_id = %session.id, "could not load payment methods: {}", e);
            }
        }

        let effects = inner.fire(Trigger::BootstrapSucceeded)?;
        self.run(effects).await;
        Ok(())
    }

    /// Probe for the SDK entry point with capped exponential backoff
    async fn wait_for_sdk(&self) -> CheckoutResult<()> {
        let config = &self.inner.config;
        let deadline = Instant::now() + config.sdk_load_timeout();
        let mut backoff = config.sdk_probe_backoff();

        loop {
            if self.inner.gateway.is_available() {
                return Ok(());
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(CheckoutError::SdkUnavailable(format!(
                    "vendor SDK not loaded after {} ms",
                    config.sdk_load_timeout_ms
                )));
            }
            debug!(backoff_ms = backoff.as_millis() as u64, "waiting for vendor SDK");
            tokio::time::sleep(backoff.min(deadline - now)).await;
            backoff = (backoff * 2).min(MAX_PROBE_BACKOFF);
        }
    }

    pub async fn select_method(&self, selection: MethodSelection) -> CheckoutResult<()> {
        info!(
            method = %selection.method_type,
            form_enabled = selection.form_enabled,
            "payment method selected"
        );
        self.dispatch(Trigger::MethodSelected(selection)).await
    }

    /// The buyer clicked pay
    pub async fn request_pay(&self) -> CheckoutResult<()> {
        self.dispatch(Trigger::PayRequested).await
    }

    /// The SDK produced a one-time token. Resolves once the backend has
    /// answered the submission the token authorizes, if any.
    pub async fn token_produced(&self, token: PaymentToken) -> CheckoutResult<()> {
        debug!(token = %token.preview(), "token received");
        self.dispatch(Trigger::TokenProduced(token)).await
    }

    /// The SDK finished its continuation step
    pub async fn result_received(&self, status: PaymentStatus) -> CheckoutResult<()> {
        info!(sdk_status = %status, "SDK payment result");
        self.dispatch(Trigger::PaymentResult(status)).await
    }

    pub async fn report_sdk_error(&self, error: SdkError) -> CheckoutResult<()> {
        warn!(state = %self.state(), kind = ?error.kind(), "SDK error: {}", error);
        self.dispatch(Trigger::SdkFailed(error.kind())).await
    }

    /// Leave a settled checkout and pick a method again
    pub async fn retry(&self) -> CheckoutResult<()> {
        self.dispatch(Trigger::RetryRequested).await
    }

    async fn dispatch(&self, trigger: Trigger) -> CheckoutResult<()> {
        let effects = self.inner.fire(trigger)?;
        self.run(effects).await;
        Ok(())
    }

    /// Run effects, and any effects the triggers they fire produce, in order
    fn run(&self, effects: Vec<Effect>) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            let mut queue: VecDeque<Effect> = effects.into();
            while let Some(effect) = queue.pop_front() {
                let follow_up = self.apply(effect).await;
                queue.extend(follow_up);
            }
        })
    }

    async fn apply(&self, effect: Effect) -> Vec<Effect> {
        match effect {
            Effect::AwaitForm { epoch } => {
                self.spawn_form_wait(epoch);
                Vec::new()
            }
            Effect::StartPayment => self.sdk_call("start_payment", |g, h| g.start_payment(h)),
            Effect::SubmitPayment { submission, token } => self.submit(submission, token).await,
            Effect::ContinuePayment => {
                self.sdk_call("continue_payment", |g, h| g.continue_payment(h))
            }
            Effect::AwaitContinuation { payment_id } => {
                self.spawn_continuation_fallback(payment_id);
                Vec::new()
            }
            Effect::PollStatus { payment_id } => {
                self.spawn_poll(payment_id);
                Vec::new()
            }
            Effect::HideLoader => {
                if let Some(handle) = self.inner.handle() {
                    hide_loader_best_effort(self.inner.gateway.as_ref(), &handle);
                }
                Vec::new()
            }
        }
    }

    /// Synchronous SDK call; a failure becomes an `SdkFailed` trigger
    fn sdk_call(
        &self,
        call: &'static str,
        f: impl FnOnce(&dyn SdkGateway, &SdkHandle) -> CheckoutResult<()>,
    ) -> Vec<Effect> {
        let result = match self.inner.handle() {
            Some(handle) => f(self.inner.gateway.as_ref(), &handle),
            None => Err(CheckoutError::Internal(format!(
                "{} before SDK initialization",
                call
            ))),
        };

        match result {
            Ok(()) => Vec::new(),
            Err(e) => {
                warn!(call, state = %self.state(), "SDK call failed: {}", e);
                self.inner
                    .fire(Trigger::SdkFailed(SdkErrorKind::Other))
                    .unwrap_or_default()
            }
        }
    }

    async fn submit(&self, submission: u64, token: PaymentToken) -> Vec<Effect> {
        let Some(session_id) = self.inner.session_id() else {
            error!(submission, "token consumed without a session");
            return self
                .inner
                .fire(Trigger::SubmissionFailed { submission })
                .unwrap_or_default();
        };

        let request = PaymentRequest {
            one_time_token: token.expose().to_string(),
            checkout_session: session_id.clone(),
        };
        info!(session_id = %session_id, submission, token = %token.preview(), "submitting payment");

        let trigger = match self.inner.backend.create_payment(&request).await {
            Ok(created) if !created.id.is_empty() => {
                info!(
                    session_id = %session_id,
                    payment_id = %created.id,
                    sdk_action_required = created.sdk_action_required,
                    "payment created"
                );
                Trigger::PaymentCreated {
                    submission,
                    created,
                }
            }
            Ok(_) => {
                error!(session_id = %session_id, "backend created a payment without an id");
                Trigger::SubmissionFailed { submission }
            }
            Err(e) => {
                error!(session_id = %session_id, "payment submission failed: {}", e);
                Trigger::SubmissionFailed { submission }
            }
        };

        let payment_id = match &trigger {
            Trigger::PaymentCreated { created, .. } => Some(created.id.clone()),
            _ => None,
        };
        match self.inner.fire(trigger) {
            Ok(effects) => effects,
            Err(_) => {
                if let Some(payment_id) = payment_id {
                    warn!(
                        session_id = %session_id,
                        submission,
                        payment_id = %payment_id,
                        "payment created for an abandoned submission, ignoring"
                    );
                }
                Vec::new()
            }
        }
    }

    fn spawn_continuation_fallback(&self, payment_id: String) {
        let this = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(this.inner.config.continuation_timeout()).await;

            // a no-op unless the SDK is still silent on this payment
            if let Ok(effects) = this
                .inner
                .fire(Trigger::ContinuationTimedOut { payment_id: payment_id.clone() })
            {
                warn!(payment_id = %payment_id, "no SDK result after continuation, polling instead");
                this.run(effects).await;
            }
        });
    }

    fn spawn_form_wait(&self, epoch: u64) {
        let this = self.clone();
        tokio::spawn(async move {
            let inner = &this.inner;
            let ready = inner
                .detector
                .wait_for_ready(&inner.config.form_target, inner.config.form_ready_timeout())
                .await;
            if !ready {
                let err = CheckoutError::FormNotReady {
                    timeout_ms: inner.config.form_ready_timeout_ms,
                };
                warn!(epoch, "{}", err);
            }

            let effects = inner
                .fire(Trigger::FormReadiness { epoch, ready })
                .unwrap_or_default();
            this.run(effects).await;
        });
    }

    fn spawn_poll(&self, payment_id: String) {
        let this = self.clone();
        tokio::spawn(async move {
            let record = this.inner.poller.poll_until_terminal(&payment_id).await;
            log_settlement(&record);

            let effects = this
                .inner
                .fire(Trigger::StatusResolved(record))
                .unwrap_or_default();
            this.run(effects).await;
        });
    }
}

fn log_settlement(record: &PaymentRecord) {
    match record.settlement() {
        Settlement::Success => {
            info!(payment_id = %record.id, "payment succeeded");
        }
        Settlement::Failure => {
            let err = CheckoutError::PaymentRejected {
                payment_id: record.id.clone(),
                status: record.status.to_string(),
                sub_status: record.sub_status.clone(),
            };
            warn!(payment_id = %record.id, "{}", err);
        }
        Settlement::Unknown => {
            let err = CheckoutError::PollingTimeout {
                payment_id: record.id.clone(),
            };
            warn!(payment_id = %record.id, "{}", err);
        }
    }
}

/// What the SDK calls back into. Holds the checkout weakly so an SDK that
/// outlives the page does not keep it alive.
struct CallbackBridge {
    inner: Weak<Inner>,
}

impl CallbackBridge {
    fn checkout(&self) -> Option<Checkout> {
        let checkout = self.inner.upgrade().map(|inner| Checkout { inner });
        if checkout.is_none() {
            debug!("SDK callback after checkout was dropped");
        }
        checkout
    }
}

#[async_trait]
impl CheckoutCallbacks for CallbackBridge {
    async fn on_method_selected(&self, selection: MethodSelection) {
        if let Some(checkout) = self.checkout() {
            checkout.select_method(selection).await.ok();
        }
    }

    async fn on_create_payment(&self, token: PaymentToken) {
        if let Some(checkout) = self.checkout() {
            checkout.token_produced(token).await.ok();
        }
    }

    async fn on_payment_result(&self, status: PaymentStatus) {
        if let Some(checkout) = self.checkout() {
            checkout.result_received(status).await.ok();
        }
    }

    async fn on_error(&self, error: SdkError) {
        if let Some(checkout) = self.checkout() {
            checkout.report_sdk_error(error).await.ok();
        }
    }
}
