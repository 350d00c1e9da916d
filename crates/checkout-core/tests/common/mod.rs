//! In-memory backend, SDK and page used by the checkout scenario tests.

#![allow(dead_code)]

use async_trait::async_trait;
use checkout_core::{
    BackendApi, Checkout, CheckoutCallbacks, CheckoutConfig, CheckoutError, CheckoutResult,
    CheckoutState, CreatedPayment, Credential, ElementInfo, FormSurface, MethodSelection,
    MutationFeed, PaymentMethod, PaymentRequest, PaymentStatus, PaymentToken, SdkError,
    SdkGateway, SdkHandle, SessionGrant, StartCheckoutConfig, StatusReport,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

// =============================================================================
// Backend
// =============================================================================

pub struct FakeBackend {
    pub session_calls: AtomicUsize,
    pub status_calls: AtomicUsize,
    pub payment_requests: Mutex<Vec<PaymentRequest>>,
    pub fail_sessions: AtomicUsize,
    pub fail_payments: AtomicBool,
    pub session_delay: Duration,
    pub create_delay: Duration,
    pub created: Mutex<CreatedPayment>,
    statuses: Mutex<VecDeque<PaymentStatus>>,
    fallback_status: Mutex<PaymentStatus>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            session_calls: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            payment_requests: Mutex::new(Vec::new()),
            fail_sessions: AtomicUsize::new(0),
            fail_payments: AtomicBool::new(false),
            session_delay: Duration::from_millis(100),
            create_delay: Duration::from_millis(200),
            created: Mutex::new(CreatedPayment::new("pay_1")),
            statuses: Mutex::new(VecDeque::new()),
            fallback_status: Mutex::new(PaymentStatus::Pending),
        }
    }

    /// Statuses answered in order, then `fallback` forever
    pub fn script_statuses(&self, statuses: &[PaymentStatus], fallback: PaymentStatus) {
        *self.statuses.lock().unwrap() = statuses.iter().copied().collect();
        *self.fallback_status.lock().unwrap() = fallback;
    }

    pub fn payments(&self) -> usize {
        self.payment_requests.lock().unwrap().len()
    }
}

#[async_trait]
impl BackendApi for FakeBackend {
    async fn fetch_credential(&self) -> CheckoutResult<Option<Credential>> {
        Ok(Some(Credential::new("sandbox_test_key")))
    }

    async fn create_session(&self) -> CheckoutResult<SessionGrant> {
        let n = self.session_calls.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.session_delay).await;
        if n <= self.fail_sessions.load(Ordering::SeqCst) {
            return Err(CheckoutError::http(500, "session store unavailable"));
        }
        Ok(SessionGrant {
            id: Some(format!("sess_{}", n)),
            country: Some("CO".to_string()),
        })
    }

    async fn payment_methods(&self, _session_id: &str) -> CheckoutResult<Vec<PaymentMethod>> {
        Ok(vec![serde_json::from_str(r#"{"name":"Tarjeta","type":"CARD"}"#)?])
    }

    async fn create_payment(&self, request: &PaymentRequest) -> CheckoutResult<CreatedPayment> {
        self.payment_requests.lock().unwrap().push(request.clone());
        tokio::time::sleep(self.create_delay).await;
        if self.fail_payments.load(Ordering::SeqCst) {
            return Err(CheckoutError::http(400, r#"{"error":"invalid token"}"#));
        }
        Ok(self.created.lock().unwrap().clone())
    }

    async fn payment_status(&self, _payment_id: &str) -> CheckoutResult<StatusReport> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let status = self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(*self.fallback_status.lock().unwrap());
        Ok(StatusReport {
            status,
            sub_status: None,
        })
    }
}

// =============================================================================
// SDK
// =============================================================================

pub struct FakeSdk {
    pub available: AtomicBool,
    pub fail_initialize: AtomicBool,
    /// Token delivered (after the delay) whenever `start_payment` is called
    pub auto_token: Mutex<Option<(String, Duration)>>,
    calls: Mutex<Vec<&'static str>>,
    callbacks: Mutex<Option<Arc<dyn CheckoutCallbacks>>>,
}

impl FakeSdk {
    pub fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
            fail_initialize: AtomicBool::new(false),
            auto_token: Mutex::new(Some(("ott_1234567890".to_string(), Duration::from_millis(10)))),
            calls: Mutex::new(Vec::new()),
            callbacks: Mutex::new(None),
        }
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == call).count()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    fn callbacks(&self) -> Arc<dyn CheckoutCallbacks> {
        self.callbacks
            .lock()
            .unwrap()
            .clone()
            .expect("start_checkout was not called")
    }

    pub async fn select(&self, method_type: &str, form_enabled: bool) {
        self.callbacks()
            .on_method_selected(MethodSelection::new(method_type, form_enabled))
            .await;
    }

    pub async fn emit_token(&self, token: &str) {
        self.callbacks()
            .on_create_payment(PaymentToken::new(token))
            .await;
    }

    pub async fn emit_result(&self, status: PaymentStatus) {
        self.callbacks().on_payment_result(status).await;
    }

    pub async fn emit_error(&self, message: &str) {
        self.callbacks().on_error(SdkError::new(message)).await;
    }
}

#[async_trait]
impl SdkGateway for FakeSdk {
    fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    async fn initialize(&self, credential: &Credential) -> CheckoutResult<SdkHandle> {
        self.record("initialize");
        if self.fail_initialize.load(Ordering::SeqCst) {
            return Err(CheckoutError::Sdk("invalid public key".to_string()));
        }
        Ok(SdkHandle::new(format!("sdk-{}", credential.prefix())))
    }

    async fn start_checkout(
        &self,
        _handle: &SdkHandle,
        _config: &StartCheckoutConfig,
        callbacks: Arc<dyn CheckoutCallbacks>,
    ) -> CheckoutResult<()> {
        self.record("start_checkout");
        *self.callbacks.lock().unwrap() = Some(callbacks);
        Ok(())
    }

    fn mount_checkout(&self, _handle: &SdkHandle) -> CheckoutResult<()> {
        self.record("mount_checkout");
        Ok(())
    }

    fn start_payment(&self, _handle: &SdkHandle) -> CheckoutResult<()> {
        self.record("start_payment");
        if let Some((token, delay)) = self.auto_token.lock().unwrap().clone() {
            let callbacks = self.callbacks();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                callbacks.on_create_payment(PaymentToken::new(token)).await;
            });
        }
        Ok(())
    }

    fn continue_payment(&self, _handle: &SdkHandle) -> CheckoutResult<()> {
        self.record("continue_payment");
        Ok(())
    }

    fn hide_loader(&self, _handle: &SdkHandle) -> CheckoutResult<()> {
        self.record("hide_loader");
        Err(CheckoutError::Sdk("loader already hidden".to_string()))
    }
}

// =============================================================================
// Page
// =============================================================================

pub struct FakeSurface {
    elements: Mutex<Vec<ElementInfo>>,
    changes: watch::Sender<u64>,
}

impl FakeSurface {
    pub fn new() -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            elements: Mutex::new(Vec::new()),
            changes,
        }
    }

    pub fn insert(&self, element: ElementInfo) {
        self.elements.lock().unwrap().push(element);
        self.changes.send_modify(|v| *v += 1);
    }

    /// What the SDK injects once the card form is up
    pub fn render_form(&self) {
        self.insert(ElementInfo::new("iframe").with_attribute("data-payment-form"));
    }

    pub fn observers(&self) -> usize {
        self.changes.receiver_count()
    }
}

struct Feed(watch::Receiver<u64>);

#[async_trait]
impl MutationFeed for Feed {
    async fn next_change(&mut self) -> bool {
        self.0.changed().await.is_ok()
    }
}

impl FormSurface for FakeSurface {
    fn elements(&self, _target: &str) -> Vec<ElementInfo> {
        self.elements.lock().unwrap().clone()
    }

    fn observe(&self, _target: &str) -> Box<dyn MutationFeed> {
        Box::new(Feed(self.changes.subscribe()))
    }
}

// =============================================================================
// Harness
// =============================================================================

pub struct Harness {
    pub checkout: Checkout,
    pub backend: Arc<FakeBackend>,
    pub sdk: Arc<FakeSdk>,
    pub surface: Arc<FakeSurface>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(FakeBackend::new(), FakeSdk::new())
    }

    pub fn with(backend: FakeBackend, sdk: FakeSdk) -> Self {
        let backend = Arc::new(backend);
        let sdk = Arc::new(sdk);
        let surface = Arc::new(FakeSurface::new());
        let checkout = Checkout::new(
            CheckoutConfig::default(),
            backend.clone(),
            sdk.clone(),
            surface.clone(),
        );
        Self {
            checkout,
            backend,
            sdk,
            surface,
        }
    }

    /// Wait (in paused time) until the checkout enters the named state
    pub async fn reach(&self, name: &str) -> CheckoutState {
        let mut states = self.checkout.subscribe();
        let state = tokio::time::timeout(
            Duration::from_secs(120),
            states.wait_for(|s| s.name() == name),
        )
        .await
        .unwrap_or_else(|_| panic!("state {} not reached, at {}", name, self.checkout.state()))
        .expect("checkout dropped")
        .clone();
        state
    }

    /// Started checkout with the card form on screen and pay enabled
    pub async fn ready_to_pay(&self) {
        self.checkout.start().await.unwrap();
        self.surface.render_form();
        self.sdk.select("CARD", true).await;
        self.reach("FormReady").await;
    }
}
