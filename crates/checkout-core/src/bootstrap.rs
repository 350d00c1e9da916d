//! # Session Bootstrap
//!
//! Obtains the checkout session and the SDK credential from the backend.
//!
//! Bootstrap is single-flight: callers arriving while an attempt is running
//! share that attempt's result, success or failure. A failed attempt is
//! forgotten so the next call starts from scratch instead of replaying the
//! failure; a successful one is cached for the page's lifetime.

use crate::backend::BoxedBackend;
use crate::error::{CheckoutError, CheckoutResult};
use crate::sdk::BoxedGateway;
use crate::session::{Bootstrap, CheckoutSession};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

type Outcome = Option<CheckoutResult<Bootstrap>>;

enum Slot {
    Empty,
    InFlight(watch::Receiver<Outcome>),
    Ready(Bootstrap),
}

/// Single-flight session bootstrapper
pub struct SessionBootstrapper {
    backend: BoxedBackend,
    gateway: BoxedGateway,
    fallback_country: String,
    slot: Arc<Mutex<Slot>>,
}

impl SessionBootstrapper {
    pub fn new(
        backend: BoxedBackend,
        gateway: BoxedGateway,
        fallback_country: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            gateway,
            fallback_country: fallback_country.into(),
            slot: Arc::new(Mutex::new(Slot::Empty)),
        }
    }

    /// Session, country and credential for this page.
    ///
    /// # Errors
    /// - `Session` if the backend returns no session id
    /// - `Credential` if the backend returns no public credential
    /// - `SdkUnavailable` if the vendor SDK is not loaded at call time
    /// - `Network` if a backend call fails
    pub async fn bootstrap(&self) -> CheckoutResult<Bootstrap> {
        let mut rx = {
            let mut slot = lock(&self.slot);
            match &*slot {
                Slot::Ready(bootstrap) => return Ok(bootstrap.clone()),
                Slot::InFlight(rx) => {
                    debug!("joining in-flight bootstrap");
                    rx.clone()
                }
                Slot::Empty => {
                    let (tx, rx) = watch::channel(None);
                    *slot = Slot::InFlight(rx.clone());
                    self.spawn_attempt(tx);
                    rx
                }
            }
        };

        let outcome = rx
            .wait_for(Option::is_some)
            .await
            .map(|value| (*value).clone())
            .map_err(|_| CheckoutError::Internal("bootstrap attempt aborted".to_string()))?;

        outcome.unwrap_or_else(|| {
            Err(CheckoutError::Internal(
                "bootstrap finished without a result".to_string(),
            ))
        })
    }

    /// The cached bootstrap, if one succeeded
    pub fn cached(&self) -> Option<Bootstrap> {
        match &*lock(&self.slot) {
            Slot::Ready(bootstrap) => Some(bootstrap.clone()),
            _ => None,
        }
    }

    /// Forget a cached bootstrap so the next call fetches a new session.
    /// An attempt that is still running is left alone.
    pub fn reset(&self) {
        let mut slot = lock(&self.slot);
        if matches!(&*slot, Slot::Ready(_)) {
            *slot = Slot::Empty;
        }
    }

    fn spawn_attempt(&self, tx: watch::Sender<Outcome>) {
        let backend = self.backend.clone();
        let gateway = self.gateway.clone();
        let fallback_country = self.fallback_country.clone();
        let slot = self.slot.clone();

        tokio::spawn(async move {
            let result = attempt(backend, gateway, fallback_country).await;

            {
                let mut slot = lock(&slot);
                *slot = match &result {
                    Ok(bootstrap) => Slot::Ready(bootstrap.clone()),
                    Err(e) => {
                        warn!("bootstrap failed, next call retries: {}", e);
                        Slot::Empty
                    }
                };
            }

            tx.send_replace(Some(result));
        });
    }
}

async fn attempt(
    backend: BoxedBackend,
    gateway: BoxedGateway,
    fallback_country: String,
) -> CheckoutResult<Bootstrap> {
    let grant = backend.create_session().await?;

    let session_id = grant
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| CheckoutError::Session("backend returned no checkout session".to_string()))?;

    let country_code = grant
        .country
        .filter(|c| !c.is_empty())
        .unwrap_or(fallback_country);

    let credential = backend
        .fetch_credential()
        .await?
        .filter(|c| !c.expose().is_empty())
        .ok_or_else(|| CheckoutError::Credential("backend returned no public key".to_string()))?;

    if !gateway.is_available() {
        return Err(CheckoutError::SdkUnavailable(
            "vendor SDK entry point is not loaded".to_string(),
        ));
    }

    info!(
        session_id = %session_id,
        country = %country_code,
        key_prefix = credential.prefix(),
        "checkout session bootstrapped"
    );

    Ok(Bootstrap {
        session: CheckoutSession::new(session_id, country_code),
        credential,
    })
}

/// Lock, recovering the data from a poisoned mutex
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
