//! # Payment Status Poller
//!
//! The SDK does not reliably signal when a payment is done, so after
//! submission the checkout asks the backend until the payment reaches a
//! terminal status. Polling is bounded by a wall-clock timeout; running out
//! of time yields a synthetic `TIMEOUT` record, not an error.

use crate::backend::BoxedBackend;
use crate::config::CheckoutConfig;
use crate::payment::PaymentRecord;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, instrument, warn};

pub struct PaymentStatusPoller {
    backend: BoxedBackend,
    interval: Duration,
    timeout: Duration,
}

impl PaymentStatusPoller {
    pub fn new(backend: BoxedBackend, interval: Duration, timeout: Duration) -> Self {
        Self {
            backend,
            interval,
            timeout,
        }
    }

    /// Poller with the configured interval and timeout (1.5 s / 30 s by default)
    pub fn from_config(backend: BoxedBackend, config: &CheckoutConfig) -> Self {
        Self::new(backend, config.poll_interval(), config.poll_timeout())
    }

    pub async fn poll_until_terminal(&self, payment_id: &str) -> PaymentRecord {
        self.poll_with(payment_id, self.interval, self.timeout).await
    }

    /// Fetch the status every `interval` until it is terminal or `timeout`
    /// elapses. The first fetch happens immediately. Fetch failures are
    /// logged and polling goes on.
    #[instrument(skip(self, interval, timeout), fields(payment_id = %payment_id))]
    pub async fn poll_with(
        &self,
        payment_id: &str,
        interval: Duration,
        timeout: Duration,
    ) -> PaymentRecord {
        let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let polling = async {
            let mut attempt: u32 = 0;
            loop {
                ticker.tick().await;
                attempt += 1;

                match self.backend.payment_status(payment_id).await {
                    Ok(report) => {
                        let record = report.into_record(payment_id);
                        if record.is_terminal() {
                            return record;
                        }
                        debug!(attempt, status = %record.status, "payment not terminal yet");
                    }
                    Err(e) => {
                        warn!(attempt, "status fetch failed, still polling: {}", e);
                    }
                }
            }
        };

        match tokio::time::timeout(timeout, polling).await {
            Ok(record) => record,
            Err(_) => {
                warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    "no terminal status before timeout"
                );
                PaymentRecord::timed_out(payment_id)
            }
        }
    }
}
