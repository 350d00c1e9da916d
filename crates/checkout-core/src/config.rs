//! # Checkout Configuration
//!
//! Page-level settings for the checkout flow: where the SDK renders, and
//! the bounds on every wait. Defaults match the hosted checkout page; a
//! TOML document may override any of them.

use crate::sdk::RenderMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Checkout flow configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutConfig {
    /// CSS selector the SDK mounts the checkout into
    pub element_selector: String,

    /// Region watched for the payment form (usually the same element)
    pub form_target: String,

    /// SDK UI language
    pub language: String,

    /// Country used when the backend does not send one
    pub fallback_country: String,

    pub render_mode: RenderMode,

    pub show_loading: bool,

    pub keep_loader: bool,

    /// Bound on waiting for the payment form after a method is selected
    pub form_ready_timeout_ms: u64,

    /// Delay between payment-status polls
    pub poll_interval_ms: u64,

    /// Bound on payment-status polling
    pub poll_timeout_ms: u64,

    /// Bound on waiting for the vendor SDK script to load
    pub sdk_load_timeout_ms: u64,

    /// First delay between SDK availability probes (doubles, capped at 1s)
    pub sdk_probe_backoff_ms: u64,

    /// How long the SDK may stay silent after a continuation before the
    /// payment is polled anyway
    pub continuation_timeout_ms: u64,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            element_selector: "#root".to_string(),
            form_target: "#root".to_string(),
            language: "es".to_string(),
            fallback_country: "CO".to_string(),
            render_mode: RenderMode::Element,
            show_loading: true,
            keep_loader: false,
            form_ready_timeout_ms: 12_000,
            poll_interval_ms: 1_500,
            poll_timeout_ms: 30_000,
            sdk_load_timeout_ms: 5_000,
            sdk_probe_backoff_ms: 100,
            continuation_timeout_ms: 120_000,
        }
    }
}

impl CheckoutConfig {
    /// Load configuration from a TOML string; absent keys keep defaults
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    pub fn form_ready_timeout(&self) -> Duration {
        Duration::from_millis(self.form_ready_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    pub fn sdk_load_timeout(&self) -> Duration {
        Duration::from_millis(self.sdk_load_timeout_ms)
    }

    pub fn sdk_probe_backoff(&self) -> Duration {
        Duration::from_millis(self.sdk_probe_backoff_ms)
    }

    pub fn continuation_timeout(&self) -> Duration {
        Duration::from_millis(self.continuation_timeout_ms)
    }

    /// Builder: set poll timings
    pub fn with_polling(mut self, interval: Duration, timeout: Duration) -> Self {
        self.poll_interval_ms = interval.as_millis() as u64;
        self.poll_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Builder: set the form readiness bound
    pub fn with_form_ready_timeout(mut self, timeout: Duration) -> Self {
        self.form_ready_timeout_ms = timeout.as_millis() as u64;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CheckoutConfig::default();
        assert_eq!(config.form_ready_timeout(), Duration::from_secs(12));
        assert_eq!(config.poll_interval(), Duration::from_millis(1500));
        assert_eq!(config.poll_timeout(), Duration::from_secs(30));
        assert_eq!(config.render_mode, RenderMode::Element);
        assert_eq!(config.continuation_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_from_toml_partial_override() {
        let config = CheckoutConfig::from_toml(
            r##"
            element_selector = "#checkout"
            render_mode = "modal"
            poll_timeout_ms = 60000
            "##,
        )
        .unwrap();

        assert_eq!(config.element_selector, "#checkout");
        assert_eq!(config.render_mode, RenderMode::Modal);
        assert_eq!(config.poll_timeout(), Duration::from_secs(60));
        // untouched keys keep their defaults
        assert_eq!(config.language, "es");
        assert_eq!(config.poll_interval_ms, 1500);
    }
}
