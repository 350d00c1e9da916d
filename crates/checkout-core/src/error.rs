//! # Checkout Error Types
//!
//! Typed error handling for the checkout orchestration.
//! All fallible checkout operations return `Result<T, CheckoutError>`.

use thiserror::Error;

/// Core error type for the checkout flow
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// Required configuration missing at startup
    #[error("Configuration error: {0}")]
    Config(String),

    /// Backend did not hand out a checkout session
    #[error("Session error: {0}")]
    Session(String),

    /// Backend did not hand out a public credential
    #[error("Credential error: {0}")]
    Credential(String),

    /// Vendor SDK entry point is not loaded
    #[error("Payment SDK unavailable: {0}")]
    SdkUnavailable(String),

    /// A vendor SDK call threw
    #[error("Payment SDK error: {0}")]
    Sdk(String),

    /// A backend call failed
    #[error("Network error (status {}): {body}", .status.map(|s| s.to_string()).unwrap_or_else(|| "none".to_string()))]
    Network { status: Option<u16>, body: String },

    /// A token arrived without a pay action authorizing it
    #[error("Payment token ignored: {reason}")]
    TokenIgnored { reason: String },

    /// The payment form did not become interactive in time
    #[error("Payment form not ready after {timeout_ms} ms")]
    FormNotReady { timeout_ms: u64 },

    /// No terminal status was observed in time; the outcome is unknown
    #[error("Payment {payment_id} status unknown after polling timed out")]
    PollingTimeout { payment_id: String },

    /// The provider settled the payment negatively
    #[error("Payment {payment_id} {status}{}", .sub_status.as_ref().map(|s| format!(" ({})", s)).unwrap_or_default())]
    PaymentRejected {
        payment_id: String,
        status: String,
        sub_status: Option<String>,
    },

    /// Trigger has no meaning in the current state
    #[error("Trigger {trigger} ignored in state {state}")]
    IgnoredTrigger {
        state: &'static str,
        trigger: &'static str,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CheckoutError {
    /// Shorthand for a network error with an HTTP status
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        CheckoutError::Network {
            status: Some(status),
            body: body.into(),
        }
    }

    /// Shorthand for a network error without a response
    pub fn transport(body: impl Into<String>) -> Self {
        CheckoutError::Network {
            status: None,
            body: body.into(),
        }
    }

    /// Returns true if the next user action may succeed where this failed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CheckoutError::Session(_)
                | CheckoutError::Credential(_)
                | CheckoutError::SdkUnavailable(_)
                | CheckoutError::Sdk(_)
                | CheckoutError::Network { .. }
                | CheckoutError::FormNotReady { .. }
                | CheckoutError::PollingTimeout { .. }
        )
    }

    /// Returns true if nothing short of a redeploy fixes this
    pub fn is_fatal(&self) -> bool {
        matches!(self, CheckoutError::Config(_))
    }

    /// Returns true for informational outcomes that are not failures
    pub fn is_informational(&self) -> bool {
        matches!(
            self,
            CheckoutError::TokenIgnored { .. } | CheckoutError::IgnoredTrigger { .. }
        )
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            CheckoutError::Config(_) => 500,
            CheckoutError::Session(_) => 502,
            CheckoutError::Credential(_) => 502,
            CheckoutError::SdkUnavailable(_) => 503,
            CheckoutError::Sdk(_) => 502,
            CheckoutError::Network { status, .. } => status.unwrap_or(503),
            CheckoutError::TokenIgnored { .. } => 409,
            CheckoutError::FormNotReady { .. } => 408,
            CheckoutError::PollingTimeout { .. } => 504,
            CheckoutError::PaymentRejected { .. } => 402,
            CheckoutError::IgnoredTrigger { .. } => 409,
            CheckoutError::Serialization(_) => 500,
            CheckoutError::Internal(_) => 500,
        }
    }
}

impl From<serde_json::Error> for CheckoutError {
    fn from(err: serde_json::Error) -> Self {
        CheckoutError::Serialization(err.to_string())
    }
}

/// Result type alias for checkout operations
pub type CheckoutResult<T> = Result<T, CheckoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(CheckoutError::transport("connection reset").is_retryable());
        assert!(CheckoutError::Session("no id".into()).is_retryable());
        assert!(CheckoutError::PollingTimeout {
            payment_id: "pay_1".into()
        }
        .is_retryable());
        assert!(!CheckoutError::Config("ACCOUNT_CODE".into()).is_retryable());
        assert!(CheckoutError::Config("ACCOUNT_CODE".into()).is_fatal());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(CheckoutError::http(404, "missing").status_code(), 404);
        assert_eq!(CheckoutError::transport("dns").status_code(), 503);
        assert_eq!(
            CheckoutError::PaymentRejected {
                payment_id: "pay_1".into(),
                status: "DECLINED".into(),
                sub_status: None,
            }
            .status_code(),
            402
        );
    }

    #[test]
    fn test_rejection_message_is_verbatim() {
        let err = CheckoutError::PaymentRejected {
            payment_id: "pay_9".into(),
            status: "REJECTED".into(),
            sub_status: Some("INSUFFICIENT_FUNDS".into()),
        };
        assert_eq!(err.to_string(), "Payment pay_9 REJECTED (INSUFFICIENT_FUNDS)");

        let err = CheckoutError::Network {
            status: None,
            body: "timed out".into(),
        };
        assert_eq!(err.to_string(), "Network error (status none): timed out");
    }
}
