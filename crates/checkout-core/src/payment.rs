//! # Payment Types
//!
//! Payment records as created by the backend and observed by polling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Provider payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Succeeded,
    Rejected,
    Declined,
    #[serde(alias = "CANCELED")]
    Cancelled,
    Error,
    Expired,
    /// Synthetic: polling gave up before a terminal status was seen
    Timeout,
    /// Any status this crate does not know; never terminal
    #[serde(other)]
    Unknown,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Succeeded => "SUCCEEDED",
            PaymentStatus::Rejected => "REJECTED",
            PaymentStatus::Declined => "DECLINED",
            PaymentStatus::Cancelled => "CANCELLED",
            PaymentStatus::Error => "ERROR",
            PaymentStatus::Expired => "EXPIRED",
            PaymentStatus::Timeout => "TIMEOUT",
            PaymentStatus::Unknown => "UNKNOWN",
        }
    }

    /// Terminal statuses end polling. `Timeout` is not one of them: it is
    /// produced by the poller itself, never observed from the provider.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Succeeded
                | PaymentStatus::Rejected
                | PaymentStatus::Declined
                | PaymentStatus::Cancelled
                | PaymentStatus::Error
                | PaymentStatus::Expired
        )
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payment as last observed from the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: String,

    pub status: PaymentStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_status: Option<String>,

    /// When this observation was made
    #[serde(default = "Utc::now")]
    pub checked_at: DateTime<Utc>,
}

impl PaymentRecord {
    pub fn new(id: impl Into<String>, status: PaymentStatus) -> Self {
        Self {
            id: id.into(),
            status,
            sub_status: None,
            checked_at: Utc::now(),
        }
    }

    pub fn with_sub_status(mut self, sub_status: impl Into<String>) -> Self {
        self.sub_status = Some(sub_status.into());
        self
    }

    /// Synthetic record for a poll that never saw a terminal status
    pub fn timed_out(id: impl Into<String>) -> Self {
        Self::new(id, PaymentStatus::Timeout)
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn settlement(&self) -> Settlement {
        match self.status {
            PaymentStatus::Succeeded => Settlement::Success,
            PaymentStatus::Timeout => Settlement::Unknown,
            status if status.is_terminal() => Settlement::Failure,
            _ => Settlement::Unknown,
        }
    }
}

/// How a settled checkout ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Settlement {
    Success,
    Failure,
    /// Outcome not known; the buyer may retry or refresh
    Unknown,
}

/// Status answer of the payment-status endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct StatusReport {
    pub status: PaymentStatus,

    #[serde(default)]
    pub sub_status: Option<String>,
}

impl StatusReport {
    pub fn into_record(self, payment_id: impl Into<String>) -> PaymentRecord {
        PaymentRecord {
            id: payment_id.into(),
            status: self.status,
            sub_status: self.sub_status,
            checked_at: Utc::now(),
        }
    }
}

/// Backend answer to a payment submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedPayment {
    pub id: String,

    #[serde(default)]
    pub status: Option<PaymentStatus>,

    #[serde(default)]
    pub sub_status: Option<String>,

    /// SDK must run `continue_payment` (3DS, redirects, ...)
    #[serde(default, deserialize_with = "null_as_false")]
    pub sdk_action_required: bool,
}

fn null_as_false<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

impl CreatedPayment {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: None,
            sub_status: None,
            sdk_action_required: false,
        }
    }

    pub fn requiring_sdk_action(mut self) -> Self {
        self.sdk_action_required = true;
        self
    }
}

/// Body of a payment submission
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub one_time_token: String,
    pub checkout_session: String,
}
