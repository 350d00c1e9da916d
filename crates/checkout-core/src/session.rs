//! # Session Types
//!
//! Checkout session, credential and payment-method selection types.

use serde::{Deserialize, Serialize};

/// A backend-issued checkout session scoping one buyer's payment attempt.
///
/// Created once per page load and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Session identifier
    pub id: String,

    /// ISO 3166-1 alpha-2 country code
    pub country_code: String,
}

impl CheckoutSession {
    pub fn new(id: impl Into<String>, country_code: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            country_code: country_code.into(),
        }
    }
}

/// Public key the vendor SDK is initialized with
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Environment prefix of the key (`sandbox`, `prod`, ...)
    pub fn prefix(&self) -> &str {
        self.0.split('_').next().unwrap_or_default()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credential({}_***)", self.prefix())
    }
}

/// Everything a successful bootstrap hands to the orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bootstrap {
    pub session: CheckoutSession,
    pub credential: Credential,
}

/// Raw session answer from the backend; either field may be missing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionGrant {
    #[serde(default, rename = "checkout_session")]
    pub id: Option<String>,

    #[serde(default)]
    pub country: Option<String>,
}

/// A payment method the session offers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethod {
    #[serde(default)]
    pub name: String,

    #[serde(default, rename = "type")]
    pub method_type: String,

    /// Remaining provider fields, kept for diagnostics
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Buyer's choice of payment method, as reported by the SDK.
///
/// A new selection supersedes any earlier one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSelection {
    #[serde(rename = "type", alias = "method_type")]
    pub method_type: String,

    /// Whether the method renders a form that must be filled before paying
    #[serde(default, rename = "form_enable")]
    pub form_enabled: bool,
}

impl MethodSelection {
    pub fn new(method_type: impl Into<String>, form_enabled: bool) -> Self {
        Self {
            method_type: method_type.into(),
            form_enabled,
        }
    }
}

/// One-time token produced by the SDK for exactly one submission
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentToken(String);

impl PaymentToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    /// First characters only, safe for logs
    pub fn preview(&self) -> String {
        let head: String = self.0.chars().take(10).collect();
        format!("{}...", head)
    }
}

impl std::fmt::Debug for PaymentToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentToken({})", self.preview())
    }
}
