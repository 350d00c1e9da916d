//! # HTTP Backend
//!
//! [`BackendApi`] over JSON/HTTP, speaking the routes the merchant backend
//! exposes to the browser:
//!
//! | Method | Path                           | Answer                                   |
//! |--------|--------------------------------|------------------------------------------|
//! | GET    | `/public-api-key`              | `{ publicApiKey }`                       |
//! | POST   | `/checkout/sessions`           | `{ checkout_session, country }`          |
//! | GET    | `/payment-methods/{session}`   | method list                              |
//! | POST   | `/payments`                    | `{ id, status, sdk_action_required }`    |
//! | GET    | `/payments/{id}`               | `{ status, sub_status }`                 |

use crate::config::BackendConfig;
use async_trait::async_trait;
use checkout_core::{
    BackendApi, CheckoutError, CheckoutResult, CreatedPayment, Credential, PaymentMethod,
    PaymentRequest, SessionGrant, StatusReport,
};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, instrument};

/// Merchant backend reached over HTTP
pub struct HttpBackend {
    config: BackendConfig,
    client: Client,
}

impl HttpBackend {
    pub fn new(config: BackendConfig) -> CheckoutResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CheckoutError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> CheckoutResult<Self> {
        Self::new(BackendConfig::from_env()?)
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.config.url(path));
        match &self.config.country {
            Some(country) => builder.query(&[("country", country)]),
            None => builder,
        }
    }

    /// Send, check the status, decode the body
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> CheckoutResult<T> {
        let response = builder
            .send()
            .await
            .map_err(|e| CheckoutError::transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CheckoutError::transport(e.to_string()))?;

        if !status.is_success() {
            error!("backend error: status={}, body={}", status, body);
            return Err(CheckoutError::http(status.as_u16(), body));
        }

        serde_json::from_str(&body).map_err(|e| {
            CheckoutError::Serialization(format!("Failed to parse backend response: {}", e))
        })
    }
}

#[derive(Debug, Deserialize)]
struct PublicKeyResponse {
    #[serde(default, rename = "publicApiKey")]
    public_api_key: Option<String>,
}

/// The backend relays the provider answer, which is either a bare list or
/// wrapped in an object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MethodsResponse {
    List(Vec<PaymentMethod>),
    Wrapped { payment_methods: Vec<PaymentMethod> },
}

#[async_trait]
impl BackendApi for HttpBackend {
    #[instrument(skip(self))]
    async fn fetch_credential(&self) -> CheckoutResult<Option<Credential>> {
        let response: PublicKeyResponse =
            self.send(self.request(Method::GET, "/public-api-key")).await?;

        let credential = response
            .public_api_key
            .filter(|key| !key.is_empty())
            .map(Credential::new);
        debug!(
            key_prefix = credential.as_ref().map(|c| c.prefix()).unwrap_or("none"),
            "fetched public key"
        );
        Ok(credential)
    }

    #[instrument(skip(self))]
    async fn create_session(&self) -> CheckoutResult<SessionGrant> {
        self.send(self.request(Method::POST, "/checkout/sessions"))
            .await
    }

    #[instrument(skip(self))]
    async fn payment_methods(&self, session_id: &str) -> CheckoutResult<Vec<PaymentMethod>> {
        let path = format!("/payment-methods/{}", session_id);
        let response: MethodsResponse = self.send(self.request(Method::GET, &path)).await?;

        Ok(match response {
            MethodsResponse::List(methods) => methods,
            MethodsResponse::Wrapped { payment_methods } => payment_methods,
        })
    }

    #[instrument(skip(self, request), fields(session_id = %request.checkout_session))]
    async fn create_payment(&self, request: &PaymentRequest) -> CheckoutResult<CreatedPayment> {
        self.send(self.request(Method::POST, "/payments").json(request))
            .await
    }

    #[instrument(skip(self))]
    async fn payment_status(&self, payment_id: &str) -> CheckoutResult<StatusReport> {
        let path = format!("/payments/{}", payment_id);
        self.send(self.request(Method::GET, &path)).await
    }
}
