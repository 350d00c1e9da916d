//! # Provider Client
//!
//! Calls the payment provider's REST API with the merchant's private
//! credentials. Responses are relayed as raw JSON; the browser side owns
//! their interpretation.

use crate::config::ApiConfig;
use crate::country::country_data;
use crate::error::{ApiError, ApiResult};
use checkout_core::PaymentRequest;
use reqwest::{Client, Method, RequestBuilder};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{error, info, instrument};
use uuid::Uuid;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Provider API client
pub struct ProviderClient {
    client: Client,
    base_url: String,
    account_code: String,
    public_api_key: String,
    private_secret_key: String,
    /// Provider customer, created on first use. A failed attempt leaves the
    /// cell empty so the next request tries again.
    customer: OnceCell<String>,
}

impl ProviderClient {
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.provider_base_url()?,
            account_code: config.account_code.clone(),
            public_api_key: config.public_api_key.clone(),
            private_secret_key: config.private_secret_key.clone(),
            customer: OnceCell::new(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .header("public-api-key", &self.public_api_key)
            .header("private-secret-key", &self.private_secret_key)
    }

    async fn send(&self, path: &str, builder: RequestBuilder) -> ApiResult<Value> {
        let response = builder.send().await.map_err(|e| {
            error!(path, error = %e, "Provider request failed");
            ApiError::Network(e.to_string())
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let data = parse_body(&text);

        if !status.is_success() {
            error!(path, status = status.as_u16(), body = %data, "Provider returned an error");
            return Err(ApiError::Provider {
                status: status.as_u16(),
                path: path.to_string(),
                data,
            });
        }

        Ok(data)
    }

    /// Provider customer id, creating the customer on first call
    pub async fn customer_id(&self) -> ApiResult<String> {
        self.customer
            .get_or_try_init(|| self.create_customer())
            .await
            .cloned()
    }

    async fn create_customer(&self) -> ApiResult<String> {
        let payload = json!({
            "country": "CO",
            "merchant_customer_id": Uuid::new_v4().simple().to_string(),
            "first_name": "John",
            "last_name": "Doe",
            "email": "john.doe@y.uno",
        });

        let path = "/v1/customers";
        let created = self
            .send(path, self.request(Method::POST, path).json(&payload))
            .await?;

        // an answer without an id must not be cached as "no customer"
        let id = created["id"]
            .as_str()
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        let Some(id) = id else {
            error!(body = %created, "Provider created a customer without an id");
            return Err(ApiError::Provider {
                status: 502,
                path: path.to_string(),
                data: created,
            });
        };

        info!(customer_id = %id, "Provider customer ready");
        Ok(id)
    }

    /// Create a checkout session for the buyer's country
    #[instrument(skip(self))]
    pub async fn create_session(&self, country: &str) -> ApiResult<Value> {
        let customer_id = self.customer_id().await?;
        let data = country_data(country);

        let payload = json!({
            "account_id": self.account_code,
            "merchant_order_id": "1655401222",
            "payment_description": "Test MP 1654536326",
            "country": country,
            "customer_id": customer_id,
            "amount": { "currency": data.currency, "value": data.amount },
        });

        let path = "/v1/checkout/sessions";
        let session = self
            .send(path, self.request(Method::POST, path).json(&payload))
            .await?;

        info!(session = %session["checkout_session"], "Checkout session created");
        Ok(session)
    }

    /// Payment methods enabled for a session
    #[instrument(skip(self))]
    pub async fn payment_methods(&self, session: &str) -> ApiResult<Value> {
        let path = format!("/v1/checkout/sessions/{}/payment-methods", session);
        self.send(&path, self.request(Method::GET, &path)).await
    }

    /// Create a payment from a one-time token
    #[instrument(skip(self, request), fields(session = %request.checkout_session))]
    pub async fn create_payment(&self, country: &str, request: &PaymentRequest) -> ApiResult<Value> {
        let customer_id = self.customer_id().await?;
        let data = country_data(country);

        let payload = json!({
            "description": "Test payment",
            "account_id": self.account_code,
            "merchant_order_id": "0000022",
            "country": country,
            "amount": { "currency": data.currency, "value": data.amount },
            "checkout": { "session": request.checkout_session },
            "customer_payer": {
                "id": customer_id,
                "first_name": "Pepito",
                "last_name": "Perez",
                "email": "pepitoperez@y.uno",
                "nationality": country,
                "document": {
                    "document_type": data.document_type,
                    "document_number": data.document_number,
                },
                "billing_address": {
                    "address_line_1": "Calle 34 # 56 - 78",
                    "city": "Bogota",
                    "country": country,
                    "zip_code": "111111",
                },
            },
            "payment_method": { "token": request.one_time_token, "vaulted_token": null },
        });

        let path = "/v1/payments";
        let payment = self
            .send(
                path,
                self.request(Method::POST, path)
                    .header("X-idempotency-key", Uuid::new_v4().to_string())
                    .json(&payload),
            )
            .await?;

        info!(payment_id = %payment["id"], status = %payment["status"], "Payment created");
        Ok(payment)
    }

    /// Current state of a payment
    #[instrument(skip(self))]
    pub async fn payment(&self, payment_id: &str) -> ApiResult<Value> {
        let path = format!("/v1/payments/{}", payment_id);
        self.send(&path, self.request(Method::GET, &path)).await
    }
}

fn parse_body(text: &str) -> Value {
    if text.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| json!({ "raw": text }))
}
