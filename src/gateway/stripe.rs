//! Stripe-compatible payment gateway over HTTP.
//!
//! Gated behind the `stripe` feature flag:
//! ```toml
//! [dependencies]
//! haven-rs = { version = "0.1", features = ["stripe"] }
//! ```
//!
//! Talks to the payment-intents API with form-encoded requests and bearer
//! authentication. The secret key is never logged.

use crate::core::payment::{AuthorizationMetadata, PaymentAuthorization, PaymentGateway};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// Default API base
pub const STRIPE_API_BASE: &str = "https://api.stripe.com";

/// Transport-level failures talking to the processor
#[derive(Debug, Error)]
pub enum GatewayClientError {
    /// The request never produced a response
    #[error("payment processor request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The processor answered with a non-success status
    #[error("payment processor returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The processor answered 2xx with a body we could not read
    #[error("payment processor response could not be decoded: {0}")]
    Decode(String),
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: Option<String>,

    #[serde(rename = "type", default)]
    kind: Option<String>,
}

/// Payment gateway backed by a Stripe-compatible HTTP API
#[derive(Debug, Clone)]
pub struct StripeGateway {
    secret_key: String,
    http: reqwest::Client,
    base_url: String,
}

impl StripeGateway {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self::new_with_base_url(secret_key, STRIPE_API_BASE)
    }

    /// Point the client at another host, e.g. a local mock
    pub fn new_with_base_url(secret_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn intents_url(&self) -> String {
        format!("{}/v1/payment_intents", self.base_url.trim_end_matches('/'))
    }

    /// URL of one payment intent, or `None` when `id` cannot name one
    ///
    /// The id comes from client input and must stay a single path segment.
    fn intent_url(&self, id: &str) -> Result<Option<Url>> {
        if !is_intent_id(id) {
            return Ok(None);
        }

        let mut url = Url::parse(&self.intents_url())?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("payment API base '{}' cannot carry a path", self.base_url))?
            .push(id);

        Ok(Some(url))
    }

    /// Form fields for a create call
    fn create_form(
        amount: i64,
        currency: &str,
        metadata: &AuthorizationMetadata,
    ) -> Vec<(String, String)> {
        let mut form = vec![
            ("amount".to_string(), amount.to_string()),
            ("currency".to_string(), currency.to_lowercase()),
            (
                "automatic_payment_methods[enabled]".to_string(),
                "true".to_string(),
            ),
        ];

        if let Some(lodging_id) = &metadata.lodging_id {
            form.push(("metadata[hotelId]".to_string(), lodging_id.clone()));
        }
        if let Some(user_id) = &metadata.user_id {
            form.push(("metadata[userId]".to_string(), user_id.clone()));
        }

        form
    }

    async fn decode(
        response: reqwest::Response,
    ) -> std::result::Result<PaymentAuthorization, GatewayClientError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(GatewayClientError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| GatewayClientError::Decode(e.to_string()))
    }
}

/// Payment intent ids are `[A-Za-z0-9_]+`
fn is_intent_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Pull a readable message out of an error body
fn error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => match (parsed.error.kind, parsed.error.message) {
            (Some(kind), Some(message)) => format!("{}: {}", kind, message),
            (_, Some(message)) => message,
            (Some(kind), None) => kind,
            (None, None) => "unknown".to_string(),
        },
        Err(_) => "unknown".to_string(),
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    fn name(&self) -> &'static str {
        "stripe"
    }

    async fn create_authorization(
        &self,
        amount: i64,
        currency: &str,
        metadata: AuthorizationMetadata,
    ) -> Result<PaymentAuthorization> {
        let response = self
            .http
            .post(self.intents_url())
            .bearer_auth(&self.secret_key)
            .form(&Self::create_form(amount, currency, &metadata))
            .send()
            .await
            .map_err(GatewayClientError::from)?;

        Ok(Self::decode(response).await?)
    }

    async fn retrieve_authorization(&self, id: &str) -> Result<Option<PaymentAuthorization>> {
        let Some(url) = self.intent_url(id)? else {
            debug!("rejected malformed payment intent id");
            return Ok(None);
        };

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(GatewayClientError::from)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        Ok(Some(Self::decode(response).await?))
    }
}
