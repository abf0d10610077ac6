//! Payment gateway contract
//!
//! The gateway owns payment authorizations (payment intents). The booking
//! engine creates them, reads them back, and never mutates them.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle states reported by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorizationStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,
    /// Any state this client does not know about
    #[serde(other)]
    Unknown,
}

impl AuthorizationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorizationStatus::RequiresPaymentMethod => "requires_payment_method",
            AuthorizationStatus::RequiresConfirmation => "requires_confirmation",
            AuthorizationStatus::RequiresAction => "requires_action",
            AuthorizationStatus::Processing => "processing",
            AuthorizationStatus::RequiresCapture => "requires_capture",
            AuthorizationStatus::Canceled => "canceled",
            AuthorizationStatus::Succeeded => "succeeded",
            AuthorizationStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AuthorizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tags attached at creation so the authorization can later be verified
/// without trusting client input
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationMetadata {
    #[serde(rename = "hotelId", default)]
    pub lodging_id: Option<String>,

    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
}

impl AuthorizationMetadata {
    pub fn new(lodging_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            lodging_id: Some(lodging_id.into()),
            user_id: Some(user_id.into()),
        }
    }

    /// Whether both tags are present and equal to the expected values
    pub fn matches(&self, lodging_id: &str, user_id: &str) -> bool {
        self.lodging_id.as_deref() == Some(lodging_id) && self.user_id.as_deref() == Some(user_id)
    }
}

/// A payment authorization as held by the gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentAuthorization {
    pub id: String,

    /// Amount in minor currency units
    pub amount: i64,

    pub currency: String,
    pub status: AuthorizationStatus,

    /// Credential handed to the client to complete payment
    #[serde(default)]
    pub client_secret: Option<String>,

    #[serde(default)]
    pub metadata: AuthorizationMetadata,
}

/// External payment processor
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Short gateway name for logs
    fn name(&self) -> &'static str;

    /// Create an authorization for `amount` minor units
    async fn create_authorization(
        &self,
        amount: i64,
        currency: &str,
        metadata: AuthorizationMetadata,
    ) -> Result<PaymentAuthorization>;

    /// Read an authorization back; `Ok(None)` when the gateway has no record of it
    async fn retrieve_authorization(&self, id: &str) -> Result<Option<PaymentAuthorization>>;
}
