//! In-memory payment gateway for testing and development
//!
//! Behaves like a hosted processor from the service's point of view:
//! authorizations are created in `requires_payment_method` and only move
//! forward when something outside the booking engine (here, [`set_status`])
//! says the guest completed payment.
//!
//! [`set_status`]: InMemoryGateway::set_status

use crate::core::payment::{
    AuthorizationMetadata, AuthorizationStatus, PaymentAuthorization, PaymentGateway,
};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// In-memory gateway implementation
#[derive(Clone, Default)]
pub struct InMemoryGateway {
    intents: Arc<RwLock<HashMap<String, PaymentAuthorization>>>,
    unavailable: Arc<AtomicBool>,
    withhold_client_secret: Arc<AtomicBool>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the processor moving an authorization to a new state
    pub fn set_status(&self, id: &str, status: AuthorizationStatus) -> Result<()> {
        let mut intents = self
            .intents
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let intent = intents
            .get_mut(id)
            .ok_or_else(|| anyhow!("Payment intent {} not found", id))?;
        intent.status = status;

        Ok(())
    }

    /// Seed an authorization directly, bypassing creation
    pub fn insert(&self, authorization: PaymentAuthorization) -> Result<()> {
        let mut intents = self
            .intents
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        intents.insert(authorization.id.clone(), authorization);

        Ok(())
    }

    /// Make every call fail as if the processor were unreachable
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Create authorizations without a client secret
    pub fn set_withhold_client_secret(&self, withhold: bool) {
        self.withhold_client_secret.store(withhold, Ordering::SeqCst);
    }

    /// Number of authorizations ever created or seeded
    pub fn len(&self) -> usize {
        self.intents.read().map(|i| i.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ensure_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(anyhow!("payment processor unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl PaymentGateway for InMemoryGateway {
    fn name(&self) -> &'static str {
        "in_memory"
    }

    async fn create_authorization(
        &self,
        amount: i64,
        currency: &str,
        metadata: AuthorizationMetadata,
    ) -> Result<PaymentAuthorization> {
        self.ensure_available()?;

        if amount < 0 {
            return Err(anyhow!("amount must be non-negative, got {}", amount));
        }

        let id = format!("pi_{}", Uuid::new_v4().simple());
        let client_secret = if self.withhold_client_secret.load(Ordering::SeqCst) {
            None
        } else {
            Some(format!("{}_secret_{}", id, Uuid::new_v4().simple()))
        };

        let authorization = PaymentAuthorization {
            id: id.clone(),
            amount,
            currency: currency.to_lowercase(),
            status: AuthorizationStatus::RequiresPaymentMethod,
            client_secret,
            metadata,
        };

        self.insert(authorization.clone())?;

        Ok(authorization)
    }

    async fn retrieve_authorization(&self, id: &str) -> Result<Option<PaymentAuthorization>> {
        self.ensure_available()?;

        let intents = self
            .intents
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(intents.get(id).cloned())
    }
}
