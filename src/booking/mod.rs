//! Booking and payment reconciliation
//!
//! A booking is two requests. The first prices the stay from the stored
//! nightly rate and opens an authorization with the payment gateway, tagged
//! with the lodging and the requester. The client then completes payment
//! directly with the processor. The second request names the authorization;
//! the engine reads it back from the gateway, checks the tags and the status,
//! and only then appends the reservation to the lodging record.
//!
//! Nothing the client sends about the payment is trusted. No lock is held
//! across gateway round-trips; the append is the only write and it is a
//! single atomic store call.

pub mod phase;
pub mod request;

pub use phase::{BookingAttempt, BookingPhase};
pub use request::{
    BOOKING_SAVED, BookingReceipt, CommitBookingRequest, PaymentIntentRequest,
    PaymentIntentResponse,
};

use crate::core::error::{
    GatewayOperation, HavenError, HavenResult, LodgingError, PaymentError, StorageError,
    ValidationError,
};
use crate::core::payment::{AuthorizationMetadata, AuthorizationStatus, PaymentGateway};
use crate::core::store::LodgingStore;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// Currency used when none is configured
pub const DEFAULT_CURRENCY: &str = "gbp";

/// Convert a major-unit amount to integer minor units
pub fn minor_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Runs the authorize and commit protocol against injected collaborators
#[derive(Clone)]
pub struct BookingEngine {
    store: Arc<dyn LodgingStore>,
    gateway: Arc<dyn PaymentGateway>,
    currency: String,
}

impl BookingEngine {
    pub fn new(store: Arc<dyn LodgingStore>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self {
            store,
            gateway,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into().to_lowercase();
        self
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Price a stay and open a payment authorization for it
    ///
    /// Every call creates a new authorization; abandoned ones are left to
    /// expire in the gateway.
    pub async fn create_authorization(
        &self,
        hotel_id: Uuid,
        nights: i64,
        user_id: &str,
    ) -> HavenResult<PaymentIntentResponse> {
        let mut attempt = BookingAttempt::requested(hotel_id, user_id);

        match self.authorize(&mut attempt, hotel_id, nights, user_id).await {
            Ok(response) => Ok(response),
            Err(err) => Err(attempt.reject(err)),
        }
    }

    /// Verify a completed authorization and record the reservation
    ///
    /// Appends exactly one reservation on success and none on any failure.
    /// Not idempotent: committing the same authorization twice appends twice.
    pub async fn commit_booking(
        &self,
        hotel_id: Uuid,
        request: CommitBookingRequest,
        user_id: &str,
    ) -> HavenResult<BookingReceipt> {
        let mut attempt = BookingAttempt::authorized(hotel_id, user_id);

        match self.commit(&mut attempt, hotel_id, &request, user_id).await {
            Ok(receipt) => Ok(receipt),
            Err(err) => Err(attempt.reject(err)),
        }
    }

    async fn authorize(
        &self,
        attempt: &mut BookingAttempt,
        hotel_id: Uuid,
        nights: i64,
        user_id: &str,
    ) -> HavenResult<PaymentIntentResponse> {
        if nights <= 0 {
            return Err(ValidationError::field(
                "numberOfNights",
                "Valid number of nights is required",
            )
            .into());
        }

        let lodging = self
            .store
            .find_by_id(&hotel_id)
            .await
            .map_err(|e| self.storage_error(e))?
            .ok_or(LodgingError::NotFound { id: hotel_id })?;

        let total_cost = lodging.price_per_night * nights as f64;
        let amount = minor_units(total_cost);

        attempt.advance(BookingPhase::Authorizing)?;

        let authorization = self
            .gateway
            .create_authorization(
                amount,
                &self.currency,
                AuthorizationMetadata::new(hotel_id.to_string(), user_id),
            )
            .await
            .map_err(|e| gateway_error(GatewayOperation::Create, e))?;

        let client_secret = authorization.client_secret.ok_or_else(|| PaymentError::Gateway {
            operation: GatewayOperation::Create,
            message: format!("authorization {} has no client secret", authorization.id),
        })?;

        attempt.advance(BookingPhase::Authorized)?;

        info!(
            hotel_id = %hotel_id,
            payment_intent_id = %authorization.id,
            gateway = self.gateway.name(),
            nights,
            amount,
            "payment authorization created"
        );

        Ok(PaymentIntentResponse {
            payment_intent_id: authorization.id,
            client_secret,
            total_cost,
        })
    }

    async fn commit(
        &self,
        attempt: &mut BookingAttempt,
        hotel_id: Uuid,
        request: &CommitBookingRequest,
        user_id: &str,
    ) -> HavenResult<BookingReceipt> {
        let intent_id = request.payment_intent_id()?;
        request.validate()?;

        attempt.advance(BookingPhase::Verifying)?;

        let authorization = self
            .gateway
            .retrieve_authorization(intent_id)
            .await
            .map_err(|e| gateway_error(GatewayOperation::Retrieve, e))?
            .ok_or_else(|| PaymentError::NotFound {
                id: intent_id.to_string(),
            })?;

        // Tags are checked before status
        if !authorization
            .metadata
            .matches(&hotel_id.to_string(), user_id)
        {
            return Err(PaymentError::Mismatch.into());
        }

        if authorization.status != AuthorizationStatus::Succeeded {
            return Err(PaymentError::NotCompleted {
                status: authorization.status.to_string(),
            }
            .into());
        }

        let reservation = request.to_reservation(user_id);
        let booking_id = reservation.id;

        self.store
            .append_reservation(&hotel_id, reservation)
            .await
            .map_err(|e| self.storage_error(e))?
            .ok_or(LodgingError::NotFound { id: hotel_id })?;

        attempt.advance(BookingPhase::Committed)?;

        info!(
            hotel_id = %hotel_id,
            payment_intent_id = %authorization.id,
            booking_id = %booking_id,
            "booking committed"
        );

        Ok(BookingReceipt::saved(booking_id))
    }

    fn storage_error(&self, err: anyhow::Error) -> HavenError {
        StorageError::QueryError {
            backend: self.store.backend_name().to_string(),
            message: err.to_string(),
        }
        .into()
    }
}

fn gateway_error(operation: GatewayOperation, err: anyhow::Error) -> HavenError {
    PaymentError::Gateway {
        operation,
        message: err.to_string(),
    }
    .into()
}
