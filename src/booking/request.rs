//! Wire types for the booking endpoints

use crate::core::error::ValidationError;
use crate::core::lodging::Reservation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;
use validator::Validate;

/// Message returned on a successful commit
pub const BOOKING_SAVED: &str = "Booking saved successfully";

/// Body of `POST /{hotelId}/bookings/payment-intent`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentRequest {
    /// Left loosely typed so both `3` and `"3"` are accepted
    #[serde(default)]
    pub number_of_nights: Option<Value>,
}

impl PaymentIntentRequest {
    /// Positive whole number of nights
    pub fn nights(&self) -> Result<i64, ValidationError> {
        let invalid = || ValidationError::field("numberOfNights", "Valid number of nights is required");

        let nights = match &self.number_of_nights {
            Some(Value::Number(n)) => match n.as_i64() {
                Some(n) => n,
                None => match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => f as i64,
                    _ => return Err(invalid()),
                },
            },
            Some(Value::String(s)) => s.trim().parse::<i64>().map_err(|_| invalid())?,
            _ => return Err(invalid()),
        };

        if nights <= 0 {
            return Err(invalid());
        }

        Ok(nights)
    }
}

/// Response of a successful authorization request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub payment_intent_id: String,
    pub client_secret: String,

    /// Price per night times nights, in major units
    pub total_cost: f64,
}

/// Body of `POST /{hotelId}/bookings`
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CommitBookingRequest {
    #[serde(default)]
    pub payment_intent_id: Option<String>,

    pub first_name: String,
    pub last_name: String,

    #[validate(email(message = "Valid email is required"))]
    pub email: String,

    pub adult_count: u32,

    #[serde(default)]
    pub child_count: u32,

    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,

    /// Persisted as supplied; not re-priced at commit
    pub total_cost: f64,
}

impl CommitBookingRequest {
    /// The authorization id, rejecting missing or blank values
    pub fn payment_intent_id(&self) -> Result<&str, ValidationError> {
        match self.payment_intent_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(ValidationError::MissingField {
                field: "paymentIntentId".to_string(),
            }),
        }
    }

    /// Build the reservation to embed, with a freshly assigned id
    pub fn to_reservation(&self, user_id: &str) -> Reservation {
        Reservation {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            adult_count: self.adult_count,
            child_count: self.child_count,
            check_in: self.check_in,
            check_out: self.check_out,
            total_cost: self.total_cost,
        }
    }
}

/// Response of a successful commit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingReceipt {
    pub message: String,
    pub booking_id: Uuid,
}

impl BookingReceipt {
    pub fn saved(booking_id: Uuid) -> Self {
        Self {
            message: BOOKING_SAVED.to_string(),
            booking_id,
        }
    }
}
