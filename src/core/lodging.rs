//! Lodging records and their embedded reservations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A bookable property listing
///
/// Reservations live inside the record (`bookings`) and have no lifecycle of
/// their own: they are appended once at commit time and never removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LodgingRecord {
    #[serde(rename = "_id")]
    pub id: Uuid,

    /// Owning host
    pub user_id: String,

    pub name: String,
    pub city: String,
    pub country: String,
    pub description: String,

    #[serde(rename = "type")]
    pub lodging_type: String,

    /// Adult capacity
    pub adult_count: u32,

    /// Child capacity
    pub child_count: u32,

    #[serde(default)]
    pub facilities: Vec<String>,

    pub price_per_night: f64,
    pub star_rating: u8,

    #[serde(default)]
    pub image_urls: Vec<String>,

    pub last_updated: DateTime<Utc>,

    #[serde(default)]
    pub bookings: Vec<Reservation>,
}

impl LodgingRecord {
    /// Refresh `last_updated`; called on every write
    pub fn touch(&mut self) {
        self.last_updated = Utc::now();
    }

    /// Append a reservation and bump `last_updated`
    pub fn push_reservation(&mut self, reservation: Reservation) {
        self.bookings.push(reservation);
        self.touch();
    }

    /// Copy of this record with `bookings` narrowed to one guest
    pub fn narrowed_to_guest(&self, user_id: &str) -> Self {
        let mut record = self.clone();
        record.bookings.retain(|b| b.user_id == user_id);
        record
    }

    /// Whether the given guest holds at least one reservation here
    pub fn has_guest(&self, user_id: &str) -> bool {
        self.bookings.iter().any(|b| b.user_id == user_id)
    }
}

/// A confirmed stay, embedded in its lodging record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    #[serde(rename = "_id")]
    pub id: Uuid,

    /// The guest that paid for the stay
    pub user_id: String,

    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub adult_count: u32,
    pub child_count: u32,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,

    /// Amount authorized for the stay, persisted as supplied at commit
    pub total_cost: f64,
}

/// Host-supplied fields for a new listing
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewLodging {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(length(min = 1, message = "City is required"))]
    pub city: String,

    #[validate(length(min = 1, message = "Country is required"))]
    pub country: String,

    #[serde(default)]
    pub description: String,

    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "Hotel type is required"))]
    pub lodging_type: String,

    pub adult_count: u32,

    #[serde(default)]
    pub child_count: u32,

    #[serde(default)]
    pub facilities: Vec<String>,

    #[validate(range(min = 0.0, message = "Price per night must be non-negative"))]
    pub price_per_night: f64,

    #[validate(range(min = 1, max = 5, message = "Star rating must be between 1 and 5"))]
    pub star_rating: u8,

    #[serde(default)]
    pub image_urls: Vec<String>,
}

impl NewLodging {
    /// Turn the listing into a stored record owned by `owner`
    pub fn into_record(self, owner: &str) -> LodgingRecord {
        LodgingRecord {
            id: Uuid::new_v4(),
            user_id: owner.to_string(),
            name: self.name,
            city: self.city,
            country: self.country,
            description: self.description,
            lodging_type: self.lodging_type,
            adult_count: self.adult_count,
            child_count: self.child_count,
            facilities: self.facilities,
            price_per_night: self.price_per_night,
            star_rating: self.star_rating,
            image_urls: self.image_urls,
            last_updated: Utc::now(),
            bookings: Vec::new(),
        }
    }
}
