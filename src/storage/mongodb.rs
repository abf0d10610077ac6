//! MongoDB storage backend using the official MongoDB async driver.
//!
//! Provides `MongoLodgingStore`, backed by a single `hotels` collection in a
//! `mongodb::Database`.
//!
//! # Feature flag
//!
//! This module is gated behind the `mongodb_backend` feature flag:
//! ```toml
//! [dependencies]
//! haven-rs = { version = "0.1", features = ["mongodb_backend"] }
//! ```
//!
//! # Storage model
//!
//! Each lodging is one document; reservations are embedded in its `bookings`
//! array. Appending a reservation is a single `findOneAndUpdate` with
//! `$push`, which MongoDB applies atomically per document, so concurrent
//! bookings never lose each other.
//!
//! # Serialization strategy
//!
//! Records are serialized via `serde_json::Value` as an intermediate format,
//! then converted to BSON documents. UUIDs are therefore stored as strings.
//! `lastUpdated` is written as an RFC 3339 string with fixed nanosecond
//! precision so that lexical order is chronological order.

use crate::core::lodging::{LodgingRecord, Reservation};
use crate::core::query::{LodgingFilter, SortSpec};
use crate::core::store::LodgingStore;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use futures::TryStreamExt;
use mongodb::Database;
use mongodb::bson::{Bson, Document, doc};
use mongodb::options::ReturnDocument;
use serde::Serialize;
use uuid::Uuid;

/// Collection holding lodging documents
pub const HOTELS_COLLECTION: &str = "hotels";

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

/// Serialize a value into a BSON document through its JSON form
fn to_document<T: Serialize>(value: &T) -> Result<Document> {
    let json =
        serde_json::to_value(value).map_err(|e| anyhow!("Failed to serialize value: {}", e))?;
    let bson_val = mongodb::bson::to_bson(&json)
        .map_err(|e| anyhow!("Failed to convert JSON to BSON: {}", e))?;

    match bson_val {
        Bson::Document(d) => Ok(d),
        _ => Err(anyhow!("Expected BSON document, got non-object")),
    }
}

/// Convert a BSON document back into a lodging record
fn document_to_record(doc: Document) -> Result<LodgingRecord> {
    let json = Bson::Document(doc).into_relaxed_extjson();
    serde_json::from_value(json)
        .map_err(|e| anyhow!("Failed to deserialize hotel from document: {}", e))
}

/// Fixed-width timestamp for fields that are sorted on
fn sortable_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Convert a UUID to its BSON string representation for queries.
fn uuid_bson(id: &Uuid) -> Bson {
    Bson::String(id.to_string())
}

/// Translate the planner's predicate into a MongoDB query document
pub fn filter_document(filter: &LodgingFilter) -> Document {
    let mut query = Document::new();

    if let Some(destination) = &filter.destination {
        let pattern = destination.pattern();
        query.insert(
            "$or",
            vec![
                doc! { "city": { "$regex": pattern.as_str(), "$options": "i" } },
                doc! { "country": { "$regex": pattern.as_str(), "$options": "i" } },
            ],
        );
    }

    if let Some(min) = filter.min_adult_capacity {
        query.insert("adultCount", doc! { "$gte": i64::from(min) });
    }

    if let Some(min) = filter.min_child_capacity {
        query.insert("childCount", doc! { "$gte": i64::from(min) });
    }

    // `$all` over an empty list matches nothing, an empty requirement matches everything
    if let Some(facilities) = filter.required_facilities.as_ref().filter(|f| !f.is_empty()) {
        let all: Vec<String> = facilities.iter().cloned().collect();
        query.insert("facilities", doc! { "$all": all });
    }

    if let Some(types) = &filter.allowed_types {
        let any: Vec<String> = types.iter().cloned().collect();
        query.insert("type", doc! { "$in": any });
    }

    if let Some(stars) = &filter.allowed_star_ratings {
        let any: Vec<i32> = stars.iter().map(|s| i32::from(*s)).collect();
        query.insert("starRating", doc! { "$in": any });
    }

    if let Some(max) = filter.max_price {
        query.insert("pricePerNight", doc! { "$lte": max });
    }

    query
}

/// Translate a [`SortSpec`] into a MongoDB sort document
///
/// Keyed sorts end with `_id` so that skip/limit pages stay disjoint when
/// several documents share the sort key.
pub fn sort_document(sort: SortSpec) -> Option<Document> {
    match sort {
        SortSpec::Natural => None,
        SortSpec::StarRatingDesc => Some(doc! { "starRating": -1, "_id": 1 }),
        SortSpec::PriceAsc => Some(doc! { "pricePerNight": 1, "_id": 1 }),
        SortSpec::PriceDesc => Some(doc! { "pricePerNight": -1, "_id": 1 }),
    }
}

// ---------------------------------------------------------------------------
// MongoLodgingStore
// ---------------------------------------------------------------------------

/// Lodging store backed by MongoDB.
///
/// # Example
///
/// ```rust,ignore
/// use mongodb::Client;
/// use haven::storage::MongoLodgingStore;
///
/// let client = Client::with_uri_str("mongodb://localhost:27017").await?;
/// let store = MongoLodgingStore::new(client.database("haven"));
/// store.ensure_indexes().await?;
/// ```
#[derive(Clone, Debug)]
pub struct MongoLodgingStore {
    database: Database,
}

impl MongoLodgingStore {
    /// Create a new `MongoLodgingStore` with the given database handle.
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Get a reference to the underlying database.
    pub fn database(&self) -> &Database {
        &self.database
    }

    fn collection(&self) -> mongodb::Collection<Document> {
        self.database.collection(HOTELS_COLLECTION)
    }

    /// Create the indexes used by search and guest lookups.
    ///
    /// Idempotent, safe to call on every startup.
    pub async fn ensure_indexes(&self) -> Result<()> {
        use mongodb::IndexModel;

        let indexes = vec![
            IndexModel::builder().keys(doc! { "city": 1 }).build(),
            IndexModel::builder().keys(doc! { "country": 1 }).build(),
            IndexModel::builder().keys(doc! { "pricePerNight": 1 }).build(),
            IndexModel::builder().keys(doc! { "starRating": -1 }).build(),
            IndexModel::builder().keys(doc! { "lastUpdated": -1 }).build(),
            IndexModel::builder().keys(doc! { "bookings.userId": 1 }).build(),
        ];

        self.collection()
            .create_indexes(indexes)
            .await
            .map_err(|e| anyhow!("Failed to create indexes on hotels collection: {}", e))?;

        Ok(())
    }

    async fn collect_records(
        &self,
        cursor: mongodb::Cursor<Document>,
    ) -> Result<Vec<LodgingRecord>> {
        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| anyhow!("Failed to collect hotels: {}", e))?;

        docs.into_iter().map(document_to_record).collect()
    }
}

#[async_trait]
impl LodgingStore for MongoLodgingStore {
    fn backend_name(&self) -> &'static str {
        "mongodb"
    }

    async fn insert(&self, record: LodgingRecord) -> Result<LodgingRecord> {
        let mut doc = to_document(&record)?;
        doc.insert("lastUpdated", sortable_timestamp(&record.last_updated));

        self.collection()
            .insert_one(doc)
            .await
            .map_err(|e| anyhow!("Failed to create hotel: {}", e))?;

        Ok(record)
    }

    async fn find(
        &self,
        filter: &LodgingFilter,
        sort: SortSpec,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<LodgingRecord>> {
        let collection = self.collection();
        let mut find = collection
            .find(filter_document(filter))
            .skip(skip as u64)
            .limit(limit as i64);

        if let Some(sort) = sort_document(sort) {
            find = find.sort(sort);
        }

        let cursor = find
            .await
            .map_err(|e| anyhow!("Failed to search hotels: {}", e))?;

        self.collect_records(cursor).await
    }

    async fn count(&self, filter: &LodgingFilter) -> Result<usize> {
        let total = self
            .collection()
            .count_documents(filter_document(filter))
            .await
            .map_err(|e| anyhow!("Failed to count hotels: {}", e))?;

        Ok(total as usize)
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<LodgingRecord>> {
        let doc = self
            .collection()
            .find_one(doc! { "_id": uuid_bson(id) })
            .await
            .map_err(|e| anyhow!("Failed to get hotel: {}", e))?;

        doc.map(document_to_record).transpose()
    }

    async fn list_recent(&self) -> Result<Vec<LodgingRecord>> {
        let cursor = self
            .collection()
            .find(doc! {})
            .sort(doc! { "lastUpdated": -1 })
            .await
            .map_err(|e| anyhow!("Failed to list hotels: {}", e))?;

        self.collect_records(cursor).await
    }

    async fn find_by_guest(&self, user_id: &str) -> Result<Vec<LodgingRecord>> {
        let cursor = self
            .collection()
            .find(doc! { "bookings.userId": user_id })
            .await
            .map_err(|e| anyhow!("Failed to list guest bookings: {}", e))?;

        self.collect_records(cursor).await
    }

    async fn append_reservation(
        &self,
        id: &Uuid,
        reservation: Reservation,
    ) -> Result<Option<LodgingRecord>> {
        let booking = to_document(&reservation)?;
        let now = sortable_timestamp(&Utc::now());

        let updated = self
            .collection()
            .find_one_and_update(
                doc! { "_id": uuid_bson(id) },
                doc! {
                    "$push": { "bookings": booking },
                    "$set": { "lastUpdated": now },
                },
            )
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| anyhow!("Failed to append booking: {}", e))?;

        updated.map(document_to_record).transpose()
    }
}
