//! Inventory store trait

use crate::core::lodging::{LodgingRecord, Reservation};
use crate::core::query::{LodgingFilter, SortSpec};
use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Storage for lodging records and their embedded reservations
///
/// Implementations are agnostic to how the predicate is evaluated: the
/// in-memory store runs [`LodgingFilter::matches`] directly, document stores
/// translate the filter into their own query language.
///
/// The only mutation of an existing record is [`append_reservation`], which
/// must be atomic at the document level: two concurrent appends against the
/// same record both land.
///
/// [`append_reservation`]: LodgingStore::append_reservation
#[async_trait]
pub trait LodgingStore: Send + Sync {
    /// Short backend name for logs and health output
    fn backend_name(&self) -> &'static str;

    /// Insert a new lodging record
    async fn insert(&self, record: LodgingRecord) -> Result<LodgingRecord>;

    /// Matching records in `sort` order, windowed by `skip` and `limit`
    async fn find(
        &self,
        filter: &LodgingFilter,
        sort: SortSpec,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<LodgingRecord>>;

    /// Number of records matching `filter`
    async fn count(&self, filter: &LodgingFilter) -> Result<usize>;

    /// Fetch one record by id
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<LodgingRecord>>;

    /// All records, most recently updated first
    async fn list_recent(&self) -> Result<Vec<LodgingRecord>>;

    /// Records holding at least one reservation by `user_id`
    async fn find_by_guest(&self, user_id: &str) -> Result<Vec<LodgingRecord>>;

    /// Atomically append a reservation and return the updated record
    ///
    /// Returns `Ok(None)` when no record has this id.
    async fn append_reservation(
        &self,
        id: &Uuid,
        reservation: Reservation,
    ) -> Result<Option<LodgingRecord>>;
}
