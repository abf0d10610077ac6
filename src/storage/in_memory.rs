//! In-memory implementation of LodgingStore for testing and development

use crate::core::lodging::{LodgingRecord, Reservation};
use crate::core::query::{LodgingFilter, SortSpec};
use crate::core::store::LodgingStore;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// In-memory lodging store
///
/// Records are kept in insertion order, which is the natural order returned
/// when a search has no sort option. Appends happen under the write lock, so
/// concurrent reservations against the same record never overwrite each
/// other.
#[derive(Clone, Default)]
pub struct InMemoryLodgingStore {
    lodgings: Arc<RwLock<Vec<LodgingRecord>>>,
}

impl InMemoryLodgingStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LodgingStore for InMemoryLodgingStore {
    fn backend_name(&self) -> &'static str {
        "in_memory"
    }

    async fn insert(&self, record: LodgingRecord) -> Result<LodgingRecord> {
        let mut lodgings = self
            .lodgings
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        if lodgings.iter().any(|l| l.id == record.id) {
            return Err(anyhow!("Hotel {} already exists", record.id));
        }

        lodgings.push(record.clone());

        Ok(record)
    }

    async fn find(
        &self,
        filter: &LodgingFilter,
        sort: SortSpec,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<LodgingRecord>> {
        let lodgings = self
            .lodgings
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let mut matching: Vec<&LodgingRecord> =
            lodgings.iter().filter(|l| filter.matches(l)).collect();

        // Stable: ties keep insertion order
        matching.sort_by(|a, b| sort.compare(a, b));

        Ok(matching
            .into_iter()
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &LodgingFilter) -> Result<usize> {
        let lodgings = self
            .lodgings
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(lodgings.iter().filter(|l| filter.matches(l)).count())
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<LodgingRecord>> {
        let lodgings = self
            .lodgings
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(lodgings.iter().find(|l| &l.id == id).cloned())
    }

    async fn list_recent(&self) -> Result<Vec<LodgingRecord>> {
        let lodgings = self
            .lodgings
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let mut all = lodgings.clone();
        all.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        Ok(all)
    }

    async fn find_by_guest(&self, user_id: &str) -> Result<Vec<LodgingRecord>> {
        let lodgings = self
            .lodgings
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(lodgings
            .iter()
            .filter(|l| l.has_guest(user_id))
            .cloned()
            .collect())
    }

    async fn append_reservation(
        &self,
        id: &Uuid,
        reservation: Reservation,
    ) -> Result<Option<LodgingRecord>> {
        let mut lodgings = self
            .lodgings
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let Some(lodging) = lodgings.iter_mut().find(|l| &l.id == id) else {
            return Ok(None);
        };

        lodging.push_reservation(reservation);

        Ok(Some(lodging.clone()))
    }
}
