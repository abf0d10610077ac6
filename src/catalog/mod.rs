//! Read side of the inventory plus host listings

use crate::core::error::{HavenError, HavenResult, LodgingError, StorageError};
use crate::core::lodging::{LodgingRecord, NewLodging};
use crate::core::query::{PaginatedResponse, PaginationMeta, SearchCriteria, plan};
use crate::core::store::LodgingStore;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

/// Search, lookup and listing over a [`LodgingStore`]
#[derive(Clone)]
pub struct Catalog {
    store: Arc<dyn LodgingStore>,
}

impl Catalog {
    pub fn new(store: Arc<dyn LodgingStore>) -> Self {
        Self { store }
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Plan and run a search, returning one page plus totals
    pub async fn search(
        &self,
        criteria: &SearchCriteria,
    ) -> HavenResult<PaginatedResponse<LodgingRecord>> {
        let plan = plan(criteria)?;
        let pagination = plan.pagination;

        debug!(
            page = pagination.page,
            sort = ?plan.sort,
            unconstrained = plan.filter.is_unconstrained(),
            "planned lodging search"
        );

        let total = self
            .store
            .count(&plan.filter)
            .await
            .map_err(|e| self.storage_error(e))?;

        let data = self
            .store
            .find(&plan.filter, plan.sort, pagination.skip, pagination.limit)
            .await
            .map_err(|e| self.storage_error(e))?;

        Ok(PaginatedResponse {
            data,
            pagination: PaginationMeta::new(pagination.page, total),
        })
    }

    pub async fn get(&self, id: Uuid) -> HavenResult<LodgingRecord> {
        self.store
            .find_by_id(&id)
            .await
            .map_err(|e| self.storage_error(e))?
            .ok_or_else(|| LodgingError::NotFound { id }.into())
    }

    /// Every lodging, most recently updated first
    pub async fn latest(&self) -> HavenResult<Vec<LodgingRecord>> {
        self.store
            .list_recent()
            .await
            .map_err(|e| self.storage_error(e))
    }

    /// Lodgings the guest has booked, each narrowed to the guest's own reservations
    pub async fn bookings_for(&self, user_id: &str) -> HavenResult<Vec<LodgingRecord>> {
        let records = self
            .store
            .find_by_guest(user_id)
            .await
            .map_err(|e| self.storage_error(e))?;

        Ok(records
            .iter()
            .map(|record| record.narrowed_to_guest(user_id))
            .collect())
    }

    /// Create a listing owned by `owner`
    pub async fn list_lodging(&self, owner: &str, listing: NewLodging) -> HavenResult<LodgingRecord> {
        listing.validate()?;

        let record = self
            .store
            .insert(listing.into_record(owner))
            .await
            .map_err(|e| self.storage_error(e))?;

        info!(hotel_id = %record.id, owner = %owner, "lodging listed");

        Ok(record)
    }

    fn storage_error(&self, err: anyhow::Error) -> HavenError {
        StorageError::QueryError {
            backend: self.store.backend_name().to_string(),
            message: err.to_string(),
        }
        .into()
    }
}
