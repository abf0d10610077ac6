//! # Haven
//!
//! Lodging search and payment-reconciled booking service.
//!
//! ## Features
//!
//! - **Search Query Planner**: open-ended filter, sort and paging parameters
//!   become one store query, evaluated in memory or translated to MongoDB
//! - **Payment Reconciliation**: bookings are committed only after the
//!   payment authorization is read back from the gateway and verified
//!   against the lodging and the requester
//! - **Atomic Reservations**: reservations are embedded in their lodging and
//!   appended with a single atomic write
//! - **Pluggable Backends**: in-memory or MongoDB storage, in-memory or
//!   Stripe-compatible payment gateway
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use haven::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     ServerBuilder::new()
//!         .with_store(InMemoryLodgingStore::new())
//!         .with_gateway(InMemoryGateway::new())
//!         .serve()
//!         .await
//! }
//! ```

pub mod booking;
pub mod catalog;
pub mod config;
pub mod core;
pub mod gateway;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        auth::{AuthContext, AuthProvider, HeaderAuthProvider, NoAuthProvider},
        error::{HavenError, HavenResult},
        lodging::{LodgingRecord, NewLodging, Reservation},
        payment::{
            AuthorizationMetadata, AuthorizationStatus, PaymentAuthorization, PaymentGateway,
        },
        query::{PaginatedResponse, PaginationMeta, SearchCriteria, SortOption, plan},
        store::LodgingStore,
    };

    // === Services ===
    pub use crate::booking::{
        BookingEngine, BookingReceipt, CommitBookingRequest, PaymentIntentResponse,
    };
    pub use crate::catalog::Catalog;

    // === Backends ===
    pub use crate::gateway::InMemoryGateway;
    #[cfg(feature = "stripe")]
    pub use crate::gateway::StripeGateway;
    pub use crate::storage::InMemoryLodgingStore;
    #[cfg(feature = "mongodb_backend")]
    pub use crate::storage::MongoLodgingStore;

    // === Config ===
    pub use crate::config::{HavenConfig, StorageBackend};

    // === Server ===
    pub use crate::server::{RestExposure, ServerBuilder, ServerHost};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use uuid::Uuid;
}
