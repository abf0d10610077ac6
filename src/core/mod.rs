//! Core module containing the domain types, traits and error hierarchy

pub mod auth;
pub mod error;
pub mod lodging;
pub mod payment;
pub mod query;
pub mod store;

pub use auth::{AuthContext, AuthProvider, HeaderAuthProvider, NoAuthProvider};
pub use error::{HavenError, HavenResult};
pub use lodging::{LodgingRecord, NewLodging, Reservation};
pub use payment::{AuthorizationMetadata, AuthorizationStatus, PaymentAuthorization, PaymentGateway};
pub use query::{LodgingFilter, PaginatedResponse, PaginationMeta, SearchCriteria, SearchPlan, SortSpec};
pub use store::LodgingStore;
