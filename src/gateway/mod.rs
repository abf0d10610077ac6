//! Payment gateway implementations

pub mod in_memory;
#[cfg(feature = "stripe")]
pub mod stripe;

pub use self::in_memory::InMemoryGateway;
#[cfg(feature = "stripe")]
pub use self::stripe::{GatewayClientError, StripeGateway};
