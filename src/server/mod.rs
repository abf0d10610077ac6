//! HTTP server
//!
//! `ServerBuilder` wires the store, payment gateway and auth provider into a
//! `ServerHost`, and `RestExposure` turns the host into an Axum router.

pub mod builder;
pub mod exposure;
pub mod host;

pub use builder::ServerBuilder;
pub use exposure::RestExposure;
pub use host::ServerHost;
