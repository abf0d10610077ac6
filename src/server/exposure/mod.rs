//! API exposure modules
//!
//! Each exposure consumes a `ServerHost` and produces a router for its
//! protocol.

pub mod rest;

pub use rest::RestExposure;
