//! REST API exposure
//!
//! Consumes a `ServerHost` and produces an Axum `Router` with the lodging,
//! booking and health routes.

pub mod handlers;

use super::super::host::ServerHost;
use anyhow::Result;
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;

/// REST API exposure implementation
pub struct RestExposure;

impl RestExposure {
    /// Build the REST router from a host
    ///
    /// Routes:
    /// - `GET  /api/hotels`
    /// - `GET  /api/hotels/search`
    /// - `GET  /api/hotels/{id}`
    /// - `POST /api/hotels/{id}/bookings/payment-intent`
    /// - `POST /api/hotels/{id}/bookings`
    /// - `GET  /api/my-bookings`
    /// - `POST /api/my-hotels`
    /// - `GET  /health`, `/healthz`, `/api/health`
    ///
    /// Custom routes are merged last.
    pub fn build_router(host: Arc<ServerHost>, custom_routes: Vec<Router>) -> Result<Router> {
        let mut app = Self::health_routes()
            .merge(Self::hotel_routes())
            .merge(Self::account_routes())
            .with_state(host);

        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }

        Ok(app)
    }

    fn hotel_routes() -> Router<Arc<ServerHost>> {
        Router::new()
            .route("/api/hotels", get(handlers::list_hotels))
            .route("/api/hotels/search", get(handlers::search))
            .route("/api/hotels/{id}", get(handlers::get_hotel))
            .route(
                "/api/hotels/{id}/bookings/payment-intent",
                post(handlers::create_payment_intent),
            )
            .route("/api/hotels/{id}/bookings", post(handlers::commit_booking))
    }

    fn account_routes() -> Router<Arc<ServerHost>> {
        Router::new()
            .route("/api/my-bookings", get(handlers::my_bookings))
            .route("/api/my-hotels", post(handlers::create_my_hotel))
    }

    fn health_routes() -> Router<Arc<ServerHost>> {
        Router::new()
            .route("/health", get(handlers::health))
            .route("/healthz", get(handlers::health))
            .route("/api/health", get(handlers::health))
    }
}
