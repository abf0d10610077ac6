//! Server host for transport-agnostic API exposure
//!
//! `ServerHost` holds every collaborator a request handler needs. It knows
//! nothing about HTTP; exposures such as [`RestExposure`] consume it.
//!
//! [`RestExposure`]: super::exposure::RestExposure

use crate::booking::BookingEngine;
use crate::catalog::Catalog;
use crate::config::HavenConfig;
use crate::core::auth::AuthProvider;
use crate::core::error::{HavenResult, RequestError};
use crate::core::payment::PaymentGateway;
use crate::core::store::LodgingStore;
use axum::http::HeaderMap;
use std::sync::Arc;

/// Host context containing all service state
///
/// # Example
///
/// ```rust,ignore
/// let host = ServerHost::from_builder_components(store, gateway, auth, config);
/// let app = RestExposure::build_router(Arc::new(host), vec![])?;
/// ```
pub struct ServerHost {
    pub config: Arc<HavenConfig>,
    pub catalog: Catalog,
    pub engine: BookingEngine,
    pub auth_provider: Arc<dyn AuthProvider>,
    backend_name: &'static str,
    gateway_name: &'static str,
}

impl ServerHost {
    /// Wire the catalog and booking engine over the injected collaborators
    pub fn from_builder_components(
        store: Arc<dyn LodgingStore>,
        gateway: Arc<dyn PaymentGateway>,
        auth_provider: Arc<dyn AuthProvider>,
        config: HavenConfig,
    ) -> Self {
        let backend_name = store.backend_name();
        let gateway_name = gateway.name();
        let engine = BookingEngine::new(store.clone(), gateway)
            .with_currency(config.payments.currency.clone());

        Self {
            config: Arc::new(config),
            catalog: Catalog::new(store),
            engine,
            auth_provider,
            backend_name,
            gateway_name,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend_name
    }

    pub fn gateway_name(&self) -> &'static str {
        self.gateway_name
    }

    /// Resolve the caller, failing with 401 when there is none
    pub async fn require_user(&self, headers: &HeaderMap) -> HavenResult<String> {
        let context = self
            .auth_provider
            .extract_context(headers)
            .await
            .map_err(|e| RequestError::Unauthorized {
                message: e.to_string(),
            })?;

        Ok(context.require_user()?.to_string())
    }
}
