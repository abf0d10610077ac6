//! ServerBuilder for fluent API to build HTTP servers

use super::exposure::RestExposure;
use super::host::ServerHost;
use crate::config::{HavenConfig, StorageBackend};
use crate::core::auth::{AuthProvider, HeaderAuthProvider};
use crate::core::payment::PaymentGateway;
use crate::core::store::LodgingStore;
use crate::gateway::InMemoryGateway;
use crate::storage::InMemoryLodgingStore;
use anyhow::{Result, anyhow};
use axum::Router;
use axum::http::{HeaderValue, Method, header};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info, warn};

/// Builder for creating the HTTP server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_store(InMemoryLodgingStore::new())
///     .with_gateway(InMemoryGateway::new())
///     .build()?;
/// ```
pub struct ServerBuilder {
    store: Option<Arc<dyn LodgingStore>>,
    gateway: Option<Arc<dyn PaymentGateway>>,
    auth_provider: Option<Arc<dyn AuthProvider>>,
    config: HavenConfig,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            store: None,
            gateway: None,
            auth_provider: None,
            config: HavenConfig::default(),
            custom_routes: Vec::new(),
        }
    }

    /// Build a server whose store and gateway are chosen by `config`
    ///
    /// MongoDB needs the `mongodb_backend` feature and a Stripe-compatible
    /// gateway needs the `stripe` feature plus a secret key; without a key the
    /// in-memory gateway is used.
    pub async fn from_config(config: HavenConfig) -> Result<Self> {
        config.validate()?;

        let store: Arc<dyn LodgingStore> = match config.storage.backend {
            StorageBackend::InMemory => Arc::new(InMemoryLodgingStore::new()),
            StorageBackend::Mongodb => Self::mongo_store(&config).await?,
        };

        let gateway: Arc<dyn PaymentGateway> = match &config.payments.secret_key {
            Some(key) => Self::remote_gateway(&config, key)?,
            None => {
                warn!("no payment secret key configured, using the in-memory gateway");
                Arc::new(InMemoryGateway::new())
            }
        };

        Ok(Self::new()
            .with_store_arc(store)
            .with_gateway_arc(gateway)
            .with_config(config))
    }

    #[cfg(feature = "mongodb_backend")]
    async fn mongo_store(config: &HavenConfig) -> Result<Arc<dyn LodgingStore>> {
        use crate::core::error::StorageError;
        use crate::storage::MongoLodgingStore;

        let uri = config
            .storage
            .uri
            .as_deref()
            .ok_or_else(|| anyhow!("storage.uri is required for mongodb"))?;

        let connection_error = |message: String| StorageError::ConnectionError {
            backend: "MongoDB".to_string(),
            message,
        };

        let client = mongodb::Client::with_uri_str(uri)
            .await
            .map_err(|e| connection_error(e.to_string()))?;
        let store = MongoLodgingStore::new(client.database(&config.storage.database));
        store
            .ensure_indexes()
            .await
            .map_err(|e| connection_error(e.to_string()))?;

        info!(database = %config.storage.database, "connected to MongoDB");

        Ok(Arc::new(store))
    }

    #[cfg(not(feature = "mongodb_backend"))]
    async fn mongo_store(_config: &HavenConfig) -> Result<Arc<dyn LodgingStore>> {
        Err(anyhow!(
            "storage.backend is mongodb but the mongodb_backend feature is not enabled"
        ))
    }

    #[cfg(feature = "stripe")]
    fn remote_gateway(config: &HavenConfig, key: &str) -> Result<Arc<dyn PaymentGateway>> {
        use crate::gateway::StripeGateway;

        let gateway = match &config.payments.api_base {
            Some(base) => StripeGateway::new_with_base_url(key, base.as_str()),
            None => StripeGateway::new(key),
        };

        Ok(Arc::new(gateway))
    }

    #[cfg(not(feature = "stripe"))]
    fn remote_gateway(_config: &HavenConfig, _key: &str) -> Result<Arc<dyn PaymentGateway>> {
        Err(anyhow!(
            "a payment secret key is configured but the stripe feature is not enabled"
        ))
    }

    /// Set the lodging store (required)
    pub fn with_store(self, store: impl LodgingStore + 'static) -> Self {
        self.with_store_arc(Arc::new(store))
    }

    pub fn with_store_arc(mut self, store: Arc<dyn LodgingStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the payment gateway (required)
    pub fn with_gateway(self, gateway: impl PaymentGateway + 'static) -> Self {
        self.with_gateway_arc(Arc::new(gateway))
    }

    pub fn with_gateway_arc(mut self, gateway: Arc<dyn PaymentGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Override how callers are identified
    ///
    /// Defaults to a [`HeaderAuthProvider`] reading `auth.user_header`.
    pub fn with_auth_provider(mut self, provider: impl AuthProvider + 'static) -> Self {
        self.auth_provider = Some(Arc::new(provider));
        self
    }

    pub fn with_config(mut self, config: HavenConfig) -> Self {
        self.config = config;
        self
    }

    /// Add custom routes to the server
    ///
    /// Use this for routes outside the booking surface, e.g. webhooks.
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Build the transport-agnostic host
    pub fn build_host(mut self) -> Result<ServerHost> {
        let store = self
            .store
            .take()
            .ok_or_else(|| anyhow!("LodgingStore is required. Call .with_store()"))?;

        let gateway = self
            .gateway
            .take()
            .ok_or_else(|| anyhow!("PaymentGateway is required. Call .with_gateway()"))?;

        let auth_provider = match self.auth_provider.take() {
            Some(provider) => provider,
            None => Arc::new(HeaderAuthProvider::new(&self.config.auth.user_header)?),
        };

        Ok(ServerHost::from_builder_components(
            store,
            gateway,
            auth_provider,
            self.config,
        ))
    }

    /// Build the final REST router with tracing and CORS layers
    pub fn build(mut self) -> Result<Router> {
        let custom_routes = std::mem::take(&mut self.custom_routes);
        let cors = cors_layer(self.config.server.frontend_url.as_deref())?;
        let host = Arc::new(self.build_host()?);

        let app = RestExposure::build_router(host, custom_routes)?
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
            .layer(cors);

        Ok(app)
    }

    /// Serve the application with graceful shutdown
    ///
    /// Binds to `server.bind` from the config and stops on SIGTERM or Ctrl+C.
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.server.bind.clone();
        let app = self.build()?;
        let listener = TcpListener::bind(&addr).await?;

        info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// CORS restricted to the frontend origin when one is configured
fn cors_layer(frontend_url: Option<&str>) -> Result<CorsLayer> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    let Some(origin) = frontend_url else {
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any));
    };

    let origin = HeaderValue::from_str(origin.trim_end_matches('/'))
        .map_err(|e| anyhow!("invalid frontend_url '{}': {}", origin, e))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(methods)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true))
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
