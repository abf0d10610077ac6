//! Configuration loading and management
//!
//! ```yaml
//! server:
//!   bind: 0.0.0.0:7000
//!   frontend_url: http://localhost:5173
//! payments:
//!   currency: gbp
//!   secret_key: sk_test_...
//! storage:
//!   backend: mongodb
//!   uri: mongodb://localhost:27017
//!   database: haven
//! auth:
//!   user_header: x-user-id
//! ```
//!
//! Every field has a default, so an empty document is a valid config.

use crate::booking::DEFAULT_CURRENCY;
use crate::core::auth::DEFAULT_USER_HEADER;
use crate::core::error::ConfigError;
use serde::{Deserialize, Serialize};

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,

    /// Origin allowed by CORS; any origin when unset
    pub frontend_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:7000".to_string(),
            frontend_url: None,
        }
    }
}

/// Payment gateway settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentsConfig {
    pub currency: String,

    /// Base URL of a Stripe-compatible API
    pub api_base: Option<String>,

    /// Secret API key; the in-memory gateway is used when unset
    pub secret_key: Option<String>,
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            currency: DEFAULT_CURRENCY.to_string(),
            api_base: None,
            secret_key: None,
        }
    }
}

/// Which store backs the inventory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    InMemory,
    Mongodb,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub uri: Option<String>,
    pub database: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::InMemory,
            uri: None,
            database: "haven".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Header carrying the upstream-authenticated user id
    pub user_header: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            user_header: DEFAULT_USER_HEADER.to_string(),
        }
    }
}

/// Complete service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HavenConfig {
    pub server: ServerConfig,
    pub payments: PaymentsConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
}

impl HavenConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            message: format!("{}: {}", path, e),
        })?;

        serde_yaml::from_str::<Self>(&content)
            .map_err(|e| ConfigError::ParseError {
                file: Some(path.to_string()),
                message: e.to_string(),
            })?
            .validated()
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str::<Self>(yaml)
            .map_err(|e| ConfigError::ParseError {
                file: None,
                message: e.to_string(),
            })?
            .validated()
    }

    /// Apply `HAVEN_BIND`, `STRIPE_API_KEY`, `MONGODB_CONNECTION_STRING` and
    /// `FRONTEND_URL` from the process environment
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup; blank values are ignored
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(bind) = get("HAVEN_BIND") {
            self.server.bind = bind;
        }
        if let Some(key) = get("STRIPE_API_KEY") {
            self.payments.secret_key = Some(key);
        }
        if let Some(uri) = get("MONGODB_CONNECTION_STRING") {
            self.storage.uri = Some(uri);
            self.storage.backend = StorageBackend::Mongodb;
        }
        if let Some(url) = get("FRONTEND_URL") {
            self.server.frontend_url = Some(url);
        }
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        let currency = &self.payments.currency;
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ConfigError::InvalidValue {
                field: "payments.currency".to_string(),
                value: currency.clone(),
                message: "expected a three-letter ISO 4217 code".to_string(),
            });
        }

        if self.storage.backend == StorageBackend::Mongodb && self.storage.uri.is_none() {
            return Err(ConfigError::InvalidValue {
                field: "storage.uri".to_string(),
                value: String::new(),
                message: "required when storage.backend is mongodb".to_string(),
            });
        }

        if self.auth.user_header.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "auth.user_header".to_string(),
                value: self.auth.user_header.clone(),
                message: "must not be empty".to_string(),
            });
        }

        Ok(())
    }

    fn validated(self) -> Result<Self, ConfigError> {
        self.validate()?;
        Ok(self)
    }
}
