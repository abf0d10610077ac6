//! Request identity
//!
//! Session issuance lives outside this service. An upstream authenticator
//! resolves the caller and hands over a trusted user id; the booking engine
//! only ever consumes that id, it never derives identity itself.

use crate::core::error::RequestError;
use anyhow::Result;
use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderName};

/// Default header carrying the authenticated user id
pub const DEFAULT_USER_HEADER: &str = "x-user-id";

/// Authorization context extracted from a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthContext {
    /// Authenticated user
    User { user_id: String },

    /// No authentication (public access)
    Anonymous,
}

impl AuthContext {
    /// Get user_id if available
    pub fn user_id(&self) -> Option<&str> {
        match self {
            AuthContext::User { user_id } => Some(user_id),
            AuthContext::Anonymous => None,
        }
    }

    /// The authenticated user id, or `Unauthorized`
    pub fn require_user(&self) -> Result<&str, RequestError> {
        self.user_id().ok_or_else(|| RequestError::Unauthorized {
            message: "authentication required".to_string(),
        })
    }
}

/// Trait for auth providers
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Extract auth context from HTTP request headers
    async fn extract_context(&self, headers: &HeaderMap) -> Result<AuthContext>;
}

/// Trusts a header set by the upstream authenticator
///
/// Only deploy behind a proxy that strips this header from client traffic.
#[derive(Debug, Clone)]
pub struct HeaderAuthProvider {
    header: HeaderName,
}

impl HeaderAuthProvider {
    pub fn new(header: &str) -> Result<Self> {
        Ok(Self {
            header: HeaderName::try_from(header)?,
        })
    }
}

impl Default for HeaderAuthProvider {
    fn default() -> Self {
        Self {
            header: HeaderName::from_static(DEFAULT_USER_HEADER),
        }
    }
}

#[async_trait]
impl AuthProvider for HeaderAuthProvider {
    async fn extract_context(&self, headers: &HeaderMap) -> Result<AuthContext> {
        let user_id = headers
            .get(&self.header)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        Ok(match user_id {
            Some(user_id) => AuthContext::User {
                user_id: user_id.to_string(),
            },
            None => AuthContext::Anonymous,
        })
    }
}

/// Default no-auth provider (for development)
pub struct NoAuthProvider;

#[async_trait]
impl AuthProvider for NoAuthProvider {
    async fn extract_context(&self, _headers: &HeaderMap) -> Result<AuthContext> {
        Ok(AuthContext::Anonymous)
    }
}
