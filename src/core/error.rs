//! Typed error handling for the haven booking service
//!
//! Every failure the search and booking paths can produce maps onto one of a
//! handful of categories, so that callers can render an appropriate message
//! and decide on retry without parsing strings.
//!
//! # Error Categories
//!
//! - [`ValidationError`]: malformed or missing input (client error)
//! - [`LodgingError`]: lodging record lookups (client error)
//! - [`PaymentError`]: authorization lookup, verification gate and upstream
//!   gateway failures
//! - [`StorageError`]: persistence failures (server error)
//! - [`ConfigError`]: configuration parsing
//! - [`RequestError`]: authentication and request-shape problems
//!
//! # Example
//!
//! ```rust,ignore
//! match engine.commit_booking(hotel_id, request, &user_id).await {
//!     Ok(receipt) => println!("booked {}", receipt.booking_id),
//!     Err(HavenError::Payment(PaymentError::NotCompleted { status })) => {
//!         println!("payment still {}", status);
//!     }
//!     Err(e) => eprintln!("booking failed: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// The main error type for the haven service
#[derive(Debug)]
pub enum HavenError {
    /// Input validation errors
    Validation(ValidationError),

    /// Lodging lookups
    Lodging(LodgingError),

    /// Payment authorization and gateway errors
    Payment(PaymentError),

    /// Storage backend errors
    Storage(StorageError),

    /// Configuration errors
    Config(ConfigError),

    /// HTTP/Request errors
    Request(RequestError),

    /// Internal errors (should not happen in normal operation)
    Internal(String),
}

impl fmt::Display for HavenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HavenError::Validation(e) => write!(f, "{}", e),
            HavenError::Lodging(e) => write!(f, "{}", e),
            HavenError::Payment(e) => write!(f, "{}", e),
            HavenError::Storage(e) => write!(f, "{}", e),
            HavenError::Config(e) => write!(f, "{}", e),
            HavenError::Request(e) => write!(f, "{}", e),
            HavenError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for HavenError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HavenError::Validation(e) => Some(e),
            HavenError::Lodging(e) => Some(e),
            HavenError::Payment(e) => Some(e),
            HavenError::Storage(e) => Some(e),
            HavenError::Config(e) => Some(e),
            HavenError::Request(e) => Some(e),
            HavenError::Internal(_) => None,
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl HavenError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            HavenError::Validation(_) => StatusCode::BAD_REQUEST,
            HavenError::Lodging(e) => e.status_code(),
            HavenError::Payment(e) => e.status_code(),
            HavenError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HavenError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HavenError::Request(e) => e.status_code(),
            HavenError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            HavenError::Validation(_) => "VALIDATION_ERROR",
            HavenError::Lodging(e) => e.error_code(),
            HavenError::Payment(e) => e.error_code(),
            HavenError::Storage(_) => "STORAGE_ERROR",
            HavenError::Config(_) => "CONFIG_ERROR",
            HavenError::Request(e) => e.error_code(),
            HavenError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the caller may safely retry the failed operation as-is
    ///
    /// Only a gateway failure during authorization creation qualifies; a
    /// commit whose outcome is unknown must never be replayed blindly.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            HavenError::Payment(PaymentError::Gateway {
                operation: GatewayOperation::Create,
                ..
            })
        )
    }

    /// Convert to an error response
    ///
    /// Server-side failures are reported generically; the underlying cause
    /// is logged where it happens and never sent to the client.
    pub fn to_response(&self) -> ErrorResponse {
        let message = match self {
            HavenError::Storage(_) | HavenError::Internal(_) | HavenError::Config(_) => {
                "Something went wrong".to_string()
            }
            HavenError::Payment(PaymentError::Gateway { operation, .. }) => {
                format!("Failed to {} payment intent", operation)
            }
            other => other.to_string(),
        };

        ErrorResponse {
            code: self.error_code().to_string(),
            message,
            details: self.details(),
        }
    }

    /// Get additional details for the error
    fn details(&self) -> Option<serde_json::Value> {
        match self {
            HavenError::Lodging(LodgingError::NotFound { id }) => {
                Some(serde_json::json!({ "hotel_id": id.to_string() }))
            }
            HavenError::Payment(PaymentError::NotCompleted { status }) => {
                Some(serde_json::json!({ "status": status }))
            }
            HavenError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for HavenError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug)]
pub enum ValidationError {
    /// Single field validation error
    FieldError { field: String, message: String },

    /// Multiple field validation errors
    FieldErrors(Vec<FieldValidationError>),

    /// Missing required field
    MissingField { field: String },

    /// Invalid JSON format
    InvalidJson { message: String },

    /// Invalid UUID format
    InvalidUuid { value: String },
}

/// A single field validation error
#[derive(Debug, Clone, Serialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    /// Shorthand for a single-field error
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::FieldError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::FieldError { field, message } => {
                write!(f, "Validation error for field '{}': {}", field, message)
            }
            ValidationError::FieldErrors(errors) => {
                let msgs: Vec<String> = errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect();
                write!(f, "Validation errors: {}", msgs.join(", "))
            }
            ValidationError::MissingField { field } => {
                write!(f, "Missing required field: {}", field)
            }
            ValidationError::InvalidJson { message } => {
                write!(f, "Invalid JSON: {}", message)
            }
            ValidationError::InvalidUuid { value } => {
                write!(f, "Invalid UUID format: {}", value)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for HavenError {
    fn from(err: ValidationError) -> Self {
        HavenError::Validation(err)
    }
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldValidationError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldValidationError {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        ValidationError::FieldErrors(fields)
    }
}

impl From<validator::ValidationErrors> for HavenError {
    fn from(errors: validator::ValidationErrors) -> Self {
        HavenError::Validation(errors.into())
    }
}

// =============================================================================
// Lodging Errors
// =============================================================================

/// Errors related to lodging records
#[derive(Debug)]
pub enum LodgingError {
    /// Lodging record was not found
    NotFound { id: Uuid },
}

impl fmt::Display for LodgingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LodgingError::NotFound { id } => write!(f, "Hotel '{}' not found", id),
        }
    }
}

impl std::error::Error for LodgingError {}

impl LodgingError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            LodgingError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            LodgingError::NotFound { .. } => "HOTEL_NOT_FOUND",
        }
    }
}

impl From<LodgingError> for HavenError {
    fn from(err: LodgingError) -> Self {
        HavenError::Lodging(err)
    }
}

// =============================================================================
// Payment Errors
// =============================================================================

/// Which gateway call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayOperation {
    Create,
    Retrieve,
}

impl fmt::Display for GatewayOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayOperation::Create => write!(f, "create"),
            GatewayOperation::Retrieve => write!(f, "retrieve"),
        }
    }
}

/// Errors related to payment authorizations
#[derive(Debug)]
pub enum PaymentError {
    /// The gateway has no record of the authorization
    NotFound { id: String },

    /// Authorization metadata does not match the lodging or the requester
    Mismatch,

    /// Authorization exists but has not reached the success state
    NotCompleted { status: String },

    /// The upstream gateway failed or returned an unusable response
    Gateway {
        operation: GatewayOperation,
        message: String,
    },
}

impl fmt::Display for PaymentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentError::NotFound { id } => write!(f, "Payment intent '{}' not found", id),
            PaymentError::Mismatch => write!(f, "Payment intent mismatch"),
            PaymentError::NotCompleted { status } => {
                write!(f, "Payment not succeeded. Status: {}", status)
            }
            PaymentError::Gateway { operation, message } => {
                write!(f, "Payment gateway {} failed: {}", operation, message)
            }
        }
    }
}

impl std::error::Error for PaymentError {}

impl PaymentError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PaymentError::NotFound { .. } => StatusCode::NOT_FOUND,
            PaymentError::Mismatch => StatusCode::BAD_REQUEST,
            PaymentError::NotCompleted { .. } => StatusCode::BAD_REQUEST,
            PaymentError::Gateway { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            PaymentError::NotFound { .. } => "PAYMENT_INTENT_NOT_FOUND",
            PaymentError::Mismatch => "PAYMENT_INTENT_MISMATCH",
            PaymentError::NotCompleted { .. } => "PAYMENT_NOT_COMPLETED",
            PaymentError::Gateway { .. } => "PAYMENT_GATEWAY_ERROR",
        }
    }
}

impl From<PaymentError> for HavenError {
    fn from(err: PaymentError) -> Self {
        HavenError::Payment(err)
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to storage backends
#[derive(Debug)]
pub enum StorageError {
    /// Connection error
    ConnectionError { backend: String, message: String },

    /// Query or write execution error
    QueryError { backend: String, message: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::ConnectionError { backend, message } => {
                write!(f, "Failed to connect to {}: {}", backend, message)
            }
            StorageError::QueryError { backend, message } => {
                write!(f, "{} query error: {}", backend, message)
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl From<StorageError> for HavenError {
    fn from(err: StorageError) -> Self {
        HavenError::Storage(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse configuration file
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Invalid value in configuration
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// IO error while reading configuration
    IoError { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse config file '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::InvalidValue {
                field,
                value,
                message,
            } => {
                write!(
                    f,
                    "Invalid value '{}' for field '{}': {}",
                    value, field, message
                )
            }
            ConfigError::IoError { message } => {
                write!(f, "IO error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for HavenError {
    fn from(err: ConfigError) -> Self {
        HavenError::Config(err)
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to HTTP requests
#[derive(Debug)]
pub enum RequestError {
    /// Invalid request body
    InvalidBody { message: String },

    /// Invalid query string
    InvalidQuery { message: String },

    /// Request carries no trusted identity
    Unauthorized { message: String },
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::InvalidBody { message } => {
                write!(f, "Invalid request body: {}", message)
            }
            RequestError::InvalidQuery { message } => {
                write!(f, "Invalid query string: {}", message)
            }
            RequestError::Unauthorized { message } => {
                write!(f, "Unauthorized: {}", message)
            }
        }
    }
}

impl std::error::Error for RequestError {}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::InvalidBody { .. } => StatusCode::BAD_REQUEST,
            RequestError::InvalidQuery { .. } => StatusCode::BAD_REQUEST,
            RequestError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::InvalidBody { .. } => "INVALID_BODY",
            RequestError::InvalidQuery { .. } => "INVALID_QUERY",
            RequestError::Unauthorized { .. } => "UNAUTHORIZED",
        }
    }
}

impl From<RequestError> for HavenError {
    fn from(err: RequestError) -> Self {
        HavenError::Request(err)
    }
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for HavenError {
    fn from(err: serde_json::Error) -> Self {
        HavenError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

impl From<std::io::Error> for HavenError {
    fn from(err: std::io::Error) -> Self {
        HavenError::Config(ConfigError::IoError {
            message: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for HavenError {
    fn from(err: serde_yaml::Error) -> Self {
        HavenError::Config(ConfigError::ParseError {
            file: None,
            message: err.to_string(),
        })
    }
}

impl From<uuid::Error> for HavenError {
    fn from(err: uuid::Error) -> Self {
        HavenError::Validation(ValidationError::InvalidUuid {
            value: err.to_string(),
        })
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for haven operations
pub type HavenResult<T> = Result<T, HavenError>;

// =============================================================================
// Tests
// =============================================================================
