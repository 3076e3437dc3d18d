//! Error types for weekend-weather
//!
//! This module provides the error handling for the library, including:
//! - Domain-specific error types (validation, sessions, upstream weather API)
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use crate::types::SessionId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for weekend-weather operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for weekend-weather
///
/// Per-item failures inside a batch ([`Error::Upstream`], [`Error::Transport`]) are
/// recorded on the session and never abort it. Everything else surfaces to the caller.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "batch.preview_limit")
        key: Option<String>,
    },

    /// Request rejected before any session was created
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Session lookup or state transition error
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// The weather API answered with a failure status
    #[error("weather API error: {0}")]
    Upstream(#[from] UpstreamError),

    /// Timeout or connection failure while talking to the weather API
    #[error("transport error: {0}")]
    Transport(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Shutdown in progress - not accepting new sessions
    #[error("shutdown in progress: not accepting new sessions")]
    ShuttingDown,

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Input validation errors, raised synchronously when a session is requested
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Neither codes nor regions were supplied, or they expanded to nothing
    #[error("no postal codes supplied")]
    EmptyCodeList,

    /// A code is not exactly five ASCII digits
    #[error("invalid postal code {code:?} at position {position}: expected exactly 5 digits")]
    InvalidCode {
        /// The offending input, verbatim
        code: String,
        /// Zero-based index of the code in the request
        position: usize,
    },

    /// More codes than a single session accepts
    #[error("too many postal codes: {count} supplied, at most {max} allowed")]
    TooManyCodes {
        /// Number of codes supplied
        count: usize,
        /// Configured maximum
        max: usize,
    },

    /// Live mode requested without a weather API credential
    #[error("an API key is required for live weather data")]
    MissingCredential,

    /// A region identifier the resolver does not know
    #[error("unknown region {region:?}")]
    UnknownRegion {
        /// The region identifier as supplied
        region: String,
    },

    /// A session identifier that is not a UUID
    #[error("invalid session id {id:?}")]
    InvalidSessionId {
        /// The identifier as supplied
        id: String,
    },
}

/// Session-related errors
#[derive(Debug, Error)]
pub enum SessionError {
    /// No session with this identifier
    #[error("session {id} not found")]
    NotFound {
        /// The session ID that was not found
        id: SessionId,
    },

    /// Cannot perform operation in current state
    #[error("cannot {operation} session {id} in state {current_state}")]
    InvalidState {
        /// The session ID that is in an invalid state for the operation
        id: SessionId,
        /// The operation that was attempted (e.g., "stop", "download")
        operation: String,
        /// The current state that prevents the operation (e.g., "running", "completed")
        current_state: String,
    },
}

/// Failure statuses reported by the weather API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// 401/403: the credential was rejected
    #[error("invalid API key")]
    InvalidCredential,

    /// 429: the account's rate limit was exceeded
    #[error("API rate limit exceeded")]
    RateLimited,

    /// 400: the API could not interpret the request (usually an unknown postal code)
    #[error("invalid postal code or request")]
    InvalidRequest,

    /// Any other non-success status
    #[error("unexpected status {status}")]
    ServerError {
        /// HTTP status returned by the API
        status: u16,
    },
}

/// API error response format
///
/// This structure is returned by API endpoints when an error occurs.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "invalid_code",
///     "message": "validation error: invalid postal code \"1234\" at position 0: expected exactly 5 digits",
///     "details": {
///       "code": "1234",
///       "position": 0
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "session_not_found", "invalid_code")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create an "internal server error"
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }

    /// Create an "unauthorized" error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("unauthorized", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::Config { .. } => 400,
            Error::Validation(_) => 400,

            // 404 Not Found
            Error::Session(SessionError::NotFound { .. }) => 404,

            // 409 Conflict - operation not valid in the session's state
            Error::Session(SessionError::InvalidState { .. }) => 409,

            // 500 Internal Server Error - Server-side issues
            Error::Io(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Serialization(_) => 500,
            Error::Other(_) => 500,

            // 502 Bad Gateway - External service errors
            Error::Upstream(_) => 502,
            Error::Transport(_) => 502,

            // 503 Service Unavailable
            Error::ShuttingDown => 503,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Validation(e) => match e {
                ValidationError::EmptyCodeList => "empty_code_list",
                ValidationError::InvalidCode { .. } => "invalid_code",
                ValidationError::TooManyCodes { .. } => "too_many_codes",
                ValidationError::MissingCredential => "missing_credential",
                ValidationError::UnknownRegion { .. } => "unknown_region",
                ValidationError::InvalidSessionId { .. } => "invalid_session_id",
            },
            Error::Session(e) => match e {
                SessionError::NotFound { .. } => "session_not_found",
                SessionError::InvalidState { .. } => "invalid_state",
            },
            Error::Upstream(e) => match e {
                UpstreamError::InvalidCredential => "upstream_invalid_credential",
                UpstreamError::RateLimited => "upstream_rate_limited",
                UpstreamError::InvalidRequest => "upstream_invalid_request",
                UpstreamError::ServerError { .. } => "upstream_server_error",
            },
            Error::Transport(_) => "transport_error",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::ShuttingDown => "shutting_down",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        // Add contextual details for specific error types
        let details = match &error {
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            Error::Validation(ValidationError::InvalidCode { code, position }) => {
                Some(serde_json::json!({
                    "code": code,
                    "position": position,
                }))
            }
            Error::Validation(ValidationError::TooManyCodes { count, max }) => {
                Some(serde_json::json!({
                    "count": count,
                    "max": max,
                }))
            }
            Error::Validation(ValidationError::UnknownRegion { region }) => {
                Some(serde_json::json!({
                    "region": region,
                }))
            }
            Error::Validation(ValidationError::InvalidSessionId { id }) => {
                Some(serde_json::json!({
                    "session_id": id,
                }))
            }
            Error::Session(SessionError::NotFound { id }) => Some(serde_json::json!({
                "session_id": id,
            })),
            Error::Session(SessionError::InvalidState {
                id,
                operation,
                current_state,
            }) => Some(serde_json::json!({
                "session_id": id,
                "operation": operation,
                "current_state": current_state,
            })),
            Error::Upstream(UpstreamError::ServerError { status }) => Some(serde_json::json!({
                "status": status,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
