//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`sessions`] - Starting, inspecting, streaming, stopping and downloading sessions
//! - [`system`] - Health and OpenAPI

use crate::error::{Error, ValidationError};
use crate::types::SessionId;
use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use serde::{Deserialize, Serialize};

mod sessions;
mod system;

// Re-export all handlers so `routes::function_name` works
pub use sessions::*;
pub use system::*;

/// Query parameters for GET /sessions/:id/preview
#[derive(Debug, Default, Deserialize, Serialize, utoipa::IntoParams, utoipa::ToSchema)]
#[into_params(parameter_in = Query)]
pub struct PreviewQuery {
    /// Number of records to return, clamped to the configured preview limit
    pub limit: Option<usize>,
}

/// Session id taken from the `:id` path segment
///
/// Malformed ids are rejected with the JSON error body used by every other failure.
pub struct SessionPath(pub SessionId);

#[async_trait]
impl<S> FromRequestParts<S> for SessionPath
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| Error::Other(e.body_text()))?;

        raw.parse()
            .map(SessionPath)
            .map_err(|_| Error::Validation(ValidationError::InvalidSessionId { id: raw }))
    }
}
