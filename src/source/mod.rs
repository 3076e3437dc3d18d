//! Weather data sources
//!
//! A [`WeatherSource`] turns one postal code and a session's [`WeekendDates`] into a
//! [`WeatherRecord`]. Two implementations ship with the crate:
//!
//! - [`SyntheticSource`]: deterministic offline generator, seeded by the code
//! - [`LiveSource`]: Visual Crossing timeline API over HTTP

use crate::calendar::WeekendDates;
use crate::error::{Result, UpstreamError};
use crate::types::{SourceKind, WeatherRecord};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

mod live;
mod synthetic;

pub use live::LiveSource;
pub use synthetic::{SyntheticSource, generate as synthetic_record, place_for};

/// Trait for anything that can produce a weekend weather record for a postal code
///
/// Implementations must be safe to share between sessions; the orchestrator calls
/// [`fetch_window`](WeatherSource::fetch_window) once per code, sequentially.
///
/// # Errors
///
/// Failures are typed: [`Error::Upstream`](crate::Error::Upstream) when the data
/// provider rejects the request, [`Error::Transport`](crate::Error::Transport) when it
/// cannot be reached in time. The orchestrator records either against the item and
/// moves on.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Fetch the nine readings for `code`
    async fn fetch_window(&self, code: &str, dates: &WeekendDates) -> Result<WeatherRecord>;

    /// Which kind of data this source produces
    fn kind(&self) -> SourceKind;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}

/// Configurable failure for the offline generator, mirroring [`UpstreamError`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpstreamFault {
    /// Report a rejected credential
    InvalidCredential,
    /// Report an exceeded rate limit
    RateLimited,
    /// Report an unintelligible request
    InvalidRequest,
    /// Report a 500 from the provider
    #[default]
    ServerError,
}

impl From<UpstreamFault> for UpstreamError {
    fn from(fault: UpstreamFault) -> Self {
        match fault {
            UpstreamFault::InvalidCredential => UpstreamError::InvalidCredential,
            UpstreamFault::RateLimited => UpstreamError::RateLimited,
            UpstreamFault::InvalidRequest => UpstreamError::InvalidRequest,
            UpstreamFault::ServerError => UpstreamError::ServerError { status: 500 },
        }
    }
}
