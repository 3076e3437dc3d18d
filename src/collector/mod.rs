//! Weather collector: the library facade over sessions, sources and exports.
//!
//! The `WeatherCollector` struct and its methods are organized by domain:
//! - [`orchestrator`] - Sequential, rate-limited execution of one session
//! - [`control`] - Stopping sessions
//! - [`lifecycle`] - Graceful shutdown
//! - [`reports`] - Previews and CSV exports

pub mod orchestrator;

mod control;
mod lifecycle;
mod reports;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

pub use reports::CsvReport;

use crate::calendar::WeekendDates;
use crate::config::Config;
use crate::error::{Error, Result, ValidationError};
use crate::progress::ProgressSubscription;
use crate::regions::{RangeRegionResolver, RegionResolver};
use crate::session::{Session, SessionStore};
use crate::source::{LiveSource, SyntheticSource, WeatherSource};
use crate::types::{SessionId, SessionSnapshot, SessionStatus, SourceKind, StartSessionRequest};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Main collector instance (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct WeatherCollector {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Registry of every session created by this collector
    pub(crate) store: Arc<SessionStore>,
    /// Region expansion for requests that name regions instead of codes
    pub(crate) regions: Arc<dyn RegionResolver>,
    /// Shared HTTP client for live sources (connection pooling, request timeout)
    pub(crate) http: reqwest::Client,
    /// Flag to indicate whether new sessions are accepted (set to false during shutdown)
    pub(crate) accepting_new: Arc<AtomicBool>,
}

/// A registered session whose orchestrator has not been started yet
///
/// Returned by [`WeatherCollector::prepare`] so callers can subscribe to progress before
/// the first event is emitted, then handed to [`WeatherCollector::launch`].
pub struct PendingSession {
    session: Arc<Session>,
    source: Arc<dyn WeatherSource>,
    rate_delay: Duration,
}

impl PendingSession {
    /// The registered session
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Pause the orchestrator will take between items
    pub fn rate_delay(&self) -> Duration {
        self.rate_delay
    }
}

impl WeatherCollector {
    /// Create a collector from a configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration fails validation, or if the HTTP
    /// client cannot be built.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(config.source.request_timeout)
            .user_agent(concat!("weekend-weather/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        let regions: Arc<dyn RegionResolver> =
            Arc::new(RangeRegionResolver::new(config.batch.codes_per_region));
        let store = Arc::new(SessionStore::new(
            config.batch.max_codes,
            config.batch.event_buffer,
        ));

        Ok(Self {
            config: Arc::new(config),
            store,
            regions,
            http,
            accepting_new: Arc::new(AtomicBool::new(true)),
        })
    }

    /// Replace the region resolver
    pub fn with_region_resolver(mut self, regions: Arc<dyn RegionResolver>) -> Self {
        self.regions = regions;
        self
    }

    /// Configuration in use
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Validate a start request and register its session without starting it
    ///
    /// Explicit codes win over regions. The mode defaults to `source.default_mode`; live
    /// mode needs a credential from the request or from `source.api_key`.
    ///
    /// # Errors
    ///
    /// - [`Error::ShuttingDown`] once [`shutdown`](Self::shutdown) has begun
    /// - [`Error::Validation`] for missing credentials, unknown regions and bad codes;
    ///   no session is registered in that case
    pub async fn prepare(&self, request: StartSessionRequest) -> Result<PendingSession> {
        self.ensure_accepting()?;

        let mode = request.mode.unwrap_or(self.config.source.default_mode);
        let source = self.source_for(mode, request.api_key.as_deref())?;
        let codes = self.resolve_codes(&request)?;
        let rate_delay = match mode {
            SourceKind::Live => self.config.source.rate_delay,
            SourceKind::Synthetic => Duration::ZERO,
        };

        self.prepare_with_source(codes, source, rate_delay).await
    }

    /// Register a session that will run against a caller-supplied source
    pub async fn prepare_with_source(
        &self,
        codes: Vec<String>,
        source: Arc<dyn WeatherSource>,
        rate_delay: Duration,
    ) -> Result<PendingSession> {
        self.ensure_accepting()?;

        let session = self
            .store
            .create(codes, WeekendDates::current(), source.kind())
            .await?;

        Ok(PendingSession {
            session,
            source,
            rate_delay,
        })
    }

    /// Start the orchestrator for a prepared session on its own task
    ///
    /// If the task dies before finishing, the session is marked
    /// [`SessionStatus::Failed`] and its progress channel is closed.
    pub fn launch(&self, pending: PendingSession) -> Arc<Session> {
        let PendingSession {
            session,
            source,
            rate_delay,
        } = pending;

        tracing::info!(
            session_id = %session.id(),
            source = source.name(),
            rate_delay_ms = rate_delay.as_millis() as u64,
            "Launching session"
        );

        let handle = tokio::spawn(orchestrator::run_batch(
            Arc::clone(&session),
            source,
            rate_delay,
        ));

        let supervised = Arc::clone(&session);
        tokio::spawn(async move {
            if let Err(e) = handle.await {
                tracing::error!(
                    session_id = %supervised.id(),
                    error = %e,
                    "Session task ended abnormally"
                );
                supervised.finish(SessionStatus::Failed).await;
                supervised.progress().close().await;
            }
        });

        session
    }

    /// Validate, register and start a session in one step
    pub async fn submit(&self, request: StartSessionRequest) -> Result<Arc<Session>> {
        let pending = self.prepare(request).await?;
        Ok(self.launch(pending))
    }

    /// Look up a session
    pub async fn session(&self, id: SessionId) -> Result<Arc<Session>> {
        self.store.get(id).await
    }

    /// Snapshot of one session
    pub async fn snapshot(&self, id: SessionId) -> Result<SessionSnapshot> {
        Ok(self.store.get(id).await?.snapshot().await)
    }

    /// Snapshots of every session, oldest first
    pub async fn list_sessions(&self) -> Vec<SessionSnapshot> {
        let sessions = self.store.list().await;
        let mut snapshots = Vec::with_capacity(sessions.len());
        for session in sessions {
            snapshots.push(session.snapshot().await);
        }
        snapshots
    }

    /// Subscribe to a session's progress events
    pub async fn subscribe(&self, id: SessionId) -> Result<ProgressSubscription> {
        let session = self.store.get(id).await?;
        Ok(session
            .progress()
            .subscribe(self.config.batch.keepalive_interval)
            .await)
    }

    fn ensure_accepting(&self) -> Result<()> {
        if self.accepting_new.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::ShuttingDown)
        }
    }

    fn source_for(&self, mode: SourceKind, api_key: Option<&str>) -> Result<Arc<dyn WeatherSource>> {
        match mode {
            SourceKind::Synthetic => Ok(Arc::new(SyntheticSource::from_config(
                &self.config.source.synthetic,
            ))),
            SourceKind::Live => {
                let key = api_key
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .or(self.config.source.api_key.as_deref())
                    .ok_or(ValidationError::MissingCredential)?;
                Ok(Arc::new(LiveSource::new(
                    self.http.clone(),
                    self.config.source.base_url.clone(),
                    key,
                )))
            }
        }
    }

    fn resolve_codes(&self, request: &StartSessionRequest) -> Result<Vec<String>> {
        if !request.codes.is_empty() {
            return Ok(request.codes.clone());
        }

        let mut codes = Vec::new();
        for region in &request.regions {
            let expanded =
                self.regions
                    .resolve(region)
                    .ok_or_else(|| ValidationError::UnknownRegion {
                        region: region.clone(),
                    })?;
            codes.extend(expanded);
        }
        Ok(codes)
    }
}
