//! Collection sessions and the process-wide session registry

use crate::calendar::WeekendDates;
use crate::error::{Result, SessionError};
use crate::progress::ProgressChannel;
use crate::types::{
    Preview, SessionId, SessionSnapshot, SessionStatus, SourceKind, WeatherRecord,
};
use crate::validation::validate_codes;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// Mutable part of a session, always changed under one lock
///
/// Invariant: `processed_count == results.len() + error_count`.
#[derive(Debug)]
struct SessionState {
    status: SessionStatus,
    processed_count: usize,
    error_count: usize,
    results: Vec<WeatherRecord>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

/// One batch collection request and everything it has produced so far
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    codes: Vec<String>,
    dates: WeekendDates,
    source: SourceKind,
    created_at: DateTime<Utc>,
    state: RwLock<SessionState>,
    progress: ProgressChannel,
    cancel: CancellationToken,
}

impl Session {
    /// Create a session in [`SessionStatus::Created`]
    ///
    /// Codes are taken as-is; [`SessionStore::create`] validates them first.
    pub fn new(
        codes: Vec<String>,
        dates: WeekendDates,
        source: SourceKind,
        event_buffer: usize,
    ) -> Self {
        Self {
            id: SessionId::new(),
            codes,
            dates,
            source,
            created_at: Utc::now(),
            state: RwLock::new(SessionState {
                status: SessionStatus::Created,
                processed_count: 0,
                error_count: 0,
                results: Vec::new(),
                started_at: None,
                finished_at: None,
            }),
            progress: ProgressChannel::new(event_buffer),
            cancel: CancellationToken::new(),
        }
    }

    /// Session ID
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Input codes in request order
    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    /// Number of input codes
    pub fn total(&self) -> usize {
        self.codes.len()
    }

    /// Dates shared by every record of this session
    pub fn dates(&self) -> &WeekendDates {
        &self.dates
    }

    /// Data source kind
    pub fn source(&self) -> SourceKind {
        self.source
    }

    /// Progress channel
    pub fn progress(&self) -> &ProgressChannel {
        &self.progress
    }

    /// Cancellation token observed by the orchestrator between items
    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Current status
    pub async fn status(&self) -> SessionStatus {
        self.state.read().await.status
    }

    /// Move from Created to Running; false if the session already left Created
    pub async fn begin(&self) -> bool {
        let mut state = self.state.write().await;
        if state.status != SessionStatus::Created {
            return false;
        }
        state.status = SessionStatus::Running;
        state.started_at = Some(Utc::now());
        true
    }

    /// Append a record; returns the new processed count
    pub async fn record_success(&self, record: WeatherRecord) -> usize {
        let mut state = self.state.write().await;
        state.results.push(record);
        state.processed_count += 1;
        state.processed_count
    }

    /// Count a failed item; returns the new processed count
    pub async fn record_failure(&self) -> usize {
        let mut state = self.state.write().await;
        state.error_count += 1;
        state.processed_count += 1;
        state.processed_count
    }

    /// Enter a final status; no-op if the session is already final
    pub async fn finish(&self, status: SessionStatus) -> bool {
        let mut state = self.state.write().await;
        if state.status.is_terminal() {
            return false;
        }
        state.status = status;
        state.finished_at = Some(Utc::now());
        true
    }

    /// Read-only view of the current state
    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read().await;
        SessionSnapshot {
            id: self.id,
            status: state.status,
            source: self.source,
            total: self.codes.len(),
            processed: state.processed_count,
            errors: state.error_count,
            results: state.results.len(),
            dates: self.dates,
            created_at: self.created_at,
            started_at: state.started_at,
            finished_at: state.finished_at,
        }
    }

    /// The first `limit` records, in input order
    pub async fn preview(&self, limit: usize) -> Preview {
        let state = self.state.read().await;
        let data: Vec<WeatherRecord> = state.results.iter().take(limit).cloned().collect();
        Preview {
            preview_count: data.len(),
            total_results: state.results.len(),
            data,
        }
    }

    /// Copy of every record collected so far
    pub async fn results(&self) -> Vec<WeatherRecord> {
        self.state.read().await.results.clone()
    }

    /// Creation timestamp
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Registry of every session created by this process
///
/// Sessions are never evicted; they live as long as the store.
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, Arc<Session>>>,
    max_codes: usize,
    event_buffer: usize,
}

impl SessionStore {
    /// Create an empty store
    pub fn new(max_codes: usize, event_buffer: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_codes,
            event_buffer,
        }
    }

    /// Validate `codes` and register a new session for them
    ///
    /// # Errors
    ///
    /// Returns a validation error, and registers nothing, if the list is empty, too long,
    /// or contains a code that is not exactly five digits.
    pub async fn create(
        &self,
        codes: Vec<String>,
        dates: WeekendDates,
        source: SourceKind,
    ) -> Result<Arc<Session>> {
        validate_codes(&codes, self.max_codes)?;

        let session = Arc::new(Session::new(codes, dates, source, self.event_buffer));
        self.sessions
            .write()
            .await
            .insert(session.id(), Arc::clone(&session));

        tracing::info!(
            session_id = %session.id(),
            codes = session.total(),
            source = %source,
            "Session created"
        );
        Ok(session)
    }

    /// Look up a session
    pub async fn get(&self, id: SessionId) -> Result<Arc<Session>> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound { id }.into())
    }

    /// Every session, oldest first
    pub async fn list(&self) -> Vec<Arc<Session>> {
        let mut sessions: Vec<Arc<Session>> =
            self.sessions.read().await.values().cloned().collect();
        sessions.sort_by_key(|s| s.created_at());
        sessions
    }

    /// Number of sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Whether the store holds no sessions
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
