//! Core types for weekend-weather

use crate::calendar::WeekendDates;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Unique identifier for a collection session
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Generate a fresh random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID
    pub fn get(&self) -> Uuid {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Session lifecycle status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Registered, orchestrator not started yet
    Created,
    /// Orchestrator is iterating the code list
    Running,
    /// Every code was processed (successfully or not)
    Completed,
    /// Halted early by a stop request
    Stopped,
    /// The orchestrator task died before finishing
    Failed,
}

impl SessionStatus {
    /// Whether the session has reached a final state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionStatus::Completed | SessionStatus::Stopped | SessionStatus::Failed
        )
    }

    /// Lowercase name, as used in JSON and error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Created => "created",
            SessionStatus::Running => "running",
            SessionStatus::Completed => "completed",
            SessionStatus::Stopped => "stopped",
            SessionStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where weather data comes from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Deterministic offline generator
    #[default]
    Synthetic,
    /// External weather API
    Live,
}

impl SourceKind {
    /// Label used in the CSV metadata block
    pub fn report_label(&self) -> &'static str {
        match self {
            SourceKind::Synthetic => "Sample Data",
            SourceKind::Live => "Live Weather Data",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Synthetic => f.write_str("synthetic"),
            SourceKind::Live => f.write_str("live"),
        }
    }
}

impl std::str::FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "synthetic" | "sample" => Ok(SourceKind::Synthetic),
            "live" => Ok(SourceKind::Live),
            other => Err(format!("unknown source mode: {other}")),
        }
    }
}

/// One day's reading: the date, high temperature and a condition description
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DayReading {
    /// Calendar date of the reading
    pub date: NaiveDate,
    /// Daily high in whole degrees Fahrenheit
    pub high_f: i32,
    /// Condition description (e.g. "Partly Cloudy")
    pub conditions: String,
}

/// Friday/Saturday/Sunday readings for one weekend
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WindowReadings {
    /// Friday reading
    pub friday: DayReading,
    /// Saturday reading
    pub saturday: DayReading,
    /// Sunday reading
    pub sunday: DayReading,
}

impl WindowReadings {
    /// The three readings in Friday, Saturday, Sunday order
    pub fn days(&self) -> [&DayReading; 3] {
        [&self.friday, &self.saturday, &self.sunday]
    }
}

/// Weather for one postal code across the three comparison weekends
///
/// Produced once per successfully processed code and never modified afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WeatherRecord {
    /// The postal code, verbatim from the request
    pub code: String,
    /// Resolved place name
    pub place: String,
    /// Resolved region (state abbreviation)
    pub region: String,
    /// Same weekend one year earlier
    pub last_year: WindowReadings,
    /// The upcoming weekend
    pub this_weekend: WindowReadings,
    /// The weekend after
    pub next_weekend: WindowReadings,
}

/// Structured progress events pushed to subscribers of a session
///
/// Serialized with a `type` discriminator, e.g. `{"type":"progress","current":0,"total":3,"code":"10001"}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// About to process `code`; `current` codes are already done
    Progress {
        /// Number of codes processed before this one
        current: usize,
        /// Total number of codes in the session
        total: usize,
        /// The code being processed
        code: String,
    },

    /// Processing `code` failed; the batch continues
    Error {
        /// The code that failed
        code: String,
        /// Human-readable failure description
        message: String,
    },

    /// Terminal event: every code was processed
    Completed {
        /// Summary line
        message: String,
        /// Number of codes that produced a record
        succeeded: usize,
        /// Number of codes that failed
        failed: usize,
    },

    /// Emitted to an idle subscriber so intermediaries keep the stream open
    Keepalive,
}

impl ProgressEvent {
    /// Whether this event ends the session's stream
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProgressEvent::Completed { .. })
    }
}

/// Read-only view of a session's state
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SessionSnapshot {
    /// Session ID
    pub id: SessionId,
    /// Current status
    pub status: SessionStatus,
    /// Data source used by the session
    pub source: SourceKind,
    /// Number of codes in the session
    pub total: usize,
    /// Codes processed so far (successes plus failures)
    pub processed: usize,
    /// Codes that failed
    pub errors: usize,
    /// Records collected
    pub results: usize,
    /// The nine dates every record of this session covers
    pub dates: WeekendDates,
    /// When the session was created
    pub created_at: DateTime<Utc>,
    /// When the orchestrator started
    pub started_at: Option<DateTime<Utc>>,
    /// When the session reached a final state
    pub finished_at: Option<DateTime<Utc>>,
}

/// The first few records of a session
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Preview {
    /// Up to the requested number of records, in input order
    pub data: Vec<WeatherRecord>,
    /// Number of records in `data`
    pub preview_count: usize,
    /// Number of records the session holds
    pub total_results: usize,
}

/// Request body for starting a session
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct StartSessionRequest {
    /// Explicit postal codes; takes precedence over `regions`
    #[serde(default)]
    pub codes: Vec<String>,

    /// Region identifiers (e.g. "CA") to expand into codes
    #[serde(default)]
    pub regions: Vec<String>,

    /// Weather API credential, required in live mode
    #[serde(default)]
    pub api_key: Option<String>,

    /// Data source; defaults to the configured mode
    #[serde(default)]
    pub mode: Option<SourceKind>,
}

/// Response to a successful session start
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct StartSessionResponse {
    /// Identifier to poll, stream and download with
    pub session_id: SessionId,
    /// Number of codes the session will process
    pub total: usize,
    /// Data source in use
    pub mode: SourceKind,
}
