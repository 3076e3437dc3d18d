//! Configuration types for weekend-weather

use crate::error::{Error, Result};
use crate::types::SourceKind;
use crate::source::UpstreamFault;
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::Path, time::Duration};

/// Main configuration for the weather collector
///
/// Fields are organized into logical sub-configs:
/// - [`source`](SourceConfig): where weather data comes from
/// - [`batch`](BatchConfig): session limits, progress stream, shutdown
/// - [`export`](ExportConfig): CSV report layout
/// - [`server`](ServerIntegrationConfig): REST API
///
/// Every field has a default, so an empty TOML file is a valid configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Weather data sources
    #[serde(default)]
    pub source: SourceConfig,

    /// Batch execution settings
    #[serde(default)]
    pub batch: BatchConfig,

    /// CSV export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// API and external server integration
    #[serde(default)]
    pub server: ServerIntegrationConfig,
}

impl Config {
    /// Load a configuration from a TOML file and validate it
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents).map_err(|e| Error::Config {
            message: format!("failed to parse {}: {}", path.display(), e),
            key: None,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the collector cannot run with
    pub fn validate(&self) -> Result<()> {
        if let Err(e) = url::Url::parse(&self.source.base_url) {
            return Err(invalid("source.base_url", format!("not a valid URL: {e}")));
        }
        if self.source.request_timeout.is_zero() {
            return Err(invalid(
                "source.request_timeout_ms",
                "request timeout must be greater than zero",
            ));
        }
        let synthetic = &self.source.synthetic;
        if synthetic.min_latency > synthetic.max_latency {
            return Err(invalid(
                "source.synthetic.min_latency_ms",
                "minimum latency exceeds maximum latency",
            ));
        }
        if self.batch.max_codes == 0 {
            return Err(invalid("batch.max_codes", "must allow at least one code"));
        }
        if self.batch.event_buffer == 0 {
            return Err(invalid("batch.event_buffer", "must be greater than zero"));
        }
        if self.batch.preview_limit == 0 {
            return Err(invalid("batch.preview_limit", "must be greater than zero"));
        }
        if !(1..=self.batch.max_codes).contains(&self.batch.codes_per_region) {
            return Err(invalid(
                "batch.codes_per_region",
                format!("must be between 1 and {}", self.batch.max_codes),
            ));
        }
        if self.batch.keepalive_interval.is_zero() {
            return Err(invalid(
                "batch.keepalive_interval_ms",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

fn invalid(key: &str, message: impl Into<String>) -> Error {
    Error::Config {
        message: message.into(),
        key: Some(key.to_string()),
    }
}

/// Weather data source configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Mode used when a request does not name one (default: synthetic)
    #[serde(default)]
    pub default_mode: SourceKind,

    /// Server-side weather API credential, used when a live request carries none
    #[serde(default)]
    pub api_key: Option<String>,

    /// Timeline endpoint of the weather API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Upper bound for one weather API call (default: 30s)
    #[serde(
        default = "default_request_timeout",
        rename = "request_timeout_ms",
        with = "duration_ms_serde"
    )]
    pub request_timeout: Duration,

    /// Pause between items of a live session (default: 1s)
    #[serde(
        default = "default_rate_delay",
        rename = "rate_delay_ms",
        with = "duration_ms_serde"
    )]
    pub rate_delay: Duration,

    /// Offline generator settings
    #[serde(default)]
    pub synthetic: SyntheticConfig,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            default_mode: SourceKind::default(),
            api_key: None,
            base_url: default_base_url(),
            request_timeout: default_request_timeout(),
            rate_delay: default_rate_delay(),
            synthetic: SyntheticConfig::default(),
        }
    }
}

/// Offline generator configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SyntheticConfig {
    /// Lower bound of the simulated per-call latency (default: 500ms)
    #[serde(
        default = "default_min_latency",
        rename = "min_latency_ms",
        with = "duration_ms_serde"
    )]
    pub min_latency: Duration,

    /// Upper bound of the simulated per-call latency (default: 1000ms)
    #[serde(
        default = "default_max_latency",
        rename = "max_latency_ms",
        with = "duration_ms_serde"
    )]
    pub max_latency: Duration,

    /// Codes that always fail, for demonstrations and drills
    #[serde(default)]
    pub fail_codes: Vec<FailCode>,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            min_latency: default_min_latency(),
            max_latency: default_max_latency(),
            fail_codes: Vec::new(),
        }
    }
}

/// A code the offline generator refuses, and how
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailCode {
    /// The postal code
    pub code: String,

    /// Failure to report (default: server_error)
    #[serde(default)]
    pub fault: UpstreamFault,
}

/// Batch execution configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Maximum number of codes per session (default: 10000)
    #[serde(default = "default_max_codes")]
    pub max_codes: usize,

    /// Idle time after which a subscriber receives a keepalive event (default: 15s)
    #[serde(
        default = "default_keepalive_interval",
        rename = "keepalive_interval_ms",
        with = "duration_ms_serde"
    )]
    pub keepalive_interval: Duration,

    /// Progress events buffered per session before slow subscribers lag (default: 256)
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,

    /// Maximum number of records a preview returns (default: 5)
    #[serde(default = "default_preview_limit")]
    pub preview_limit: usize,

    /// Codes generated per region when a request names regions (default: 100)
    #[serde(default = "default_codes_per_region")]
    pub codes_per_region: usize,

    /// How long shutdown waits for running sessions to settle (default: 30s)
    #[serde(
        default = "default_shutdown_timeout",
        rename = "shutdown_timeout_ms",
        with = "duration_ms_serde"
    )]
    pub shutdown_timeout: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_codes: default_max_codes(),
            keepalive_interval: default_keepalive_interval(),
            event_buffer: default_event_buffer(),
            preview_limit: default_preview_limit(),
            codes_per_region: default_codes_per_region(),
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

/// CSV export configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Write the title/date/source/count block above the header row (default: true)
    #[serde(default = "default_true")]
    pub include_metadata: bool,

    /// First line of the metadata block
    #[serde(default = "default_report_title")]
    pub report_title: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            include_metadata: true,
            report_title: default_report_title(),
        }
    }
}

/// API and external server integration configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ServerIntegrationConfig {
    /// REST API configuration
    #[serde(default)]
    pub api: ApiConfig,
}

/// REST API configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Address to bind to (default: 127.0.0.1:6790)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Optional key clients must send in the X-Api-Key header
    #[serde(default)]
    pub api_key: Option<String>,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Enable Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            api_key: None,
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_base_url() -> String {
    "https://weather.visualcrossing.com/VisualCrossingWebServices/rest/services/timeline".into()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_rate_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_min_latency() -> Duration {
    Duration::from_millis(500)
}

fn default_max_latency() -> Duration {
    Duration::from_millis(1000)
}

fn default_max_codes() -> usize {
    10_000
}

fn default_keepalive_interval() -> Duration {
    Duration::from_secs(15)
}

fn default_event_buffer() -> usize {
    256
}

fn default_preview_limit() -> usize {
    5
}

fn default_codes_per_region() -> usize {
    100
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_report_title() -> String {
    "Weekend Weather Comparison Report".into()
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 6790))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}

// Duration serialization helper (integer milliseconds)
mod duration_ms_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: Config = toml::from_str("").expect("empty config must parse");

        assert_eq!(config.source.default_mode, SourceKind::Synthetic);
        assert_eq!(config.source.rate_delay, Duration::from_secs(1));
        assert_eq!(config.source.synthetic.min_latency, Duration::from_millis(500));
        assert_eq!(config.source.synthetic.max_latency, Duration::from_millis(1000));
        assert_eq!(config.batch.max_codes, 10_000);
        assert_eq!(config.batch.preview_limit, 5);
        assert_eq!(config.batch.codes_per_region, 100);
        assert!(config.export.include_metadata);
        assert_eq!(config.export.report_title, "Weekend Weather Comparison Report");
        assert_eq!(
            config.server.api.bind_address,
            SocketAddr::from(([127, 0, 0, 1], 6790))
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn durations_are_milliseconds_in_toml() {
        let config: Config = toml::from_str(
            r#"
            [source]
            default_mode = "live"
            rate_delay_ms = 250

            [source.synthetic]
            min_latency_ms = 0
            max_latency_ms = 0
            fail_codes = [{ code = "00000", fault = "rate_limited" }]

            [batch]
            keepalive_interval_ms = 5000
            "#,
        )
        .unwrap();

        assert_eq!(config.source.default_mode, SourceKind::Live);
        assert_eq!(config.source.rate_delay, Duration::from_millis(250));
        assert_eq!(config.source.synthetic.max_latency, Duration::ZERO);
        assert_eq!(
            config.source.synthetic.fail_codes,
            vec![FailCode {
                code: "00000".into(),
                fault: UpstreamFault::RateLimited,
            }]
        );
        assert_eq!(config.batch.keepalive_interval, Duration::from_secs(5));
    }

    #[test]
    fn config_default_survives_json_round_trip() {
        let original = Config::default();

        let json = serde_json::to_value(&original).expect("Config must serialize to JSON");
        assert_eq!(json["source"]["rate_delay_ms"], 1000);
        assert_eq!(json["batch"]["shutdown_timeout_ms"], 30_000);

        let restored: Config =
            serde_json::from_value(json).expect("Config must deserialize from its own JSON");
        assert_eq!(restored.source.base_url, original.source.base_url);
        assert_eq!(restored.batch.keepalive_interval, original.batch.keepalive_interval);
        assert_eq!(
            restored.server.api.bind_address,
            original.server.api.bind_address
        );
    }

    #[test]
    fn validate_rejects_inverted_latency_range() {
        let mut config = Config::default();
        config.source.synthetic.min_latency = Duration::from_secs(2);
        config.source.synthetic.max_latency = Duration::from_secs(1);

        match config.validate() {
            Err(Error::Config { key, .. }) => {
                assert_eq!(key.as_deref(), Some("source.synthetic.min_latency_ms"))
            }
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_zero_limits_and_bad_url() {
        let mut config = Config::default();
        config.batch.preview_limit = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.batch.event_buffer = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.source.base_url = "not a url".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_bounds_codes_per_region_by_max_codes() {
        let mut config = Config::default();
        config.batch.codes_per_region = 0;
        assert!(matches!(
            config.validate(),
            Err(Error::Config { key: Some(ref k), .. }) if k == "batch.codes_per_region"
        ));

        let mut config = Config::default();
        config.batch.max_codes = 50;
        config.batch.codes_per_region = 51;
        assert!(config.validate().is_err());

        config.batch.codes_per_region = 50;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn from_file_reads_and_validates_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[batch]\npreview_limit = 10").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.batch.preview_limit, 10);

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        writeln!(bad, "[batch]\npreview_limit = 0").unwrap();
        assert!(matches!(
            Config::from_file(bad.path()),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn from_file_reports_parse_errors_as_config_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[batch\nmax_codes = ").unwrap();

        assert!(matches!(
            Config::from_file(file.path()),
            Err(Error::Config { key: None, .. })
        ));
    }
}
