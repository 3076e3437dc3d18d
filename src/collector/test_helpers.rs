//! Shared test helpers for creating WeatherCollector instances and scripted sources.

use crate::calendar::WeekendDates;
use crate::collector::WeatherCollector;
use crate::config::{Config, FailCode};
use crate::error::{Error, Result};
use crate::source::{UpstreamFault, WeatherSource, synthetic_record};
use crate::types::{SessionId, SessionSnapshot, SourceKind, WeatherRecord};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Configuration with an instant synthetic source and `00000` configured to fail
pub(crate) fn test_config() -> Config {
    let mut config = Config::default();
    config.source.synthetic.min_latency = Duration::ZERO;
    config.source.synthetic.max_latency = Duration::ZERO;
    config.source.synthetic.fail_codes = vec![FailCode {
        code: "00000".to_string(),
        fault: UpstreamFault::InvalidRequest,
    }];
    config.batch.shutdown_timeout = Duration::from_secs(5);
    config
}

/// Collector built from [`test_config`]
pub(crate) fn create_test_collector() -> WeatherCollector {
    WeatherCollector::new(test_config()).unwrap()
}

pub(crate) fn codes(list: &[&str]) -> Vec<String> {
    list.iter().map(|c| c.to_string()).collect()
}

/// Poll until the session reaches a final status
pub(crate) async fn wait_for_terminal(
    collector: &WeatherCollector,
    id: SessionId,
) -> SessionSnapshot {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let snapshot = collector.snapshot(id).await.unwrap();
            if snapshot.status.is_terminal() {
                return snapshot;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("session did not finish in time")
}

/// Synthetic source that fires a cancellation token while serving its Nth request
pub(crate) struct StopAfter {
    limit: usize,
    calls: AtomicUsize,
    token: OnceLock<CancellationToken>,
}

impl StopAfter {
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            limit,
            calls: AtomicUsize::new(0),
            token: OnceLock::new(),
        }
    }

    /// Token to cancel once the limit is reached
    pub(crate) fn arm(&self, token: CancellationToken) {
        self.token.set(token).ok();
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherSource for StopAfter {
    async fn fetch_window(&self, code: &str, dates: &WeekendDates) -> Result<WeatherRecord> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n == self.limit {
            if let Some(token) = self.token.get() {
                token.cancel();
            }
        }
        Ok(synthetic_record(code, dates))
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Synthetic
    }

    fn name(&self) -> &'static str {
        "stop-after"
    }
}

/// Source that records the (virtual) time of every call
#[derive(Default)]
pub(crate) struct RecordingSource {
    calls: Mutex<Vec<(String, tokio::time::Instant)>>,
}

impl RecordingSource {
    pub(crate) fn calls(&self) -> Vec<(String, tokio::time::Instant)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl WeatherSource for RecordingSource {
    async fn fetch_window(&self, code: &str, dates: &WeekendDates) -> Result<WeatherRecord> {
        self.calls
            .lock()
            .unwrap()
            .push((code.to_string(), tokio::time::Instant::now()));
        if code == "00000" {
            return Err(Error::Transport("connection reset".into()));
        }
        Ok(synthetic_record(code, dates))
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Live
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// Source whose first call panics
pub(crate) struct PanickingSource;

#[async_trait]
impl WeatherSource for PanickingSource {
    async fn fetch_window(&self, _code: &str, _dates: &WeekendDates) -> Result<WeatherRecord> {
        panic!("source exploded");
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Synthetic
    }

    fn name(&self) -> &'static str {
        "panicking"
    }
}
