//! Common test utilities for weekend-weather integration tests

#![allow(dead_code)]

use std::time::Duration;
use weekend_weather::config::FailCode;
use weekend_weather::source::UpstreamFault;
use weekend_weather::{Config, ProgressEvent, ProgressSubscription, SessionId, WeatherCollector};

/// Outcome of following a session's progress stream to its end
#[derive(Debug, PartialEq)]
pub enum WaitResult {
    /// A `completed` event arrived
    Completed {
        /// Codes that produced a record
        succeeded: usize,
        /// Codes that failed
        failed: usize,
    },
    /// The stream ended without a `completed` event (stop or failure)
    Ended,
    /// Timeout waiting for the stream to end
    Timeout,
}

/// Configuration with an instant synthetic source where `00000` always fails
pub fn offline_config() -> Config {
    let mut config = Config::default();
    config.source.synthetic.min_latency = Duration::ZERO;
    config.source.synthetic.max_latency = Duration::ZERO;
    config.source.synthetic.fail_codes = vec![FailCode {
        code: "00000".to_string(),
        fault: UpstreamFault::ServerError,
    }];
    config
}

pub fn offline_collector() -> WeatherCollector {
    WeatherCollector::new(offline_config()).unwrap()
}

pub fn codes(list: &[&str]) -> Vec<String> {
    list.iter().map(|c| c.to_string()).collect()
}

/// Drain a subscription, keeping every non-keepalive event
pub async fn drain(
    mut subscription: ProgressSubscription,
    timeout: Duration,
) -> (WaitResult, Vec<ProgressEvent>) {
    let mut events = Vec::new();

    let result = tokio::time::timeout(timeout, async {
        while let Some(event) = subscription.next().await {
            match event {
                ProgressEvent::Keepalive => continue,
                ProgressEvent::Completed {
                    succeeded, failed, ..
                } => {
                    events.push(event);
                    return WaitResult::Completed { succeeded, failed };
                }
                other => events.push(other),
            }
        }
        WaitResult::Ended
    })
    .await;

    (result.unwrap_or(WaitResult::Timeout), events)
}

/// Poll a session until it reaches a final status
pub async fn wait_until_finished(collector: &WeatherCollector, id: SessionId) {
    tokio::time::timeout(Duration::from_secs(10), async {
        while !collector.snapshot(id).await.unwrap().status.is_terminal() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
}
