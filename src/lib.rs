//! # weekend-weather
//!
//! Batch collector for weekend weather comparisons.
//!
//! Given a list of five-digit postal codes (or region identifiers that expand to
//! codes), a session collects nine daily readings per code: Friday to Sunday of last
//! year's matching weekend, this weekend and next weekend. Sessions run in the
//! background, one code at a time, and publish progress to any number of subscribers.
//! Finished sessions export a CSV report.
//!
//! ## Design Philosophy
//!
//! - **Library-first** - The HTTP API and the binary are thin layers over [`WeatherCollector`]
//! - **Pluggable sources** - Anything implementing [`WeatherSource`] can feed a session
//! - **Isolated sessions** - Each session has its own state, progress channel and stop signal
//! - **Partial failure** - One failing code never aborts a batch
//!
//! ## Quick Start
//!
//! ```no_run
//! use weekend_weather::{Config, StartSessionRequest, WeatherCollector};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let collector = WeatherCollector::new(Config::default())?;
//!
//!     let pending = collector
//!         .prepare(StartSessionRequest {
//!             codes: vec!["10001".into(), "90210".into()],
//!             ..Default::default()
//!         })
//!         .await?;
//!     let id = pending.session().id();
//!
//!     // Subscribe before launching to see every event
//!     let mut progress = collector.subscribe(id).await?;
//!     collector.launch(pending);
//!     while let Some(event) = progress.next().await {
//!         println!("Event: {:?}", event);
//!     }
//!
//!     let report = collector.export_csv(id).await?;
//!     std::fs::write(&report.filename, &report.content)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Weekend date arithmetic
pub mod calendar;
/// Session orchestration (decomposed into focused submodules)
pub mod collector;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// CSV report export
pub mod export;
/// Per-session progress broadcast
pub mod progress;
/// Region to postal code expansion
pub mod regions;
/// Sessions and the session registry
pub mod session;
/// Weather data sources
pub mod source;
/// Core types and events
pub mod types;
/// Postal code validation
pub mod validation;

// Re-export commonly used types
pub use calendar::{WeekendDates, WeekendWindow};
pub use collector::{CsvReport, PendingSession, WeatherCollector};
pub use config::Config;
pub use error::{
    ApiError, Error, ErrorDetail, Result, SessionError, ToHttpStatus, UpstreamError,
    ValidationError,
};
pub use export::{CsvExporter, ReportMetadata};
pub use progress::{ProgressChannel, ProgressSubscription};
pub use regions::{RangeRegionResolver, RegionResolver};
pub use session::{Session, SessionStore};
pub use source::{LiveSource, SyntheticSource, WeatherSource};
pub use types::{
    DayReading, Preview, ProgressEvent, SessionId, SessionSnapshot, SessionStatus, SourceKind,
    StartSessionRequest, StartSessionResponse, WeatherRecord, WindowReadings,
};

/// Helper function to run the collector with graceful signal handling.
///
/// Waits for a termination signal and then calls the collector's `shutdown()` method.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use weekend_weather::{Config, WeatherCollector, run_with_shutdown};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let collector = WeatherCollector::new(Config::default())?;
///
///     // Run with automatic signal handling
///     run_with_shutdown(collector).await;
///
///     Ok(())
/// }
/// ```
pub async fn run_with_shutdown(collector: WeatherCollector) {
    wait_for_signal().await;
    collector.shutdown().await
}

/// Resolve once the process receives a termination signal
#[cfg(unix)]
pub async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

/// Resolve once the process receives Ctrl+C
#[cfg(not(unix))]
pub async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
