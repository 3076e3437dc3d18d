//! Application state for the API server

use crate::{Config, WeatherCollector};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// This struct is cloned for each request (cheap Arc clones) and provides
/// access to the collector and its configuration.
#[derive(Clone)]
pub struct AppState {
    /// The collector every handler delegates to
    pub collector: WeatherCollector,

    /// Configuration (read-only)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(collector: WeatherCollector) -> Self {
        let config = collector.config().clone();
        Self { collector, config }
    }
}
