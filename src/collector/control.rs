//! Session control: cooperative stop.

use crate::error::{Result, SessionError};
use crate::types::SessionId;

use super::WeatherCollector;

impl WeatherCollector {
    /// Ask a session to stop
    ///
    /// The orchestrator notices the request before its next item, or immediately if it
    /// is pausing between items; an in-flight fetch is allowed to finish. Results
    /// collected so far are kept and remain downloadable. Stopping a session twice is
    /// harmless.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NotFound`] if the session doesn't exist
    /// - [`SessionError::InvalidState`] if the session already finished
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use weekend_weather::*;
    /// # async fn example(collector: WeatherCollector, id: SessionId) -> Result<()> {
    /// collector.stop(id).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn stop(&self, id: SessionId) -> Result<()> {
        let session = self.store.get(id).await?;
        let status = session.status().await;

        if status.is_terminal() {
            return Err(SessionError::InvalidState {
                id,
                operation: "stop".to_string(),
                current_state: status.to_string(),
            }
            .into());
        }

        tracing::info!(session_id = %id, status = %status, "Stop requested");
        session.cancel_token().cancel();
        Ok(())
    }
}
