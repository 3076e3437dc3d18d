//! Shutdown coordination.

use crate::types::SessionStatus;
use std::sync::atomic::Ordering;
use std::time::Duration;

use super::WeatherCollector;

impl WeatherCollector {
    /// Gracefully shut down the collector
    ///
    /// 1. Stops accepting new sessions (`prepare`/`submit` return `ShuttingDown`)
    /// 2. Cancels every session's token
    /// 3. Marks sessions that were prepared but never launched as Stopped
    /// 4. Waits, bounded by `batch.shutdown_timeout`, until no session is Running
    ///
    /// Session data stays readable afterwards.
    pub async fn shutdown(&self) {
        tracing::info!("Initiating graceful shutdown");

        self.accepting_new.store(false, Ordering::SeqCst);
        tracing::info!("Stopped accepting new sessions");

        self.stop_all().await;

        let timeout = self.config.batch.shutdown_timeout;
        match tokio::time::timeout(timeout, self.wait_for_running()).await {
            Ok(()) => tracing::info!("All sessions settled"),
            Err(_) => tracing::warn!(
                timeout_ms = timeout.as_millis() as u64,
                "Timeout waiting for sessions to settle, proceeding with shutdown"
            ),
        }

        tracing::info!("Graceful shutdown complete");
    }

    /// Whether new sessions are still accepted
    pub fn is_accepting(&self) -> bool {
        self.accepting_new.load(Ordering::SeqCst)
    }

    async fn stop_all(&self) {
        let sessions = self.store.list().await;
        tracing::debug!(count = sessions.len(), "Signaling stop to all sessions");

        for session in sessions {
            session.cancel_token().cancel();

            // Never launched: no orchestrator will ever settle it
            if session.status().await == SessionStatus::Created
                && session.finish(SessionStatus::Stopped).await
            {
                session.progress().close().await;
                tracing::debug!(session_id = %session.id(), "Stopped session that never started");
            }
        }
    }

    async fn wait_for_running(&self) {
        loop {
            let mut running = 0usize;
            for session in self.store.list().await {
                if session.status().await == SessionStatus::Running {
                    running += 1;
                }
            }

            if running == 0 {
                return;
            }

            tracing::debug!(running, "Waiting for running sessions to stop");
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }
}
