//! Sequential batch execution for one session.

use crate::session::Session;
use crate::source::WeatherSource;
use crate::types::{ProgressEvent, SessionStatus};
use std::sync::Arc;
use std::time::Duration;

/// Process every code of `session` in order, then enter a final status
///
/// Items are fetched one at a time with `rate_delay` between consecutive fetches. A
/// failed fetch is counted and reported as an [`ProgressEvent::Error`]; the batch
/// continues. Cancellation is checked before each item and during the pause, never in
/// the middle of a fetch, so a stopped session keeps every result it collected.
///
/// Returns the status the session ended in. If the session was not in
/// [`SessionStatus::Created`], nothing runs and its current status is returned.
pub async fn run_batch(
    session: Arc<Session>,
    source: Arc<dyn WeatherSource>,
    rate_delay: Duration,
) -> SessionStatus {
    if !session.begin().await {
        tracing::warn!(session_id = %session.id(), "Session already started, not running again");
        return session.status().await;
    }

    let id = session.id();
    let total = session.total();
    let cancel = session.cancel_token().clone();

    tracing::info!(session_id = %id, total, source = source.name(), "Batch started");

    for (index, code) in session.codes().iter().enumerate() {
        if cancel.is_cancelled() {
            return stop(&session, index).await;
        }

        session
            .progress()
            .emit(ProgressEvent::Progress {
                current: index,
                total,
                code: code.clone(),
            })
            .await;

        match source.fetch_window(code, session.dates()).await {
            Ok(record) => {
                let processed = session.record_success(record).await;
                tracing::debug!(session_id = %id, code = %code, processed, total, "Item collected");
            }
            Err(e) => {
                let processed = session.record_failure().await;
                tracing::warn!(
                    session_id = %id,
                    code = %code,
                    processed,
                    total,
                    error = %e,
                    "Item failed"
                );
                session
                    .progress()
                    .emit(ProgressEvent::Error {
                        code: code.clone(),
                        message: e.to_string(),
                    })
                    .await;
            }
        }

        let is_last = index + 1 == total;
        if !is_last && !rate_delay.is_zero() {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(rate_delay) => {}
            }
        }
    }

    complete(&session).await
}

async fn stop(session: &Session, processed: usize) -> SessionStatus {
    if session.finish(SessionStatus::Stopped).await {
        tracing::info!(
            session_id = %session.id(),
            processed,
            total = session.total(),
            "Batch stopped"
        );
    }
    session.progress().close().await;
    session.status().await
}

async fn complete(session: &Session) -> SessionStatus {
    let snapshot = session.snapshot().await;

    if session.finish(SessionStatus::Completed).await {
        let message = if snapshot.errors == 0 {
            format!(
                "Completed! Weekend weather data for {} locations ready",
                snapshot.results
            )
        } else {
            format!(
                "Completed with {} errors. Successfully processed {} out of {} ZIP codes",
                snapshot.errors, snapshot.results, snapshot.total
            )
        };

        tracing::info!(
            session_id = %session.id(),
            succeeded = snapshot.results,
            failed = snapshot.errors,
            "Batch completed"
        );

        session
            .progress()
            .emit(ProgressEvent::Completed {
                message,
                succeeded: snapshot.results,
                failed: snapshot.errors,
            })
            .await;
    }

    session.progress().close().await;
    session.status().await
}
