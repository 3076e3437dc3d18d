//! Previews and CSV report export.

use crate::error::{Result, SessionError};
use crate::export::{CsvExporter, ReportMetadata, report_filename};
use crate::types::{Preview, SessionId};
use chrono::Local;

use super::WeatherCollector;

/// A rendered CSV report ready to be served as a download
#[derive(Debug, Clone)]
pub struct CsvReport {
    /// Suggested download filename
    pub filename: String,
    /// Report bytes, UTF-8 with a byte order mark
    pub content: Vec<u8>,
}

impl WeatherCollector {
    /// The first records of a session
    ///
    /// `limit` is clamped to `1..=batch.preview_limit` and defaults to the upper bound.
    pub async fn preview(&self, id: SessionId, limit: Option<usize>) -> Result<Preview> {
        let session = self.store.get(id).await?;
        let max = self.config.batch.preview_limit;
        let limit = limit.unwrap_or(max).clamp(1, max);
        Ok(session.preview(limit).await)
    }

    /// Render the CSV report for a finished session
    ///
    /// Stopped and failed sessions export whatever they collected.
    ///
    /// # Errors
    ///
    /// - [`SessionError::NotFound`] if the session doesn't exist
    /// - [`SessionError::InvalidState`] while the session is still Created or Running
    pub async fn export_csv(&self, id: SessionId) -> Result<CsvReport> {
        let session = self.store.get(id).await?;
        let status = session.status().await;

        if !status.is_terminal() {
            return Err(SessionError::InvalidState {
                id,
                operation: "download".to_string(),
                current_state: status.to_string(),
            }
            .into());
        }

        let records = session.results().await;
        let metadata = ReportMetadata {
            generated_on: Local::now().date_naive(),
            source: session.source(),
        };
        let content = CsvExporter::from(&self.config.export).export(&records, &metadata);

        tracing::debug!(
            session_id = %id,
            records = records.len(),
            bytes = content.len(),
            "Report exported"
        );

        Ok(CsvReport {
            filename: report_filename(records.len(), metadata.generated_on),
            content,
        })
    }
}
