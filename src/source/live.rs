//! Visual Crossing timeline API client

use super::WeatherSource;
use crate::calendar::{WeekendDates, WeekendWindow};
use crate::error::{Error, Result, UpstreamError};
use crate::types::{DayReading, SourceKind, WeatherRecord, WindowReadings};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::StatusCode;
use serde::Deserialize;

/// Fields requested from the timeline endpoint
const ELEMENTS: &str = "datetime,tempmax,conditions";

/// [`WeatherSource`] backed by the Visual Crossing timeline API
///
/// Each code costs two requests: one historical range for last year's weekend, then one
/// ten-day forecast range covering this weekend through the next. Timeouts are taken
/// from the [`reqwest::Client`] the source is built with.
pub struct LiveSource {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimelineResponse {
    #[serde(default)]
    resolved_address: Option<String>,
    #[serde(default)]
    days: Vec<TimelineDay>,
}

#[derive(Debug, Default, Deserialize)]
struct TimelineDay {
    #[serde(default)]
    tempmax: Option<f64>,
    #[serde(default)]
    conditions: Option<String>,
}

impl LiveSource {
    /// Create a source for `base_url` (the timeline endpoint) with the caller's credential
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn timeline_url(&self, code: &str, start: NaiveDate, end: NaiveDate) -> Result<url::Url> {
        let mut url = url::Url::parse(&self.base_url).map_err(|e| Error::Config {
            message: format!("invalid weather API URL: {e}"),
            key: Some("source.base_url".into()),
        })?;
        let start = start.format("%Y-%m-%d").to_string();
        let end = end.format("%Y-%m-%d").to_string();
        url.path_segments_mut()
            .map_err(|_| Error::Config {
                message: "weather API URL cannot carry a path".into(),
                key: Some("source.base_url".into()),
            })?
            .pop_if_empty()
            .extend([code, start.as_str(), end.as_str()]);
        Ok(url)
    }

    async fn query_range(
        &self,
        code: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<TimelineResponse> {
        let url = self.timeline_url(code, start, end)?;

        let response = self
            .client
            .get(url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("include", "days"),
                ("elements", ELEMENTS),
                ("unitGroup", "us"),
            ])
            .send()
            .await
            .map_err(|e| transport_error(code, e))?;

        if let Some(upstream) = classify_status(response.status()) {
            return Err(Error::Upstream(upstream));
        }

        response
            .json::<TimelineResponse>()
            .await
            .map_err(|e| transport_error(code, e))
    }
}

/// Map a failed send or body read to a per-item transport error
fn transport_error(code: &str, e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::Transport(format!("weather API timed out for {code}"))
    } else if e.is_connect() {
        Error::Transport(format!("connection to weather API failed: {e}"))
    } else if e.is_decode() {
        Error::Transport(format!("unreadable weather API response for {code}: {e}"))
    } else {
        Error::Transport(format!("weather API request failed: {e}"))
    }
}

/// Map a non-success status to the matching upstream error
fn classify_status(status: StatusCode) -> Option<UpstreamError> {
    if status.is_success() {
        return None;
    }
    Some(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => UpstreamError::InvalidCredential,
        StatusCode::TOO_MANY_REQUESTS => UpstreamError::RateLimited,
        StatusCode::BAD_REQUEST => UpstreamError::InvalidRequest,
        other => UpstreamError::ServerError {
            status: other.as_u16(),
        },
    })
}

fn reading(days: &[TimelineDay], index: usize, date: NaiveDate) -> DayReading {
    let day = days.get(index);
    DayReading {
        date,
        high_f: day
            .and_then(|d| d.tempmax)
            .map(|t| t.round() as i32)
            .unwrap_or(0),
        conditions: day
            .and_then(|d| d.conditions.clone())
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| "Unknown".to_string()),
    }
}

fn window(days: &[TimelineDay], offset: usize, dates: &WeekendWindow) -> WindowReadings {
    WindowReadings {
        friday: reading(days, offset, dates.friday),
        saturday: reading(days, offset + 1, dates.saturday),
        sunday: reading(days, offset + 2, dates.sunday),
    }
}

// "Beverly Hills, CA, United States" -> ("Beverly Hills", "CA")
fn split_address(code: &str, address: Option<&str>) -> (String, String) {
    let mut parts = address.unwrap_or_default().split(',').map(str::trim);
    let place = parts
        .next()
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("City {code}"));
    let region = parts
        .next()
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "Unknown".to_string());
    (place, region)
}

#[async_trait]
impl WeatherSource for LiveSource {
    async fn fetch_window(&self, code: &str, dates: &WeekendDates) -> Result<WeatherRecord> {
        let historical = self
            .query_range(code, dates.last_year.friday, dates.last_year.sunday)
            .await?;
        let forecast = self
            .query_range(code, dates.this_weekend.friday, dates.next_weekend.sunday)
            .await?;

        let address = forecast
            .resolved_address
            .as_deref()
            .or(historical.resolved_address.as_deref());
        let (place, region) = split_address(code, address);

        Ok(WeatherRecord {
            code: code.to_string(),
            place,
            region,
            last_year: window(&historical.days, 0, &dates.last_year),
            this_weekend: window(&forecast.days, 0, &dates.this_weekend),
            next_weekend: window(&forecast.days, 7, &dates.next_weekend),
        })
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Live
    }

    fn name(&self) -> &'static str {
        "visual-crossing"
    }
}
