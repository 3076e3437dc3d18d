//! Deterministic offline weather generator

use super::{UpstreamFault, WeatherSource};
use crate::calendar::{WeekendDates, WeekendWindow};
use crate::config::SyntheticConfig;
use crate::error::{Error, Result, UpstreamError};
use crate::types::{DayReading, SourceKind, WeatherRecord, WindowReadings};
use async_trait::async_trait;
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::collections::HashMap;
use std::time::Duration;

/// Seed used when a code does not parse to a non-zero integer
const FALLBACK_SEED: u64 = 12345;

const CONDITIONS: [&str; 10] = [
    "Sunny",
    "Partly Cloudy",
    "Cloudy",
    "Light Rain",
    "Heavy Rain",
    "Thunderstorms",
    "Snow",
    "Fog",
    "Clear",
    "Overcast",
];

const KNOWN_PLACES: [(&str, &str, &str); 10] = [
    ("10001", "New York", "NY"),
    ("90210", "Beverly Hills", "CA"),
    ("60601", "Chicago", "IL"),
    ("33101", "Miami", "FL"),
    ("02101", "Boston", "MA"),
    ("48001", "Algonac", "MI"),
    ("77001", "Houston", "TX"),
    ("30301", "Atlanta", "GA"),
    ("98101", "Seattle", "WA"),
    ("85001", "Phoenix", "AZ"),
];

/// Place name and region for a code, from the built-in table
///
/// Unknown codes resolve to `("City <code>", "XX")`.
pub fn place_for(code: &str) -> (String, String) {
    KNOWN_PLACES
        .iter()
        .find(|(known, _, _)| *known == code)
        .map(|(_, place, region)| (place.to_string(), region.to_string()))
        .unwrap_or_else(|| (format!("City {code}"), "XX".to_string()))
}

/// Offline [`WeatherSource`] whose output depends only on the code and the dates
///
/// Each call waits a random simulated latency first, so a synthetic session paces
/// itself roughly like a live one without touching the network.
pub struct SyntheticSource {
    min_latency: Duration,
    max_latency: Duration,
    faults: HashMap<String, UpstreamFault>,
}

impl SyntheticSource {
    /// Create a generator with the given simulated latency range
    pub fn new(min_latency: Duration, max_latency: Duration) -> Self {
        Self {
            min_latency,
            max_latency: max_latency.max(min_latency),
            faults: HashMap::new(),
        }
    }

    /// Create a generator that answers immediately
    pub fn instant() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// Build from configuration, including the configured failing codes
    pub fn from_config(config: &SyntheticConfig) -> Self {
        config.fail_codes.iter().fold(
            Self::new(config.min_latency, config.max_latency),
            |source, fail| source.fail_on(fail.code.clone(), fail.fault),
        )
    }

    /// Make every request for `code` fail with `fault`
    pub fn fail_on(mut self, code: impl Into<String>, fault: UpstreamFault) -> Self {
        self.faults.insert(code.into(), fault);
        self
    }

    fn simulated_latency(&self) -> Duration {
        if self.max_latency.is_zero() {
            return Duration::ZERO;
        }
        let min = self.min_latency.as_millis() as u64;
        let max = self.max_latency.as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::from_config(&SyntheticConfig::default())
    }
}

/// Generate the record for `code` without any latency or fault injection
pub fn generate(code: &str, dates: &WeekendDates) -> WeatherRecord {
    let seed = code
        .parse::<u64>()
        .ok()
        .filter(|n| *n != 0)
        .unwrap_or(FALLBACK_SEED);
    let mut rng = StdRng::seed_from_u64(seed);
    let base: i32 = rng.gen_range(40..=80);

    let mut window = |w: &WeekendWindow| {
        let [friday, saturday, sunday] = w.days().map(|date| {
            let variation: f64 = rng.gen_range(-7.5..=7.5);
            DayReading {
                date,
                high_f: (f64::from(base) + variation).round() as i32,
                conditions: CONDITIONS[rng.gen_range(0..CONDITIONS.len())].to_string(),
            }
        });
        WindowReadings {
            friday,
            saturday,
            sunday,
        }
    };

    let last_year = window(&dates.last_year);
    let this_weekend = window(&dates.this_weekend);
    let next_weekend = window(&dates.next_weekend);
    let (place, region) = place_for(code);

    WeatherRecord {
        code: code.to_string(),
        place,
        region,
        last_year,
        this_weekend,
        next_weekend,
    }
}

#[async_trait]
impl WeatherSource for SyntheticSource {
    async fn fetch_window(&self, code: &str, dates: &WeekendDates) -> Result<WeatherRecord> {
        let latency = self.simulated_latency();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if let Some(fault) = self.faults.get(code) {
            tracing::debug!(code = %code, fault = ?fault, "Injected synthetic failure");
            return Err(Error::Upstream(UpstreamError::from(*fault)));
        }

        Ok(generate(code, dates))
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Synthetic
    }

    fn name(&self) -> &'static str {
        "synthetic"
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FailCode;
    use chrono::NaiveDate;

    fn dates() -> WeekendDates {
        WeekendDates::from_reference(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap())
    }

    #[test]
    fn same_code_and_dates_give_identical_records() {
        let a = generate("90210", &dates());
        let b = generate("90210", &dates());
        assert_eq!(a, b);
    }

    #[test]
    fn different_codes_give_different_records() {
        assert_ne!(
            generate("90210", &dates()).this_weekend,
            generate("10001", &dates()).this_weekend
        );
    }

    #[test]
    fn readings_stay_in_range_and_use_known_conditions() {
        for code in ["10001", "35004", "99499", "00501"] {
            let record = generate(code, &dates());
            for window in [&record.last_year, &record.this_weekend, &record.next_weekend] {
                for day in window.days() {
                    assert!(
                        (33..=88).contains(&day.high_f),
                        "{code}: {} outside base range plus variation",
                        day.high_f
                    );
                    assert!(CONDITIONS.contains(&day.conditions.as_str()));
                }
            }
        }
    }

    #[test]
    fn records_carry_the_session_dates() {
        let d = dates();
        let record = generate("60601", &d);
        assert_eq!(record.this_weekend.friday.date, d.this_weekend.friday);
        assert_eq!(record.last_year.sunday.date, d.last_year.sunday);
        assert_eq!(record.next_weekend.saturday.date, d.next_weekend.saturday);
    }

    #[test]
    fn non_numeric_and_zero_codes_share_the_fallback_seed() {
        let zero = generate("00000", &dates());
        let junk = generate("abcde", &dates());
        assert_eq!(zero.this_weekend, junk.this_weekend);
        assert_eq!(zero.last_year, junk.last_year);
    }

    #[test]
    fn place_table_and_default() {
        assert_eq!(
            place_for("02101"),
            ("Boston".to_string(), "MA".to_string())
        );
        assert_eq!(
            place_for("12345"),
            ("City 12345".to_string(), "XX".to_string())
        );
    }

    #[tokio::test]
    async fn injected_faults_fail_only_their_code() {
        let source = SyntheticSource::instant().fail_on("00000", UpstreamFault::RateLimited);

        let err = source.fetch_window("00000", &dates()).await.unwrap_err();
        assert!(matches!(err, Error::Upstream(UpstreamError::RateLimited)));

        let record = source.fetch_window("10001", &dates()).await.unwrap();
        assert_eq!(record.place, "New York");
    }

    #[tokio::test]
    async fn config_fail_codes_are_applied() {
        let config = SyntheticConfig {
            min_latency: Duration::ZERO,
            max_latency: Duration::ZERO,
            fail_codes: vec![FailCode {
                code: "11111".into(),
                fault: UpstreamFault::ServerError,
            }],
        };
        let source = SyntheticSource::from_config(&config);

        let err = source.fetch_window("11111", &dates()).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Upstream(UpstreamError::ServerError { status: 500 })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_latency_stays_within_bounds() {
        let source = SyntheticSource::new(Duration::from_millis(500), Duration::from_millis(1000));

        let started = tokio::time::Instant::now();
        source.fetch_window("10001", &dates()).await.unwrap();
        let elapsed = started.elapsed();

        assert!(elapsed >= Duration::from_millis(500), "{elapsed:?}");
        assert!(elapsed <= Duration::from_millis(1001), "{elapsed:?}");
    }
}
