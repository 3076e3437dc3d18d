#![cfg(feature = "live-tests")]
//! Live session against the real weather API
//!
//! Gated behind the `live-tests` feature flag. Requires `WEATHER_API_KEY` in the
//! environment; the test returns early without it.
//!
//! ```bash
//! WEATHER_API_KEY=... cargo test --features live-tests --test live_weather -- --nocapture
//! ```

mod common;

use common::{WaitResult, codes, drain, offline_config};
use std::time::Duration;
use weekend_weather::{SessionStatus, SourceKind, StartSessionRequest, WeatherCollector};

#[tokio::test]
async fn live_session_collects_two_codes() {
    let Ok(api_key) = std::env::var("WEATHER_API_KEY") else {
        eprintln!("WEATHER_API_KEY not set, skipping live test");
        return;
    };

    let collector = WeatherCollector::new(offline_config()).unwrap();
    let pending = collector
        .prepare(StartSessionRequest {
            codes: codes(&["10001", "90210"]),
            api_key: Some(api_key),
            mode: Some(SourceKind::Live),
            ..Default::default()
        })
        .await
        .unwrap();
    let id = pending.session().id();
    let subscription = collector.subscribe(id).await.unwrap();

    collector.launch(pending);
    let (result, events) = drain(subscription, Duration::from_secs(120)).await;
    println!("events: {events:#?}");

    assert_eq!(
        result,
        WaitResult::Completed {
            succeeded: 2,
            failed: 0
        }
    );

    let snapshot = collector.snapshot(id).await.unwrap();
    assert_eq!(snapshot.status, SessionStatus::Completed);

    let preview = collector.preview(id, None).await.unwrap();
    for record in &preview.data {
        assert!(!record.place.is_empty());
        assert_ne!(record.this_weekend.friday.conditions, "");
    }
}
