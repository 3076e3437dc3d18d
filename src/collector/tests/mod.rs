use super::test_helpers::*;
use super::*;
use crate::error::SessionError;
use crate::types::ProgressEvent;

mod control;

async fn collect_events(mut subscription: ProgressSubscription) -> Vec<ProgressEvent> {
    let mut events = Vec::new();
    while let Some(event) = subscription.next().await {
        events.push(event);
    }
    events
}

fn request(list: &[&str]) -> StartSessionRequest {
    StartSessionRequest {
        codes: codes(list),
        ..Default::default()
    }
}

#[tokio::test]
async fn new_rejects_invalid_config() {
    let mut config = test_config();
    config.batch.max_codes = 0;

    let err = WeatherCollector::new(config).err().unwrap();
    assert!(matches!(err, Error::Config { .. }));
}

#[tokio::test]
async fn mode_defaults_to_configured_mode() {
    let collector = create_test_collector();
    let pending = collector.prepare(request(&["10001"])).await.unwrap();

    assert_eq!(pending.session().source(), SourceKind::Synthetic);
    assert_eq!(pending.rate_delay(), Duration::ZERO);
}

#[tokio::test]
async fn live_mode_without_credential_is_rejected_before_session_exists() {
    let collector = create_test_collector();

    let err = collector
        .prepare(StartSessionRequest {
            codes: codes(&["10001"]),
            mode: Some(SourceKind::Live),
            api_key: Some("   ".into()),
            ..Default::default()
        })
        .await
        .err()
        .unwrap();

    assert!(matches!(
        err,
        Error::Validation(ValidationError::MissingCredential)
    ));
    assert!(collector.list_sessions().await.is_empty());
}

#[tokio::test]
async fn live_mode_uses_request_or_configured_credential() {
    let collector = create_test_collector();
    let pending = collector
        .prepare(StartSessionRequest {
            codes: codes(&["10001"]),
            mode: Some(SourceKind::Live),
            api_key: Some("secret".into()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(pending.session().source(), SourceKind::Live);
    assert_eq!(pending.rate_delay(), Duration::from_secs(1));

    let mut config = test_config();
    config.source.api_key = Some("from-config".into());
    let collector = WeatherCollector::new(config).unwrap();
    let pending = collector
        .prepare(StartSessionRequest {
            codes: codes(&["10001"]),
            mode: Some(SourceKind::Live),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(pending.session().source(), SourceKind::Live);
}

#[tokio::test]
async fn invalid_codes_create_nothing() {
    let collector = create_test_collector();

    let err = collector
        .submit(request(&["10001", "9021O"]))
        .await
        .err()
        .unwrap();

    assert!(matches!(
        err,
        Error::Validation(ValidationError::InvalidCode { position: 1, .. })
    ));
    assert!(collector.list_sessions().await.is_empty());
}

#[tokio::test]
async fn regions_expand_through_resolver() {
    let collector = create_test_collector();
    let pending = collector
        .prepare(StartSessionRequest {
            regions: vec!["ri".into(), "DE".into()],
            ..Default::default()
        })
        .await
        .unwrap();

    let session = pending.session();
    assert_eq!(session.total(), 200);
    assert_eq!(session.codes()[0], "02800");
    assert!(session.codes()[100].starts_with("19"));
}

#[tokio::test]
async fn codes_win_over_regions() {
    let collector = create_test_collector();
    let pending = collector
        .prepare(StartSessionRequest {
            codes: codes(&["10001"]),
            regions: vec!["CA".into()],
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(pending.session().codes(), ["10001".to_string()]);
}

#[tokio::test]
async fn unknown_region_is_rejected() {
    let collector = create_test_collector();
    let err = collector
        .prepare(StartSessionRequest {
            regions: vec!["Atlantis".into()],
            ..Default::default()
        })
        .await
        .err()
        .unwrap();

    match err {
        Error::Validation(ValidationError::UnknownRegion { region }) => {
            assert_eq!(region, "Atlantis")
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn empty_request_is_rejected() {
    let collector = create_test_collector();
    let err = collector
        .prepare(StartSessionRequest::default())
        .await
        .err()
        .unwrap();

    assert!(matches!(
        err,
        Error::Validation(ValidationError::EmptyCodeList)
    ));
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let collector = create_test_collector();
    let id = SessionId::new();

    assert!(matches!(
        collector.snapshot(id).await,
        Err(Error::Session(SessionError::NotFound { .. }))
    ));
    assert!(matches!(
        collector.subscribe(id).await,
        Err(Error::Session(SessionError::NotFound { .. }))
    ));
}
