use super::*;

#[tokio::test]
async fn stop_unknown_session_is_not_found() {
    let collector = create_test_collector();
    let err = collector.stop(SessionId::new()).await.unwrap_err();
    assert!(matches!(err, Error::Session(SessionError::NotFound { .. })));
}

#[tokio::test]
async fn stop_before_launch_prevents_any_work() {
    let collector = create_test_collector();
    let pending = collector
        .prepare(request(&["10001", "90210"]))
        .await
        .unwrap();
    let id = pending.session().id();

    collector.stop(id).await.unwrap();
    collector.launch(pending);
    let snapshot = wait_for_terminal(&collector, id).await;

    assert_eq!(snapshot.status, SessionStatus::Stopped);
    assert_eq!(snapshot.processed, 0);
}

#[tokio::test]
async fn stop_is_idempotent_while_running() {
    let collector = create_test_collector();
    let pending = collector.prepare(request(&["10001"])).await.unwrap();
    let id = pending.session().id();

    collector.stop(id).await.unwrap();
    collector.stop(id).await.unwrap();
    assert!(pending.session().cancel_token().is_cancelled());
}

#[tokio::test]
async fn stop_after_completion_is_invalid_state() {
    let collector = create_test_collector();
    let session = collector.submit(request(&["10001"])).await.unwrap();
    wait_for_terminal(&collector, session.id()).await;

    let err = collector.stop(session.id()).await.unwrap_err();
    match err {
        Error::Session(SessionError::InvalidState {
            operation,
            current_state,
            ..
        }) => {
            assert_eq!(operation, "stop");
            assert_eq!(current_state, "completed");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn stopping_one_session_leaves_others_running() {
    let collector = create_test_collector();
    let first = collector
        .prepare_with_source(
            codes(&["10001", "10002"]),
            Arc::new(RecordingSource::default()),
            Duration::from_secs(3600),
        )
        .await
        .unwrap();
    let second = collector.prepare(request(&["60601", "90210"])).await.unwrap();
    let first_id = first.session().id();
    let second_id = second.session().id();

    collector.stop(first_id).await.unwrap();
    collector.launch(first);
    collector.launch(second);

    assert_eq!(
        wait_for_terminal(&collector, first_id).await.status,
        SessionStatus::Stopped
    );
    let other = wait_for_terminal(&collector, second_id).await;
    assert_eq!(other.status, SessionStatus::Completed);
    assert_eq!(other.results, 2);
}
