//! Session handlers.

use super::{PreviewQuery, SessionPath};
use crate::api::AppState;
use crate::error::Result;
use crate::types::{
    ProgressEvent, SessionId, SessionSnapshot, StartSessionRequest, StartSessionResponse,
};
use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{
        IntoResponse, Response,
        sse::{Event as SseEvent, Sse},
    },
};
use std::convert::Infallible;
use tokio_stream::{Stream, StreamExt};

/// POST /sessions - Start a collection session
#[utoipa::path(
    post,
    path = "/sessions",
    tag = "sessions",
    request_body = StartSessionRequest,
    responses(
        (status = 201, description = "Session started", body = StartSessionResponse),
        (status = 400, description = "Invalid codes, regions or credential", body = crate::error::ApiError),
        (status = 503, description = "Service is shutting down", body = crate::error::ApiError)
    )
)]
pub async fn start_session(
    State(state): State<AppState>,
    Json(request): Json<StartSessionRequest>,
) -> Result<Response> {
    let session = state.collector.submit(request).await?;

    let response = StartSessionResponse {
        session_id: session.id(),
        total: session.total(),
        mode: session.source(),
    };
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// GET /sessions - List all sessions
#[utoipa::path(
    get,
    path = "/sessions",
    tag = "sessions",
    responses(
        (status = 200, description = "Every session, oldest first", body = Vec<SessionSnapshot>)
    )
)]
pub async fn list_sessions(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.collector.list_sessions().await)
}

/// GET /sessions/:id - Get one session
#[utoipa::path(
    get,
    path = "/sessions/{id}",
    tag = "sessions",
    params(
        ("id" = SessionId, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Session state", body = SessionSnapshot),
        (status = 404, description = "Session not found", body = crate::error::ApiError)
    )
)]
pub async fn get_session(
    State(state): State<AppState>,
    SessionPath(id): SessionPath,
) -> Result<Json<SessionSnapshot>> {
    Ok(Json(state.collector.snapshot(id).await?))
}

/// GET /sessions/:id/events - Server-sent progress events
///
/// Each SSE message carries one JSON-encoded progress event in its data field. The
/// stream ends after the `completed` event, or when the session is stopped.
#[utoipa::path(
    get,
    path = "/sessions/{id}/events",
    tag = "sessions",
    params(
        ("id" = SessionId, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "Server-sent events stream (text/event-stream)", content_type = "text/event-stream"),
        (status = 404, description = "Session not found", body = crate::error::ApiError)
    )
)]
pub async fn session_events(
    State(state): State<AppState>,
    SessionPath(id): SessionPath,
) -> Result<Sse<impl Stream<Item = std::result::Result<SseEvent, Infallible>>>> {
    let subscription = state.collector.subscribe(id).await?;
    tracing::debug!(session_id = %id, "Progress stream opened");

    let stream = subscription
        .into_stream()
        .filter_map(|event| to_sse_event(&event).map(Ok));

    Ok(Sse::new(stream))
}

fn to_sse_event(event: &ProgressEvent) -> Option<SseEvent> {
    match serde_json::to_string(event) {
        Ok(json) => Some(SseEvent::default().data(json)),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to serialize progress event");
            None
        }
    }
}

/// GET /sessions/:id/preview - First records of a session
#[utoipa::path(
    get,
    path = "/sessions/{id}/preview",
    tag = "sessions",
    params(
        ("id" = SessionId, Path, description = "Session ID"),
        PreviewQuery
    ),
    responses(
        (status = 200, description = "Leading records and the total count", body = crate::types::Preview),
        (status = 404, description = "Session not found", body = crate::error::ApiError)
    )
)]
pub async fn preview_session(
    State(state): State<AppState>,
    SessionPath(id): SessionPath,
    Query(query): Query<PreviewQuery>,
) -> Result<Json<crate::types::Preview>> {
    Ok(Json(state.collector.preview(id, query.limit).await?))
}

/// GET /sessions/:id/download - CSV report of a finished session
#[utoipa::path(
    get,
    path = "/sessions/{id}/download",
    tag = "sessions",
    params(
        ("id" = SessionId, Path, description = "Session ID")
    ),
    responses(
        (status = 200, description = "CSV report", content_type = "text/csv"),
        (status = 404, description = "Session not found", body = crate::error::ApiError),
        (status = 409, description = "Session is still running", body = crate::error::ApiError)
    )
)]
pub async fn download_report(
    State(state): State<AppState>,
    SessionPath(id): SessionPath,
) -> Result<Response> {
    let report = state.collector.export_csv(id).await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", report.filename),
            ),
        ],
        report.content,
    )
        .into_response())
}

/// POST /sessions/:id/stop - Stop a session
#[utoipa::path(
    post,
    path = "/sessions/{id}/stop",
    tag = "sessions",
    params(
        ("id" = SessionId, Path, description = "Session ID")
    ),
    responses(
        (status = 202, description = "Stop requested"),
        (status = 404, description = "Session not found", body = crate::error::ApiError),
        (status = 409, description = "Session already finished", body = crate::error::ApiError)
    )
)]
pub async fn stop_session(
    State(state): State<AppState>,
    SessionPath(id): SessionPath,
) -> Result<StatusCode> {
    state.collector.stop(id).await?;
    Ok(StatusCode::ACCEPTED)
}
