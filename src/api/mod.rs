//! REST API server module
//!
//! Provides an OpenAPI 3 compliant REST API for starting collection sessions,
//! following their progress, and downloading their reports.

use crate::{Result, WeatherCollector};
use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{get, post},
};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod auth;
pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Sessions
/// - `POST /sessions` - Start a collection session
/// - `GET /sessions` - List all sessions
/// - `GET /sessions/:id` - Get one session
/// - `GET /sessions/:id/events` - Server-sent progress events
/// - `GET /sessions/:id/preview` - First records of a session
/// - `GET /sessions/:id/download` - CSV report of a finished session
/// - `POST /sessions/:id/stop` - Stop a session
///
/// ## System
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
pub fn create_router(collector: WeatherCollector) -> Router {
    let config = collector.config().clone();
    let state = AppState::new(collector);

    let router = Router::new()
        // Sessions
        .route("/sessions", post(routes::start_session))
        .route("/sessions", get(routes::list_sessions))
        .route("/sessions/:id", get(routes::get_session))
        .route("/sessions/:id/events", get(routes::session_events))
        .route("/sessions/:id/preview", get(routes::preview_session))
        .route("/sessions/:id/download", get(routes::download_report))
        .route("/sessions/:id/stop", post(routes::stop_session))
        // System
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec));

    // Merge Swagger UI routes if enabled in config (before applying state)
    let router = if config.server.api.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router.with_state(state);

    // Apply authentication middleware if API key is configured
    let router = if config.server.api.api_key.is_some() {
        router.layer(middleware::from_fn_with_state(
            config.server.api.api_key.clone(),
            auth::require_api_key,
        ))
    } else {
        router
    };

    let router = router.layer(TraceLayer::new_for_http());

    // Apply CORS middleware if enabled in config
    if config.server.api.cors_enabled {
        let cors = build_cors_layer(&config.server.api.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// `"*"` anywhere in the list, or an empty list, allows any origin. All methods and
/// headers are allowed.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// Serves until `shutdown` resolves, then stops accepting connections and waits for
/// open ones to finish. Progress streams end on their own once their sessions are
/// stopped, so callers typically resolve `shutdown` only after
/// [`WeatherCollector::shutdown`] has returned.
///
/// # Example
///
/// ```no_run
/// use weekend_weather::{Config, WeatherCollector, wait_for_signal};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let collector = WeatherCollector::new(Config::default())?;
/// let on_signal = collector.clone();
///
/// weekend_weather::api::start_api_server(collector, async move {
///     wait_for_signal().await;
///     on_signal.shutdown().await;
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server<F>(collector: WeatherCollector, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let bind_address = collector.config().server.api.bind_address;

    tracing::info!(
        address = %bind_address,
        "Starting API server"
    );

    let app = create_router(collector);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    tracing::info!(
        address = %bind_address,
        "API server listening"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
    .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
