//! OpenAPI documentation and schema generation
//!
//! Defines the OpenAPI specification for the weekend-weather REST API using utoipa
//! for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the weekend-weather REST API
///
/// The spec can be accessed via:
/// - `/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "weekend-weather REST API",
        version = "0.1.0",
        description = "Batch collection of weekend weather comparisons: start sessions, stream their progress, download CSV reports",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:6790", description = "Local development server")
    ),
    paths(
        // Sessions
        crate::api::routes::start_session,
        crate::api::routes::list_sessions,
        crate::api::routes::get_session,
        crate::api::routes::session_events,
        crate::api::routes::preview_session,
        crate::api::routes::download_report,
        crate::api::routes::stop_session,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::SessionId,
        crate::types::SessionStatus,
        crate::types::SourceKind,
        crate::types::DayReading,
        crate::types::WindowReadings,
        crate::types::WeatherRecord,
        crate::types::SessionSnapshot,
        crate::types::Preview,
        crate::types::StartSessionRequest,
        crate::types::StartSessionResponse,

        // Dates from calendar.rs
        crate::calendar::WeekendWindow,
        crate::calendar::WeekendDates,

        // Error types from error.rs
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "sessions", description = "Collection sessions - Start, monitor, stop and export batches"),
        (name = "system", description = "System endpoints - Health checks and OpenAPI spec"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Security addon to add API key authentication scheme to OpenAPI spec
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = &mut openapi.components {
            components.add_security_scheme(
                "api_key",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Header(
                        utoipa::openapi::security::ApiKeyValue::new("X-Api-Key"),
                    ),
                ),
            );
        }
    }
}
