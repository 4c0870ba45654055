//! OpenAPI document covering every route.

use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the strategy coordinator.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::coordinator::query,
        crate::routes::coordinator::metrics,
        crate::routes::coordinator::reset,
        crate::routes::capture::status,
        crate::routes::capture::start,
        crate::routes::capture::stop,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthState,
            crate::dto::query::Query,
            crate::dto::query::HandState,
            crate::dto::envelope::StatusEnvelope,
            crate::dto::envelope::QueryStatus,
            crate::dto::envelope::EnvelopeSource,
            crate::dto::envelope::StrategyAction,
            crate::dto::metrics::MetricsSnapshot,
            crate::dto::capture::CaptureStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "coordinator", description = "Strategy queries, metrics and reset"),
        (name = "capture", description = "Frame-tick driver control"),
    )
)]
pub struct ApiDoc;
