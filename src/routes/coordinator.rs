use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};

use crate::{
    dto::{envelope::StatusEnvelope, metrics::MetricsSnapshot, query::Query},
    error::AppError,
    state::SharedState,
};

/// Routes exposing the coordinator to the presentation layer.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/v1/coordinator/query", post(query))
        .route("/v1/coordinator/metrics", get(metrics))
        .route("/v1/coordinator/reset", post(reset))
}

/// Run a strategy query through the coordinator.
#[utoipa::path(
    post,
    path = "/v1/coordinator/query",
    tag = "coordinator",
    request_body = Query,
    responses(
        (status = 200, description = "Classified outcome", body = StatusEnvelope),
        (status = 400, description = "Body is not a JSON object or misses required fields")
    )
)]
pub async fn query(
    State(state): State<SharedState>,
    payload: Result<Json<Query>, JsonRejection>,
) -> Result<Json<StatusEnvelope>, AppError> {
    let Json(payload) = payload?;
    let envelope = state.coordinator().query(payload).await?;
    Ok(Json(envelope))
}

/// Current rolling metrics.
#[utoipa::path(
    get,
    path = "/v1/coordinator/metrics",
    tag = "coordinator",
    responses((status = 200, description = "Metrics snapshot", body = MetricsSnapshot))
)]
pub async fn metrics(State(state): State<SharedState>) -> Json<MetricsSnapshot> {
    Json(state.coordinator().snapshot().await)
}

/// Clear counters, the stale cache and the previous result.
#[utoipa::path(
    post,
    path = "/v1/coordinator/reset",
    tag = "coordinator",
    responses((status = 204, description = "State cleared"))
)]
pub async fn reset(State(state): State<SharedState>) -> StatusCode {
    state.coordinator().reset().await;
    StatusCode::NO_CONTENT
}
