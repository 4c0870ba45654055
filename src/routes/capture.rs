use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::{dto::capture::CaptureStatus, state::SharedState};

/// Routes controlling the frame-tick driver.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/v1/capture/status", get(status))
        .route("/v1/capture/start", post(start))
        .route("/v1/capture/stop", post(stop))
}

/// Frame counters and the last envelope handed back for a tick.
#[utoipa::path(
    get,
    path = "/v1/capture/status",
    tag = "capture",
    responses((status = 200, description = "Capture status", body = CaptureStatus))
)]
pub async fn status(State(state): State<SharedState>) -> Json<CaptureStatus> {
    Json(state.capture().status().await)
}

/// Start sampling frames.
#[utoipa::path(
    post,
    path = "/v1/capture/start",
    tag = "capture",
    responses(
        (status = 204, description = "Capture started"),
        (status = 409, description = "Capture already running")
    )
)]
pub async fn start(State(state): State<SharedState>) -> StatusCode {
    if state.capture().start().await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::CONFLICT
    }
}

/// Stop sampling frames.
#[utoipa::path(
    post,
    path = "/v1/capture/stop",
    tag = "capture",
    responses(
        (status = 204, description = "Capture stopped"),
        (status = 409, description = "Capture not running")
    )
)]
pub async fn stop(State(state): State<SharedState>) -> StatusCode {
    if state.capture().stop().await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::CONFLICT
    }
}
