use tracing::warn;

use crate::{
    dto::health::{HealthResponse, HealthState},
    state::SharedState,
};

/// Build the health report from the coordinator's latest status.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let last_status = state.coordinator().current_status().await;
    let health = HealthResponse::from_last_status(last_status, state.capture().is_capturing());
    if health.status == HealthState::Degraded {
        warn!(
            status = last_status.map(|status| status.as_str()),
            "strategy service degraded"
        );
    }
    health
}
