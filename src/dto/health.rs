use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::envelope::QueryStatus;

/// Coarse service health derived from the latest classified query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    /// No call yet, or the latest call succeeded.
    Ok,
    /// The latest call did not succeed.
    Degraded,
}

/// Body of the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Overall health.
    pub status: HealthState,
    /// Status of the most recently settled query; absent before the first call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_status: Option<QueryStatus>,
    /// Whether the capture driver is running.
    pub capturing: bool,
}

impl HealthResponse {
    /// Healthy unless a query has settled with a non-success status.
    pub fn from_last_status(last_status: Option<QueryStatus>, capturing: bool) -> Self {
        let status = match last_status {
            Some(status) if !status.is_success() => HealthState::Degraded,
            _ => HealthState::Ok,
        };
        Self {
            status,
            last_status,
            capturing,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn unset_and_success_are_healthy() {
        assert_eq!(HealthResponse::from_last_status(None, false).status, HealthState::Ok);
        assert_eq!(
            HealthResponse::from_last_status(Some(QueryStatus::Success), true).status,
            HealthState::Ok
        );
    }

    #[test]
    fn failure_degrades_and_is_reported() {
        let health = HealthResponse::from_last_status(Some(QueryStatus::Timeout), true);
        assert_eq!(
            serde_json::to_value(&health).unwrap(),
            json!({"status": "degraded", "lastStatus": "TIMEOUT", "capturing": true})
        );
    }
}
