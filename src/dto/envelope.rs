use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Classified outcome of a strategy query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryStatus {
    /// HTTP ok and the body carried a non-empty action list.
    Success,
    /// HTTP 4xx.
    ClientError,
    /// HTTP 5xx.
    ServerError,
    /// Body was not a JSON object.
    ParseError,
    /// Body reported `success: false` without a recognised reason.
    ApiError,
    /// The service does not support the requested situation.
    Unsupported,
    /// The service has no strategy stored for the situation.
    Miss,
    /// Body was well formed but carried no usable action list.
    DataError,
    /// The request did not settle before the deadline.
    Timeout,
    /// The service could not be reached.
    NetworkError,
    /// Anything else.
    Error,
}

impl QueryStatus {
    /// True only for [`QueryStatus::Success`].
    pub fn is_success(self) -> bool {
        matches!(self, QueryStatus::Success)
    }

    /// Wire representation, identical to the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            QueryStatus::Success => "SUCCESS",
            QueryStatus::ClientError => "CLIENT_ERROR",
            QueryStatus::ServerError => "SERVER_ERROR",
            QueryStatus::ParseError => "PARSE_ERROR",
            QueryStatus::ApiError => "API_ERROR",
            QueryStatus::Unsupported => "UNSUPPORTED",
            QueryStatus::Miss => "MISS",
            QueryStatus::DataError => "DATA_ERROR",
            QueryStatus::Timeout => "TIMEOUT",
            QueryStatus::NetworkError => "NETWORK_ERROR",
            QueryStatus::Error => "ERROR",
        }
    }
}

/// Where the strategy carried by an envelope came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EnvelopeSource {
    /// Fresh data returned by the service for this call.
    Network,
    /// The call failed; `staleData` holds the last good strategy.
    StaleCache,
    /// The call failed and no earlier strategy exists.
    None,
}

/// Pass-through cache tag reported by the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CacheTag {
    /// Served from the service's own store.
    Hit,
    /// Computed on demand by the service.
    Miss,
}

impl CacheTag {
    /// Read `cache_status` from a success payload.
    pub fn from_payload(data: &Value) -> Option<Self> {
        match data.get("cache_status").and_then(Value::as_str) {
            Some("hit") => Some(CacheTag::Hit),
            Some("miss") => Some(CacheTag::Miss),
            _ => None,
        }
    }
}

/// Uniform result returned to every caller of the coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusEnvelope {
    /// Classified outcome.
    pub status: QueryStatus,
    /// Origin of the strategy carried, if any.
    pub source: EnvelopeSource,
    /// Strategy payload, set only on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub data: Option<Value>,
    /// Human readable failure, set only when the call did not succeed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Last successful payload, attached to failures when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub stale_data: Option<Value>,
    /// Age of `stale_data` in whole seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stale_age_seconds: Option<u64>,
    /// Wall-clock duration of the network call that produced this envelope.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

impl StatusEnvelope {
    /// Envelope for a successful call.
    pub fn success(data: Value, latency_ms: Option<u64>) -> Self {
        Self {
            status: QueryStatus::Success,
            source: EnvelopeSource::Network,
            data: Some(data),
            error: None,
            stale_data: None,
            stale_age_seconds: None,
            latency_ms,
        }
    }

    /// Envelope for a failed call, before any stale fallback is attached.
    pub fn failure(status: QueryStatus, error: impl Into<String>, latency_ms: Option<u64>) -> Self {
        Self {
            status,
            source: EnvelopeSource::None,
            data: None,
            error: Some(error.into()),
            stale_data: None,
            stale_age_seconds: None,
            latency_ms,
        }
    }

    /// Attach a stale fallback to a failure envelope.
    pub fn with_stale(mut self, payload: Value, age_seconds: u64) -> Self {
        self.source = EnvelopeSource::StaleCache;
        self.stale_data = Some(payload);
        self.stale_age_seconds = Some(age_seconds);
        self
    }

    /// Payload the presentation layer should show: fresh data, else the stale fallback.
    pub fn display_data(&self) -> Option<&Value> {
        self.data.as_ref().or(self.stale_data.as_ref())
    }
}

/// Single action entry of a strategy payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StrategyAction {
    /// Action label, e.g. `raise_2.5x`.
    pub action: String,
    /// Mix frequency in `0..=1`.
    pub frequency: f64,
    /// Expected value in big blinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ev: Option<f64>,
    /// Bet sizing hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sizing: Option<String>,
}

/// Decode the `actions` list of a strategy payload, skipping malformed entries.
pub fn strategy_actions(data: &Value) -> Vec<StrategyAction> {
    data.get("actions")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

/// Highest-EV action; entries without `ev` rank below any that have one.
pub fn best_action(data: &Value) -> Option<StrategyAction> {
    strategy_actions(data).into_iter().max_by(|a, b| {
        a.ev.unwrap_or(f64::NEG_INFINITY)
            .partial_cmp(&b.ev.unwrap_or(f64::NEG_INFINITY))
            .unwrap_or(Ordering::Equal)
    })
}

/// Actions ordered by descending frequency.
pub fn actions_by_frequency(data: &Value) -> Vec<StrategyAction> {
    let mut actions = strategy_actions(data);
    actions.sort_by(|a, b| b.frequency.partial_cmp(&a.frequency).unwrap_or(Ordering::Equal));
    actions
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn payload() -> Value {
        json!({
            "actions": [
                {"action": "raise_2.5x", "frequency": 0.45, "ev": 2.5},
                {"action": "fold", "frequency": 0.35, "ev": 0.0},
                {"action": "call", "frequency": 0.20, "ev": 1.8},
                {"action": "limp", "frequency": 0.0}
            ],
            "cache_status": "hit"
        })
    }

    #[test]
    fn envelope_uses_camel_case_and_omits_empty_fields() {
        let envelope = StatusEnvelope::failure(QueryStatus::Timeout, "request timed out", Some(5000))
            .with_stale(json!({"actions": []}), 3);

        let encoded = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            encoded,
            json!({
                "status": "TIMEOUT",
                "source": "stale_cache",
                "error": "request timed out",
                "staleData": {"actions": []},
                "staleAgeSeconds": 3,
                "latencyMs": 5000
            })
        );
    }

    #[test]
    fn status_wire_names_match_serde() {
        for status in [
            QueryStatus::Success,
            QueryStatus::DataError,
            QueryStatus::NetworkError,
            QueryStatus::Error,
        ] {
            let encoded = serde_json::to_value(status).unwrap();
            assert_eq!(encoded, json!(status.as_str()));
        }
    }

    #[test]
    fn best_action_picks_highest_ev() {
        let best = best_action(&payload()).unwrap();
        assert_eq!(best.action, "raise_2.5x");
    }

    #[test]
    fn best_action_is_none_without_actions() {
        assert!(best_action(&json!({})).is_none());
    }

    #[test]
    fn actions_sorted_by_frequency() {
        let names: Vec<_> = actions_by_frequency(&payload())
            .into_iter()
            .map(|a| a.action)
            .collect();
        assert_eq!(names, vec!["raise_2.5x", "fold", "call", "limp"]);
    }

    #[test]
    fn cache_tag_reads_pass_through_field() {
        assert_eq!(CacheTag::from_payload(&payload()), Some(CacheTag::Hit));
        assert_eq!(CacheTag::from_payload(&json!({"cache_status": "miss"})), Some(CacheTag::Miss));
        assert_eq!(CacheTag::from_payload(&json!({})), None);
    }
}
