use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::envelope::QueryStatus;

/// Point-in-time view of the coordinator's rolling metrics.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MetricsSnapshot {
    /// Call counters.
    pub requests: RequestCounts,
    /// Derived rates.
    pub rates: Rates,
    /// Latency distribution in milliseconds.
    pub latency_ms: LatencyStats,
    /// Cache counters.
    pub cache: CacheCounts,
    /// Latest status and error.
    pub runtime: RuntimeStatus,
}

/// Call counters since construction or the last reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct RequestCounts {
    /// Calls admitted through to the network.
    pub total: u64,
    /// Admitted calls classified `SUCCESS`.
    pub successful: u64,
    /// Admitted calls classified as anything else.
    pub failed: u64,
    /// Calls answered without a new network request (`skipped + reused`).
    pub throttled: u64,
    /// Calls answered with the previous envelope because the interval had not elapsed.
    pub skipped: u64,
    /// Calls that joined an in-flight request.
    pub reused: u64,
}

/// Derived ratios, expressed as percentages except `qps`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct Rates {
    /// `hits / (hits + misses)`.
    pub hit_rate_percent: f64,
    /// `stale_uses / total`.
    pub stale_rate_percent: f64,
    /// `failed / total`.
    pub error_rate_percent: f64,
    /// `successful / total`.
    pub success_rate_percent: f64,
    /// Successful calls per second over the rolling window.
    pub qps: f64,
}

/// Latency distribution over the most recent successful calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct LatencyStats {
    /// Median.
    pub p50: u64,
    /// 95th percentile.
    pub p95: u64,
    /// 99th percentile.
    pub p99: u64,
    /// Rounded mean.
    pub avg: u64,
    /// Latency of the most recent admitted call, whatever its outcome.
    pub last: u64,
    /// Samples currently in the window.
    pub sample_size: usize,
}

/// Remote cache tags and local stale fallbacks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct CacheCounts {
    /// Successes the service tagged `hit`.
    pub hits: u64,
    /// Successes the service tagged `miss`.
    pub misses: u64,
    /// Failures answered with a stale fallback.
    pub stale_uses: u64,
}

/// Last observed status and error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct RuntimeStatus {
    /// Message of the latest failure or validation error; cleared by a success.
    pub last_error: Option<String>,
    /// Status of the most recently settled call.
    pub current_status: Option<QueryStatus>,
    /// RFC3339 time of the last successful call.
    pub last_successful_at: Option<String>,
}
