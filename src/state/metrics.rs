//! Rolling counters and latency history for coordinator observability.

use std::{collections::VecDeque, time::Duration};

use tokio::time::Instant;

use crate::dto::{
    envelope::{CacheTag, QueryStatus},
    format_epoch_ms,
    metrics::{CacheCounts, LatencyStats, MetricsSnapshot, Rates, RequestCounts, RuntimeStatus},
};

/// Latency samples kept for percentile computation.
pub const DEFAULT_LATENCY_WINDOW: usize = 100;
/// Span of the rolling QPS window.
pub const DEFAULT_QPS_WINDOW: Duration = Duration::from_secs(60);

/// Outcome of one admitted call, as seen by the recorder.
#[derive(Debug, Clone)]
pub struct CallOutcome {
    /// Classified status.
    pub status: QueryStatus,
    /// Network call duration.
    pub latency_ms: u64,
    /// Remote cache tag, successes only.
    pub cache: Option<CacheTag>,
    /// Whether a stale fallback was attached.
    pub stale_used: bool,
    /// Failure message.
    pub error: Option<String>,
}

/// Mutable metrics state owned by the coordinator.
#[derive(Debug)]
pub struct MetricsRecorder {
    latency_window: usize,
    qps_window: Duration,
    counts: RequestCounts,
    cache: CacheCounts,
    latencies: VecDeque<u64>,
    success_times: VecDeque<Instant>,
    last_latency_ms: u64,
    last_error: Option<String>,
    current_status: Option<QueryStatus>,
    last_success_epoch_ms: Option<u64>,
}

impl MetricsRecorder {
    /// Build a recorder keeping `latency_window` samples and a `qps_window` rate window.
    pub fn new(latency_window: usize, qps_window: Duration) -> Self {
        Self {
            latency_window: latency_window.max(1),
            qps_window,
            counts: RequestCounts::default(),
            cache: CacheCounts::default(),
            latencies: VecDeque::with_capacity(latency_window),
            success_times: VecDeque::new(),
            last_latency_ms: 0,
            last_error: None,
            current_status: None,
            last_success_epoch_ms: None,
        }
    }

    /// A call passed the gate and is about to hit the network.
    pub fn record_admitted(&mut self) {
        self.counts.total += 1;
    }

    /// Account for the settlement of a call counted by [`MetricsRecorder::record_admitted`].
    pub fn record(&mut self, outcome: &CallOutcome, now: Instant, now_epoch_ms: u64) {
        self.last_latency_ms = outcome.latency_ms;
        self.current_status = Some(outcome.status);

        if outcome.status.is_success() {
            self.counts.successful += 1;
            self.last_error = None;
            self.last_success_epoch_ms = Some(now_epoch_ms);
            match outcome.cache {
                Some(CacheTag::Hit) => self.cache.hits += 1,
                Some(CacheTag::Miss) => self.cache.misses += 1,
                None => {}
            }
            self.push_latency(outcome.latency_ms);
            self.push_success_time(now);
        } else {
            self.counts.failed += 1;
            self.last_error = outcome.error.clone();
        }

        if outcome.stale_used {
            self.cache.stale_uses += 1;
        }
    }

    /// A caller joined the in-flight call.
    pub fn record_reused(&mut self) {
        self.counts.reused += 1;
        self.counts.throttled += 1;
    }

    /// A caller was answered with the previous envelope.
    pub fn record_skipped(&mut self) {
        self.counts.skipped += 1;
        self.counts.throttled += 1;
    }

    /// A payload failed validation; nothing but the last error changes.
    pub fn record_validation_error(&mut self, message: String) {
        self.last_error = Some(message);
    }

    /// Status of the most recently settled call, if any.
    pub fn current_status(&self) -> Option<QueryStatus> {
        self.current_status
    }

    /// Compute a snapshot without mutating the recorder.
    pub fn snapshot(&self, now: Instant) -> MetricsSnapshot {
        let mut sorted: Vec<u64> = self.latencies.iter().copied().collect();
        sorted.sort_unstable();

        let avg = if sorted.is_empty() {
            0
        } else {
            (sorted.iter().sum::<u64>() as f64 / sorted.len() as f64).round() as u64
        };

        let window_secs = self.qps_window.as_secs_f64();
        let recent = self
            .success_times
            .iter()
            .filter(|at| now.saturating_duration_since(**at) <= self.qps_window)
            .count();
        let qps = if window_secs > 0.0 {
            round_to(recent as f64 / window_secs, 2)
        } else {
            0.0
        };

        let total = self.counts.total;
        MetricsSnapshot {
            requests: self.counts.clone(),
            rates: Rates {
                hit_rate_percent: percent(self.cache.hits, self.cache.hits + self.cache.misses),
                stale_rate_percent: percent(self.cache.stale_uses, total),
                error_rate_percent: percent(self.counts.failed, total),
                success_rate_percent: percent(self.counts.successful, total),
                qps,
            },
            latency_ms: LatencyStats {
                p50: percentile(&sorted, 0.50),
                p95: percentile(&sorted, 0.95),
                p99: percentile(&sorted, 0.99),
                avg,
                last: self.last_latency_ms,
                sample_size: sorted.len(),
            },
            cache: self.cache.clone(),
            runtime: RuntimeStatus {
                last_error: self.last_error.clone(),
                current_status: self.current_status,
                last_successful_at: self.last_success_epoch_ms.map(format_epoch_ms),
            },
        }
    }

    /// Drop every counter and sample.
    pub fn reset(&mut self) {
        *self = Self::new(self.latency_window, self.qps_window);
    }

    fn push_latency(&mut self, latency_ms: u64) {
        if self.latencies.len() == self.latency_window {
            self.latencies.pop_front();
        }
        self.latencies.push_back(latency_ms);
    }

    fn push_success_time(&mut self, now: Instant) {
        self.success_times.push_back(now);
        while let Some(oldest) = self.success_times.front() {
            if now.saturating_duration_since(*oldest) > self.qps_window {
                self.success_times.pop_front();
            } else {
                break;
            }
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new(DEFAULT_LATENCY_WINDOW, DEFAULT_QPS_WINDOW)
    }
}

/// Value at index `floor(len * p)` of an ascending slice, 0 when empty.
fn percentile(sorted: &[u64], p: f64) -> u64 {
    if sorted.is_empty() {
        return 0;
    }
    let index = ((sorted.len() as f64) * p).floor() as usize;
    sorted[index.min(sorted.len() - 1)]
}

/// `part / whole` as a percentage with one decimal; 0 for an empty denominator.
fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round_to(part as f64 / whole as f64 * 100.0, 1)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
