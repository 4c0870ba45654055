//! Resilient query coordinator: validation, admission, execution, classification,
//! stale fallback and metrics for one logical query stream.

use std::{sync::Arc, time::Duration};

use futures::FutureExt;
use tokio::{sync::Mutex, time::Instant};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    dao::strategy_api::StrategyTransport,
    dto::{
        envelope::{QueryStatus, StatusEnvelope},
        metrics::MetricsSnapshot,
        now_epoch_ms,
        query::Query,
        validation::missing_required_fields,
    },
    error::CoordinatorError,
    services::{
        classifier::{Classification, classify},
        executor::{CancelSignal, DEFAULT_REQUEST_TIMEOUT, QueryExecutor},
    },
    state::{
        gate::{GateDecision, InFlight, RateGate},
        metrics::{CallOutcome, DEFAULT_LATENCY_WINDOW, DEFAULT_QPS_WINDOW, MetricsRecorder},
        stale_cache::StaleCache,
    },
};

/// Minimum spacing between admitted calls.
pub const DEFAULT_MIN_QUERY_INTERVAL: Duration = Duration::from_millis(1_000);

/// Tunables for a [`Coordinator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Minimum spacing between admitted calls.
    pub min_query_interval: Duration,
    /// Deadline for one network call.
    pub request_timeout: Duration,
    /// Successful latencies kept for percentiles.
    pub latency_window: usize,
    /// Span of the success window behind `qps`.
    pub qps_window: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            min_query_interval: DEFAULT_MIN_QUERY_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            latency_window: DEFAULT_LATENCY_WINDOW,
            qps_window: DEFAULT_QPS_WINDOW,
        }
    }
}

/// State guarded by the coordinator's single lock.
struct CoordinatorState {
    gate: RateGate,
    stale: StaleCache,
    metrics: MetricsRecorder,
    /// Bumped on reset so calls admitted earlier cannot write into the fresh state.
    epoch: u64,
}

impl CoordinatorState {
    /// Fold a settled call into the state and build the envelope its callers receive.
    fn settle(
        &mut self,
        call_id: Uuid,
        epoch: u64,
        classification: Classification,
        latency_ms: u64,
    ) -> StatusEnvelope {
        let now = Instant::now();
        let current = epoch == self.epoch;
        let Classification {
            status,
            data,
            error,
            cache,
        } = classification;

        let mut stale_used = false;
        let envelope = match data {
            Some(data) if status.is_success() => {
                if current {
                    self.stale.store(data.clone(), now);
                }
                StatusEnvelope::success(data, Some(latency_ms))
            }
            _ => {
                let message = error.unwrap_or_else(|| status.as_str().to_string());
                let envelope = self
                    .stale
                    .attach(StatusEnvelope::failure(status, message, Some(latency_ms)), now);
                stale_used = envelope.stale_data.is_some();
                envelope
            }
        };

        if current {
            self.metrics.record(
                &CallOutcome {
                    status,
                    latency_ms,
                    cache,
                    stale_used,
                    error: envelope.error.clone(),
                },
                now,
                now_epoch_ms(),
            );
            self.gate.remember(envelope.clone());
        }
        self.gate.settle(call_id);

        envelope
    }
}

/// Coordinates every strategy query issued on behalf of one caller stream.
///
/// Cloning is cheap and every clone shares the same gate, cache and metrics.
#[derive(Clone)]
pub struct Coordinator {
    executor: Arc<QueryExecutor>,
    state: Arc<Mutex<CoordinatorState>>,
}

impl Coordinator {
    /// Build a coordinator issuing calls through `transport`.
    pub fn new(transport: Arc<dyn StrategyTransport>, config: CoordinatorConfig) -> Self {
        let state = CoordinatorState {
            gate: RateGate::new(config.min_query_interval),
            stale: StaleCache::new(),
            metrics: MetricsRecorder::new(config.latency_window, config.qps_window),
            epoch: 0,
        };
        Self {
            executor: Arc::new(QueryExecutor::new(transport, config.request_timeout)),
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Query the strategy service, never failing except for a malformed payload.
    ///
    /// Concurrent callers share the call in flight; callers arriving within the minimum
    /// interval of the last admitted call get the previous envelope back immediately.
    pub async fn query(&self, query: Query) -> Result<StatusEnvelope, CoordinatorError> {
        let missing = missing_required_fields(&query);
        if !missing.is_empty() {
            let err = CoordinatorError::Validation { missing };
            warn!(error = %err, "rejecting malformed query");
            self.state
                .lock()
                .await
                .metrics
                .record_validation_error(err.to_string());
            return Err(err);
        }

        let pending = {
            let mut state = self.state.lock().await;
            let now = Instant::now();
            match state.gate.decide(now) {
                GateDecision::Reuse(pending) => {
                    state.metrics.record_reused();
                    debug!("joining query already in flight");
                    pending
                }
                GateDecision::Skip(previous) => {
                    state.metrics.record_skipped();
                    debug!(status = previous.status.as_str(), "interval not elapsed; serving previous result");
                    return Ok(previous);
                }
                GateDecision::Admit => {
                    state.metrics.record_admitted();
                    let call_id = Uuid::new_v4();
                    let pending = self.spawn_call(call_id, state.epoch, query);
                    state.gate.admit(call_id, pending.clone(), now);
                    pending
                }
            }
        };

        Ok(pending.await)
    }

    /// Clear counters, the stale cache and the previous result. An in-flight call keeps running.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.epoch += 1;
        state.gate.reset();
        state.stale.clear();
        state.metrics.reset();
        info!(in_flight = state.gate.has_in_flight(), "coordinator state reset");
    }

    /// Current metrics view.
    pub async fn snapshot(&self) -> MetricsSnapshot {
        self.state.lock().await.metrics.snapshot(Instant::now())
    }

    /// Status of the most recently settled call, if any.
    pub async fn current_status(&self) -> Option<QueryStatus> {
        self.state.lock().await.metrics.current_status()
    }

    /// Spawn the network call so it settles even if every waiter goes away.
    fn spawn_call(&self, call_id: Uuid, epoch: u64, query: Query) -> InFlight {
        let executor = self.executor.clone();
        let state = self.state.clone();
        let task = tokio::spawn(run_call(executor, state.clone(), call_id, epoch, query));

        async move {
            match task.await {
                Ok(envelope) => envelope,
                Err(join_err) => {
                    error!(%call_id, error = %join_err, "query task aborted");
                    state.lock().await.gate.settle(call_id);
                    StatusEnvelope::failure(
                        QueryStatus::Error,
                        format!("query task aborted: {join_err}"),
                        None,
                    )
                }
            }
        }
        .boxed()
        .shared()
    }
}

async fn run_call(
    executor: Arc<QueryExecutor>,
    state: Arc<Mutex<CoordinatorState>>,
    call_id: Uuid,
    epoch: u64,
    query: Query,
) -> StatusEnvelope {
    let cancel = CancelSignal::new();
    let execution = executor.execute(query, &cancel).await;
    let classification = classify(&execution.outcome);

    let envelope = state
        .lock()
        .await
        .settle(call_id, epoch, classification, execution.latency_ms);

    if envelope.status.is_success() {
        info!(%call_id, latency_ms = execution.latency_ms, "strategy query succeeded");
    } else {
        warn!(
            %call_id,
            status = envelope.status.as_str(),
            latency_ms = execution.latency_ms,
            error = envelope.error.as_deref().unwrap_or_default(),
            stale = envelope.stale_data.is_some(),
            "strategy query failed"
        );
    }

    envelope
}
