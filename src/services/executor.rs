//! Single outbound call under a deadline, with a cancel signal that records why it fired.

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::watch,
    time::{Instant, sleep},
};

use crate::{
    dao::strategy_api::{RawResponse, StrategyTransport, TransportError, TransportResult},
    dto::query::Query,
};

/// Deadline applied to every outbound query.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(5_000);

/// Why a pending call was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The request deadline elapsed.
    Timeout,
    /// Someone gave up on the call explicitly.
    Caller,
}

/// One-shot cancellation signal shared between the executor and whoever may cancel.
///
/// The first reason recorded wins; later calls to [`CancelSignal::cancel`] are ignored.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    tx: Arc<watch::Sender<Option<CancelReason>>>,
}

impl CancelSignal {
    /// Create a signal that has not fired.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Fire the signal, returning false when it had already fired.
    pub fn cancel(&self, reason: CancelReason) -> bool {
        self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason);
            true
        })
    }

    /// Reason the signal fired with, if it has.
    pub fn reason(&self) -> Option<CancelReason> {
        *self.tx.borrow()
    }

    /// Resolve once the signal fires.
    pub async fn cancelled(&self) -> CancelReason {
        let mut rx = self.tx.subscribe();
        let fired = rx.wait_for(Option::is_some).await.ok().and_then(|reason| *reason);
        match fired {
            Some(reason) => reason,
            None => std::future::pending().await,
        }
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of one admitted call together with its wall-clock latency.
#[derive(Debug)]
pub struct Execution {
    /// Response or transport failure.
    pub outcome: TransportResult<RawResponse>,
    /// Time from issuing the request to settlement.
    pub latency_ms: u64,
}

/// Issues a single outbound query under a fixed deadline.
pub struct QueryExecutor {
    transport: Arc<dyn StrategyTransport>,
    timeout: Duration,
}

impl QueryExecutor {
    /// Executor posting through `transport` with the given per-call deadline.
    pub fn new(transport: Arc<dyn StrategyTransport>, timeout: Duration) -> Self {
        Self { transport, timeout }
    }

    /// Run the query until it settles, the deadline passes, or `cancel` fires.
    ///
    /// The deadline is delivered through `cancel` so the outcome can tell a timeout
    /// apart from a caller cancellation.
    pub async fn execute(&self, query: Query, cancel: &CancelSignal) -> Execution {
        let started = Instant::now();
        let request = self.transport.post_query(query);

        let deadline = {
            let cancel = cancel.clone();
            let timeout = self.timeout;
            async move {
                sleep(timeout).await;
                cancel.cancel(CancelReason::Timeout);
            }
        };

        let outcome = tokio::select! {
            biased;
            result = request => result,
            reason = cancel.cancelled() => Err(match reason {
                CancelReason::Timeout => TransportError::Timeout,
                CancelReason::Caller => TransportError::Cancelled,
            }),
            () = deadline => Err(TransportError::Timeout),
        };

        Execution {
            outcome,
            latency_ms: started.elapsed().as_millis() as u64,
        }
    }
}
