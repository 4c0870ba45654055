//! Scripted in-memory transport used by coordinator tests.

use std::{
    collections::VecDeque,
    io,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use futures::future::BoxFuture;
use serde_json::{Value, json};

use crate::dto::query::Query;

use super::{RawResponse, StrategyTransport, TransportError, TransportResult};

/// What the fake answers for one call.
#[derive(Debug, Clone)]
pub enum Reply {
    Respond { status: u16, body: String },
    Refused,
    Fail(String),
}

impl Reply {
    pub fn json(status: u16, body: Value) -> Self {
        Reply::Respond {
            status,
            body: body.to_string(),
        }
    }

    /// HTTP 200 with a single-action strategy.
    pub fn strategy(action: &str, cache_status: &str) -> Self {
        Reply::json(
            200,
            json!({
                "success": true,
                "data": {
                    "actions": [{"action": action, "frequency": 0.6, "ev": 1.2}],
                    "cache_status": cache_status
                }
            }),
        )
    }

    fn into_result(self) -> TransportResult<RawResponse> {
        match self {
            Reply::Respond { status, body } => Ok(RawResponse { status, body }),
            Reply::Refused => Err(TransportError::network(io::Error::from(
                io::ErrorKind::ConnectionRefused,
            ))),
            Reply::Fail(message) => Err(TransportError::Other { message }),
        }
    }
}

/// Transport answering from a queue of `(delay, reply)` steps.
///
/// Once the queue is drained every further call is refused.
#[derive(Default)]
pub struct ScriptedTransport {
    steps: Mutex<VecDeque<(Duration, Reply)>>,
    calls: AtomicUsize,
    received: Mutex<Vec<Query>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(self, delay: Duration, reply: Reply) -> Self {
        self.steps.lock().unwrap().push_back((delay, reply));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn received(&self) -> Vec<Query> {
        self.received.lock().unwrap().clone()
    }
}

impl StrategyTransport for ScriptedTransport {
    fn post_query(&self, query: Query) -> BoxFuture<'static, TransportResult<RawResponse>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.received.lock().unwrap().push(query);
        let (delay, reply) = self
            .steps
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or((Duration::ZERO, Reply::Refused));
        Box::pin(async move {
            tokio::time::sleep(delay).await;
            reply.into_result()
        })
    }
}
