//! Admission control in front of the strategy service.

use std::time::Duration;

use futures::future::{BoxFuture, Shared};
use tokio::time::Instant;
use uuid::Uuid;

use crate::dto::envelope::StatusEnvelope;

/// Pending call that every concurrent caller awaits.
pub type InFlight = Shared<BoxFuture<'static, StatusEnvelope>>;

/// Handle to the single call currently admitted through the gate.
struct InFlightHandle {
    call_id: Uuid,
    future: InFlight,
}

/// What the gate decided for an incoming call.
pub enum GateDecision {
    /// Join the call already in flight.
    Reuse(InFlight),
    /// Answer with the previous envelope without contacting the service.
    Skip(StatusEnvelope),
    /// Issue a new network call.
    Admit,
}

/// Enforces at most one outstanding call and a minimum spacing between admitted calls.
///
/// The gate holds no lock of its own; the owner must evaluate [`RateGate::decide`] and
/// [`RateGate::admit`] under a single critical section so no other caller can observe
/// the gap between the two.
pub struct RateGate {
    min_interval: Duration,
    last_start: Option<Instant>,
    in_flight: Option<InFlightHandle>,
    last_result: Option<StatusEnvelope>,
}

impl RateGate {
    /// Create a gate admitting at most one call per `min_interval`.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_start: None,
            in_flight: None,
            last_result: None,
        }
    }

    /// Decide how to serve a call arriving at `now`. Does not mutate the gate.
    pub fn decide(&self, now: Instant) -> GateDecision {
        if let Some(handle) = &self.in_flight {
            return GateDecision::Reuse(handle.future.clone());
        }

        if let (Some(started), Some(previous)) = (self.last_start, &self.last_result) {
            if now.saturating_duration_since(started) < self.min_interval {
                return GateDecision::Skip(previous.clone());
            }
        }

        GateDecision::Admit
    }

    /// Register `future` as the call in flight, started at `now`.
    pub fn admit(&mut self, call_id: Uuid, future: InFlight, now: Instant) {
        self.last_start = Some(now);
        self.in_flight = Some(InFlightHandle { call_id, future });
    }

    /// Clear the in-flight handle if it still belongs to `call_id`.
    pub fn settle(&mut self, call_id: Uuid) -> bool {
        match &self.in_flight {
            Some(handle) if handle.call_id == call_id => {
                self.in_flight = None;
                true
            }
            _ => false,
        }
    }

    /// Remember the envelope served to skipped callers.
    pub fn remember(&mut self, envelope: StatusEnvelope) {
        self.last_result = Some(envelope);
    }

    /// Forget timing and the previous result. An in-flight call is left alone.
    pub fn reset(&mut self) {
        self.last_start = None;
        self.last_result = None;
    }

    /// True while an admitted call has not settled.
    pub fn has_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }
}
