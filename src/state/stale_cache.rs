//! Last-known-good strategy kept as a fallback for failed calls.

use serde_json::Value;
use tokio::time::Instant;

use crate::dto::envelope::StatusEnvelope;

/// Last successful strategy payload and when it was captured.
#[derive(Debug, Clone, PartialEq)]
pub struct StaleCacheEntry {
    /// `data` object of the successful response.
    pub payload: Value,
    /// Monotonic capture time used to age the entry.
    pub captured_at: Instant,
}

/// Single-slot fallback store, only ever used to augment failure envelopes.
#[derive(Debug, Default)]
pub struct StaleCache {
    entry: Option<StaleCacheEntry>,
}

impl StaleCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the entry with a fresh successful payload.
    pub fn store(&mut self, payload: Value, captured_at: Instant) {
        self.entry = Some(StaleCacheEntry {
            payload,
            captured_at,
        });
    }

    /// Current entry, if a call has succeeded since the last clear.
    pub fn entry(&self) -> Option<&StaleCacheEntry> {
        self.entry.as_ref()
    }

    /// Attach the entry to a failure envelope, aged to whole seconds at `now`.
    ///
    /// The envelope comes back unchanged when the cache is empty.
    pub fn attach(&self, envelope: StatusEnvelope, now: Instant) -> StatusEnvelope {
        match &self.entry {
            Some(entry) => {
                let age = now.saturating_duration_since(entry.captured_at);
                envelope.with_stale(entry.payload.clone(), age.as_secs_f64().round() as u64)
            }
            None => envelope,
        }
    }

    /// Drop the entry.
    pub fn clear(&mut self) {
        self.entry = None;
    }
}
