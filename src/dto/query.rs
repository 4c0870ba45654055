use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// Query payload forwarded verbatim to the strategy service.
///
/// Keys keep their insertion order so the outbound JSON body mirrors what the
/// extractor produced. Keys beyond the required set are passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct Query(IndexMap<String, Value>);

impl Query {
    /// Create an empty query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a key, returning the query for chaining.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Remove a key, returning its previous value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    /// Borrow the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// True when `key` exists and is not JSON `null`.
    pub fn has_value(&self, key: &str) -> bool {
        self.0.get(key).is_some_and(|value| !value.is_null())
    }
}

/// Structured table situation produced by the state extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HandState {
    /// Identifier of the hand, stable across its frames.
    pub hand_id: String,
    /// Table the hand is played at.
    pub table_id: String,
    /// One of `preflop`, `flop`, `turn`, `river`.
    pub street: String,
    /// Seat label such as `BTN`, `SB`, `BB`, `UTG`, `MP`, `CO`.
    pub hero_pos: String,
    /// Smaller of hero's and villain's stacks, in big blinds.
    pub effective_stack_bb: f64,
    /// Pot size in big blinds.
    pub pot_bb: f64,
    /// Actions taken so far, joined with `_`.
    pub action_line: String,
    /// RFC3339 capture time, passed through to the service.
    pub timestamp: String,
}

impl From<HandState> for Query {
    fn from(state: HandState) -> Self {
        Query::new()
            .with("hand_id", state.hand_id)
            .with("table_id", state.table_id)
            .with("street", state.street)
            .with("hero_pos", state.hero_pos)
            .with("effective_stack_bb", state.effective_stack_bb)
            .with("pot_bb", state.pot_bb)
            .with("action_line", state.action_line)
            .with("timestamp", state.timestamp)
    }
}
