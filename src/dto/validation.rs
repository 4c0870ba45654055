//! Validation helpers for inbound query payloads.

use crate::dto::query::Query;

/// Keys every query must carry with a non-null value.
pub const REQUIRED_FIELDS: [&str; 7] = [
    "hand_id",
    "table_id",
    "street",
    "hero_pos",
    "effective_stack_bb",
    "pot_bb",
    "action_line",
];

/// Return the required keys that are absent or `null`, in declaration order.
///
/// An empty vector means the payload satisfies the contract.
///
/// # Examples
///
/// ```ignore
/// missing_required_fields(&full_query)         // []
/// missing_required_fields(&Query::new())       // all seven keys
/// ```
pub fn missing_required_fields(query: &Query) -> Vec<&'static str> {
    REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !query.has_value(field))
        .collect()
}
