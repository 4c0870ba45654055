//! Maps raw transport outcomes onto [`QueryStatus`] values.
//!
//! Order matters: the HTTP status is checked before the body shape, and an explicit
//! `success: false` wins over the action-list check.

use serde_json::Value;

use crate::{
    dao::strategy_api::{RawResponse, TransportError, TransportResult},
    dto::envelope::{CacheTag, QueryStatus},
};

/// Result of classifying one call.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Classified status.
    pub status: QueryStatus,
    /// The body's `data` object, only on success.
    pub data: Option<Value>,
    /// Failure message, absent on success.
    pub error: Option<String>,
    /// Remote cache tag, only on success.
    pub cache: Option<CacheTag>,
}

impl Classification {
    fn success(data: Value) -> Self {
        let cache = CacheTag::from_payload(&data);
        Self {
            status: QueryStatus::Success,
            data: Some(data),
            error: None,
            cache,
        }
    }

    fn failure(status: QueryStatus, error: impl Into<String>) -> Self {
        Self {
            status,
            data: None,
            error: Some(error.into()),
            cache: None,
        }
    }
}

/// Classify a transport outcome. Total: every input yields exactly one status.
pub fn classify(outcome: &TransportResult<RawResponse>) -> Classification {
    match outcome {
        Ok(response) => classify_response(response),
        Err(err) => classify_transport_error(err),
    }
}

fn classify_transport_error(err: &TransportError) -> Classification {
    match err {
        TransportError::Timeout => Classification::failure(QueryStatus::Timeout, err.to_string()),
        TransportError::Network { .. } => {
            Classification::failure(QueryStatus::NetworkError, err.to_string())
        }
        TransportError::Other { message } => {
            Classification::failure(failure_kind(None, message).unwrap_or(QueryStatus::Error), message)
        }
        TransportError::Cancelled | TransportError::ClientBuilder { .. } => {
            Classification::failure(QueryStatus::Error, err.to_string())
        }
    }
}

fn classify_response(response: &RawResponse) -> Classification {
    match response.status {
        200..=299 => {}
        400..=499 => {
            return Classification::failure(
                QueryStatus::ClientError,
                format!("HTTP error: {}", response.status),
            );
        }
        500..=599 => {
            return Classification::failure(
                QueryStatus::ServerError,
                format!("HTTP error: {}", response.status),
            );
        }
        other => {
            return Classification::failure(
                QueryStatus::Error,
                format!("unexpected HTTP status: {other}"),
            );
        }
    }

    let body = match serde_json::from_str::<Value>(&response.body) {
        Ok(Value::Object(body)) => body,
        _ => {
            return Classification::failure(
                QueryStatus::ParseError,
                "response body is not a JSON object",
            );
        }
    };

    if body.get("success") == Some(&Value::Bool(false)) {
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("service reported failure");
        let code = body.get("error_code").and_then(Value::as_str);
        let status = failure_kind(code, message).unwrap_or(QueryStatus::ApiError);
        return Classification::failure(status, format!("API error: {message}"));
    }

    let data = body.get("data");
    let has_actions = data
        .and_then(|data| data.get("actions"))
        .and_then(Value::as_array)
        .is_some_and(|actions| !actions.is_empty());

    match data {
        Some(data) if has_actions => Classification::success(data.clone()),
        _ => Classification::failure(
            QueryStatus::DataError,
            "response is missing strategy actions",
        ),
    }
}

/// Sub-classify a failure as unsupported or miss.
///
/// A structured `error_code` wins. Otherwise falls back to best-effort keyword
/// matching on the message, which the service does not guarantee to keep stable.
fn failure_kind(code: Option<&str>, message: &str) -> Option<QueryStatus> {
    match code.map(str::to_ascii_uppercase).as_deref() {
        Some("UNSUPPORTED") => return Some(QueryStatus::Unsupported),
        Some("MISS") | Some("NOT_FOUND") => return Some(QueryStatus::Miss),
        _ => {}
    }

    let lowered = message.to_lowercase();
    if lowered.contains("unsupported") || lowered.contains("不支持") {
        return Some(QueryStatus::Unsupported);
    }

    let miss_word = lowered
        .split(|c: char| !c.is_alphanumeric())
        .any(|word| word == "miss" || word == "missed");
    if miss_word || lowered.contains("not found") || lowered.contains("未命中") {
        return Some(QueryStatus::Miss);
    }

    None
}
