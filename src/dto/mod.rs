use std::time::{Duration, SystemTime, UNIX_EPOCH};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Capture driver status.
pub mod capture;
/// Status envelope and strategy payload views.
pub mod envelope;
/// Health check response.
pub mod health;
/// Metrics snapshot.
pub mod metrics;
/// Query payload and hand state.
pub mod query;
/// Required-field checks for queries.
pub mod validation;

/// Milliseconds since the Unix epoch for the current wall-clock time.
pub fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}

/// Format an epoch-millisecond timestamp as RFC3339.
pub fn format_epoch_ms(epoch_ms: u64) -> String {
    format_system_time(UNIX_EPOCH + Duration::from_millis(epoch_ms))
}

fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_epoch_ms_as_rfc3339() {
        assert_eq!(format_epoch_ms(0), "1970-01-01T00:00:00Z");
        assert_eq!(format_epoch_ms(86_400_000), "1970-01-02T00:00:00Z");
    }
}
