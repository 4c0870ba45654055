use std::time::Duration;

/// Environment variable overriding the strategy service base URL.
pub const BASE_URL_ENV: &str = "STRATEGY_API_URL";
/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
/// Path of the query endpoint below the base URL.
pub const QUERY_PATH: &str = "/v1/strategy/query";

/// Runtime configuration describing how to reach the strategy service.
#[derive(Debug, Clone)]
pub struct StrategyApiConfig {
    /// Scheme, host and port of the service, without the query path.
    pub base_url: String,
    /// Connection establishment limit. The per-request deadline is enforced by the executor.
    pub connect_timeout: Option<Duration>,
}

impl StrategyApiConfig {
    /// Construct a configuration for an explicit base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            connect_timeout: None,
        }
    }

    /// Bound how long connection establishment may take.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Use `STRATEGY_API_URL` when set and non-empty, else `fallback`.
    pub fn from_env_or(fallback: impl Into<String>) -> Self {
        let base_url = std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| fallback.into());
        Self::new(base_url)
    }

    /// Full URL of the query endpoint.
    pub fn query_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), QUERY_PATH)
    }
}

impl Default for StrategyApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_url_joins_without_double_slash() {
        assert_eq!(
            StrategyApiConfig::new("http://localhost:8000/").query_url(),
            "http://localhost:8000/v1/strategy/query"
        );
        assert_eq!(
            StrategyApiConfig::default().query_url(),
            "http://localhost:8000/v1/strategy/query"
        );
    }
}
