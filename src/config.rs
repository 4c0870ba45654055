//! Application-level configuration loading for the coordinator and the capture driver.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    dao::strategy_api::{StrategyApiConfig, config::DEFAULT_BASE_URL},
    services::{
        capture_loop::DEFAULT_CAPTURE_INTERVAL,
        coordinator::{CoordinatorConfig, DEFAULT_MIN_QUERY_INTERVAL},
        executor::DEFAULT_REQUEST_TIMEOUT,
    },
    state::metrics::{DEFAULT_LATENCY_WINDOW, DEFAULT_QPS_WINDOW},
};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "STRATEGY_COORDINATOR_CONFIG_PATH";
/// Connection establishment limit handed to the HTTP client.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    api_base_url: String,
    coordinator: CoordinatorConfig,
    capture_interval: Duration,
    capture_enabled: bool,
}

impl AppConfig {
    /// Load the configuration from disk, falling back to built-in defaults.
    ///
    /// `STRATEGY_API_URL` wins over the file's `api_base_url` when set.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let config = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        api_base_url = %app_config.api_base_url,
                        "loaded coordinator settings from config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };
        config.with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        let api = StrategyApiConfig::from_env_or(self.api_base_url.clone());
        if api.base_url != self.api_base_url {
            info!(api_base_url = %api.base_url, "strategy service url overridden from environment");
            self.api_base_url = api.base_url;
        }
        self
    }

    /// How to reach the strategy service.
    pub fn strategy_api(&self) -> StrategyApiConfig {
        StrategyApiConfig::new(self.api_base_url.clone()).with_connect_timeout(CONNECT_TIMEOUT)
    }

    /// Gate, deadline and metrics window settings.
    pub fn coordinator(&self) -> CoordinatorConfig {
        self.coordinator
    }

    /// Frame tick cadence of the capture driver.
    pub fn capture_interval(&self) -> Duration {
        self.capture_interval
    }

    /// Whether capture starts together with the server.
    pub fn capture_enabled(&self) -> bool {
        self.capture_enabled
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            coordinator: CoordinatorConfig::default(),
            capture_interval: DEFAULT_CAPTURE_INTERVAL,
            capture_enabled: true,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    api_base_url: Option<String>,
    min_query_interval_ms: Option<u64>,
    request_timeout_ms: Option<u64>,
    latency_window: Option<usize>,
    qps_window_secs: Option<u64>,
    capture_interval_ms: Option<u64>,
    capture_enabled: Option<bool>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let api_base_url = value
            .api_base_url
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let coordinator = CoordinatorConfig {
            min_query_interval: positive_ms(
                "min_query_interval_ms",
                value.min_query_interval_ms,
                DEFAULT_MIN_QUERY_INTERVAL,
            ),
            request_timeout: positive_ms(
                "request_timeout_ms",
                value.request_timeout_ms,
                DEFAULT_REQUEST_TIMEOUT,
            ),
            latency_window: match value.latency_window {
                Some(0) => {
                    warn!(
                        field = "latency_window",
                        "zero is not allowed; using default"
                    );
                    DEFAULT_LATENCY_WINDOW
                }
                Some(window) => window,
                None => DEFAULT_LATENCY_WINDOW,
            },
            qps_window: match value.qps_window_secs {
                Some(0) => {
                    warn!(
                        field = "qps_window_secs",
                        "zero is not allowed; using default"
                    );
                    DEFAULT_QPS_WINDOW
                }
                Some(secs) => Duration::from_secs(secs),
                None => DEFAULT_QPS_WINDOW,
            },
        };

        Self {
            api_base_url,
            coordinator,
            capture_interval: positive_ms(
                "capture_interval_ms",
                value.capture_interval_ms,
                DEFAULT_CAPTURE_INTERVAL,
            ),
            capture_enabled: value.capture_enabled.unwrap_or(true),
        }
    }
}

fn positive_ms(field: &'static str, value: Option<u64>, fallback: Duration) -> Duration {
    match value {
        Some(0) => {
            warn!(field, "zero is not allowed; using default");
            fallback
        }
        Some(ms) => Duration::from_millis(ms),
        None => fallback,
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
