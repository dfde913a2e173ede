//! Configuration for the processing monitor.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::errors::{ConfigError, StagewatchError};

/// Environment variable overriding [`MonitorConfig::endpoint`].
pub const ENV_ENDPOINT: &str = "STAGEWATCH_ENDPOINT";
/// Environment variable overriding [`MonitorConfig::reconnect_delay_ms`].
pub const ENV_RECONNECT_DELAY_MS: &str = "STAGEWATCH_RECONNECT_DELAY_MS";
/// Environment variable overriding [`MonitorConfig::connect_timeout_seconds`].
pub const ENV_CONNECT_TIMEOUT_SECONDS: &str = "STAGEWATCH_CONNECT_TIMEOUT_SECONDS";

/// Configuration for the event stream and its consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Server-push endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Fixed delay before reconnecting after a transport error.
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
    /// Timeout for establishing the stream, in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: f64,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Number of most recent log rows always shown.
    #[serde(default = "default_recent_window")]
    pub recent_window: usize,
    /// Additional headers sent when opening the stream.
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

fn default_endpoint() -> String {
    "http://localhost:8000/api/v1/sse/stream".to_string()
}

fn default_reconnect_delay_ms() -> u64 {
    3_000
}

fn default_connect_timeout() -> f64 {
    10.0
}

fn default_user_agent() -> String {
    concat!("stagewatch/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_recent_window() -> usize {
    3
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
            connect_timeout_seconds: default_connect_timeout(),
            user_agent: default_user_agent(),
            recent_window: default_recent_window(),
            headers: HashMap::new(),
        }
    }
}

impl MonitorConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the reconnect delay.
    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, seconds: f64) -> Self {
        self.connect_timeout_seconds = seconds;
        self
    }

    /// Sets the recent log window.
    #[must_use]
    pub fn with_recent_window(mut self, rows: usize) -> Self {
        self.recent_window = rows;
        self
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Gets the reconnect delay as Duration.
    #[must_use]
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    /// Gets the connect timeout as Duration, saturating out-of-range values.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::try_from_secs_f64(self.connect_timeout_seconds.max(0.0)).unwrap_or(Duration::MAX)
    }

    /// Parses a configuration from JSON; missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Loads a configuration from a JSON file, applies environment overrides
    /// and validates the result.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StagewatchError> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_json(&raw)?.with_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Applies overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from a key lookup.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(endpoint) = lookup(ENV_ENDPOINT) {
            self.endpoint = endpoint;
        }
        if let Some(delay) = lookup(ENV_RECONNECT_DELAY_MS) {
            self.reconnect_delay_ms = delay
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid("reconnect_delay_ms", format!("not an integer: {delay}")))?;
        }
        if let Some(timeout) = lookup(ENV_CONNECT_TIMEOUT_SECONDS) {
            self.connect_timeout_seconds = timeout
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid("connect_timeout_seconds", format!("not a number: {timeout}")))?;
        }
        Ok(self)
    }

    /// Checks that the configuration is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::invalid("endpoint", "must not be empty"));
        }
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(ConfigError::invalid("endpoint", "must be an http(s) URL"));
        }
        if self.reconnect_delay_ms == 0 {
            return Err(ConfigError::invalid("reconnect_delay_ms", "must be greater than zero"));
        }
        if !self.connect_timeout_seconds.is_finite() || self.connect_timeout_seconds <= 0.0 {
            return Err(ConfigError::invalid("connect_timeout_seconds", "must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = MonitorConfig::default();
        assert_eq!(config.endpoint, "http://localhost:8000/api/v1/sse/stream");
        assert_eq!(config.reconnect_delay(), Duration::from_secs(3));
        assert_eq!(config.recent_window, 3);
        assert!(config.user_agent.starts_with("stagewatch/"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = MonitorConfig::new()
            .with_endpoint("https://stp.example.com/api/v1/sse/stream")
            .with_reconnect_delay(Duration::from_millis(250))
            .with_header("X-Client", "kiosk");
        assert_eq!(config.reconnect_delay_ms, 250);
        assert_eq!(config.headers.get("X-Client"), Some(&"kiosk".to_string()));
    }

    #[test]
    fn test_from_json_partial() {
        let config = MonitorConfig::from_json(r#"{"reconnect_delay_ms": 500}"#).unwrap();
        assert_eq!(config.reconnect_delay_ms, 500);
        assert_eq!(config.endpoint, default_endpoint());
        assert!(MonitorConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_overrides() {
        let config = MonitorConfig::default()
            .with_overrides(|key| match key {
                ENV_ENDPOINT => Some("https://other/stream".to_string()),
                ENV_RECONNECT_DELAY_MS => Some(" 1500 ".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.endpoint, "https://other/stream");
        assert_eq!(config.reconnect_delay_ms, 1500);

        let err = MonitorConfig::default()
            .with_overrides(|key| (key == ENV_RECONNECT_DELAY_MS).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref field, .. } if field == "reconnect_delay_ms"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(MonitorConfig::new().with_endpoint("").validate().is_err());
        assert!(MonitorConfig::new().with_endpoint("ws://x/stream").validate().is_err());
        assert!(MonitorConfig::new()
            .with_reconnect_delay(Duration::ZERO)
            .validate()
            .is_err());
        assert!(MonitorConfig::new().with_connect_timeout(0.0).validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"endpoint": "https://stp.example.com/stream", "recent_window": 5}}"#).unwrap();

        let config = MonitorConfig::load(file.path()).unwrap();
        assert_eq!(config.recent_window, 5);
    }

    #[test]
    fn test_load_missing_file() {
        let err = MonitorConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, StagewatchError::Io(_)));
    }
}
