//! Harness configuration
//!
//! Layered: built-in defaults, then an optional TOML file, then `IWV_*`
//! environment variables. CLI flags are applied last by the binary.

use crate::error::ConfigError;
use crate::executor::ExecutorConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Default endpoint of the generation service
pub const DEFAULT_ENDPOINT: &str =
    "http://localhost:54321/functions/v1/generate-intelligence-workflows";

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "IWV_";

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Harness configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Generation endpoint URL
    pub endpoint: String,
    /// Per-call timeout in seconds
    pub request_timeout_secs: u64,
    /// Concurrent calls per parallel wave
    pub wave_size: usize,
    /// Delay between sequential remote calls
    pub call_delay_ms: u64,
    /// Delay between parallel waves
    pub wave_delay_ms: u64,
    /// Emit progress every N completed items
    pub progress_interval: usize,
    /// Directory for failure reports
    pub report_dir: PathBuf,
    /// Directory with `input.schema.json` and `output.schema.json`; embedded schemas when unset
    pub schema_dir: Option<PathBuf>,
    pub log_level: String,
    pub log_format: LogFormat,
    /// Sent as a bearer token when present
    pub api_key: Option<String>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_owned(),
            request_timeout_secs: 30,
            wave_size: 5,
            call_delay_ms: 1000,
            wave_delay_ms: 2000,
            progress_interval: 10,
            report_dir: PathBuf::from("test-failures"),
            schema_dir: None,
            log_level: "info".to_owned(),
            log_format: LogFormat::Text,
            api_key: None,
        }
    }
}

impl HarnessConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, optional file, then process environment
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read or parsed, an
    /// environment value is malformed, or the result fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let config = config.with_env(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file; missing keys keep their defaults
    ///
    /// # Errors
    /// `ConfigError::Io` or `ConfigError::Parse`.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Apply `IWV_*` overrides read through `lookup`
    ///
    /// # Errors
    /// `ConfigError::InvalidEnv` for values that do not parse.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(&format!("{ENV_PREFIX}{key}"));

        if let Some(v) = get("ENDPOINT") {
            self.endpoint = v;
        }
        if let Some(v) = get("REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_env("REQUEST_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = get("WAVE_SIZE") {
            self.wave_size = parse_env("WAVE_SIZE", &v)?;
        }
        if let Some(v) = get("CALL_DELAY_MS") {
            self.call_delay_ms = parse_env("CALL_DELAY_MS", &v)?;
        }
        if let Some(v) = get("WAVE_DELAY_MS") {
            self.wave_delay_ms = parse_env("WAVE_DELAY_MS", &v)?;
        }
        if let Some(v) = get("PROGRESS_INTERVAL") {
            self.progress_interval = parse_env("PROGRESS_INTERVAL", &v)?;
        }
        if let Some(v) = get("REPORT_DIR") {
            self.report_dir = PathBuf::from(v);
        }
        if let Some(v) = get("SCHEMA_DIR") {
            self.schema_dir = Some(PathBuf::from(v));
        }
        if let Some(v) = get("LOG_LEVEL") {
            self.log_level = v;
        }
        if let Some(v) = get("LOG_FORMAT") {
            self.log_format = parse_env("LOG_FORMAT", &v)?;
        }
        if let Some(v) = get("API_KEY") {
            self.api_key = Some(v).filter(|key| !key.is_empty());
        }
        Ok(self)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// `ConfigError::Invalid` naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(ConfigError::invalid(
                "endpoint",
                format!("'{}' is not an http(s) URL", self.endpoint),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::invalid("request_timeout_secs", "must be at least 1"));
        }
        if self.wave_size == 0 {
            return Err(ConfigError::invalid("wave_size", "must be at least 1"));
        }
        if self.progress_interval == 0 {
            return Err(ConfigError::invalid("progress_interval", "must be at least 1"));
        }
        Ok(())
    }

    /// With endpoint
    #[inline]
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// With report directory
    #[inline]
    #[must_use]
    pub fn with_report_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.report_dir = dir.into();
        self
    }

    /// Per-call timeout
    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Executor settings derived from this config
    #[must_use]
    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            wave_size: self.wave_size,
            call_delay: Duration::from_millis(self.call_delay_ms),
            wave_delay: Duration::from_millis(self.wave_delay_ms),
            progress_interval: self.progress_interval,
        }
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        var: format!("{ENV_PREFIX}{key}"),
        value: value.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        let config = HarnessConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.wave_size, 5);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.report_dir, PathBuf::from("test-failures"));
    }

    #[test]
    fn file_keeps_defaults_for_missing_keys() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "wave_size = 3\nlog_format = \"json\"").unwrap();

        let config = HarnessConfig::from_file(file.path()).unwrap();
        assert_eq!(config.wave_size, 3);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.call_delay_ms, 1000);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "wave_sise = 3").unwrap();
        assert!(matches!(
            HarnessConfig::from_file(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            HarnessConfig::from_file(Path::new("/nonexistent/iwv.toml")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn env_overrides_file_values() {
        let config = HarnessConfig::default()
            .with_env(env(&[
                ("IWV_ENDPOINT", "https://example.com/generate"),
                ("IWV_WAVE_SIZE", "8"),
                ("IWV_CALL_DELAY_MS", "0"),
                ("IWV_API_KEY", "secret"),
            ]))
            .unwrap();
        assert_eq!(config.endpoint, "https://example.com/generate");
        assert_eq!(config.wave_size, 8);
        assert_eq!(config.call_delay_ms, 0);
        assert_eq!(config.api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn malformed_env_value_is_reported() {
        let err = HarnessConfig::default()
            .with_env(env(&[("IWV_WAVE_SIZE", "five")]))
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid value 'five' for IWV_WAVE_SIZE");
    }

    #[test]
    fn validation_rejects_bad_values() {
        let zero_wave = HarnessConfig {
            wave_size: 0,
            ..HarnessConfig::default()
        };
        assert!(matches!(
            zero_wave.validate(),
            Err(ConfigError::Invalid { key: "wave_size", .. })
        ));

        let ftp = HarnessConfig::default().with_endpoint("ftp://example.com");
        assert!(matches!(
            ftp.validate(),
            Err(ConfigError::Invalid { key: "endpoint", .. })
        ));
    }

    #[test]
    fn executor_config_converts_units() {
        let exec = HarnessConfig::default().executor_config();
        assert_eq!(exec.call_delay, Duration::from_millis(1000));
        assert_eq!(exec.wave_delay, Duration::from_millis(2000));
    }
}
