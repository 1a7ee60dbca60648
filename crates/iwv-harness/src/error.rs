//! Error types for the harness
//!
//! Infrastructure failures only:
//! - Configuration loading and validation
//! - HTTP client construction and schema loading
//! - Failure report persistence, surfaced on the run report rather than
//!   aborting the run
//!
//! Per-item test failures are never Rust errors; they are recorded as
//! [`iwv_model::ValidationError`] values on each result.

use iwv_validation::SchemaError;
use std::path::{Path, PathBuf};

/// Main harness error type
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// Configuration could not be loaded or is invalid
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Schema documents could not be loaded
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// HTTP client could not be built
    #[error("http client error: {0}")]
    Client(String),
}

impl HarnessError {
    /// Create client construction error
    #[inline]
    pub fn client_error(msg: impl Into<String>) -> Self {
        Self::Client(msg.into())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for the config shape
    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Environment variable holds an unparsable value
    #[error("invalid value '{value}' for {var}")]
    InvalidEnv { var: String, value: String },

    /// A setting is out of range
    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl ConfigError {
    /// Create out-of-range error
    #[inline]
    pub fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Failure report errors
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Report directory or file could not be written
    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Report could not be serialized
    #[error("cannot serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ReportError {
    /// Create IO error for a path
    #[inline]
    pub fn io_error(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Result type for harness operations
pub type HarnessResult<T> = Result<T, HarnessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_into_harness_error() {
        let err: HarnessError = ConfigError::invalid("wave_size", "must be at least 1").into();
        assert_eq!(
            err.to_string(),
            "configuration error: invalid wave_size: must be at least 1"
        );
    }

    #[test]
    fn report_io_error_names_path() {
        let err = ReportError::io_error(
            Path::new("/tmp/reports"),
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("/tmp/reports"));
    }
}
