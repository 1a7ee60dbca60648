//! Remote system seam and its HTTP implementation
//!
//! A [`RemoteSystem`] performs exactly one round-trip per call and never
//! retries. Failures come back inside [`RemoteCall`] so batch statistics stay
//! consistent.

use crate::config::HarnessConfig;
use crate::error::{HarnessError, HarnessResult};
use iwv_model::ValidationError;
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;

/// Why a round-trip failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteFailure {
    /// Non-2xx status
    #[error("HTTP {status}: {reason}")]
    Api { status: u16, reason: String },

    /// Transport failure
    #[error("network error: {0}")]
    Network(String),

    /// No response within the client timeout
    #[error("timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },
}

impl RemoteFailure {
    /// Structured error recorded on the result
    #[must_use]
    pub fn to_validation_error(&self) -> ValidationError {
        match self {
            Self::Api { status, reason } => ValidationError::api(*status, reason.clone()),
            Self::Network(message) => ValidationError::network(message.clone()),
            Self::Timeout { after_ms } => ValidationError::timeout(*after_ms),
        }
    }
}

/// Outcome of one round-trip
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteCall {
    /// Parsed response body or the failure
    pub outcome: Result<Value, RemoteFailure>,
    /// Wall-clock latency of the call
    pub response_time_ms: u64,
}

impl RemoteCall {
    #[inline]
    #[must_use]
    pub fn success(body: Value, response_time_ms: u64) -> Self {
        Self {
            outcome: Ok(body),
            response_time_ms,
        }
    }

    #[inline]
    #[must_use]
    pub fn failure(failure: RemoteFailure, response_time_ms: u64) -> Self {
        Self {
            outcome: Err(failure),
            response_time_ms,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// The system under test
///
/// Implement this trait to point the harness at a different transport or at
/// a stub.
#[async_trait::async_trait]
pub trait RemoteSystem: Send + Sync {
    /// Submit one metadata-free payload
    async fn call(&self, payload: &Value) -> RemoteCall;

    /// Reachability check; any HTTP answer counts as reachable
    async fn probe(&self) -> Result<(), RemoteFailure>;

    /// Human-readable target, for logs
    fn target(&self) -> String;
}

/// Elapsed milliseconds since `start`, saturating
#[must_use]
pub fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// HTTP client for the generation endpoint
#[derive(Debug, Clone)]
pub struct HttpRemoteClient {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
    api_key: Option<String>,
}

impl HttpRemoteClient {
    /// Create a client with an explicit per-call timeout
    ///
    /// # Errors
    /// `HarnessError::Client` if the TLS backend cannot be initialized.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> HarnessResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HarnessError::client_error(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            timeout,
            api_key: None,
        })
    }

    /// Client configured from harness settings
    ///
    /// # Errors
    /// See [`HttpRemoteClient::new`].
    pub fn from_config(config: &HarnessConfig) -> HarnessResult<Self> {
        let mut client = Self::new(config.endpoint.clone(), config.request_timeout())?;
        client.api_key.clone_from(&config.api_key);
        Ok(client)
    }

    /// With bearer token
    #[inline]
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    fn classify(&self, error: &reqwest::Error) -> RemoteFailure {
        if error.is_timeout() {
            RemoteFailure::Timeout {
                after_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else {
            RemoteFailure::Network(error.to_string())
        }
    }
}

#[async_trait::async_trait]
impl RemoteSystem for HttpRemoteClient {
    async fn call(&self, payload: &Value) -> RemoteCall {
        let start = Instant::now();
        let request = self.authorize(self.client.post(&self.endpoint).json(payload));

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                let failure = self.classify(&e);
                tracing::warn!("Call to {} failed: {failure}", self.endpoint);
                return RemoteCall::failure(failure, elapsed_ms(start));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = status.canonical_reason().unwrap_or("unknown status");
            let reason = if body.is_empty() {
                reason.to_owned()
            } else {
                format!("{reason}: {}", truncate(&body, 200))
            };
            return RemoteCall::failure(
                RemoteFailure::Api {
                    status: status.as_u16(),
                    reason,
                },
                elapsed_ms(start),
            );
        }

        match response.text().await {
            // A non-JSON body is kept as a string so the output contract rejects it
            Ok(text) => {
                let body = serde_json::from_str(&text).unwrap_or(Value::String(text));
                RemoteCall::success(body, elapsed_ms(start))
            }
            Err(e) => RemoteCall::failure(self.classify(&e), elapsed_ms(start)),
        }
    }

    async fn probe(&self) -> Result<(), RemoteFailure> {
        let request = self.authorize(self.client.get(&self.endpoint));
        request.send().await.map(|_| ()).map_err(|e| self.classify(&e))
    }

    fn target(&self) -> String {
        self.endpoint.clone()
    }
}

/// First `max` characters of `text`
#[must_use]
pub fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
