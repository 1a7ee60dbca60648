//! Validation results and the tagged error taxonomy
//!
//! Test failures are data, not Rust errors: every layer appends
//! [`ValidationError`] values so a batch run can keep aggregating.

use crate::input::TestInput;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Error taxonomy tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Input violates the request contract
    InputValidation,
    /// Response violates the response contract
    OutputValidation,
    /// Response violates a semantic rule
    BusinessLogic,
    /// Remote answered with a non-2xx status
    ApiError,
    /// Transport failure
    NetworkError,
    /// Remote call exceeded the client timeout
    TimeoutError,
    /// Unexpected fault inside the per-item pipeline
    SystemError,
}

impl ErrorKind {
    /// Every kind, in report order
    pub const ALL: [ErrorKind; 7] = [
        Self::InputValidation,
        Self::OutputValidation,
        Self::BusinessLogic,
        Self::ApiError,
        Self::NetworkError,
        Self::TimeoutError,
        Self::SystemError,
    ];

    /// Wire name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InputValidation => "input_validation",
            Self::OutputValidation => "output_validation",
            Self::BusinessLogic => "business_logic",
            Self::ApiError => "api_error",
            Self::NetworkError => "network_error",
            Self::TimeoutError => "timeout_error",
            Self::SystemError => "system_error",
        }
    }

    /// Whether the error stems from the remote round-trip
    #[inline]
    #[must_use]
    pub fn is_remote_failure(&self) -> bool {
        matches!(
            self,
            Self::ApiError | Self::NetworkError | Self::TimeoutError
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Business rule that produced a `business_logic` error
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessRule {
    /// Decision count differs from the requested count or the auto band
    DecisionCount,
    /// No decision is tagged PIR or FFIR
    TypeDistribution,
    /// Tagged decision counts disagree with the workflow summaries
    WorkflowConsistency,
    /// Expected complexity tag disagrees with the heuristic
    ComplexityOracle,
    /// Auto-mode decision count is far from the complexity target
    ComplexityAlignment,
    /// Input designed to fail did not produce its expected error
    ExpectedErrorNotRaised,
}

impl BusinessRule {
    /// Wire name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DecisionCount => "decision_count",
            Self::TypeDistribution => "type_distribution",
            Self::WorkflowConsistency => "workflow_consistency",
            Self::ComplexityOracle => "complexity_oracle",
            Self::ComplexityAlignment => "complexity_alignment",
            Self::ExpectedErrorNotRaised => "expected_error_not_raised",
        }
    }

    /// Who is at fault when the rule fires
    #[must_use]
    pub fn origin(&self) -> DefectOrigin {
        match self {
            Self::ComplexityOracle | Self::ExpectedErrorNotRaised => DefectOrigin::TestOracle,
            _ => DefectOrigin::System,
        }
    }
}

impl fmt::Display for BusinessRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a defect lies in the system under test or in the test oracle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefectOrigin {
    System,
    TestOracle,
}

/// One structured validation error
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    pub kind: ErrorKind,
    pub message: String,
    /// JSON pointer of the failing field
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Offending value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Schema fragment the value was checked against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule: Option<BusinessRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<DefectOrigin>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<Value>,
    /// HTTP status for `api_error`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ValidationError {
    /// Bare error of a kind
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            field: None,
            value: None,
            schema: None,
            rule: None,
            origin: None,
            expected: None,
            actual: None,
            status: None,
        }
    }

    /// Schema violation on a field
    #[must_use]
    pub fn schema_violation(
        kind: ErrorKind,
        field: impl Into<String>,
        message: impl Into<String>,
        value: Value,
        schema: Option<Value>,
    ) -> Self {
        Self {
            field: Some(field.into()),
            value: Some(value),
            schema,
            ..Self::new(kind, message)
        }
    }

    /// Business rule violation with expected/actual values
    #[must_use]
    pub fn business(
        rule: BusinessRule,
        message: impl Into<String>,
        expected: Value,
        actual: Value,
    ) -> Self {
        Self {
            rule: Some(rule),
            origin: Some(rule.origin()),
            expected: Some(expected),
            actual: Some(actual),
            ..Self::new(ErrorKind::BusinessLogic, message)
        }
    }

    /// Non-2xx response
    #[must_use]
    pub fn api(status: u16, reason: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            ..Self::new(ErrorKind::ApiError, reason)
        }
    }

    /// Transport failure
    #[inline]
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NetworkError, message)
    }

    /// Client-side timeout
    #[inline]
    #[must_use]
    pub fn timeout(after_ms: u64) -> Self {
        Self::new(
            ErrorKind::TimeoutError,
            format!("remote call timed out after {after_ms}ms"),
        )
    }

    /// Unexpected fault
    #[inline]
    #[must_use]
    pub fn system(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SystemError, message)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}", self.kind)?;
        if let Some(rule) = self.rule {
            write!(f, "/{rule}")?;
        }
        write!(f, "] ")?;
        if let Some(field) = &self.field {
            write!(f, "{field}: ")?;
        }
        f.write_str(&self.message)
    }
}

/// Timing of one validated item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Performance {
    /// Remote round-trip latency, when the remote was called
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    /// Wall time of the whole per-item pipeline
    pub total_time_ms: u64,
}

/// Outcome of validating one input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub input: TestInput,
    pub input_valid: bool,
    pub output_valid: bool,
    /// Whether a remote call was attempted
    pub remote_called: bool,
    pub errors: Vec<ValidationError>,
    pub api_response: Option<Value>,
    pub performance: Performance,
    pub timestamp: DateTime<Utc>,
}

impl ValidationResult {
    /// Fresh result for an input, nothing validated yet
    #[must_use]
    pub fn new(input: TestInput) -> Self {
        Self {
            input,
            input_valid: false,
            output_valid: false,
            remote_called: false,
            errors: Vec::new(),
            api_response: None,
            performance: Performance::default(),
            timestamp: Utc::now(),
        }
    }

    /// Whether any error of `kind` was recorded
    #[must_use]
    pub fn has_error_kind(&self, kind: ErrorKind) -> bool {
        self.errors.iter().any(|e| e.kind == kind)
    }

    /// Whether a business rule fired
    #[must_use]
    pub fn has_rule(&self, rule: BusinessRule) -> bool {
        self.errors.iter().any(|e| e.rule == Some(rule))
    }

    /// Whether the remote round-trip failed
    #[must_use]
    pub fn remote_failed(&self) -> bool {
        self.errors.iter().any(|e| e.kind.is_remote_failure())
    }

    /// Whether the item met its expectation
    ///
    /// Inputs tagged with an expected error pass when that error occurred;
    /// all other inputs pass when no error was recorded.
    #[must_use]
    pub fn passed(&self) -> bool {
        match self.input.meta.expected_error {
            Some(kind) => self.has_error_kind(kind),
            None => self.errors.is_empty(),
        }
    }

    /// Same result with the timestamp zeroed, for content comparison
    #[must_use]
    pub fn without_timing(&self) -> Self {
        Self {
            performance: Performance::default(),
            timestamp: DateTime::<Utc>::default(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kinds_serialize_snake_case() {
        assert_eq!(
            serde_json::to_value(ErrorKind::BusinessLogic).unwrap(),
            json!("business_logic")
        );
        for kind in ErrorKind::ALL {
            assert_eq!(serde_json::to_value(kind).unwrap(), json!(kind.as_str()));
        }
    }

    #[test]
    fn business_error_carries_rule_and_origin() {
        let err = ValidationError::business(
            BusinessRule::ComplexityOracle,
            "mismatch",
            json!("low"),
            json!("medium"),
        );
        assert_eq!(err.kind, ErrorKind::BusinessLogic);
        assert_eq!(err.origin, Some(DefectOrigin::TestOracle));
        assert_eq!(err.to_string(), "[business_logic/complexity_oracle] mismatch");

        let err = ValidationError::business(
            BusinessRule::DecisionCount,
            "off by one",
            json!(4),
            json!(5),
        );
        assert_eq!(err.origin, Some(DefectOrigin::System));
    }

    #[test]
    fn passed_is_expectation_aware() {
        let mut plain = ValidationResult::new(TestInput::new("Scale the sales team"));
        assert!(plain.passed());
        plain.errors.push(ValidationError::network("refused"));
        assert!(!plain.passed());
        assert!(plain.remote_failed());

        let mut edge = ValidationResult::new(
            TestInput::new("A").with_expected_error(ErrorKind::InputValidation),
        );
        assert!(!edge.passed());
        edge.errors.push(ValidationError::new(ErrorKind::InputValidation, "too short"));
        assert!(edge.passed());
    }

    #[test]
    fn serializes_camel_case() {
        let mut result = ValidationResult::new(TestInput::new("Scale the sales team"));
        result.performance.response_time_ms = Some(12);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["inputValid"], false);
        assert_eq!(value["performance"]["responseTimeMs"], 12);
        assert!(value["apiResponse"].is_null());
    }
}
