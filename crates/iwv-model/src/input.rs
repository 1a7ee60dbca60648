//! Test inputs and their test-only metadata
//!
//! Every metadata key lives under the reserved `_` prefix, so the payload sent
//! to the remote service is obtained by dropping prefixed keys, no allow-list
//! required.

use crate::complexity::{assess_complexity, Complexity};
use crate::result::ErrorKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reserved prefix of test-only metadata keys
pub const METADATA_PREFIX: char = '_';

/// Whether a top-level key is test-only metadata
#[inline]
#[must_use]
pub fn is_metadata_key(key: &str) -> bool {
    key.starts_with(METADATA_PREFIX)
}

/// Drop every metadata key from a payload object
///
/// Non-object values are returned unchanged. Idempotent.
#[must_use]
pub fn strip_test_metadata(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let stripped: Map<String, Value> = map
                .iter()
                .filter(|(key, _)| !is_metadata_key(key))
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();
            Value::Object(stripped)
        }
        other => other.clone(),
    }
}

/// Test-only metadata carried next to the contract fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestMetadata {
    /// Sequential or scenario-specific identifier
    #[serde(rename = "_testId", default, skip_serializing_if = "Option::is_none")]
    pub test_id: Option<String>,
    /// Intent category or scenario family the input came from
    #[serde(rename = "_category", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Complexity the test author expects the heuristic to assign
    #[serde(
        rename = "_expectedComplexity",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub expected_complexity: Option<Complexity>,
    /// Error kind the input is designed to trigger
    #[serde(rename = "_expectedError", default, skip_serializing_if = "Option::is_none")]
    pub expected_error: Option<ErrorKind>,
    /// Decision count the response is expected to contain
    #[serde(
        rename = "_expectedDecisionCount",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub expected_decision_count: Option<i64>,
    /// Which output check the input targets
    #[serde(
        rename = "_validationFocus",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub validation_focus: Option<String>,
    /// Free-text description of the scenario
    #[serde(rename = "_description", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TestMetadata {
    /// Whether no metadata field is set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A request payload under test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestInput {
    /// Free-text strategic objective
    pub strategic_intent: String,
    /// Optional business context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_description: Option<String>,
    /// Optional reference links
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_links: Option<String>,
    /// Explicit number of decisions to generate, `None` for auto mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_decision_count: Option<i64>,
    /// Test-only fields, serialized under the reserved prefix
    #[serde(flatten)]
    pub meta: TestMetadata,
}

impl TestInput {
    /// Create input with only a strategic intent
    #[inline]
    #[must_use]
    pub fn new(strategic_intent: impl Into<String>) -> Self {
        Self {
            strategic_intent: strategic_intent.into(),
            context_description: None,
            context_links: None,
            requested_decision_count: None,
            meta: TestMetadata::default(),
        }
    }

    /// With context description
    #[inline]
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context_description = Some(context.into());
        self
    }

    /// With reference links
    #[inline]
    #[must_use]
    pub fn with_links(mut self, links: impl Into<String>) -> Self {
        self.context_links = Some(links.into());
        self
    }

    /// With explicit requested decision count
    #[inline]
    #[must_use]
    pub fn with_requested_count(mut self, count: i64) -> Self {
        self.requested_decision_count = Some(count);
        self
    }

    /// With test id
    #[inline]
    #[must_use]
    pub fn with_test_id(mut self, id: impl Into<String>) -> Self {
        self.meta.test_id = Some(id.into());
        self
    }

    /// With source category
    #[inline]
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.meta.category = Some(category.into());
        self
    }

    /// With expected complexity
    #[inline]
    #[must_use]
    pub fn with_expected_complexity(mut self, complexity: Complexity) -> Self {
        self.meta.expected_complexity = Some(complexity);
        self
    }

    /// With expected error kind
    #[inline]
    #[must_use]
    pub fn with_expected_error(mut self, kind: ErrorKind) -> Self {
        self.meta.expected_error = Some(kind);
        self
    }

    /// With expected decision count
    #[inline]
    #[must_use]
    pub fn with_expected_decision_count(mut self, count: i64) -> Self {
        self.meta.expected_decision_count = Some(count);
        self
    }

    /// With validation focus
    #[inline]
    #[must_use]
    pub fn with_validation_focus(mut self, focus: impl Into<String>) -> Self {
        self.meta.validation_focus = Some(focus.into());
        self
    }

    /// With scenario description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.meta.description = Some(description.into());
        self
    }

    /// Label used in logs and reports
    #[must_use]
    pub fn label(&self) -> String {
        self.meta.test_id.clone().unwrap_or_else(|| {
            let preview: String = self.strategic_intent.chars().take(40).collect();
            format!("intent:{preview}")
        })
    }

    /// Heuristic complexity of this input
    #[inline]
    #[must_use]
    pub fn complexity(&self) -> Complexity {
        assess_complexity(&self.strategic_intent, self.context_description.as_deref())
    }

    /// Full JSON representation, metadata included
    ///
    /// # Errors
    /// Returns the serializer error if the value cannot be represented as JSON.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// JSON payload for the remote contract, metadata removed
    ///
    /// # Errors
    /// Returns the serializer error if the value cannot be represented as JSON.
    pub fn payload(&self) -> Result<Value, serde_json::Error> {
        self.to_value().map(|value| strip_test_metadata(&value))
    }

    /// Copy of this input with metadata cleared
    #[must_use]
    pub fn stripped(&self) -> Self {
        Self {
            meta: TestMetadata::default(),
            ..self.clone()
        }
    }
}
