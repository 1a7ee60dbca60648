//! Business-rule validation
//!
//! Semantic checks a schema cannot express, cross-referencing the input (and
//! its test-only metadata) with the typed response:
//! - Decision-count accuracy (explicit request or auto band)
//! - Type distribution (at least one PIR or FFIR)
//! - Workflow summary consistency
//! - Complexity oracle and complexity/count alignment
//!
//! Every rule is evaluated; a single response can report several defects.

use iwv_model::{
    complexity_target, BusinessRule, Complexity, DecisionKind, TestInput, TestOutput,
    ValidationError,
};
use serde_json::json;

/// Tunables of the rule set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleConfig {
    /// Smallest acceptable decision count in auto mode
    pub auto_min_decisions: usize,
    /// Largest acceptable decision count in auto mode
    pub auto_max_decisions: usize,
    /// Allowed distance between auto-mode count and complexity target
    pub complexity_tolerance: usize,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            auto_min_decisions: 3,
            auto_max_decisions: 5,
            complexity_tolerance: 1,
        }
    }
}

/// Semantic validator for (input, output) pairs
#[derive(Debug, Clone, Copy, Default)]
pub struct BusinessRuleValidator {
    config: RuleConfig,
}

impl BusinessRuleValidator {
    /// Create validator with default rules
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create validator with custom tunables
    #[inline]
    #[must_use]
    pub fn with_config(config: RuleConfig) -> Self {
        Self { config }
    }

    /// Active tunables
    #[inline]
    #[must_use]
    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    /// Run every rule and collect all violations
    ///
    /// `input` keeps its metadata; only its contract fields feed the
    /// complexity heuristic.
    #[must_use]
    pub fn validate(&self, input: &TestInput, output: &TestOutput) -> Vec<ValidationError> {
        let errors: Vec<ValidationError> = [
            self.check_decision_count(input, output),
            Self::check_type_distribution(output),
            Self::check_workflow_consistency(output),
            Self::check_complexity_oracle(input),
            self.check_complexity_alignment(input, output),
        ]
        .into_iter()
        .flatten()
        .collect();

        if !errors.is_empty() {
            tracing::debug!(
                "{}: {} business rule violation(s)",
                input.label(),
                errors.len()
            );
        }
        errors
    }

    /// Rule 1: exact count when requested, otherwise inside the auto band
    #[must_use]
    pub fn check_decision_count(
        &self,
        input: &TestInput,
        output: &TestOutput,
    ) -> Option<ValidationError> {
        let actual = output.decisions.len();

        match input.requested_decision_count {
            Some(requested) => {
                let matches = i64::try_from(actual).map_or(false, |actual| actual == requested);
                (!matches).then(|| {
                    ValidationError::business(
                        BusinessRule::DecisionCount,
                        format!("requested {requested} decisions, received {actual}"),
                        json!(requested),
                        json!(actual),
                    )
                })
            }
            None => {
                let (min, max) = (self.config.auto_min_decisions, self.config.auto_max_decisions);
                (!(min..=max).contains(&actual)).then(|| {
                    ValidationError::business(
                        BusinessRule::DecisionCount,
                        format!("auto mode produced {actual} decisions, expected {min}-{max}"),
                        json!({ "min": min, "max": max }),
                        json!(actual),
                    )
                })
            }
        }
    }

    /// Rule 2: at least one decision must be PIR or FFIR
    #[must_use]
    pub fn check_type_distribution(output: &TestOutput) -> Option<ValidationError> {
        (!output.has_typed_decision()).then(|| {
            ValidationError::business(
                BusinessRule::TypeDistribution,
                "no decision is tagged PIR or FFIR",
                json!("at least one PIR or FFIR decision"),
                json!({
                    "pir": output.pir_count(),
                    "ffir": output.ffir_count(),
                    "unspecified": output.count_of(DecisionKind::Unspecified),
                }),
            )
        })
    }

    /// Rule 3: tagged counts must equal the workflow summaries
    #[must_use]
    pub fn check_workflow_consistency(output: &TestOutput) -> Option<ValidationError> {
        let pir_declared = output.pir_workflow.summary.total_decisions;
        let ffir_declared = output.ffir_workflow.summary.total_decisions;
        let pir_tagged = output.pir_count() as u64;
        let ffir_tagged = output.ffir_count() as u64;

        let mut mismatches = Vec::new();
        if pir_tagged != pir_declared {
            mismatches.push(format!(
                "pirWorkflow declares {pir_declared} decisions, {pir_tagged} tagged PIR"
            ));
        }
        if ffir_tagged != ffir_declared {
            mismatches.push(format!(
                "ffirWorkflow declares {ffir_declared} decisions, {ffir_tagged} tagged FFIR"
            ));
        }

        (!mismatches.is_empty()).then(|| {
            ValidationError::business(
                BusinessRule::WorkflowConsistency,
                mismatches.join("; "),
                json!({ "pir": pir_declared, "ffir": ffir_declared }),
                json!({ "pir": pir_tagged, "ffir": ffir_tagged }),
            )
        })
    }

    /// Rule 4a: expected-complexity tag must match the heuristic
    ///
    /// A mismatch means the test oracle disagrees with the heuristic, not that
    /// the service misbehaved.
    #[must_use]
    pub fn check_complexity_oracle(input: &TestInput) -> Option<ValidationError> {
        let expected = input.meta.expected_complexity?;
        let assessed = input.complexity();
        (expected != assessed).then(|| {
            ValidationError::business(
                BusinessRule::ComplexityOracle,
                format!("test expects {expected} complexity, heuristic assesses {assessed}"),
                json!(expected),
                json!(assessed),
            )
        })
    }

    /// Rule 4b: in auto mode the count should sit near the complexity target
    #[must_use]
    pub fn check_complexity_alignment(
        &self,
        input: &TestInput,
        output: &TestOutput,
    ) -> Option<ValidationError> {
        if input.requested_decision_count.is_some() {
            return None;
        }

        let complexity: Complexity = input.complexity();
        let target = complexity_target(complexity);
        let actual = output.decisions.len();
        let tolerance = self.config.complexity_tolerance;

        (actual.abs_diff(target) > tolerance).then(|| {
            ValidationError::business(
                BusinessRule::ComplexityAlignment,
                format!(
                    "{complexity} complexity implies about {target} decisions (±{tolerance}), received {actual}"
                ),
                json!({ "complexity": complexity, "target": target, "tolerance": tolerance }),
                json!(actual),
            )
        })
    }
}
