//! Batch execution against the deterministic stub

use iwv_harness::{BatchExecutor, ExecutorConfig, RunContext};
use iwv_model::{BusinessRule, ErrorKind, TestInput, ValidationResult};
use iwv_scenario::{ScenarioGenerator, ScenarioType};
use iwv_test_utils::{StubFailure, StubRemote};
use iwv_validation::SchemaValidator;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn executor(remote: Arc<StubRemote>) -> BatchExecutor {
    BatchExecutor::new(Arc::new(SchemaValidator::embedded().unwrap()), remote)
        .with_config(ExecutorConfig::immediate())
}

fn mixed_inputs() -> Vec<TestInput> {
    let mut generator = ScenarioGenerator::with_seed(2024);
    let mut inputs = generator.generate_batch(17);
    inputs.extend(generator.generate_scenarios(ScenarioType::EdgeCases));
    inputs.extend(generator.generate_scenarios(ScenarioType::ComplexityLow));
    inputs
}

fn content(results: &[ValidationResult]) -> Vec<ValidationResult> {
    results.iter().map(ValidationResult::without_timing).collect()
}

#[tokio::test]
async fn sequential_and_parallel_runs_agree() {
    let inputs = mixed_inputs();

    let mut seq_ctx = RunContext::new("sequential");
    let sequential = executor(Arc::new(StubRemote::new()))
        .validate_batch(&inputs, true, false, &mut seq_ctx)
        .await;

    let mut par_ctx = RunContext::new("parallel");
    let parallel = executor(Arc::new(StubRemote::new()))
        .with_config(ExecutorConfig {
            wave_size: 4,
            ..ExecutorConfig::immediate()
        })
        .validate_batch(&inputs, true, true, &mut par_ctx)
        .await;

    assert_eq!(sequential.results.len(), inputs.len());
    assert_eq!(content(&sequential.results), content(&parallel.results));
    for (result, input) in parallel.results.iter().zip(&inputs) {
        assert_eq!(&result.input, input);
    }
    assert_eq!(seq_ctx.stats().passed, par_ctx.stats().passed);
    assert_eq!(seq_ctx.stats().failed, par_ctx.stats().failed);
}

#[tokio::test]
async fn parallel_waves_do_not_reorder_slow_items() {
    let inputs = ScenarioGenerator::with_seed(5).generate_batch(9);
    let remote = Arc::new(StubRemote::new().with_delay(Duration::from_millis(5)));
    let mut ctx = RunContext::new("ordering");
    let outcome = executor(remote.clone())
        .with_config(ExecutorConfig {
            wave_size: 5,
            ..ExecutorConfig::immediate()
        })
        .validate_batch(&inputs, true, true, &mut ctx)
        .await;

    let ids: Vec<_> = outcome
        .results
        .iter()
        .map(|r| r.input.meta.test_id.clone().unwrap())
        .collect();
    let expected: Vec<_> = (1..=9).map(|n| format!("batch_{n:03}")).collect();
    assert_eq!(ids, expected);
    assert_eq!(remote.call_count(), 9);
}

#[tokio::test]
async fn too_short_intent_never_reaches_remote() {
    let remote = Arc::new(StubRemote::new());
    let input = TestInput::new("A").with_expected_error(ErrorKind::InputValidation);
    let result = executor(remote.clone()).validate_single(&input, true).await;

    assert!(!result.input_valid);
    assert!(result.has_error_kind(ErrorKind::InputValidation));
    assert!(result.passed());
    assert_eq!(remote.call_count(), 0);
}

#[tokio::test]
async fn edge_cases_pass_without_remote_calls() {
    let remote = Arc::new(StubRemote::new());
    let inputs = ScenarioGenerator::with_seed(1).generate_scenarios(ScenarioType::EdgeCases);
    let mut ctx = RunContext::new("edge");
    let outcome = executor(remote.clone())
        .validate_batch(&inputs, true, false, &mut ctx)
        .await;

    assert!(outcome.results.iter().all(ValidationResult::passed));
    assert_eq!(ctx.stats().api_calls, 0);
    assert_eq!(remote.call_count(), 0);
}

#[tokio::test]
async fn payloads_reach_remote_without_metadata() {
    let remote = Arc::new(StubRemote::new());
    let inputs = ScenarioGenerator::with_seed(8).generate_batch(6);
    let mut ctx = RunContext::new("payloads");
    executor(remote.clone())
        .validate_batch(&inputs, true, false, &mut ctx)
        .await;

    let payloads = remote.payloads();
    assert_eq!(payloads.len(), 6);
    for payload in payloads {
        assert!(payload.as_object().unwrap().keys().all(|k| !k.starts_with('_')));
    }
}

#[tokio::test]
async fn remote_failures_skip_output_validation() {
    let input = TestInput::new("Improve retention of our core customers.");

    let cases = [
        (StubFailure::Status(500), ErrorKind::ApiError),
        (StubFailure::Network, ErrorKind::NetworkError),
    ];
    for (failure, kind) in cases {
        let result = executor(Arc::new(StubRemote::failing(failure)))
            .validate_single(&input, true)
            .await;
        assert_eq!(result.errors.len(), 1, "{kind}");
        assert_eq!(result.errors[0].kind, kind);
        assert!(result.remote_failed());
        assert!(result.api_response.is_none());
        assert!(!result.output_valid);
    }
}

#[tokio::test]
async fn defective_responses_fire_matching_rules() {
    let input = TestInput::new("Improve retention of our core customers.");

    let malformed = executor(Arc::new(StubRemote::failing(StubFailure::Malformed)))
        .validate_single(&input, true)
        .await;
    assert!(malformed.has_error_kind(ErrorKind::OutputValidation));
    assert!(!malformed.has_error_kind(ErrorKind::BusinessLogic));

    let untyped = executor(Arc::new(StubRemote::failing(StubFailure::Untyped)))
        .validate_single(&input, true)
        .await;
    assert!(untyped.output_valid);
    assert!(untyped.has_rule(BusinessRule::TypeDistribution));
    assert!(!untyped.has_rule(BusinessRule::WorkflowConsistency));

    let inconsistent = executor(Arc::new(StubRemote::failing(StubFailure::InconsistentSummary)))
        .validate_single(&input, true)
        .await;
    assert!(inconsistent.has_rule(BusinessRule::WorkflowConsistency));
    assert!(!inconsistent.has_rule(BusinessRule::DecisionCount));
}

/// (decisions returned, intent, requested count, rules expected to fire)
#[tokio::test]
async fn decision_count_table_end_to_end() {
    const MEDIUM: &str = "Improve retention of our core customers.";
    const HIGH: &str = "Global acquisition under regulatory review";

    let table: [(usize, &str, Option<i64>, &[BusinessRule]); 8] = [
        (4, MEDIUM, None, &[]),
        (3, MEDIUM, None, &[]),
        (5, MEDIUM, None, &[BusinessRule::ComplexityAlignment]),
        (2, MEDIUM, None, &[BusinessRule::DecisionCount]),
        (4, HIGH, None, &[]),
        (3, HIGH, None, &[BusinessRule::ComplexityAlignment]),
        (4, MEDIUM, Some(4), &[]),
        (5, HIGH, Some(3), &[BusinessRule::DecisionCount]),
    ];

    for (returned, intent, requested, expected_rules) in table {
        let mut input = TestInput::new(intent);
        if let Some(count) = requested {
            input = input.with_requested_count(count);
        }
        let result = executor(Arc::new(StubRemote::failing(StubFailure::DecisionCount(returned))))
            .validate_single(&input, true)
            .await;

        let fired: Vec<BusinessRule> = result.errors.iter().filter_map(|e| e.rule).collect();
        assert_eq!(fired, expected_rules.to_vec(), "{returned} / {intent} / {requested:?}");
    }
}

#[tokio::test]
async fn low_complexity_tags_always_trip_the_oracle() {
    let inputs = ScenarioGenerator::with_seed(77).generate_scenarios(ScenarioType::ComplexityLow);
    let mut ctx = RunContext::new("low");
    let outcome = executor(Arc::new(StubRemote::new()))
        .validate_batch(&inputs, true, true, &mut ctx)
        .await;

    for result in &outcome.results {
        assert!(result.has_rule(BusinessRule::ComplexityOracle));
        assert!(!result.passed());
    }
    assert_eq!(ctx.summary().errors_by_rule[&BusinessRule::ComplexityOracle], inputs.len());
}
