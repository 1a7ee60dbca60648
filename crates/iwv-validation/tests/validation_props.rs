use iwv_model::{BusinessRule, DecisionKind, DecisionRecord, TestInput, TestOutput};
use iwv_validation::{BusinessRuleValidator, SchemaKind, SchemaValidator};
use proptest::prelude::*;
use serde_json::json;

fn output_from_kinds(kinds: &[DecisionKind]) -> TestOutput {
    let mut output = TestOutput {
        decisions: kinds
            .iter()
            .enumerate()
            .map(|(i, kind)| DecisionRecord::new(format!("d{i}"), "question", *kind))
            .collect(),
        ..TestOutput::default()
    };
    output.pir_workflow.summary.total_decisions = output.pir_count() as u64;
    output.ffir_workflow.summary.total_decisions = output.ffir_count() as u64;
    output
}

fn arb_kind() -> impl Strategy<Value = DecisionKind> {
    prop_oneof![
        Just(DecisionKind::Pir),
        Just(DecisionKind::Ffir),
        Just(DecisionKind::Unspecified)
    ]
}

proptest! {
    #[test]
    fn prop_explicit_count_must_match_exactly(
        requested in 3i64..=5,
        kinds in proptest::collection::vec(arb_kind(), 0..9)
    ) {
        let input = TestInput::new("Expand into the Nordic market").with_requested_count(requested);
        let output = output_from_kinds(&kinds);
        let fired = BusinessRuleValidator::new().check_decision_count(&input, &output).is_some();
        prop_assert_eq!(fired, kinds.len() as i64 != requested);
    }

    #[test]
    fn prop_consistent_summaries_never_fire(kinds in proptest::collection::vec(arb_kind(), 0..12)) {
        let output = output_from_kinds(&kinds);
        prop_assert!(BusinessRuleValidator::check_workflow_consistency(&output).is_none());
    }

    #[test]
    fn prop_skewed_pir_summary_always_fires(
        kinds in proptest::collection::vec(arb_kind(), 0..12),
        skew in 1u64..4
    ) {
        let mut output = output_from_kinds(&kinds);
        output.pir_workflow.summary.total_decisions += skew;
        let err = BusinessRuleValidator::check_workflow_consistency(&output).unwrap();
        prop_assert_eq!(err.rule, Some(BusinessRule::WorkflowConsistency));
    }
}

#[test]
fn schemas_load_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    let input = json!({
        "type": "object",
        "required": ["strategicIntent"],
        "properties": {"strategicIntent": {"type": "string", "minLength": 3}}
    });
    let output = json!({"type": "object", "required": ["decisions"]});
    std::fs::write(
        dir.path().join(SchemaKind::Input.file_name()),
        serde_json::to_vec(&input).unwrap(),
    )
    .unwrap();
    std::fs::write(
        dir.path().join(SchemaKind::Output.file_name()),
        serde_json::to_vec(&output).unwrap(),
    )
    .unwrap();

    let validator = SchemaValidator::from_dir(dir.path()).unwrap();
    assert!(validator.validate_input(&json!({"strategicIntent": "abc"})).valid);
    assert!(!validator.validate_output(&json!({})).valid);
    assert_eq!(validator.document(SchemaKind::Input), &input);
}

#[test]
fn missing_schema_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = SchemaValidator::from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, iwv_validation::SchemaError::Io { .. }));
}

#[test]
fn malformed_schema_file_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("input.schema.json"), b"{ not json").unwrap();
    std::fs::write(dir.path().join("output.schema.json"), b"{}").unwrap();
    let err = SchemaValidator::from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, iwv_validation::SchemaError::Parse { .. }));
}
