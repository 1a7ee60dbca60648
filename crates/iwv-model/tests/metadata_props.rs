use iwv_model::{strip_test_metadata, Complexity, ErrorKind, TestInput};
use proptest::prelude::*;
use serde_json::{Map, Value};

fn arb_complexity() -> impl Strategy<Value = Complexity> {
    prop_oneof![
        Just(Complexity::Low),
        Just(Complexity::Medium),
        Just(Complexity::High)
    ]
}

fn arb_input() -> impl Strategy<Value = TestInput> {
    (
        ".{0,80}",
        proptest::option::of(".{0,80}"),
        proptest::option::of("https://[a-z]{1,10}\\.com"),
        proptest::option::of(0i64..10),
        proptest::option::of("[a-z_]{1,12}"),
        proptest::option::of(arb_complexity()),
        any::<bool>(),
    )
        .prop_map(|(intent, context, links, count, test_id, complexity, expect_error)| {
            let mut input = TestInput::new(intent);
            input.context_description = context;
            input.context_links = links;
            input.requested_decision_count = count;
            input.meta.test_id = test_id;
            input.meta.expected_complexity = complexity;
            if expect_error {
                input.meta.expected_error = Some(ErrorKind::InputValidation);
            }
            input
        })
}

proptest! {
    #[test]
    fn prop_strip_is_idempotent(input in arb_input()) {
        let full = input.to_value().unwrap();
        let once = strip_test_metadata(&full);
        let twice = strip_test_metadata(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_stripped_payload_has_no_prefixed_keys(input in arb_input()) {
        let payload = input.payload().unwrap();
        let map = payload.as_object().unwrap();
        prop_assert!(map.keys().all(|k| !k.starts_with('_')));
        prop_assert_eq!(
            map.get("strategicIntent").and_then(Value::as_str),
            Some(input.strategic_intent.as_str())
        );
    }

    #[test]
    fn prop_strip_works_on_arbitrary_objects(
        keys in proptest::collection::vec("_?[a-zA-Z]{1,8}", 0..12)
    ) {
        let object: Map<String, Value> = keys
            .iter()
            .map(|k| (k.clone(), Value::Bool(true)))
            .collect();
        let value = Value::Object(object);
        let stripped = strip_test_metadata(&value);
        prop_assert_eq!(strip_test_metadata(&stripped), stripped.clone());
        let kept = stripped.as_object().unwrap();
        for key in &keys {
            prop_assert_eq!(kept.contains_key(key), !key.starts_with('_'));
        }
    }

    #[test]
    fn prop_heuristic_never_yields_low(intent in ".{0,200}", context in proptest::option::of(".{0,200}")) {
        prop_assert_ne!(
            iwv_model::assess_complexity(&intent, context.as_deref()),
            Complexity::Low
        );
    }
}
