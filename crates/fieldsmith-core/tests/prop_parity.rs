//! Property-based tests for backend parity
//!
//! Random field trees with random rule pipelines must produce the same
//! outcome through the interpreter and through the emitted source.

mod test_support;

use fieldsmith_core::model::{FieldSpec, RuleKind, TypeTag};
use fieldsmith_core::{emit, evaluate_source, Value};
use proptest::prelude::*;
use serde_json::{json, Value as Json};
use test_support::*;

#[cfg(feature = "flaky")]
const CASES: u32 = 2_000;
#[cfg(not(feature = "flaky"))]
const CASES: u32 = 64;

// Strategy functions for property testing

/// Strategy for type tags
fn tag_strategy() -> impl Strategy<Value = TypeTag> {
    proptest::sample::select(TypeTag::ALL.to_vec())
}

/// Strategy for rule kinds, including ones that do not apply
fn kind_strategy() -> impl Strategy<Value = RuleKind> {
    proptest::sample::select(RuleKind::KNOWN.to_vec())
}

/// Strategy for field names, including ones that need quoting
fn name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z][a-zA-Z0-9_]{0,8}",
        "[a-z \"'\\\\]{1,6}",
        Just("__proto__".to_string()),
    ]
}

/// Strategy for a leaf field with up to four rules
fn leaf_strategy() -> impl Strategy<Value = Json> {
    (
        name_strategy(),
        tag_strategy(),
        any::<bool>(),
        proptest::collection::vec(kind_strategy(), 0..4),
        proptest::option::of("[a-z \"]{0,6}"),
    )
        .prop_map(|(name, tag, coerce, kinds, message)| {
            let validations: Vec<Json> = kinds
                .iter()
                .map(|kind| {
                    json!({
                        "kind": kind.as_str(),
                        "value": payload_for(tag, kind.as_str()),
                        "message": message.clone(),
                    })
                })
                .collect();
            json!({
                "name": name,
                "type": tag.as_str(),
                "params": { "coerce": coerce },
                "validations": validations,
            })
        })
}

/// Strategy for field trees up to three levels deep
fn field_strategy() -> impl Strategy<Value = Json> {
    leaf_strategy().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            (name_strategy(), proptest::collection::vec(inner.clone(), 0..4)).prop_map(
                |(name, children)| json!({ "name": name, "type": "object", "children": children })
            ),
            (name_strategy(), inner.clone()).prop_map(|(name, element)| json!({
                "name": name,
                "type": "array",
                "params": { "elementType": element },
            })),
            (name_strategy(), proptest::collection::vec(inner.clone(), 0..3)).prop_map(
                |(name, members)| json!({
                    "name": name,
                    "type": "union",
                    "params": { "types": members },
                })
            ),
            (name_strategy(), proptest::collection::vec(inner, 0..3)).prop_map(|(name, fields)| {
                json!({
                    "name": name,
                    "type": "discriminatedUnion",
                    "params": { "cases": [{ "name": "a", "fields": fields }, { "name": "b", "fields": [] }] },
                })
            }),
        ]
    })
}

fn field_list_strategy() -> impl Strategy<Value = Vec<FieldSpec>> {
    proptest::collection::vec(field_strategy(), 0..4).prop_map(|list| fields(Json::Array(list)))
}

/// Strategy for samples shaped like the generated trees
fn sample_strategy() -> impl Strategy<Value = Value> {
    let leaf = proptest::sample::select(sample_battery());
    leaf.prop_recursive(2, 16, 3, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..3).prop_map(Value::Array),
            proptest::collection::vec((name_strategy(), inner), 0..3)
                .prop_map(|entries| Value::object(entries)),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(CASES))]

    /// Property: emitting never fails below the depth guard
    #[test]
    fn prop_emit_never_fails(fields in field_list_strategy()) {
        prop_assert!(emit(&fields).is_ok());
    }

    /// Property: emitted source always reads back
    #[test]
    fn prop_emitted_source_reads_back(fields in field_list_strategy()) {
        let source = emit(&fields).unwrap();
        prop_assert!(evaluate_source(&source).is_ok(), "{}", source);
    }

    /// Property: both backends agree on every sample
    #[test]
    fn prop_backends_agree(
        fields in field_list_strategy(),
        samples in proptest::collection::vec(sample_strategy(), 1..6),
    ) {
        assert_parity(&fields, &samples);
    }

    /// Property: emitting is deterministic
    #[test]
    fn prop_emit_is_deterministic(fields in field_list_strategy()) {
        prop_assert_eq!(emit(&fields).unwrap(), emit(&fields.clone()).unwrap());
    }
}
