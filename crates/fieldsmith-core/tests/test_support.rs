//! Shared test support utilities for integration tests

#![allow(dead_code)]

use fieldsmith_core::model::{FieldSpec, TypeTag};
use fieldsmith_core::{compile, emit, evaluate_source, FieldDocument, Validator, Value};
use serde_json::json;

/// Parse a field list from its wire JSON
pub fn fields(json: serde_json::Value) -> Vec<FieldSpec> {
    FieldDocument::from_json_value(json)
        .expect("field document parses")
        .fields
}

/// The validator built directly and the one read back from emitted source
pub fn both(fields: &[FieldSpec]) -> (Validator, Validator) {
    let compiled = compile(fields).expect("compile succeeds");
    let source = emit(fields).expect("emit succeeds");
    let evaluated = evaluate_source(&source)
        .unwrap_or_else(|err| panic!("emitted source does not read back: {}\n{}", err, source));
    (compiled, evaluated)
}

/// Assert both backends give the same outcome for every sample; returns acceptance
pub fn assert_parity(fields: &[FieldSpec], samples: &[Value]) -> Vec<bool> {
    let (compiled, evaluated) = both(fields);
    samples
        .iter()
        .map(|sample| {
            let direct = compiled.safe_parse(sample);
            let from_source = evaluated.safe_parse(sample);
            assert_eq!(
                direct.to_json(),
                from_source.to_json(),
                "backends disagree on {:?}\nsource:\n{}",
                sample,
                emit(fields).unwrap_or_default()
            );
            direct.is_success()
        })
        .collect()
}

/// Wrap a sample as the value of a single root field
pub fn under(name: &str, value: Value) -> Value {
    Value::object([(name, value)])
}

/// A spread of inputs touching every runtime type
pub fn sample_battery() -> Vec<Value> {
    vec![
        Value::Undefined,
        Value::Null,
        Value::Bool(true),
        Value::from(0),
        Value::from(3),
        Value::from(2.5),
        Value::from(-7),
        Value::Number(f64::NAN),
        Value::Number(f64::INFINITY),
        Value::BigInt(4),
        Value::from(""),
        Value::from("abc"),
        Value::from("  a z  "),
        Value::from("42"),
        Value::from("user@example.com"),
        Value::from("2024-01-02T03:04:05.678Z"),
        Value::from("192.168.0.1"),
        Value::Date(1_700_000_000_000.0),
        Value::Array(vec![Value::from(1), Value::from("a")]),
        Value::Array(vec![Value::from("a"), Value::from("b"), Value::from("c")]),
        Value::object([("type", Value::from("a"))]),
        Value::Set(vec![Value::from(1), Value::from(2)]),
        Value::Map(vec![(Value::from("k"), Value::from(1))]),
        Value::Symbol("s".into()),
    ]
}

/// A payload that makes `kind` meaningful on a field of `tag`
pub fn payload_for(tag: TypeTag, kind: &str) -> &'static str {
    match (tag, kind) {
        (TypeTag::Date, "min") => "2020-01-01",
        (TypeTag::Date, "max") => "2030-01-01",
        (_, "min") => "2",
        (_, "max") => "5",
        (_, "length") => "3",
        (_, "gt") => "1",
        (_, "lt") => "10",
        (_, "multipleOf") => "2",
        (_, "pattern") => "^a",
        (_, "includes") => "a",
        (_, "startsWith") => " ",
        (_, "endsWith") => "z",
        (_, "default") => "1",
        (_, "catch") => "x",
        (_, "transform") => "(v) => v",
        (_, "refine") => "(v) => v !== null",
        (_, "brand") => "Tagged",
        _ => "",
    }
}

/// The wire document for one field of `tag` carrying `rules`
pub fn single_field(tag: TypeTag, rules: &[(&str, &str)]) -> Vec<FieldSpec> {
    let validations: Vec<serde_json::Value> = rules
        .iter()
        .map(|(kind, value)| json!({ "kind": kind, "value": value }))
        .collect();
    fields(json!([{
        "name": "f",
        "type": tag.as_str(),
        "validations": validations,
    }]))
}
