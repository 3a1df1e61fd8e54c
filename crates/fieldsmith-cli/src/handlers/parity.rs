//! Parity command handler
//!
//! Runs every sample through the validator compiled from the field tree and
//! through the validator read back from the emitted source, and reports any
//! sample on which their outcomes differ.

use super::utils::{display_name, load_document, load_samples};
use crate::cli::ParityArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::{OutputWriter, ParityMismatch, ParityReport};
use fieldsmith_core::{compile_with, emit_with, evaluate_source_with, FieldSpec, PromiseState, Value};
use tracing::{info, warn};

/// One value of every runtime type, plus the edge cases rules care about
fn battery_values() -> Vec<Value> {
    vec![
        Value::Undefined,
        Value::Null,
        Value::Bool(true),
        Value::Bool(false),
        Value::from(0),
        Value::from(3),
        Value::from(2.5),
        Value::from(-7),
        Value::Number(f64::NAN),
        Value::Number(f64::INFINITY),
        Value::BigInt(4),
        Value::BigInt(-4),
        Value::from(""),
        Value::from("abc"),
        Value::from("  a z  "),
        Value::from("42"),
        Value::from("user@example.com"),
        Value::from("https://example.com/a"),
        Value::from("2024-01-02T03:04:05.678Z"),
        Value::from("192.168.0.1"),
        Value::Date(1_700_000_000_000.0),
        Value::Date(f64::NAN),
        Value::Symbol("s".into()),
        Value::Array(Vec::new()),
        Value::Array(vec![Value::from(1), Value::from("a")]),
        Value::Array(vec![Value::from("a"), Value::from("b"), Value::from("c")]),
        Value::object([("type", Value::from("a"))]),
        Value::object([("kind", Value::from("circle")), ("radius", Value::from(2))]),
        Value::Set(vec![Value::from(1), Value::from(2)]),
        Value::Map(vec![(Value::from("k"), Value::from(1))]),
        Value::Promise(Box::new(PromiseState::Resolved(Value::from(1)))),
    ]
}

/// Battery samples for a root field list
///
/// The raw values exercise the root object itself; each field also gets
/// every value on its own, with its siblings absent.
fn default_battery(fields: &[FieldSpec]) -> Vec<(String, Value)> {
    let values = battery_values();
    let mut samples: Vec<(String, Value)> = values
        .iter()
        .enumerate()
        .map(|(i, value)| (format!("battery #{}", i), value.clone()))
        .collect();

    for field in fields.iter().filter(|f| !f.name.is_empty()) {
        for (i, value) in values.iter().enumerate() {
            samples.push((
                format!("{} #{}", field.name, i),
                Value::object([(field.name.as_str(), value.clone())]),
            ));
        }
    }

    samples
}

/// Handle the parity command
pub fn handle_parity(args: ParityArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("parity", &display_name(&args.fields));

    let document = load_document(&args.fields)?;
    let mut options = config.emit_options();
    if let Some(name) = &document.name {
        options.schema_name = name.clone();
    }

    let source = emit_with(&document.fields, &options)?;
    let validator = compile_with(&document.fields, &options.lower)?;
    let from_source = evaluate_source_with(&source, &options.lower)?;

    let samples = if args.samples.is_empty() {
        default_battery(&document.fields)
    } else {
        load_samples(&args.samples, &[])?
    };
    if samples.is_empty() {
        return Err(Error::invalid_args("sample files contain no samples"));
    }

    let progress = output.progress_bar(samples.len() as u64, "comparing backends");
    let mut accepted = 0;
    let mut mismatches = Vec::new();

    for (label, value) in &samples {
        let expected = validator.safe_parse(value);
        let actual = from_source.safe_parse(value);
        if expected.is_success() {
            accepted += 1;
        }

        let expected = expected.to_json();
        let actual = actual.to_json();
        if expected != actual {
            warn!(sample = %label, "backends disagree");
            mismatches.push(ParityMismatch {
                label: label.clone(),
                validator: expected,
                emitted: actual,
            });
        }

        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    info!(
        samples = samples.len(),
        accepted,
        mismatches = mismatches.len(),
        "parity run complete"
    );

    let report = ParityReport {
        schema: options.schema_identifier(),
        samples: samples.len(),
        accepted,
        mismatches,
        source: args.show_source.then_some(source),
    };
    output.parity_report(&report)?;

    match report.mismatches.len() {
        0 => Ok(()),
        count => Err(Error::ParityMismatch { count }),
    }
}
