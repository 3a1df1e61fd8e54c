//! Check command handler

use super::utils::{display_name, is_source_file, load_document, load_samples, read_input};
use crate::cli::CheckArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::{CheckReport, OutputWriter, SampleReport};
use fieldsmith_core::{compile_with, emit_with, evaluate_source_with, Validator};
use tracing::debug;

const VALIDATOR: &str = "validator";
const EMITTED_SOURCE: &str = "emitted-source";

/// Build the validator the flags ask for, with the backend name
fn build_validator(args: &CheckArgs, config: &Config) -> Result<(Validator, &'static str)> {
    let lower = config.lower_options();

    if is_source_file(&args.schema) {
        let source = read_input(&args.schema)?;
        return Ok((evaluate_source_with(&source, &lower)?, EMITTED_SOURCE));
    }

    let document = load_document(&args.schema)?;
    if args.via_source {
        let mut options = config.emit_options();
        if let Some(name) = &document.name {
            options.schema_name = name.clone();
        }
        let source = emit_with(&document.fields, &options)?;
        debug!(bytes = source.len(), "validating through emitted source");
        Ok((evaluate_source_with(&source, &lower)?, EMITTED_SOURCE))
    } else {
        Ok((compile_with(&document.fields, &lower)?, VALIDATOR))
    }
}

/// Handle the check command
pub fn handle_check(args: CheckArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("check", &display_name(&args.schema));

    let samples = load_samples(&args.samples, &args.data)?;
    if samples.is_empty() {
        return Err(Error::invalid_args(
            "no samples given; pass sample files or --data '<json>'",
        ));
    }

    let (validator, backend) = build_validator(&args, config)?;

    let reports: Vec<SampleReport> = samples
        .into_iter()
        .map(|(label, value)| {
            let outcome = validator.safe_parse(&value);
            SampleReport {
                label,
                success: outcome.is_success(),
                value: if args.show_value {
                    outcome.value().map(|v| v.to_tagged_json())
                } else {
                    None
                },
                issues: outcome
                    .issues()
                    .map(|issues| issues.issues.clone())
                    .unwrap_or_default(),
            }
        })
        .collect();

    let report = CheckReport {
        schema: display_name(&args.schema),
        backend: backend.to_string(),
        samples: reports,
    };
    output.check_report(&report)?;

    match report.failed() {
        0 => Ok(()),
        failed => Err(Error::ValidationFailed {
            failed,
            total: report.samples.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const FIELDS: &str = r#"[{"name": "age", "type": "number", "params": {"coerce": true},
        "validations": [{"kind": "min", "value": "0"}, {"kind": "int"}]}]"#;

    fn quiet() -> OutputWriter {
        OutputWriter::with_writer(OutputFormat::Json, false, true, 0, Box::new(std::io::sink()))
    }

    fn check_args(schema: PathBuf, data: &[&str], via_source: bool) -> CheckArgs {
        CheckArgs {
            schema,
            samples: Vec::new(),
            data: data.iter().map(|d| d.to_string()).collect(),
            via_source,
            show_value: true,
        }
    }

    #[test]
    fn test_check_accepts_and_rejects() {
        let temp_dir = TempDir::new().unwrap();
        let fields = temp_dir.path().join("fields.json");
        std::fs::write(&fields, FIELDS).unwrap();

        for via_source in [false, true] {
            let ok = check_args(fields.clone(), &[r#"{"age": "5"}"#], via_source);
            assert!(handle_check(ok, &Config::default(), &mut quiet()).is_ok());

            let bad = check_args(fields.clone(), &[r#"{"age": 1}"#, r#"{"age": -1}"#], via_source);
            match handle_check(bad, &Config::default(), &mut quiet()) {
                Err(Error::ValidationFailed { failed, total }) => assert_eq!((failed, total), (1, 2)),
                other => panic!("unexpected result {:?}", other),
            }
        }
    }

    #[test]
    fn test_check_emitted_module_file() {
        let temp_dir = TempDir::new().unwrap();
        let module = temp_dir.path().join("schema.ts");
        std::fs::write(
            &module,
            "import { z } from \"zod\";\n\nexport const schema = z.object({\n  age: z.coerce.number().min(0).int(),\n});\n",
        )
        .unwrap();

        let args = check_args(module, &[r#"{"age": "3"}"#], false);
        let (_, backend) = build_validator(&args, &Config::default()).unwrap();
        assert_eq!(backend, EMITTED_SOURCE);
        assert!(handle_check(args, &Config::default(), &mut quiet()).is_ok());
    }

    #[test]
    fn test_check_without_samples() {
        let args = check_args(PathBuf::from("fields.json"), &[], false);
        let err = handle_check(args, &Config::default(), &mut quiet()).unwrap_err();
        assert!(err.should_show_help());
    }
}
