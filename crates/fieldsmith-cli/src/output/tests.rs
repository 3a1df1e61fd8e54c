// Tests for output formatting
//
// These cover the human layouts for lint, check and parity reports, the
// type catalog table, and the machine formats.

use super::*;
use fieldsmith_core::model::{FieldSpec, RuleKind, TypeTag};
use fieldsmith_core::{lint, IssueCode, LowerOptions};
use std::sync::{Arc, Mutex};

/// A writer whose contents can be inspected after the `OutputWriter` owns it
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn writer(format: OutputFormat) -> (OutputWriter, SharedBuffer) {
    let buffer = SharedBuffer::default();
    let output = OutputWriter::with_writer(format, false, false, 0, Box::new(buffer.clone()));
    (output, buffer)
}

fn check_report() -> CheckReport {
    CheckReport {
        schema: "userProfile".to_string(),
        backend: "validator".to_string(),
        samples: vec![
            SampleReport {
                label: "ok.json".to_string(),
                success: true,
                value: Some(serde_json::json!({"age": 5})),
                issues: Vec::new(),
            },
            SampleReport {
                label: "--data #2".to_string(),
                success: false,
                value: None,
                issues: vec![Issue::new("$.age", IssueCode::TooSmall, "Number must be greater than or equal to 0")],
            },
        ],
    }
}

#[test]
fn test_check_report_human() {
    let formatted = format_check_report_human(&check_report()).unwrap();

    assert!(formatted.contains("═══ userProfile (validator) ═══"));
    assert!(formatted.contains("✅ ok.json"));
    assert!(formatted.contains("→ {\"age\":5}"));
    assert!(formatted.contains("❌ --data #2"));
    assert!(formatted.contains("$.age"));
    assert!(formatted.contains("1 accepted, 1 rejected"));
}

#[test]
fn test_check_report_json_skips_empty_fields() {
    let formatted = OutputFormat::Json.format_check_report(&check_report()).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&formatted).unwrap();

    assert_eq!(parsed["samples"][0]["success"], true);
    assert!(parsed["samples"][0].get("issues").is_none());
    assert!(parsed["samples"][1].get("value").is_none());
    assert_eq!(parsed["samples"][1]["issues"][0]["path"], "$.age");
}

#[test]
fn test_lint_report_human() {
    let fields = vec![FieldSpec::of("title", TypeTag::String)
        .rule(RuleKind::Int, "")
        .rule(RuleKind::Min, "2")];
    let report = lint(&fields, &LowerOptions::default()).unwrap();
    let formatted = format_lint_report_human(&report).unwrap();

    assert!(formatted.contains("🔍 Lint Report - 1 warning(s)"));
    assert!(formatted.contains("1 rule(s) have no effect"));
    assert!(formatted.contains("[inapplicable_rule]"));
    assert!(formatted.contains("⚠️ Warnings:"));
}

#[test]
fn test_clean_lint_report() {
    let formatted = format_lint_report_human(&LintReport::default()).unwrap();
    assert_eq!(formatted, "✅ No issues found\n");
}

#[test]
fn test_parity_report_human() {
    let agreeing = ParityReport {
        schema: "schema".to_string(),
        samples: 24,
        accepted: 3,
        mismatches: Vec::new(),
        source: None,
    };
    let formatted = format_parity_report_human(&agreeing).unwrap();
    assert!(formatted.contains("agree on 24 sample(s) (3 accepted)"));

    let disagreeing = ParityReport {
        mismatches: vec![ParityMismatch {
            label: "battery #4".to_string(),
            validator: serde_json::json!({"success": true, "data": 3}),
            emitted: serde_json::json!({"success": false, "issues": []}),
        }],
        source: Some("export const schema = z.number();".to_string()),
        ..agreeing
    };
    let formatted = format_parity_report_human(&disagreeing).unwrap();
    assert!(formatted.starts_with("export const schema = z.number();\n\n"));
    assert!(formatted.contains("1 of 24 sample(s) disagree"));
    assert!(formatted.contains("📍 battery #4"));
}

#[test]
fn test_type_catalog_table() {
    let (mut output, buffer) = writer(OutputFormat::Human);
    let catalog = fieldsmith_core::registry::catalog();
    output.type_catalog(&catalog).unwrap();

    let contents = buffer.contents();
    let mut lines = contents.lines();
    assert!(lines.next().unwrap().starts_with("TAG"));
    assert!(lines.next().unwrap().contains("─┼─"));
    assert_eq!(contents.lines().count(), 2 + catalog.len());
    assert!(contents.contains("discriminatedUnion"));
}

#[test]
fn test_type_catalog_json() {
    let (mut output, buffer) = writer(OutputFormat::Json);
    output.type_catalog(&fieldsmith_core::registry::catalog()).unwrap();

    let parsed: serde_json::Value = serde_json::from_str(buffer.contents().trim()).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 27);
    assert_eq!(parsed[0]["tag"], "string");
}

#[test]
fn test_messages_respect_format_and_quiet() {
    let (mut human, buffer) = writer(OutputFormat::Human);
    human.info("loading").unwrap();
    human.warning("careful").unwrap();
    human.section("Results").unwrap();
    assert_eq!(buffer.contents(), "INFO: loading\nWARNING: careful\n\n=== Results ===\n");

    let (mut json, buffer) = writer(OutputFormat::Json);
    json.info("loading").unwrap();
    json.success("done").unwrap();
    assert!(buffer.contents().is_empty());

    let buffer = SharedBuffer::default();
    let mut quiet = OutputWriter::with_writer(OutputFormat::Human, false, true, 0, Box::new(buffer.clone()));
    quiet.success("done").unwrap();
    quiet.error("broken").unwrap();
    assert_eq!(buffer.contents(), "ERROR: broken\n");
}

#[test]
fn test_yaml_data() {
    let (mut output, buffer) = writer(OutputFormat::Yaml);
    output.data(&serde_json::json!({"name": "schema"})).unwrap();
    assert_eq!(buffer.contents(), "name: schema\n");
}

#[test]
fn test_no_progress_with_custom_writer() {
    let (output, _) = writer(OutputFormat::Human);
    assert!(output.progress_bar(10, "cases").is_none());
    assert!(output.spinner("working").is_none());
}
