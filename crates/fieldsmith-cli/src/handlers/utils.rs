//! Shared utilities for command handlers

use crate::error::{Error, Result};
use anyhow::Context;
use fieldsmith_core::{FieldDocument, Value};
use std::io::Read;
use std::path::Path;

/// Path argument meaning standard input
pub const STDIN: &str = "-";

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == STDIN
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Whether `path` holds emitted TypeScript rather than a field document
pub fn is_source_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("ts") | Some("mts") | Some("cts") | Some("js") | Some("mjs")
    )
}

/// Read a file, or standard input for `-`
pub fn read_input(path: &Path) -> Result<String> {
    if is_stdin(path) {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("reading standard input")?;
        return Ok(content);
    }

    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(content)
}

/// Parse JSON, or YAML when the extension says so, into a JSON value
pub fn parse_structured(path: &Path, content: &str) -> Result<serde_json::Value> {
    if is_yaml(path) {
        Ok(serde_yaml::from_str(content)?)
    } else {
        serde_json::from_str(content).map_err(|_| Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: "JSON".to_string(),
        })
    }
}

/// Load a field document from JSON, YAML or standard input
pub fn load_document(path: &Path) -> Result<FieldDocument> {
    let content = read_input(path)?;
    let value = parse_structured(path, &content)?;
    Ok(FieldDocument::from_json_value(value)?)
}

/// Samples from files and inline `--data` arguments, in tagged JSON
///
/// A file holding a top-level array contributes one sample per element;
/// wrap a sample in an extra array to check an array value.
pub fn load_samples(files: &[impl AsRef<Path>], inline: &[String]) -> Result<Vec<(String, Value)>> {
    let mut samples = Vec::new();

    for path in files {
        let path = path.as_ref();
        let label = display_name(path);
        let json = parse_structured(path, &read_input(path)?)?;
        match json {
            serde_json::Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    samples.push((format!("{}[{}]", label, i), Value::from_tagged_json(item)));
                }
            }
            other => samples.push((label, Value::from_tagged_json(&other))),
        }
    }

    for (i, data) in inline.iter().enumerate() {
        let json: serde_json::Value = serde_json::from_str(data)
            .map_err(|e| Error::invalid_args(format!("--data #{} is not JSON: {}", i + 1, e)))?;
        samples.push((format!("--data #{}", i + 1), Value::from_tagged_json(&json)));
    }

    Ok(samples)
}

/// Short name for reports
pub fn display_name(path: &Path) -> String {
    if is_stdin(path) {
        return "<stdin>".to_string();
    }
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_load_document_json_and_yaml() {
        let temp_dir = TempDir::new().unwrap();

        let json_path = temp_dir.path().join("fields.json");
        std::fs::write(
            &json_path,
            r#"{"name": "profile", "fields": [{"name": "age", "type": "number"}]}"#,
        )
        .unwrap();
        let document = load_document(&json_path).unwrap();
        assert_eq!(document.name.as_deref(), Some("profile"));
        assert_eq!(document.fields.len(), 1);

        let yaml_path = temp_dir.path().join("fields.yaml");
        std::fs::write(&yaml_path, "- name: title\n  type: string\n- name: tags\n  type: array\n").unwrap();
        let document = load_document(&yaml_path).unwrap();
        assert_eq!(document.name, None);
        assert_eq!(document.fields.len(), 2);
    }

    #[test]
    fn test_missing_and_malformed_documents() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("absent.json");
        assert!(matches!(load_document(&missing), Err(Error::FileNotFound { .. })));

        let broken = temp_dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(load_document(&broken), Err(Error::InvalidFormat { .. })));
    }

    #[test]
    fn test_load_samples_splits_arrays_and_reads_tags() {
        let temp_dir = TempDir::new().unwrap();
        let many = temp_dir.path().join("many.json");
        std::fs::write(&many, r#"[{"age": 1}, {"age": {"$bigint": "9"}}]"#).unwrap();
        let one = temp_dir.path().join("one.json");
        std::fs::write(&one, r#"{"age": {"$undefined": true}}"#).unwrap();

        let samples = load_samples(&[many, one], &[r#"{"age": "5"}"#.to_string()]).unwrap();
        let labels: Vec<&str> = samples.iter().map(|(label, _)| label.as_str()).collect();
        assert_eq!(labels, vec!["many.json[0]", "many.json[1]", "one.json", "--data #1"]);

        assert_eq!(samples[1].1.get("age"), Some(&Value::BigInt(9)));
        assert_eq!(samples[2].1.get("age"), Some(&Value::Undefined));
        assert_eq!(samples[3].1.get("age"), Some(&Value::from("5")));
    }

    #[test]
    fn test_inline_sample_must_be_json() {
        let err = load_samples(&[] as &[PathBuf], &["{oops".to_string()]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgs(_)));
    }

    #[test]
    fn test_source_detection_and_names() {
        assert!(is_source_file(Path::new("schema.ts")));
        assert!(!is_source_file(Path::new("fields.json")));
        assert_eq!(display_name(Path::new("-")), "<stdin>");
        assert_eq!(display_name(Path::new("dir/fields.json")), "fields.json");
    }
}
