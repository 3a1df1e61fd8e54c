//! Emit command handler

use super::utils::{display_name, load_document};
use crate::cli::EmitArgs;
use crate::config::Config;
use crate::error::{ErrorContext, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use fieldsmith_core::{emit_with, lint, EmitOptions};
use serde::Serialize;
use tracing::info;

#[derive(Serialize)]
struct EmittedModule<'a> {
    schema_name: String,
    type_name: String,
    source: &'a str,
}

/// Layout from configuration, then the document name, then flags
fn emit_options(args: &EmitArgs, config: &Config, document_name: Option<&str>) -> EmitOptions {
    let mut options = config.emit_options();

    if let Some(name) = args.name.as_deref().or(document_name) {
        options.schema_name = name.to_string();
    }
    if let Some(type_name) = &args.type_name {
        options.type_name = Some(type_name.clone());
    }
    if args.no_import {
        options.include_import = false;
    }
    if args.no_type {
        options.include_type_export = false;
    }
    if let Some(indent) = args.indent {
        options.indent = indent;
    }
    if let Some(max_depth) = args.max_depth {
        options.lower.max_depth = max_depth;
    }

    options
}

/// Handle the emit command
pub fn handle_emit(args: EmitArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("emit", &display_name(&args.fields));

    let document = load_document(&args.fields)?;
    let options = emit_options(&args, config, document.name.as_deref());
    let source = emit_with(&document.fields, &options)?;

    info!(
        fields = document.fields.len(),
        schema = %options.schema_identifier(),
        bytes = source.len(),
        "emitted module"
    );

    if output.is_verbose() {
        let report = lint(&document.fields, &options.lower)?;
        for diagnostic in report.warnings() {
            output.debug(&diagnostic.to_string())?;
        }
    }

    if let Some(path) = &args.output_file {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, &source).with_context(|| format!("writing {}", path.display()))?;
        output.success(&format!("✓ Wrote {} to {}", options.schema_identifier(), path.display()))?;
        return Ok(());
    }

    if output.is_human() {
        output.write(&source)
    } else {
        output.data(&EmittedModule {
            schema_name: options.schema_identifier(),
            type_name: options.type_identifier(),
            source: &source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn args(fields: PathBuf) -> EmitArgs {
        EmitArgs {
            fields,
            name: None,
            type_name: None,
            no_import: false,
            no_type: false,
            indent: None,
            max_depth: None,
            output_file: None,
        }
    }

    #[test]
    fn test_option_precedence() {
        let mut config = Config::default();
        config.emit.schema_name = "fromConfig".to_string();
        config.emit.indent = 4;

        let plain = args(PathBuf::from("fields.json"));
        let options = emit_options(&plain, &config, None);
        assert_eq!(options.schema_name, "fromConfig");
        assert_eq!(options.indent, 4);

        let options = emit_options(&plain, &config, Some("document name"));
        assert_eq!(options.schema_name, "document name");

        let flagged = EmitArgs {
            name: Some("flag".to_string()),
            no_import: true,
            indent: Some(2),
            max_depth: Some(3),
            ..args(PathBuf::from("fields.json"))
        };
        let options = emit_options(&flagged, &config, Some("document name"));
        assert_eq!(options.schema_name, "flag");
        assert!(!options.include_import);
        assert!(options.include_type_export);
        assert_eq!(options.indent, 2);
        assert_eq!(options.lower.max_depth, 3);
    }

    #[test]
    fn test_emit_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let fields = temp_dir.path().join("fields.json");
        std::fs::write(&fields, r#"[{"name": "title", "type": "string"}]"#).unwrap();
        let target = temp_dir.path().join("out").join("schema.ts");

        let emit_args = EmitArgs {
            output_file: Some(target.clone()),
            no_type: true,
            ..args(fields)
        };
        let mut output = OutputWriter::with_writer(OutputFormat::Human, false, true, 0, Box::new(std::io::sink()));
        handle_emit(emit_args, &Config::default(), &mut output).unwrap();

        let source = std::fs::read_to_string(target).unwrap();
        assert!(source.starts_with("import { z } from \"zod\";"));
        assert!(source.contains("title: z.string()"));
        assert!(!source.contains("export type"));
    }
}
