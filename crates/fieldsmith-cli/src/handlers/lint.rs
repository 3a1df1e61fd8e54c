//! Lint command handler

use super::utils::{display_name, load_document};
use crate::cli::LintArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use fieldsmith_core::lint;
use tracing::info;

/// Handle the lint command
pub fn handle_lint(args: LintArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("lint", &display_name(&args.fields));

    let document = load_document(&args.fields)?;
    let report = lint(&document.fields, &config.lower_options())?;

    info!(
        diagnostics = report.diagnostics.len(),
        warnings = report.warning_count(),
        "lint complete"
    );
    output.lint_report(&report)?;

    let warnings = report.warning_count();
    if args.deny_warnings && warnings > 0 {
        return Err(Error::LintFailed { warnings });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use tempfile::TempDir;

    fn run(fields: &str, deny_warnings: bool) -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("fields.json");
        std::fs::write(&path, fields).unwrap();

        let mut output = OutputWriter::with_writer(OutputFormat::Json, false, true, 0, Box::new(std::io::sink()));
        handle_lint(
            LintArgs {
                fields: path,
                deny_warnings,
            },
            &Config::default(),
            &mut output,
        )
    }

    #[test]
    fn test_warnings_fail_only_when_denied() {
        let fields = r#"[{"name": "title", "type": "string", "validations": [{"kind": "positive"}]}]"#;
        assert!(run(fields, false).is_ok());
        assert!(matches!(run(fields, true), Err(Error::LintFailed { warnings: 1 })));
    }

    #[test]
    fn test_clean_document_passes() {
        let fields = r#"[{"name": "title", "type": "string", "validations": [{"kind": "min", "value": "1"}]}]"#;
        assert!(run(fields, true).is_ok());
    }
}
