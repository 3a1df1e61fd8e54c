//! Output formatting and writing utilities
//!
//! This module formats command results as JSON, YAML or human-readable text,
//! with specialized human layouts for lint reports, sample checks, parity
//! runs and the type catalog, plus progress indicators.

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use fieldsmith_core::registry::{TypeCategory, TypeInfo};
use fieldsmith_core::{Issue, LintReport, Severity};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::io::{self, IsTerminal, Write};
use std::time::Duration;
use tracing::{debug, trace};

/// Outcome of validating one sample
#[derive(Debug, Clone, Serialize)]
pub struct SampleReport {
    /// File name, `--data #n`, or `file[i]` for array elements
    pub label: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<Issue>,
}

/// Result of the `check` command
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    pub schema: String,
    /// `validator` or `emitted-source`
    pub backend: String,
    pub samples: Vec<SampleReport>,
}

impl CheckReport {
    pub fn failed(&self) -> usize {
        self.samples.iter().filter(|s| !s.success).count()
    }
}

/// A sample on which the two backends disagreed
#[derive(Debug, Clone, Serialize)]
pub struct ParityMismatch {
    pub label: String,
    pub validator: serde_json::Value,
    pub emitted: serde_json::Value,
}

/// Result of the `parity` command
#[derive(Debug, Clone, Serialize)]
pub struct ParityReport {
    pub schema: String,
    pub samples: usize,
    pub accepted: usize,
    pub mismatches: Vec<ParityMismatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Trait for formatting output with specialized support for common types
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format a lint report grouped by severity
    fn format_lint_report(&self, report: &LintReport) -> Result<String>;

    /// Format per-sample outcomes
    fn format_check_report(&self, report: &CheckReport) -> Result<String>;

    /// Format a parity summary with every disagreement
    fn format_parity_report(&self, report: &ParityReport) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
        }
    }

    fn format_lint_report(&self, report: &LintReport) -> Result<String> {
        match self {
            OutputFormat::Human => format_lint_report_human(report),
            _ => self.format(report),
        }
    }

    fn format_check_report(&self, report: &CheckReport) -> Result<String> {
        match self {
            OutputFormat::Human => format_check_report_human(report),
            _ => self.format(report),
        }
    }

    fn format_parity_report(&self, report: &ParityReport) -> Result<String> {
        match self {
            OutputFormat::Human => format_parity_report_human(report),
            _ => self.format(report),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    show_progress: bool,
    quiet: bool,
    verbose: u8,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer on stdout
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool, verbose: u8) -> Self {
        Self {
            format,
            use_color,
            show_progress: !quiet && io::stdout().is_terminal(),
            quiet,
            verbose,
            writer: Box::new(io::stdout()),
        }
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        verbose: u8,
        writer: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            show_progress: false,
            quiet,
            verbose,
            writer,
        }
    }

    /// Turn progress indicators off, e.g. when the configuration disables them
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    pub fn use_color(&self) -> bool {
        self.use_color
    }

    pub fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Write raw output
    pub fn write(&mut self, content: &str) -> Result<()> {
        write!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        debug!("Output info: {}", message);

        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write an error message
    pub fn error(&mut self, message: &str) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.red().to_string())
        } else {
            self.writeln(&format!("ERROR: {}", message))
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        self.writeln("")?;
        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = self.format.format(value)?;
        trace!(bytes = formatted.len(), "Outputting data");

        if self.format == OutputFormat::Yaml {
            // serde_yaml already ends with a newline
            self.write(&formatted)
        } else {
            self.writeln(&formatted)
        }
    }

    pub fn lint_report(&mut self, report: &LintReport) -> Result<()> {
        let formatted = self.format.format_lint_report(report)?;
        self.write_report(&formatted)
    }

    pub fn check_report(&mut self, report: &CheckReport) -> Result<()> {
        let formatted = self.format.format_check_report(report)?;
        self.write_report(&formatted)
    }

    pub fn parity_report(&mut self, report: &ParityReport) -> Result<()> {
        let formatted = self.format.format_parity_report(report)?;
        self.write_report(&formatted)
    }

    fn write_report(&mut self, formatted: &str) -> Result<()> {
        if formatted.ends_with('\n') {
            self.write(formatted)
        } else {
            self.writeln(formatted)
        }
    }

    /// The type catalog as a table, or serialized for machine formats
    pub fn type_catalog(&mut self, entries: &[TypeInfo]) -> Result<()> {
        if !self.is_human() {
            return self.data(&entries);
        }

        let rows = entries
            .iter()
            .map(|info| {
                vec![
                    info.tag.to_string(),
                    category_name(info.category).to_string(),
                    if info.coercible { "yes" } else { "" }.to_string(),
                    info.label.to_string(),
                ]
            })
            .collect();
        self.table(&["TAG", "CATEGORY", "COERCE", "DESCRIPTION"], rows)
    }

    /// One catalog entry with its full rule list
    pub fn type_detail(&mut self, info: &TypeInfo) -> Result<()> {
        if !self.is_human() {
            return self.data(info);
        }

        self.section(info.tag.as_str())?;
        self.writeln(&format!("Description: {}", info.label))?;
        self.writeln(&format!("Category:    {}", category_name(info.category)))?;
        self.writeln(&format!("Coercible:   {}", if info.coercible { "yes" } else { "no" }))?;
        self.writeln("Rules:")?;
        for rule in &info.rules {
            self.writeln(&format!("  • {}", rule))?;
        }
        Ok(())
    }

    /// Create a progress bar for long operations
    pub fn progress_bar(&self, length: u64, message: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new(length);
        pb.set_style(default_progress_style());
        pb.set_message(message.to_string());
        Some(pb)
    }

    /// Create a spinner for indeterminate progress
    pub fn spinner(&self, message: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(default_spinner_style());
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }

    /// Check if verbose output should be shown
    pub fn is_verbose(&self) -> bool {
        self.verbose > 0
    }

    /// Write debug information if verbose mode is enabled
    pub fn debug(&mut self, message: &str) -> Result<()> {
        if self.verbose > 0 && self.is_human() {
            if self.use_color {
                self.writeln(&format!("{} {}", "DEBUG:".dimmed(), message.dimmed()))
            } else {
                self.writeln(&format!("DEBUG: {}", message))
            }
        } else {
            Ok(())
        }
    }

    /// Write a table (for human format)
    pub fn table(&mut self, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        // Calculate column widths
        let mut widths = headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.chars().count());
                }
            }
        }

        let header_row = headers
            .iter()
            .enumerate()
            .map(|(i, h)| format!("{:width$}", h, width = widths[i]))
            .collect::<Vec<_>>()
            .join(" │ ");

        if self.use_color {
            self.writeln(&header_row.bold().to_string())?;
        } else {
            self.writeln(&header_row)?;
        }

        let separator = widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─");
        self.writeln(&separator)?;

        for row in rows {
            let row_str = row
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    if i < widths.len() {
                        format!("{:width$}", cell, width = widths[i])
                    } else {
                        cell.clone()
                    }
                })
                .collect::<Vec<_>>()
                .join(" │ ");
            self.writeln(row_str.trim_end())?;
        }

        Ok(())
    }
}

/// Helper function to create a progress bar style
pub fn default_progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

/// Helper function to create a spinner style
pub fn default_spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn category_name(category: TypeCategory) -> &'static str {
    match category {
        TypeCategory::Primitive => "primitive",
        TypeCategory::Literal => "literal",
        TypeCategory::Structural => "structural",
        TypeCategory::Composite => "composite",
    }
}

/// Format a lint report for human reading
fn format_lint_report_human(report: &LintReport) -> Result<String> {
    let mut output = String::new();

    if report.is_clean() {
        output.push_str("✅ No issues found\n");
        return Ok(output);
    }

    let warnings = report.warning_count();
    let infos = report.diagnostics.len() - warnings;
    output.push_str(&format!(
        "🔍 Lint Report - {} warning(s), {} note(s)\n\n",
        warnings, infos
    ));

    let skipped = report.skipped_rules().count();
    if skipped > 0 {
        output.push_str(&format!("  {} rule(s) have no effect in either backend\n\n", skipped));
    }

    for severity in [Severity::Warning, Severity::Info] {
        let items: Vec<_> = report
            .diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .collect();
        if items.is_empty() {
            continue;
        }

        let (icon, title) = match severity {
            Severity::Warning => ("⚠️", "Warnings"),
            Severity::Info => ("ℹ️", "Notes"),
        };
        output.push_str(&format!("{} {}:\n", icon, title));

        for item in items {
            output.push_str(&format!("  📍 {} [{}]\n", item.path, item.kind.code()));
            output.push_str(&format!("     {}\n", item.message));
            if let Some(rule_id) = &item.rule_id {
                output.push_str(&format!("     rule id: {}\n", rule_id));
            }
        }
        output.push('\n');
    }

    Ok(output)
}

/// Format sample outcomes for human reading
fn format_check_report_human(report: &CheckReport) -> Result<String> {
    let mut output = String::new();
    let failed = report.failed();

    output.push_str(&format!(
        "═══ {} ({}) ═══\n\n",
        report.schema, report.backend
    ));

    for sample in &report.samples {
        if sample.success {
            output.push_str(&format!("✅ {}\n", sample.label));
            if let Some(value) = &sample.value {
                output.push_str(&format!("   → {}\n", serde_json::to_string(value)?));
            }
        } else {
            output.push_str(&format!("❌ {}\n", sample.label));
            for issue in &sample.issues {
                output.push_str(&format!("   {} [{}] {}\n", issue.path, issue.code, issue.message));
            }
        }
    }

    output.push_str(&format!(
        "\n{} accepted, {} rejected\n",
        report.samples.len() - failed,
        failed
    ));
    Ok(output)
}

/// Format a parity run for human reading
fn format_parity_report_human(report: &ParityReport) -> Result<String> {
    let mut output = String::new();

    if let Some(source) = &report.source {
        output.push_str(source);
        if !source.ends_with('\n') {
            output.push('\n');
        }
        output.push('\n');
    }

    if report.mismatches.is_empty() {
        output.push_str(&format!(
            "✅ {}: validator and emitted source agree on {} sample(s) ({} accepted)\n",
            report.schema, report.samples, report.accepted
        ));
        return Ok(output);
    }

    output.push_str(&format!(
        "❌ {}: {} of {} sample(s) disagree\n\n",
        report.schema,
        report.mismatches.len(),
        report.samples
    ));
    for mismatch in &report.mismatches {
        output.push_str(&format!("📍 {}\n", mismatch.label));
        output.push_str(&format!("   validator: {}\n", serde_json::to_string(&mismatch.validator)?));
        output.push_str(&format!("   emitted:   {}\n", serde_json::to_string(&mismatch.emitted)?));
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    include!("output/tests.rs");
}
