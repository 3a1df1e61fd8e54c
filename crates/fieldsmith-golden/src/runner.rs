//! Golden case runner: backend parity, expected validity and snapshots

use crate::{
    corpus::{CorpusCase, CorpusManager, CorpusStatistics},
    diff::DiffEngine,
    snapshot::SnapshotManager,
    GoldenConfig, GoldenError, Result,
};
use colored::*;
use fieldsmith_core::{compile_with, emit_with, evaluate_source_with, lint, EmitOptions, LowerOptions};
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, warn};

/// Result of running one golden case
#[derive(Debug, Serialize)]
pub struct CaseResult {
    /// `category/name` of the case
    pub name: String,

    pub passed: bool,

    /// Disabled cases pass without running
    pub skipped: bool,

    /// Every check that failed, in the order found
    pub failures: Vec<String>,

    /// Snapshot diff when the emitted source changed
    pub diff: Option<String>,

    pub samples_checked: usize,

    pub duration_ms: u64,

    /// Whether the snapshot was created or rewritten
    pub updated: bool,
}

impl CaseResult {
    fn errored(name: String, error: &GoldenError) -> Self {
        Self {
            name,
            passed: false,
            skipped: false,
            failures: vec![error.to_string()],
            diff: None,
            samples_checked: 0,
            duration_ms: 0,
            updated: false,
        }
    }

    /// Print the case result
    pub fn print(&self, verbose: bool) {
        let status = if self.skipped {
            "SKIP".yellow().bold()
        } else if self.passed {
            "PASS".green().bold()
        } else {
            "FAIL".red().bold()
        };

        println!(
            "{} {} ({} samples, {}ms)",
            status, self.name, self.samples_checked, self.duration_ms
        );

        for failure in &self.failures {
            println!("  {}: {}", "Error".red(), failure);
        }

        if verbose || !self.passed {
            if let Some(ref diff) = self.diff {
                println!("{}", diff);
            }
        }

        if self.updated {
            println!("  {}", "Snapshot updated".yellow());
        }
    }
}

/// Runs golden cases from a corpus directory
pub struct GoldenTestRunner {
    config: GoldenConfig,
    corpus_manager: CorpusManager,
    snapshot_manager: SnapshotManager,
}

impl GoldenTestRunner {
    pub fn new(config: GoldenConfig) -> Self {
        let corpus_manager = CorpusManager::new(&config.corpus_dir);
        let snapshot_manager = SnapshotManager::new(&config.snapshot_dir);

        Self {
            config,
            corpus_manager,
            snapshot_manager,
        }
    }

    pub fn corpus(&self) -> &CorpusManager {
        &self.corpus_manager
    }

    /// Run a single case by `category/name`; an error if it fails
    pub fn run_case(&self, case_id: &str) -> Result<CaseResult> {
        let case = self.corpus_manager.load_by_id(case_id)?;
        let result = self.check_case(&case);

        if self.config.verbose {
            result.print(true);
        }

        if result.passed {
            Ok(result)
        } else {
            Err(GoldenError::TestFailed(format!(
                "Case '{}' failed: {}",
                case_id,
                result.failures.join("; ")
            )))
        }
    }

    /// Run every case whose id or category contains `pattern` (`*` for all)
    pub fn run_batch(&self, pattern: &str) -> Result<Vec<CaseResult>> {
        let results = self.collect_batch(pattern)?;
        let failed = results.iter().filter(|r| !r.passed).count();

        for result in &results {
            result.print(self.config.verbose);
        }

        println!("\n{}", "=== Golden Summary ===".bold());
        println!(
            "{}: {} passed, {} failed",
            "Results".bold(),
            (results.len() - failed).to_string().green(),
            failed.to_string().red()
        );

        if failed > 0 {
            Err(GoldenError::TestFailed(format!("{} case(s) failed", failed)))
        } else {
            Ok(results)
        }
    }

    /// Run every matching case and return the results without printing
    pub fn collect_batch(&self, pattern: &str) -> Result<Vec<CaseResult>> {
        let cases = self.corpus_manager.discover_cases()?;
        let pattern = pattern.trim_end_matches("/*");

        let selected: Vec<_> = if pattern == "*" {
            cases
        } else {
            cases
                .into_iter()
                .filter(|c| c.id().contains(pattern) || c.category == pattern)
                .collect()
        };

        if selected.is_empty() {
            return Err(GoldenError::CorpusError(format!(
                "No cases found matching pattern '{}'",
                pattern
            )));
        }

        debug!(count = selected.len(), pattern, "running golden cases");
        Ok(selected.iter().map(|case| self.check_case(case)).collect())
    }

    /// Check one loaded case; problems are reported in the result
    pub fn check_case(&self, case: &CorpusCase) -> CaseResult {
        let start = Instant::now();
        let mut result = match self.execute_case(case) {
            Ok(result) => result,
            Err(e) => CaseResult::errored(case.id(), &e),
        };
        result.duration_ms = start.elapsed().as_millis() as u64;
        result
    }

    fn execute_case(&self, case: &CorpusCase) -> Result<CaseResult> {
        let mut result = CaseResult {
            name: case.id(),
            passed: true,
            skipped: false,
            failures: Vec::new(),
            diff: None,
            samples_checked: 0,
            duration_ms: 0,
            updated: false,
        };

        if !case.metadata.enabled {
            result.skipped = true;
            return Ok(result);
        }

        let lower = LowerOptions::default();
        let mut emit_options = EmitOptions {
            lower: lower.clone(),
            ..EmitOptions::default()
        };
        if let Some(name) = &case.schema_name {
            emit_options = emit_options.with_schema_name(name.clone());
        }

        let compiled = compile_with(&case.fields, &lower)?;
        let source = emit_with(&case.fields, &emit_options)?;
        let evaluated = evaluate_source_with(&source, &lower).map_err(|e| {
            GoldenError::TestFailed(format!("emitted source does not read back: {}", e))
        })?;

        for (index, sample) in case.samples.iter().enumerate() {
            let label = if sample.label.is_empty() {
                format!("#{}", index)
            } else {
                sample.label.clone()
            };
            let input = sample.value();
            let direct = compiled.safe_parse(&input);
            let from_source = evaluated.safe_parse(&input);

            if direct.to_json() != from_source.to_json() {
                result.failures.push(format!(
                    "sample {}: interpreter and emitted source disagree ({} vs {})",
                    label,
                    direct.to_json(),
                    from_source.to_json()
                ));
            } else if direct.is_success() != sample.valid {
                let expected = if sample.valid { "accepted" } else { "rejected" };
                result
                    .failures
                    .push(format!("sample {}: expected to be {}, got {}", label, expected, direct.to_json()));
            }
            result.samples_checked += 1;
        }

        if let Some(expected) = case.expectations.lint_warnings {
            let report = lint(&case.fields, &lower)?;
            if report.warning_count() != expected {
                result.failures.push(format!(
                    "expected {} lint warning(s), found {}",
                    expected,
                    report.warning_count()
                ));
            }
        }

        self.compare_snapshot(case, &source, &mut result)?;

        result.passed = result.failures.is_empty();
        Ok(result)
    }

    fn compare_snapshot(&self, case: &CorpusCase, source: &str, result: &mut CaseResult) -> Result<()> {
        let name = case.id();

        if !self.snapshot_manager.exists(&name) {
            if self.config.create_missing || self.config.update_snapshots {
                self.snapshot_manager.create(
                    &name,
                    source,
                    Some(case.metadata.description.clone()),
                    case.metadata.tags.clone(),
                )?;
                result.updated = true;
            } else {
                result.failures.push(format!(
                    "snapshot '{}' does not exist; run with UPDATE_GOLDEN=1 to create it",
                    name
                ));
            }
            return Ok(());
        }

        let snapshot = self.snapshot_manager.load(&name)?;

        let mut diff_engine = DiffEngine::new(self.config.diff_options.clone());
        for pattern in &case.expectations.volatile_patterns {
            diff_engine.add_volatile_pattern(pattern)?;
        }

        let diff_result = diff_engine.compare(&snapshot.source, source);
        if diff_result.matches {
            return Ok(());
        }

        if self.config.update_snapshots {
            self.snapshot_manager.backup(&name)?;
            self.snapshot_manager.update(&name, source)?;
            result.updated = true;
            result.diff = Some(diff_result.diff_output);
        } else {
            warn!(case = %name, line = ?diff_result.summary.first_difference, "emitted source changed");
            result.failures.push(format!(
                "emitted source differs from snapshot (+{} -{})",
                diff_result.summary.added, diff_result.summary.removed
            ));
            result.diff = Some(diff_result.diff_output);
        }
        Ok(())
    }

    /// Initialize the corpus with a starter case
    pub fn init_corpus(&self) -> Result<()> {
        self.corpus_manager.init_corpus()
    }

    /// `category/name` of every case
    pub fn list_cases(&self) -> Result<Vec<String>> {
        let cases = self.corpus_manager.discover_cases()?;
        Ok(cases.into_iter().map(|c| c.id()).collect())
    }

    pub fn get_statistics(&self) -> Result<CorpusStatistics> {
        self.corpus_manager.get_statistics()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::CASE_FILE;
    use std::fs;
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> GoldenConfig {
        GoldenConfig {
            corpus_dir: dir.path().to_path_buf(),
            snapshot_dir: dir.path().join("snapshots"),
            update_snapshots: false,
            create_missing: true,
            diff_options: crate::DiffOptions {
                colored: false,
                ..Default::default()
            },
            verbose: false,
        }
    }

    #[test]
    fn test_runner_creation() {
        let temp_dir = TempDir::new().unwrap();
        let runner = GoldenTestRunner::new(config(&temp_dir));
        runner.init_corpus().unwrap();

        assert_eq!(runner.list_cases().unwrap(), vec!["basic/starter".to_string()]);
    }

    #[test]
    fn test_starter_case_passes_and_creates_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let runner = GoldenTestRunner::new(config(&temp_dir));
        runner.init_corpus().unwrap();

        let first = runner.run_case("basic/starter").unwrap();
        assert!(first.updated);
        assert_eq!(first.samples_checked, 3);

        let second = runner.run_case("basic/starter").unwrap();
        assert!(!second.updated);
        assert!(temp_dir.path().join("snapshots/basic/starter.json").exists());
    }

    #[test]
    fn test_wrong_expectation_fails() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("basic/wrong");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join(CASE_FILE),
            r#"{
                "fields": [{ "name": "s", "type": "string" }],
                "samples": [{ "label": "number", "input": { "s": 1 }, "valid": true }],
                "metadata": { "description": "wrong on purpose" }
            }"#,
        )
        .unwrap();

        let runner = GoldenTestRunner::new(config(&temp_dir));
        let results = runner.collect_batch("basic").unwrap();
        assert_eq!(results.len(), 1);
        assert!(!results[0].passed);
        assert!(results[0].failures[0].contains("expected to be accepted"));
    }

    #[test]
    fn test_changed_source_reports_a_diff() {
        let temp_dir = TempDir::new().unwrap();
        let runner = GoldenTestRunner::new(config(&temp_dir));
        runner.init_corpus().unwrap();
        runner.run_case("basic/starter").unwrap();

        let manager = SnapshotManager::new(temp_dir.path().join("snapshots"));
        manager.update("basic/starter", "export const schema = z.any();\n").unwrap();

        let err = runner.run_case("basic/starter").unwrap_err();
        assert!(err.to_string().contains("differs from snapshot"));

        let mut updating = config(&temp_dir);
        updating.update_snapshots = true;
        let result = GoldenTestRunner::new(updating).run_case("basic/starter").unwrap();
        assert!(result.updated);
        assert!(result.diff.unwrap().contains("+export const schema = z.object({"));
    }

    #[test]
    fn test_missing_snapshot_without_create() {
        let temp_dir = TempDir::new().unwrap();
        let mut strict = config(&temp_dir);
        strict.create_missing = false;
        let runner = GoldenTestRunner::new(strict);
        runner.init_corpus().unwrap();

        let err = runner.run_case("basic/starter").unwrap_err();
        assert!(err.to_string().contains("UPDATE_GOLDEN=1"));
    }

    #[test]
    fn test_no_matching_cases() {
        let temp_dir = TempDir::new().unwrap();
        let runner = GoldenTestRunner::new(config(&temp_dir));
        assert!(runner.collect_batch("nothing").is_err());
    }
}
