//! Corpus command handlers

use crate::cli::{CorpusAction, CorpusArgs, CorpusRunArgs};
use crate::config::Config;
use crate::error::Result;
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use fieldsmith_golden::{DiffOptions, GoldenConfig, GoldenError, GoldenTestRunner};
use serde::Serialize;
use tracing::info;

#[derive(Serialize)]
struct RunSummary<'a> {
    total: usize,
    passed: usize,
    failed: usize,
    skipped: usize,
    updated: usize,
    duration_ms: u64,
    results: &'a [fieldsmith_golden::CaseResult],
}

/// Corpus location from flags, falling back to configuration
fn golden_config(args: &CorpusArgs, config: &Config, output: &OutputWriter) -> GoldenConfig {
    let corpus_dir = args
        .dir
        .clone()
        .unwrap_or_else(|| config.paths.corpus_dir.clone());
    let snapshot_dir = match (&args.snapshots, &args.dir) {
        (Some(snapshots), _) => snapshots.clone(),
        (None, Some(dir)) => dir.join("snapshots"),
        (None, None) => config.paths.snapshot_dir(),
    };

    GoldenConfig {
        corpus_dir,
        snapshot_dir,
        update_snapshots: false,
        create_missing: false,
        diff_options: DiffOptions {
            colored: output.use_color(),
            ..DiffOptions::default()
        },
        verbose: output.is_verbose(),
    }
}

/// Handle the corpus command
pub fn handle_corpus(args: CorpusArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let mut golden = golden_config(&args, config, output);

    match args.action {
        CorpusAction::List => {
            let runner = GoldenTestRunner::new(golden);
            let cases = runner.list_cases()?;
            if output.is_human() {
                for case in &cases {
                    output.writeln(case)?;
                }
                output.info(&format!("{} case(s)", cases.len()))
            } else {
                output.data(&cases)
            }
        }
        CorpusAction::Stats => {
            let runner = GoldenTestRunner::new(golden);
            let stats = runner.get_statistics()?;
            if output.is_human() {
                stats.print();
                Ok(())
            } else {
                output.data(&stats)
            }
        }
        CorpusAction::Init => {
            let corpus_dir = golden.corpus_dir.clone();
            GoldenTestRunner::new(golden).init_corpus()?;
            output.success(&format!("✓ Initialized corpus at {}", corpus_dir.display()))
        }
        CorpusAction::Run(run) => {
            golden.update_snapshots = run.update;
            golden.create_missing = run.update;
            run_cases(run, golden, output)
        }
    }
}

fn run_cases(args: CorpusRunArgs, golden: GoldenConfig, output: &mut OutputWriter) -> Result<()> {
    let timer = Timer::with_details("corpus_run", &args.pattern);
    let verbose = golden.verbose;
    let runner = GoldenTestRunner::new(golden);

    let spinner = output.spinner(&format!("running cases matching '{}'", args.pattern));
    let results = runner.collect_batch(&args.pattern);
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    let results = results?;

    let passed = results.iter().filter(|r| r.passed && !r.skipped).count();
    let skipped = results.iter().filter(|r| r.skipped).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let updated = results.iter().filter(|r| r.updated).count();
    let duration_ms = timer.elapsed().as_millis() as u64;

    info!(total = results.len(), passed, failed, skipped, updated, "corpus run complete");

    if output.is_human() {
        for result in &results {
            result.print(verbose || !result.passed);
        }
        output.section("Golden Summary")?;
        output.writeln(&format!(
            "{} passed, {} failed, {} skipped, {} snapshot(s) written in {}ms",
            passed, failed, skipped, updated, duration_ms
        ))?;
        for result in results.iter().filter(|r| !r.passed) {
            output.error(&format!("✗ {}", result.name))?;
        }
    } else {
        output.data(&RunSummary {
            total: results.len(),
            passed,
            failed,
            skipped,
            updated,
            duration_ms,
            results: &results,
        })?;
    }

    if failed > 0 {
        return Err(GoldenError::TestFailed(format!("{} golden case(s) failed", failed)).into());
    }
    Ok(())
}
