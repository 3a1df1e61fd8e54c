//! Golden parity corpus for Fieldsmith
//!
//! Each corpus case is a field list plus samples with their expected
//! validity. Running a case checks that the interpreter and the emitted
//! source agree with each other and with the expectation, then compares the
//! emitted source to a stored snapshot.

pub mod corpus;
pub mod diff;
pub mod runner;
pub mod snapshot;

use std::path::PathBuf;
use thiserror::Error;

pub use corpus::{CorpusCase, CorpusManager, CorpusSample};
pub use diff::{DiffEngine, DiffOptions};
pub use runner::{CaseResult, GoldenTestRunner};
pub use snapshot::{Snapshot, SnapshotManager};

/// Golden test error types
#[derive(Debug, Error)]
pub enum GoldenError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Core error: {0}")]
    Core(#[from] fieldsmith_core::Error),

    #[error("Snapshot mismatch: {0}")]
    SnapshotMismatch(String),

    #[error("Corpus error: {0}")]
    CorpusError(String),

    #[error("Test failed: {0}")]
    TestFailed(String),
}

pub type Result<T> = std::result::Result<T, GoldenError>;

/// Configuration for golden tests
#[derive(Debug, Clone)]
pub struct GoldenConfig {
    /// Root directory for the corpus
    pub corpus_dir: PathBuf,

    /// Directory for emitted-source snapshots
    pub snapshot_dir: PathBuf,

    /// Whether to rewrite snapshots that differ
    pub update_snapshots: bool,

    /// Whether to create missing snapshots
    pub create_missing: bool,

    pub diff_options: DiffOptions,

    /// Verbose output
    pub verbose: bool,
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .map(|v| v == "1" || v.to_lowercase() == "true")
}

impl Default for GoldenConfig {
    fn default() -> Self {
        let update_snapshots = env_flag("UPDATE_GOLDEN").unwrap_or(false);

        Self {
            corpus_dir: PathBuf::from("../../golden-corpus"),
            snapshot_dir: PathBuf::from("../../golden-corpus/snapshots"),
            update_snapshots,
            create_missing: update_snapshots,
            diff_options: DiffOptions::default(),
            verbose: false,
        }
    }
}

impl GoldenConfig {
    /// Create config from environment and defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(corpus_dir) = std::env::var("GOLDEN_CORPUS_DIR") {
            config.corpus_dir = PathBuf::from(corpus_dir);
        }

        if let Ok(snapshot_dir) = std::env::var("GOLDEN_SNAPSHOT_DIR") {
            config.snapshot_dir = PathBuf::from(snapshot_dir);
        }

        if let Some(verbose) = env_flag("GOLDEN_VERBOSE") {
            config.verbose = verbose;
        }

        config
    }

    /// Config rooted at one directory, snapshots in `<dir>/snapshots`
    pub fn at(corpus_dir: impl Into<PathBuf>) -> Self {
        let corpus_dir = corpus_dir.into();
        Self {
            snapshot_dir: corpus_dir.join("snapshots"),
            corpus_dir,
            ..Self::default()
        }
    }
}

/// Macro for defining golden tests
#[macro_export]
macro_rules! golden_test {
    ($name:ident, $case_path:expr) => {
        #[test]
        fn $name() {
            use $crate::{GoldenConfig, GoldenTestRunner};

            let config = GoldenConfig::from_env();
            let runner = GoldenTestRunner::new(config);

            runner
                .run_case($case_path)
                .unwrap_or_else(|e| panic!("Golden case failed: {}: {}", $case_path, e));
        }
    };
}

/// Macro for batch golden tests
#[macro_export]
macro_rules! golden_test_batch {
    ($pattern:expr) => {
        #[test]
        fn golden_cases() {
            use $crate::{GoldenConfig, GoldenTestRunner};

            let config = GoldenConfig::from_env();
            let runner = GoldenTestRunner::new(config);

            runner
                .run_batch($pattern)
                .unwrap_or_else(|e| panic!("Golden batch failed: {}: {}", $pattern, e));
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        let config = GoldenConfig::from_env();
        assert!(!config.corpus_dir.as_os_str().is_empty());
        assert!(!config.snapshot_dir.as_os_str().is_empty());
    }

    #[test]
    fn test_config_at_directory() {
        let config = GoldenConfig::at("/tmp/corpus");
        assert_eq!(config.snapshot_dir, PathBuf::from("/tmp/corpus/snapshots"));
    }
}
