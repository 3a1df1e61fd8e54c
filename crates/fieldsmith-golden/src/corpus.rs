//! Corpus discovery and loading for golden cases

use crate::{GoldenError, Result};
use fieldsmith_core::model::{FieldSpec, RuleKind, TypeTag};
use fieldsmith_core::Value;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// File name every case directory carries
pub const CASE_FILE: &str = "case.json";

/// A field list with samples and their expected validity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusCase {
    /// Name of the case; defaults to its directory name
    #[serde(default)]
    pub name: String,

    /// Category of the case; defaults to its parent directory name
    #[serde(default)]
    pub category: String,

    /// Exported schema name for the emitted module
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_name: Option<String>,

    /// Root field list in the builder's wire shape
    pub fields: Vec<FieldSpec>,

    #[serde(default)]
    pub samples: Vec<CorpusSample>,

    #[serde(default)]
    pub expectations: CaseExpectations,

    pub metadata: CaseMetadata,
}

/// One input and whether the schema should accept it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusSample {
    #[serde(default)]
    pub label: String,

    /// Input in tagged JSON (`{"$date": …}`, `{"$undefined": true}`, …)
    pub input: serde_json::Value,

    pub valid: bool,
}

impl CorpusSample {
    pub fn value(&self) -> Value {
        Value::from_tagged_json(&self.input)
    }
}

/// Extra checks beyond sample validity
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaseExpectations {
    /// Number of lint warnings the field list must produce
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lint_warnings: Option<usize>,

    /// Regexes whose matches are masked before comparing snapshots
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volatile_patterns: Vec<String>,
}

/// Metadata about a case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseMetadata {
    /// Description of what this case covers
    pub description: String,

    /// Tags for categorization
    #[serde(default)]
    pub tags: Vec<String>,

    /// Whether this case is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Priority level (lower = higher priority)
    #[serde(default = "default_priority")]
    pub priority: u32,
}

fn default_true() -> bool {
    true
}

fn default_priority() -> u32 {
    100
}

impl CorpusCase {
    /// `category/name`, also the snapshot key
    pub fn id(&self) -> String {
        format!("{}/{}", self.category, self.name)
    }
}

/// Manages the case corpus
pub struct CorpusManager {
    corpus_dir: PathBuf,
}

impl CorpusManager {
    pub fn new(corpus_dir: impl AsRef<Path>) -> Self {
        Self {
            corpus_dir: corpus_dir.as_ref().to_path_buf(),
        }
    }

    pub fn corpus_dir(&self) -> &Path {
        &self.corpus_dir
    }

    /// Path of the case file for `category/name`
    pub fn case_path(&self, id: &str) -> PathBuf {
        self.corpus_dir.join(id).join(CASE_FILE)
    }

    /// Discover all cases in the corpus, ordered by priority then id
    pub fn discover_cases(&self) -> Result<Vec<CorpusCase>> {
        let mut cases = Vec::new();

        if !self.corpus_dir.exists() {
            return Ok(cases);
        }

        for entry in WalkDir::new(&self.corpus_dir)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();

            if path.is_file() && path.file_name() == Some(std::ffi::OsStr::new(CASE_FILE)) {
                match self.load_case(path) {
                    Ok(case) => cases.push(case),
                    Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable corpus case"),
                }
            }
        }

        cases.sort_by(|a, b| {
            a.metadata
                .priority
                .cmp(&b.metadata.priority)
                .then_with(|| a.id().cmp(&b.id()))
        });

        Ok(cases)
    }

    /// Load one case file, filling name and category from its location
    pub fn load_case(&self, path: &Path) -> Result<CorpusCase> {
        let content = fs::read_to_string(path)?;
        let mut case: CorpusCase = serde_json::from_str(&content)?;

        let case_dir = path
            .parent()
            .ok_or_else(|| GoldenError::CorpusError(format!("Case file {:?} has no directory", path)))?;

        if case.name.is_empty() {
            case.name = dir_name(case_dir).unwrap_or_default();
        }
        if case.category.is_empty() {
            case.category = case_dir.parent().and_then(dir_name).unwrap_or_default();
        }

        Ok(case)
    }

    /// Load a case by its `category/name` id
    pub fn load_by_id(&self, id: &str) -> Result<CorpusCase> {
        let path = self.case_path(id);
        if !path.exists() {
            return Err(GoldenError::CorpusError(format!("Case '{}' not found at {:?}", id, path)));
        }
        self.load_case(&path)
    }

    /// Filter cases by category
    pub fn filter_by_category(&self, cases: Vec<CorpusCase>, category: &str) -> Vec<CorpusCase> {
        cases
            .into_iter()
            .filter(|c| c.category == category || category == "*")
            .collect()
    }

    /// Filter cases by tags
    pub fn filter_by_tags(&self, cases: Vec<CorpusCase>, tags: &[String]) -> Vec<CorpusCase> {
        if tags.is_empty() {
            return cases;
        }

        cases
            .into_iter()
            .filter(|c| tags.iter().any(|tag| c.metadata.tags.contains(tag)))
            .collect()
    }

    /// Enabled cases only
    pub fn filter_enabled(&self, cases: Vec<CorpusCase>) -> Vec<CorpusCase> {
        cases.into_iter().filter(|c| c.metadata.enabled).collect()
    }

    /// Write a case into `<corpus>/<category>/<name>/case.json`
    pub fn save_case(&self, case: &CorpusCase) -> Result<PathBuf> {
        let path = self.case_path(&case.id());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, serde_json::to_string_pretty(case)?)?;
        Ok(path)
    }

    /// Create the corpus directory structure with a starter case
    pub fn init_corpus(&self) -> Result<()> {
        for dir in ["basic", "composite", "edge-cases", "recursion", "regression"] {
            fs::create_dir_all(self.corpus_dir.join(dir))?;
        }

        if !self.case_path("basic/starter").exists() {
            self.save_case(&starter_case())?;
        }

        Ok(())
    }

    /// List all case categories
    pub fn list_categories(&self) -> Result<Vec<String>> {
        let mut categories = Vec::new();

        if !self.corpus_dir.exists() {
            return Ok(categories);
        }

        for entry in fs::read_dir(&self.corpus_dir)? {
            let path = entry?.path();
            if path.is_dir() {
                if let Some(name) = dir_name(&path) {
                    if name != "snapshots" {
                        categories.push(name);
                    }
                }
            }
        }

        categories.sort();
        Ok(categories)
    }

    /// Get statistics about the corpus
    pub fn get_statistics(&self) -> Result<CorpusStatistics> {
        let cases = self.discover_cases()?;

        let mut stats = CorpusStatistics {
            total_cases: cases.len(),
            ..Default::default()
        };

        for case in cases {
            if case.metadata.enabled {
                stats.enabled_cases += 1;
            } else {
                stats.disabled_cases += 1;
            }
            stats.total_samples += case.samples.len();

            *stats.cases_by_category.entry(case.category).or_insert(0) += 1;

            for tag in case.metadata.tags {
                *stats.cases_by_tag.entry(tag).or_insert(0) += 1;
            }
        }

        Ok(stats)
    }
}

fn dir_name(path: &Path) -> Option<String> {
    path.file_name().and_then(|s| s.to_str()).map(str::to_string)
}

/// The case `init_corpus` seeds: a coerced age field
fn starter_case() -> CorpusCase {
    CorpusCase {
        name: "starter".to_string(),
        category: "basic".to_string(),
        schema_name: None,
        fields: vec![FieldSpec::of("age", TypeTag::Number)
            .coerced()
            .rule(RuleKind::Min, "0")
            .rule(RuleKind::Int, "")],
        samples: vec![
            CorpusSample {
                label: "numeric string".to_string(),
                input: json!({ "age": "5" }),
                valid: true,
            },
            CorpusSample {
                label: "negative".to_string(),
                input: json!({ "age": -1 }),
                valid: false,
            },
            CorpusSample {
                label: "fraction".to_string(),
                input: json!({ "age": 2.5 }),
                valid: false,
            },
        ],
        expectations: CaseExpectations::default(),
        metadata: CaseMetadata {
            description: "Coerced integer age".to_string(),
            tags: vec!["basic".to_string(), "smoke".to_string()],
            enabled: true,
            priority: 1,
        },
    }
}

/// Statistics about the corpus
#[derive(Debug, Default, Serialize)]
pub struct CorpusStatistics {
    pub total_cases: usize,
    pub enabled_cases: usize,
    pub disabled_cases: usize,
    pub total_samples: usize,
    pub cases_by_category: HashMap<String, usize>,
    pub cases_by_tag: HashMap<String, usize>,
}

impl CorpusStatistics {
    /// Print statistics to stdout
    pub fn print(&self) {
        println!("=== Corpus Statistics ===");
        println!("Total cases: {}", self.total_cases);
        println!("Enabled: {}", self.enabled_cases);
        println!("Disabled: {}", self.disabled_cases);
        println!("Samples: {}", self.total_samples);

        if !self.cases_by_category.is_empty() {
            println!("\nCases by category:");
            let mut categories: Vec<_> = self.cases_by_category.iter().collect();
            categories.sort_by_key(|(k, _)| k.as_str());
            for (category, count) in categories {
                println!("  {}: {}", category, count);
            }
        }

        if !self.cases_by_tag.is_empty() {
            println!("\nCases by tag:");
            let mut tags: Vec<_> = self.cases_by_tag.iter().collect();
            tags.sort_by_key(|(k, _)| k.as_str());
            for (tag, count) in tags {
                println!("  {}: {}", tag, count);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn case(name: &str, category: &str, tags: &[&str], enabled: bool) -> CorpusCase {
        CorpusCase {
            name: name.to_string(),
            category: category.to_string(),
            metadata: CaseMetadata {
                description: name.to_string(),
                tags: tags.iter().map(|t| t.to_string()).collect(),
                enabled,
                priority: 100,
            },
            ..starter_case()
        }
    }

    #[test]
    fn test_corpus_manager_init() {
        let temp_dir = TempDir::new().unwrap();
        let manager = CorpusManager::new(temp_dir.path());

        manager.init_corpus().unwrap();

        assert!(temp_dir.path().join("basic").exists());
        assert!(temp_dir.path().join("recursion").exists());
        assert!(temp_dir.path().join("basic/starter/case.json").exists());
    }

    #[test]
    fn test_discover_cases() {
        let temp_dir = TempDir::new().unwrap();
        let manager = CorpusManager::new(temp_dir.path());

        manager.init_corpus().unwrap();

        let cases = manager.discover_cases().unwrap();
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].id(), "basic/starter");
        assert_eq!(cases[0].fields[0].name, "age");
        assert_eq!(cases[0].samples.len(), 3);
    }

    #[test]
    fn test_name_and_category_come_from_location() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("edge-cases/empty");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join(CASE_FILE),
            r#"{ "fields": [], "metadata": { "description": "empty list" } }"#,
        )
        .unwrap();

        let manager = CorpusManager::new(temp_dir.path());
        let loaded = manager.load_by_id("edge-cases/empty").unwrap();
        assert_eq!(loaded.name, "empty");
        assert_eq!(loaded.category, "edge-cases");
        assert!(loaded.metadata.enabled);
        assert_eq!(loaded.metadata.priority, 100);
    }

    #[test]
    fn test_unreadable_case_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let manager = CorpusManager::new(temp_dir.path());
        manager.init_corpus().unwrap();

        let broken = temp_dir.path().join("basic/broken");
        fs::create_dir_all(&broken).unwrap();
        fs::write(broken.join(CASE_FILE), "{ not json").unwrap();

        assert_eq!(manager.discover_cases().unwrap().len(), 1);
    }

    #[test]
    fn test_filters() {
        let manager = CorpusManager::new("unused");
        let cases = vec![
            case("a", "basic", &["smoke"], true),
            case("b", "recursion", &["deep"], true),
            case("c", "basic", &["deep"], false),
        ];

        assert_eq!(manager.filter_by_category(cases.clone(), "basic").len(), 2);
        assert_eq!(manager.filter_by_category(cases.clone(), "*").len(), 3);
        assert_eq!(manager.filter_by_tags(cases.clone(), &["deep".to_string()]).len(), 2);
        assert_eq!(manager.filter_by_tags(cases.clone(), &[]).len(), 3);
        assert_eq!(manager.filter_enabled(cases).len(), 2);
    }

    #[test]
    fn test_statistics() {
        let temp_dir = TempDir::new().unwrap();
        let manager = CorpusManager::new(temp_dir.path());
        manager.init_corpus().unwrap();
        manager.save_case(&case("off", "regression", &["smoke"], false)).unwrap();

        let stats = manager.get_statistics().unwrap();
        assert_eq!(stats.total_cases, 2);
        assert_eq!(stats.enabled_cases, 1);
        assert_eq!(stats.disabled_cases, 1);
        assert_eq!(stats.total_samples, 6);
        assert_eq!(stats.cases_by_tag.get("smoke"), Some(&2));

        let categories = manager.list_categories().unwrap();
        assert!(categories.contains(&"regression".to_string()));
    }
}
