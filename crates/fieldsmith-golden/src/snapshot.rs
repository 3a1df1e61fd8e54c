//! Emitted-source snapshots for golden cases

use crate::{GoldenError, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Version written into new snapshots
pub const SNAPSHOT_FORMAT_VERSION: &str = "1.0.0";

/// Stored emitter output for one case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// `category/name` of the case
    pub name: String,

    pub metadata: SnapshotMetadata,

    /// The emitted module text
    pub source: String,
}

/// Metadata about a snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    /// Version of the snapshot format
    pub version: String,

    /// Crate version that produced the source
    #[serde(default)]
    pub generator: String,

    pub created_at: String,

    pub updated_at: String,

    pub description: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,
}

/// Reads and writes snapshots under one directory
pub struct SnapshotManager {
    snapshot_dir: PathBuf,
}

impl SnapshotManager {
    pub fn new(snapshot_dir: impl AsRef<Path>) -> Self {
        Self {
            snapshot_dir: snapshot_dir.as_ref().to_path_buf(),
        }
    }

    /// Load a snapshot from disk
    pub fn load(&self, name: &str) -> Result<Snapshot> {
        let path = self.snapshot_path(name);

        if !path.exists() {
            return Err(GoldenError::CorpusError(format!(
                "Snapshot '{}' not found at {:?}",
                name, path
            )));
        }

        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save a snapshot to disk
    pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let path = self.snapshot_path(&snapshot.name);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut content = serde_json::to_string_pretty(snapshot)?;
        content.push('\n');
        fs::write(&path, content)?;

        Ok(())
    }

    /// Replace the source of an existing snapshot
    pub fn update(&self, name: &str, source: &str) -> Result<()> {
        let mut snapshot = self.load(name)?;

        snapshot.source = source.to_string();
        snapshot.metadata.generator = fieldsmith_core::VERSION.to_string();
        snapshot.metadata.updated_at = Utc::now().to_rfc3339();

        self.save(&snapshot)
    }

    /// Create a new snapshot
    pub fn create(&self, name: &str, source: &str, description: Option<String>, tags: Vec<String>) -> Result<Snapshot> {
        let now = Utc::now().to_rfc3339();

        let snapshot = Snapshot {
            name: name.to_string(),
            metadata: SnapshotMetadata {
                version: SNAPSHOT_FORMAT_VERSION.to_string(),
                generator: fieldsmith_core::VERSION.to_string(),
                created_at: now.clone(),
                updated_at: now,
                description,
                tags,
            },
            source: source.to_string(),
        };

        self.save(&snapshot)?;
        Ok(snapshot)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.snapshot_path(name).exists()
    }

    /// All snapshot names, including nested `category/name` ones
    pub fn list(&self) -> Result<Vec<String>> {
        let mut snapshots = Vec::new();

        if !self.snapshot_dir.exists() {
            return Ok(snapshots);
        }

        for entry in WalkDir::new(&self.snapshot_dir).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let Ok(relative) = path.strip_prefix(&self.snapshot_dir) else {
                continue;
            };
            let name = relative.with_extension("");
            if name.extension().is_some() {
                // backups carry a second extension
                continue;
            }
            let name: Vec<String> = name
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            snapshots.push(name.join("/"));
        }

        snapshots.sort();
        Ok(snapshots)
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        let path = self.snapshot_path(name);

        if path.exists() {
            fs::remove_file(path)?;
        }

        Ok(())
    }

    fn snapshot_path(&self, name: &str) -> PathBuf {
        let filename = if name.ends_with(".json") {
            name.to_string()
        } else {
            format!("{}.json", name)
        };

        self.snapshot_dir.join(filename)
    }

    /// Copy a snapshot aside before updating it
    pub fn backup(&self, name: &str) -> Result<()> {
        let source = self.snapshot_path(name);

        if !source.exists() {
            return Ok(());
        }

        let backup_name = format!("{}.backup.{}", name, Utc::now().timestamp());
        fs::copy(source, self.snapshot_path(&backup_name))?;
        Ok(())
    }
}

/// Normalize source text for comparison: `\n` line endings, no trailing
/// whitespace, exactly one final newline
pub fn normalize_source(source: &str) -> String {
    let mut lines: Vec<&str> = source
        .split('\n')
        .map(|line| line.trim_end_matches(['\r', ' ', '\t']))
        .collect();
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    let mut normalized = lines.join("\n");
    normalized.push('\n');
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SOURCE: &str = "export const schema = z.object({\n  age: z.number(),\n});\n";

    #[test]
    fn test_snapshot_manager_create_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let manager = SnapshotManager::new(temp_dir.path());

        let snapshot = manager
            .create("basic/age", SOURCE, Some("age".to_string()), vec!["smoke".to_string()])
            .unwrap();
        assert_eq!(snapshot.name, "basic/age");

        let loaded = manager.load("basic/age").unwrap();
        assert_eq!(loaded.source, SOURCE);
        assert_eq!(loaded.metadata.version, SNAPSHOT_FORMAT_VERSION);
        assert_eq!(loaded.metadata.tags, vec!["smoke".to_string()]);
        assert!(temp_dir.path().join("basic/age.json").exists());
    }

    #[test]
    fn test_update_and_backup() {
        let temp_dir = TempDir::new().unwrap();
        let manager = SnapshotManager::new(temp_dir.path());
        manager.create("age", SOURCE, None, Vec::new()).unwrap();

        manager.backup("age").unwrap();
        manager.update("age", "export const schema = z.any();\n").unwrap();

        assert_eq!(manager.load("age").unwrap().source, "export const schema = z.any();\n");
        assert_eq!(manager.list().unwrap(), vec!["age".to_string()]);
    }

    #[test]
    fn test_list_and_delete() {
        let temp_dir = TempDir::new().unwrap();
        let manager = SnapshotManager::new(temp_dir.path());
        manager.create("recursion/shapes", SOURCE, None, Vec::new()).unwrap();
        manager.create("basic/age", SOURCE, None, Vec::new()).unwrap();

        assert_eq!(
            manager.list().unwrap(),
            vec!["basic/age".to_string(), "recursion/shapes".to_string()]
        );

        manager.delete("basic/age").unwrap();
        assert!(!manager.exists("basic/age"));
        assert!(manager.load("basic/age").is_err());
    }

    #[test]
    fn test_normalize_source() {
        assert_eq!(normalize_source("a  \r\nb\t\n\n\n"), "a\nb\n");
        assert_eq!(normalize_source("a"), "a\n");
    }
}
