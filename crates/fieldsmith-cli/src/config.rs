//! Configuration management for the CLI
//!
//! This module handles loading configuration from:
//! - Default values
//! - Configuration files (YAML/JSON/TOML)
//! - Command-line arguments, applied by the handlers on top

use crate::error::{Error, ErrorContext, Result};
use fieldsmith_core::{EmitOptions, LowerOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name searched for in the working directory and home
pub const CONFIG_FILE_STEM: &str = ".fieldsmith";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Module layout for `emit`
    pub emit: EmitConfig,

    /// Lowering settings shared by every command
    pub compile: CompileConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Path settings
    pub paths: PathConfig,
}

/// Emitted module layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitConfig {
    /// Exported schema name
    pub schema_name: String,

    /// Exported type name; derived from the schema name when unset
    pub type_name: Option<String>,

    /// Emit `import { z } from "zod";`
    pub include_import: bool,

    /// Emit `export type … = z.infer<…>;`
    pub include_type_export: bool,

    /// Spaces per nesting level
    pub indent: usize,
}

/// Lowering configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileConfig {
    /// Deepest field nesting accepted
    pub max_depth: usize,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format (human, json, json-pretty, yaml)
    pub format: String,

    /// Use colored output by default
    pub color: bool,

    /// Show progress indicators
    pub progress: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when neither `-v` nor `RUST_LOG` is given
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: Option<String>,

    /// Log file path
    pub file: Option<PathBuf>,
}

/// Path configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Golden corpus directory
    pub corpus_dir: PathBuf,

    /// Snapshot directory; `<corpus_dir>/snapshots` when unset
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for EmitConfig {
    fn default() -> Self {
        let options = EmitOptions::default();
        Self {
            schema_name: options.schema_name,
            type_name: options.type_name,
            include_import: options.include_import,
            include_type_export: options.include_type_export,
            indent: options.indent,
        }
    }
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            max_depth: LowerOptions::default().max_depth,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "human".to_string(),
            color: true,
            progress: true,
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            corpus_dir: PathBuf::from("golden-corpus"),
            snapshot_dir: None,
        }
    }
}

impl PathConfig {
    /// The snapshot directory, falling back to `<corpus_dir>/snapshots`
    pub fn snapshot_dir(&self) -> PathBuf {
        self.snapshot_dir
            .clone()
            .unwrap_or_else(|| self.corpus_dir.join("snapshots"))
    }
}

/// Serialization format picked from a file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Json,
    Yaml,
    Toml,
}

impl FileFormat {
    fn of(path: &Path) -> Result<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some("toml") => Ok(Self::Toml),
            _ => Err(Error::InvalidFormat {
                path: path.to_path_buf(),
                expected: "json, yaml or toml".to_string(),
            }),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_str_as(&content, FileFormat::of(path)?)
    }

    fn from_str_as(content: &str, format: FileFormat) -> Result<Self> {
        let config = match format {
            FileFormat::Json => serde_json::from_str(content)?,
            FileFormat::Yaml => serde_yaml::from_str(content)?,
            FileFormat::Toml => toml::from_str(content)?,
        };
        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<(Self, Option<PathBuf>)> {
        for path in Self::default_config_paths() {
            if !path.exists() {
                continue;
            }
            match Self::from_file(&path) {
                Ok(config) => {
                    debug!(path = %path.display(), "loaded configuration");
                    return Ok((config, Some(path)));
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable configuration");
                }
            }
        }

        Ok((Self::default(), None))
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<(Self, Option<PathBuf>)> {
        match file {
            Some(path) => Ok((Self::from_file(path)?, Some(path.to_path_buf()))),
            None => Self::load(),
        }
    }

    /// Default configuration file paths, in search order
    pub fn default_config_paths() -> Vec<PathBuf> {
        let extensions = ["yaml", "yml", "json", "toml"];
        let mut paths = Vec::new();

        // Current directory
        for ext in extensions {
            paths.push(PathBuf::from(format!("{}.{}", CONFIG_FILE_STEM, ext)));
        }

        // User config directory
        if let Some(config_dir) = dirs::config_dir() {
            let fieldsmith_dir = config_dir.join("fieldsmith");
            for ext in extensions {
                paths.push(fieldsmith_dir.join(format!("config.{}", ext)));
            }
        }

        // Home directory
        if let Some(home_dir) = dirs::home_dir() {
            for ext in extensions {
                paths.push(home_dir.join(format!("{}.{}", CONFIG_FILE_STEM, ext)));
            }
        }

        paths
    }

    /// Path written by `config init --user`
    pub fn user_config_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("fieldsmith").join("config.toml"))
            .ok_or_else(|| Error::config("no user configuration directory on this platform"))
    }

    /// Save configuration to a file, in the format its extension names
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_string_as(FileFormat::of(path)?)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(path, content).with_context(|| format!("writing {}", path.display()))
    }

    fn to_string_as(&self, format: FileFormat) -> Result<String> {
        Ok(match format {
            FileFormat::Json => serde_json::to_string_pretty(self)?,
            FileFormat::Yaml => serde_yaml::to_string(self)?,
            FileFormat::Toml => toml::to_string_pretty(self)?,
        })
    }

    pub fn to_toml(&self) -> Result<String> {
        self.to_string_as(FileFormat::Toml)
    }

    pub fn to_json(&self) -> Result<String> {
        self.to_string_as(FileFormat::Json)
    }

    pub fn to_yaml(&self) -> Result<String> {
        self.to_string_as(FileFormat::Yaml)
    }

    /// Lowering options from the `compile` section
    pub fn lower_options(&self) -> LowerOptions {
        LowerOptions::default().with_max_depth(self.compile.max_depth)
    }

    /// Emit options from the `emit` and `compile` sections
    pub fn emit_options(&self) -> EmitOptions {
        EmitOptions {
            lower: self.lower_options(),
            schema_name: self.emit.schema_name.clone(),
            type_name: self.emit.type_name.clone(),
            include_import: self.emit.include_import,
            include_type_export: self.emit.include_type_export,
            indent: self.emit.indent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_library_defaults() {
        let config = Config::default();
        assert_eq!(config.emit_options(), EmitOptions::default());
        assert_eq!(config.lower_options(), LowerOptions::default());
        assert_eq!(
            config.paths.snapshot_dir(),
            PathBuf::from("golden-corpus").join("snapshots")
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_str_as(
            "[emit]\nschema_name = \"user profile\"\nindent = 4\n\n[compile]\nmax_depth = 8\n",
            FileFormat::Toml,
        )
        .unwrap();

        assert_eq!(config.emit.schema_name, "user profile");
        assert_eq!(config.emit.indent, 4);
        assert!(config.emit.include_import);
        assert_eq!(config.lower_options().max_depth, 8);
        assert_eq!(config.output.format, "human");
    }

    #[test]
    fn test_yaml_and_json_sources() {
        let yaml = Config::from_str_as("output:\n  format: json\n  color: false\n", FileFormat::Yaml).unwrap();
        assert_eq!(yaml.output.format, "json");
        assert!(!yaml.output.color);

        let json = Config::from_str_as(r#"{"paths": {"corpus_dir": "cases"}}"#, FileFormat::Json).unwrap();
        assert_eq!(json.paths.snapshot_dir(), PathBuf::from("cases").join("snapshots"));
    }

    #[test]
    fn test_save_round_trips_each_format() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.emit.type_name = Some("Profile".to_string());
        config.logging.format = Some("json".to_string());

        for name in ["config.toml", "config.yaml", "config.json"] {
            let path = temp_dir.path().join("nested").join(name);
            config.save(&path).unwrap();
            assert_eq!(Config::from_file(&path).unwrap(), config, "{}", name);
        }
    }

    #[test]
    fn test_unknown_extension_and_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.ini");
        std::fs::write(&path, "").unwrap();

        assert!(matches!(Config::from_file(&path), Err(Error::InvalidFormat { .. })));
        assert!(matches!(
            Config::from_file(&temp_dir.path().join("absent.toml")),
            Err(Error::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_search_order_starts_in_working_directory() {
        let paths = Config::default_config_paths();
        assert_eq!(paths[0], PathBuf::from(".fieldsmith.yaml"));
        assert_eq!(paths[3], PathBuf::from(".fieldsmith.toml"));
    }
}
