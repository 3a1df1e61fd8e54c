//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API,
//! providing a type-safe and well-documented command interface.

use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

/// Fieldsmith CLI - field specifications to validators and Zod source
///
/// Emits Zod v3 TypeScript for a field list, validates sample data against
/// it, and checks that the emitted source behaves like the built-in validator.
#[derive(Parser, Debug)]
#[command(
    name = "fieldsmith",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "FIELDSMITH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Emit the Zod module for a field document
    Emit(EmitArgs),

    /// Validate sample data against a field document or emitted module
    Check(CheckArgs),

    /// Compare the built-in validator with the emitted source on samples
    Parity(ParityArgs),

    /// Report rules and parameters that were skipped or defaulted
    Lint(LintArgs),

    /// List type tags and the rules each one accepts
    Types(TypesArgs),

    /// Run and manage the golden parity corpus
    Corpus(CorpusArgs),

    /// Manage configuration files and settings
    Config(ConfigArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the emit command
#[derive(Parser, Debug)]
pub struct EmitArgs {
    /// Field document (JSON or YAML, `-` for stdin)
    #[arg(value_name = "FIELDS")]
    pub fields: PathBuf,

    /// Exported schema name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Exported type name
    #[arg(long)]
    pub type_name: Option<String>,

    /// Omit the `import { z }` line
    #[arg(long)]
    pub no_import: bool,

    /// Omit the `export type` line
    #[arg(long)]
    pub no_type: bool,

    /// Spaces per nesting level
    #[arg(long)]
    pub indent: Option<usize>,

    /// Deepest nesting accepted
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Output file path (stdout if not specified)
    #[arg(long = "save-to")]
    pub output_file: Option<PathBuf>,
}

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Field document (JSON or YAML) or an emitted `.ts` module
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Sample files in tagged JSON; a top-level array is one sample per element
    #[arg(value_name = "SAMPLES")]
    pub samples: Vec<PathBuf>,

    /// Inline sample in tagged JSON (repeatable)
    #[arg(short, long = "data", value_name = "JSON")]
    pub data: Vec<String>,

    /// Validate with the emitted source instead of the interpreter
    #[arg(long)]
    pub via_source: bool,

    /// Show the parsed value for accepted samples
    #[arg(long)]
    pub show_value: bool,
}

/// Arguments for the parity command
#[derive(Parser, Debug)]
pub struct ParityArgs {
    /// Field document (JSON or YAML, `-` for stdin)
    #[arg(value_name = "FIELDS")]
    pub fields: PathBuf,

    /// Sample files in tagged JSON; the built-in battery is used when absent
    #[arg(short, long = "samples", value_name = "FILE")]
    pub samples: Vec<PathBuf>,

    /// Also print the emitted source
    #[arg(long)]
    pub show_source: bool,
}

/// Arguments for the lint command
#[derive(Parser, Debug)]
pub struct LintArgs {
    /// Field document (JSON or YAML, `-` for stdin)
    #[arg(value_name = "FIELDS")]
    pub fields: PathBuf,

    /// Fail when any warning is reported
    #[arg(long)]
    pub deny_warnings: bool,
}

/// Arguments for the types command
#[derive(Parser, Debug)]
pub struct TypesArgs {
    /// Show one tag in detail
    #[arg(value_name = "TAG")]
    pub tag: Option<String>,
}

/// Arguments for the corpus command
#[derive(Parser, Debug)]
pub struct CorpusArgs {
    /// Corpus directory (overrides configuration)
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    /// Snapshot directory (overrides configuration)
    #[arg(long, global = true)]
    pub snapshots: Option<PathBuf>,

    #[command(subcommand)]
    pub action: CorpusAction,
}

/// Corpus actions
#[derive(Subcommand, Debug)]
pub enum CorpusAction {
    /// List cases
    List,

    /// Show corpus statistics
    Stats,

    /// Run cases whose id or category contains the pattern
    Run(CorpusRunArgs),

    /// Create the corpus layout with a starter case
    Init,
}

/// Arguments for corpus run
#[derive(Parser, Debug)]
pub struct CorpusRunArgs {
    /// Case pattern (`*` for all)
    #[arg(default_value = "*")]
    pub pattern: String,

    /// Rewrite snapshots that differ
    #[arg(long, env = "UPDATE_GOLDEN")]
    pub update: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a default configuration file
    Init(ConfigInitArgs),

    /// Show current configuration values
    Show(ConfigShowArgs),

    /// Show which configuration files are searched and which is loaded
    Path,
}

/// Arguments for config init
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Write the user config instead of `.fieldsmith.toml` in the working directory
    #[arg(long)]
    pub user: bool,

    /// Force overwrite existing config files
    #[arg(long)]
    pub force: bool,
}

/// Arguments for config show
#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Show configuration in specified format
    #[arg(short, long, value_enum, default_value = "toml")]
    pub format: ConfigFormat,
}

/// Configuration file formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

impl OutputFormat {
    /// Parse the `output.format` configuration value
    pub fn from_config(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "human" => Some(Self::Human),
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "json-pretty" | "json_pretty" => Some(Self::JsonPretty),
            _ => None,
        }
    }
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_level() {
        let cli = Cli::parse_from(["fieldsmith", "-vv", "lint", "fields.json"]);
        assert_eq!(cli.verbosity_level(), 2);

        let quiet = Cli::parse_from(["fieldsmith", "--quiet", "lint", "fields.json"]);
        assert_eq!(quiet.verbosity_level(), 0);
    }

    #[test]
    fn test_emit_arguments() {
        let cli = Cli::parse_from([
            "fieldsmith",
            "emit",
            "fields.yaml",
            "--name",
            "user profile",
            "--no-import",
            "--indent",
            "4",
        ]);
        match cli.command {
            Commands::Emit(args) => {
                assert_eq!(args.name.as_deref(), Some("user profile"));
                assert!(args.no_import);
                assert!(!args.no_type);
                assert_eq!(args.indent, Some(4));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_check_collects_inline_samples() {
        let cli = Cli::parse_from([
            "fieldsmith",
            "check",
            "fields.json",
            "-d",
            r#"{"age": 1}"#,
            "-d",
            r#"{"age": -1}"#,
            "--via-source",
        ]);
        match cli.command {
            Commands::Check(args) => {
                assert_eq!(args.data.len(), 2);
                assert!(args.samples.is_empty());
                assert!(args.via_source);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_corpus_run_defaults() {
        let cli = Cli::parse_from(["fieldsmith", "corpus", "--dir", "corpus", "run"]);
        match cli.command {
            Commands::Corpus(args) => {
                assert_eq!(args.dir, Some(PathBuf::from("corpus")));
                match args.action {
                    CorpusAction::Run(run) => assert_eq!(run.pattern, "*"),
                    other => panic!("unexpected action {:?}", other),
                }
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_output_format_from_config() {
        assert_eq!(OutputFormat::from_config("YAML"), Some(OutputFormat::Yaml));
        assert_eq!(OutputFormat::from_config("json-pretty"), Some(OutputFormat::JsonPretty));
        assert_eq!(OutputFormat::from_config("xml"), None);
    }
}
