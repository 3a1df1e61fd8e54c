//! Error types and handling for the CLI
//!
//! Each failure mode maps to a distinct process exit code so scripts can
//! tell a rejected sample apart from a missing file or a broken config.

use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error from fieldsmith-core
    #[error("{0}")]
    Core(#[from] fieldsmith_core::Error),

    /// Error from the golden corpus
    #[error("Corpus error: {0}")]
    Golden(#[from] fieldsmith_golden::GoldenError),

    /// File not found
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Invalid file format
    #[error("Invalid file format for {}: expected {} format", path.display(), expected)]
    InvalidFormat { path: PathBuf, expected: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument combination
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    /// Type tag not in the registry
    #[error("Unknown type tag '{}'", tag)]
    UnknownTag { tag: String },

    /// One or more samples were rejected
    #[error("{} of {} sample(s) failed validation", failed, total)]
    ValidationFailed { failed: usize, total: usize },

    /// The validator and the emitted source disagreed
    #[error("Emitted source disagrees with the validator on {} sample(s)", count)]
    ParityMismatch { count: usize },

    /// Lint reported warnings under `--deny-warnings`
    #[error("Lint reported {} warning(s)", warnings)]
    LintFailed { warnings: usize },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML deserialization error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Generic error with context
    #[error("{message}")]
    Other { message: String },
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other {
            message: format!("{:#}", err),
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an invalid arguments error
    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::InvalidArgs(message.into())
    }

    /// Create a generic error with message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 1,
            Self::Core(_) => 2,
            Self::FileNotFound { .. } => 3,
            Self::InvalidFormat { .. } => 4,
            Self::Config(_) => 5,
            Self::InvalidArgs(_) => 6,
            Self::UnknownTag { .. } => 7,
            Self::ValidationFailed { .. } => 8,
            Self::ParityMismatch { .. } => 9,
            Self::LintFailed { .. } => 10,
            Self::Golden(_) => 11,
            Self::Json(_) => 12,
            Self::Yaml(_) => 13,
            Self::Toml(_) | Self::TomlSer(_) => 14,
            Self::Other { .. } => 99,
        }
    }

    /// Check if this error should display usage help
    pub fn should_show_help(&self) -> bool {
        matches!(self, Self::InvalidArgs(_) | Self::UnknownTag { .. })
    }
}

/// Extension trait for adding context to errors
pub trait ErrorContext<T> {
    /// Add context with a closure (only evaluated on error)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other {
                message: format!("{}: {}", f(), inner),
            }
        })
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    let label = match error {
        Error::Core(core) if core.is_depth_limit() => "Too deep:",
        Error::ValidationFailed { .. } | Error::ParityMismatch { .. } | Error::LintFailed { .. } => {
            "Failed:"
        }
        _ => "Error:",
    };

    if use_color {
        use colored::Colorize;
        format!("{} {}", label.red().bold(), error)
    } else {
        format!("{} {}", label, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct_for_outcomes() {
        let failed = Error::ValidationFailed { failed: 1, total: 3 };
        let parity = Error::ParityMismatch { count: 2 };
        let lint = Error::LintFailed { warnings: 4 };
        assert_eq!(failed.exit_code(), 8);
        assert_eq!(parity.exit_code(), 9);
        assert_eq!(lint.exit_code(), 10);
        assert_eq!(Error::other("x").exit_code(), 99);
    }

    #[test]
    fn test_help_hint() {
        assert!(Error::invalid_args("no samples").should_show_help());
        assert!(Error::UnknownTag { tag: "texte".into() }.should_show_help());
        assert!(!Error::config("bad").should_show_help());
    }

    #[test]
    fn test_format_error_plain() {
        let err = Error::ValidationFailed { failed: 1, total: 3 };
        assert_eq!(format_error(&err, false), "Failed: 1 of 3 sample(s) failed validation");

        let err = Error::FileNotFound {
            path: PathBuf::from("fields.json"),
        };
        assert_eq!(format_error(&err, false), "Error: File not found: fields.json");
    }

    #[test]
    fn test_with_context() {
        let result: std::result::Result<(), io::Error> =
            Err(io::Error::new(io::ErrorKind::Other, "disk full"));
        let err = result.with_context(|| "writing snapshot".to_string()).unwrap_err();
        assert_eq!(err.to_string(), "writing snapshot: IO error: disk full");
    }

    #[test]
    fn test_anyhow_conversion_keeps_chain() {
        let err: Error = anyhow::anyhow!("inner").context("outer").into();
        assert_eq!(err.to_string(), "outer: inner");
    }
}
