//! Error types for the Fieldsmith core library
//!
//! Compiling and emitting never fail on malformed field trees: unknown tags,
//! unknown rule kinds and bad payloads degrade to documented fallbacks. The
//! errors here cover the recursion guard, the source reader and the I/O
//! helpers around field documents.

use std::fmt;
use thiserror::Error;

/// Main error type for Fieldsmith operations
#[derive(Error, Debug)]
pub enum Error {
    /// The field tree nests deeper than the configured recursion guard
    #[error("Field tree too deeply nested at {path}: depth {depth} exceeds limit {limit}")]
    TooDeeplyNested {
        depth: usize,
        limit: usize,
        path: String,
    },

    /// Source text could not be read back into a schema
    #[error("Parse error at line {line}, column {column}: {message}")]
    Parse {
        message: String,
        line: usize,
        column: usize,
    },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic internal error with context
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a parse error at a source position
    pub fn parse(message: impl Into<String>, line: usize, column: usize) -> Self {
        Error::Parse {
            message: message.into(),
            line,
            column,
        }
    }

    /// Create a configuration error without a source
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Whether this error is the recursion guard firing
    pub fn is_depth_limit(&self) -> bool {
        matches!(self, Error::TooDeeplyNested { .. })
    }
}

/// Where in the input a problem was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

// Conversion implementations
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal {
            message: err.to_string(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::TooDeeplyNested {
            depth: 65,
            limit: 64,
            path: "$.a.b".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Field tree too deeply nested at $.a.b: depth 65 exceeds limit 64"
        );
        assert!(err.is_depth_limit());
    }

    #[test]
    fn test_parse_error_position() {
        let err = Error::parse("expected ')'", 3, 14);
        assert_eq!(err.to_string(), "Parse error at line 3, column 14: expected ')'");
        assert!(!err.is_depth_limit());
    }

    #[test]
    fn test_json_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json { .. }));
    }

    #[test]
    fn test_position_display() {
        assert_eq!(Position { line: 2, column: 7 }.to_string(), "2:7");
    }
}
