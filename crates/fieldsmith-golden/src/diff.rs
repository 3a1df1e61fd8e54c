//! Line diffs between stored and freshly emitted source

use crate::snapshot::normalize_source;
use crate::{GoldenError, Result};
use colored::*;
use regex::Regex;
use similar::{ChangeTag, TextDiff};

/// Options for diff comparison
#[derive(Debug, Clone)]
pub struct DiffOptions {
    /// Whether to use colored output
    pub colored: bool,

    /// Context lines to show around changes
    pub context_lines: usize,

    /// Whether to normalize whitespace before comparison
    pub normalize: bool,

    /// Maximum diff lines to show (0 = unlimited)
    pub max_diff_lines: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            colored: true,
            context_lines: 3,
            normalize: true,
            max_diff_lines: 100,
        }
    }
}

/// Result of a diff operation
#[derive(Debug)]
pub struct DiffResult {
    pub matches: bool,

    /// Unified diff, empty when the texts match
    pub diff_output: String,

    pub summary: DiffSummary,
}

/// Summary of diff changes
#[derive(Debug, Default)]
pub struct DiffSummary {
    pub added: usize,
    pub removed: usize,
    /// 1-based line of the first difference in the expected text
    pub first_difference: Option<usize>,
}

/// Compares emitted source against snapshots
pub struct DiffEngine {
    options: DiffOptions,
    volatile_patterns: Vec<Regex>,
}

const MASK: &str = "***MASKED***";

impl DiffEngine {
    pub fn new(options: DiffOptions) -> Self {
        Self {
            options,
            volatile_patterns: Vec::new(),
        }
    }

    /// Mask every match of `pattern` before comparing
    pub fn add_volatile_pattern(&mut self, pattern: &str) -> Result<()> {
        let regex = Regex::new(pattern)
            .map_err(|e| GoldenError::CorpusError(format!("Invalid regex pattern: {}", e)))?;

        self.volatile_patterns.push(regex);
        Ok(())
    }

    /// Compare two source texts line by line
    pub fn compare(&self, expected: &str, actual: &str) -> DiffResult {
        let expected = self.prepare(expected);
        let actual = self.prepare(actual);

        if expected == actual {
            return DiffResult {
                matches: true,
                diff_output: String::new(),
                summary: DiffSummary::default(),
            };
        }

        DiffResult {
            matches: false,
            diff_output: self.generate_diff_output(&expected, &actual),
            summary: self.collect_diff_summary(&expected, &actual),
        }
    }

    fn prepare(&self, text: &str) -> String {
        let mut text = if self.options.normalize {
            normalize_source(text)
        } else {
            text.to_string()
        };
        for pattern in &self.volatile_patterns {
            text = pattern.replace_all(&text, MASK).into_owned();
        }
        text
    }

    fn generate_diff_output(&self, expected: &str, actual: &str) -> String {
        let text_diff = TextDiff::from_lines(expected, actual);
        let unified = text_diff
            .unified_diff()
            .context_radius(self.options.context_lines)
            .header("snapshot", "emitted")
            .to_string();

        let mut output = String::new();
        for (count, line) in unified.lines().enumerate() {
            if self.options.max_diff_lines > 0 && count >= self.options.max_diff_lines {
                output.push_str("... (diff truncated) ...\n");
                break;
            }
            output.push_str(&self.paint(line));
            output.push('\n');
        }
        output
    }

    fn paint(&self, line: &str) -> String {
        if !self.options.colored {
            return line.to_string();
        }
        if line.starts_with("+++") || line.starts_with("---") {
            line.bold().to_string()
        } else if line.starts_with("@@") {
            line.cyan().to_string()
        } else if line.starts_with('+') {
            line.green().to_string()
        } else if line.starts_with('-') {
            line.red().to_string()
        } else {
            line.to_string()
        }
    }

    fn collect_diff_summary(&self, expected: &str, actual: &str) -> DiffSummary {
        let mut summary = DiffSummary::default();
        let text_diff = TextDiff::from_lines(expected, actual);

        for change in text_diff.iter_all_changes() {
            match change.tag() {
                ChangeTag::Delete => summary.removed += 1,
                ChangeTag::Insert => summary.added += 1,
                ChangeTag::Equal => {}
            }
            if change.tag() != ChangeTag::Equal && summary.first_difference.is_none() {
                let line = change.old_index().or(change.new_index()).unwrap_or(0);
                summary.first_difference = Some(line + 1);
            }
        }

        summary
    }

    /// Plain `-`/`+` diff of every line, for error messages
    pub fn simple_diff(&self, expected: &str, actual: &str) -> String {
        let diff = TextDiff::from_lines(expected, actual);
        let mut output = String::new();

        for change in diff.iter_all_changes() {
            let sign = match change.tag() {
                ChangeTag::Delete => "-",
                ChangeTag::Insert => "+",
                ChangeTag::Equal => " ",
            };
            output.push_str(&format!("{}{}", sign, change));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plain() -> DiffEngine {
        DiffEngine::new(DiffOptions {
            colored: false,
            ..Default::default()
        })
    }

    #[test]
    fn test_identical_sources_match() {
        let source = "export const schema = z.string();\n";
        let result = plain().compare(source, source);
        assert!(result.matches);
        assert!(result.diff_output.is_empty());
    }

    #[test]
    fn test_whitespace_is_normalized() {
        let result = plain().compare("a  \r\nb\n", "a\nb\n\n");
        assert!(result.matches);

        let strict = DiffEngine::new(DiffOptions {
            normalize: false,
            colored: false,
            ..Default::default()
        });
        assert!(!strict.compare("a  \nb\n", "a\nb\n").matches);
    }

    #[test]
    fn test_unified_diff_output() {
        let expected = "a\nz.string().min(2),\nc\n";
        let actual = "a\nz.string().min(3),\nc\n";
        let result = plain().compare(expected, actual);

        assert!(!result.matches);
        assert!(result.diff_output.contains("--- snapshot"));
        assert!(result.diff_output.contains("+++ emitted"));
        assert!(result.diff_output.contains("-z.string().min(2),"));
        assert!(result.diff_output.contains("+z.string().min(3),"));
        assert_eq!(result.summary.added, 1);
        assert_eq!(result.summary.removed, 1);
        assert_eq!(result.summary.first_difference, Some(2));
    }

    #[test]
    fn test_truncation() {
        let engine = DiffEngine::new(DiffOptions {
            colored: false,
            max_diff_lines: 3,
            ..Default::default()
        });
        let expected: String = (0..20).map(|i| format!("a{}\n", i)).collect();
        let actual: String = (0..20).map(|i| format!("b{}\n", i)).collect();
        let result = engine.compare(&expected, &actual);
        assert!(result.diff_output.ends_with("... (diff truncated) ...\n"));
    }

    #[test]
    fn test_volatile_pattern_masking() {
        let mut engine = plain();
        engine.add_volatile_pattern(r"// generated \S+").unwrap();

        let result = engine.compare("// generated 2025-01-01\nx\n", "// generated 2025-02-03\nx\n");
        assert!(result.matches);
        assert!(engine.add_volatile_pattern("(").is_err());
    }

    #[test]
    fn test_simple_diff() {
        let diff = plain().simple_diff("a\nb\n", "a\nc\n");
        assert_eq!(diff, " a\n-b\n+c\n");
    }
}
