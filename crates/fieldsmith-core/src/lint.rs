//! Diagnostics for field trees
//!
//! Both backends silently degrade malformed input. Lowering records every
//! degradation as a [`Diagnostic`] so the builder (or the CLI `lint`
//! command) can explain why a rule had no effect.

use crate::lower::{lower, LowerOptions};
use crate::model::FieldSpec;
use crate::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
        })
    }
}

/// What was degraded, skipped or defaulted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    UnknownTag,
    UnknownRule,
    InapplicableRule,
    RuleAfterWrapper,
    InvalidPattern,
    InvalidExpression,
    InvalidDateBound,
    ZeroBigIntStep,
    EmptyName,
    DuplicateName,
    DuplicateId,
    DuplicateCase,
    DiscriminatorField,
    EmptyCaseList,
    DefaultedMembers,
    PaddedIntersection,
}

impl DiagnosticKind {
    pub fn severity(self) -> Severity {
        match self {
            DiagnosticKind::EmptyCaseList
            | DiagnosticKind::DefaultedMembers
            | DiagnosticKind::PaddedIntersection
            | DiagnosticKind::EmptyName => Severity::Info,
            _ => Severity::Warning,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            DiagnosticKind::UnknownTag => "unknown_tag",
            DiagnosticKind::UnknownRule => "unknown_rule",
            DiagnosticKind::InapplicableRule => "inapplicable_rule",
            DiagnosticKind::RuleAfterWrapper => "rule_after_wrapper",
            DiagnosticKind::InvalidPattern => "invalid_pattern",
            DiagnosticKind::InvalidExpression => "invalid_expression",
            DiagnosticKind::InvalidDateBound => "invalid_date_bound",
            DiagnosticKind::ZeroBigIntStep => "zero_bigint_step",
            DiagnosticKind::EmptyName => "empty_name",
            DiagnosticKind::DuplicateName => "duplicate_name",
            DiagnosticKind::DuplicateId => "duplicate_id",
            DiagnosticKind::DuplicateCase => "duplicate_case",
            DiagnosticKind::DiscriminatorField => "discriminator_field",
            DiagnosticKind::EmptyCaseList => "empty_case_list",
            DiagnosticKind::DefaultedMembers => "defaulted_members",
            DiagnosticKind::PaddedIntersection => "padded_intersection",
        }
    }

    /// Whether the diagnostic reports a rule that had no effect
    pub fn is_skipped_rule(self) -> bool {
        matches!(
            self,
            DiagnosticKind::UnknownRule
                | DiagnosticKind::InapplicableRule
                | DiagnosticKind::RuleAfterWrapper
                | DiagnosticKind::InvalidPattern
                | DiagnosticKind::InvalidExpression
                | DiagnosticKind::InvalidDateBound
                | DiagnosticKind::ZeroBigIntStep
        )
    }
}

/// One finding, located by a `$`-rooted path into the field tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub field_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: kind.severity(),
            kind,
            path: path.into(),
            field_id: String::new(),
            rule_id: None,
            message: message.into(),
        }
    }

    pub fn with_field_id(mut self, id: impl Into<String>) -> Self {
        self.field_id = id.into();
        self
    }

    pub fn with_rule_id(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        self.rule_id = if id.is_empty() { None } else { Some(id) };
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}] {}: {}", self.severity, self.kind.code(), self.path, self.message)
    }
}

/// All findings for one field tree
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LintReport {
    pub diagnostics: Vec<Diagnostic>,
}

impl LintReport {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Rules that neither backend applies
    pub fn skipped_rules(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.kind.is_skipped_rule())
    }

    pub fn count_by_kind(&self) -> HashMap<DiagnosticKind, usize> {
        let mut counts = HashMap::new();
        for diagnostic in &self.diagnostics {
            *counts.entry(diagnostic.kind).or_insert(0) += 1;
        }
        counts
    }
}

/// Lower `fields` and report everything that was degraded along the way
pub fn lint(fields: &[FieldSpec], options: &LowerOptions) -> Result<LintReport> {
    let lowered = lower(fields, options)?;
    let mut diagnostics = lowered.diagnostics;
    let mut seen: HashMap<&str, String> = HashMap::new();
    let mut stack: Vec<(&FieldSpec, String)> = fields
        .iter()
        .enumerate()
        .map(|(i, f)| (f, format!("$[{}]", i)))
        .collect();
    stack.reverse();
    while let Some((field, location)) = stack.pop() {
        if !field.id.is_empty() {
            if let Some(first) = seen.get(field.id.as_str()) {
                diagnostics.push(
                    Diagnostic::new(
                        DiagnosticKind::DuplicateId,
                        location.clone(),
                        format!("id `{}` is also used at {}", field.id, first),
                    )
                    .with_field_id(field.id.clone()),
                );
            } else {
                seen.insert(field.id.as_str(), location.clone());
            }
        }
        let nested: Vec<&FieldSpec> = field.children.iter().chain(field.nested_refs()).collect();
        for (i, child) in nested.into_iter().enumerate().rev() {
            stack.push((child, format!("{}[{}]", location, i)));
        }
    }
    Ok(LintReport { diagnostics })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RuleKind, TypeTag};

    #[test]
    fn test_clean_tree() {
        let fields = vec![FieldSpec::of("name", TypeTag::String).rule(RuleKind::Min, "1")];
        let report = lint(&fields, &LowerOptions::default()).unwrap();
        assert!(report.is_clean(), "{:?}", report);
    }

    #[test]
    fn test_reports_skips_and_duplicates() {
        let fields = vec![
            FieldSpec::of("age", TypeTag::Number)
                .with_id("a")
                .rule(RuleKind::Email, ""),
            FieldSpec::of("age", TypeTag::Boolean).with_id("a"),
        ];
        let report = lint(&fields, &LowerOptions::default()).unwrap();
        let counts = report.count_by_kind();
        assert_eq!(counts.get(&DiagnosticKind::InapplicableRule), Some(&1));
        assert_eq!(counts.get(&DiagnosticKind::DuplicateName), Some(&1));
        assert_eq!(counts.get(&DiagnosticKind::DuplicateId), Some(&1));
        assert_eq!(report.skipped_rules().count(), 1);
        assert_eq!(report.warning_count(), 3);
    }

    #[test]
    fn test_display() {
        let diagnostic = Diagnostic::new(DiagnosticKind::InvalidPattern, "$.code", "bad pattern");
        assert_eq!(diagnostic.to_string(), "warning[invalid_pattern] $.code: bad pattern");
    }
}
