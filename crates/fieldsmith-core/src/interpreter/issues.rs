//! Validation issues and the path context they are reported against
//!
//! Copyright (c) 2025 Fieldsmith Team
//! Licensed under the Apache-2.0 license

use crate::policy;
use crate::value::ParsedType;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Machine-readable kind of an issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    InvalidType,
    InvalidLiteral,
    Custom,
    InvalidUnion,
    InvalidUnionDiscriminator,
    InvalidEnumValue,
    UnrecognizedKeys,
    InvalidArguments,
    InvalidReturnType,
    InvalidDate,
    InvalidString,
    TooSmall,
    TooBig,
    InvalidIntersectionTypes,
    NotMultipleOf,
    NotFinite,
}

impl IssueCode {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueCode::InvalidType => "invalid_type",
            IssueCode::InvalidLiteral => "invalid_literal",
            IssueCode::Custom => "custom",
            IssueCode::InvalidUnion => "invalid_union",
            IssueCode::InvalidUnionDiscriminator => "invalid_union_discriminator",
            IssueCode::InvalidEnumValue => "invalid_enum_value",
            IssueCode::UnrecognizedKeys => "unrecognized_keys",
            IssueCode::InvalidArguments => "invalid_arguments",
            IssueCode::InvalidReturnType => "invalid_return_type",
            IssueCode::InvalidDate => "invalid_date",
            IssueCode::InvalidString => "invalid_string",
            IssueCode::TooSmall => "too_small",
            IssueCode::TooBig => "too_big",
            IssueCode::InvalidIntersectionTypes => "invalid_intersection_types",
            IssueCode::NotMultipleOf => "not_multiple_of",
            IssueCode::NotFinite => "not_finite",
        }
    }
}

impl fmt::Display for IssueCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reason a value was rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// `$`-rooted path of the offending value
    pub path: String,
    pub code: IssueCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub received: Option<String>,
}

impl Issue {
    pub fn new(path: impl Into<String>, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            code,
            message: message.into(),
            expected: None,
            received: None,
        }
    }

    pub fn invalid_type(path: impl Into<String>, expected: impl Into<String>, received: ParsedType) -> Self {
        let expected = expected.into();
        let message = if received == ParsedType::Undefined {
            "Required".to_string()
        } else {
            format!("Expected {}, received {}", expected, received)
        };
        Self {
            path: path.into(),
            code: IssueCode::InvalidType,
            message,
            expected: Some(expected),
            received: Some(received.to_string()),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at '{}': {}", self.code, self.path, self.message)
    }
}

/// Every issue found while parsing one value
#[derive(Debug, Clone, Default, PartialEq, Eq, Error, Serialize, Deserialize)]
pub struct ValidationIssues {
    pub issues: Vec<Issue>,
}

impl fmt::Display for ValidationIssues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.issues.as_slice() {
            [] => write!(f, "Validation failed"),
            [only] => write!(f, "{}", only),
            issues => {
                write!(f, "{} validation issues:", issues.len())?;
                for (i, issue) in issues.iter().enumerate() {
                    write!(f, "\n{}. {}", i + 1, issue)?;
                }
                Ok(())
            }
        }
    }
}

impl ValidationIssues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, issue: Issue) {
        self.issues.push(issue);
    }

    pub fn extend(&mut self, other: ValidationIssues) {
        self.issues.extend(other.issues);
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Issue> {
        self.issues.iter()
    }

    /// Issues reported at exactly `path`
    pub fn at<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a Issue> {
        self.issues.iter().filter(move |issue| issue.path == path)
    }

    pub fn has_code(&self, code: IssueCode) -> bool {
        self.issues.iter().any(|issue| issue.code == code)
    }
}

impl From<Issue> for ValidationIssues {
    fn from(issue: Issue) -> Self {
        Self {
            issues: vec![issue],
        }
    }
}

impl IntoIterator for ValidationIssues {
    type Item = Issue;
    type IntoIter = std::vec::IntoIter<Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.issues.into_iter()
    }
}

/// Where in the input value parsing currently is
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseContext {
    pub path: String,
}

impl Default for ParseContext {
    fn default() -> Self {
        Self::root()
    }
}

impl ParseContext {
    pub fn root() -> Self {
        Self {
            path: "$".to_string(),
        }
    }

    /// Context for an object key
    pub fn child(&self, key: &str) -> Self {
        let path = if policy::is_js_identifier(key) {
            format!("{}.{}", self.path, key)
        } else {
            format!("{}[{}]", self.path, policy::quote_js_string(key))
        };
        Self { path }
    }

    /// Context for an array or tuple index
    pub fn child_index(&self, index: usize) -> Self {
        Self {
            path: format!("{}[{}]", self.path, index),
        }
    }

    pub fn issue(&self, code: IssueCode, message: impl Into<String>) -> Issue {
        Issue::new(self.path.clone(), code, message)
    }

    pub fn invalid_type(&self, expected: impl Into<String>, received: ParsedType) -> Issue {
        Issue::invalid_type(self.path.clone(), expected, received)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        let root = ParseContext::root();
        assert_eq!(root.child("items").child_index(0).child("name").path, "$.items[0].name");
        assert_eq!(root.child("first name").path, "$[\"first name\"]");
    }

    #[test]
    fn test_invalid_type_messages() {
        let ctx = ParseContext::root().child("age");
        assert_eq!(ctx.invalid_type("number", ParsedType::Undefined).message, "Required");
        assert_eq!(
            ctx.invalid_type("number", ParsedType::String).message,
            "Expected number, received string"
        );
    }

    #[test]
    fn test_display() {
        let mut issues = ValidationIssues::new();
        issues.add(ParseContext::root().issue(IssueCode::Custom, "nope"));
        assert_eq!(issues.to_string(), "custom at '$': nope");
        issues.add(ParseContext::root().child("a").issue(IssueCode::TooSmall, "small"));
        assert!(issues.to_string().starts_with("2 validation issues:"));
        assert_eq!(issues.at("$.a").count(), 1);
    }
}
