//! Validation rules attached to a field

use super::serde_util::{lenient_opt_string, lenient_string};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Kind of a validation rule
///
/// Kinds the catalog does not know survive as [`RuleKind::Unrecognized`] so
/// documents round-trip; both backends treat them as no-ops.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Min,
    Max,
    Length,
    Gt,
    Lt,
    Pattern,
    Email,
    Url,
    Uuid,
    Cuid,
    Cuid2,
    Ulid,
    Emoji,
    Base64,
    Includes,
    StartsWith,
    EndsWith,
    Trim,
    ToLowerCase,
    ToUpperCase,
    Datetime,
    Ip,
    Int,
    Positive,
    Negative,
    Nonpositive,
    Nonnegative,
    MultipleOf,
    Finite,
    Safe,
    Nonempty,
    Optional,
    Nullable,
    Nullish,
    Default,
    Catch,
    Transform,
    Refine,
    Brand,
    Readonly,
    Unrecognized(String),
}

impl RuleKind {
    /// Every recognized kind
    pub const KNOWN: [RuleKind; 40] = [
        RuleKind::Min,
        RuleKind::Max,
        RuleKind::Length,
        RuleKind::Gt,
        RuleKind::Lt,
        RuleKind::Pattern,
        RuleKind::Email,
        RuleKind::Url,
        RuleKind::Uuid,
        RuleKind::Cuid,
        RuleKind::Cuid2,
        RuleKind::Ulid,
        RuleKind::Emoji,
        RuleKind::Base64,
        RuleKind::Includes,
        RuleKind::StartsWith,
        RuleKind::EndsWith,
        RuleKind::Trim,
        RuleKind::ToLowerCase,
        RuleKind::ToUpperCase,
        RuleKind::Datetime,
        RuleKind::Ip,
        RuleKind::Int,
        RuleKind::Positive,
        RuleKind::Negative,
        RuleKind::Nonpositive,
        RuleKind::Nonnegative,
        RuleKind::MultipleOf,
        RuleKind::Finite,
        RuleKind::Safe,
        RuleKind::Nonempty,
        RuleKind::Optional,
        RuleKind::Nullable,
        RuleKind::Nullish,
        RuleKind::Default,
        RuleKind::Catch,
        RuleKind::Transform,
        RuleKind::Refine,
        RuleKind::Brand,
        RuleKind::Readonly,
    ];

    /// Kinds every field accepts regardless of type
    pub const UNIVERSAL: [RuleKind; 9] = [
        RuleKind::Optional,
        RuleKind::Nullable,
        RuleKind::Nullish,
        RuleKind::Default,
        RuleKind::Catch,
        RuleKind::Transform,
        RuleKind::Refine,
        RuleKind::Brand,
        RuleKind::Readonly,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            RuleKind::Min => "min",
            RuleKind::Max => "max",
            RuleKind::Length => "length",
            RuleKind::Gt => "gt",
            RuleKind::Lt => "lt",
            RuleKind::Pattern => "pattern",
            RuleKind::Email => "email",
            RuleKind::Url => "url",
            RuleKind::Uuid => "uuid",
            RuleKind::Cuid => "cuid",
            RuleKind::Cuid2 => "cuid2",
            RuleKind::Ulid => "ulid",
            RuleKind::Emoji => "emoji",
            RuleKind::Base64 => "base64",
            RuleKind::Includes => "includes",
            RuleKind::StartsWith => "startsWith",
            RuleKind::EndsWith => "endsWith",
            RuleKind::Trim => "trim",
            RuleKind::ToLowerCase => "toLowerCase",
            RuleKind::ToUpperCase => "toUpperCase",
            RuleKind::Datetime => "datetime",
            RuleKind::Ip => "ip",
            RuleKind::Int => "int",
            RuleKind::Positive => "positive",
            RuleKind::Negative => "negative",
            RuleKind::Nonpositive => "nonpositive",
            RuleKind::Nonnegative => "nonnegative",
            RuleKind::MultipleOf => "multipleOf",
            RuleKind::Finite => "finite",
            RuleKind::Safe => "safe",
            RuleKind::Nonempty => "nonempty",
            RuleKind::Optional => "optional",
            RuleKind::Nullable => "nullable",
            RuleKind::Nullish => "nullish",
            RuleKind::Default => "default",
            RuleKind::Catch => "catch",
            RuleKind::Transform => "transform",
            RuleKind::Refine => "refine",
            RuleKind::Brand => "brand",
            RuleKind::Readonly => "readonly",
            RuleKind::Unrecognized(raw) => raw,
        }
    }

    /// Resolve a wire spelling, including accepted aliases
    pub fn parse(input: &str) -> Self {
        let normalized: String = input
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        let alias = match normalized.as_str() {
            "gte" | "minlength" | "minsize" => Some(RuleKind::Min),
            "lte" | "maxlength" | "maxsize" => Some(RuleKind::Max),
            "size" => Some(RuleKind::Length),
            "regex" => Some(RuleKind::Pattern),
            "lowercase" => Some(RuleKind::ToLowerCase),
            "uppercase" => Some(RuleKind::ToUpperCase),
            "step" => Some(RuleKind::MultipleOf),
            _ => None,
        };
        alias
            .or_else(|| {
                RuleKind::KNOWN
                    .into_iter()
                    .find(|kind| kind.as_str().to_lowercase() == normalized)
            })
            .unwrap_or_else(|| RuleKind::Unrecognized(input.to_string()))
    }

    pub fn is_universal(&self) -> bool {
        RuleKind::UNIVERSAL.contains(self)
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, RuleKind::Unrecognized(_))
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RuleKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RuleKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(RuleKind::parse(&lenient_string(deserializer)?))
    }
}

/// One entry of a field's ordered rule pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRule {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,

    #[serde(alias = "type")]
    pub kind: RuleKind,

    /// Free-form payload; numbers and booleans on the wire are stringified
    #[serde(default, deserialize_with = "lenient_string")]
    pub value: String,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt_string")]
    pub message: Option<String>,

    /// Expression payload for `transform` and `refine`
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient_opt_string")]
    pub transform: Option<String>,
}

impl ValidationRule {
    pub fn new(kind: RuleKind, value: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            kind,
            value: value.into(),
            message: None,
            transform: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// The custom message, treating a blank message as absent
    pub fn custom_message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.trim().is_empty())
    }

    /// Expression source for `transform`/`refine`: the `transform` slot wins over `value`
    pub fn expression_source(&self) -> &str {
        self.transform
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_aliases() {
        assert_eq!(RuleKind::parse("min-length"), RuleKind::Min);
        assert_eq!(RuleKind::parse("maxLength"), RuleKind::Max);
        assert_eq!(RuleKind::parse("regex"), RuleKind::Pattern);
        assert_eq!(RuleKind::parse("MULTIPLE_OF"), RuleKind::MultipleOf);
        assert_eq!(RuleKind::parse("lowercase"), RuleKind::ToLowerCase);
        assert_eq!(RuleKind::parse("sparkle"), RuleKind::Unrecognized("sparkle".into()));
    }

    #[test]
    fn test_every_known_kind_round_trips() {
        for kind in RuleKind::KNOWN {
            assert_eq!(RuleKind::parse(kind.as_str()), kind);
        }
    }

    #[test]
    fn test_rule_wire_shape() {
        let rule: ValidationRule = serde_json::from_value(json!({
            "id": 7,
            "type": "min",
            "value": 3,
            "message": ""
        }))
        .unwrap();
        assert_eq!(rule.id, "7");
        assert_eq!(rule.kind, RuleKind::Min);
        assert_eq!(rule.value, "3");
        assert_eq!(rule.custom_message(), None);

        let out = serde_json::to_value(ValidationRule::new(RuleKind::StartsWith, "ab")).unwrap();
        assert_eq!(out, json!({ "id": "", "kind": "startsWith", "value": "ab" }));
    }

    #[test]
    fn test_unknown_kind_round_trips_verbatim() {
        let rule: ValidationRule =
            serde_json::from_value(json!({ "kind": "sparkle", "value": "x" })).unwrap();
        assert!(!rule.kind.is_recognized());
        assert_eq!(serde_json::to_value(&rule).unwrap()["kind"], json!("sparkle"));
    }

    #[test]
    fn test_expression_source_preference() {
        let mut rule = ValidationRule::new(RuleKind::Transform, "val.trim()");
        assert_eq!(rule.expression_source(), "val.trim()");
        rule.transform = Some("(v) => v.toUpperCase()".into());
        assert_eq!(rule.expression_source(), "(v) => v.toUpperCase()");
    }
}
