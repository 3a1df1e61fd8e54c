//! Rule dispatch table
//!
//! One function decides, for every rule kind, whether it applies to a field
//! and what typed [`RuleOp`] it lowers to. Both backends only ever see the
//! ops produced here, so a rule is either applied by both or skipped by both.
//!
//! Copyright (c) 2025 Fieldsmith Team
//! Licensed under the Apache-2.0 license

use crate::expr::{parse_expression, Expression};
use crate::ir::{Bound, RuleOp, StringFormat};
use crate::lint::DiagnosticKind;
use crate::model::{FieldKind, RuleKind, StringParams, TypeTag, ValidationRule};
use crate::policy;
use crate::registry;

/// Outcome of looking a rule up in the table
#[derive(Debug, Clone, PartialEq)]
pub enum RuleLowering {
    Apply(RuleOp),
    Skip { kind: DiagnosticKind, reason: String },
}

impl RuleLowering {
    fn skip(kind: DiagnosticKind, reason: impl Into<String>) -> Self {
        RuleLowering::Skip {
            kind,
            reason: reason.into(),
        }
    }
}

/// What the table needs to know about the field a rule sits on
#[derive(Debug, Clone, Copy)]
pub struct RuleTarget<'a> {
    /// Tag the field validates as
    pub tag: TypeTag,
    pub kind: &'a FieldKind,
    /// Whether a universal wrapper was already applied
    pub wrapped: bool,
}

impl<'a> RuleTarget<'a> {
    pub fn new(kind: &'a FieldKind) -> Self {
        Self {
            tag: kind.effective_tag(),
            kind,
            wrapped: false,
        }
    }

    fn string_params(&self) -> StringParams {
        match self.kind {
            FieldKind::String(params) => params.clone(),
            _ => StringParams::default(),
        }
    }
}

/// Decide whether `rule` applies to `target`, and lower its payload if so
pub fn lower_rule(target: &RuleTarget<'_>, rule: &ValidationRule) -> RuleLowering {
    if !rule.kind.is_recognized() {
        return RuleLowering::skip(
            DiagnosticKind::UnknownRule,
            format!("unknown rule kind `{}`", rule.kind),
        );
    }
    if !registry::is_applicable(target.tag, &rule.kind) {
        return RuleLowering::skip(
            DiagnosticKind::InapplicableRule,
            format!("`{}` does not apply to {}", rule.kind, target.tag),
        );
    }
    if target.wrapped && !rule.kind.is_universal() {
        return RuleLowering::skip(
            DiagnosticKind::RuleAfterWrapper,
            format!("`{}` follows a wrapping rule", rule.kind),
        );
    }

    let message = rule.custom_message().map(str::to_string);
    let op = match &rule.kind {
        RuleKind::Min => bound(target.tag, &rule.value).map(|b| RuleOp::Min(b, message)),
        RuleKind::Max => bound(target.tag, &rule.value).map(|b| RuleOp::Max(b, message)),
        RuleKind::Gt => bound(target.tag, &rule.value).map(|b| RuleOp::Gt(b, message)),
        RuleKind::Lt => bound(target.tag, &rule.value).map(|b| RuleOp::Lt(b, message)),
        RuleKind::Length => Ok(RuleOp::Length(
            policy::parse_number_or_zero(&rule.value),
            message,
        )),
        RuleKind::MultipleOf => step(target.tag, &rule.value).map(|b| RuleOp::MultipleOf(b, message)),
        RuleKind::Pattern => pattern(&rule.value).map(|source| RuleOp::Regex(source, message)),
        RuleKind::Email => Ok(RuleOp::Format(StringFormat::Email, message)),
        RuleKind::Url => Ok(RuleOp::Format(StringFormat::Url, message)),
        RuleKind::Uuid => Ok(RuleOp::Format(StringFormat::Uuid, message)),
        RuleKind::Cuid => Ok(RuleOp::Format(StringFormat::Cuid, message)),
        RuleKind::Cuid2 => Ok(RuleOp::Format(StringFormat::Cuid2, message)),
        RuleKind::Ulid => Ok(RuleOp::Format(StringFormat::Ulid, message)),
        RuleKind::Emoji => Ok(RuleOp::Format(StringFormat::Emoji, message)),
        RuleKind::Base64 => Ok(RuleOp::Format(StringFormat::Base64, message)),
        RuleKind::Includes => Ok(RuleOp::Includes(rule.value.clone(), message)),
        RuleKind::StartsWith => Ok(RuleOp::StartsWith(rule.value.clone(), message)),
        RuleKind::EndsWith => Ok(RuleOp::EndsWith(rule.value.clone(), message)),
        RuleKind::Trim => Ok(RuleOp::Trim),
        RuleKind::ToLowerCase => Ok(RuleOp::ToLowerCase),
        RuleKind::ToUpperCase => Ok(RuleOp::ToUpperCase),
        RuleKind::Datetime => {
            let params = target.string_params().datetime;
            Ok(RuleOp::Datetime {
                precision: params.precision,
                offset: params.offset,
                message,
            })
        }
        RuleKind::Ip => Ok(RuleOp::Ip {
            version: target.string_params().ip.version,
            message,
        }),
        RuleKind::Int => Ok(RuleOp::Int(message)),
        RuleKind::Positive => Ok(RuleOp::Positive(message)),
        RuleKind::Negative => Ok(RuleOp::Negative(message)),
        RuleKind::Nonpositive => Ok(RuleOp::Nonpositive(message)),
        RuleKind::Nonnegative => Ok(RuleOp::Nonnegative(message)),
        RuleKind::Finite => Ok(RuleOp::Finite(message)),
        RuleKind::Safe => Ok(RuleOp::Safe(message)),
        RuleKind::Nonempty => Ok(RuleOp::Nonempty(message)),
        RuleKind::Optional => Ok(RuleOp::Optional),
        RuleKind::Nullable => Ok(RuleOp::Nullable),
        RuleKind::Nullish => Ok(RuleOp::Nullish),
        RuleKind::Default => Ok(RuleOp::Default(policy::default_literal(target.tag, &rule.value))),
        RuleKind::Catch => Ok(RuleOp::Catch(policy::default_literal(target.tag, &rule.value))),
        RuleKind::Transform => expression(rule).map(RuleOp::Transform),
        RuleKind::Refine => expression(rule).map(|expr| RuleOp::Refine(expr, message)),
        RuleKind::Brand => Ok(RuleOp::Brand(policy::brand_name(&rule.value))),
        RuleKind::Readonly => Ok(RuleOp::Readonly),
        RuleKind::Unrecognized(_) => Err(RuleLowering::skip(DiagnosticKind::UnknownRule, "unknown rule kind")),
    };

    match op {
        Ok(op) => RuleLowering::Apply(op),
        Err(skip) => skip,
    }
}

fn bound(tag: TypeTag, raw: &str) -> Result<Bound, RuleLowering> {
    match tag {
        TypeTag::BigInt => Ok(Bound::BigInt(policy::parse_bigint_or_zero(raw))),
        TypeTag::Date => policy::parse_date_bound(raw).map(Bound::Date).ok_or_else(|| {
            RuleLowering::skip(
                DiagnosticKind::InvalidDateBound,
                format!("`{}` is not a date", raw),
            )
        }),
        _ => Ok(Bound::Number(policy::parse_number_or_zero(raw))),
    }
}

fn step(tag: TypeTag, raw: &str) -> Result<Bound, RuleLowering> {
    match tag {
        TypeTag::BigInt => match policy::parse_bigint_or_zero(raw) {
            0 => Err(RuleLowering::skip(
                DiagnosticKind::ZeroBigIntStep,
                "bigint step of zero",
            )),
            n => Ok(Bound::BigInt(n)),
        },
        _ => Ok(Bound::Number(policy::parse_number_or_zero(raw))),
    }
}

/// Patterns must mean the same to the regex engine and to `new RegExp`
///
/// The op keeps the JavaScript source for the emitter; the interpreter
/// compiles it through [`policy::compile_js_pattern`], the same call made here.
fn pattern(source: &str) -> Result<String, RuleLowering> {
    if let Some(construct) = NON_JS_CONSTRUCTS.iter().find(|c| source.contains(**c)) {
        return Err(RuleLowering::skip(
            DiagnosticKind::InvalidPattern,
            format!("pattern uses `{}`, which JavaScript reads differently", construct),
        ));
    }
    match policy::compile_js_pattern(source) {
        Ok(_) => Ok(source.to_string()),
        Err(err) => Err(RuleLowering::skip(
            DiagnosticKind::InvalidPattern,
            format!("pattern does not compile: {}", last_line(&err.to_string())),
        )),
    }
}

const NON_JS_CONSTRUCTS: &[&str] = &[
    "(?i", "(?m", "(?s", "(?x", "(?u", "(?U", "(?-", "(?P<", "\\A", "\\z", "\\p", "\\P", "\\u{",
    "\\x{",
];

fn expression(rule: &ValidationRule) -> Result<Expression, RuleLowering> {
    parse_expression(rule.expression_source()).map_err(|err| {
        RuleLowering::skip(
            DiagnosticKind::InvalidExpression,
            format!("expression does not parse: {}", err),
        )
    })
}

fn last_line(text: &str) -> &str {
    text.lines().last().unwrap_or(text).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::default_kind;

    fn lower(tag: TypeTag, rule: ValidationRule) -> RuleLowering {
        let kind = default_kind(tag);
        lower_rule(&RuleTarget::new(&kind), &rule)
    }

    fn skipped_as(lowering: RuleLowering) -> Option<DiagnosticKind> {
        match lowering {
            RuleLowering::Skip { kind, .. } => Some(kind),
            RuleLowering::Apply(_) => None,
        }
    }

    #[test]
    fn test_bounds_are_typed_by_base() {
        assert_eq!(
            lower(TypeTag::Number, ValidationRule::new(RuleKind::Min, "3")),
            RuleLowering::Apply(RuleOp::Min(Bound::Number(3.0), None))
        );
        assert_eq!(
            lower(TypeTag::BigInt, ValidationRule::new(RuleKind::Max, "10")),
            RuleLowering::Apply(RuleOp::Max(Bound::BigInt(10), None))
        );
        assert_eq!(
            lower(TypeTag::Date, ValidationRule::new(RuleKind::Min, "1970-01-01")),
            RuleLowering::Apply(RuleOp::Min(Bound::Date(0.0), None))
        );
        assert_eq!(
            lower(TypeTag::String, ValidationRule::new(RuleKind::Min, "abc").with_message("x")),
            RuleLowering::Apply(RuleOp::Min(Bound::Number(0.0), Some("x".into())))
        );
    }

    #[test]
    fn test_skips_with_reasons() {
        assert_eq!(
            skipped_as(lower(TypeTag::Boolean, ValidationRule::new(RuleKind::Email, ""))),
            Some(DiagnosticKind::InapplicableRule)
        );
        assert_eq!(
            skipped_as(lower(TypeTag::String, ValidationRule::new(RuleKind::Pattern, "(["))),
            Some(DiagnosticKind::InvalidPattern)
        );
        assert_eq!(
            skipped_as(lower(TypeTag::String, ValidationRule::new(RuleKind::Pattern, "(?i)abc"))),
            Some(DiagnosticKind::InvalidPattern)
        );
        assert_eq!(
            lower(TypeTag::String, ValidationRule::new(RuleKind::Pattern, r"^\d+$")),
            RuleLowering::Apply(RuleOp::Regex(r"^\d+$".into(), None))
        );
        assert_eq!(
            skipped_as(lower(TypeTag::Date, ValidationRule::new(RuleKind::Max, "soon"))),
            Some(DiagnosticKind::InvalidDateBound)
        );
        assert_eq!(
            skipped_as(lower(TypeTag::BigInt, ValidationRule::new(RuleKind::MultipleOf, "0"))),
            Some(DiagnosticKind::ZeroBigIntStep)
        );
        assert_eq!(
            skipped_as(lower(TypeTag::Any, ValidationRule::new(RuleKind::Refine, "val =>"))),
            Some(DiagnosticKind::InvalidExpression)
        );
        assert_eq!(
            skipped_as(lower(TypeTag::Any, ValidationRule::new(RuleKind::parse("sparkle"), ""))),
            Some(DiagnosticKind::UnknownRule)
        );
    }

    #[test]
    fn test_wrapped_target_skips_type_specific_rules() {
        let kind = default_kind(TypeTag::String);
        let mut target = RuleTarget::new(&kind);
        target.wrapped = true;
        assert_eq!(
            skipped_as(lower_rule(&target, &ValidationRule::new(RuleKind::Trim, ""))),
            Some(DiagnosticKind::RuleAfterWrapper)
        );
        assert_eq!(
            lower_rule(&target, &ValidationRule::new(RuleKind::Optional, "")),
            RuleLowering::Apply(RuleOp::Optional)
        );
    }

    #[test]
    fn test_tuple_flag_consults_tuple_row() {
        let kind: FieldKind = FieldKind::Array(crate::model::ArrayParams {
            is_tuple: true,
            ..Default::default()
        });
        assert_eq!(
            skipped_as(lower_rule(&RuleTarget::new(&kind), &ValidationRule::new(RuleKind::Min, "1"))),
            Some(DiagnosticKind::InapplicableRule)
        );
    }

    #[test]
    fn test_string_options_come_from_params() {
        let kind = FieldKind::String(StringParams {
            datetime: crate::model::DatetimeParams {
                precision: Some(3),
                offset: true,
            },
            ..Default::default()
        });
        assert_eq!(
            lower_rule(&RuleTarget::new(&kind), &ValidationRule::new(RuleKind::Datetime, "")),
            RuleLowering::Apply(RuleOp::Datetime {
                precision: Some(3),
                offset: true,
                message: None
            })
        );
    }

    #[test]
    fn test_default_payload_follows_tag() {
        assert_eq!(
            lower(TypeTag::Number, ValidationRule::new(RuleKind::Default, "7")),
            RuleLowering::Apply(RuleOp::Default(crate::ir::Literal::Number(7.0)))
        );
        assert_eq!(
            lower(TypeTag::Any, ValidationRule::new(RuleKind::Brand, "")),
            RuleLowering::Apply(RuleOp::Brand("Brand".into()))
        );
    }
}
