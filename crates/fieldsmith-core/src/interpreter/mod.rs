//! Live validator backend
//!
//! [`Interpreter`] folds the lowered tree into a [`Schema`], which parses
//! runtime [`Value`]s with Zod v3 semantics. Type-specific ops only ever
//! reach a bare scalar or collection schema, because lowering drops every
//! type-specific rule that follows a wrapper.
//!
//! # Example
//!
//! ```
//! use fieldsmith_core::model::{FieldSpec, RuleKind, TypeTag};
//! use fieldsmith_core::{compile, Value};
//!
//! let fields = vec![FieldSpec::of("age", TypeTag::Number)
//!     .coerced()
//!     .rule(RuleKind::Min, "0")
//!     .rule(RuleKind::Int, "")];
//! let validator = compile(&fields).unwrap();
//! assert!(validator.is_valid(&Value::object([("age", Value::from("42"))])));
//! assert!(!validator.is_valid(&Value::object([("age", Value::from("-1"))])));
//! ```
//!
//! Copyright (c) 2025 Fieldsmith Team
//! Licensed under the Apache-2.0 license

pub mod checks;
pub mod issues;
pub mod schema;
pub mod validator;

pub use issues::{Issue, IssueCode, ParseContext, ValidationIssues};
pub use schema::{Schema, UnknownKeyPolicy};
pub use validator::{ParseOutcome, Validator};

use crate::backend::Backend;
use crate::ir::{BaseNode, Bound, Literal, Message, RuleOp, SchemaNode, UnknownKeys};
use crate::lower::{lower, lower_field, LowerOptions};
use crate::model::FieldSpec;
use crate::policy;
use crate::value::{format_number, Value, MAX_SAFE_INTEGER, MIN_SAFE_INTEGER};
use crate::Result;
use checks::{datetime_regex, BigIntCheck, DateCheck, NumberCheck, SizeBounds, StringCheck};
use std::sync::Arc;
use tracing::{debug, warn};

/// Compile a root field list into a validator
pub fn compile(fields: &[FieldSpec]) -> Result<Validator> {
    compile_with(fields, &LowerOptions::default())
}

pub fn compile_with(fields: &[FieldSpec], options: &LowerOptions) -> Result<Validator> {
    let lowered = lower(fields, options)?;
    if !lowered.diagnostics.is_empty() {
        debug!(count = lowered.diagnostics.len(), "compiling with degraded rules");
    }
    Ok(compile_node(&lowered.node))
}

/// Compile one field as the whole schema
pub fn compile_field(field: &FieldSpec, options: &LowerOptions) -> Result<Validator> {
    let lowered = lower_field(field, options)?;
    Ok(compile_node(&lowered.node))
}

/// Compile an already lowered tree
pub fn compile_node(node: &SchemaNode) -> Validator {
    Validator::new(Interpreter.node(node))
}

/// Builds [`Schema`] trees
#[derive(Debug, Default, Clone, Copy)]
pub struct Interpreter;

fn bound_f64(bound: &Bound) -> f64 {
    match bound {
        Bound::Number(n) | Bound::Date(n) => *n,
        Bound::BigInt(n) => *n as f64,
    }
}

fn bound_i128(bound: &Bound) -> i128 {
    match bound {
        Bound::BigInt(n) => *n,
        Bound::Number(n) | Bound::Date(n) => *n as i128,
    }
}

/// Values a native enum accepts
///
/// A key whose value names another key holding a number is a reverse
/// mapping of a numeric member and is skipped.
pub fn native_enum_values(entries: &[(String, Literal)]) -> Vec<Value> {
    let lookup = |key: &str| entries.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v);
    entries
        .iter()
        .filter(|(_, value)| {
            let name = match value {
                Literal::Number(n) => format_number(*n),
                other => other.to_value().to_js_string(),
            };
            !matches!(lookup(&name), Some(Literal::Number(_)))
        })
        .map(|(_, value)| value.to_value())
        .collect()
}

fn string_check(op: &RuleOp) -> Option<StringCheck> {
    let check = match op {
        RuleOp::Min(bound, message) => StringCheck::Min(bound_f64(bound), message.clone()),
        RuleOp::Max(bound, message) => StringCheck::Max(bound_f64(bound), message.clone()),
        RuleOp::Length(length, message) => StringCheck::Length(*length, message.clone()),
        RuleOp::Nonempty(message) => StringCheck::Min(1.0, message.clone()),
        RuleOp::Regex(pattern, message) => match policy::compile_js_pattern(pattern) {
            Ok(regex) => StringCheck::Regex(regex, message.clone()),
            Err(err) => {
                warn!(pattern = %pattern, error = %err, "skipping uncompilable pattern");
                return None;
            }
        },
        RuleOp::Format(format, message) => StringCheck::Format(*format, message.clone()),
        RuleOp::Includes(s, message) => StringCheck::Includes(s.clone(), message.clone()),
        RuleOp::StartsWith(s, message) => StringCheck::StartsWith(s.clone(), message.clone()),
        RuleOp::EndsWith(s, message) => StringCheck::EndsWith(s.clone(), message.clone()),
        RuleOp::Trim => StringCheck::Trim,
        RuleOp::ToLowerCase => StringCheck::ToLowerCase,
        RuleOp::ToUpperCase => StringCheck::ToUpperCase,
        RuleOp::Datetime {
            precision,
            offset,
            message,
        } => StringCheck::Datetime(datetime_regex(*precision, *offset), message.clone()),
        RuleOp::Ip { version, message } => StringCheck::Ip(*version, message.clone()),
        _ => return None,
    };
    Some(check)
}

fn number_checks(op: &RuleOp) -> Vec<NumberCheck> {
    let min = |value: f64, inclusive: bool, message: &Message| NumberCheck::Min {
        value,
        inclusive,
        message: message.clone(),
    };
    let max = |value: f64, inclusive: bool, message: &Message| NumberCheck::Max {
        value,
        inclusive,
        message: message.clone(),
    };
    match op {
        RuleOp::Min(bound, m) => vec![min(bound_f64(bound), true, m)],
        RuleOp::Max(bound, m) => vec![max(bound_f64(bound), true, m)],
        RuleOp::Gt(bound, m) => vec![min(bound_f64(bound), false, m)],
        RuleOp::Lt(bound, m) => vec![max(bound_f64(bound), false, m)],
        RuleOp::Positive(m) => vec![min(0.0, false, m)],
        RuleOp::Nonnegative(m) => vec![min(0.0, true, m)],
        RuleOp::Negative(m) => vec![max(0.0, false, m)],
        RuleOp::Nonpositive(m) => vec![max(0.0, true, m)],
        RuleOp::Int(m) => vec![NumberCheck::Int(m.clone())],
        RuleOp::Finite(m) => vec![NumberCheck::Finite(m.clone())],
        RuleOp::MultipleOf(bound, m) => vec![NumberCheck::MultipleOf(bound_f64(bound), m.clone())],
        RuleOp::Safe(m) => vec![min(MIN_SAFE_INTEGER, true, m), max(MAX_SAFE_INTEGER, true, m)],
        _ => Vec::new(),
    }
}

fn bigint_check(op: &RuleOp) -> Option<BigIntCheck> {
    let min = |value: i128, inclusive: bool, message: &Message| BigIntCheck::Min {
        value,
        inclusive,
        message: message.clone(),
    };
    let max = |value: i128, inclusive: bool, message: &Message| BigIntCheck::Max {
        value,
        inclusive,
        message: message.clone(),
    };
    let check = match op {
        RuleOp::Min(bound, m) => min(bound_i128(bound), true, m),
        RuleOp::Max(bound, m) => max(bound_i128(bound), true, m),
        RuleOp::Gt(bound, m) => min(bound_i128(bound), false, m),
        RuleOp::Lt(bound, m) => max(bound_i128(bound), false, m),
        RuleOp::Positive(m) => min(0, false, m),
        RuleOp::Nonnegative(m) => min(0, true, m),
        RuleOp::Negative(m) => max(0, false, m),
        RuleOp::Nonpositive(m) => max(0, true, m),
        RuleOp::MultipleOf(bound, m) => BigIntCheck::MultipleOf(bound_i128(bound), m.clone()),
        _ => return None,
    };
    Some(check)
}

fn date_check(op: &RuleOp) -> Option<DateCheck> {
    match op {
        RuleOp::Min(bound, m) => Some(DateCheck::Min(bound_f64(bound), m.clone())),
        RuleOp::Max(bound, m) => Some(DateCheck::Max(bound_f64(bound), m.clone())),
        _ => None,
    }
}

/// Apply a size op; `exact_sets_both` models `Set.size()`
fn apply_bounds(bounds: &mut SizeBounds, op: &RuleOp, exact_sets_both: bool) -> bool {
    match op {
        RuleOp::Min(bound, m) => bounds.min = Some((bound_f64(bound), m.clone())),
        RuleOp::Max(bound, m) => bounds.max = Some((bound_f64(bound), m.clone())),
        RuleOp::Nonempty(m) => bounds.min = Some((1.0, m.clone())),
        RuleOp::Length(length, m) if exact_sets_both => {
            bounds.min = Some((*length, m.clone()));
            bounds.max = Some((*length, m.clone()));
        }
        RuleOp::Length(length, m) => bounds.exact = Some((*length, m.clone())),
        _ => return false,
    }
    true
}

fn push<T>(checks: &mut Vec<T>, check: Option<T>) -> bool {
    match check {
        Some(check) => {
            checks.push(check);
            true
        }
        None => false,
    }
}

fn wrap(schema: Schema, op: &RuleOp) -> Schema {
    let inner = Box::new(schema);
    match op {
        RuleOp::Optional => Schema::Optional(inner),
        RuleOp::Nullable => Schema::Nullable(inner),
        RuleOp::Nullish => Schema::Optional(Box::new(Schema::Nullable(inner))),
        RuleOp::Default(literal) => Schema::Default(inner, literal.to_value()),
        RuleOp::Catch(literal) => Schema::Catch(inner, literal.to_value()),
        RuleOp::Transform(expression) => Schema::Transform(inner, expression.clone()),
        RuleOp::Refine(expression, message) => Schema::Refine(inner, expression.clone(), message.clone()),
        RuleOp::Brand(name) => Schema::Branded(inner, name.clone()),
        RuleOp::Readonly => Schema::Readonly(inner),
        _ => *inner,
    }
}

impl Interpreter {
    fn object(&mut self, fields: &[(String, SchemaNode)], unknown_keys: &UnknownKeys) -> Schema {
        let fields = fields
            .iter()
            .map(|(key, node)| (key.clone(), self.node(node)))
            .collect();
        let unknown_keys = match unknown_keys {
            UnknownKeys::Strip => UnknownKeyPolicy::Strip,
            UnknownKeys::Strict => UnknownKeyPolicy::Strict,
            UnknownKeys::Passthrough => UnknownKeyPolicy::Passthrough,
            UnknownKeys::Catchall(node) => UnknownKeyPolicy::Catchall(Box::new(self.node(node))),
        };
        Schema::Object {
            fields,
            unknown_keys,
        }
    }

    fn boxed(&mut self, node: &SchemaNode) -> Box<Schema> {
        Box::new(self.node(node))
    }
}

impl Backend for Interpreter {
    type Output = Schema;

    fn base(&mut self, base: &BaseNode) -> Schema {
        match base {
            BaseNode::String { coerce } => Schema::String {
                coerce: *coerce,
                checks: Vec::new(),
            },
            BaseNode::Number { coerce } => Schema::Number {
                coerce: *coerce,
                checks: Vec::new(),
            },
            BaseNode::BigInt { coerce } => Schema::BigInt {
                coerce: *coerce,
                checks: Vec::new(),
            },
            BaseNode::Boolean { coerce } => Schema::Boolean { coerce: *coerce },
            BaseNode::Date { coerce } => Schema::Date {
                coerce: *coerce,
                checks: Vec::new(),
            },
            BaseNode::Symbol => Schema::Symbol,
            BaseNode::Undefined => Schema::Undefined,
            BaseNode::Null => Schema::Null,
            BaseNode::Void => Schema::Void,
            BaseNode::Any => Schema::Any,
            BaseNode::Unknown => Schema::Unknown,
            BaseNode::Never => Schema::Never,
            BaseNode::NaN => Schema::NaN,
            BaseNode::Literal(literal) => Schema::Literal(literal.to_value()),
            BaseNode::Enum(members) => Schema::Enum(members.clone()),
            BaseNode::NativeEnum(entries) => Schema::NativeEnum(native_enum_values(entries)),
            BaseNode::Object(object) => self.object(&object.fields, &object.unknown_keys),
            BaseNode::Array(element) => Schema::Array {
                element: self.boxed(element),
                bounds: SizeBounds::default(),
            },
            BaseNode::Tuple { items, rest } => Schema::Tuple {
                items: items.iter().map(|item| self.node(item)).collect(),
                rest: rest.as_deref().map(|rest| self.boxed(rest)),
            },
            BaseNode::Union(members) => Schema::Union(members.iter().map(|m| self.node(m)).collect()),
            BaseNode::DiscriminatedUnion {
                discriminator,
                cases,
            } => {
                let cases = cases
                    .iter()
                    .map(|case| {
                        let tag = SchemaNode::new(BaseNode::Literal(Literal::String(case.value.clone())));
                        let mut fields = vec![(discriminator.clone(), tag)];
                        fields.extend(case.fields.iter().cloned());
                        let schema = self.object(&fields, &UnknownKeys::Strip);
                        (Value::String(case.value.clone()), schema)
                    })
                    .collect();
                Schema::DiscriminatedUnion {
                    discriminator: discriminator.clone(),
                    cases,
                }
            }
            BaseNode::Intersection(left, right) => Schema::Intersection(self.boxed(left), self.boxed(right)),
            BaseNode::Record { key, value } => Schema::Record {
                key: self.boxed(key),
                value: self.boxed(value),
            },
            BaseNode::Map { key, value } => Schema::Map {
                key: self.boxed(key),
                value: self.boxed(value),
            },
            BaseNode::Set(value) => Schema::Set {
                value: self.boxed(value),
                bounds: SizeBounds::default(),
            },
            BaseNode::Function { args, returns } => Schema::Function {
                args: Arc::new(Schema::Tuple {
                    items: args.iter().map(|arg| self.node(arg)).collect(),
                    rest: Some(Box::new(Schema::Unknown)),
                }),
                returns: Arc::new(self.node(returns)),
            },
            BaseNode::Promise(inner) => Schema::Promise(self.boxed(inner)),
        }
    }

    fn apply(&mut self, base: &BaseNode, output: Schema, op: &RuleOp) -> Schema {
        if op.is_wrapper() {
            return wrap(output, op);
        }
        let mut output = output;
        let applied = match &mut output {
            Schema::String { checks, .. } => push(checks, string_check(op)),
            Schema::Number { checks, .. } => {
                let added = number_checks(op);
                let any = !added.is_empty();
                checks.extend(added);
                any
            }
            Schema::BigInt { checks, .. } => push(checks, bigint_check(op)),
            Schema::Date { checks, .. } => push(checks, date_check(op)),
            Schema::Array { bounds, .. } => apply_bounds(bounds, op, false),
            Schema::Set { bounds, .. } => apply_bounds(bounds, op, true),
            _ => false,
        };
        if !applied {
            debug!(base = base.kind_name(), op = ?op, "op has no effect on this base");
        }
        output
    }

    fn describe(&mut self, output: Schema, description: &str) -> Schema {
        Schema::Described(Box::new(output), description.to_string())
    }
}
