//! Compiled validator tree and its parse semantics
//!
//! Parsing follows Zod v3. A node reports one of three outcomes: valid,
//! dirty (a check failed but the value kept its shape) or aborted (the value
//! has the wrong type). Issues go to a shared collector; composites merge
//! their children's outcomes so that one aborted child aborts the parent.
//! `refine` still runs on a dirty value, `transform` only on a valid one.
//!
//! Copyright (c) 2025 Fieldsmith Team
//! Licensed under the Apache-2.0 license

use super::checks::{
    run_bigint, run_date, run_number, run_string, BigIntCheck, DateCheck, NumberCheck, SizeBounds,
    StringCheck,
};
use super::issues::{Issue, IssueCode, ParseContext, ValidationIssues};
use crate::expr::Expression;
use crate::ir::Message;
use crate::value::{FunctionValue, Object, PromiseState, Value};
use std::sync::Arc;

/// What a schema does with undeclared object keys
#[derive(Debug, Clone, Default)]
pub enum UnknownKeyPolicy {
    #[default]
    Strip,
    Strict,
    Passthrough,
    Catchall(Box<Schema>),
}

/// A compiled, immutable validator node
#[derive(Debug, Clone)]
pub enum Schema {
    String {
        coerce: bool,
        checks: Vec<StringCheck>,
    },
    Number {
        coerce: bool,
        checks: Vec<NumberCheck>,
    },
    BigInt {
        coerce: bool,
        checks: Vec<BigIntCheck>,
    },
    Boolean {
        coerce: bool,
    },
    Date {
        coerce: bool,
        checks: Vec<DateCheck>,
    },
    Symbol,
    Undefined,
    Null,
    Void,
    Any,
    Unknown,
    Never,
    NaN,
    Literal(Value),
    Enum(Vec<String>),
    NativeEnum(Vec<Value>),
    Object {
        fields: Vec<(String, Schema)>,
        unknown_keys: UnknownKeyPolicy,
    },
    Array {
        element: Box<Schema>,
        bounds: SizeBounds,
    },
    Tuple {
        items: Vec<Schema>,
        rest: Option<Box<Schema>>,
    },
    Union(Vec<Schema>),
    DiscriminatedUnion {
        discriminator: String,
        cases: Vec<(Value, Schema)>,
    },
    Intersection(Box<Schema>, Box<Schema>),
    Record {
        key: Box<Schema>,
        value: Box<Schema>,
    },
    Map {
        key: Box<Schema>,
        value: Box<Schema>,
    },
    Set {
        value: Box<Schema>,
        bounds: SizeBounds,
    },
    /// `args` is a tuple schema with an `unknown` rest
    Function {
        args: Arc<Schema>,
        returns: Arc<Schema>,
    },
    Promise(Box<Schema>),
    Optional(Box<Schema>),
    Nullable(Box<Schema>),
    Default(Box<Schema>, Value),
    Catch(Box<Schema>, Value),
    Transform(Box<Schema>, Expression),
    Refine(Box<Schema>, Expression, Message),
    Branded(Box<Schema>, String),
    Readonly(Box<Schema>),
    Described(Box<Schema>, String),
}

/// Outcome of parsing one node
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Valid(Value),
    Dirty(Value),
    Aborted,
}

impl Status {
    fn checked(value: Value, failed: bool) -> Self {
        if failed {
            Status::Dirty(value)
        } else {
            Status::Valid(value)
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Status::Valid(_))
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, Status::Aborted)
    }

    fn is_dirty(&self) -> bool {
        matches!(self, Status::Dirty(_))
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Status::Valid(value) | Status::Dirty(value) => Some(value),
            Status::Aborted => None,
        }
    }
}

fn abort(issues: &mut ValidationIssues, issue: Issue) -> Status {
    issues.add(issue);
    Status::Aborted
}

/// Values joined the way error messages list them: `'a' | 'b' | 1`
fn join_values(values: impl IntoIterator<Item = Value>) -> String {
    values
        .into_iter()
        .map(|value| match value {
            Value::String(s) => format!("'{}'", s),
            other => other.to_js_string(),
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Combine the outputs of both sides of an intersection
pub fn merge_values(a: Value, b: Value) -> Option<Value> {
    if a.strict_equals(&b) {
        return Some(a);
    }
    match (a, b) {
        (Value::Object(mut left), Value::Object(right)) => {
            for (key, right_value) in right {
                let merged = match left.remove(&key) {
                    Some(left_value) => merge_values(left_value, right_value)?,
                    None => right_value,
                };
                left.insert(key, merged);
            }
            Some(Value::Object(left))
        }
        (Value::Array(left), Value::Array(right)) if left.len() == right.len() => left
            .into_iter()
            .zip(right)
            .map(|(l, r)| merge_values(l, r))
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        (Value::Date(left), Value::Date(right)) if left == right => Some(Value::Date(left)),
        _ => None,
    }
}

/// Fold child outcomes into one; any abort wins over dirty
struct Merge {
    aborted: bool,
    dirty: bool,
}

impl Merge {
    fn new(dirty: bool) -> Self {
        Self {
            aborted: false,
            dirty,
        }
    }

    fn take(&mut self, status: Status) -> Value {
        match status {
            Status::Valid(value) => value,
            Status::Dirty(value) => {
                self.dirty = true;
                value
            }
            Status::Aborted => {
                self.aborted = true;
                Value::Undefined
            }
        }
    }

    fn finish(self, value: Value) -> Status {
        if self.aborted {
            Status::Aborted
        } else {
            Status::checked(value, self.dirty)
        }
    }
}

impl Schema {
    /// Parse `input`, reporting issues against `ctx`
    pub fn run(&self, input: Value, ctx: &ParseContext, issues: &mut ValidationIssues) -> Status {
        match self {
            Schema::String { coerce, checks } => {
                let input = if *coerce {
                    Value::String(input.to_js_string())
                } else {
                    input
                };
                match input {
                    Value::String(s) => {
                        let (out, failed) = run_string(checks, s, ctx, issues);
                        Status::checked(Value::String(out), failed)
                    }
                    other => abort(issues, ctx.invalid_type("string", other.parsed_type())),
                }
            }
            Schema::Number { coerce, checks } => {
                let received = input.parsed_type();
                let input = if *coerce {
                    match input.to_number() {
                        Some(n) => Value::Number(n),
                        None => return abort(issues, ctx.invalid_type("number", received)),
                    }
                } else {
                    input
                };
                match input {
                    Value::Number(n) if !n.is_nan() => {
                        let failed = run_number(checks, n, ctx, issues);
                        Status::checked(Value::Number(n), failed)
                    }
                    other => abort(issues, ctx.invalid_type("number", other.parsed_type())),
                }
            }
            Schema::BigInt { coerce, checks } => {
                let received = input.parsed_type();
                let input = if *coerce {
                    match input.to_bigint() {
                        Some(n) => Value::BigInt(n),
                        None => return abort(issues, ctx.invalid_type("bigint", received)),
                    }
                } else {
                    input
                };
                match input {
                    Value::BigInt(n) => {
                        let failed = run_bigint(checks, n, ctx, issues);
                        Status::checked(Value::BigInt(n), failed)
                    }
                    other => abort(issues, ctx.invalid_type("bigint", other.parsed_type())),
                }
            }
            Schema::Boolean { coerce } => {
                let input = if *coerce {
                    Value::Bool(input.truthy())
                } else {
                    input
                };
                match input {
                    Value::Bool(b) => Status::Valid(Value::Bool(b)),
                    other => abort(issues, ctx.invalid_type("boolean", other.parsed_type())),
                }
            }
            Schema::Date { coerce, checks } => {
                let received = input.parsed_type();
                let input = if *coerce {
                    match input.to_date() {
                        Some(ms) => Value::Date(ms),
                        None => return abort(issues, ctx.invalid_type("date", received)),
                    }
                } else {
                    input
                };
                match input {
                    Value::Date(ms) if ms.is_nan() => {
                        abort(issues, ctx.issue(IssueCode::InvalidDate, "Invalid date"))
                    }
                    Value::Date(ms) => {
                        let failed = run_date(checks, ms, ctx, issues);
                        Status::checked(Value::Date(ms), failed)
                    }
                    other => abort(issues, ctx.invalid_type("date", other.parsed_type())),
                }
            }
            Schema::Symbol => match input {
                Value::Symbol(_) => Status::Valid(input),
                other => abort(issues, ctx.invalid_type("symbol", other.parsed_type())),
            },
            Schema::Undefined => match input {
                Value::Undefined => Status::Valid(input),
                other => abort(issues, ctx.invalid_type("undefined", other.parsed_type())),
            },
            Schema::Null => match input {
                Value::Null => Status::Valid(input),
                other => abort(issues, ctx.invalid_type("null", other.parsed_type())),
            },
            Schema::Void => match input {
                Value::Undefined => Status::Valid(input),
                other => abort(issues, ctx.invalid_type("void", other.parsed_type())),
            },
            Schema::Any | Schema::Unknown => Status::Valid(input),
            Schema::Never => abort(issues, ctx.invalid_type("never", input.parsed_type())),
            Schema::NaN => match input {
                Value::Number(n) if n.is_nan() => Status::Valid(input),
                other => abort(issues, ctx.invalid_type("nan", other.parsed_type())),
            },
            Schema::Literal(expected) => {
                if input.strict_equals(expected) {
                    Status::Valid(input)
                } else {
                    let mut issue = ctx.issue(
                        IssueCode::InvalidLiteral,
                        format!("Invalid literal value, expected {}", expected),
                    );
                    issue.expected = Some(expected.to_string());
                    issue.received = Some(input.to_string());
                    abort(issues, issue)
                }
            }
            Schema::Enum(members) => {
                let expected = || join_values(members.iter().map(|m| Value::from(m.as_str())));
                match &input {
                    Value::String(s) if members.contains(s) => Status::Valid(input),
                    Value::String(s) => abort(
                        issues,
                        ctx.issue(
                            IssueCode::InvalidEnumValue,
                            format!("Invalid enum value. Expected {}, received '{}'", expected(), s),
                        ),
                    ),
                    other => abort(issues, ctx.invalid_type(expected(), other.parsed_type())),
                }
            }
            Schema::NativeEnum(values) => {
                let expected = || join_values(values.iter().cloned());
                match &input {
                    Value::String(_) | Value::Number(_) => {
                        if values.iter().any(|v| v.strict_equals(&input)) {
                            Status::Valid(input)
                        } else {
                            let received = join_values([input.clone()]);
                            abort(
                                issues,
                                ctx.issue(
                                    IssueCode::InvalidEnumValue,
                                    format!("Invalid enum value. Expected {}, received {}", expected(), received),
                                ),
                            )
                        }
                    }
                    other => abort(issues, ctx.invalid_type(expected(), other.parsed_type())),
                }
            }
            Schema::Object {
                fields,
                unknown_keys,
            } => match input {
                Value::Object(map) => parse_object(fields, unknown_keys, map, ctx, issues),
                other => abort(issues, ctx.invalid_type("object", other.parsed_type())),
            },
            Schema::Array { element, bounds } => match input {
                Value::Array(items) => {
                    let mut merge = Merge::new(bounds.check(items.len(), "Array", ctx, issues));
                    let out = items
                        .into_iter()
                        .enumerate()
                        .map(|(i, item)| merge.take(element.run(item, &ctx.child_index(i), issues)))
                        .collect();
                    merge.finish(Value::Array(out))
                }
                other => abort(issues, ctx.invalid_type("array", other.parsed_type())),
            },
            Schema::Tuple { items, rest } => match input {
                Value::Array(values) => parse_tuple(items, rest.as_deref(), values, ctx, issues),
                other => abort(issues, ctx.invalid_type("array", other.parsed_type())),
            },
            Schema::Union(members) => parse_union(members, input, ctx, issues),
            Schema::DiscriminatedUnion {
                discriminator,
                cases,
            } => {
                let tag = match &input {
                    Value::Object(map) => map.get(discriminator).cloned().unwrap_or_default(),
                    other => return abort(issues, ctx.invalid_type("object", other.parsed_type())),
                };
                match cases.iter().find(|(value, _)| value.strict_equals(&tag)) {
                    Some((_, schema)) => schema.run(input, ctx, issues),
                    None => {
                        let expected = join_values(cases.iter().map(|(value, _)| value.clone()));
                        abort(
                            issues,
                            ctx.child(discriminator).issue(
                                IssueCode::InvalidUnionDiscriminator,
                                format!("Invalid discriminator value. Expected {}", expected),
                            ),
                        )
                    }
                }
            }
            Schema::Intersection(left, right) => {
                let left = left.run(input.clone(), ctx, issues);
                let right = right.run(input, ctx, issues);
                let dirty = left.is_dirty() || right.is_dirty();
                match (left.into_value(), right.into_value()) {
                    (Some(l), Some(r)) => match merge_values(l, r) {
                        Some(merged) => Status::checked(merged, dirty),
                        None => abort(
                            issues,
                            ctx.issue(
                                IssueCode::InvalidIntersectionTypes,
                                "Intersection results could not be merged",
                            ),
                        ),
                    },
                    _ => Status::Aborted,
                }
            }
            Schema::Record { key, value } => match input {
                Value::Object(map) => {
                    let mut merge = Merge::new(false);
                    let mut out = Object::new();
                    for (k, v) in map {
                        let child = ctx.child(&k);
                        let parsed_key = merge.take(key.run(Value::String(k.clone()), &child, issues));
                        let parsed_value = merge.take(value.run(v, &child, issues));
                        let parsed_key = parsed_key.to_js_string();
                        if parsed_key != "__proto__" {
                            out.insert(parsed_key, parsed_value);
                        }
                    }
                    merge.finish(Value::Object(out))
                }
                other => abort(issues, ctx.invalid_type("object", other.parsed_type())),
            },
            Schema::Map { key, value } => match input {
                Value::Map(entries) => {
                    let mut merge = Merge::new(false);
                    let mut out = Vec::with_capacity(entries.len());
                    for (i, (k, v)) in entries.into_iter().enumerate() {
                        let entry = ctx.child_index(i);
                        let k = merge.take(key.run(k, &entry.child("key"), issues));
                        let v = merge.take(value.run(v, &entry.child("value"), issues));
                        out.push((k, v));
                    }
                    merge.finish(Value::Map(out))
                }
                other => abort(issues, ctx.invalid_type("map", other.parsed_type())),
            },
            Schema::Set { value, bounds } => match input {
                Value::Set(items) => {
                    let mut merge = Merge::new(bounds.check(items.len(), "Set", ctx, issues));
                    let out = items
                        .into_iter()
                        .enumerate()
                        .map(|(i, item)| merge.take(value.run(item, &ctx.child_index(i), issues)))
                        .collect();
                    merge.finish(Value::Set(out))
                }
                other => abort(issues, ctx.invalid_type("set", other.parsed_type())),
            },
            Schema::Function { args, returns } => match input {
                Value::Function(inner) => Status::Valid(Value::Function(guard_function(
                    inner,
                    Arc::clone(args),
                    Arc::clone(returns),
                ))),
                other => abort(issues, ctx.invalid_type("function", other.parsed_type())),
            },
            Schema::Promise(inner) => match input {
                Value::Promise(state) => match *state {
                    PromiseState::Resolved(value) => {
                        let mut inner_issues = ValidationIssues::new();
                        let settled = match inner.run(value, ctx, &mut inner_issues) {
                            Status::Valid(out) if inner_issues.is_empty() => PromiseState::Resolved(out),
                            _ => PromiseState::Rejected(inner_issues.to_string()),
                        };
                        Status::Valid(Value::Promise(Box::new(settled)))
                    }
                    rejected @ PromiseState::Rejected(_) => Status::Valid(Value::Promise(Box::new(rejected))),
                },
                other => abort(issues, ctx.invalid_type("promise", other.parsed_type())),
            },
            Schema::Optional(inner) => match input {
                Value::Undefined => Status::Valid(input),
                other => inner.run(other, ctx, issues),
            },
            Schema::Nullable(inner) => match input {
                Value::Null => Status::Valid(input),
                other => inner.run(other, ctx, issues),
            },
            Schema::Default(inner, fallback) => {
                let input = if input.is_undefined() {
                    fallback.clone()
                } else {
                    input
                };
                inner.run(input, ctx, issues)
            }
            Schema::Catch(inner, fallback) => {
                let mut discarded = ValidationIssues::new();
                match inner.run(input, ctx, &mut discarded) {
                    Status::Valid(value) => Status::Valid(value),
                    _ => Status::Valid(fallback.clone()),
                }
            }
            Schema::Transform(inner, expression) => match inner.run(input, ctx, issues) {
                Status::Valid(value) => match expression.evaluate(&value) {
                    Ok(out) => Status::Valid(out),
                    Err(err) => abort(issues, ctx.issue(IssueCode::Custom, err.to_string())),
                },
                other => other,
            },
            Schema::Refine(inner, expression, message) => {
                let status = inner.run(input, ctx, issues);
                let dirty = status.is_dirty();
                let Some(value) = status.into_value() else {
                    return Status::Aborted;
                };
                let failure = match expression.evaluate(&value) {
                    Ok(result) if result.truthy() => None,
                    Ok(_) => Some(message.clone().unwrap_or_else(|| "Invalid input".to_string())),
                    Err(err) => Some(message.clone().unwrap_or_else(|| err.to_string())),
                };
                match failure {
                    Some(text) => {
                        issues.add(ctx.issue(IssueCode::Custom, text));
                        Status::Dirty(value)
                    }
                    None => Status::checked(value, dirty),
                }
            }
            Schema::Branded(inner, _) | Schema::Readonly(inner) | Schema::Described(inner, _) => {
                inner.run(input, ctx, issues)
            }
        }
    }

    /// Description attached to the outermost node
    pub fn description(&self) -> Option<&str> {
        match self {
            Schema::Described(_, description) => Some(description),
            _ => None,
        }
    }

    /// Number of nodes in this tree
    pub fn size(&self) -> usize {
        let children: usize = match self {
            Schema::Object {
                fields,
                unknown_keys,
            } => {
                fields.iter().map(|(_, s)| s.size()).sum::<usize>()
                    + match unknown_keys {
                        UnknownKeyPolicy::Catchall(s) => s.size(),
                        _ => 0,
                    }
            }
            Schema::Tuple { items, rest } => {
                items.iter().map(Schema::size).sum::<usize>() + rest.as_ref().map_or(0, |r| r.size())
            }
            Schema::Union(members) => members.iter().map(Schema::size).sum(),
            Schema::DiscriminatedUnion { cases, .. } => cases.iter().map(|(_, s)| s.size()).sum(),
            Schema::Intersection(a, b) | Schema::Record { key: a, value: b } | Schema::Map { key: a, value: b } => {
                a.size() + b.size()
            }
            Schema::Function { args, returns } => args.size() + returns.size(),
            Schema::Array { element: inner, .. }
            | Schema::Set { value: inner, .. }
            | Schema::Promise(inner)
            | Schema::Optional(inner)
            | Schema::Nullable(inner)
            | Schema::Default(inner, _)
            | Schema::Catch(inner, _)
            | Schema::Transform(inner, _)
            | Schema::Refine(inner, _, _)
            | Schema::Branded(inner, _)
            | Schema::Readonly(inner)
            | Schema::Described(inner, _) => inner.size(),
            _ => 0,
        };
        1 + children
    }
}

fn parse_object(
    fields: &[(String, Schema)],
    unknown_keys: &UnknownKeyPolicy,
    mut input: Object,
    ctx: &ParseContext,
    issues: &mut ValidationIssues,
) -> Status {
    fn keep(out: &mut Object, key: String, value: Value, present: bool) {
        if key != "__proto__" && (present || !value.is_undefined()) {
            out.insert(key, value);
        }
    }
    let mut merge = Merge::new(false);
    let mut out = Object::new();
    for (key, schema) in fields {
        let present = input.contains_key(key);
        let value = input.remove(key).unwrap_or_default();
        let parsed = merge.take(schema.run(value, &ctx.child(key), issues));
        keep(&mut out, key.clone(), parsed, present);
    }
    match unknown_keys {
        UnknownKeyPolicy::Strip => {}
        UnknownKeyPolicy::Passthrough => {
            for (key, value) in input {
                keep(&mut out, key, value, true);
            }
        }
        UnknownKeyPolicy::Strict => {
            if !input.is_empty() {
                let keys = input.keys().map(|k| format!("'{}'", k)).collect::<Vec<_>>().join(", ");
                issues.add(ctx.issue(
                    IssueCode::UnrecognizedKeys,
                    format!("Unrecognized key(s) in object: {}", keys),
                ));
                merge.dirty = true;
            }
        }
        UnknownKeyPolicy::Catchall(schema) => {
            for (key, value) in input {
                let parsed = merge.take(schema.run(value, &ctx.child(&key), issues));
                keep(&mut out, key, parsed, true);
            }
        }
    }
    merge.finish(Value::Object(out))
}

fn parse_tuple(
    items: &[Schema],
    rest: Option<&Schema>,
    values: Vec<Value>,
    ctx: &ParseContext,
    issues: &mut ValidationIssues,
) -> Status {
    if values.len() < items.len() {
        return abort(
            issues,
            ctx.issue(
                IssueCode::TooSmall,
                format!("Array must contain at least {} element(s)", items.len()),
            ),
        );
    }
    let mut merge = Merge::new(false);
    if rest.is_none() && values.len() > items.len() {
        issues.add(ctx.issue(
            IssueCode::TooBig,
            format!("Array must contain at most {} element(s)", items.len()),
        ));
        merge.dirty = true;
    }
    let mut out = Vec::with_capacity(values.len());
    for (i, value) in values.into_iter().enumerate() {
        let Some(schema) = items.get(i).or(rest) else {
            break;
        };
        out.push(merge.take(schema.run(value, &ctx.child_index(i), issues)));
    }
    merge.finish(Value::Array(out))
}

fn parse_union(members: &[Schema], input: Value, ctx: &ParseContext, issues: &mut ValidationIssues) -> Status {
    let mut first_dirty: Option<(Status, ValidationIssues)> = None;
    for member in members {
        let mut member_issues = ValidationIssues::new();
        let status = member.run(input.clone(), ctx, &mut member_issues);
        if status.is_valid() && member_issues.is_empty() {
            return status;
        }
        if status.is_dirty() && first_dirty.is_none() {
            first_dirty = Some((status, member_issues));
        }
    }
    match first_dirty {
        Some((status, member_issues)) => {
            issues.extend(member_issues);
            status
        }
        None => abort(issues, ctx.issue(IssueCode::InvalidUnion, "Invalid input")),
    }
}

/// Wrap a function so each call validates its arguments and return value
fn guard_function(inner: FunctionValue, args: Arc<Schema>, returns: Arc<Schema>) -> FunctionValue {
    let name = inner.name().to_string();
    let arity = inner.arity();
    FunctionValue::new(name, arity, move |call_args| {
        let mut arg_issues = ValidationIssues::new();
        let parsed = args.run(Value::Array(call_args.to_vec()), &ParseContext::root(), &mut arg_issues);
        let parsed_args = match parsed {
            Status::Valid(Value::Array(values)) if arg_issues.is_empty() => values,
            _ => return Err(format!("{}: {}", IssueCode::InvalidArguments, arg_issues)),
        };
        let out = inner.call(&parsed_args)?;
        let mut return_issues = ValidationIssues::new();
        match returns.run(out, &ParseContext::root(), &mut return_issues) {
            Status::Valid(value) if return_issues.is_empty() => Ok(value),
            _ => Err(format!("{}: {}", IssueCode::InvalidReturnType, return_issues)),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::parse_expression;
    use crate::value::format_number;

    fn run(schema: &Schema, input: Value) -> (Status, ValidationIssues) {
        let mut issues = ValidationIssues::new();
        let status = schema.run(input, &ParseContext::root(), &mut issues);
        (status, issues)
    }

    fn string() -> Schema {
        Schema::String {
            coerce: false,
            checks: vec![],
        }
    }

    fn number() -> Schema {
        Schema::Number {
            coerce: false,
            checks: vec![],
        }
    }

    #[test]
    fn test_object_keeps_present_undefined_keys() {
        let schema = Schema::Object {
            fields: vec![
                ("a".into(), Schema::Optional(Box::new(string()))),
                ("b".into(), Schema::Optional(Box::new(string()))),
            ],
            unknown_keys: UnknownKeyPolicy::Strip,
        };
        let (status, issues) = run(&schema, Value::object([("a", Value::Undefined), ("x", Value::from(1))]));
        assert!(issues.is_empty());
        let value = status.into_value().unwrap();
        let map = value.as_object().unwrap();
        assert!(map.contains_key("a"));
        assert!(!map.contains_key("b"));
        assert!(!map.contains_key("x"));
    }

    #[test]
    fn test_strict_object_reports_unknown_keys() {
        let schema = Schema::Object {
            fields: vec![("a".into(), string())],
            unknown_keys: UnknownKeyPolicy::Strict,
        };
        let (status, issues) = run(&schema, Value::object([("a", Value::from("x")), ("z", Value::Null)]));
        assert!(matches!(status, Status::Dirty(_)));
        assert_eq!(issues.issues[0].code, IssueCode::UnrecognizedKeys);
        assert_eq!(issues.issues[0].message, "Unrecognized key(s) in object: 'z'");
    }

    #[test]
    fn test_nested_paths() {
        let schema = Schema::Object {
            fields: vec![(
                "items".into(),
                Schema::Array {
                    element: Box::new(Schema::Object {
                        fields: vec![("name".into(), string())],
                        unknown_keys: UnknownKeyPolicy::Strip,
                    }),
                    bounds: SizeBounds::default(),
                },
            )],
            unknown_keys: UnknownKeyPolicy::Strip,
        };
        let input = Value::object([(
            "items",
            Value::Array(vec![Value::object([("name", Value::from(3))])]),
        )]);
        let (status, issues) = run(&schema, input);
        assert!(status.is_aborted());
        assert_eq!(issues.issues[0].path, "$.items[0].name");
    }

    #[test]
    fn test_union_first_success_wins() {
        let schema = Schema::Union(vec![
            Schema::String {
                coerce: true,
                checks: vec![],
            },
            number(),
        ]);
        let (status, _) = run(&schema, Value::from(5));
        assert_eq!(status, Status::Valid(Value::from("5")));
        let (status, issues) = run(&Schema::Union(vec![string(), number()]), Value::Null);
        assert!(status.is_aborted());
        assert_eq!(issues.issues[0].code, IssueCode::InvalidUnion);
    }

    #[test]
    fn test_tuple_lengths() {
        let schema = Schema::Tuple {
            items: vec![string(), number()],
            rest: None,
        };
        let (status, issues) = run(&schema, Value::Array(vec![Value::from("a")]));
        assert!(status.is_aborted());
        assert_eq!(issues.issues[0].code, IssueCode::TooSmall);

        let (status, issues) = run(
            &schema,
            Value::Array(vec![Value::from("a"), Value::from(1), Value::from(2)]),
        );
        assert!(matches!(status, Status::Dirty(_)));
        assert_eq!(issues.issues[0].code, IssueCode::TooBig);
    }

    #[test]
    fn test_intersection_merges_objects() {
        let left = Schema::Object {
            fields: vec![("a".into(), string())],
            unknown_keys: UnknownKeyPolicy::Strip,
        };
        let right = Schema::Object {
            fields: vec![("b".into(), number())],
            unknown_keys: UnknownKeyPolicy::Strip,
        };
        let schema = Schema::Intersection(Box::new(left), Box::new(right));
        let (status, issues) = run(&schema, Value::object([("a", Value::from("x")), ("b", Value::from(1))]));
        assert!(issues.is_empty());
        let value = status.into_value().unwrap();
        assert_eq!(value.get("a"), Some(&Value::from("x")));
        assert_eq!(value.get("b"), Some(&Value::from(1)));

        let conflict = Schema::Intersection(
            Box::new(Schema::Literal(Value::from(1))),
            Box::new(Schema::Number {
                coerce: true,
                checks: vec![],
            }),
        );
        assert!(run(&conflict, Value::from(1)).0.is_valid());
        assert!(merge_values(Value::from(1), Value::from(2)).is_none());
    }

    #[test]
    fn test_refine_runs_on_dirty_values() {
        let schema = Schema::Refine(
            Box::new(Schema::String {
                coerce: false,
                checks: vec![StringCheck::Min(5.0, None)],
            }),
            parse_expression("(s) => s !== 'ab'").unwrap(),
            Some("no ab".into()),
        );
        let (status, issues) = run(&schema, Value::from("ab"));
        assert!(matches!(status, Status::Dirty(_)));
        assert_eq!(issues.len(), 2);
        assert_eq!(issues.issues[1].message, "no ab");
    }

    #[test]
    fn test_transform_errors_become_issues() {
        let schema = Schema::Transform(Box::new(Schema::Any), parse_expression("(v) => v.x.y").unwrap());
        let (status, issues) = run(&schema, Value::Undefined);
        assert!(status.is_aborted());
        assert_eq!(issues.issues[0].code, IssueCode::Custom);
    }

    #[test]
    fn test_catch_substitutes_and_hides_issues() {
        let schema = Schema::Catch(Box::new(number()), Value::from(0));
        let (status, issues) = run(&schema, Value::from("x"));
        assert_eq!(status, Status::Valid(Value::from(0)));
        assert!(issues.is_empty());
    }

    #[test]
    fn test_discriminator_mismatch() {
        let case = Schema::Object {
            fields: vec![("type".into(), Schema::Literal(Value::from("a")))],
            unknown_keys: UnknownKeyPolicy::Strip,
        };
        let schema = Schema::DiscriminatedUnion {
            discriminator: "type".into(),
            cases: vec![(Value::from("a"), case)],
        };
        let (status, issues) = run(&schema, Value::object([("type", Value::from("b"))]));
        assert!(status.is_aborted());
        assert_eq!(issues.issues[0].path, "$.type");
        assert_eq!(issues.issues[0].message, "Invalid discriminator value. Expected 'a'");
    }

    #[test]
    fn test_guarded_function() {
        let schema = Schema::Function {
            args: Arc::new(Schema::Tuple {
                items: vec![number()],
                rest: Some(Box::new(Schema::Unknown)),
            }),
            returns: Arc::new(string()),
        };
        let double = FunctionValue::new("double", 1, |args| match args.first() {
            Some(Value::Number(n)) => Ok(Value::String(format_number(n * 2.0))),
            _ => Ok(Value::Undefined),
        });
        let (status, _) = run(&schema, Value::Function(double));
        let Some(Value::Function(guarded)) = status.into_value() else {
            panic!("expected a function");
        };
        assert_eq!(guarded.call(&[Value::from(2)]).unwrap(), Value::from("4"));
        assert!(guarded.call(&[]).unwrap_err().starts_with("invalid_arguments"));
        assert!(guarded.call(&[Value::from("x")]).unwrap_err().starts_with("invalid_arguments"));
    }
}
