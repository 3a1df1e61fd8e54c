//! Expression evaluation with JavaScript semantics
//!
//! Copyright (c) 2025 Fieldsmith Team
//! Licensed under the Apache-2.0 license

use super::ast::*;
use crate::value::{
    format_number, js_trim, js_trim_end, js_trim_start, string_to_number, Value, MAX_SAFE_INTEGER,
    MIN_SAFE_INTEGER,
};
use std::cmp::Ordering;
use thiserror::Error;

/// A thrown exception during evaluation
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind}: {message}")]
pub struct EvalError {
    pub kind: &'static str,
    pub message: String,
}

impl EvalError {
    fn type_error(message: impl Into<String>) -> Self {
        Self {
            kind: "TypeError",
            message: message.into(),
        }
    }

    fn range_error(message: impl Into<String>) -> Self {
        Self {
            kind: "RangeError",
            message: message.into(),
        }
    }
}

type EvalResult = std::result::Result<Value, EvalError>;

impl Expression {
    /// Call the arrow function with `arg`
    pub fn evaluate(&self, arg: &Value) -> EvalResult {
        eval(&self.body, arg)
    }
}

fn eval(expr: &Expr, arg: &Value) -> EvalResult {
    match expr {
        Expr::Undefined => Ok(Value::Undefined),
        Expr::Null => Ok(Value::Null),
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::String(s) => Ok(Value::String(s.clone())),
        Expr::Param => Ok(arg.clone()),
        Expr::Global(Global::NaN) => Ok(Value::Number(f64::NAN)),
        Expr::Global(Global::Infinity) => Ok(Value::Number(f64::INFINITY)),
        Expr::Global(global) => Err(EvalError::type_error(format!(
            "{} cannot be used as a value",
            global.name()
        ))),
        Expr::Array(items) => items
            .iter()
            .map(|item| eval(item, arg))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Expr::Member { object, property } => {
            if let Expr::Global(global) = object.as_ref() {
                return global_property(*global, property);
            }
            let target = eval(object, arg)?;
            get_property(&target, property)
        }
        Expr::Index { object, index } => {
            let target = eval(object, arg)?;
            let key = eval(index, arg)?;
            get_index(&target, &key)
        }
        Expr::Call { callee, args } => {
            let args = args
                .iter()
                .map(|a| eval(a, arg))
                .collect::<Result<Vec<_>, _>>()?;
            match callee.as_ref() {
                Expr::Member { object, property } => {
                    if let Expr::Global(global) = object.as_ref() {
                        return call_static(*global, property, &args);
                    }
                    let target = eval(object, arg)?;
                    call_method(&target, property, &args)
                }
                Expr::Global(global) => call_global(*global, &args),
                other => {
                    let value = eval(other, arg)?;
                    match value {
                        Value::Function(func) => func.call(&args).map_err(EvalError::type_error),
                        _ => Err(EvalError::type_error("value is not a function")),
                    }
                }
            }
        }
        Expr::Unary { op, operand } => {
            let value = eval(operand, arg)?;
            unary(*op, &value)
        }
        Expr::Binary { op, left, right } => {
            let l = eval(left, arg)?;
            let r = eval(right, arg)?;
            binary(*op, &l, &r)
        }
        Expr::Logical { op, left, right } => {
            let l = eval(left, arg)?;
            let short_circuit = match op {
                LogicalOp::And => !l.truthy(),
                LogicalOp::Or => l.truthy(),
                LogicalOp::Nullish => !matches!(l, Value::Undefined | Value::Null),
            };
            if short_circuit {
                Ok(l)
            } else {
                eval(right, arg)
            }
        }
        Expr::Conditional {
            test,
            consequent,
            alternate,
        } => {
            if eval(test, arg)?.truthy() {
                eval(consequent, arg)
            } else {
                eval(alternate, arg)
            }
        }
    }
}

fn to_number(value: &Value) -> Result<f64, EvalError> {
    value
        .to_number()
        .ok_or_else(|| EvalError::type_error("Cannot convert a Symbol value to a number"))
}

/// UTF-16 code units, the unit of `length` and string indices
fn utf16(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

fn from_utf16(units: &[u16]) -> String {
    String::from_utf16_lossy(units)
}

/// Clamp a relative index the way `slice` does
fn relative_index(index: f64, len: usize) -> usize {
    let len_f = len as f64;
    let index = if index.is_nan() { 0.0 } else { index.trunc() };
    if index < 0.0 {
        (len_f + index).max(0.0) as usize
    } else {
        index.min(len_f) as usize
    }
}

fn arg_or_undefined(args: &[Value], i: usize) -> &Value {
    args.get(i).unwrap_or(&Value::Undefined)
}

fn nullish_error(value: &Value, property: &str) -> EvalError {
    EvalError::type_error(format!(
        "Cannot read properties of {} (reading '{}')",
        value.to_js_string(),
        property
    ))
}

fn get_property(target: &Value, property: &str) -> EvalResult {
    match (target, property) {
        (Value::Undefined | Value::Null, _) => Err(nullish_error(target, property)),
        (Value::String(s), "length") => Ok(Value::Number(s.encode_utf16().count() as f64)),
        (Value::Array(items), "length") => Ok(Value::Number(items.len() as f64)),
        (Value::Map(entries), "size") => Ok(Value::Number(entries.len() as f64)),
        (Value::Set(items), "size") => Ok(Value::Number(items.len() as f64)),
        (Value::Function(func), "length") => Ok(Value::Number(func.arity() as f64)),
        (Value::Object(map), key) => Ok(map.get(key).cloned().unwrap_or(Value::Undefined)),
        _ => Ok(Value::Undefined),
    }
}

fn get_index(target: &Value, key: &Value) -> EvalResult {
    match (target, key) {
        (Value::Undefined | Value::Null, _) => Err(nullish_error(target, &key.to_js_string())),
        (Value::Array(items), Value::Number(n)) if n.fract() == 0.0 && *n >= 0.0 => {
            Ok(items.get(*n as usize).cloned().unwrap_or(Value::Undefined))
        }
        (Value::String(s), Value::Number(n)) if n.fract() == 0.0 && *n >= 0.0 => {
            let units = utf16(s);
            Ok(units
                .get(*n as usize)
                .map(|u| Value::String(from_utf16(&[*u])))
                .unwrap_or(Value::Undefined))
        }
        _ => get_property(target, &key.to_js_string()),
    }
}

fn global_property(global: Global, property: &str) -> EvalResult {
    let value = match (global, property) {
        (Global::Math, "PI") => std::f64::consts::PI,
        (Global::Math, "E") => std::f64::consts::E,
        (Global::Number, "MAX_SAFE_INTEGER") => MAX_SAFE_INTEGER,
        (Global::Number, "MIN_SAFE_INTEGER") => MIN_SAFE_INTEGER,
        (Global::Number, "EPSILON") => f64::EPSILON,
        (Global::Number, "MAX_VALUE") => f64::MAX,
        (Global::Number, "POSITIVE_INFINITY") => f64::INFINITY,
        (Global::Number, "NEGATIVE_INFINITY") => f64::NEG_INFINITY,
        (Global::Number, "NaN") => f64::NAN,
        _ => return Ok(Value::Undefined),
    };
    Ok(Value::Number(value))
}

fn call_global(global: Global, args: &[Value]) -> EvalResult {
    let first = arg_or_undefined(args, 0);
    match global {
        Global::Number => {
            if args.is_empty() {
                Ok(Value::Number(0.0))
            } else {
                to_number(first).map(Value::Number)
            }
        }
        Global::String => {
            if args.is_empty() {
                Ok(Value::String(String::new()))
            } else {
                Ok(Value::String(first.to_js_string()))
            }
        }
        Global::Boolean => Ok(Value::Bool(first.truthy())),
        Global::ParseInt => {
            let radix = args.get(1).map(to_number).transpose()?.unwrap_or(0.0);
            Ok(Value::Number(parse_int(&first.to_js_string(), radix as u32)))
        }
        Global::ParseFloat => Ok(Value::Number(parse_float(&first.to_js_string()))),
        Global::IsNaN => Ok(Value::Bool(to_number(first)?.is_nan())),
        Global::IsFinite => Ok(Value::Bool(to_number(first)?.is_finite())),
        other => Err(EvalError::type_error(format!("{} is not a function", other.name()))),
    }
}

fn call_static(global: Global, method: &str, args: &[Value]) -> EvalResult {
    let first = arg_or_undefined(args, 0);
    match (global, method) {
        (Global::Math, "min" | "max") => {
            let numbers = args.iter().map(to_number).collect::<Result<Vec<_>, _>>()?;
            let is_max = method == "max";
            let init = if is_max { f64::NEG_INFINITY } else { f64::INFINITY };
            let result = numbers.into_iter().try_fold(init, |acc, n| {
                if n.is_nan() {
                    None
                } else if is_max {
                    Some(acc.max(n))
                } else {
                    Some(acc.min(n))
                }
            });
            Ok(Value::Number(result.unwrap_or(f64::NAN)))
        }
        (Global::Math, "pow") => {
            let base = to_number(first)?;
            let exp = to_number(arg_or_undefined(args, 1))?;
            Ok(Value::Number(base.powf(exp)))
        }
        (Global::Math, name) => {
            let n = to_number(first)?;
            let result = match name {
                "abs" => n.abs(),
                "floor" => n.floor(),
                "ceil" => n.ceil(),
                // Math.round rounds half up, unlike f64::round
                "round" => (n + 0.5).floor(),
                "trunc" => n.trunc(),
                "sign" => {
                    if n.is_nan() || n == 0.0 {
                        n
                    } else {
                        n.signum()
                    }
                }
                "sqrt" => n.sqrt(),
                "cbrt" => n.cbrt(),
                "log" => n.ln(),
                "log10" => n.log10(),
                "log2" => n.log2(),
                "exp" => n.exp(),
                _ => return Err(EvalError::type_error(format!("Math.{} is not a function", name))),
            };
            Ok(Value::Number(result))
        }
        (Global::Number, "isInteger") => Ok(Value::Bool(matches!(first, Value::Number(n) if n.is_finite() && n.fract() == 0.0))),
        (Global::Number, "isSafeInteger") => Ok(Value::Bool(matches!(
            first,
            Value::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER
        ))),
        (Global::Number, "isFinite") => Ok(Value::Bool(matches!(first, Value::Number(n) if n.is_finite()))),
        (Global::Number, "isNaN") => Ok(Value::Bool(matches!(first, Value::Number(n) if n.is_nan()))),
        (Global::Number, "parseFloat") => call_global(Global::ParseFloat, args),
        (Global::Number, "parseInt") => call_global(Global::ParseInt, args),
        (Global::Array, "isArray") => Ok(Value::Bool(matches!(first, Value::Array(_)))),
        (Global::Object, "keys" | "values") => match first {
            Value::Object(map) => Ok(Value::Array(if method == "keys" {
                map.keys().cloned().map(Value::String).collect()
            } else {
                map.values().cloned().collect()
            })),
            Value::Undefined | Value::Null => Err(EvalError::type_error(
                "Cannot convert undefined or null to object",
            )),
            _ => Ok(Value::Array(Vec::new())),
        },
        (global, name) => Err(EvalError::type_error(format!(
            "{}.{} is not a function",
            global.name(),
            name
        ))),
    }
}

fn call_method(target: &Value, method: &str, args: &[Value]) -> EvalResult {
    match target {
        Value::Undefined | Value::Null => Err(nullish_error(target, method)),
        Value::String(s) => string_method(s, method, args),
        Value::Array(items) => array_method(items, method, args),
        Value::Number(n) => number_method(*n, method, args),
        _ if method == "toString" => Ok(Value::String(target.to_js_string())),
        Value::Function(func) if method == "call" => {
            func.call(args.get(1..).unwrap_or(&[])).map_err(EvalError::type_error)
        }
        _ => Err(EvalError::type_error(format!("{} is not a function", method))),
    }
}

fn string_method(s: &str, method: &str, args: &[Value]) -> EvalResult {
    let first = arg_or_undefined(args, 0);
    let units = utf16(s);
    let len = units.len();
    let value = match method {
        "toUpperCase" | "toLocaleUpperCase" => Value::String(s.to_uppercase()),
        "toLowerCase" | "toLocaleLowerCase" => Value::String(s.to_lowercase()),
        "trim" => Value::String(js_trim(s).to_string()),
        "trimStart" => Value::String(js_trim_start(s).to_string()),
        "trimEnd" => Value::String(js_trim_end(s).to_string()),
        "toString" | "valueOf" => Value::String(s.to_string()),
        "includes" => Value::Bool(s.contains(first.to_js_string().as_str())),
        "startsWith" => Value::Bool(s.starts_with(first.to_js_string().as_str())),
        "endsWith" => Value::Bool(s.ends_with(first.to_js_string().as_str())),
        "indexOf" => {
            let needle = utf16(&first.to_js_string());
            Value::Number(find_units(&units, &needle).map(|i| i as f64).unwrap_or(-1.0))
        }
        "slice" | "substring" => {
            let start_arg = to_number(first)?;
            let end_arg = match args.get(1) {
                Some(Value::Undefined) | None => len as f64,
                Some(v) => to_number(v)?,
            };
            let (start, end) = if method == "slice" {
                (relative_index(start_arg, len), relative_index(end_arg, len))
            } else {
                let clamp = |n: f64| if n.is_nan() { 0 } else { n.max(0.0).min(len as f64) as usize };
                let (a, b) = (clamp(start_arg), clamp(end_arg));
                (a.min(b), a.max(b))
            };
            if start >= end {
                Value::String(String::new())
            } else {
                Value::String(from_utf16(&units[start..end]))
            }
        }
        "charAt" | "at" => {
            let raw = to_number(first)?;
            let raw = if raw.is_nan() { 0.0 } else { raw.trunc() };
            let index = if method == "at" && raw < 0.0 { len as f64 + raw } else { raw };
            match (index >= 0.0).then(|| units.get(index as usize)).flatten() {
                Some(unit) => Value::String(from_utf16(&[*unit])),
                None if method == "at" => Value::Undefined,
                None => Value::String(String::new()),
            }
        }
        "split" => {
            let limit = match args.get(1) {
                Some(Value::Undefined) | None => usize::MAX,
                Some(v) => to_number(v)?.max(0.0) as usize,
            };
            let parts: Vec<Value> = match first {
                Value::Undefined => vec![Value::String(s.to_string())],
                sep => {
                    let sep = sep.to_js_string();
                    if sep.is_empty() {
                        s.chars().map(|c| Value::String(c.to_string())).collect()
                    } else {
                        s.split(sep.as_str()).map(|p| Value::String(p.to_string())).collect()
                    }
                }
            };
            Value::Array(parts.into_iter().take(limit).collect())
        }
        "replace" => Value::String(s.replacen(
            first.to_js_string().as_str(),
            &arg_or_undefined(args, 1).to_js_string(),
            1,
        )),
        "replaceAll" => Value::String(s.replace(
            first.to_js_string().as_str(),
            &arg_or_undefined(args, 1).to_js_string(),
        )),
        "repeat" => {
            let count = to_number(first)?;
            if count < 0.0 || count.is_infinite() {
                return Err(EvalError::range_error(format!("Invalid count value: {}", format_number(count))));
            }
            Value::String(s.repeat(if count.is_nan() { 0 } else { count as usize }))
        }
        "padStart" | "padEnd" => {
            let target_len = to_number(first)?;
            let fill = match args.get(1) {
                Some(Value::Undefined) | None => " ".to_string(),
                Some(v) => v.to_js_string(),
            };
            let target_len = if target_len.is_nan() { 0 } else { target_len.max(0.0) as usize };
            if target_len <= len || fill.is_empty() {
                Value::String(s.to_string())
            } else {
                let fill_units = utf16(&fill);
                let pad: Vec<u16> = fill_units.iter().copied().cycle().take(target_len - len).collect();
                let pad = from_utf16(&pad);
                Value::String(if method == "padStart" {
                    format!("{}{}", pad, s)
                } else {
                    format!("{}{}", s, pad)
                })
            }
        }
        "concat" => {
            let mut out = s.to_string();
            for arg in args {
                out.push_str(&arg.to_js_string());
            }
            Value::String(out)
        }
        _ => return Err(EvalError::type_error(format!("val.{} is not a function", method))),
    };
    Ok(value)
}

fn find_units(haystack: &[u16], needle: &[u16]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn array_method(items: &[Value], method: &str, args: &[Value]) -> EvalResult {
    let first = arg_or_undefined(args, 0);
    let value = match method {
        "includes" => Value::Bool(items.iter().any(|item| same_value_zero(item, first))),
        "indexOf" => Value::Number(
            items
                .iter()
                .position(|item| item.strict_equals(first))
                .map(|i| i as f64)
                .unwrap_or(-1.0),
        ),
        "join" => {
            let sep = match first {
                Value::Undefined => ",".to_string(),
                other => other.to_js_string(),
            };
            Value::String(
                items
                    .iter()
                    .map(|item| match item {
                        Value::Undefined | Value::Null => String::new(),
                        other => other.to_js_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(&sep),
            )
        }
        "slice" => {
            let len = items.len();
            let start = relative_index(to_number(first)?, len);
            let end = match args.get(1) {
                Some(Value::Undefined) | None => len,
                Some(v) => relative_index(to_number(v)?, len),
            };
            Value::Array(if start < end { items[start..end].to_vec() } else { Vec::new() })
        }
        "at" => {
            let raw = to_number(first)?;
            let raw = if raw.is_nan() { 0.0 } else { raw.trunc() };
            let index = if raw < 0.0 { items.len() as f64 + raw } else { raw };
            if index < 0.0 {
                Value::Undefined
            } else {
                items.get(index as usize).cloned().unwrap_or(Value::Undefined)
            }
        }
        "concat" => {
            let mut out = items.to_vec();
            for arg in args {
                match arg {
                    Value::Array(more) => out.extend(more.iter().cloned()),
                    other => out.push(other.clone()),
                }
            }
            Value::Array(out)
        }
        "toString" => Value::String(Value::Array(items.to_vec()).to_js_string()),
        _ => return Err(EvalError::type_error(format!("val.{} is not a function", method))),
    };
    Ok(value)
}

fn number_method(n: f64, method: &str, args: &[Value]) -> EvalResult {
    match method {
        "toFixed" => {
            let digits = to_number(arg_or_undefined(args, 0))?;
            let digits = if digits.is_nan() { 0.0 } else { digits.trunc() };
            if !(0.0..=100.0).contains(&digits) {
                return Err(EvalError::range_error("toFixed() digits argument must be between 0 and 100"));
            }
            if !n.is_finite() || n.abs() >= 1e21 {
                return Ok(Value::String(format_number(n)));
            }
            Ok(Value::String(format!("{:.*}", digits as usize, n)))
        }
        "toString" | "valueOf" => Ok(if method == "valueOf" {
            Value::Number(n)
        } else {
            Value::String(format_number(n))
        }),
        _ => Err(EvalError::type_error(format!("val.{} is not a function", method))),
    }
}

fn same_value_zero(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) if x.is_nan() && y.is_nan() => true,
        _ => a.strict_equals(b),
    }
}

fn unary(op: UnaryOp, value: &Value) -> EvalResult {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!value.truthy())),
        UnaryOp::TypeOf => Ok(Value::String(value.type_of().to_string())),
        UnaryOp::Neg => match value {
            Value::BigInt(n) => n
                .checked_neg()
                .map(Value::BigInt)
                .ok_or_else(|| EvalError::range_error("BigInt overflow")),
            other => to_number(other).map(|n| Value::Number(-n)),
        },
        UnaryOp::Plus => match value {
            Value::BigInt(_) => Err(EvalError::type_error("Cannot convert a BigInt value to a number")),
            other => to_number(other).map(Value::Number),
        },
    }
}

fn is_primitive(value: &Value) -> bool {
    matches!(
        value,
        Value::Undefined | Value::Null | Value::Bool(_) | Value::Number(_) | Value::BigInt(_) | Value::String(_) | Value::Symbol(_)
    )
}

fn binary(op: BinaryOp, l: &Value, r: &Value) -> EvalResult {
    match op {
        BinaryOp::StrictEq => Ok(Value::Bool(l.strict_equals(r))),
        BinaryOp::StrictNe => Ok(Value::Bool(!l.strict_equals(r))),
        BinaryOp::LooseEq => Ok(Value::Bool(l.loose_equals(r))),
        BinaryOp::LooseNe => Ok(Value::Bool(!l.loose_equals(r))),
        BinaryOp::Add => {
            let stringy = |v: &Value| matches!(v, Value::String(_)) || !is_primitive(v);
            if stringy(l) || stringy(r) {
                return Ok(Value::String(format!("{}{}", l.to_js_string(), r.to_js_string())));
            }
            arithmetic(op, l, r)
        }
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => arithmetic(op, l, r),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let ordering = match (l, r) {
                (Value::String(a), Value::String(b)) => Some(utf16(a).cmp(&utf16(b))),
                (Value::BigInt(a), Value::BigInt(b)) => Some(a.cmp(b)),
                _ => {
                    let a = to_number(l)?;
                    let b = to_number(r)?;
                    a.partial_cmp(&b)
                }
            };
            let result = match ordering {
                None => false,
                Some(ord) => match op {
                    BinaryOp::Lt => ord == Ordering::Less,
                    BinaryOp::Le => ord != Ordering::Greater,
                    BinaryOp::Gt => ord == Ordering::Greater,
                    _ => ord != Ordering::Less,
                },
            };
            Ok(Value::Bool(result))
        }
    }
}

fn arithmetic(op: BinaryOp, l: &Value, r: &Value) -> EvalResult {
    match (l, r) {
        (Value::BigInt(a), Value::BigInt(b)) => {
            let result = match op {
                BinaryOp::Add => a.checked_add(*b),
                BinaryOp::Sub => a.checked_sub(*b),
                BinaryOp::Mul => a.checked_mul(*b),
                BinaryOp::Div | BinaryOp::Rem if *b == 0 => {
                    return Err(EvalError::range_error("Division by zero"))
                }
                BinaryOp::Div => a.checked_div(*b),
                // i128::MIN % -1 is 0 in BigInt arithmetic
                _ => Some(a.wrapping_rem(*b)),
            };
            result
                .map(Value::BigInt)
                .ok_or_else(|| EvalError::range_error("BigInt overflow"))
        }
        (Value::BigInt(_), _) | (_, Value::BigInt(_)) => Err(EvalError::type_error(
            "Cannot mix BigInt and other types, use explicit conversions",
        )),
        _ => {
            let a = to_number(l)?;
            let b = to_number(r)?;
            Ok(Value::Number(match op {
                BinaryOp::Add => a + b,
                BinaryOp::Sub => a - b,
                BinaryOp::Mul => a * b,
                BinaryOp::Div => a / b,
                _ => a % b,
            }))
        }
    }
}

/// `parseInt(string, radix)`
pub fn parse_int(input: &str, radix: u32) -> f64 {
    let s = js_trim_start(input);
    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let (radix, s) = match radix {
        0 | 16 if s.starts_with("0x") || s.starts_with("0X") => (16, &s[2..]),
        0 => (10, s),
        r if (2..=36).contains(&r) => (r, s),
        _ => return f64::NAN,
    };
    let digits: String = s.chars().take_while(|c| c.is_digit(radix)).collect();
    if digits.is_empty() {
        return f64::NAN;
    }
    let value = digits
        .chars()
        .filter_map(|c| c.to_digit(radix))
        .fold(0.0f64, |acc, d| acc * f64::from(radix) + f64::from(d));
    if negative {
        -value
    } else {
        value
    }
}

/// `parseFloat(string)`
pub fn parse_float(input: &str) -> f64 {
    let s = js_trim_start(input);
    for (prefix, value) in [
        ("Infinity", f64::INFINITY),
        ("+Infinity", f64::INFINITY),
        ("-Infinity", f64::NEG_INFINITY),
    ] {
        if s.starts_with(prefix) {
            return value;
        }
    }
    // Longest prefix that is a decimal literal
    let bytes = s.as_bytes();
    let mut end = 0;
    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let mut seen_digit = false;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        seen_digit = true;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        end += 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() {
            end += 1;
            seen_digit = true;
        }
    }
    if !seen_digit {
        return f64::NAN;
    }
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > digits_start {
            end = exp_end;
        }
    }
    string_to_number(&s[..end])
}
