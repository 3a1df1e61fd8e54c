//! Runtime values checked by compiled validators
//!
//! Validators run against JavaScript-shaped data: `undefined` is distinct from
//! `null`, numbers are IEEE doubles, dates are epoch milliseconds (NaN for an
//! invalid date) and maps/sets keep insertion order. This module holds that
//! value model, the JavaScript coercions the `coerce` flag relies on, and the
//! conversions to and from JSON.
//!
//! Plain JSON cannot express every value, so sample files may use a tagged
//! convention: a single-key object whose key starts with `$`.
//!
//! | Tag | Value |
//! |-----|-------|
//! | `{"$undefined": true}` | `undefined` |
//! | `{"$number": "NaN"}` | `NaN`, `Infinity`, `-Infinity` |
//! | `{"$bigint": "42"}` | `42n` |
//! | `{"$date": "2024-01-01"}` | a `Date` (string or epoch ms) |
//! | `{"$symbol": "id"}` | `Symbol("id")` |
//! | `{"$map": [[k, v], ...]}` | a `Map` |
//! | `{"$set": [...]}` | a `Set` |
//! | `{"$function": 2}` | a function of that arity returning `undefined` |
//! | `{"$promise": v}` / `{"$rejected": "msg"}` | a settled promise |
//!
//! Copyright (c) 2025 Fieldsmith Team
//! Licensed under the Apache-2.0 license

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Object payload; keys iterate in sorted order
pub type Object = BTreeMap<String, Value>;

/// Signature of a callable value
pub type NativeFn = dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync;

/// Largest integer a double represents exactly
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
/// Smallest integer a double represents exactly
pub const MIN_SAFE_INTEGER: f64 = -9_007_199_254_740_991.0;

/// A callable value
#[derive(Clone)]
pub struct FunctionValue {
    name: String,
    arity: usize,
    call: Arc<NativeFn>,
}

impl FunctionValue {
    pub fn new<F>(name: impl Into<String>, arity: usize, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            arity,
            call: Arc::new(f),
        }
    }

    /// A function that ignores its arguments and returns `undefined`
    pub fn noop(arity: usize) -> Self {
        Self::new("anonymous", arity, |_| Ok(Value::Undefined))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Invoke the function; an `Err` models a thrown exception
    pub fn call(&self, args: &[Value]) -> Result<Value, String> {
        (self.call)(args)
    }
}

impl fmt::Debug for FunctionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Function {}]", self.name)
    }
}

impl PartialEq for FunctionValue {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.call, &other.call)
    }
}

/// Outcome of an already-settled promise
#[derive(Debug, Clone, PartialEq)]
pub enum PromiseState {
    Resolved(Value),
    Rejected(String),
}

/// A JavaScript-shaped runtime value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    BigInt(i128),
    String(String),
    /// Epoch milliseconds; NaN is an invalid date
    Date(f64),
    Symbol(String),
    Array(Vec<Value>),
    Object(Object),
    Map(Vec<(Value, Value)>),
    Set(Vec<Value>),
    Function(FunctionValue),
    Promise(Box<PromiseState>),
}

/// The runtime type of a value, as reported in issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParsedType {
    Undefined,
    Null,
    Boolean,
    Number,
    Nan,
    Bigint,
    String,
    Date,
    Symbol,
    Array,
    Object,
    Map,
    Set,
    Function,
    Promise,
}

impl fmt::Display for ParsedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParsedType::Undefined => "undefined",
            ParsedType::Null => "null",
            ParsedType::Boolean => "boolean",
            ParsedType::Number => "number",
            ParsedType::Nan => "nan",
            ParsedType::Bigint => "bigint",
            ParsedType::String => "string",
            ParsedType::Date => "date",
            ParsedType::Symbol => "symbol",
            ParsedType::Array => "array",
            ParsedType::Object => "object",
            ParsedType::Map => "map",
            ParsedType::Set => "set",
            ParsedType::Function => "function",
            ParsedType::Promise => "promise",
        };
        f.write_str(name)
    }
}

impl Value {
    /// Build an object from key/value pairs
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn parsed_type(&self) -> ParsedType {
        match self {
            Value::Undefined => ParsedType::Undefined,
            Value::Null => ParsedType::Null,
            Value::Bool(_) => ParsedType::Boolean,
            Value::Number(n) if n.is_nan() => ParsedType::Nan,
            Value::Number(_) => ParsedType::Number,
            Value::BigInt(_) => ParsedType::Bigint,
            Value::String(_) => ParsedType::String,
            Value::Date(_) => ParsedType::Date,
            Value::Symbol(_) => ParsedType::Symbol,
            Value::Array(_) => ParsedType::Array,
            Value::Object(_) => ParsedType::Object,
            Value::Map(_) => ParsedType::Map,
            Value::Set(_) => ParsedType::Set,
            Value::Function(_) => ParsedType::Function,
            Value::Promise(_) => ParsedType::Promise,
        }
    }

    /// The `typeof` operator
    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::BigInt(_) => "bigint",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Function(_) => "function",
            _ => "object",
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Property lookup on plain objects
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// JavaScript truthiness
    pub fn truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => !(n.is_nan() || *n == 0.0),
            Value::BigInt(n) => *n != 0,
            Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// `String(value)`
    pub fn to_js_string(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::BigInt(n) => n.to_string(),
            Value::String(s) => s.clone(),
            Value::Date(ms) => format_date_display(*ms),
            Value::Symbol(desc) => format!("Symbol({})", desc),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::Undefined | Value::Null => String::new(),
                    other => other.to_js_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(_) => "[object Object]".to_string(),
            Value::Map(_) => "[object Map]".to_string(),
            Value::Set(_) => "[object Set]".to_string(),
            Value::Function(func) => format!("function {}() {{ [native code] }}", func.name()),
            Value::Promise(_) => "[object Promise]".to_string(),
        }
    }

    /// `Number(value)`; `None` where JavaScript throws a TypeError
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Value::Undefined => Some(f64::NAN),
            Value::Null => Some(0.0),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Number(n) => Some(*n),
            Value::BigInt(n) => Some(*n as f64),
            Value::String(s) => Some(string_to_number(s)),
            Value::Date(ms) => Some(*ms),
            Value::Symbol(_) => None,
            Value::Array(items) => match items.as_slice() {
                [] => Some(0.0),
                [only] => Some(string_to_number(&Value::Array(vec![only.clone()]).to_js_string())),
                _ => Some(f64::NAN),
            },
            _ => Some(f64::NAN),
        }
    }

    /// `BigInt(value)`; `None` where JavaScript throws
    pub fn to_bigint(&self) -> Option<i128> {
        match self {
            Value::Bool(b) => Some(i128::from(*b)),
            Value::Number(n) => {
                if n.is_finite() && n.fract() == 0.0 && n.abs() < 1.7e38 {
                    Some(*n as i128)
                } else {
                    None
                }
            }
            Value::BigInt(n) => Some(*n),
            Value::String(s) => string_to_bigint(s),
            Value::Array(_) => string_to_bigint(&self.to_js_string()),
            _ => None,
        }
    }

    /// `new Date(value)`; `None` where JavaScript throws
    pub fn to_date(&self) -> Option<f64> {
        match self {
            Value::Undefined => Some(f64::NAN),
            Value::Null => Some(0.0),
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Number(n) => Some(time_clip(*n)),
            Value::Date(ms) => Some(*ms),
            Value::String(s) => Some(parse_date(s)),
            Value::BigInt(_) | Value::Symbol(_) => None,
            other => Some(parse_date(&other.to_js_string())),
        }
    }

    /// The `===` operator
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            _ => false,
        }
    }

    /// The `==` operator for primitives
    pub fn loose_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined | Value::Null, Value::Undefined | Value::Null) => true,
            (Value::Undefined | Value::Null, _) | (_, Value::Undefined | Value::Null) => false,
            (Value::String(_), Value::String(_)) => self.strict_equals(other),
            (Value::BigInt(a), other) | (other, Value::BigInt(a)) => {
                other.to_number().map(|n| n == *a as f64).unwrap_or(false)
            }
            (a, b) if a.is_primitive() && b.is_primitive() => {
                match (a.to_number(), b.to_number()) {
                    (Some(x), Some(y)) => x == y,
                    _ => false,
                }
            }
            _ => false,
        }
    }

    fn is_primitive(&self) -> bool {
        matches!(
            self,
            Value::Undefined
                | Value::Null
                | Value::Bool(_)
                | Value::Number(_)
                | Value::BigInt(_)
                | Value::String(_)
                | Value::Symbol(_)
        )
    }

    /// Plain JSON conversion; every JSON document maps to a value
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => Value::Array(items.iter().map(Value::from_json).collect()),
            serde_json::Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// JSON conversion honoring the `$`-tagged convention
    pub fn from_tagged_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Array(items) => {
                Value::Array(items.iter().map(Value::from_tagged_json).collect())
            }
            serde_json::Value::Object(map) => {
                if map.len() == 1 {
                    if let Some((tag, payload)) = map.iter().next() {
                        if let Some(value) = decode_tagged(tag, payload) {
                            return value;
                        }
                    }
                }
                Value::Object(
                    map.iter()
                        .map(|(k, v)| (k.clone(), Value::from_tagged_json(v)))
                        .collect(),
                )
            }
            other => Value::from_json(other),
        }
    }

    /// Lossy plain JSON rendering for display
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Undefined | Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Number(n) => serde_json::Number::from_f64(*n).map(Json::Number).unwrap_or(Json::Null),
            Value::BigInt(n) => Json::String(n.to_string()),
            Value::String(s) => Json::String(s.clone()),
            Value::Date(ms) => format_date_iso(*ms).map(Json::String).unwrap_or(Json::Null),
            Value::Symbol(desc) => Json::String(format!("Symbol({})", desc)),
            Value::Array(items) | Value::Set(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Object(map) => Json::Object(
                map.iter()
                    .filter(|(_, v)| !v.is_undefined())
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Value::Map(entries) => Json::Array(
                entries
                    .iter()
                    .map(|(k, v)| Json::Array(vec![k.to_json(), v.to_json()]))
                    .collect(),
            ),
            Value::Function(_) => Json::String(self.to_js_string()),
            Value::Promise(state) => match state.as_ref() {
                PromiseState::Resolved(v) => v.to_json(),
                PromiseState::Rejected(_) => Json::Null,
            },
        }
    }

    /// Exact JSON rendering using the `$`-tagged convention
    pub fn to_tagged_json(&self) -> serde_json::Value {
        use serde_json::{json, Value as Json};
        match self {
            Value::Undefined => json!({ "$undefined": true }),
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Number(n) => match serde_json::Number::from_f64(*n) {
                Some(num) => Json::Number(num),
                None => json!({ "$number": format_number(*n) }),
            },
            Value::BigInt(n) => json!({ "$bigint": n.to_string() }),
            Value::String(s) => Json::String(s.clone()),
            Value::Date(ms) => match format_date_iso(*ms) {
                Some(iso) => json!({ "$date": iso }),
                None => json!({ "$date": "Invalid Date" }),
            },
            Value::Symbol(desc) => json!({ "$symbol": desc }),
            Value::Array(items) => Json::Array(items.iter().map(Value::to_tagged_json).collect()),
            Value::Object(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_tagged_json()))
                    .collect(),
            ),
            Value::Map(entries) => json!({
                "$map": entries
                    .iter()
                    .map(|(k, v)| Json::Array(vec![k.to_tagged_json(), v.to_tagged_json()]))
                    .collect::<Vec<_>>()
            }),
            Value::Set(items) => json!({
                "$set": items.iter().map(Value::to_tagged_json).collect::<Vec<_>>()
            }),
            Value::Function(func) => json!({ "$function": func.arity() }),
            Value::Promise(state) => match state.as_ref() {
                PromiseState::Resolved(v) => json!({ "$promise": v.to_tagged_json() }),
                PromiseState::Rejected(reason) => json!({ "$rejected": reason }),
            },
        }
    }
}

fn decode_tagged(tag: &str, payload: &serde_json::Value) -> Option<Value> {
    use serde_json::Value as Json;
    let value = match (tag, payload) {
        ("$undefined", _) => Value::Undefined,
        ("$number", Json::String(s)) => Value::Number(string_to_number(s)),
        ("$bigint", Json::String(s)) => Value::BigInt(string_to_bigint(s)?),
        ("$bigint", Json::Number(n)) => Value::BigInt(i128::from(n.as_i64()?)),
        ("$date", Json::String(s)) => Value::Date(parse_date(s)),
        ("$date", Json::Number(n)) => Value::Date(time_clip(n.as_f64()?)),
        ("$symbol", Json::String(s)) => Value::Symbol(s.clone()),
        ("$map", Json::Array(entries)) => Value::Map(
            entries
                .iter()
                .map(|entry| match entry {
                    Json::Array(pair) if pair.len() == 2 => Some((
                        Value::from_tagged_json(&pair[0]),
                        Value::from_tagged_json(&pair[1]),
                    )),
                    _ => None,
                })
                .collect::<Option<Vec<_>>>()?,
        ),
        ("$set", Json::Array(items)) => Value::Set(items.iter().map(Value::from_tagged_json).collect()),
        ("$function", Json::Number(n)) => Value::Function(FunctionValue::noop(n.as_u64()? as usize)),
        ("$promise", inner) => Value::Promise(Box::new(PromiseState::Resolved(Value::from_tagged_json(inner)))),
        ("$rejected", Json::String(reason)) => Value::Promise(Box::new(PromiseState::Rejected(reason.clone()))),
        _ => return None,
    };
    Some(value)
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_tagged_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = serde_json::Value::deserialize(deserializer)?;
        Ok(Value::from_tagged_json(&json))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{:?}", s),
            Value::BigInt(n) => write!(f, "{}n", n),
            Value::Array(_) | Value::Object(_) | Value::Map(_) | Value::Set(_) => {
                write!(f, "{}", self.to_tagged_json())
            }
            other => f.write_str(&other.to_js_string()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

/// `Number.prototype.toString()` for finite and non-finite doubles
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let abs = n.abs();
    if abs >= 1e21 || abs < 1e-6 {
        let formatted = format!("{:e}", n);
        return match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => formatted,
        };
    }
    if n.fract() == 0.0 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}

/// JavaScript WhiteSpace and LineTerminator code points
///
/// This is the set `String.prototype.trim`, `Number()` and the regex `\s`
/// class strip or match. It differs from [`char::is_whitespace`]: U+0085 is
/// not in it and U+FEFF is.
pub fn is_js_whitespace(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\u{0B}'
            | '\u{0C}'
            | '\r'
            | ' '
            | '\u{A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

/// The same set as a regex class body
pub const JS_WHITESPACE_CLASS: &str =
    r"\t\n\x0B\x0C\r \xA0\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}\x{FEFF}";

/// `String.prototype.trim`
pub fn js_trim(s: &str) -> &str {
    s.trim_matches(is_js_whitespace)
}

/// `String.prototype.trimStart`
pub fn js_trim_start(s: &str) -> &str {
    s.trim_start_matches(is_js_whitespace)
}

/// `String.prototype.trimEnd`
pub fn js_trim_end(s: &str) -> &str {
    s.trim_end_matches(is_js_whitespace)
}

/// `Number(string)`
pub fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim_matches(is_js_whitespace);
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = trimmed.strip_prefix(prefix) {
            return u128::from_str_radix(digits, radix)
                .map(|v| v as f64)
                .unwrap_or(f64::NAN);
        }
    }
    let well_formed = trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
        && trimmed.chars().any(|c| c.is_ascii_digit());
    if !well_formed {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// `BigInt(string)`; `None` on a SyntaxError
pub fn string_to_bigint(s: &str) -> Option<i128> {
    let trimmed = s.trim_matches(is_js_whitespace);
    if trimmed.is_empty() {
        return Some(0);
    }
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = trimmed.strip_prefix(prefix) {
            return i128::from_str_radix(digits, radix).ok();
        }
    }
    let digits = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<i128>().ok()
}

fn time_clip(ms: f64) -> f64 {
    if !ms.is_finite() || ms.abs() > 8.64e15 {
        f64::NAN
    } else {
        ms.trunc()
    }
}

/// `Date.parse(string)` for ISO 8601 and RFC 2822 inputs
///
/// Date-time strings without an offset are read as UTC so results do not
/// depend on the host time zone.
pub fn parse_date(s: &str) -> f64 {
    let s = js_trim(s);
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.timestamp_millis() as f64;
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Utc.from_utc_datetime(&naive).timestamp_millis() as f64;
        }
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return dt.timestamp_millis() as f64;
    }
    let date_only = match s.len() {
        4 => NaiveDate::parse_from_str(&format!("{}-01-01", s), "%Y-%m-%d").ok(),
        7 => NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d").ok(),
        _ => NaiveDate::parse_from_str(s, "%Y-%m-%d").ok(),
    };
    if let Some(date) = date_only.and_then(|d| d.and_hms_opt(0, 0, 0)) {
        return Utc.from_utc_datetime(&date).timestamp_millis() as f64;
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return dt.timestamp_millis() as f64;
    }
    f64::NAN
}

fn to_datetime(ms: f64) -> Option<DateTime<Utc>> {
    if ms.is_nan() {
        return None;
    }
    DateTime::<Utc>::from_timestamp_millis(ms as i64)
}

/// `Date.prototype.toISOString()`; `None` for an invalid date
pub fn format_date_iso(ms: f64) -> Option<String> {
    to_datetime(ms).map(|dt| dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
}

fn format_date_display(ms: f64) -> String {
    match to_datetime(ms) {
        Some(dt) => dt
            .format("%a %b %d %Y %H:%M:%S GMT+0000 (Coordinated Universal Time)")
            .to_string(),
        None => "Invalid Date".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_coercion() {
        assert_eq!(Value::Number(5.0).to_js_string(), "5");
        assert_eq!(Value::Number(2.5).to_js_string(), "2.5");
        assert_eq!(Value::Number(-0.0).to_js_string(), "0");
        assert_eq!(Value::Null.to_js_string(), "null");
        assert_eq!(
            Value::Array(vec![Value::from(1), Value::Null, Value::from("a")]).to_js_string(),
            "1,,a"
        );
        assert_eq!(Value::object([("a", Value::from(1))]).to_js_string(), "[object Object]");
    }

    #[test]
    fn test_number_coercion() {
        assert_eq!(Value::from("5").to_number(), Some(5.0));
        assert_eq!(Value::from("  42  ").to_number(), Some(42.0));
        assert_eq!(Value::from("").to_number(), Some(0.0));
        assert_eq!(Value::from("0x10").to_number(), Some(16.0));
        assert!(Value::from("abc").to_number().unwrap().is_nan());
        assert!(Value::from("inf").to_number().unwrap().is_nan());
        assert_eq!(Value::from("-Infinity").to_number(), Some(f64::NEG_INFINITY));
        assert_eq!(Value::Bool(true).to_number(), Some(1.0));
        assert_eq!(Value::Array(vec![]).to_number(), Some(0.0));
        assert_eq!(Value::Array(vec![Value::from("7")]).to_number(), Some(7.0));
        assert!(Value::Undefined.to_number().unwrap().is_nan());
        assert_eq!(Value::Symbol("s".into()).to_number(), None);
    }

    #[test]
    fn test_bigint_coercion() {
        assert_eq!(Value::from("12").to_bigint(), Some(12));
        assert_eq!(Value::from(" -3 ").to_bigint(), Some(-3));
        assert_eq!(Value::from("1.5").to_bigint(), None);
        assert_eq!(Value::Number(1.5).to_bigint(), None);
        assert_eq!(Value::Number(8.0).to_bigint(), Some(8));
        assert_eq!(Value::Null.to_bigint(), None);
        assert_eq!(Value::Bool(true).to_bigint(), Some(1));
    }

    #[test]
    fn test_date_parsing() {
        assert_eq!(parse_date("1970-01-01"), 0.0);
        assert_eq!(parse_date("1970-01-01T00:00:01Z"), 1000.0);
        assert_eq!(parse_date("1970-01-01T00:00:00.250+00:00"), 250.0);
        assert_eq!(parse_date("1970-01-02T00:00:00"), 86_400_000.0);
        assert!(parse_date("not a date").is_nan());
        assert_eq!(format_date_iso(0.0).as_deref(), Some("1970-01-01T00:00:00.000Z"));
        assert_eq!(format_date_iso(f64::NAN), None);
    }

    #[test]
    fn test_js_whitespace_set() {
        assert_eq!(js_trim("\u{feff} a \u{2028}"), "a");
        assert_eq!(js_trim("\u{85}a\u{85}"), "\u{85}a\u{85}");
        assert_eq!(js_trim_start("\u{a0}a "), "a ");
        assert_eq!(js_trim_end(" a\u{202f}"), " a");
        assert_eq!(string_to_bigint("\u{feff}7"), Some(7));
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::from("").truthy());
        assert!(Value::from("0").truthy());
        assert!(!Value::Number(f64::NAN).truthy());
        assert!(Value::Array(vec![]).truthy());
        assert!(!Value::BigInt(0).truthy());
    }

    #[test]
    fn test_equality() {
        assert!(Value::from(1).strict_equals(&Value::Number(1.0)));
        assert!(!Value::Number(f64::NAN).strict_equals(&Value::Number(f64::NAN)));
        assert!(!Value::from("1").strict_equals(&Value::from(1)));
        assert!(Value::from("1").loose_equals(&Value::from(1)));
        assert!(Value::Null.loose_equals(&Value::Undefined));
        assert!(!Value::Null.loose_equals(&Value::from(0)));
    }

    #[test]
    fn test_tagged_json_decoding() {
        let value = Value::from_tagged_json(&json!({
            "when": { "$date": "1970-01-01T00:00:00Z" },
            "big": { "$bigint": "99" },
            "missing": { "$undefined": true },
            "tags": { "$set": ["a", "b"] },
            "plain": { "a": 1, "b": 2 }
        }));
        assert_eq!(value.get("when"), Some(&Value::Date(0.0)));
        assert_eq!(value.get("big"), Some(&Value::BigInt(99)));
        assert_eq!(value.get("missing"), Some(&Value::Undefined));
        assert_eq!(
            value.get("tags"),
            Some(&Value::Set(vec![Value::from("a"), Value::from("b")]))
        );
        assert!(matches!(value.get("plain"), Some(Value::Object(map)) if map.len() == 2));
    }

    #[test]
    fn test_tagged_json_encoding() {
        let value = Value::object([
            ("n", Value::Number(f64::NAN)),
            ("u", Value::Undefined),
            ("p", Value::Promise(Box::new(PromiseState::Resolved(Value::from(1))))),
        ]);
        let json = value.to_tagged_json();
        assert_eq!(json["n"], json!({ "$number": "NaN" }));
        assert_eq!(json["u"], json!({ "$undefined": true }));
        assert_eq!(json["p"], json!({ "$promise": 1.0 }));
        assert_eq!(Value::from_tagged_json(&json).get("u"), Some(&Value::Undefined));
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(0.1), "0.1");
        assert_eq!(format_number(-12.0), "-12");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
    }
}
