//! Default-value and escaping policy
//!
//! Every fallback both backends rely on lives here, so the interpreter and
//! the emitter cannot pick different defaults. The second half of the module
//! renders constants as JavaScript source: string escaping, identifier
//! detection and number/bigint/date literals.
//!
//! Copyright (c) 2025 Fieldsmith Team
//! Licensed under the Apache-2.0 license

use crate::expr::eval::parse_float;
use crate::ir::Literal;
use crate::model::{NativeEnumEntry, TypeTag};
use crate::syntax::lexer::{is_ident_part, is_ident_start};
use crate::value::{format_date_iso, format_number, parse_date, string_to_bigint, JS_WHITESPACE_CLASS};
use regex::Regex;
use serde_json::Value as Json;

/// Element, key, value and promise types when unset
pub const DEFAULT_ELEMENT_TAG: TypeTag = TypeTag::Any;
/// Function return type when unset
pub const DEFAULT_RETURN_TAG: TypeTag = TypeTag::Void;
/// Members of a union declared with none
pub const DEFAULT_UNION_MEMBERS: [TypeTag; 2] = [TypeTag::String, TypeTag::Number];
/// Members padding an intersection declared with fewer than two
pub const INTERSECTION_PAD_TAG: TypeTag = TypeTag::Unknown;
pub const DEFAULT_DISCRIMINATOR: &str = "type";
pub const DEFAULT_BRAND: &str = "Brand";
pub const DEFAULT_SCHEMA_NAME: &str = "schema";
/// Recursion guard for lowering and reading
pub const DEFAULT_MAX_DEPTH: usize = 64;

const RESERVED_WORDS: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "import", "in", "instanceof", "let", "new", "null", "return", "static", "super",
    "switch", "this", "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Enum members; an empty list becomes a single empty-string member
pub fn enum_members(values: &[String]) -> Vec<String> {
    if values.is_empty() {
        vec![String::new()]
    } else {
        let mut members: Vec<String> = Vec::with_capacity(values.len());
        for value in values {
            if !members.contains(value) {
                members.push(value.clone());
            }
        }
        members
    }
}

/// Literal member from a JSON param; missing becomes `""`
///
/// Arrays and objects cannot be literal members and are kept as their JSON text.
pub fn literal_member(json: &Json) -> Literal {
    match json {
        Json::Null => Literal::String(String::new()),
        Json::Bool(b) => Literal::Bool(*b),
        Json::Number(n) => Literal::Number(n.as_f64().unwrap_or(0.0)),
        Json::String(s) => Literal::String(s.clone()),
        other => Literal::String(other.to_string()),
    }
}

/// Native enum entries; duplicate keys keep the last value at the first position
pub fn native_enum_entries(entries: &[NativeEnumEntry]) -> Vec<(String, Literal)> {
    if entries.is_empty() {
        return vec![(String::new(), Literal::String(String::new()))];
    }
    let mut out: Vec<(String, Literal)> = Vec::with_capacity(entries.len());
    for entry in entries {
        let value = literal_member(&entry.value);
        match out.iter_mut().find(|(key, _)| *key == entry.key) {
            Some(slot) => slot.1 = value,
            None => out.push((entry.key.clone(), value)),
        }
    }
    out
}

pub fn discriminator(raw: &str) -> String {
    if raw.trim().is_empty() {
        DEFAULT_DISCRIMINATOR.to_string()
    } else {
        raw.to_string()
    }
}

pub fn brand_name(raw: &str) -> String {
    if raw.trim().is_empty() {
        DEFAULT_BRAND.to_string()
    } else {
        raw.to_string()
    }
}

/// Discriminator value of a case; blank means the case name
pub fn case_value(value: &str, name: &str) -> String {
    if value.trim().is_empty() {
        name.to_string()
    } else {
        value.to_string()
    }
}

/// `parseFloat(value) || 0`
pub fn parse_number_or_zero(raw: &str) -> f64 {
    let n = parse_float(raw);
    if n.is_nan() {
        0.0
    } else {
        n
    }
}

/// Integer payload for bigint rules; unparsable becomes `0`
pub fn parse_bigint_or_zero(raw: &str) -> i128 {
    let trimmed = raw.trim();
    if let Some(n) = string_to_bigint(trimmed.strip_suffix('n').unwrap_or(trimmed)) {
        return n;
    }
    let n = parse_float(trimmed);
    if n.is_finite() {
        n.trunc() as i128
    } else {
        0
    }
}

/// Date bound in epoch milliseconds; `None` when the payload is not a date
pub fn parse_date_bound(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.chars().all(|c| c.is_ascii_digit()) && trimmed.len() > 8 {
        return trimmed.parse::<f64>().ok();
    }
    let ms = parse_date(trimmed);
    if ms.is_nan() {
        None
    } else {
        Some(ms)
    }
}

/// Interpret a `default`/`catch` payload for a field validating as `tag`
pub fn default_literal(tag: TypeTag, raw: &str) -> Literal {
    match tag {
        TypeTag::Number => Literal::Number(parse_number_or_zero(raw)),
        TypeTag::BigInt => Literal::BigInt(parse_bigint_or_zero(raw)),
        TypeTag::Boolean => Literal::Bool(raw.trim().eq_ignore_ascii_case("true")),
        TypeTag::Date => Literal::Date(parse_date(raw)),
        TypeTag::Null => Literal::Null,
        TypeTag::Undefined | TypeTag::Void => Literal::Undefined,
        TypeTag::String | TypeTag::Enum | TypeTag::Symbol => Literal::String(raw.to_string()),
        _ => serde_json::from_str::<Json>(raw)
            .map(|json| Literal::from_json(&json))
            .unwrap_or_else(|_| Literal::String(raw.to_string())),
    }
}

/// Escape text for the inside of a double-quoted JavaScript string
pub fn escape_js_string(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out
}

pub fn quote_js_string(input: &str) -> String {
    format!("\"{}\"", escape_js_string(input))
}

/// Whether `name` can appear unquoted as a property key
pub fn is_js_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_ident_start(first) => chars.all(is_ident_part),
        _ => false,
    }
}

/// Object key as written in source
///
/// `__proto__` is written as a computed key; plain or quoted it would set
/// the prototype instead of defining a property.
pub fn property_key(name: &str) -> String {
    if name == "__proto__" {
        format!("[{}]", quote_js_string(name))
    } else if is_js_identifier(name) {
        name.to_string()
    } else {
        quote_js_string(name)
    }
}

pub fn render_number(n: f64) -> String {
    format_number(n)
}

pub fn render_bigint(n: i128) -> String {
    format!("{}n", n)
}

pub fn render_date(ms: f64) -> String {
    match format_date_iso(ms) {
        Some(iso) => format!("new Date({})", quote_js_string(&iso)),
        None => "new Date(NaN)".to_string(),
    }
}

/// `.` in a pattern without the `s` flag
const JS_DOT: &str = r"[^\n\r\x{2028}\x{2029}]";
/// `[]` and `[^]`
const JS_EMPTY_CLASS: &str = r"[^\x00-\x{10FFFF}]";
const JS_FULL_CLASS: &str = r"[\x00-\x{10FFFF}]";

/// Rewrite a flagless `new RegExp(source)` pattern for the regex crate
///
/// JavaScript reads `\d`, `\w` and `\b` over ASCII and `\s` over its own
/// whitespace set, while the regex crate reads them over Unicode; these are
/// spelled out as explicit classes. `.` excludes the JavaScript line
/// terminators. Everything else passes through, so constructs the regex
/// crate rejects stay rejected.
pub fn js_pattern_to_rust(source: &str) -> String {
    let mut out = String::with_capacity(source.len() + 16);
    let mut chars = source.chars().peekable();
    let mut in_class = false;
    let mut after_dash = false;

    while let Some(c) = chars.next() {
        let prev_dash = std::mem::replace(&mut after_dash, false);
        match c {
            '\\' => match chars.next() {
                Some(escaped) => out.push_str(&js_escape_to_rust(escaped, in_class)),
                None => out.push('\\'),
            },
            '[' if !in_class => {
                let negated = chars.peek() == Some(&'^');
                if negated {
                    chars.next();
                }
                if chars.peek() == Some(&']') {
                    chars.next();
                    out.push_str(if negated { JS_FULL_CLASS } else { JS_EMPTY_CLASS });
                    continue;
                }
                out.push_str(if negated { "[^" } else { "[" });
                in_class = true;
            }
            ']' if in_class => {
                out.push(']');
                in_class = false;
            }
            // class set operators and nested classes exist only in the regex crate
            '[' | '&' | '~' if in_class => {
                out.push('\\');
                out.push(c);
            }
            '-' if in_class => {
                if prev_dash {
                    out.push_str(r"\-");
                } else {
                    out.push('-');
                    after_dash = true;
                }
            }
            '.' if !in_class => out.push_str(JS_DOT),
            c => out.push(c),
        }
    }
    out
}

fn js_escape_to_rust(escaped: char, in_class: bool) -> String {
    match escaped {
        'd' => "[0-9]".to_string(),
        'D' => "[^0-9]".to_string(),
        'w' => "[0-9A-Za-z_]".to_string(),
        'W' => "[^0-9A-Za-z_]".to_string(),
        's' => format!("[{}]", JS_WHITESPACE_CLASS),
        'S' => format!("[^{}]", JS_WHITESPACE_CLASS),
        // backspace inside a class
        'b' if in_class => r"\x08".to_string(),
        'b' => r"(?-u:\b)".to_string(),
        'B' if in_class => "B".to_string(),
        'B' => r"(?-u:\B)".to_string(),
        '0' => r"\x00".to_string(),
        '/' => "/".to_string(),
        other => format!("\\{}", other),
    }
}

/// Compile a JavaScript pattern with JavaScript matching semantics
pub fn compile_js_pattern(source: &str) -> std::result::Result<Regex, regex::Error> {
    Regex::new(&js_pattern_to_rust(source))
}

/// Render a constant as a JavaScript expression
pub fn render_literal(literal: &Literal) -> String {
    match literal {
        Literal::Undefined => "undefined".to_string(),
        Literal::Null => "null".to_string(),
        Literal::Bool(b) => b.to_string(),
        Literal::Number(n) => render_number(*n),
        Literal::BigInt(n) => render_bigint(*n),
        Literal::String(s) => quote_js_string(s),
        Literal::Date(ms) => render_date(*ms),
        Literal::Array(items) => format!(
            "[{}]",
            items.iter().map(render_literal).collect::<Vec<_>>().join(", ")
        ),
        Literal::Object(entries) if entries.is_empty() => "{}".to_string(),
        Literal::Object(entries) => format!(
            "{{ {} }}",
            entries
                .iter()
                .map(|(key, value)| format!("{}: {}", property_key(key), render_literal(value)))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

fn words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut previous_lower = false;
    for ch in name.chars() {
        if !ch.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            previous_lower = false;
            continue;
        }
        if ch.is_uppercase() && previous_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        previous_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.push(ch);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Constant name for the exported schema
pub fn schema_identifier(name: &str) -> String {
    let words = words(name);
    let mut ident: String = words
        .iter()
        .enumerate()
        .map(|(i, word)| if i == 0 { word.clone() } else { capitalize(word) })
        .collect();
    if ident.is_empty() {
        return DEFAULT_SCHEMA_NAME.to_string();
    }
    if !ident.chars().next().is_some_and(is_ident_start) {
        ident.insert(0, '_');
    }
    if RESERVED_WORDS.contains(&ident.as_str()) {
        ident.push_str("Schema");
    }
    ident
}

/// PascalCase type name derived from a schema name
pub fn type_name(name: &str) -> String {
    let ident: String = words(name).iter().map(|word| capitalize(word)).collect();
    match ident.chars().next() {
        None => capitalize(DEFAULT_SCHEMA_NAME),
        Some(first) if !is_ident_start(first) => format!("T{}", ident),
        Some(_) => ident,
    }
}
