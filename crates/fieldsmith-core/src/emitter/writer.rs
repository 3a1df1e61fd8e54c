//! Source snippets shared by the emitter
//!
//! Copyright (c) 2025 Fieldsmith Team
//! Licensed under the Apache-2.0 license

use crate::ir::{Bound, Message};
use crate::policy::{quote_js_string, render_bigint, render_date, render_number};

/// Builders for the pieces of a generated module
pub struct Template;

impl Template {
    /// `import { z } from "zod";`
    pub fn import() -> String {
        "import { z } from \"zod\";\n".to_string()
    }

    pub fn const_export(name: &str, expression: &str) -> String {
        format!("export const {} = {};\n", name, expression)
    }

    pub fn type_export(type_name: &str, schema_name: &str) -> String {
        format!("export type {} = z.infer<typeof {}>;\n", type_name, schema_name)
    }

    /// `z.<name>(<args>)`
    pub fn factory(name: &str, args: &[String]) -> String {
        format!("z.{}({})", name, args.join(", "))
    }

    /// `<receiver>.<name>(<args>)`
    pub fn method(receiver: String, name: &str, args: &[String]) -> String {
        format!("{}.{}({})", receiver, name, args.join(", "))
    }

    /// A method whose only argument is an optional `{ message }` object
    pub fn checked(receiver: String, name: &str, message: &Message) -> String {
        let args: Vec<String> = Self::message(message).into_iter().collect();
        Self::method(receiver, name, &args)
    }

    /// A method taking a value and an optional `{ message }` object
    pub fn checked_with(receiver: String, name: &str, value: String, message: &Message) -> String {
        let mut args = vec![value];
        args.extend(Self::message(message));
        Self::method(receiver, name, &args)
    }

    /// `{ message: "…" }` when a custom message is set
    pub fn message(message: &Message) -> Option<String> {
        message
            .as_ref()
            .map(|text| Self::options(&[("message", quote_js_string(text))]))
    }

    /// `{ a: 1, b: 2 }`; `{}` when empty
    pub fn options(entries: &[(&str, String)]) -> String {
        if entries.is_empty() {
            return "{}".to_string();
        }
        let body = entries
            .iter()
            .map(|(key, value)| format!("{}: {}", key, value))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{{ {} }}", body)
    }

    /// `[a, b]`
    pub fn list(items: &[String]) -> String {
        format!("[{}]", items.join(", "))
    }

    pub fn bound(bound: &Bound) -> String {
        match bound {
            Bound::Number(n) => render_number(*n),
            Bound::BigInt(n) => render_bigint(*n),
            Bound::Date(ms) => render_date(*ms),
        }
    }

    pub fn indent(level: usize, width: usize) -> String {
        " ".repeat(level * width)
    }
}
