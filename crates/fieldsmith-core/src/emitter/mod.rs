//! Zod source backend
//!
//! [`Emitter`] folds the same lowered tree the interpreter folds, producing
//! Zod v3 TypeScript instead of a live validator. Every piece of user text
//! is written through [`crate::policy::quote_js_string`]; nothing the user
//! typed is spliced into source unescaped. Expression payloads were parsed
//! during lowering and are rendered from their syntax tree.
//!
//! # Example
//!
//! ```
//! use fieldsmith_core::model::{FieldSpec, RuleKind, TypeTag};
//! use fieldsmith_core::emit;
//!
//! let fields = vec![FieldSpec::of("age", TypeTag::Number)
//!     .coerced()
//!     .rule(RuleKind::Min, "0")
//!     .rule(RuleKind::Int, "")];
//! let source = emit(&fields).unwrap();
//! assert!(source.contains("age: z.coerce.number().min(0).int(),"));
//! ```
//!
//! Copyright (c) 2025 Fieldsmith Team
//! Licensed under the Apache-2.0 license

pub mod writer;

use crate::backend::Backend;
use crate::ir::{BaseNode, RuleOp, SchemaNode, UnknownKeys};
use crate::lower::{lower, LowerOptions};
use crate::model::{FieldSpec, IpVersion};
use crate::policy::{self, property_key, quote_js_string, render_literal};
use crate::Result;
use tracing::debug;
pub use writer::Template;

/// How a module is laid out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    pub lower: LowerOptions,
    /// Exported constant name; normalized to a camelCase identifier
    pub schema_name: String,
    /// Exported type name; derived from `schema_name` when unset
    pub type_name: Option<String>,
    pub include_import: bool,
    pub include_type_export: bool,
    /// Spaces per nesting level
    pub indent: usize,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            lower: LowerOptions::default(),
            schema_name: policy::DEFAULT_SCHEMA_NAME.to_string(),
            type_name: None,
            include_import: true,
            include_type_export: true,
            indent: 2,
        }
    }
}

impl EmitOptions {
    pub fn with_schema_name(mut self, name: impl Into<String>) -> Self {
        self.schema_name = name.into();
        self
    }

    pub fn with_type_name(mut self, name: impl Into<String>) -> Self {
        self.type_name = Some(name.into());
        self
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Only the `export const` line
    pub fn bare(mut self) -> Self {
        self.include_import = false;
        self.include_type_export = false;
        self
    }

    pub fn schema_identifier(&self) -> String {
        policy::schema_identifier(&self.schema_name)
    }

    pub fn type_identifier(&self) -> String {
        match &self.type_name {
            Some(name) => policy::type_name(name),
            None => policy::type_name(&self.schema_identifier()),
        }
    }
}

/// Emit a complete module for a root field list
pub fn emit(fields: &[FieldSpec]) -> Result<String> {
    emit_with(fields, &EmitOptions::default())
}

pub fn emit_with(fields: &[FieldSpec], options: &EmitOptions) -> Result<String> {
    let lowered = lower(fields, &options.lower)?;
    Ok(emit_module(&lowered.node, options))
}

/// Render a lowered tree as a module
pub fn emit_module(node: &SchemaNode, options: &EmitOptions) -> String {
    let schema_name = options.schema_identifier();
    let expression = emit_expression(node, options.indent);
    let mut sections = Vec::new();
    if options.include_import {
        sections.push(Template::import());
    }
    sections.push(Template::const_export(&schema_name, &expression));
    if options.include_type_export {
        sections.push(Template::type_export(&options.type_identifier(), &schema_name));
    }
    debug!(bytes = expression.len(), name = %schema_name, "emitted module");
    sections.join("\n")
}

/// Render a lowered tree as a single `z` expression
pub fn emit_expression(node: &SchemaNode, indent: usize) -> String {
    Emitter::new(indent).node(node)
}

/// Builds Zod source text
#[derive(Debug, Clone)]
pub struct Emitter {
    indent: usize,
    level: usize,
}

impl Emitter {
    pub fn new(indent: usize) -> Self {
        Self { indent, level: 0 }
    }

    fn object(&mut self, fields: &[(String, SchemaNode)]) -> String {
        if fields.is_empty() {
            return "z.object({})".to_string();
        }
        self.level += 1;
        let pad = Template::indent(self.level, self.indent);
        let mut body = String::new();
        for (key, node) in fields {
            let value = self.node(node);
            body.push_str(&format!("{}{}: {},\n", pad, property_key(key), value));
        }
        self.level -= 1;
        format!("z.object({{\n{}{}}})", body, Template::indent(self.level, self.indent))
    }

    fn nodes(&mut self, nodes: &[SchemaNode]) -> Vec<String> {
        nodes.iter().map(|node| self.node(node)).collect()
    }
}

fn coerced(name: &str, coerce: bool) -> String {
    if coerce {
        format!("z.coerce.{}()", name)
    } else {
        Template::factory(name, &[])
    }
}

impl Backend for Emitter {
    type Output = String;

    fn base(&mut self, base: &BaseNode) -> String {
        match base {
            BaseNode::String { coerce } => coerced("string", *coerce),
            BaseNode::Number { coerce } => coerced("number", *coerce),
            BaseNode::BigInt { coerce } => coerced("bigint", *coerce),
            BaseNode::Boolean { coerce } => coerced("boolean", *coerce),
            BaseNode::Date { coerce } => coerced("date", *coerce),
            BaseNode::Symbol
            | BaseNode::Undefined
            | BaseNode::Null
            | BaseNode::Void
            | BaseNode::Any
            | BaseNode::Unknown
            | BaseNode::Never
            | BaseNode::NaN => Template::factory(base.kind_name(), &[]),
            BaseNode::Literal(literal) => Template::factory("literal", &[render_literal(literal)]),
            BaseNode::Enum(members) => {
                let members: Vec<String> = members.iter().map(|m| quote_js_string(m)).collect();
                Template::factory("enum", &[Template::list(&members)])
            }
            BaseNode::NativeEnum(entries) => {
                let body = entries
                    .iter()
                    .map(|(key, value)| format!("{}: {}", property_key(key), render_literal(value)))
                    .collect::<Vec<_>>()
                    .join(", ");
                Template::factory("nativeEnum", &[format!("{{ {} }}", body)])
            }
            BaseNode::Object(object) => {
                let shape = self.object(&object.fields);
                match &object.unknown_keys {
                    UnknownKeys::Strip => shape,
                    UnknownKeys::Strict => Template::method(shape, "strict", &[]),
                    UnknownKeys::Passthrough => Template::method(shape, "passthrough", &[]),
                    UnknownKeys::Catchall(node) => {
                        let catchall = self.node(node);
                        Template::method(shape, "catchall", &[catchall])
                    }
                }
            }
            BaseNode::Array(element) => {
                let element = self.node(element);
                Template::factory("array", &[element])
            }
            BaseNode::Tuple { items, rest } => {
                let items = self.nodes(items);
                let tuple = Template::factory("tuple", &[Template::list(&items)]);
                match rest {
                    Some(rest) => {
                        let rest = self.node(rest);
                        Template::method(tuple, "rest", &[rest])
                    }
                    None => tuple,
                }
            }
            BaseNode::Union(members) => {
                let members = self.nodes(members);
                Template::factory("union", &[Template::list(&members)])
            }
            BaseNode::DiscriminatedUnion {
                discriminator,
                cases,
            } => {
                let cases: Vec<String> = cases
                    .iter()
                    .map(|case| {
                        let tag = SchemaNode::new(BaseNode::Literal(case.value.as_str().into()));
                        let mut fields = vec![(discriminator.clone(), tag)];
                        fields.extend(case.fields.iter().cloned());
                        self.object(&fields)
                    })
                    .collect();
                Template::factory(
                    "discriminatedUnion",
                    &[quote_js_string(discriminator), Template::list(&cases)],
                )
            }
            BaseNode::Intersection(left, right) => {
                let args = [self.node(left), self.node(right)];
                Template::factory("intersection", &args)
            }
            BaseNode::Record { key, value } => {
                let args = [self.node(key), self.node(value)];
                Template::factory("record", &args)
            }
            BaseNode::Map { key, value } => {
                let args = [self.node(key), self.node(value)];
                Template::factory("map", &args)
            }
            BaseNode::Set(value) => {
                let value = self.node(value);
                Template::factory("set", &[value])
            }
            BaseNode::Function { args, returns } => {
                let args = self.nodes(args);
                let returns = self.node(returns);
                let function = Template::method(Template::factory("function", &[]), "args", &args);
                Template::method(function, "returns", &[returns])
            }
            BaseNode::Promise(inner) => {
                let inner = self.node(inner);
                Template::factory("promise", &[inner])
            }
        }
    }

    fn apply(&mut self, base: &BaseNode, output: String, op: &RuleOp) -> String {
        match op {
            RuleOp::Min(bound, message) => Template::checked_with(output, "min", Template::bound(bound), message),
            RuleOp::Max(bound, message) => Template::checked_with(output, "max", Template::bound(bound), message),
            RuleOp::Length(length, message) => {
                let name = if matches!(base, BaseNode::Set(_)) { "size" } else { "length" };
                Template::checked_with(output, name, policy::render_number(*length), message)
            }
            RuleOp::Gt(bound, message) => Template::checked_with(output, "gt", Template::bound(bound), message),
            RuleOp::Lt(bound, message) => Template::checked_with(output, "lt", Template::bound(bound), message),
            RuleOp::MultipleOf(bound, message) => {
                Template::checked_with(output, "multipleOf", Template::bound(bound), message)
            }
            RuleOp::Regex(pattern, message) => Template::checked_with(
                output,
                "regex",
                format!("new RegExp({})", quote_js_string(pattern)),
                message,
            ),
            RuleOp::Format(format, message) => Template::checked(output, format.method(), message),
            RuleOp::Includes(s, message) => Template::checked_with(output, "includes", quote_js_string(s), message),
            RuleOp::StartsWith(s, message) => {
                Template::checked_with(output, "startsWith", quote_js_string(s), message)
            }
            RuleOp::EndsWith(s, message) => Template::checked_with(output, "endsWith", quote_js_string(s), message),
            RuleOp::Trim => Template::method(output, "trim", &[]),
            RuleOp::ToLowerCase => Template::method(output, "toLowerCase", &[]),
            RuleOp::ToUpperCase => Template::method(output, "toUpperCase", &[]),
            RuleOp::Datetime {
                precision,
                offset,
                message,
            } => {
                let mut entries = Vec::new();
                if let Some(precision) = precision {
                    entries.push(("precision", precision.to_string()));
                }
                if *offset {
                    entries.push(("offset", "true".to_string()));
                }
                if let Some(text) = message {
                    entries.push(("message", quote_js_string(text)));
                }
                let args: Vec<String> = if entries.is_empty() {
                    Vec::new()
                } else {
                    vec![Template::options(&entries)]
                };
                Template::method(output, "datetime", &args)
            }
            RuleOp::Ip { version, message } => {
                let mut entries = Vec::new();
                if let Some(version) = version {
                    let name = match version {
                        IpVersion::V4 => "v4",
                        IpVersion::V6 => "v6",
                    };
                    entries.push(("version", quote_js_string(name)));
                }
                if let Some(text) = message {
                    entries.push(("message", quote_js_string(text)));
                }
                let args: Vec<String> = if entries.is_empty() {
                    Vec::new()
                } else {
                    vec![Template::options(&entries)]
                };
                Template::method(output, "ip", &args)
            }
            RuleOp::Int(message) => Template::checked(output, "int", message),
            RuleOp::Positive(message) => Template::checked(output, "positive", message),
            RuleOp::Negative(message) => Template::checked(output, "negative", message),
            RuleOp::Nonpositive(message) => Template::checked(output, "nonpositive", message),
            RuleOp::Nonnegative(message) => Template::checked(output, "nonnegative", message),
            RuleOp::Finite(message) => Template::checked(output, "finite", message),
            RuleOp::Safe(message) => Template::checked(output, "safe", message),
            RuleOp::Nonempty(message) => Template::checked(output, "nonempty", message),
            RuleOp::Optional => Template::method(output, "optional", &[]),
            RuleOp::Nullable => Template::method(output, "nullable", &[]),
            RuleOp::Nullish => Template::method(output, "nullish", &[]),
            RuleOp::Default(literal) => Template::method(output, "default", &[render_literal(literal)]),
            RuleOp::Catch(literal) => Template::method(output, "catch", &[render_literal(literal)]),
            RuleOp::Transform(expression) => Template::method(output, "transform", &[expression.to_string()]),
            RuleOp::Refine(expression, message) => {
                Template::checked_with(output, "refine", expression.to_string(), message)
            }
            RuleOp::Brand(name) => format!("{}.brand<{}>()", output, quote_js_string(name)),
            RuleOp::Readonly => Template::method(output, "readonly", &[]),
        }
    }

    fn describe(&mut self, output: String, description: &str) -> String {
        Template::method(output, "describe", &[quote_js_string(description)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{RuleKind, TypeTag, ValidationRule};

    fn bare(fields: Vec<FieldSpec>) -> String {
        emit_with(&fields, &EmitOptions::default().bare()).unwrap()
    }

    #[test]
    fn test_module_layout() {
        let fields = vec![FieldSpec::of("age", TypeTag::Number).coerced().rule(RuleKind::Min, "0")];
        let source = emit(&fields).unwrap();
        assert_eq!(
            source,
            "import { z } from \"zod\";\n\n\
             export const schema = z.object({\n  age: z.coerce.number().min(0),\n});\n\n\
             export type Schema = z.infer<typeof schema>;\n"
        );
    }

    #[test]
    fn test_empty_root_is_any() {
        assert_eq!(bare(vec![]), "export const schema = z.any();\n");
    }

    #[test]
    fn test_nested_objects_indent() {
        let fields = vec![FieldSpec::of("address", TypeTag::Object)
            .with_children(vec![FieldSpec::of("city", TypeTag::String)])];
        assert_eq!(
            bare(fields),
            "export const schema = z.object({\n  address: z.object({\n    city: z.string(),\n  }),\n});\n"
        );
    }

    #[test]
    fn test_user_text_is_escaped() {
        let fields = vec![FieldSpec::of("first name", TypeTag::String)
            .with_rule(ValidationRule::new(RuleKind::Pattern, r#"^"\d+$"#).with_message("bad \"x\""))
            .described("line\nbreak")];
        let source = bare(fields);
        assert!(source.contains(r#""first name": z.string()"#), "{}", source);
        assert!(source.contains(r#".regex(new RegExp("^\"\\d+$"), { message: "bad \"x\"" })"#), "{}", source);
        assert!(source.contains(r#".describe("line\nbreak")"#), "{}", source);
    }

    #[test]
    fn test_wrappers_and_skips() {
        let fields = vec![FieldSpec::of("n", TypeTag::Number)
            .rule(RuleKind::Optional, "")
            .rule(RuleKind::Min, "3")
            .rule(RuleKind::Default, "4")];
        assert!(bare(fields).contains("n: z.number().optional().default(4),"));
    }

    #[test]
    fn test_brand_and_names() {
        let fields = vec![FieldSpec::of("id", TypeTag::String).rule(RuleKind::Brand, "UserId")];
        let options = EmitOptions::default().with_schema_name("user profile");
        let source = emit_with(&fields, &options).unwrap();
        assert!(source.contains(r#"id: z.string().brand<"UserId">(),"#));
        assert!(source.contains("export const userProfile = "));
        assert!(source.contains("export type UserProfile = z.infer<typeof userProfile>;"));
    }
}
