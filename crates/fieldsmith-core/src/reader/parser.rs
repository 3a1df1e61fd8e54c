//! Recursive descent over the emitter's output grammar
//!
//! The accepted language is exactly what [`crate::emitter`] writes, plus the
//! small liberties a person editing that text would take: optional
//! semicolons, trailing commas, single-quoted strings, comments and a
//! missing import line. Anything outside it is a parse error with a
//! position; nothing is guessed.
//!
//! Copyright (c) 2025 Fieldsmith Team
//! Licensed under the Apache-2.0 license

use crate::error::Error;
use crate::expr::parse_arrow;
use crate::ir::{
    BaseNode, Bound, CaseNode, Literal, Message, ObjectNode, RuleOp, SchemaNode, StringFormat,
    UnknownKeys,
};
use crate::lower::LowerOptions;
use crate::model::IpVersion;
use crate::policy;
use crate::syntax::{Cursor, Punct, TokenKind};
use crate::value::parse_date;
use crate::Result;
use tracing::trace;

/// One `export const` read from a module
#[derive(Debug, Clone, PartialEq)]
pub struct SourceModule {
    pub schema_name: String,
    pub type_name: Option<String>,
    pub node: SchemaNode,
}

pub struct SourceParser<'o> {
    cursor: Cursor,
    options: &'o LowerOptions,
}

impl<'o> SourceParser<'o> {
    pub fn new(cursor: Cursor, options: &'o LowerOptions) -> Self {
        Self { cursor, options }
    }

    /// `import`, one schema constant, an optional type alias
    pub fn module(&mut self) -> Result<SourceModule> {
        if self.cursor.check_ident("z") {
            let node = self.expression()?;
            return Ok(SourceModule {
                schema_name: policy::DEFAULT_SCHEMA_NAME.to_string(),
                type_name: None,
                node,
            });
        }

        let mut schema: Option<(String, SchemaNode)> = None;
        let mut type_name = None;
        while !self.cursor.is_at_end() {
            if self.cursor.eat(Punct::Semi) {
                continue;
            }
            if self.cursor.check_ident("import") {
                self.import()?;
                continue;
            }
            if self.cursor.check_ident("export") {
                self.cursor.advance();
            }
            if self.cursor.check_ident("type") {
                self.cursor.advance();
                type_name = Some(self.cursor.expect_ident()?);
                self.skip_statement();
                continue;
            }
            if !self.cursor.check_ident("const") {
                return Err(self.cursor.unexpected("'const' or 'type'"));
            }
            if schema.is_some() {
                return Err(self.cursor.error("module declares more than one schema"));
            }
            self.cursor.advance();
            let name = self.cursor.expect_ident()?;
            self.cursor.expect(Punct::Assign)?;
            let node = self.schema(0, "$")?;
            self.cursor.eat(Punct::Semi);
            schema = Some((name, node));
        }

        match schema {
            Some((schema_name, node)) => Ok(SourceModule {
                schema_name,
                type_name,
                node,
            }),
            None => Err(self.cursor.error("module declares no schema")),
        }
    }

    /// A single `z` expression with nothing after it
    pub fn expression(&mut self) -> Result<SchemaNode> {
        let node = self.schema(0, "$")?;
        self.finish()?;
        Ok(node)
    }

    /// Fail unless only an optional semicolon remains
    pub fn finish(&mut self) -> Result<()> {
        self.cursor.eat(Punct::Semi);
        if !self.cursor.is_at_end() {
            return Err(self.cursor.unexpected("end of input"));
        }
        Ok(())
    }

    fn import(&mut self) -> Result<()> {
        self.cursor.expect_keyword("import")?;
        self.cursor.expect(Punct::LBrace)?;
        self.cursor.expect_keyword("z")?;
        self.cursor.expect(Punct::RBrace)?;
        self.cursor.expect_keyword("from")?;
        let module = self.cursor.expect_string()?;
        if module != "zod" {
            return Err(self.cursor.error(format!("cannot import from \"{}\"", module)));
        }
        self.cursor.eat(Punct::Semi);
        Ok(())
    }

    fn skip_statement(&mut self) {
        while !self.cursor.is_at_end() && !self.cursor.check(Punct::Semi) {
            if self.cursor.check_ident("export") || self.cursor.check_ident("const") {
                return;
            }
            self.cursor.advance();
        }
        self.cursor.eat(Punct::Semi);
    }

    fn schema(&mut self, depth: usize, path: &str) -> Result<SchemaNode> {
        if depth > self.options.max_depth {
            return Err(Error::TooDeeplyNested {
                depth,
                limit: self.options.max_depth,
                path: path.to_string(),
            });
        }
        self.cursor.expect_keyword("z")?;
        self.cursor.expect(Punct::Dot)?;
        let mut name = self.cursor.expect_ident()?;
        let coerce = name == "coerce";
        if coerce {
            self.cursor.expect(Punct::Dot)?;
            name = self.cursor.expect_ident()?;
        }
        trace!(path, factory = %name, coerce, "reading schema");
        let base = self.base(&name, coerce, depth, path)?;
        let mut node = SchemaNode::new(base);
        self.chain(&mut node, depth, path)?;
        Ok(node)
    }

    fn base(&mut self, name: &str, coerce: bool, depth: usize, path: &str) -> Result<BaseNode> {
        if coerce && !matches!(name, "string" | "number" | "bigint" | "boolean" | "date") {
            return Err(self.cursor.error(format!("z.coerce.{} is not supported", name)));
        }
        let next = depth + 1;
        self.cursor.expect(Punct::LParen)?;
        let base = match name {
            "string" => BaseNode::String { coerce },
            "number" => BaseNode::Number { coerce },
            "bigint" => BaseNode::BigInt { coerce },
            "boolean" => BaseNode::Boolean { coerce },
            "date" => BaseNode::Date { coerce },
            "symbol" => BaseNode::Symbol,
            "undefined" => BaseNode::Undefined,
            "null" => BaseNode::Null,
            "void" => BaseNode::Void,
            "any" => BaseNode::Any,
            "unknown" => BaseNode::Unknown,
            "never" => BaseNode::Never,
            "nan" => BaseNode::NaN,
            "literal" => BaseNode::Literal(self.literal()?),
            "enum" => {
                self.cursor.expect(Punct::LBracket)?;
                let mut members = Vec::new();
                while !self.cursor.eat(Punct::RBracket) {
                    members.push(self.cursor.expect_string()?);
                    self.list_separator(Punct::RBracket)?;
                }
                BaseNode::Enum(members)
            }
            "nativeEnum" => {
                let entries = match self.literal()? {
                    Literal::Object(entries) => entries,
                    _ => return Err(self.cursor.error("z.nativeEnum expects an object literal")),
                };
                BaseNode::NativeEnum(entries)
            }
            "object" => BaseNode::Object(ObjectNode::new(self.shape(next, path)?)),
            "array" => BaseNode::Array(Box::new(self.schema(next, &format!("{}<element>", path))?)),
            "set" => BaseNode::Set(Box::new(self.schema(next, &format!("{}<element>", path))?)),
            "promise" => BaseNode::Promise(Box::new(self.schema(next, &format!("{}<inner>", path))?)),
            "tuple" => BaseNode::Tuple {
                items: self.schema_list(next, path)?,
                rest: None,
            },
            "union" => BaseNode::Union(self.schema_list(next, path)?),
            "discriminatedUnion" => {
                let discriminator = self.cursor.expect_string()?;
                self.cursor.expect(Punct::Comma)?;
                let cases = self.cases(&discriminator, depth, path)?;
                BaseNode::DiscriminatedUnion {
                    discriminator,
                    cases,
                }
            }
            "intersection" => {
                let (left, right) = self.pair(next, path)?;
                BaseNode::Intersection(Box::new(left), Box::new(right))
            }
            "record" => {
                let (key, value) = if self.is_single_argument()? {
                    let value = self.schema(next, &format!("{}<value>", path))?;
                    (SchemaNode::new(BaseNode::String { coerce: false }), value)
                } else {
                    self.pair(next, path)?
                };
                BaseNode::Record {
                    key: Box::new(key),
                    value: Box::new(value),
                }
            }
            "map" => {
                let (key, value) = self.pair(next, path)?;
                BaseNode::Map {
                    key: Box::new(key),
                    value: Box::new(value),
                }
            }
            "function" => BaseNode::Function {
                args: Vec::new(),
                returns: Box::new(SchemaNode::new(BaseNode::Unknown)),
            },
            other => return Err(self.cursor.error(format!("unknown factory z.{}", other))),
        };
        self.cursor.eat(Punct::Comma);
        self.cursor.expect(Punct::RParen)?;
        Ok(base)
    }

    /// `z.record(value)` is the one-argument form of `z.record(z.string(), value)`
    fn is_single_argument(&self) -> Result<bool> {
        let mut lookahead = self.cursor.clone();
        let mut depth = 0usize;
        loop {
            match lookahead.advance() {
                TokenKind::Punct(Punct::LParen | Punct::LBracket | Punct::LBrace) => depth += 1,
                TokenKind::Punct(Punct::RParen | Punct::RBracket | Punct::RBrace) => {
                    if depth == 0 {
                        return Ok(true);
                    }
                    depth -= 1;
                }
                TokenKind::Punct(Punct::Comma) if depth == 0 => {
                    return Ok(matches!(lookahead.peek(), TokenKind::Punct(Punct::RParen)));
                }
                TokenKind::Eof => return Err(lookahead.unexpected("')'")),
                _ => {}
            }
        }
    }

    fn pair(&mut self, depth: usize, path: &str) -> Result<(SchemaNode, SchemaNode)> {
        let key = self.schema(depth, &format!("{}<key>", path))?;
        self.cursor.expect(Punct::Comma)?;
        let value = self.schema(depth, &format!("{}<value>", path))?;
        Ok((key, value))
    }

    /// `{ key: schema, ... }`
    fn shape(&mut self, depth: usize, path: &str) -> Result<Vec<(String, SchemaNode)>> {
        self.cursor.expect(Punct::LBrace)?;
        let mut object = ObjectNode::default();
        while !self.cursor.eat(Punct::RBrace) {
            let key = self.property_key()?;
            self.cursor.expect(Punct::Colon)?;
            let node = self.schema(depth, &child_path(path, &key))?;
            object.insert(key, node);
            self.list_separator(Punct::RBrace)?;
        }
        Ok(object.fields)
    }

    /// `[schema, ...]`
    fn schema_list(&mut self, depth: usize, path: &str) -> Result<Vec<SchemaNode>> {
        self.cursor.expect(Punct::LBracket)?;
        let mut items = Vec::new();
        while !self.cursor.eat(Punct::RBracket) {
            let item = self.schema(depth, &format!("{}[{}]", path, items.len()))?;
            items.push(item);
            self.list_separator(Punct::RBracket)?;
        }
        Ok(items)
    }

    /// Case objects sit at the union's own depth; their fields are one deeper
    fn cases(&mut self, discriminator: &str, depth: usize, path: &str) -> Result<Vec<CaseNode>> {
        self.cursor.expect(Punct::LBracket)?;
        let mut cases: Vec<CaseNode> = Vec::new();
        while !self.cursor.eat(Punct::RBracket) {
            self.cursor.expect_keyword("z")?;
            self.cursor.expect(Punct::Dot)?;
            self.cursor.expect_keyword("object")?;
            self.cursor.expect(Punct::LParen)?;
            let case_path = format!("{}<case {}>", path, cases.len());
            let mut fields = self.shape(depth + 1, &case_path)?;
            self.cursor.eat(Punct::Comma);
            self.cursor.expect(Punct::RParen)?;

            let index = fields.iter().position(|(key, _)| key == discriminator);
            let value = match index.map(|i| fields.remove(i)) {
                Some((_, SchemaNode { base: BaseNode::Literal(Literal::String(value)), ops, description }))
                    if ops.is_empty() && description.is_none() =>
                {
                    value
                }
                _ => {
                    return Err(self.cursor.error(format!(
                        "discriminated union case must declare `{}` as a string literal",
                        discriminator
                    )))
                }
            };
            if cases.iter().any(|case| case.value == value) {
                return Err(self.cursor.error(format!("duplicate discriminator value \"{}\"", value)));
            }
            cases.push(CaseNode { value, fields });
            self.list_separator(Punct::RBracket)?;
        }
        Ok(cases)
    }

    fn chain(&mut self, node: &mut SchemaNode, depth: usize, path: &str) -> Result<()> {
        while self.cursor.check(Punct::Dot) {
            if node.description.is_some() {
                return Err(self.cursor.error("describe must be the last call in a chain"));
            }
            self.cursor.advance();
            let method = self.cursor.expect_ident()?;
            if method == "brand" {
                self.cursor.expect(Punct::Lt)?;
                let brand = self.cursor.expect_string()?;
                self.cursor.expect(Punct::Gt)?;
                self.cursor.expect(Punct::LParen)?;
                self.cursor.expect(Punct::RParen)?;
                node.ops.push(RuleOp::Brand(brand));
                continue;
            }
            self.cursor.expect(Punct::LParen)?;
            if self.structural(node, &method, depth, path)? {
                self.cursor.expect(Punct::RParen)?;
                continue;
            }
            if method == "describe" {
                node.description = Some(self.cursor.expect_string()?);
                self.cursor.expect(Punct::RParen)?;
                continue;
            }
            let op = self.rule_op(&method, &node.base)?;
            self.cursor.expect(Punct::RParen)?;
            node.ops.push(op);
        }
        Ok(())
    }

    /// Methods that configure the base itself rather than add a rule
    fn structural(&mut self, node: &mut SchemaNode, method: &str, depth: usize, path: &str) -> Result<bool> {
        let next = depth + 1;
        let bare = node.ops.is_empty();
        match (&mut node.base, method) {
            (BaseNode::Object(object), "strict" | "passthrough" | "strip" | "catchall") if bare => {
                object.unknown_keys = match method {
                    "strict" => UnknownKeys::Strict,
                    "passthrough" => UnknownKeys::Passthrough,
                    "strip" => UnknownKeys::Strip,
                    _ => UnknownKeys::Catchall(Box::new(self.schema(next, &format!("{}<catchall>", path))?)),
                };
                Ok(true)
            }
            (BaseNode::Tuple { rest, .. }, "rest") if bare => {
                *rest = Some(Box::new(self.schema(next, &format!("{}<rest>", path))?));
                Ok(true)
            }
            (BaseNode::Function { args, .. }, "args") if bare => {
                args.clear();
                while !self.cursor.check(Punct::RParen) {
                    let arg = self.schema(next, &format!("{}<arg {}>", path, args.len()))?;
                    args.push(arg);
                    if !self.cursor.eat(Punct::Comma) {
                        break;
                    }
                }
                Ok(true)
            }
            (BaseNode::Function { returns, .. }, "returns") if bare => {
                **returns = self.schema(next, &format!("{}<returns>", path))?;
                Ok(true)
            }
            (_, "strict" | "passthrough" | "strip" | "catchall" | "rest" | "args" | "returns") => Err(self
                .cursor
                .error(format!(".{}() must directly follow its factory", method))),
            _ => Ok(false),
        }
    }

    fn rule_op(&mut self, method: &str, base: &BaseNode) -> Result<RuleOp> {
        if let Some(format) = StringFormat::from_method(method) {
            return Ok(RuleOp::Format(format, self.message_only()?));
        }
        let op = match method {
            "min" => {
                let bound = self.bound()?;
                RuleOp::Min(bound, self.trailing_message()?)
            }
            "max" => {
                let bound = self.bound()?;
                RuleOp::Max(bound, self.trailing_message()?)
            }
            "gt" => {
                let bound = self.bound()?;
                RuleOp::Gt(bound, self.trailing_message()?)
            }
            "lt" => {
                let bound = self.bound()?;
                RuleOp::Lt(bound, self.trailing_message()?)
            }
            "multipleOf" | "step" => {
                let bound = self.bound()?;
                RuleOp::MultipleOf(bound, self.trailing_message()?)
            }
            "length" | "size" => {
                let expected = if matches!(base, BaseNode::Set(_)) { "size" } else { "length" };
                if method != expected {
                    return Err(self.cursor.error(format!(".{}() is not available on z.{}", method, base.kind_name())));
                }
                let length = self.number()?;
                RuleOp::Length(length, self.trailing_message()?)
            }
            "regex" => {
                self.cursor.expect_keyword("new")?;
                self.cursor.expect_keyword("RegExp")?;
                self.cursor.expect(Punct::LParen)?;
                let pattern = self.cursor.expect_string()?;
                self.cursor.expect(Punct::RParen)?;
                RuleOp::Regex(pattern, self.trailing_message()?)
            }
            "includes" => {
                let needle = self.cursor.expect_string()?;
                RuleOp::Includes(needle, self.trailing_message()?)
            }
            "startsWith" => {
                let prefix = self.cursor.expect_string()?;
                RuleOp::StartsWith(prefix, self.trailing_message()?)
            }
            "endsWith" => {
                let suffix = self.cursor.expect_string()?;
                RuleOp::EndsWith(suffix, self.trailing_message()?)
            }
            "trim" => RuleOp::Trim,
            "toLowerCase" => RuleOp::ToLowerCase,
            "toUpperCase" => RuleOp::ToUpperCase,
            "datetime" => {
                let options = self.options()?;
                RuleOp::Datetime {
                    precision: match option(&options, "precision") {
                        Some(Literal::Number(n)) if *n >= 0.0 && *n <= u8::MAX as f64 && n.fract() == 0.0 => {
                            Some(*n as u8)
                        }
                        Some(Literal::Null) | None => None,
                        Some(_) => return Err(self.cursor.error("datetime precision must be a small integer")),
                    },
                    offset: matches!(option(&options, "offset"), Some(Literal::Bool(true))),
                    message: message_of(&options),
                }
            }
            "ip" => {
                let options = self.options()?;
                RuleOp::Ip {
                    version: match option(&options, "version") {
                        Some(Literal::String(v)) if v == "v4" => Some(IpVersion::V4),
                        Some(Literal::String(v)) if v == "v6" => Some(IpVersion::V6),
                        None => None,
                        Some(_) => return Err(self.cursor.error("ip version must be \"v4\" or \"v6\"")),
                    },
                    message: message_of(&options),
                }
            }
            "int" => RuleOp::Int(self.message_only()?),
            "positive" => RuleOp::Positive(self.message_only()?),
            "negative" => RuleOp::Negative(self.message_only()?),
            "nonpositive" => RuleOp::Nonpositive(self.message_only()?),
            "nonnegative" => RuleOp::Nonnegative(self.message_only()?),
            "finite" => RuleOp::Finite(self.message_only()?),
            "safe" => RuleOp::Safe(self.message_only()?),
            "nonempty" => RuleOp::Nonempty(self.message_only()?),
            "optional" => RuleOp::Optional,
            "nullable" => RuleOp::Nullable,
            "nullish" => RuleOp::Nullish,
            "readonly" => RuleOp::Readonly,
            "default" => RuleOp::Default(self.literal()?),
            "catch" => RuleOp::Catch(self.literal()?),
            "transform" => RuleOp::Transform(parse_arrow(&mut self.cursor)?),
            "refine" => {
                let expression = parse_arrow(&mut self.cursor)?;
                RuleOp::Refine(expression, self.trailing_message()?)
            }
            other => {
                return Err(self
                    .cursor
                    .error(format!("unknown method .{}() on z.{}", other, base.kind_name())))
            }
        };
        Ok(op)
    }

    fn bound(&mut self) -> Result<Bound> {
        match self.literal()? {
            Literal::Number(n) => Ok(Bound::Number(n)),
            Literal::BigInt(n) => Ok(Bound::BigInt(n)),
            Literal::Date(ms) => Ok(Bound::Date(ms)),
            _ => Err(self.cursor.error("expected a number, bigint or date bound")),
        }
    }

    fn number(&mut self) -> Result<f64> {
        match self.literal()? {
            Literal::Number(n) => Ok(n),
            _ => Err(self.cursor.error("expected a number")),
        }
    }

    /// `, { message: "…" }` before the closing parenthesis
    fn trailing_message(&mut self) -> Result<Message> {
        if !self.cursor.eat(Punct::Comma) || self.cursor.check(Punct::RParen) {
            return Ok(None);
        }
        self.message_only()
    }

    /// A lone optional `{ message: "…" }` argument
    fn message_only(&mut self) -> Result<Message> {
        let options = self.options()?;
        Ok(message_of(&options))
    }

    fn options(&mut self) -> Result<Vec<(String, Literal)>> {
        if self.cursor.check(Punct::RParen) {
            return Ok(Vec::new());
        }
        let options = match self.literal()? {
            Literal::Object(entries) => entries,
            Literal::String(message) => vec![("message".to_string(), Literal::String(message))],
            _ => return Err(self.cursor.error("expected an options object")),
        };
        self.cursor.eat(Punct::Comma);
        Ok(options)
    }

    /// Inverse of [`policy::render_literal`]
    pub fn literal(&mut self) -> Result<Literal> {
        match self.cursor.peek().clone() {
            TokenKind::Punct(Punct::Minus) => {
                self.cursor.advance();
                match self.cursor.advance() {
                    TokenKind::Num(n) => Ok(Literal::Number(-n)),
                    TokenKind::BigInt(n) => Ok(Literal::BigInt(-n)),
                    TokenKind::Ident(name) if name == "Infinity" => Ok(Literal::Number(f64::NEG_INFINITY)),
                    _ => Err(self.cursor.error("expected a number after '-'")),
                }
            }
            TokenKind::Num(n) => {
                self.cursor.advance();
                Ok(Literal::Number(n))
            }
            TokenKind::BigInt(n) => {
                self.cursor.advance();
                Ok(Literal::BigInt(n))
            }
            TokenKind::Str(s) => {
                self.cursor.advance();
                Ok(Literal::String(s))
            }
            TokenKind::Punct(Punct::LBracket) => {
                self.cursor.advance();
                let mut items = Vec::new();
                while !self.cursor.eat(Punct::RBracket) {
                    items.push(self.literal()?);
                    self.list_separator(Punct::RBracket)?;
                }
                Ok(Literal::Array(items))
            }
            TokenKind::Punct(Punct::LBrace) => {
                self.cursor.advance();
                let mut entries: Vec<(String, Literal)> = Vec::new();
                while !self.cursor.eat(Punct::RBrace) {
                    let key = self.property_key()?;
                    self.cursor.expect(Punct::Colon)?;
                    let value = self.literal()?;
                    match entries.iter_mut().find(|(existing, _)| *existing == key) {
                        Some(slot) => slot.1 = value,
                        None => entries.push((key, value)),
                    }
                    self.list_separator(Punct::RBrace)?;
                }
                Ok(Literal::Object(entries))
            }
            TokenKind::Ident(name) => {
                self.cursor.advance();
                match name.as_str() {
                    "undefined" => Ok(Literal::Undefined),
                    "null" => Ok(Literal::Null),
                    "true" => Ok(Literal::Bool(true)),
                    "false" => Ok(Literal::Bool(false)),
                    "NaN" => Ok(Literal::Number(f64::NAN)),
                    "Infinity" => Ok(Literal::Number(f64::INFINITY)),
                    "new" => {
                        self.cursor.expect_keyword("Date")?;
                        self.cursor.expect(Punct::LParen)?;
                        let ms = match self.literal()? {
                            Literal::String(iso) => parse_date(&iso),
                            Literal::Number(ms) => ms,
                            _ => return Err(self.cursor.error("expected a date string or timestamp")),
                        };
                        self.cursor.expect(Punct::RParen)?;
                        Ok(Literal::Date(ms))
                    }
                    other => Err(self.cursor.error(format!("unexpected identifier '{}' in a constant", other))),
                }
            }
            _ => Err(self.cursor.unexpected("a constant")),
        }
    }

    /// `name`, `"quoted name"` or computed `["name"]`
    fn property_key(&mut self) -> Result<String> {
        match self.cursor.peek().clone() {
            TokenKind::Ident(name) => {
                self.cursor.advance();
                Ok(name)
            }
            TokenKind::Str(name) => {
                self.cursor.advance();
                Ok(name)
            }
            TokenKind::Num(n) => {
                self.cursor.advance();
                Ok(crate::value::format_number(n))
            }
            TokenKind::Punct(Punct::LBracket) => {
                self.cursor.advance();
                let name = self.cursor.expect_string()?;
                self.cursor.expect(Punct::RBracket)?;
                Ok(name)
            }
            _ => Err(self.cursor.unexpected("property name")),
        }
    }

    /// After a list item: a comma, or the closing token left for the caller
    fn list_separator(&mut self, close: Punct) -> Result<()> {
        if self.cursor.eat(Punct::Comma) || self.cursor.check(close) {
            Ok(())
        } else {
            Err(self.cursor.unexpected(&format!("',' or '{}'", close.as_str())))
        }
    }
}

fn option<'a>(options: &'a [(String, Literal)], key: &str) -> Option<&'a Literal> {
    options.iter().find(|(k, _)| k == key).map(|(_, v)| v)
}

fn message_of(options: &[(String, Literal)]) -> Message {
    option(options, "message").and_then(Literal::as_str).map(str::to_string)
}

fn child_path(parent: &str, key: &str) -> String {
    if policy::is_js_identifier(key) {
        format!("{}.{}", parent, key)
    } else {
        format!("{}[{}]", parent, policy::quote_js_string(key))
    }
}
