//! Lowered schema form shared by both backends
//!
//! Lowering resolves every fallback, drops every skipped rule and parses
//! every payload once. What remains is a tree of [`SchemaNode`]s: a base
//! validator, the ordered rule ops to fold over it, and an optional
//! description. The interpreter and the emitter both consume this tree
//! through [`crate::backend::Backend`], and the source reader produces it
//! from emitted text.
//!
//! Copyright (c) 2025 Fieldsmith Team
//! Licensed under the Apache-2.0 license

use crate::expr::Expression;
use crate::model::IpVersion;
use crate::value::{Object, Value};
use serde_json::Value as Json;

/// Custom error text attached to a rule
pub type Message = Option<String>;

/// One lowered field: base, ordered ops, description
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub base: BaseNode,
    pub ops: Vec<RuleOp>,
    pub description: Option<String>,
}

impl SchemaNode {
    pub fn new(base: BaseNode) -> Self {
        Self {
            base,
            ops: Vec::new(),
            description: None,
        }
    }

    pub fn with_op(mut self, op: RuleOp) -> Self {
        self.ops.push(op);
        self
    }

    pub fn any() -> Self {
        Self::new(BaseNode::Any)
    }

    /// Whether no universal wrapper has been applied yet
    pub fn is_bare(&self) -> bool {
        self.ops.iter().all(|op| !op.is_wrapper())
    }

    /// Number of nodes in this subtree
    pub fn size(&self) -> usize {
        1 + self.base.children().map(SchemaNode::size).sum::<usize>()
    }
}

/// The unconfigured validator a node starts from
#[derive(Debug, Clone, PartialEq)]
pub enum BaseNode {
    String { coerce: bool },
    Number { coerce: bool },
    BigInt { coerce: bool },
    Boolean { coerce: bool },
    Date { coerce: bool },
    Symbol,
    Undefined,
    Null,
    Void,
    Any,
    Unknown,
    Never,
    NaN,
    Literal(Literal),
    Enum(Vec<String>),
    NativeEnum(Vec<(String, Literal)>),
    Object(ObjectNode),
    Array(Box<SchemaNode>),
    Tuple {
        items: Vec<SchemaNode>,
        rest: Option<Box<SchemaNode>>,
    },
    Union(Vec<SchemaNode>),
    DiscriminatedUnion {
        discriminator: String,
        cases: Vec<CaseNode>,
    },
    Intersection(Box<SchemaNode>, Box<SchemaNode>),
    Record {
        key: Box<SchemaNode>,
        value: Box<SchemaNode>,
    },
    Map {
        key: Box<SchemaNode>,
        value: Box<SchemaNode>,
    },
    Set(Box<SchemaNode>),
    Function {
        args: Vec<SchemaNode>,
        returns: Box<SchemaNode>,
    },
    Promise(Box<SchemaNode>),
}

impl BaseNode {
    /// Direct child nodes in declaration order
    pub fn children(&self) -> Box<dyn Iterator<Item = &SchemaNode> + '_> {
        match self {
            BaseNode::Object(object) => Box::new(object.children()),
            BaseNode::Array(item) | BaseNode::Set(item) | BaseNode::Promise(item) => {
                Box::new(std::iter::once(item.as_ref()))
            }
            BaseNode::Tuple { items, rest } => {
                Box::new(items.iter().chain(rest.iter().map(|r| r.as_ref())))
            }
            BaseNode::Union(members) => Box::new(members.iter()),
            BaseNode::DiscriminatedUnion { cases, .. } => {
                Box::new(cases.iter().flat_map(|case| case.fields.iter().map(|(_, n)| n)))
            }
            BaseNode::Intersection(left, right) => {
                Box::new([left.as_ref(), right.as_ref()].into_iter())
            }
            BaseNode::Record { key, value } | BaseNode::Map { key, value } => {
                Box::new([key.as_ref(), value.as_ref()].into_iter())
            }
            BaseNode::Function { args, returns } => {
                Box::new(args.iter().chain(std::iter::once(returns.as_ref())))
            }
            _ => Box::new(std::iter::empty()),
        }
    }

    /// Short name used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            BaseNode::String { .. } => "string",
            BaseNode::Number { .. } => "number",
            BaseNode::BigInt { .. } => "bigint",
            BaseNode::Boolean { .. } => "boolean",
            BaseNode::Date { .. } => "date",
            BaseNode::Symbol => "symbol",
            BaseNode::Undefined => "undefined",
            BaseNode::Null => "null",
            BaseNode::Void => "void",
            BaseNode::Any => "any",
            BaseNode::Unknown => "unknown",
            BaseNode::Never => "never",
            BaseNode::NaN => "nan",
            BaseNode::Literal(_) => "literal",
            BaseNode::Enum(_) => "enum",
            BaseNode::NativeEnum(_) => "nativeEnum",
            BaseNode::Object(_) => "object",
            BaseNode::Array(_) => "array",
            BaseNode::Tuple { .. } => "tuple",
            BaseNode::Union(_) => "union",
            BaseNode::DiscriminatedUnion { .. } => "discriminatedUnion",
            BaseNode::Intersection(..) => "intersection",
            BaseNode::Record { .. } => "record",
            BaseNode::Map { .. } => "map",
            BaseNode::Set(_) => "set",
            BaseNode::Function { .. } => "function",
            BaseNode::Promise(_) => "promise",
        }
    }
}

/// What an object does with keys it does not declare
#[derive(Debug, Clone, PartialEq, Default)]
pub enum UnknownKeys {
    #[default]
    Strip,
    Strict,
    Passthrough,
    Catchall(Box<SchemaNode>),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectNode {
    /// Unique keys in first-declaration order
    pub fields: Vec<(String, SchemaNode)>,
    pub unknown_keys: UnknownKeys,
}

impl ObjectNode {
    pub fn new(fields: Vec<(String, SchemaNode)>) -> Self {
        Self {
            fields,
            unknown_keys: UnknownKeys::Strip,
        }
    }

    /// Insert a field; a repeated key replaces the value but keeps its position
    pub fn insert(&mut self, key: String, node: SchemaNode) -> bool {
        match self.fields.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => {
                slot.1 = node;
                false
            }
            None => {
                self.fields.push((key, node));
                true
            }
        }
    }

    pub fn children(&self) -> impl Iterator<Item = &SchemaNode> {
        self.fields
            .iter()
            .map(|(_, node)| node)
            .chain(match &self.unknown_keys {
                UnknownKeys::Catchall(node) => Some(node.as_ref()),
                _ => None,
            })
    }
}

/// One alternative of a discriminated union
///
/// The discriminator field itself is not part of `fields`; both backends
/// prepend it as a string literal of `value`.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseNode {
    pub value: String,
    pub fields: Vec<(String, SchemaNode)>,
}

/// Threshold of a bound rule, typed by the base it applies to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Number(f64),
    BigInt(i128),
    /// Epoch milliseconds
    Date(f64),
}

/// Named string format checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    Email,
    Url,
    Uuid,
    Cuid,
    Cuid2,
    Ulid,
    Emoji,
    Base64,
}

impl StringFormat {
    pub const ALL: [StringFormat; 8] = [
        StringFormat::Email,
        StringFormat::Url,
        StringFormat::Uuid,
        StringFormat::Cuid,
        StringFormat::Cuid2,
        StringFormat::Ulid,
        StringFormat::Emoji,
        StringFormat::Base64,
    ];

    /// Method name in emitted source
    pub fn method(self) -> &'static str {
        match self {
            StringFormat::Email => "email",
            StringFormat::Url => "url",
            StringFormat::Uuid => "uuid",
            StringFormat::Cuid => "cuid",
            StringFormat::Cuid2 => "cuid2",
            StringFormat::Ulid => "ulid",
            StringFormat::Emoji => "emoji",
            StringFormat::Base64 => "base64",
        }
    }

    pub fn from_method(name: &str) -> Option<Self> {
        StringFormat::ALL.into_iter().find(|f| f.method() == name)
    }
}

/// One lowered rule, applied left to right over the base
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOp {
    Min(Bound, Message),
    Max(Bound, Message),
    Length(f64, Message),
    Gt(Bound, Message),
    Lt(Bound, Message),
    MultipleOf(Bound, Message),
    Regex(String, Message),
    Format(StringFormat, Message),
    Includes(String, Message),
    StartsWith(String, Message),
    EndsWith(String, Message),
    Trim,
    ToLowerCase,
    ToUpperCase,
    Datetime {
        precision: Option<u8>,
        offset: bool,
        message: Message,
    },
    Ip {
        version: Option<IpVersion>,
        message: Message,
    },
    Int(Message),
    Positive(Message),
    Negative(Message),
    Nonpositive(Message),
    Nonnegative(Message),
    Finite(Message),
    Safe(Message),
    Nonempty(Message),
    Optional,
    Nullable,
    Nullish,
    Default(Literal),
    Catch(Literal),
    Transform(Expression),
    Refine(Expression, Message),
    Brand(String),
    Readonly,
}

impl RuleOp {
    /// Universal ops wrap the validator; type-specific ops after one are skipped
    pub fn is_wrapper(&self) -> bool {
        matches!(
            self,
            RuleOp::Optional
                | RuleOp::Nullable
                | RuleOp::Nullish
                | RuleOp::Default(_)
                | RuleOp::Catch(_)
                | RuleOp::Transform(_)
                | RuleOp::Refine(..)
                | RuleOp::Brand(_)
                | RuleOp::Readonly
        )
    }
}

/// A constant embedded in a schema: literal members, defaults, catch values
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    BigInt(i128),
    String(String),
    /// Epoch milliseconds; NaN is an invalid date
    Date(f64),
    Array(Vec<Literal>),
    Object(Vec<(String, Literal)>),
}

impl Literal {
    /// Plain JSON into a literal
    pub fn from_json(json: &Json) -> Self {
        match json {
            Json::Null => Literal::Null,
            Json::Bool(b) => Literal::Bool(*b),
            Json::Number(n) => Literal::Number(n.as_f64().unwrap_or(f64::NAN)),
            Json::String(s) => Literal::String(s.clone()),
            Json::Array(items) => Literal::Array(items.iter().map(Literal::from_json).collect()),
            Json::Object(map) => Literal::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Literal::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// The runtime value this literal evaluates to
    pub fn to_value(&self) -> Value {
        match self {
            Literal::Undefined => Value::Undefined,
            Literal::Null => Value::Null,
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Number(n) => Value::Number(*n),
            Literal::BigInt(n) => Value::BigInt(*n),
            Literal::String(s) => Value::String(s.clone()),
            Literal::Date(ms) => Value::Date(*ms),
            Literal::Array(items) => Value::Array(items.iter().map(Literal::to_value).collect()),
            Literal::Object(entries) => {
                let mut object = Object::new();
                for (key, value) in entries {
                    object.insert(key.clone(), value.to_value());
                }
                Value::Object(object)
            }
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::String(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_insert_keeps_first_position() {
        let mut object = ObjectNode::default();
        assert!(object.insert("a".into(), SchemaNode::new(BaseNode::String { coerce: false })));
        assert!(object.insert("b".into(), SchemaNode::any()));
        assert!(!object.insert("a".into(), SchemaNode::new(BaseNode::Null)));
        assert_eq!(object.fields.len(), 2);
        assert_eq!(object.fields[0].0, "a");
        assert_eq!(object.fields[0].1.base, BaseNode::Null);
    }

    #[test]
    fn test_wrappers_end_bare_surface() {
        let node = SchemaNode::new(BaseNode::String { coerce: false })
            .with_op(RuleOp::Trim)
            .with_op(RuleOp::Min(Bound::Number(3.0), None));
        assert!(node.is_bare());
        assert!(!node.with_op(RuleOp::Optional).is_bare());
    }

    #[test]
    fn test_literal_from_json() {
        let literal = Literal::from_json(&json!({ "b": [1, null], "a": "x" }));
        let value = literal.to_value();
        assert_eq!(value.get("a"), Some(&Value::from("x")));
        assert_eq!(
            value.get("b"),
            Some(&Value::Array(vec![Value::Number(1.0), Value::Null]))
        );
    }

    #[test]
    fn test_size_counts_nested_nodes() {
        let node = SchemaNode::new(BaseNode::Object(ObjectNode::new(vec![
            ("a".into(), SchemaNode::any()),
            (
                "b".into(),
                SchemaNode::new(BaseNode::Array(Box::new(SchemaNode::any()))),
            ),
        ])));
        assert_eq!(node.size(), 4);
    }
}
