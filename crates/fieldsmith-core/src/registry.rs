//! Type Registry
//!
//! The single source of truth for which rule kinds each type accepts, what
//! parameters a freshly created field starts with, and which tags honor the
//! `coerce` flag. Lowering consults [`is_applicable`] before a rule reaches
//! either backend, so the backends never disagree about skipping.
//!
//! Copyright (c) 2025 Fieldsmith Team
//! Licensed under the Apache-2.0 license

use crate::model::{
    ArrayParams, FieldKind, FunctionParams, KeyValueParams, PromiseParams, RuleKind, SetParams,
    TypeRef, TypeTag, UnionParams,
};
use crate::policy;
use serde::Serialize;

static STRING_RULES: &[RuleKind] = &[
    RuleKind::Min,
    RuleKind::Max,
    RuleKind::Length,
    RuleKind::Pattern,
    RuleKind::Email,
    RuleKind::Url,
    RuleKind::Uuid,
    RuleKind::Cuid,
    RuleKind::Cuid2,
    RuleKind::Ulid,
    RuleKind::Emoji,
    RuleKind::Base64,
    RuleKind::Includes,
    RuleKind::StartsWith,
    RuleKind::EndsWith,
    RuleKind::Trim,
    RuleKind::ToLowerCase,
    RuleKind::ToUpperCase,
    RuleKind::Datetime,
    RuleKind::Ip,
    RuleKind::Nonempty,
];

static NUMBER_RULES: &[RuleKind] = &[
    RuleKind::Min,
    RuleKind::Max,
    RuleKind::Gt,
    RuleKind::Lt,
    RuleKind::Int,
    RuleKind::Positive,
    RuleKind::Negative,
    RuleKind::Nonpositive,
    RuleKind::Nonnegative,
    RuleKind::MultipleOf,
    RuleKind::Finite,
    RuleKind::Safe,
];

static BIGINT_RULES: &[RuleKind] = &[
    RuleKind::Min,
    RuleKind::Max,
    RuleKind::Gt,
    RuleKind::Lt,
    RuleKind::Positive,
    RuleKind::Negative,
    RuleKind::Nonpositive,
    RuleKind::Nonnegative,
    RuleKind::MultipleOf,
];

static DATE_RULES: &[RuleKind] = &[RuleKind::Min, RuleKind::Max];

static COLLECTION_RULES: &[RuleKind] = &[
    RuleKind::Min,
    RuleKind::Max,
    RuleKind::Length,
    RuleKind::Nonempty,
];

/// Rule kinds specific to `tag`, excluding the universal wrappers
pub fn type_specific_rules(tag: TypeTag) -> &'static [RuleKind] {
    match tag {
        TypeTag::String => STRING_RULES,
        TypeTag::Number => NUMBER_RULES,
        TypeTag::BigInt => BIGINT_RULES,
        TypeTag::Date => DATE_RULES,
        TypeTag::Array | TypeTag::Set => COLLECTION_RULES,
        TypeTag::Boolean
        | TypeTag::Symbol
        | TypeTag::Undefined
        | TypeTag::Null
        | TypeTag::Void
        | TypeTag::Any
        | TypeTag::Unknown
        | TypeTag::Never
        | TypeTag::NaN
        | TypeTag::Literal
        | TypeTag::Enum
        | TypeTag::NativeEnum
        | TypeTag::Object
        | TypeTag::Tuple
        | TypeTag::Union
        | TypeTag::DiscriminatedUnion
        | TypeTag::Intersection
        | TypeTag::Record
        | TypeTag::Map
        | TypeTag::Function
        | TypeTag::Promise => &[],
    }
}

/// Every rule kind `tag` accepts, universal wrappers last
pub fn applicable_rules(tag: TypeTag) -> Vec<RuleKind> {
    type_specific_rules(tag)
        .iter()
        .cloned()
        .chain(RuleKind::UNIVERSAL)
        .collect()
}

/// Whether a rule of `kind` may apply to a field validating as `tag`
pub fn is_applicable(tag: TypeTag, kind: &RuleKind) -> bool {
    kind.is_universal() || type_specific_rules(tag).contains(kind)
}

/// Parameters a newly created field of `tag` starts with
pub fn default_kind(tag: TypeTag) -> FieldKind {
    let string_ref = || Some(TypeRef::tag(TypeTag::String));
    let any_ref = || Some(TypeRef::tag(policy::DEFAULT_ELEMENT_TAG));
    match tag {
        TypeTag::String => FieldKind::String(Default::default()),
        TypeTag::Number => FieldKind::Number,
        TypeTag::BigInt => FieldKind::BigInt,
        TypeTag::Boolean => FieldKind::Boolean,
        TypeTag::Date => FieldKind::Date,
        TypeTag::Symbol => FieldKind::Symbol,
        TypeTag::Undefined => FieldKind::Undefined,
        TypeTag::Null => FieldKind::Null,
        TypeTag::Void => FieldKind::Void,
        TypeTag::Any => FieldKind::Any,
        TypeTag::Unknown => FieldKind::Unknown,
        TypeTag::Never => FieldKind::Never,
        TypeTag::NaN => FieldKind::NaN,
        TypeTag::Literal => FieldKind::Literal(Default::default()),
        TypeTag::Enum => FieldKind::Enum(Default::default()),
        TypeTag::NativeEnum => FieldKind::NativeEnum(Default::default()),
        TypeTag::Object => FieldKind::Object(Default::default()),
        TypeTag::Array => FieldKind::Array(ArrayParams {
            element_type: any_ref(),
            ..Default::default()
        }),
        TypeTag::Tuple => FieldKind::Tuple(ArrayParams {
            is_tuple: true,
            ..Default::default()
        }),
        TypeTag::Union => FieldKind::Union(UnionParams {
            types: policy::DEFAULT_UNION_MEMBERS.iter().copied().map(TypeRef::tag).collect(),
            ..Default::default()
        }),
        TypeTag::DiscriminatedUnion => FieldKind::DiscriminatedUnion(UnionParams {
            is_discriminated: true,
            discriminator: policy::DEFAULT_DISCRIMINATOR.to_string(),
            ..Default::default()
        }),
        TypeTag::Intersection => FieldKind::Intersection(Default::default()),
        TypeTag::Record => FieldKind::Record(KeyValueParams {
            key_type: string_ref(),
            value_type: any_ref(),
        }),
        TypeTag::Map => FieldKind::Map(KeyValueParams {
            key_type: string_ref(),
            value_type: any_ref(),
        }),
        TypeTag::Set => FieldKind::Set(SetParams {
            value_type: any_ref(),
        }),
        TypeTag::Function => FieldKind::Function(FunctionParams {
            parameters: Vec::new(),
            return_type: Some(TypeRef::tag(policy::DEFAULT_RETURN_TAG)),
        }),
        TypeTag::Promise => FieldKind::Promise(PromiseParams { value_type: any_ref() }),
    }
}

/// Whether the base validator for `tag` honors the `coerce` flag
pub fn supports_coercion(tag: TypeTag) -> bool {
    tag.supports_coercion()
}

/// Grouping used by the builder palette
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeCategory {
    Primitive,
    Literal,
    Structural,
    Composite,
}

pub fn category(tag: TypeTag) -> TypeCategory {
    match tag {
        TypeTag::String
        | TypeTag::Number
        | TypeTag::BigInt
        | TypeTag::Boolean
        | TypeTag::Date
        | TypeTag::Symbol
        | TypeTag::Undefined
        | TypeTag::Null
        | TypeTag::Void
        | TypeTag::Any
        | TypeTag::Unknown
        | TypeTag::Never
        | TypeTag::NaN => TypeCategory::Primitive,
        TypeTag::Literal | TypeTag::Enum | TypeTag::NativeEnum => TypeCategory::Literal,
        TypeTag::Object
        | TypeTag::Array
        | TypeTag::Tuple
        | TypeTag::Record
        | TypeTag::Map
        | TypeTag::Set => TypeCategory::Structural,
        TypeTag::Union
        | TypeTag::DiscriminatedUnion
        | TypeTag::Intersection
        | TypeTag::Function
        | TypeTag::Promise => TypeCategory::Composite,
    }
}

pub fn label(tag: TypeTag) -> &'static str {
    match tag {
        TypeTag::String => "Text value",
        TypeTag::Number => "Floating point number",
        TypeTag::BigInt => "Arbitrary precision integer",
        TypeTag::Boolean => "True or false",
        TypeTag::Date => "Date instance",
        TypeTag::Symbol => "Symbol",
        TypeTag::Undefined => "Exactly undefined",
        TypeTag::Null => "Exactly null",
        TypeTag::Void => "No value (undefined)",
        TypeTag::Any => "Anything, unchecked",
        TypeTag::Unknown => "Anything, must be narrowed",
        TypeTag::Never => "Nothing is accepted",
        TypeTag::NaN => "Not-a-number",
        TypeTag::Literal => "One exact value",
        TypeTag::Enum => "One of a list of strings",
        TypeTag::NativeEnum => "One value of a key/value enum",
        TypeTag::Object => "Object with named fields",
        TypeTag::Array => "List of one element type",
        TypeTag::Tuple => "Fixed-length positional list",
        TypeTag::Union => "Any one of several types",
        TypeTag::DiscriminatedUnion => "Tagged alternatives",
        TypeTag::Intersection => "All of several types",
        TypeTag::Record => "Object with uniform values",
        TypeTag::Map => "Map of keys to values",
        TypeTag::Set => "Set of unique values",
        TypeTag::Function => "Function signature",
        TypeTag::Promise => "Promise of a value",
    }
}

/// Catalog entry for one tag
#[derive(Debug, Clone, Serialize)]
pub struct TypeInfo {
    pub tag: TypeTag,
    pub label: &'static str,
    pub category: TypeCategory,
    pub coercible: bool,
    pub rules: Vec<String>,
}

impl TypeInfo {
    pub fn for_tag(tag: TypeTag) -> Self {
        Self {
            tag,
            label: label(tag),
            category: category(tag),
            coercible: supports_coercion(tag),
            rules: applicable_rules(tag)
                .iter()
                .map(|kind| kind.as_str().to_string())
                .collect(),
        }
    }
}

/// The whole catalog in tag order
pub fn catalog() -> Vec<TypeInfo> {
    TypeTag::ALL.into_iter().map(TypeInfo::for_tag).collect()
}
