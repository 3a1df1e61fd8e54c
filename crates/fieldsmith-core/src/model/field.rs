//! Field specifications and their type-specific parameters
//!
//! On the wire a field is a flat record with an open `params` bag. In memory
//! the bag is parsed into a [`FieldKind`], a sum type with one variant per
//! type tag carrying exactly the parameters that tag reads. Conversion goes
//! through [`RawField`] so a malformed bag degrades to defaults instead of
//! failing the whole document.
//!
//! Copyright (c) 2025 Fieldsmith Team
//! Licensed under the Apache-2.0 license

use super::rule::{RuleKind, ValidationRule};
use super::serde_util::{lenient_bool, lenient_opt_string, lenient_string, string_list};
use super::tag::TypeTag;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as Json;
use std::collections::BTreeMap;
use tracing::debug;

/// One node of the field specification tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawField", into = "RawField")]
pub struct FieldSpec {
    pub id: String,
    pub name: String,
    pub kind: FieldKind,
    pub common: CommonParams,
    pub validations: Vec<ValidationRule>,
    /// Fields of an object, or of an array's object element
    pub children: Vec<FieldSpec>,
}

/// Parameters every tag accepts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommonParams {
    /// Honored only by tags whose base validator can coerce
    #[serde(deserialize_with = "lenient_bool", skip_serializing_if = "is_false")]
    pub coerce: bool,
    #[serde(deserialize_with = "lenient_opt_string", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Type tag plus the parameters that tag reads
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    String(StringParams),
    Number,
    BigInt,
    Boolean,
    Date,
    Symbol,
    Undefined,
    Null,
    Void,
    Any,
    Unknown,
    Never,
    NaN,
    Literal(LiteralParams),
    Enum(EnumParams),
    NativeEnum(NativeEnumParams),
    Object(ObjectParams),
    Array(ArrayParams),
    Tuple(ArrayParams),
    Union(UnionParams),
    DiscriminatedUnion(UnionParams),
    Intersection(IntersectionParams),
    Record(KeyValueParams),
    Map(KeyValueParams),
    Set(SetParams),
    Function(FunctionParams),
    Promise(PromiseParams),
    /// A tag outside the catalog, kept verbatim; validates as `any`
    Unrecognized { tag: String, params: Json },
}

/// Reference to an element/member type: a bare tag or a full nested field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeRef {
    Tag(String),
    Field(Box<FieldSpec>),
}

impl TypeRef {
    pub fn tag(tag: TypeTag) -> Self {
        TypeRef::Tag(tag.as_str().to_string())
    }

    pub fn field(field: FieldSpec) -> Self {
        TypeRef::Field(Box::new(field))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StringParams {
    #[serde(skip_serializing_if = "DatetimeParams::is_default")]
    pub datetime: DatetimeParams,
    #[serde(skip_serializing_if = "IpParams::is_default")]
    pub ip: IpParams,
}

/// Options consulted by the `datetime` rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DatetimeParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u8>,
    #[serde(deserialize_with = "lenient_bool", skip_serializing_if = "is_false")]
    pub offset: bool,
}

impl DatetimeParams {
    fn is_default(&self) -> bool {
        self == &Self::default()
    }
}

/// Options consulted by the `ip` rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IpParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<IpVersion>,
}

impl IpParams {
    fn is_default(&self) -> bool {
        self.version.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpVersion {
    V4,
    V6,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LiteralParams {
    pub value: Json,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnumParams {
    #[serde(deserialize_with = "string_list")]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NativeEnumParams {
    #[serde(deserialize_with = "entry_list")]
    pub entries: Vec<NativeEnumEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NativeEnumEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub key: String,
    pub value: Json,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObjectParams {
    #[serde(deserialize_with = "lenient_bool", skip_serializing_if = "is_false")]
    pub strict: bool,
    #[serde(deserialize_with = "lenient_bool", skip_serializing_if = "is_false")]
    pub passthrough: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catchall: Option<TypeRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArrayParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_type: Option<TypeRef>,
    #[serde(deserialize_with = "lenient_bool", skip_serializing_if = "is_false")]
    pub is_tuple: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tuple_types: Vec<TypeRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rest: Option<TypeRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UnionParams {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<TypeRef>,
    #[serde(deserialize_with = "lenient_bool", skip_serializing_if = "is_false")]
    pub is_discriminated: bool,
    #[serde(deserialize_with = "lenient_string", skip_serializing_if = "String::is_empty")]
    pub discriminator: String,
    #[serde(deserialize_with = "case_list", skip_serializing_if = "Vec::is_empty")]
    pub cases: Vec<UnionCase>,
}

/// One alternative of a discriminated union
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnionCase {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    /// Discriminator value; blank means the case name
    #[serde(deserialize_with = "lenient_string")]
    pub value: String,
    pub fields: Vec<FieldSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IntersectionParams {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<TypeRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KeyValueParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_type: Option<TypeRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_type: Option<TypeRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SetParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_type: Option<TypeRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FunctionParams {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<FunctionParam>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<TypeRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FunctionParam {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    #[serde(deserialize_with = "lenient_bool", skip_serializing_if = "is_false")]
    pub optional: bool,
}

impl Default for FunctionParam {
    fn default() -> Self {
        Self {
            name: String::new(),
            type_ref: TypeRef::tag(TypeTag::Any),
            optional: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PromiseParams {
    #[serde(alias = "type", alias = "innerType", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<TypeRef>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn case_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<UnionCase>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Cases {
        List(Vec<UnionCase>),
        Map(BTreeMap<String, Vec<FieldSpec>>),
        Other(Json),
    }
    Ok(match Cases::deserialize(deserializer)? {
        Cases::List(cases) => cases,
        Cases::Map(map) => map
            .into_iter()
            .map(|(name, fields)| UnionCase {
                id: name.clone(),
                value: name.clone(),
                name,
                fields,
            })
            .collect(),
        Cases::Other(other) => {
            debug!(value = %other, "union cases are neither a list nor a map, ignoring");
            Vec::new()
        }
    })
}

fn entry_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<NativeEnumEntry>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Entries {
        List(Vec<NativeEnumEntry>),
        Map(serde_json::Map<String, Json>),
        Other(Json),
    }
    Ok(match Entries::deserialize(deserializer)? {
        Entries::List(entries) => entries,
        Entries::Map(map) => map
            .into_iter()
            .map(|(key, value)| NativeEnumEntry { key, value })
            .collect(),
        Entries::Other(other) => {
            debug!(value = %other, "enum entries are neither a list nor a map, ignoring");
            Vec::new()
        }
    })
}

fn typed<T: DeserializeOwned + Default>(tag: &str, params: &Json) -> T {
    if params.is_null() {
        return T::default();
    }
    serde_json::from_value(params.clone()).unwrap_or_else(|err| {
        debug!(tag, error = %err, "malformed params, using defaults");
        T::default()
    })
}

impl FieldKind {
    /// Parse a wire tag and params bag; never fails
    pub fn from_parts(tag: &str, params: &Json) -> Self {
        match TypeTag::parse(tag) {
            Some(TypeTag::String) => FieldKind::String(typed(tag, params)),
            Some(TypeTag::Number) => FieldKind::Number,
            Some(TypeTag::BigInt) => FieldKind::BigInt,
            Some(TypeTag::Boolean) => FieldKind::Boolean,
            Some(TypeTag::Date) => FieldKind::Date,
            Some(TypeTag::Symbol) => FieldKind::Symbol,
            Some(TypeTag::Undefined) => FieldKind::Undefined,
            Some(TypeTag::Null) => FieldKind::Null,
            Some(TypeTag::Void) => FieldKind::Void,
            Some(TypeTag::Any) => FieldKind::Any,
            Some(TypeTag::Unknown) => FieldKind::Unknown,
            Some(TypeTag::Never) => FieldKind::Never,
            Some(TypeTag::NaN) => FieldKind::NaN,
            Some(TypeTag::Literal) => FieldKind::Literal(typed(tag, params)),
            Some(TypeTag::Enum) => FieldKind::Enum(typed(tag, params)),
            Some(TypeTag::NativeEnum) => FieldKind::NativeEnum(typed(tag, params)),
            Some(TypeTag::Object) => FieldKind::Object(typed(tag, params)),
            Some(TypeTag::Array) => FieldKind::Array(typed(tag, params)),
            Some(TypeTag::Tuple) => FieldKind::Tuple(typed(tag, params)),
            Some(TypeTag::Union) => FieldKind::Union(typed(tag, params)),
            Some(TypeTag::DiscriminatedUnion) => FieldKind::DiscriminatedUnion(typed(tag, params)),
            Some(TypeTag::Intersection) => FieldKind::Intersection(typed(tag, params)),
            Some(TypeTag::Record) => FieldKind::Record(typed(tag, params)),
            Some(TypeTag::Map) => FieldKind::Map(typed(tag, params)),
            Some(TypeTag::Set) => FieldKind::Set(typed(tag, params)),
            Some(TypeTag::Function) => FieldKind::Function(typed(tag, params)),
            Some(TypeTag::Promise) => FieldKind::Promise(typed(tag, params)),
            None => FieldKind::Unrecognized {
                tag: tag.to_string(),
                params: params.clone(),
            },
        }
    }

    /// The declared tag; `None` for a tag outside the catalog
    pub fn tag(&self) -> Option<TypeTag> {
        Some(match self {
            FieldKind::String(_) => TypeTag::String,
            FieldKind::Number => TypeTag::Number,
            FieldKind::BigInt => TypeTag::BigInt,
            FieldKind::Boolean => TypeTag::Boolean,
            FieldKind::Date => TypeTag::Date,
            FieldKind::Symbol => TypeTag::Symbol,
            FieldKind::Undefined => TypeTag::Undefined,
            FieldKind::Null => TypeTag::Null,
            FieldKind::Void => TypeTag::Void,
            FieldKind::Any => TypeTag::Any,
            FieldKind::Unknown => TypeTag::Unknown,
            FieldKind::Never => TypeTag::Never,
            FieldKind::NaN => TypeTag::NaN,
            FieldKind::Literal(_) => TypeTag::Literal,
            FieldKind::Enum(_) => TypeTag::Enum,
            FieldKind::NativeEnum(_) => TypeTag::NativeEnum,
            FieldKind::Object(_) => TypeTag::Object,
            FieldKind::Array(_) => TypeTag::Array,
            FieldKind::Tuple(_) => TypeTag::Tuple,
            FieldKind::Union(_) => TypeTag::Union,
            FieldKind::DiscriminatedUnion(_) => TypeTag::DiscriminatedUnion,
            FieldKind::Intersection(_) => TypeTag::Intersection,
            FieldKind::Record(_) => TypeTag::Record,
            FieldKind::Map(_) => TypeTag::Map,
            FieldKind::Set(_) => TypeTag::Set,
            FieldKind::Function(_) => TypeTag::Function,
            FieldKind::Promise(_) => TypeTag::Promise,
            FieldKind::Unrecognized { .. } => return None,
        })
    }

    /// The tag the field validates as: tuple-flagged arrays are tuples,
    /// discriminated-flagged unions are discriminated, unknown tags are `any`
    pub fn effective_tag(&self) -> TypeTag {
        match self {
            FieldKind::Array(params) if params.is_tuple => TypeTag::Tuple,
            FieldKind::Union(params) if params.is_discriminated => TypeTag::DiscriminatedUnion,
            other => other.tag().unwrap_or(TypeTag::Any),
        }
    }

    /// Wire spelling of the tag
    pub fn tag_name(&self) -> &str {
        match self {
            FieldKind::Unrecognized { tag, .. } => tag,
            other => other.tag().map(TypeTag::as_str).unwrap_or("any"),
        }
    }

    fn params_json(&self) -> Json {
        let result = match self {
            FieldKind::String(p) => serde_json::to_value(p),
            FieldKind::Literal(p) => serde_json::to_value(p),
            FieldKind::Enum(p) => serde_json::to_value(p),
            FieldKind::NativeEnum(p) => serde_json::to_value(p),
            FieldKind::Object(p) => serde_json::to_value(p),
            FieldKind::Array(p) | FieldKind::Tuple(p) => serde_json::to_value(p),
            FieldKind::Union(p) | FieldKind::DiscriminatedUnion(p) => serde_json::to_value(p),
            FieldKind::Intersection(p) => serde_json::to_value(p),
            FieldKind::Record(p) | FieldKind::Map(p) => serde_json::to_value(p),
            FieldKind::Set(p) => serde_json::to_value(p),
            FieldKind::Function(p) => serde_json::to_value(p),
            FieldKind::Promise(p) => serde_json::to_value(p),
            FieldKind::Unrecognized { params, .. } => Ok(params.clone()),
            _ => Ok(Json::Object(serde_json::Map::new())),
        };
        match result {
            Ok(Json::Object(map)) => Json::Object(map),
            _ => Json::Object(serde_json::Map::new()),
        }
    }
}

/// Wire form of [`FieldSpec`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawField {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "lenient_string")]
    pub type_tag: String,
    #[serde(default)]
    pub params: Json,
    #[serde(default)]
    pub validations: Vec<ValidationRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FieldSpec>,
}

impl From<RawField> for FieldSpec {
    fn from(raw: RawField) -> Self {
        let common = typed(&raw.type_tag, &raw.params);
        let kind = FieldKind::from_parts(&raw.type_tag, &raw.params);
        FieldSpec {
            id: raw.id,
            name: raw.name,
            kind,
            common,
            validations: raw.validations,
            children: raw.children,
        }
    }
}

impl From<FieldSpec> for RawField {
    fn from(field: FieldSpec) -> Self {
        let mut params = match field.kind.params_json() {
            Json::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        params.remove("coerce");
        params.remove("description");
        if let Ok(Json::Object(common)) = serde_json::to_value(&field.common) {
            params.extend(common);
        }
        RawField {
            id: field.id,
            name: field.name,
            type_tag: field.kind.tag_name().to_string(),
            params: Json::Object(params),
            validations: field.validations,
            children: field.children,
        }
    }
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            kind,
            common: CommonParams::default(),
            validations: Vec::new(),
            children: Vec::new(),
        }
    }

    /// A field with the registry's default parameters for `tag`
    pub fn of(name: impl Into<String>, tag: TypeTag) -> Self {
        Self::new(name, crate::registry::default_kind(tag))
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.validations.push(rule);
        self
    }

    /// Append a rule with a payload and no message
    pub fn rule(self, kind: RuleKind, value: impl Into<String>) -> Self {
        self.with_rule(ValidationRule::new(kind, value))
    }

    pub fn with_children(mut self, children: Vec<FieldSpec>) -> Self {
        self.children = children;
        self
    }

    pub fn coerced(mut self) -> Self {
        self.common.coerce = true;
        self
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.common.description = Some(description.into());
        self
    }

    pub fn tag(&self) -> Option<TypeTag> {
        self.kind.tag()
    }

    pub fn effective_tag(&self) -> TypeTag {
        self.kind.effective_tag()
    }

    /// Number of fields in this subtree, including nested type references
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(FieldSpec::subtree_len).sum::<usize>()
            + self.nested_refs().map(|f| f.subtree_len()).sum::<usize>()
    }

    /// Nested fields reachable through type references and union cases
    pub fn nested_refs(&self) -> impl Iterator<Item = &FieldSpec> {
        let mut refs: Vec<&TypeRef> = Vec::new();
        let mut case_fields: Vec<&FieldSpec> = Vec::new();
        match &self.kind {
            FieldKind::Object(p) => refs.extend(p.catchall.iter()),
            FieldKind::Array(p) | FieldKind::Tuple(p) => {
                refs.extend(p.element_type.iter());
                refs.extend(p.tuple_types.iter());
                refs.extend(p.rest.iter());
            }
            FieldKind::Union(p) | FieldKind::DiscriminatedUnion(p) => {
                refs.extend(p.types.iter());
                case_fields.extend(p.cases.iter().flat_map(|c| c.fields.iter()));
            }
            FieldKind::Intersection(p) => refs.extend(p.types.iter()),
            FieldKind::Record(p) | FieldKind::Map(p) => {
                refs.extend(p.key_type.iter());
                refs.extend(p.value_type.iter());
            }
            FieldKind::Set(p) => refs.extend(p.value_type.iter()),
            FieldKind::Function(p) => {
                refs.extend(p.parameters.iter().map(|param| &param.type_ref));
                refs.extend(p.return_type.iter());
            }
            FieldKind::Promise(p) => refs.extend(p.value_type.iter()),
            _ => {}
        }
        refs.into_iter()
            .filter_map(|r| match r {
                TypeRef::Field(field) => Some(field.as_ref()),
                TypeRef::Tag(_) => None,
            })
            .chain(case_fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_shape_parses_into_typed_kind() {
        let field: FieldSpec = serde_json::from_value(json!({
            "id": "f1",
            "name": "age",
            "type": "number",
            "params": { "coerce": true, "description": "Age in years" },
            "validations": [{ "id": "r1", "kind": "min", "value": "0" }]
        }))
        .unwrap();
        assert_eq!(field.kind, FieldKind::Number);
        assert!(field.common.coerce);
        assert_eq!(field.common.description.as_deref(), Some("Age in years"));
        assert_eq!(field.validations.len(), 1);
    }

    #[test]
    fn test_malformed_params_fall_back_to_defaults() {
        let field: FieldSpec = serde_json::from_value(json!({
            "name": "tags",
            "type": "array",
            "params": { "isTuple": "yes please", "tupleTypes": 42 }
        }))
        .unwrap();
        assert_eq!(field.kind, FieldKind::Array(ArrayParams::default()));
    }

    #[test]
    fn test_unknown_tag_round_trips_verbatim() {
        let raw = json!({
            "id": "x",
            "name": "mystery",
            "type": "hologram",
            "params": { "shimmer": 3 },
            "validations": []
        });
        let field: FieldSpec = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(field.tag(), None);
        assert_eq!(field.effective_tag(), TypeTag::Any);
        assert_eq!(serde_json::to_value(&field).unwrap(), raw);
    }

    #[test]
    fn test_nested_type_refs() {
        let field: FieldSpec = serde_json::from_value(json!({
            "name": "pairs",
            "type": "map",
            "params": {
                "keyType": "string",
                "valueType": { "name": "", "type": "array", "params": { "elementType": "number" } }
            }
        }))
        .unwrap();
        match &field.kind {
            FieldKind::Map(p) => {
                assert_eq!(p.key_type, Some(TypeRef::tag(TypeTag::String)));
                assert!(matches!(p.value_type, Some(TypeRef::Field(_))));
            }
            other => panic!("unexpected kind {:?}", other),
        }
        assert_eq!(field.subtree_len(), 2);
    }

    #[test]
    fn test_unshaped_cases_and_entries_are_empty() {
        let union: UnionParams = serde_json::from_value(json!({ "cases": "circle" })).unwrap();
        assert!(union.cases.is_empty());
        let native: NativeEnumParams = serde_json::from_value(json!({ "entries": 7 })).unwrap();
        assert!(native.entries.is_empty());
        let native: NativeEnumParams =
            serde_json::from_value(json!({ "entries": { "A": 1, "B": "b" } })).unwrap();
        assert_eq!(native.entries.len(), 2);
    }

    #[test]
    fn test_discriminated_cases_accept_map_form() {
        let field: FieldSpec = serde_json::from_value(json!({
            "name": "shape",
            "type": "union",
            "params": {
                "isDiscriminated": true,
                "discriminator": "kind",
                "cases": { "circle": [{ "name": "r", "type": "number" }] }
            }
        }))
        .unwrap();
        assert_eq!(field.effective_tag(), TypeTag::DiscriminatedUnion);
        match &field.kind {
            FieldKind::Union(p) => {
                assert_eq!(p.cases.len(), 1);
                assert_eq!(p.cases[0].value, "circle");
                assert_eq!(p.cases[0].fields[0].name, "r");
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_enum_values_from_comma_string() {
        let field: FieldSpec = serde_json::from_value(json!({
            "name": "color",
            "type": "enum",
            "params": { "values": "red, green" }
        }))
        .unwrap();
        assert_eq!(
            field.kind,
            FieldKind::Enum(EnumParams {
                values: vec!["red".into(), "green".into()]
            })
        );
    }

    #[test]
    fn test_serialization_is_stable() {
        let field = FieldSpec::of("email", TypeTag::String)
            .with_id("f9")
            .rule(RuleKind::Email, "")
            .described("Contact address");
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(
            json,
            json!({
                "id": "f9",
                "name": "email",
                "type": "string",
                "params": { "description": "Contact address" },
                "validations": [{ "id": "", "kind": "email", "value": "" }]
            })
        );
        let back: FieldSpec = serde_json::from_value(json).unwrap();
        assert_eq!(back, field);
    }
}
