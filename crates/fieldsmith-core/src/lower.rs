//! Lowering field specifications into the shared schema form
//!
//! This is the single walk over the user's field tree. It resolves every
//! fallback from [`crate::policy`], consults the rule table in
//! [`crate::rules`] for each rule in order, and records a diagnostic for
//! everything it degrades or drops. The only failure is the recursion guard.
//!
//! Copyright (c) 2025 Fieldsmith Team
//! Licensed under the Apache-2.0 license

use crate::ir::{BaseNode, CaseNode, ObjectNode, RuleOp, SchemaNode, UnknownKeys};
use crate::lint::{Diagnostic, DiagnosticKind};
use crate::model::{
    ArrayParams, FieldKind, FieldSpec, ObjectParams, TypeRef, TypeTag, UnionParams,
};
use crate::policy;
use crate::rules::{lower_rule, RuleLowering, RuleTarget};
use crate::{Error, Result};
use serde_json::Value as Json;
use tracing::{debug, trace};

/// Options for lowering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LowerOptions {
    /// Deepest field nesting accepted before failing with `TooDeeplyNested`
    pub max_depth: usize,
}

impl Default for LowerOptions {
    fn default() -> Self {
        Self {
            max_depth: policy::DEFAULT_MAX_DEPTH,
        }
    }
}

impl LowerOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// A lowered tree plus what was degraded to get it
#[derive(Debug, Clone)]
pub struct Lowered {
    pub node: SchemaNode,
    pub diagnostics: Vec<Diagnostic>,
}

/// Lower a root field list; an empty list accepts anything
pub fn lower(fields: &[FieldSpec], options: &LowerOptions) -> Result<Lowered> {
    let mut lowerer = Lowerer {
        options,
        diagnostics: Vec::new(),
    };
    let node = if fields.is_empty() {
        SchemaNode::any()
    } else {
        let object = lowerer.object(fields, &ObjectParams::default(), "$", 0)?;
        SchemaNode::new(BaseNode::Object(object))
    };
    debug!(
        nodes = node.size(),
        diagnostics = lowerer.diagnostics.len(),
        "lowered field tree"
    );
    Ok(Lowered {
        node,
        diagnostics: lowerer.diagnostics,
    })
}

/// Lower a single field as if it were the whole schema
pub fn lower_field(field: &FieldSpec, options: &LowerOptions) -> Result<Lowered> {
    let mut lowerer = Lowerer {
        options,
        diagnostics: Vec::new(),
    };
    let node = lowerer.field(field, "$", 1)?;
    Ok(Lowered {
        node,
        diagnostics: lowerer.diagnostics,
    })
}

fn child_path(parent: &str, name: &str) -> String {
    if policy::is_js_identifier(name) {
        format!("{}.{}", parent, name)
    } else {
        format!("{}[{}]", parent, policy::quote_js_string(name))
    }
}

fn role_path(parent: &str, role: impl std::fmt::Display) -> String {
    format!("{}<{}>", parent, role)
}

struct Lowerer<'o> {
    options: &'o LowerOptions,
    diagnostics: Vec<Diagnostic>,
}

impl Lowerer<'_> {
    fn note(&mut self, kind: DiagnosticKind, path: &str, field: Option<&FieldSpec>, message: String) {
        debug!(path, kind = kind.code(), "{}", message);
        let mut diagnostic = Diagnostic::new(kind, path, message);
        if let Some(field) = field {
            diagnostic = diagnostic.with_field_id(field.id.clone());
        }
        self.diagnostics.push(diagnostic);
    }

    fn object(
        &mut self,
        fields: &[FieldSpec],
        params: &ObjectParams,
        path: &str,
        depth: usize,
    ) -> Result<ObjectNode> {
        let mut object = ObjectNode::default();
        for field in fields {
            let field_path = child_path(path, &field.name);
            if field.name.is_empty() {
                self.note(
                    DiagnosticKind::EmptyName,
                    &field_path,
                    Some(field),
                    "field has an empty name".to_string(),
                );
            }
            let node = self.field(field, &field_path, depth + 1)?;
            if !object.insert(field.name.clone(), node) {
                self.note(
                    DiagnosticKind::DuplicateName,
                    &field_path,
                    Some(field),
                    format!("`{}` is declared more than once; the last one wins", field.name),
                );
            }
        }
        object.unknown_keys = match (&params.catchall, params.strict, params.passthrough) {
            (Some(catchall), _, _) => UnknownKeys::Catchall(Box::new(self.type_ref(
                Some(catchall),
                policy::DEFAULT_ELEMENT_TAG,
                &role_path(path, "catchall"),
                depth + 1,
            )?)),
            (None, true, _) => UnknownKeys::Strict,
            (None, false, true) => UnknownKeys::Passthrough,
            (None, false, false) => UnknownKeys::Strip,
        };
        Ok(object)
    }

    fn field(&mut self, field: &FieldSpec, path: &str, depth: usize) -> Result<SchemaNode> {
        if depth > self.options.max_depth {
            return Err(Error::TooDeeplyNested {
                depth,
                limit: self.options.max_depth,
                path: path.to_string(),
            });
        }
        trace!(path, tag = field.kind.tag_name(), "lowering field");
        if let FieldKind::Unrecognized { tag, .. } = &field.kind {
            self.note(
                DiagnosticKind::UnknownTag,
                path,
                Some(field),
                format!("unknown type `{}` accepts anything", tag),
            );
        }

        let base = self.base(field, path, depth)?;
        let mut node = SchemaNode::new(base);
        let mut target = RuleTarget::new(&field.kind);
        for rule in &field.validations {
            match lower_rule(&target, rule) {
                RuleLowering::Apply(op) => {
                    target.wrapped |= op.is_wrapper();
                    node.ops.push(op);
                }
                RuleLowering::Skip { kind, reason } => {
                    debug!(path, rule = %rule.kind, reason = %reason, "skipping rule");
                    self.diagnostics.push(
                        Diagnostic::new(kind, path, reason)
                            .with_field_id(field.id.clone())
                            .with_rule_id(rule.id.clone()),
                    );
                }
            }
        }
        node.description = field
            .common
            .description
            .as_ref()
            .filter(|d| !d.is_empty())
            .cloned();
        Ok(node)
    }

    /// Resolve an element/member reference, falling back to `default`
    fn type_ref(
        &mut self,
        type_ref: Option<&TypeRef>,
        default: TypeTag,
        path: &str,
        depth: usize,
    ) -> Result<SchemaNode> {
        match type_ref {
            None => self.bare(default, path, depth),
            Some(TypeRef::Tag(tag)) => {
                let field = FieldSpec::new("", FieldKind::from_parts(tag, &Json::Null));
                self.field(&field, path, depth)
            }
            Some(TypeRef::Field(field)) => self.field(field, path, depth),
        }
    }

    fn bare(&mut self, tag: TypeTag, path: &str, depth: usize) -> Result<SchemaNode> {
        let field = FieldSpec::new("", FieldKind::from_parts(tag.as_str(), &Json::Null));
        self.field(&field, path, depth)
    }

    fn base(&mut self, field: &FieldSpec, path: &str, depth: usize) -> Result<BaseNode> {
        let coerce = field.common.coerce;
        let next = depth + 1;
        Ok(match &field.kind {
            FieldKind::String(_) => BaseNode::String { coerce },
            FieldKind::Number => BaseNode::Number { coerce },
            FieldKind::BigInt => BaseNode::BigInt { coerce },
            FieldKind::Boolean => BaseNode::Boolean { coerce },
            FieldKind::Date => BaseNode::Date { coerce },
            FieldKind::Symbol => BaseNode::Symbol,
            FieldKind::Undefined => BaseNode::Undefined,
            FieldKind::Null => BaseNode::Null,
            FieldKind::Void => BaseNode::Void,
            FieldKind::Any => BaseNode::Any,
            FieldKind::Unknown => BaseNode::Unknown,
            FieldKind::Never => BaseNode::Never,
            FieldKind::NaN => BaseNode::NaN,
            FieldKind::Literal(params) => BaseNode::Literal(policy::literal_member(&params.value)),
            FieldKind::Enum(params) => {
                if params.values.is_empty() {
                    self.note(
                        DiagnosticKind::DefaultedMembers,
                        path,
                        Some(field),
                        "enum has no values; using a single empty string".to_string(),
                    );
                }
                BaseNode::Enum(policy::enum_members(&params.values))
            }
            FieldKind::NativeEnum(params) => {
                if params.entries.is_empty() {
                    self.note(
                        DiagnosticKind::DefaultedMembers,
                        path,
                        Some(field),
                        "native enum has no entries; using a single empty entry".to_string(),
                    );
                }
                BaseNode::NativeEnum(policy::native_enum_entries(&params.entries))
            }
            FieldKind::Object(params) => {
                BaseNode::Object(self.object(&field.children, params, path, depth)?)
            }
            FieldKind::Array(params) if params.is_tuple => self.tuple(params, path, next)?,
            FieldKind::Tuple(params) => self.tuple(params, path, next)?,
            FieldKind::Array(params) => {
                let element_path = role_path(path, "element");
                let element = match &params.element_type {
                    Some(TypeRef::Tag(tag)) if TypeTag::parse(tag) == Some(TypeTag::Object) => {
                        SchemaNode::new(BaseNode::Object(self.object(
                            &field.children,
                            &ObjectParams::default(),
                            &element_path,
                            next,
                        )?))
                    }
                    other => self.type_ref(
                        other.as_ref(),
                        policy::DEFAULT_ELEMENT_TAG,
                        &element_path,
                        next,
                    )?,
                };
                BaseNode::Array(Box::new(element))
            }
            FieldKind::Union(params) if params.is_discriminated => {
                self.discriminated(field, params, path, depth)?
            }
            FieldKind::DiscriminatedUnion(params) => self.discriminated(field, params, path, depth)?,
            FieldKind::Union(params) => {
                if params.types.is_empty() {
                    self.note(
                        DiagnosticKind::DefaultedMembers,
                        path,
                        Some(field),
                        "union has no members; using string | number".to_string(),
                    );
                    let mut members = Vec::new();
                    for (i, tag) in policy::DEFAULT_UNION_MEMBERS.into_iter().enumerate() {
                        members.push(self.bare(tag, &role_path(path, i), next)?);
                    }
                    BaseNode::Union(members)
                } else {
                    let mut members = Vec::with_capacity(params.types.len());
                    for (i, member) in params.types.iter().enumerate() {
                        members.push(self.type_ref(
                            Some(member),
                            policy::DEFAULT_ELEMENT_TAG,
                            &role_path(path, i),
                            next,
                        )?);
                    }
                    BaseNode::Union(members)
                }
            }
            FieldKind::Intersection(params) => {
                let mut members = Vec::with_capacity(params.types.len().max(2));
                for (i, member) in params.types.iter().enumerate() {
                    members.push(self.type_ref(
                        Some(member),
                        policy::DEFAULT_ELEMENT_TAG,
                        &role_path(path, i),
                        next,
                    )?);
                }
                if members.len() < 2 {
                    self.note(
                        DiagnosticKind::PaddedIntersection,
                        path,
                        Some(field),
                        format!("intersection has {} member(s); padding to two", members.len()),
                    );
                }
                match members.len() {
                    0 => {
                        let pad = self.bare(policy::INTERSECTION_PAD_TAG, path, next)?;
                        BaseNode::Intersection(Box::new(pad.clone()), Box::new(pad))
                    }
                    1 => {
                        let only = members.remove(0);
                        BaseNode::Intersection(Box::new(only.clone()), Box::new(only))
                    }
                    _ => {
                        let mut members = members.into_iter();
                        let first = members.next().unwrap_or_else(SchemaNode::any);
                        let second = members.next().unwrap_or_else(SchemaNode::any);
                        let mut folded = BaseNode::Intersection(Box::new(first), Box::new(second));
                        for member in members {
                            folded = BaseNode::Intersection(
                                Box::new(SchemaNode::new(folded)),
                                Box::new(member),
                            );
                        }
                        folded
                    }
                }
            }
            FieldKind::Record(params) => {
                let key = self.type_ref(params.key_type.as_ref(), policy::DEFAULT_ELEMENT_TAG, &role_path(path, "key"), next)?;
                let value = self.type_ref(params.value_type.as_ref(), policy::DEFAULT_ELEMENT_TAG, &role_path(path, "value"), next)?;
                BaseNode::Record {
                    key: Box::new(key),
                    value: Box::new(value),
                }
            }
            FieldKind::Map(params) => {
                let key = self.type_ref(params.key_type.as_ref(), policy::DEFAULT_ELEMENT_TAG, &role_path(path, "key"), next)?;
                let value = self.type_ref(params.value_type.as_ref(), policy::DEFAULT_ELEMENT_TAG, &role_path(path, "value"), next)?;
                BaseNode::Map {
                    key: Box::new(key),
                    value: Box::new(value),
                }
            }
            FieldKind::Set(params) => BaseNode::Set(Box::new(self.type_ref(
                params.value_type.as_ref(),
                policy::DEFAULT_ELEMENT_TAG,
                &role_path(path, "value"),
                next,
            )?)),
            FieldKind::Function(params) => {
                let mut args = Vec::with_capacity(params.parameters.len());
                for (i, param) in params.parameters.iter().enumerate() {
                    let label = if param.name.is_empty() {
                        format!("arg {}", i)
                    } else {
                        format!("arg {}", param.name)
                    };
                    let mut arg = self.type_ref(
                        Some(&param.type_ref),
                        policy::DEFAULT_ELEMENT_TAG,
                        &role_path(path, label),
                        next,
                    )?;
                    if param.optional {
                        arg.ops.push(RuleOp::Optional);
                    }
                    args.push(arg);
                }
                let returns = self.type_ref(
                    params.return_type.as_ref(),
                    policy::DEFAULT_RETURN_TAG,
                    &role_path(path, "returns"),
                    next,
                )?;
                BaseNode::Function {
                    args,
                    returns: Box::new(returns),
                }
            }
            FieldKind::Promise(params) => BaseNode::Promise(Box::new(self.type_ref(
                params.value_type.as_ref(),
                policy::DEFAULT_ELEMENT_TAG,
                &role_path(path, "value"),
                next,
            )?)),
            FieldKind::Unrecognized { .. } => BaseNode::Any,
        })
    }

    fn tuple(&mut self, params: &ArrayParams, path: &str, depth: usize) -> Result<BaseNode> {
        let mut items = Vec::with_capacity(params.tuple_types.len());
        for (i, item) in params.tuple_types.iter().enumerate() {
            items.push(self.type_ref(
                Some(item),
                policy::DEFAULT_ELEMENT_TAG,
                &format!("{}[{}]", path, i),
                depth,
            )?);
        }
        let rest = match &params.rest {
            Some(rest) => Some(Box::new(self.type_ref(
                Some(rest),
                policy::DEFAULT_ELEMENT_TAG,
                &role_path(path, "rest"),
                depth,
            )?)),
            None => None,
        };
        Ok(BaseNode::Tuple { items, rest })
    }

    fn discriminated(
        &mut self,
        field: &FieldSpec,
        params: &UnionParams,
        path: &str,
        depth: usize,
    ) -> Result<BaseNode> {
        let discriminator = policy::discriminator(&params.discriminator);
        let mut cases: Vec<CaseNode> = Vec::with_capacity(params.cases.len());
        for case in &params.cases {
            let value = policy::case_value(&case.value, &case.name);
            let case_path = role_path(path, policy::quote_js_string(&value));
            if cases.iter().any(|existing| existing.value == value) {
                self.note(
                    DiagnosticKind::DuplicateCase,
                    &case_path,
                    Some(field),
                    format!("case `{}` is declared more than once; the first one wins", value),
                );
                continue;
            }
            let mut object = ObjectNode::default();
            for case_field in &case.fields {
                let field_path = child_path(&case_path, &case_field.name);
                if case_field.name == discriminator {
                    self.note(
                        DiagnosticKind::DiscriminatorField,
                        &field_path,
                        Some(case_field),
                        format!("field `{}` is replaced by the case tag", discriminator),
                    );
                    continue;
                }
                let node = self.field(case_field, &field_path, depth + 1)?;
                if !object.insert(case_field.name.clone(), node) {
                    self.note(
                        DiagnosticKind::DuplicateName,
                        &field_path,
                        Some(case_field),
                        format!("`{}` is declared more than once; the last one wins", case_field.name),
                    );
                }
            }
            cases.push(CaseNode {
                value,
                fields: object.fields,
            });
        }
        if cases.is_empty() {
            self.note(
                DiagnosticKind::EmptyCaseList,
                path,
                Some(field),
                "discriminated union has no cases and rejects everything".to_string(),
            );
        }
        Ok(BaseNode::DiscriminatedUnion {
            discriminator,
            cases,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Bound, Literal};
    use crate::model::{
        FunctionParam, FunctionParams, IntersectionParams, RuleKind, UnionCase, ValidationRule,
    };

    fn lower_one(field: FieldSpec) -> Lowered {
        lower_field(&field, &LowerOptions::default()).unwrap()
    }

    #[test]
    fn test_empty_root_is_any() {
        let lowered = lower(&[], &LowerOptions::default()).unwrap();
        assert_eq!(lowered.node, SchemaNode::any());
        assert!(lowered.diagnostics.is_empty());
    }

    #[test]
    fn test_rules_fold_in_order_and_skip() {
        let field = FieldSpec::of("name", TypeTag::String)
            .rule(RuleKind::Trim, "")
            .rule(RuleKind::Int, "")
            .rule(RuleKind::Min, "3")
            .rule(RuleKind::Optional, "")
            .rule(RuleKind::Max, "9");
        let lowered = lower_one(field);
        assert_eq!(
            lowered.node.ops,
            vec![
                RuleOp::Trim,
                RuleOp::Min(Bound::Number(3.0), None),
                RuleOp::Optional
            ]
        );
        let kinds: Vec<_> = lowered.diagnostics.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![DiagnosticKind::InapplicableRule, DiagnosticKind::RuleAfterWrapper]
        );
    }

    #[test]
    fn test_duplicate_names_keep_first_position() {
        let fields = vec![
            FieldSpec::of("a", TypeTag::String),
            FieldSpec::of("b", TypeTag::Number),
            FieldSpec::of("a", TypeTag::Boolean),
        ];
        let lowered = lower(&fields, &LowerOptions::default()).unwrap();
        match lowered.node.base {
            BaseNode::Object(object) => {
                assert_eq!(object.fields.len(), 2);
                assert_eq!(object.fields[0].0, "a");
                assert_eq!(object.fields[0].1.base, BaseNode::Boolean { coerce: false });
            }
            other => panic!("unexpected base {:?}", other),
        }
    }

    #[test]
    fn test_array_of_object_uses_children() {
        let mut field = FieldSpec::of("items", TypeTag::Array)
            .with_children(vec![FieldSpec::of("sku", TypeTag::String)]);
        field.kind = FieldKind::Array(ArrayParams {
            element_type: Some(TypeRef::tag(TypeTag::Object)),
            ..Default::default()
        });
        let lowered = lower_one(field);
        match lowered.node.base {
            BaseNode::Array(element) => match element.base {
                BaseNode::Object(object) => assert_eq!(object.fields[0].0, "sku"),
                other => panic!("unexpected element {:?}", other),
            },
            other => panic!("unexpected base {:?}", other),
        }
    }

    #[test]
    fn test_fallbacks() {
        let union = lower_one(FieldSpec::new("u", FieldKind::Union(UnionParams::default())));
        assert_eq!(
            union.node.base,
            BaseNode::Union(vec![
                SchemaNode::new(BaseNode::String { coerce: false }),
                SchemaNode::new(BaseNode::Number { coerce: false }),
            ])
        );

        let single = lower_one(FieldSpec::new(
            "i",
            FieldKind::Intersection(IntersectionParams {
                types: vec![TypeRef::tag(TypeTag::String)],
            }),
        ));
        let string = SchemaNode::new(BaseNode::String { coerce: false });
        assert_eq!(
            single.node.base,
            BaseNode::Intersection(Box::new(string.clone()), Box::new(string))
        );

        let function = lower_one(FieldSpec::new(
            "f",
            FieldKind::Function(FunctionParams {
                parameters: vec![FunctionParam {
                    name: "x".into(),
                    type_ref: TypeRef::tag(TypeTag::Number),
                    optional: true,
                }],
                return_type: None,
            }),
        ));
        match function.node.base {
            BaseNode::Function { args, returns } => {
                assert_eq!(args[0].ops, vec![RuleOp::Optional]);
                assert_eq!(returns.base, BaseNode::Void);
            }
            other => panic!("unexpected base {:?}", other),
        }
    }

    #[test]
    fn test_three_member_intersection_folds_left() {
        let lowered = lower_one(FieldSpec::new(
            "i",
            FieldKind::Intersection(IntersectionParams {
                types: vec![
                    TypeRef::tag(TypeTag::String),
                    TypeRef::tag(TypeTag::Any),
                    TypeRef::tag(TypeTag::Unknown),
                ],
            }),
        ));
        match lowered.node.base {
            BaseNode::Intersection(left, right) => {
                assert!(matches!(left.base, BaseNode::Intersection(..)));
                assert_eq!(right.base, BaseNode::Unknown);
            }
            other => panic!("unexpected base {:?}", other),
        }
    }

    #[test]
    fn test_discriminated_cases() {
        let field = FieldSpec::new(
            "shape",
            FieldKind::DiscriminatedUnion(UnionParams {
                is_discriminated: true,
                discriminator: "kind".into(),
                cases: vec![
                    UnionCase {
                        name: "circle".into(),
                        fields: vec![
                            FieldSpec::of("kind", TypeTag::Number),
                            FieldSpec::of("r", TypeTag::Number),
                        ],
                        ..Default::default()
                    },
                    UnionCase {
                        name: "other".into(),
                        value: "circle".into(),
                        ..Default::default()
                    },
                ],
                ..Default::default()
            }),
        );
        let lowered = lower_one(field);
        match &lowered.node.base {
            BaseNode::DiscriminatedUnion {
                discriminator,
                cases,
            } => {
                assert_eq!(discriminator, "kind");
                assert_eq!(cases.len(), 1);
                assert_eq!(cases[0].value, "circle");
                assert_eq!(cases[0].fields.len(), 1);
            }
            other => panic!("unexpected base {:?}", other),
        }
        let kinds: Vec<_> = lowered.diagnostics.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![DiagnosticKind::DiscriminatorField, DiagnosticKind::DuplicateCase]
        );
    }

    #[test]
    fn test_unknown_tag_is_any() {
        let field: FieldSpec = serde_json::from_value(serde_json::json!({
            "name": "x",
            "type": "hologram",
            "validations": [{ "kind": "default", "value": "{\"a\": 1}" }]
        }))
        .unwrap();
        let lowered = lower_one(field);
        assert_eq!(lowered.node.base, BaseNode::Any);
        assert_eq!(
            lowered.node.ops,
            vec![RuleOp::Default(Literal::Object(vec![(
                "a".into(),
                Literal::Number(1.0)
            )]))]
        );
        assert_eq!(lowered.diagnostics[0].kind, DiagnosticKind::UnknownTag);
    }

    #[test]
    fn test_depth_limit() {
        let mut field = FieldSpec::of("leaf", TypeTag::String);
        for i in 0..10 {
            field = FieldSpec::of(format!("level{}", i), TypeTag::Object).with_children(vec![field]);
        }
        let options = LowerOptions::default().with_max_depth(5);
        let err = lower(&[field.clone()], &options).unwrap_err();
        assert!(err.is_depth_limit());
        assert!(lower(&[field], &LowerOptions::default()).is_ok());
    }

    #[test]
    fn test_message_and_description_survive() {
        let field = FieldSpec::of("age", TypeTag::Number)
            .with_rule(ValidationRule::new(RuleKind::Min, "0").with_message("too small"))
            .described("Age in years");
        let lowered = lower_one(field);
        assert_eq!(
            lowered.node.ops,
            vec![RuleOp::Min(Bound::Number(0.0), Some("too small".into()))]
        );
        assert_eq!(lowered.node.description.as_deref(), Some("Age in years"));
    }
}
