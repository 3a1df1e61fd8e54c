//! Reading emitted source back into a validator
//!
//! The reader is the other half of the lockstep check: it parses the text the
//! emitter produced into the same lowered [`SchemaNode`] form and hands that
//! to the interpreter. `compile(fields)` and `evaluate_source(&emit(fields)?)`
//! therefore judge samples through one engine, and any disagreement between
//! them points at the emitter or the reader rather than at a second
//! validator implementation.
//!
//! # Example
//!
//! ```
//! use fieldsmith_core::{evaluate_source, Value};
//!
//! let validator = evaluate_source(
//!     "export const schema = z.object({ age: z.coerce.number().min(0).int() });",
//! )
//! .unwrap();
//! assert!(validator.is_valid(&Value::object([("age", Value::from("5"))])));
//! assert!(!validator.is_valid(&Value::object([("age", Value::from(2.5))])));
//! ```
//!
//! Copyright (c) 2025 Fieldsmith Team
//! Licensed under the Apache-2.0 license

mod parser;

pub use parser::SourceModule;

use crate::interpreter::{compile_node, Validator};
use crate::ir::{Literal, SchemaNode};
use crate::lower::LowerOptions;
use crate::syntax::{tokenize, Cursor};
use crate::Result;
use parser::SourceParser;
use tracing::debug;

/// Read a module containing one exported schema constant
pub fn read_module(source: &str) -> Result<SourceModule> {
    read_module_with(source, &LowerOptions::default())
}

/// Read a module, failing when schemas nest deeper than `options.max_depth`
pub fn read_module_with(source: &str, options: &LowerOptions) -> Result<SourceModule> {
    let mut parser = SourceParser::new(Cursor::new(tokenize(source)?), options);
    let module = parser.module()?;
    debug!(
        name = %module.schema_name,
        nodes = module.node.size(),
        "read schema module"
    );
    Ok(module)
}

/// Read a single `z` expression
pub fn read_expression(source: &str) -> Result<SchemaNode> {
    let options = LowerOptions::default();
    SourceParser::new(Cursor::new(tokenize(source)?), &options).expression()
}

/// Read a constant written the way the emitter renders defaults and literals
pub fn read_literal(source: &str) -> Result<Literal> {
    let options = LowerOptions::default();
    let mut parser = SourceParser::new(Cursor::new(tokenize(source)?), &options);
    let literal = parser.literal()?;
    parser.finish()?;
    Ok(literal)
}

/// Build a validator from emitted source
pub fn evaluate_source(source: &str) -> Result<Validator> {
    evaluate_source_with(source, &LowerOptions::default())
}

pub fn evaluate_source_with(source: &str, options: &LowerOptions) -> Result<Validator> {
    let module = read_module_with(source, options)?;
    Ok(compile_node(&module.node))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::{emit_module, EmitOptions};
    use crate::expr::parse_expression;
    use crate::ir::{BaseNode, Bound, CaseNode, ObjectNode, RuleOp, StringFormat, UnknownKeys};
    use crate::model::IpVersion;
    use crate::value::Value;

    fn string() -> SchemaNode {
        SchemaNode::new(BaseNode::String { coerce: false })
    }

    fn number() -> SchemaNode {
        SchemaNode::new(BaseNode::Number { coerce: false })
    }

    /// Emit a node and read it back
    fn round_trip(node: &SchemaNode) -> SchemaNode {
        let source = emit_module(node, &EmitOptions::default());
        read_module(&source)
            .unwrap_or_else(|err| panic!("{}\n{}", err, source))
            .node
    }

    #[test]
    fn test_reads_module_names() {
        let source = "import { z } from \"zod\";\n\n\
                      export const userProfile = z.string();\n\n\
                      export type UserProfile = z.infer<typeof userProfile>;\n";
        let module = read_module(source).unwrap();
        assert_eq!(module.schema_name, "userProfile");
        assert_eq!(module.type_name.as_deref(), Some("UserProfile"));
        assert_eq!(module.node, string());
    }

    #[test]
    fn test_reads_bare_expression() {
        let node = read_expression("z.coerce.number().min(0).int()").unwrap();
        assert_eq!(node.base, BaseNode::Number { coerce: true });
        assert_eq!(
            node.ops,
            vec![RuleOp::Min(Bound::Number(0.0), None), RuleOp::Int(None)]
        );
        assert_eq!(read_module("z.any();").unwrap().node, SchemaNode::any());
    }

    #[test]
    fn test_string_rules_round_trip() {
        let node = string()
            .with_op(RuleOp::Trim)
            .with_op(RuleOp::Min(Bound::Number(3.0), Some("too \"short\"".into())))
            .with_op(RuleOp::Regex(r"^\d+\\$".into(), None))
            .with_op(RuleOp::Format(StringFormat::Email, None))
            .with_op(RuleOp::StartsWith("a\nb".into(), Some("x".into())))
            .with_op(RuleOp::Datetime {
                precision: Some(3),
                offset: true,
                message: Some("when".into()),
            })
            .with_op(RuleOp::Ip {
                version: Some(IpVersion::V6),
                message: None,
            })
            .with_op(RuleOp::Brand("UserId".into()))
            .with_op(RuleOp::Optional);
        assert_eq!(round_trip(&node), node);
    }

    #[test]
    fn test_bounds_keep_their_kind() {
        let big = SchemaNode::new(BaseNode::BigInt { coerce: false })
            .with_op(RuleOp::Min(Bound::BigInt(-5), None))
            .with_op(RuleOp::MultipleOf(Bound::BigInt(3), None));
        assert_eq!(round_trip(&big), big);

        let date = SchemaNode::new(BaseNode::Date { coerce: true })
            .with_op(RuleOp::Max(Bound::Date(86_400_000.0), None));
        assert_eq!(round_trip(&date), date);

        let float = number()
            .with_op(RuleOp::Gt(Bound::Number(-0.5), None))
            .with_op(RuleOp::Lt(Bound::Number(1e21), None))
            .with_op(RuleOp::Default(Literal::Number(f64::NEG_INFINITY)));
        assert_eq!(round_trip(&float), float);
    }

    #[test]
    fn test_composites_round_trip() {
        let mut object = ObjectNode::new(vec![
            ("first name".into(), string()),
            ("__proto__".into(), number()),
            ("tags".into(), SchemaNode::new(BaseNode::Array(Box::new(string())))),
        ]);
        object.unknown_keys = UnknownKeys::Catchall(Box::new(number()));
        let node = SchemaNode::new(BaseNode::Union(vec![
            SchemaNode::new(BaseNode::Object(object)),
            SchemaNode::new(BaseNode::Tuple {
                items: vec![string(), number()],
                rest: Some(Box::new(SchemaNode::any())),
            }),
            SchemaNode::new(BaseNode::Function {
                args: vec![string()],
                returns: Box::new(SchemaNode::new(BaseNode::Void)),
            }),
            SchemaNode::new(BaseNode::Set(Box::new(number())))
                .with_op(RuleOp::Length(2.0, None)),
            SchemaNode::new(BaseNode::NativeEnum(vec![
                ("A".into(), Literal::Number(0.0)),
                ("b c".into(), Literal::String("x".into())),
            ])),
        ]));
        assert_eq!(round_trip(&node), node);
    }

    #[test]
    fn test_discriminated_union_round_trip() {
        let node = SchemaNode::new(BaseNode::DiscriminatedUnion {
            discriminator: "kind".into(),
            cases: vec![
                CaseNode {
                    value: "circle".into(),
                    fields: vec![("radius".into(), number())],
                },
                CaseNode {
                    value: "empty".into(),
                    fields: vec![],
                },
            ],
        });
        assert_eq!(round_trip(&node), node);
    }

    #[test]
    fn test_wrappers_and_payloads_round_trip() {
        let mut node = string()
            .with_op(RuleOp::Transform(parse_expression("(s) => s.trim()").unwrap()))
            .with_op(RuleOp::Refine(
                parse_expression("val.length > 2").unwrap(),
                Some("short".into()),
            ))
            .with_op(RuleOp::Catch(Literal::Object(vec![
                ("a".into(), Literal::Array(vec![Literal::Null, Literal::BigInt(2)])),
            ])))
            .with_op(RuleOp::Readonly);
        node.description = Some("line\nbreak".into());
        assert_eq!(round_trip(&node), node);
    }

    #[test]
    fn test_accepts_hand_edited_text() {
        let source = "// user schema\nconst schema = z.object({\n  'a': z.string().min(2, 'short'),\n  b: z.number(),\n})";
        let node = read_module(source).unwrap().node;
        let BaseNode::Object(object) = &node.base else {
            panic!("expected an object");
        };
        assert_eq!(object.fields[0].1.ops, vec![RuleOp::Min(Bound::Number(2.0), Some("short".into()))]);
        assert_eq!(read_expression("z.record(z.number())").unwrap().base.kind_name(), "record");
    }

    #[test]
    fn test_rejects_what_the_emitter_never_writes() {
        for source in [
            "z.string().bogus()",
            "z.string().optional().describe(\"x\").nullable()",
            "z.string().strict()",
            "z.coerce.object({})",
            "export const a = z.any(); export const b = z.any();",
            "import { z } from \"yup\"; export const a = z.any();",
            "z.discriminatedUnion(\"type\", [z.object({ radius: z.number() })])",
            "z.array(z.string()).size(2)",
        ] {
            assert!(read_module(source).is_err(), "{}", source);
        }
    }

    #[test]
    fn test_depth_guard() {
        let mut source = "z.string()".to_string();
        for _ in 0..6 {
            source = format!("z.array({})", source);
        }
        let options = LowerOptions::default().with_max_depth(5);
        let err = read_module_with(&source, &options).unwrap_err();
        assert!(err.is_depth_limit());
        assert!(read_module_with(&source, &LowerOptions::default().with_max_depth(6)).is_ok());
    }

    #[test]
    fn test_read_literal() {
        assert_eq!(read_literal("-3n").unwrap(), Literal::BigInt(-3));
        assert_eq!(
            read_literal(r#"new Date("1970-01-02T00:00:00.000Z")"#).unwrap(),
            Literal::Date(86_400_000.0)
        );
        assert!(read_literal("[1, 2] 3").is_err());
    }

    #[test]
    fn test_evaluate_source() {
        let validator =
            evaluate_source("export const schema = z.string().trim().min(3);").unwrap();
        assert!(validator.is_valid(&Value::from("  abc  ")));
        assert!(!validator.is_valid(&Value::from("  ab  ")));
    }
}
