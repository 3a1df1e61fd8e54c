//! Fieldsmith Core - field specifications compiled to validators and Zod source
//!
//! A visual schema builder edits a tree of [`model::FieldSpec`]s. This crate
//! turns that tree into two artifacts that must agree on every input: a live
//! [`Validator`] and the text of an equivalent Zod v3 TypeScript module.
//!
//! # Main Components
//!
//! - **Model**: field specifications, type tags and validation rules as the
//!   builder stores them, deserialized leniently
//! - **Type Registry**: which rules each type accepts and how blank fields start
//! - **Lowering**: the single walk that applies fallbacks and skips inapplicable
//!   rules, producing the shared [`ir::SchemaNode`] form
//! - **Interpreter**: folds the lowered form into a [`Validator`]
//! - **Emitter**: folds the same form into Zod source
//! - **Reader**: parses emitted source back into the lowered form
//! - **Lint**: reports everything lowering degraded or dropped
//!
//! # Example
//!
//! ```
//! use fieldsmith_core::model::{FieldSpec, RuleKind, TypeTag};
//! use fieldsmith_core::{compile, emit, evaluate_source, Value};
//!
//! fn example() -> fieldsmith_core::Result<()> {
//!     let fields = vec![FieldSpec::of("age", TypeTag::Number)
//!         .coerced()
//!         .rule(RuleKind::Min, "0")
//!         .rule(RuleKind::Int, "")];
//!
//!     let validator = compile(&fields)?;
//!     let from_source = evaluate_source(&emit(&fields)?)?;
//!
//!     let sample = Value::object([("age", Value::from("5"))]);
//!     assert!(validator.is_valid(&sample));
//!     assert!(from_source.is_valid(&sample));
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod backend;
pub mod emitter;
pub mod error;
pub mod expr;
pub mod interpreter;
pub mod ir;
pub mod lint;
pub mod lower;
pub mod model;
pub mod policy;
pub mod reader;
pub mod registry;
pub mod rules;
pub mod syntax;
pub mod value;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use value::{FunctionValue, ParsedType, PromiseState, Value};

pub use emitter::{emit, emit_with, EmitOptions};
pub use interpreter::{
    compile, compile_field, compile_with, Issue, IssueCode, ParseOutcome, ValidationIssues, Validator,
};
pub use lint::{lint, Diagnostic, DiagnosticKind, LintReport, Severity};
pub use lower::{lower, LowerOptions, Lowered};
pub use model::{FieldDocument, FieldSpec, RuleKind, TypeTag, ValidationRule};
pub use reader::{evaluate_source, evaluate_source_with, read_module};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
