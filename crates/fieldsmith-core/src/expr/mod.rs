//! Expression language for `transform` and `refine` rule payloads
//!
//! Payloads are short JavaScript arrow functions written by the user in the
//! builder. The same parsed [`Expression`] is evaluated by the interpreter
//! and rendered back to source by the emitter, so both backends agree on what
//! a payload means. A payload that does not parse makes the owning rule a
//! no-op in both backends.
//!
//! # Example
//!
//! ```
//! use fieldsmith_core::expr::parse_expression;
//! use fieldsmith_core::Value;
//!
//! let expr = parse_expression("(s) => s.trim().length > 2").unwrap();
//! assert_eq!(expr.evaluate(&Value::from(" abc ")).unwrap(), Value::Bool(true));
//! assert_eq!(expr.to_string(), "(s) => s.trim().length > 2");
//! ```

pub mod ast;
pub mod eval;
pub mod parser;

pub use ast::{BinaryOp, Expr, Expression, Global, LogicalOp, UnaryOp};
pub use eval::EvalError;
pub use parser::{parse_arrow, parse_expression, DEFAULT_PARAM};
