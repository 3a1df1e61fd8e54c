//! Shared JavaScript-subset syntax
//!
//! Transform and refine payloads and emitted schema modules are both written
//! in a small subset of JavaScript. They share one tokenizer so that text the
//! emitter writes is always text the reader and the expression parser accept.

pub mod cursor;
pub mod lexer;

pub use cursor::Cursor;
pub use lexer::{tokenize, Lexer, Punct, Token, TokenKind};
