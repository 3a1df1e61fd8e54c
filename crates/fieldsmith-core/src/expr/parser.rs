//! Recursive descent parser for transform and refine payloads
//!
//! Accepted forms are `val => body`, `(val) => body`, `() => body`,
//! `(val) => { return body; }` and a bare `body` over the implicit `val`
//! parameter. Identifiers other than the parameter and the whitelisted
//! globals are rejected here, so a payload that parses can never hit an
//! unbound name at evaluation time.
//!
//! Copyright (c) 2025 Fieldsmith Team
//! Licensed under the Apache-2.0 license

use super::ast::*;
use crate::syntax::{tokenize, Cursor, Punct, TokenKind};
use crate::Result;

/// Parameter name used when a payload has no arrow prefix
pub const DEFAULT_PARAM: &str = "val";

/// Expression parser over a token cursor
pub struct Parser<'c> {
    cursor: &'c mut Cursor,
    param: String,
}

/// Parse a complete payload; trailing tokens are an error
pub fn parse_expression(input: &str) -> Result<Expression> {
    let mut cursor = Cursor::new(tokenize(input)?);
    let expression = parse_arrow(&mut cursor)?;
    cursor.eat(Punct::Semi);
    if !cursor.is_at_end() {
        return Err(cursor.unexpected("end of expression"));
    }
    Ok(expression)
}

/// Parse an arrow function or bare body at the cursor
pub fn parse_arrow(cursor: &mut Cursor) -> Result<Expression> {
    let param = match (cursor.peek_at(0), cursor.peek_at(1), cursor.peek_at(2), cursor.peek_at(3)) {
        (TokenKind::Ident(name), TokenKind::Punct(Punct::Arrow), _, _) => {
            let name = name.clone();
            cursor.advance();
            cursor.advance();
            Some(name)
        }
        (
            TokenKind::Punct(Punct::LParen),
            TokenKind::Ident(name),
            TokenKind::Punct(Punct::RParen),
            TokenKind::Punct(Punct::Arrow),
        ) => {
            let name = name.clone();
            for _ in 0..4 {
                cursor.advance();
            }
            Some(name)
        }
        (
            TokenKind::Punct(Punct::LParen),
            TokenKind::Punct(Punct::RParen),
            TokenKind::Punct(Punct::Arrow),
            _,
        ) => {
            for _ in 0..3 {
                cursor.advance();
            }
            Some(DEFAULT_PARAM.to_string())
        }
        _ => None,
    };
    let has_arrow = param.is_some();
    let param = param.unwrap_or_else(|| DEFAULT_PARAM.to_string());
    if is_reserved(&param) {
        return Err(cursor.error(format!("'{}' cannot be used as a parameter name", param)));
    }

    let mut parser = Parser {
        cursor,
        param: param.clone(),
    };
    let body = if has_arrow && parser.cursor.check(Punct::LBrace) {
        parser.parse_block_body()?
    } else {
        parser.parse_conditional()?
    };
    Ok(Expression::new(param, body))
}

fn is_reserved(name: &str) -> bool {
    matches!(
        name,
        "true" | "false" | "null" | "undefined" | "typeof" | "return" | "this" | "new"
    ) || Global::from_name(name).is_some()
}

impl<'c> Parser<'c> {
    fn parse_block_body(&mut self) -> Result<Expr> {
        self.cursor.expect(Punct::LBrace)?;
        self.cursor.expect_keyword("return")?;
        let body = self.parse_conditional()?;
        self.cursor.eat(Punct::Semi);
        self.cursor.expect(Punct::RBrace)?;
        Ok(body)
    }

    fn parse_conditional(&mut self) -> Result<Expr> {
        let test = self.parse_nullish()?;
        if !self.cursor.eat(Punct::Question) {
            return Ok(test);
        }
        let consequent = self.parse_conditional()?;
        self.cursor.expect(Punct::Colon)?;
        let alternate = self.parse_conditional()?;
        Ok(Expr::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        })
    }

    fn parse_nullish(&mut self) -> Result<Expr> {
        let mut left = self.parse_or()?;
        while self.cursor.eat(Punct::Nullish) {
            let right = self.parse_or()?;
            left = logical(LogicalOp::Nullish, left, right);
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Expr> {
        let mut left = self.parse_and()?;
        while self.cursor.eat(Punct::OrOr) {
            let right = self.parse_and()?;
            left = logical(LogicalOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut left = self.parse_binary(5)?;
        while self.cursor.eat(Punct::AndAnd) {
            let right = self.parse_binary(5)?;
            left = logical(LogicalOp::And, left, right);
        }
        Ok(left)
    }

    /// Precedence climbing over the binary operator table
    fn parse_binary(&mut self, min_precedence: u8) -> Result<Expr> {
        let mut left = self.parse_unary()?;
        while let Some(op) = self.peek_binary_op() {
            if op.precedence() < min_precedence {
                break;
            }
            self.cursor.advance();
            let right = self.parse_binary(op.precedence() + 1)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn peek_binary_op(&self) -> Option<BinaryOp> {
        let punct = match self.cursor.peek() {
            TokenKind::Punct(p) => *p,
            _ => return None,
        };
        Some(match punct {
            Punct::Plus => BinaryOp::Add,
            Punct::Minus => BinaryOp::Sub,
            Punct::Star => BinaryOp::Mul,
            Punct::Slash => BinaryOp::Div,
            Punct::Percent => BinaryOp::Rem,
            Punct::StrictEq => BinaryOp::StrictEq,
            Punct::StrictNe => BinaryOp::StrictNe,
            Punct::LooseEq => BinaryOp::LooseEq,
            Punct::LooseNe => BinaryOp::LooseNe,
            Punct::Lt => BinaryOp::Lt,
            Punct::Le => BinaryOp::Le,
            Punct::Gt => BinaryOp::Gt,
            Punct::Ge => BinaryOp::Ge,
            _ => return None,
        })
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        let op = match self.cursor.peek() {
            TokenKind::Punct(Punct::Bang) => Some(UnaryOp::Not),
            TokenKind::Punct(Punct::Minus) => Some(UnaryOp::Neg),
            TokenKind::Punct(Punct::Plus) => Some(UnaryOp::Plus),
            TokenKind::Ident(name) if name == "typeof" => Some(UnaryOp::TypeOf),
            _ => None,
        };
        match op {
            Some(op) => {
                self.cursor.advance();
                let operand = self.parse_unary()?;
                Ok(Expr::Unary {
                    op,
                    operand: Box::new(operand),
                })
            }
            None => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> Result<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            if self.cursor.eat(Punct::Dot) {
                let property = self.cursor.expect_ident()?;
                expr = Expr::Member {
                    object: Box::new(expr),
                    property,
                };
            } else if self.cursor.eat(Punct::LBracket) {
                let index = self.parse_conditional()?;
                self.cursor.expect(Punct::RBracket)?;
                expr = Expr::Index {
                    object: Box::new(expr),
                    index: Box::new(index),
                };
            } else if self.cursor.eat(Punct::LParen) {
                let args = self.parse_list(Punct::RParen)?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                };
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_list(&mut self, close: Punct) -> Result<Vec<Expr>> {
        let mut items = Vec::new();
        while !self.cursor.check(close) {
            items.push(self.parse_conditional()?);
            if !self.cursor.eat(Punct::Comma) {
                break;
            }
        }
        self.cursor.expect(close)?;
        Ok(items)
    }

    fn parse_primary(&mut self) -> Result<Expr> {
        match self.cursor.advance() {
            TokenKind::Num(n) => Ok(Expr::Number(n)),
            TokenKind::Str(s) => Ok(Expr::String(s)),
            TokenKind::BigInt(_) => Err(self.cursor.error("BigInt literals are not supported in expressions")),
            TokenKind::Punct(Punct::LParen) => {
                let inner = self.parse_conditional()?;
                self.cursor.expect(Punct::RParen)?;
                Ok(inner)
            }
            TokenKind::Punct(Punct::LBracket) => Ok(Expr::Array(self.parse_list(Punct::RBracket)?)),
            TokenKind::Ident(name) => self.resolve_identifier(&name),
            other => Err(self.cursor.error(format!("Unexpected {}", other.describe()))),
        }
    }

    fn resolve_identifier(&self, name: &str) -> Result<Expr> {
        if name == self.param {
            return Ok(Expr::Param);
        }
        match name {
            "true" => Ok(Expr::Bool(true)),
            "false" => Ok(Expr::Bool(false)),
            "null" => Ok(Expr::Null),
            "undefined" => Ok(Expr::Undefined),
            _ => Global::from_name(name)
                .map(Expr::Global)
                .ok_or_else(|| self.cursor.error(format!("Unknown identifier '{}'", name))),
        }
    }
}

fn logical(op: LogicalOp, left: Expr, right: Expr) -> Expr {
    Expr::Logical {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(input: &str) -> Expr {
        parse_expression(input).unwrap().body
    }

    #[test]
    fn test_arrow_forms() {
        assert_eq!(parse_expression("v => v").unwrap().param, "v");
        assert_eq!(parse_expression("(x) => x").unwrap().param, "x");
        assert_eq!(parse_expression("() => 1").unwrap().param, "val");
        assert_eq!(parse_expression("val.length").unwrap().param, "val");
        assert_eq!(
            body("(s) => { return s.trim(); }"),
            body("(s) => s.trim()")
        );
    }

    #[test]
    fn test_precedence() {
        let expr = body("1 + 2 * 3 > 6 && val");
        match expr {
            Expr::Logical { op: LogicalOp::And, left, .. } => match *left {
                Expr::Binary { op: BinaryOp::Gt, left, .. } => {
                    assert!(matches!(*left, Expr::Binary { op: BinaryOp::Add, .. }));
                }
                other => panic!("unexpected {:?}", other),
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_left_associativity() {
        let expr = body("10 - 4 - 3");
        assert_eq!(expr.render("val"), "10 - 4 - 3");
        assert!(matches!(expr, Expr::Binary { op: BinaryOp::Sub, ref left, .. } if matches!(**left, Expr::Binary { .. })));
    }

    #[test]
    fn test_unknown_identifier_rejected() {
        assert!(parse_expression("(v) => process.exit(1)").is_err());
        assert!(parse_expression("val + other").is_err());
        assert!(parse_expression("(Math) => Math").is_err());
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        assert!(parse_expression("val val").is_err());
        assert!(parse_expression("val.trim(").is_err());
        assert!(parse_expression("").is_err());
    }

    #[test]
    fn test_render_reparses_to_same_tree() {
        for source in [
            "(val) => val.trim().toLowerCase()",
            "(v) => v.length >= 3 && v.length <= 10",
            "(n) => (n + 1) * 2",
            "(n) => -(-n)",
            "(s) => s === \"a\\\"b\" ? 1 : typeof s",
            "(x) => (x ?? 0) || 1",
            "(x) => x[0] + Math.max(1, 2)",
            "(x) => (5).toFixed(2)",
        ] {
            let parsed = parse_expression(source).unwrap();
            let rendered = parsed.to_string();
            assert_eq!(parse_expression(&rendered).unwrap(), parsed, "{}", rendered);
        }
    }
}
