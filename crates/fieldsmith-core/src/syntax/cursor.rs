//! Token cursor shared by the expression parser and the source reader

use super::lexer::{Punct, Token, TokenKind};
use crate::error::Position;
use crate::{Error, Result};

/// Forward-only view over a token vector that always ends with `Eof`
#[derive(Debug, Clone)]
pub struct Cursor {
    tokens: Vec<Token>,
    index: usize,
}

impl Cursor {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| &t.kind) != Some(&TokenKind::Eof) {
            let position = tokens
                .last()
                .map(|t| t.position)
                .unwrap_or(Position { line: 1, column: 1 });
            tokens.push(Token {
                kind: TokenKind::Eof,
                position,
            });
        }
        Self { tokens, index: 0 }
    }

    pub fn peek(&self) -> &TokenKind {
        self.peek_at(0)
    }

    pub fn peek_at(&self, ahead: usize) -> &TokenKind {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.index + ahead).min(last)].kind
    }

    pub fn position(&self) -> Position {
        let last = self.tokens.len() - 1;
        self.tokens[self.index.min(last)].position
    }

    pub fn is_at_end(&self) -> bool {
        self.peek() == &TokenKind::Eof
    }

    pub fn advance(&mut self) -> TokenKind {
        let kind = self.peek().clone();
        if self.index < self.tokens.len() - 1 {
            self.index += 1;
        }
        kind
    }

    pub fn check(&self, punct: Punct) -> bool {
        self.peek() == &TokenKind::Punct(punct)
    }

    pub fn check_ident(&self, name: &str) -> bool {
        matches!(self.peek(), TokenKind::Ident(ident) if ident == name)
    }

    /// Consume the punctuator if it is next
    pub fn eat(&mut self, punct: Punct) -> bool {
        if self.check(punct) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn expect(&mut self, punct: Punct) -> Result<()> {
        if self.eat(punct) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", punct.as_str())))
        }
    }

    pub fn expect_ident(&mut self) -> Result<String> {
        match self.peek() {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    pub fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        if self.check_ident(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", keyword)))
        }
    }

    pub fn expect_string(&mut self) -> Result<String> {
        match self.peek() {
            TokenKind::Str(value) => {
                let value = value.clone();
                self.advance();
                Ok(value)
            }
            _ => Err(self.unexpected("string literal")),
        }
    }

    /// Build an "expected X, found Y" error at the current token
    pub fn unexpected(&self, expected: &str) -> Error {
        self.error(format!("Expected {}, found {}", expected, self.peek().describe()))
    }

    pub fn error(&self, message: impl Into<String>) -> Error {
        let position = self.position();
        Error::parse(message, position.line, position.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::tokenize;

    #[test]
    fn test_cursor_navigation() {
        let mut cursor = Cursor::new(tokenize("z.string()").unwrap());
        assert!(cursor.check_ident("z"));
        assert_eq!(cursor.expect_ident().unwrap(), "z");
        assert!(cursor.eat(Punct::Dot));
        assert_eq!(cursor.peek_at(1), &TokenKind::Punct(Punct::LParen));
        cursor.expect_keyword("string").unwrap();
        cursor.expect(Punct::LParen).unwrap();
        cursor.expect(Punct::RParen).unwrap();
        assert!(cursor.is_at_end());
        // Advancing past the end stays on Eof.
        cursor.advance();
        assert!(cursor.is_at_end());
    }

    #[test]
    fn test_unexpected_message() {
        let mut cursor = Cursor::new(tokenize("z ;").unwrap());
        cursor.advance();
        let err = cursor.expect(Punct::Dot).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Parse error at line 1, column 3: Expected '.', found ';'"
        );
    }
}
