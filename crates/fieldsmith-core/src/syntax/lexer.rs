//! Tokenizer for the JavaScript subset shared by expressions and emitted source
//!
//! Copyright (c) 2025 Fieldsmith Team
//! Licensed under the Apache-2.0 license

use crate::error::Position;
use crate::value::is_js_whitespace;
use crate::{Error, Result};
use std::iter::Peekable;
use std::str::Chars;

/// Punctuators recognized by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punct {
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Dot,
    Colon,
    Semi,
    Question,
    Arrow,
    StrictEq,
    StrictNe,
    LooseEq,
    LooseNe,
    Le,
    Ge,
    Lt,
    Gt,
    AndAnd,
    OrOr,
    Nullish,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Assign,
}

impl Punct {
    pub fn as_str(self) -> &'static str {
        match self {
            Punct::LParen => "(",
            Punct::RParen => ")",
            Punct::LBracket => "[",
            Punct::RBracket => "]",
            Punct::LBrace => "{",
            Punct::RBrace => "}",
            Punct::Comma => ",",
            Punct::Dot => ".",
            Punct::Colon => ":",
            Punct::Semi => ";",
            Punct::Question => "?",
            Punct::Arrow => "=>",
            Punct::StrictEq => "===",
            Punct::StrictNe => "!==",
            Punct::LooseEq => "==",
            Punct::LooseNe => "!=",
            Punct::Le => "<=",
            Punct::Ge => ">=",
            Punct::Lt => "<",
            Punct::Gt => ">",
            Punct::AndAnd => "&&",
            Punct::OrOr => "||",
            Punct::Nullish => "??",
            Punct::Plus => "+",
            Punct::Minus => "-",
            Punct::Star => "*",
            Punct::Slash => "/",
            Punct::Percent => "%",
            Punct::Bang => "!",
            Punct::Assign => "=",
        }
    }
}

// Longest spellings first so `===` wins over `==` and `=`.
const PUNCTUATORS: &[(&str, Punct)] = &[
    ("===", Punct::StrictEq),
    ("!==", Punct::StrictNe),
    ("=>", Punct::Arrow),
    ("==", Punct::LooseEq),
    ("!=", Punct::LooseNe),
    ("<=", Punct::Le),
    (">=", Punct::Ge),
    ("&&", Punct::AndAnd),
    ("||", Punct::OrOr),
    ("??", Punct::Nullish),
    ("(", Punct::LParen),
    (")", Punct::RParen),
    ("[", Punct::LBracket),
    ("]", Punct::RBracket),
    ("{", Punct::LBrace),
    ("}", Punct::RBrace),
    (",", Punct::Comma),
    (".", Punct::Dot),
    (":", Punct::Colon),
    (";", Punct::Semi),
    ("?", Punct::Question),
    ("<", Punct::Lt),
    (">", Punct::Gt),
    ("+", Punct::Plus),
    ("-", Punct::Minus),
    ("*", Punct::Star),
    ("/", Punct::Slash),
    ("%", Punct::Percent),
    ("!", Punct::Bang),
    ("=", Punct::Assign),
];

/// Token payload
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Str(String),
    Num(f64),
    BigInt(i128),
    Punct(Punct),
    Eof,
}

impl TokenKind {
    /// Short description used in error messages
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident(name) => format!("identifier '{}'", name),
            TokenKind::Str(_) => "string literal".to_string(),
            TokenKind::Num(n) => format!("number {}", n),
            TokenKind::BigInt(n) => format!("bigint {}n", n),
            TokenKind::Punct(p) => format!("'{}'", p.as_str()),
            TokenKind::Eof => "end of input".to_string(),
        }
    }
}

/// A token with its source position
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Position,
}

/// Character-level scanner
pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<Chars<'a>>,
    offset: usize,
    line: usize,
    column: usize,
}

/// Tokenize a whole input, ending with an `Eof` token
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().peekable(),
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    /// Scan the next token
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_trivia()?;
        let position = self.position();
        let kind = match self.current_char() {
            None => TokenKind::Eof,
            Some(ch) if ch == '"' || ch == '\'' => TokenKind::Str(self.scan_string(ch)?),
            Some(ch) if ch.is_ascii_digit() => self.scan_number()?,
            Some('.') if self.peek_char().is_some_and(|c| c.is_ascii_digit()) => self.scan_number()?,
            Some(ch) if is_ident_start(ch) => TokenKind::Ident(self.scan_identifier()),
            Some(ch) => TokenKind::Punct(self.scan_punct(ch)?),
        };
        Ok(Token { kind, position })
    }

    fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::parse(message, self.line, self.column)
    }

    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match self.current_char() {
                Some(ch) if is_js_whitespace(ch) => {
                    self.advance();
                }
                Some('/') if self.peek_char() == Some('/') => {
                    while let Some(ch) = self.current_char() {
                        if ch == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some('/') if self.peek_char() == Some('*') => {
                    self.advance();
                    self.advance();
                    loop {
                        match self.advance() {
                            Some('*') if self.current_char() == Some('/') => {
                                self.advance();
                                break;
                            }
                            Some(_) => {}
                            None => return Err(self.error("Unterminated block comment")),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn scan_identifier(&mut self) -> String {
        let mut name = String::new();
        while let Some(ch) = self.current_char() {
            if is_ident_part(ch) {
                name.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        name
    }

    fn scan_punct(&mut self, first: char) -> Result<Punct> {
        let input = self.input;
        let rest = &input[self.offset..];
        for (spelling, punct) in PUNCTUATORS {
            if rest.starts_with(spelling) {
                for _ in 0..spelling.len() {
                    self.advance();
                }
                return Ok(*punct);
            }
        }
        Err(self.error(format!("Unexpected character '{}'", first)))
    }

    fn scan_number(&mut self) -> Result<TokenKind> {
        if self.current_char() == Some('0') {
            let radix = match self.peek_char() {
                Some('x' | 'X') => Some(16),
                Some('o' | 'O') => Some(8),
                Some('b' | 'B') => Some(2),
                _ => None,
            };
            if let Some(radix) = radix {
                self.advance();
                self.advance();
                let mut digits = String::new();
                while let Some(ch) = self.current_char() {
                    if ch.is_digit(radix) {
                        digits.push(ch);
                        self.advance();
                    } else {
                        break;
                    }
                }
                let value = i128::from_str_radix(&digits, radix)
                    .map_err(|_| self.error("Malformed numeric literal"))?;
                if self.current_char() == Some('n') {
                    self.advance();
                    return Ok(TokenKind::BigInt(value));
                }
                return Ok(TokenKind::Num(value as f64));
            }
        }

        let mut text = String::new();
        let mut integral = true;
        self.take_digits(&mut text);
        if self.current_char() == Some('.') {
            integral = false;
            text.push('.');
            self.advance();
            self.take_digits(&mut text);
        }
        if matches!(self.current_char(), Some('e' | 'E')) {
            integral = false;
            text.push('e');
            self.advance();
            if let Some(sign @ ('+' | '-')) = self.current_char() {
                text.push(sign);
                self.advance();
            }
            self.take_digits(&mut text);
        }
        if integral && self.current_char() == Some('n') {
            self.advance();
            return text
                .parse::<i128>()
                .map(TokenKind::BigInt)
                .map_err(|_| self.error("Malformed bigint literal"));
        }
        if self.current_char().is_some_and(is_ident_start) {
            return Err(self.error("Identifier directly after number"));
        }
        text.parse::<f64>()
            .map(TokenKind::Num)
            .map_err(|_| self.error(format!("Malformed numeric literal '{}'", text)))
    }

    fn take_digits(&mut self, text: &mut String) {
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.advance();
            } else if ch == '_' && self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn scan_string(&mut self, quote: char) -> Result<String> {
        self.advance(); // consume opening quote
        let mut string = String::new();
        loop {
            let ch = match self.advance() {
                Some(ch) => ch,
                None => return Err(self.error("Unterminated string literal")),
            };
            if ch == quote {
                return Ok(string);
            }
            if ch == '\n' {
                return Err(self.error("Line break inside string literal"));
            }
            if ch != '\\' {
                string.push(ch);
                continue;
            }
            let escaped = match self.advance() {
                Some(ch) => ch,
                None => return Err(self.error("Unterminated escape sequence")),
            };
            match escaped {
                'n' => string.push('\n'),
                'r' => string.push('\r'),
                't' => string.push('\t'),
                'b' => string.push('\u{8}'),
                'f' => string.push('\u{c}'),
                'v' => string.push('\u{b}'),
                '0' => string.push('\0'),
                '\n' => {}
                'x' => {
                    let code = self.take_hex(2)?;
                    string.push(char::from_u32(code).ok_or_else(|| self.error("Invalid \\x escape"))?);
                }
                'u' => self.scan_unicode_escape(&mut string)?,
                other => string.push(other),
            }
        }
    }

    fn scan_unicode_escape(&mut self, out: &mut String) -> Result<()> {
        let code = if self.current_char() == Some('{') {
            self.advance();
            let mut code = 0u32;
            loop {
                match self.advance() {
                    Some('}') => break,
                    Some(ch) => {
                        let digit = ch.to_digit(16).ok_or_else(|| self.error("Invalid \\u{} escape"))?;
                        code = code.saturating_mul(16).saturating_add(digit);
                    }
                    None => return Err(self.error("Unterminated \\u{} escape")),
                }
            }
            code
        } else {
            self.take_hex(4)?
        };

        if (0xD800..0xDC00).contains(&code) {
            // High surrogate; pair it with a following \uXXXX low surrogate.
            if self.current_char() == Some('\\') && self.peek_char() == Some('u') {
                self.advance();
                self.advance();
                let low = self.take_hex(4)?;
                if (0xDC00..0xE000).contains(&low) {
                    let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                    out.push(char::from_u32(combined).unwrap_or('\u{fffd}'));
                    return Ok(());
                }
                out.push('\u{fffd}');
                out.push(char::from_u32(low).unwrap_or('\u{fffd}'));
                return Ok(());
            }
        }
        out.push(char::from_u32(code).unwrap_or('\u{fffd}'));
        Ok(())
    }

    fn take_hex(&mut self, count: usize) -> Result<u32> {
        let mut code = 0u32;
        for _ in 0..count {
            let digit = self
                .advance()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.error("Invalid hexadecimal escape"))?;
            code = code * 16 + digit;
        }
        Ok(code)
    }

    /// Get current character without advancing
    fn current_char(&self) -> Option<char> {
        self.chars.clone().next()
    }

    /// Get next character without advancing
    fn peek_char(&self) -> Option<char> {
        let mut clone = self.chars.clone();
        clone.next();
        clone.next()
    }

    /// Advance to next character
    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        self.offset += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }
}

pub fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

pub fn is_ident_part(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_arrow_and_member_chain() {
        assert_eq!(
            kinds("(val) => val.length >= 3"),
            vec![
                TokenKind::Punct(Punct::LParen),
                TokenKind::Ident("val".into()),
                TokenKind::Punct(Punct::RParen),
                TokenKind::Punct(Punct::Arrow),
                TokenKind::Ident("val".into()),
                TokenKind::Punct(Punct::Dot),
                TokenKind::Ident("length".into()),
                TokenKind::Punct(Punct::Ge),
                TokenKind::Num(3.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(kinds("12n")[0], TokenKind::BigInt(12));
        assert_eq!(kinds("0x1F")[0], TokenKind::Num(31.0));
        assert_eq!(kinds("2.5e3")[0], TokenKind::Num(2500.0));
        assert_eq!(kinds(".5")[0], TokenKind::Num(0.5));
        assert!(tokenize("12abc").is_err());
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            kinds(r#""he said \"hi\"\n""#)[0],
            TokenKind::Str("he said \"hi\"\n".into())
        );
        assert_eq!(kinds(r"'é\x41'")[0], TokenKind::Str("éA".into()));
        assert_eq!(kinds(r#""😀""#)[0], TokenKind::Str("😀".into()));
        assert_eq!(kinds(r#""\u{1F600}""#)[0], TokenKind::Str("😀".into()));
        assert!(tokenize("\"open").is_err());
    }

    #[test]
    fn test_comments_and_positions() {
        let tokens = tokenize("// header\n/* block */ z").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Ident("z".into()));
        assert_eq!(tokens[0].position, Position { line: 2, column: 13 });
    }

    #[test]
    fn test_longest_punctuator_wins() {
        assert_eq!(
            kinds("a === b !== c ?? d"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::Punct(Punct::StrictEq),
                TokenKind::Ident("b".into()),
                TokenKind::Punct(Punct::StrictNe),
                TokenKind::Ident("c".into()),
                TokenKind::Punct(Punct::Nullish),
                TokenKind::Ident("d".into()),
                TokenKind::Eof,
            ]
        );
    }
}
