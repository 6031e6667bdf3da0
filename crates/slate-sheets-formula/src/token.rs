//! Formula tokens

use std::fmt;

/// The closed set of token kinds produced by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    LParen,
    RParen,
    /// Bare run of letters, digits, `:`, `.` and `-`: numbers, dates,
    /// references, ranges and identifiers
    Value,
    /// `"..."` with the quotes included in the token text
    Quoted,
    Plus,
    /// `-` followed by a space; a `-` glued to a value lexes as part of it
    Minus,
    Times,
    Divided,
    Comma,
    /// Synthesized at end of input, never produced by the lexer
    Eof,
    Whitespace,
}

impl TokenKind {
    /// English description used in parse error messages
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::Value => "a literal value",
            TokenKind::Quoted => "a quoted string",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Times => "*",
            TokenKind::Divided => "/",
            TokenKind::Comma => ",",
            TokenKind::Eof => "[end of string]",
            TokenKind::Whitespace => "whitespace",
        }
    }

    /// Upper-case name, as shown by token dumps
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::Value => "VALUE",
            TokenKind::Quoted => "QUOTED",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Times => "TIMES",
            TokenKind::Divided => "DIVIDED",
            TokenKind::Comma => "COMMA",
            TokenKind::Eof => "EOF",
            TokenKind::Whitespace => "WHITESPACE",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// A token: its kind plus the exact source text it covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    pub fn new<S: Into<String>>(kind: TokenKind, text: S) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    /// The end-of-input marker
    pub fn eof() -> Self {
        Self::new(TokenKind::Eof, "")
    }

    pub fn is_whitespace(&self) -> bool {
        self.kind == TokenKind::Whitespace
    }
}

/// Writes the source text, so joining a token stream reproduces its input
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
