//! Formula lexer
//!
//! A single alternation regex is matched repeatedly over the input; the first
//! alternative that matches at a position wins. Every byte of the input must be
//! covered by some match, otherwise lexing fails with
//! [`ParseError::UnknownToken`] naming the uncovered text.

use lazy_regex::regex;
use regex::Captures;

use crate::error::ParseError;
use crate::token::{Token, TokenKind};

/// Capture group names in alternation order, with the kind each produces
const GROUPS: [(&str, TokenKind); 10] = [
    ("lparen", TokenKind::LParen),
    ("rparen", TokenKind::RParen),
    ("plus", TokenKind::Plus),
    ("minus", TokenKind::Minus),
    ("value", TokenKind::Value),
    ("quoted", TokenKind::Quoted),
    ("times", TokenKind::Times),
    ("divided", TokenKind::Divided),
    ("comma", TokenKind::Comma),
    ("whitespace", TokenKind::Whitespace),
];

/// Split `text` into tokens, whitespace included
///
/// Concatenating the text of the returned tokens reproduces `text` exactly.
///
/// # Example
/// ```rust
/// use slate_sheets_formula::{tokenize, TokenKind};
///
/// let kinds: Vec<TokenKind> = tokenize("A1 - -2")
///     .unwrap()
///     .into_iter()
///     .map(|t| t.kind)
///     .collect();
/// assert_eq!(
///     kinds,
///     vec![
///         TokenKind::Value,
///         TokenKind::Whitespace,
///         TokenKind::Minus,
///         TokenKind::Value,
///     ]
/// );
/// ```
pub fn tokenize(text: &str) -> Result<Vec<Token>, ParseError> {
    // `minus` needs a trailing space so that `-1` lexes as a single value
    let lexer = regex!(
        r#"(?x)
        (?P<lparen>\()
        | (?P<rparen>\))
        | (?P<plus>\+)
        | (?P<minus>-\x20)
        | (?P<value>[a-zA-Z0-9:.\-]+)
        | (?P<quoted>"[^"]+")
        | (?P<times>\*)
        | (?P<divided>/)
        | (?P<comma>,)
        | (?P<whitespace>\s+)
        "#
    );

    let mut tokens = Vec::new();
    let mut last = 0;

    for caps in lexer.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        if whole.start() != last {
            return Err(ParseError::UnknownToken(text[last..whole.start()].to_string()));
        }
        last = whole.end();

        let kind = matched_kind(&caps)
            .ok_or_else(|| ParseError::UnknownToken(whole.as_str().to_string()))?;
        tokens.push(Token::new(kind, whole.as_str()));
    }

    if last != text.len() {
        return Err(ParseError::UnknownToken(text[last..].to_string()));
    }

    Ok(tokens)
}

fn matched_kind(caps: &Captures<'_>) -> Option<TokenKind> {
    GROUPS
        .iter()
        .find(|(name, _)| caps.name(name).is_some())
        .map(|(_, kind)| *kind)
}

/// Re-join a token stream into source text
pub fn untokenize<'a, I>(tokens: I) -> String
where
    I: IntoIterator<Item = &'a Token>,
{
    tokens.into_iter().map(|t| t.text.as_str()).collect()
}
