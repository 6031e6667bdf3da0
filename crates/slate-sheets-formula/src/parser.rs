//! Formula parser
//!
//! A recursive descent parser over the lexer's token stream:
//!
//! ```text
//! expr    := sum
//! sum     := summand (('+' | '-') summand)*
//! summand := factor (('*' | '/') factor)*
//! factor  := VALUE '(' arglist ')' | VALUE | QUOTED | '(' expr ')'
//! arglist := expr (',' expr)*
//! ```
//!
//! The parser remembers every token kind it tried since the last successful
//! consume, so a failure can report exactly what would have been accepted.

use lazy_regex::regex_is_match;

use crate::ast::{BinaryOperator, FormulaExpr};
use crate::error::ParseError;
use crate::lexer::tokenize;
use crate::token::{Token, TokenKind};

/// Parse formula text (without the leading `=`) into an AST
///
/// # Example
/// ```rust
/// use slate_sheets_formula::{parse, FormulaExpr};
///
/// let ast = parse("a - b * c").unwrap();
/// assert_eq!(ast.to_sexpr(), "(- a (* b c))");
///
/// let ast = parse("sum(A1:A2, A3)").unwrap();
/// assert_eq!(ast.operator(), Some("sum"));
///
/// assert!(parse("1 + ").is_err());
/// ```
pub fn parse(formula: &str) -> Result<FormulaExpr, ParseError> {
    let tokens = tokenize(formula)?
        .into_iter()
        .filter(|token| !token.is_whitespace());
    FormulaParser::new(tokens).parse()
}

/// Parse a formula, accepting an optional leading `=`
pub fn parse_formula(formula: &str) -> Result<FormulaExpr, ParseError> {
    parse(formula.strip_prefix('=').unwrap_or(formula))
}

/// Formula parser
struct FormulaParser<I: Iterator<Item = Token>> {
    tokens: I,
    current: Token,
    /// Kinds tried since the last successful consume
    attempted: Vec<TokenKind>,
}

impl<I: Iterator<Item = Token>> FormulaParser<I> {
    fn new(mut tokens: I) -> Self {
        let current = tokens.next().unwrap_or_else(Token::eof);
        Self {
            tokens,
            current,
            attempted: Vec::new(),
        }
    }

    fn parse(mut self) -> Result<FormulaExpr, ParseError> {
        let expr = self.parse_expression()?;
        self.expect(TokenKind::Eof)?;
        Ok(expr)
    }

    // === Token handling ===

    /// Consume and return the current token if it has the given kind
    fn consume(&mut self, kind: TokenKind) -> Option<Token> {
        if self.current.kind == kind {
            let next = self.tokens.next().unwrap_or_else(Token::eof);
            self.attempted.clear();
            return Some(std::mem::replace(&mut self.current, next));
        }
        self.attempted.push(kind);
        None
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        match self.consume(kind) {
            Some(token) => Ok(token),
            None => Err(self.unexpected()),
        }
    }

    fn unexpected(&self) -> ParseError {
        ParseError::UnexpectedToken {
            expected: self.attempted.clone(),
            found: match self.current.kind {
                TokenKind::Eof => None,
                _ => Some(self.current.text.clone()),
            },
        }
    }

    // === Grammar ===

    fn parse_expression(&mut self) -> Result<FormulaExpr, ParseError> {
        self.parse_sum()
    }

    fn parse_sum(&mut self) -> Result<FormulaExpr, ParseError> {
        let mut left = self.parse_summand()?;

        loop {
            let op = if self.consume(TokenKind::Plus).is_some() {
                BinaryOperator::Add
            } else if self.consume(TokenKind::Minus).is_some() {
                BinaryOperator::Subtract
            } else {
                break;
            };

            let right = self.parse_summand()?;
            left = FormulaExpr::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_summand(&mut self) -> Result<FormulaExpr, ParseError> {
        let mut left = self.parse_factor()?;

        loop {
            let op = if self.consume(TokenKind::Times).is_some() {
                BinaryOperator::Multiply
            } else if self.consume(TokenKind::Divided).is_some() {
                BinaryOperator::Divide
            } else {
                break;
            };

            let right = self.parse_factor()?;
            left = FormulaExpr::binary(op, left, right);
        }

        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<FormulaExpr, ParseError> {
        if let Some(value) = self.consume(TokenKind::Value) {
            if self.consume(TokenKind::LParen).is_some() {
                return self.parse_function_call(value.text);
            }
            return Ok(FormulaExpr::Literal(value.text));
        }

        if let Some(quoted) = self.consume(TokenKind::Quoted) {
            return Ok(FormulaExpr::Text(quoted.text.trim_matches('"').to_string()));
        }

        if self.consume(TokenKind::LParen).is_some() {
            let expr = self.parse_expression()?;
            self.expect(TokenKind::RParen)?;
            return Ok(expr);
        }

        Err(self.unexpected())
    }

    fn parse_function_call(&mut self, name: String) -> Result<FormulaExpr, ParseError> {
        if !regex_is_match!(r"^[a-zA-Z]+$", &name) {
            return Err(ParseError::InvalidFunctionName(name));
        }

        let mut args = vec![self.parse_expression()?];
        while self.consume(TokenKind::Comma).is_some() {
            args.push(self.parse_expression()?);
        }
        self.expect(TokenKind::RParen)?;

        Ok(FormulaExpr::Function { name, args })
    }
}
