//! Formula error types

use thiserror::Error;

use crate::token::TokenKind;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors raised while lexing or parsing formula text
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// Input text not covered by any token pattern
    #[error("Unknown token '{0}'")]
    UnknownToken(String),

    /// The current token is not one the grammar accepts here
    #[error("Expected one of: {}; got {}", describe_kinds(.expected), describe_found(.found))]
    UnexpectedToken {
        /// Every token kind tried since the last successful consume
        expected: Vec<TokenKind>,
        /// Text of the offending token, `None` at end of input
        found: Option<String>,
    },

    /// A call whose callee is not purely alphabetic
    #[error("{0} is not a valid function name")]
    InvalidFunctionName(String),
}

fn describe_kinds(kinds: &[TokenKind]) -> String {
    kinds
        .iter()
        .map(TokenKind::describe)
        .collect::<Vec<_>>()
        .join(", ")
}

fn describe_found(found: &Option<String>) -> String {
    match found {
        Some(text) => format!("'{}'", text),
        None => TokenKind::Eof.describe().to_string(),
    }
}

/// Errors that can occur during formula evaluation
///
/// None of these reach a cell as-is: the evaluator renders every one of them
/// as the generic `#ERROR!` value.
#[derive(Debug, Error)]
pub enum FormulaError {
    /// Formula parse error
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Unknown function
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Wrong number of arguments
    #[error("Wrong number of arguments for {function}: expected {expected}, got {actual}")]
    ArgumentCount {
        function: String,
        expected: String,
        actual: usize,
    },

    /// Operand of the wrong type for an operator or function
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// Formula evaluation error
    #[error("Evaluation error: {0}")]
    Evaluation(String),
}
