//! Reference rewriting and collection
//!
//! Shifting works on the token stream rather than the tree, so a copied
//! formula keeps its original spacing and parenthesization.

use ahash::AHashSet;
use slate_sheets_core::{CellError, Index, Range};

use crate::ast::{is_reference_shaped, FormulaExpr};
use crate::error::ParseError;
use crate::lexer::{tokenize, untokenize};
use crate::token::{Token, TokenKind};

/// Move every cell reference in `formula` by `(delta_row, delta_col)`
///
/// `formula` is the text after the leading `=`. Single references and both
/// ends of a range move together. A reference pushed off the sheet is
/// replaced by `#REF!`, which no longer lexes, so the formula then evaluates
/// to the generic error. Literals that are not valid references are left
/// untouched.
///
/// # Example
/// ```rust
/// use slate_sheets_formula::shift_references;
///
/// assert_eq!(shift_references("A1 + sum(A2:B3)", 1, 1).unwrap(), "B2 + sum(B3:C4)");
/// assert_eq!(shift_references("A1 * 2", -1, 0).unwrap(), "#REF! * 2");
/// ```
pub fn shift_references(
    formula: &str,
    delta_row: i64,
    delta_col: i64,
) -> Result<String, ParseError> {
    let shifted: Vec<Token> = tokenize(formula)?
        .into_iter()
        .map(|token| match token.kind {
            TokenKind::Value => {
                Token::new(TokenKind::Value, shift_literal(&token.text, delta_row, delta_col))
            }
            _ => token,
        })
        .collect();
    Ok(untokenize(&shifted))
}

fn shift_literal(text: &str, delta_row: i64, delta_col: i64) -> String {
    let shift = |index: Index| index.offset(delta_row, delta_col);

    if is_reference_shaped(text) {
        return match Index::parse(text) {
            Ok(index) => shift(index)
                .map(|moved| moved.to_string())
                .unwrap_or_else(|| CellError::Ref.to_string()),
            Err(_) => text.to_string(),
        };
    }

    if let Some((first, last)) = text.split_once(':') {
        if let (Ok(first), Ok(last)) = (Index::parse(first), Index::parse(last)) {
            return match (shift(first), shift(last)) {
                (Some(first), Some(last)) => format!("{}:{}", first, last),
                _ => CellError::Ref.to_string(),
            };
        }
    }

    // `A1-A2` moves operand by operand
    if FormulaExpr::literal(text).as_subtraction().is_some() {
        return text
            .split('-')
            .map(|part| shift_literal(part, delta_row, delta_col))
            .collect::<Vec<_>>()
            .join("-");
    }

    text.to_string()
}

/// Every reference a parsed formula reads, in order of first appearance
///
/// Single-cell references come back as one-cell ranges. Ranges are not
/// expanded, so the result stays small however large the ranges are.
pub fn references(expr: &FormulaExpr) -> Vec<Range> {
    let mut seen = AHashSet::new();
    let mut out = Vec::new();
    collect(expr, &mut seen, &mut out);
    out
}

fn collect(expr: &FormulaExpr, seen: &mut AHashSet<Range>, out: &mut Vec<Range>) {
    match expr {
        FormulaExpr::Literal(_) => {
            let range = match (expr.as_reference(), expr.as_range()) {
                (Some(index), _) => Some(Range::single(index)),
                (None, Some(range)) => Some(range),
                (None, None) => {
                    if let Some(chain) = expr.as_subtraction() {
                        collect(&chain, seen, out);
                    }
                    None
                }
            };
            if let Some(range) = range {
                if seen.insert(range) {
                    out.push(range);
                }
            }
        }
        FormulaExpr::Text(_) => {}
        FormulaExpr::BinaryOp { left, right, .. } => {
            collect(left, seen, out);
            collect(right, seen, out);
        }
        FormulaExpr::Function { args, .. } => {
            for arg in args {
                collect(arg, seen, out);
            }
        }
    }
}
