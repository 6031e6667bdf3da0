//! Formula Abstract Syntax Tree types
//!
//! The tree keeps literals as the exact text of their token. Deciding whether
//! a literal is a number, a cell reference or a range happens at evaluation
//! time, so the tree can be re-rendered without loss.

use std::fmt;

use slate_sheets_core::{Index, Range};

/// Formula expression AST
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaExpr {
    /// Bare literal: number, date, cell reference, range or identifier
    Literal(String),
    /// Quoted string literal, quotes stripped
    Text(String),

    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<FormulaExpr>,
        right: Box<FormulaExpr>,
    },

    /// Function call
    Function { name: String, args: Vec<FormulaExpr> },
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOperator {
    /// The operator symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
        }
    }

    /// Binding strength; higher binds tighter
    pub fn precedence(&self) -> u8 {
        match self {
            BinaryOperator::Add | BinaryOperator::Subtract => 1,
            BinaryOperator::Multiply | BinaryOperator::Divide => 2,
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FormulaExpr {
    pub fn literal<S: Into<String>>(text: S) -> Self {
        FormulaExpr::Literal(text.into())
    }

    pub fn text<S: Into<String>>(text: S) -> Self {
        FormulaExpr::Text(text.into())
    }

    pub fn binary(op: BinaryOperator, left: FormulaExpr, right: FormulaExpr) -> Self {
        FormulaExpr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn function<S: Into<String>>(name: S, args: Vec<FormulaExpr>) -> Self {
        FormulaExpr::Function {
            name: name.into(),
            args,
        }
    }

    /// The operator symbol or function name, for call nodes
    pub fn operator(&self) -> Option<&str> {
        match self {
            FormulaExpr::BinaryOp { op, .. } => Some(op.symbol()),
            FormulaExpr::Function { name, .. } => Some(name),
            _ => None,
        }
    }

    /// The operands of a call node, in order; empty for literals
    pub fn operands(&self) -> Vec<&FormulaExpr> {
        match self {
            FormulaExpr::BinaryOp { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            FormulaExpr::Function { args, .. } => args.iter().collect(),
            _ => Vec::new(),
        }
    }

    /// The literal text of a leaf node
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            FormulaExpr::Literal(s) | FormulaExpr::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The cell this literal refers to, if it is a single-cell reference
    pub fn as_reference(&self) -> Option<Index> {
        match self {
            FormulaExpr::Literal(s) if is_reference_shaped(s) => Index::parse(s).ok(),
            _ => None,
        }
    }

    /// The range this literal denotes, if it is `<Index>:<Index>`
    pub fn as_range(&self) -> Option<Range> {
        match self {
            FormulaExpr::Literal(s) if s.contains(':') => Range::parse(s).ok(),
            _ => None,
        }
    }

    /// The subtraction a literal such as `A1-A2` stands for
    ///
    /// The lexer keeps `-` without a following space inside a value, so
    /// `A1-A2`, `2-1` and `-A1` arrive as single literals. Each `-` separates
    /// two operands, and a `-` with nothing before it negates the operand that
    /// follows (`0 - x`). Every operand must be a number or reference-shaped,
    /// and date literals (`2018-01-01`) are left alone.
    pub fn as_subtraction(&self) -> Option<FormulaExpr> {
        match self {
            FormulaExpr::Literal(s) => split_subtraction(s),
            _ => None,
        }
    }

    /// Render the tree as an s-expression: `(- a (* b c))`
    pub fn to_sexpr(&self) -> String {
        match self {
            FormulaExpr::Literal(s) => s.clone(),
            FormulaExpr::Text(s) => format!("\"{}\"", s),
            FormulaExpr::BinaryOp { op, left, right } => {
                format!("({} {} {})", op, left.to_sexpr(), right.to_sexpr())
            }
            FormulaExpr::Function { name, args } => {
                let mut out = format!("({}", name);
                for arg in args {
                    out.push(' ');
                    out.push_str(&arg.to_sexpr());
                }
                out.push(')');
                out
            }
        }
    }

    fn fmt_operand(
        &self,
        f: &mut fmt::Formatter<'_>,
        parent: BinaryOperator,
        right_side: bool,
    ) -> fmt::Result {
        let needs_parens = match self {
            FormulaExpr::BinaryOp { op, .. } => {
                op.precedence() < parent.precedence()
                    || (right_side && op.precedence() == parent.precedence())
            }
            _ => false,
        };
        if needs_parens {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

/// Check whether a literal has the shape of a single-cell reference
///
/// Shape only: `AB1` is reference-shaped but not a valid [`Index`].
pub fn is_reference_shaped(text: &str) -> bool {
    lazy_regex::regex_is_match!(r"^[A-Za-z]+[0-9]+$", text)
}

fn is_date_shaped(text: &str) -> bool {
    lazy_regex::regex_is_match!(r"^(?:[0-9]{4}-[0-9]{2}-[0-9]{2}|[0-9]{2}-[0-9]{2}-[0-9]{4})$", text)
}

fn is_operand(text: &str) -> bool {
    is_reference_shaped(text) || text.parse::<f64>().map_or(false, f64::is_finite)
}

fn split_subtraction(text: &str) -> Option<FormulaExpr> {
    if !text.contains('-') || text.contains(':') || is_date_shaped(text) {
        return None;
    }

    let mut chain: Option<FormulaExpr> = None;
    let mut negations = 0usize;
    for part in text.split('-') {
        if part.is_empty() {
            negations += 1;
            continue;
        }
        if !is_operand(part) {
            return None;
        }

        let mut term = FormulaExpr::literal(part);
        for _ in 0..negations {
            term = FormulaExpr::binary(BinaryOperator::Subtract, FormulaExpr::literal("0"), term);
        }
        negations = 0;

        chain = Some(match chain {
            None => term,
            Some(left) => FormulaExpr::binary(BinaryOperator::Subtract, left, term),
        });
    }

    // A trailing `-` has no operand
    if negations > 0 {
        return None;
    }
    chain
}

/// Renders formula text (without a leading `=`) that parses back to the same tree
impl fmt::Display for FormulaExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulaExpr::Literal(s) => f.write_str(s),
            FormulaExpr::Text(s) => write!(f, "\"{}\"", s),
            FormulaExpr::BinaryOp { op, left, right } => {
                left.fmt_operand(f, *op, false)?;
                // `-` only lexes as an operator when followed by a space
                write!(f, " {} ", op)?;
                right.fmt_operand(f, *op, true)
            }
            FormulaExpr::Function { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lit(s: &str) -> FormulaExpr {
        FormulaExpr::literal(s)
    }

    #[test]
    fn test_display_parenthesizes_by_precedence() {
        // a - (b - c)
        let expr = FormulaExpr::binary(
            BinaryOperator::Subtract,
            lit("a"),
            FormulaExpr::binary(BinaryOperator::Subtract, lit("b"), lit("c")),
        );
        assert_eq!(expr.to_string(), "a - (b - c)");

        // (a + b) * c
        let expr = FormulaExpr::binary(
            BinaryOperator::Multiply,
            FormulaExpr::binary(BinaryOperator::Add, lit("a"), lit("b")),
            lit("c"),
        );
        assert_eq!(expr.to_string(), "(a + b) * c");

        // a - b - c needs none
        let expr = FormulaExpr::binary(
            BinaryOperator::Subtract,
            FormulaExpr::binary(BinaryOperator::Subtract, lit("a"), lit("b")),
            lit("c"),
        );
        assert_eq!(expr.to_string(), "a - b - c");
    }

    #[test]
    fn test_display_function_and_text() {
        let expr = FormulaExpr::function(
            "sum",
            vec![lit("A1:A2"), FormulaExpr::text("x y")],
        );
        assert_eq!(expr.to_string(), "sum(A1:A2, \"x y\")");
        assert_eq!(expr.to_sexpr(), "(sum A1:A2 \"x y\")");
    }

    #[test]
    fn test_call_view() {
        let expr = FormulaExpr::binary(BinaryOperator::Divide, lit("1"), lit("2"));
        assert_eq!(expr.operator(), Some("/"));
        assert_eq!(expr.operands(), vec![&lit("1"), &lit("2")]);
        assert_eq!(lit("1").operator(), None);
        assert!(lit("1").operands().is_empty());
    }

    #[test]
    fn test_hyphenated_literal_is_subtraction() {
        let sexpr = |text: &str| lit(text).as_subtraction().map(|e| e.to_sexpr());

        assert_eq!(sexpr("A1-A2"), Some("(- A1 A2)".to_string()));
        assert_eq!(sexpr("2-1-b3"), Some("(- (- 2 1) b3)".to_string()));
        assert_eq!(sexpr("-A1"), Some("(- 0 A1)".to_string()));
        assert_eq!(sexpr("A1--2"), Some("(- A1 (- 0 2))".to_string()));

        assert_eq!(sexpr("A1"), None);
        assert_eq!(sexpr("A1-"), None);
        assert_eq!(sexpr("abc-def"), None);
        assert_eq!(sexpr("2018-01-01"), None);
        assert_eq!(sexpr("13-01-2018"), None);
        assert_eq!(sexpr("A1:A2-B1"), None);
        assert_eq!(FormulaExpr::text("A1-A2").as_subtraction(), None);
    }

    #[test]
    fn test_reference_detection() {
        assert_eq!(lit("B2").as_reference(), Some(Index::new(1, 1)));
        assert_eq!(lit("bb1").as_reference(), Some(Index::new(0, 27)));
        assert_eq!(lit("AB1").as_reference(), None);
        assert!(is_reference_shaped("AB1"));
        assert_eq!(lit("2018-01-01").as_reference(), None);
        assert_eq!(FormulaExpr::text("A1").as_reference(), None);

        assert_eq!(
            lit("A1:B2").as_range(),
            Some(Range::new(Index::new(0, 0), Index::new(1, 1)))
        );
        assert_eq!(lit("A1").as_range(), None);
    }
}
