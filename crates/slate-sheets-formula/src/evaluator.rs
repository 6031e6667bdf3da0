//! Formula evaluator
//!
//! Evaluates formula ASTs against a [`CellSource`], resolving cell references
//! recursively. Each top-level evaluation owns the set of cells currently on
//! its resolution path; meeting one of them again is a circular reference.
//!
//! Domain failures (`#REF!`, `#DIV/0!`, ...) travel as [`FormulaValue::Error`].
//! Everything else is a [`FormulaError`], rendered as `#ERROR!` once it
//! reaches the cell.

use std::cell::RefCell;
use std::sync::OnceLock;

use ahash::AHashSet;
use slate_sheets_core::{CellError, CellFormat, CellSource, Error as CoreError, Index, Range};
use tracing::{debug, error, warn};

use crate::ast::{is_reference_shaped, BinaryOperator, FormulaExpr};
use crate::error::{FormulaError, FormulaResult};
use crate::functions::FunctionRegistry;
use crate::parser::parse;

/// Longest chain of references resolved within one evaluation
///
/// A cell reached deeper than this evaluates to `#ERROR!`.
pub const MAX_DEPTH: usize = 64;

/// Global function registry (lazily initialized)
static FUNCTION_REGISTRY: OnceLock<FunctionRegistry> = OnceLock::new();

fn get_function_registry() -> &'static FunctionRegistry {
    FUNCTION_REGISTRY.get_or_init(FunctionRegistry::new)
}

/// Value types during formula evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaValue {
    Number(f64),
    String(String),
    Error(CellError),
    /// Cell values of a range argument, row by row
    Array(Vec<Vec<FormulaValue>>),
    Empty,
}

impl FormulaValue {
    /// Classify a resolved cell value: numeric if it reads as a finite number,
    /// otherwise text
    pub fn from_resolved(text: &str) -> Self {
        if text.trim().is_empty() {
            return FormulaValue::Empty;
        }
        match text.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => FormulaValue::Number(n),
            _ => FormulaValue::String(text.to_string()),
        }
    }

    /// Convert to number, if possible
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FormulaValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Force conversion to number for arithmetic
    pub fn to_number(&self) -> FormulaResult<f64> {
        self.as_number().ok_or_else(|| {
            FormulaError::TypeMismatch(format!("expected a number, got {}", self.type_name()))
        })
    }

    /// Convert to string
    pub fn as_string(&self) -> String {
        match self {
            FormulaValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            FormulaValue::String(s) => s.clone(),
            FormulaValue::Error(e) => e.to_string(),
            FormulaValue::Empty => String::new(),
            FormulaValue::Array(_) => CellError::Generic.to_string(),
        }
    }

    /// Get the error if this is one
    pub fn get_error(&self) -> Option<CellError> {
        match self {
            FormulaValue::Error(e) => Some(*e),
            _ => None,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            FormulaValue::Number(_) => "a number",
            FormulaValue::String(_) => "text",
            FormulaValue::Error(_) => "an error",
            FormulaValue::Array(_) => "a range",
            FormulaValue::Empty => "an empty value",
        }
    }
}

/// Context for formula evaluation
///
/// One context serves one top-level evaluation; the resolution path it tracks
/// is discarded with it.
pub struct EvaluationContext<'a> {
    source: &'a dyn CellSource,
    path: RefCell<AHashSet<Index>>,
}

impl<'a> EvaluationContext<'a> {
    /// Create a new evaluation context over a cell store
    pub fn new(source: &'a dyn CellSource) -> Self {
        Self {
            source,
            path: RefCell::new(AHashSet::new()),
        }
    }

    /// Evaluate and format the cell at `index`
    ///
    /// Returns the formatted text, or the error value the cell displays.
    pub fn resolve(&self, index: Index) -> Result<String, CellError> {
        if self.path.borrow().len() >= MAX_DEPTH {
            error!(%index, "reference chain deeper than {}", MAX_DEPTH);
            return Err(CellError::Generic);
        }
        if !self.path.borrow_mut().insert(index) {
            warn!(%index, "circular reference detected");
            return Err(CellError::Circular);
        }

        let cell = self.source.cell(index);
        let raw = cell.map(|c| c.raw()).unwrap_or("");
        let resolved = match raw.strip_prefix('=') {
            Some(formula) => self.evaluate_formula(index, formula),
            None => Ok(raw.to_string()),
        };

        self.path.borrow_mut().remove(&index);

        let text = resolved?;
        match cell {
            Some(cell) => apply_format(&cell.format, &text),
            None => Ok(text),
        }
    }

    /// Evaluate the body of a formula cell into its unformatted text
    fn evaluate_formula(&self, index: Index, formula: &str) -> Result<String, CellError> {
        debug!(%index, formula, "evaluating formula");

        let result = parse(formula)
            .map_err(FormulaError::from)
            .and_then(|expr| evaluate(&expr, self));

        match result {
            Ok(FormulaValue::Error(e)) => Err(e),
            Ok(FormulaValue::Array(_)) => {
                error!(%index, formula, "formula evaluated to a range");
                Err(CellError::Generic)
            }
            Ok(value) => Ok(value.as_string()),
            Err(e) => {
                error!(%index, formula, "error evaluating formula: {e}");
                Err(CellError::Generic)
            }
        }
    }

    /// Value of a cell read through a reference
    ///
    /// `Err` is a failure of the lookup itself: the cell is absent (`#REF!`),
    /// empty (`#NULL!`), or part of a cycle (`#CIRCULAR#`). An error value the
    /// referenced cell displays comes back as `Ok(FormulaValue::Error)`.
    pub fn lookup(&self, index: Index) -> Result<FormulaValue, CellError> {
        if self.source.cell(index).is_none() {
            return Err(CellError::Ref);
        }

        match self.resolve(index) {
            Err(CellError::Circular) => Err(CellError::Circular),
            Err(e) => Ok(FormulaValue::Error(e)),
            Ok(text) => match FormulaValue::from_resolved(&text) {
                FormulaValue::Empty => Err(CellError::Null),
                value => Ok(value),
            },
        }
    }

    /// Values of the stored cells of a range, grouped by row
    ///
    /// Absent cells are left out, so the cost follows the number of stored
    /// cells rather than the size of the range. A stored empty cell comes back
    /// as [`FormulaValue::Empty`].
    pub fn range_values(&self, range: &Range) -> FormulaValue {
        let mut rows: Vec<Vec<FormulaValue>> = Vec::new();
        let mut current_row = None;

        for (index, _) in self.source.cells_in(range) {
            let value = match self.resolve(index) {
                Ok(text) => FormulaValue::from_resolved(&text),
                Err(e) => FormulaValue::Error(e),
            };

            if current_row != Some(index.row) {
                current_row = Some(index.row);
                rows.push(Vec::new());
            }
            if let Some(row) = rows.last_mut() {
                row.push(value);
            }
        }

        FormulaValue::Array(rows)
    }
}

fn apply_format(format: &CellFormat, text: &str) -> Result<String, CellError> {
    format.apply(text).map_err(|e| match e {
        CoreError::Value(_) => CellError::Value,
        _ => CellError::Generic,
    })
}

/// Evaluate and format the cell at `index`, returning its display string
///
/// # Example
/// ```rust
/// use std::collections::HashMap;
/// use slate_sheets_core::{Cell, Index};
/// use slate_sheets_formula::evaluate_cell;
///
/// let mut cells = HashMap::new();
/// cells.insert(Index::new(0, 0), Cell::new("=A2 * 2"));
/// cells.insert(Index::new(1, 0), Cell::new("21"));
///
/// assert_eq!(evaluate_cell(&cells, Index::new(0, 0)), "42");
/// ```
pub fn evaluate_cell(source: &dyn CellSource, index: Index) -> String {
    match EvaluationContext::new(source).resolve(index) {
        Ok(text) => text,
        Err(e) => e.to_string(),
    }
}

/// Evaluate a formula expression
pub fn evaluate(expr: &FormulaExpr, ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    match expr {
        FormulaExpr::Literal(text) => evaluate_literal(text, ctx),

        FormulaExpr::Text(s) => Ok(FormulaValue::String(s.clone())),

        FormulaExpr::BinaryOp { op, left, right } => evaluate_binary_op(*op, left, right, ctx),

        FormulaExpr::Function { name, args } => evaluate_function(name, args, ctx),
    }
}

/// Evaluate a bare literal: number, cell reference, range or hyphenated
/// subtraction
fn evaluate_literal(text: &str, ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    if let Ok(n) = text.parse::<f64>() {
        if n.is_finite() {
            return Ok(FormulaValue::Number(n));
        }
    }

    if is_reference_shaped(text) {
        return Ok(match Index::parse(text) {
            Ok(index) => ctx.lookup(index).unwrap_or_else(FormulaValue::Error),
            Err(_) => FormulaValue::Error(CellError::Ref),
        });
    }

    if let Some((first, last)) = text.split_once(':') {
        if Range::parse(text).is_ok() {
            return Err(FormulaError::Evaluation(format!(
                "range {} used outside a function",
                text
            )));
        }
        if is_reference_shaped(first) && is_reference_shaped(last) {
            return Ok(FormulaValue::Error(CellError::Ref));
        }
    }

    if let Some(expr) = FormulaExpr::literal(text).as_subtraction() {
        return evaluate(&expr, ctx);
    }

    Err(FormulaError::Evaluation(format!(
        "'{}' is not a number or a reference",
        text
    )))
}

/// Evaluate one side of a binary operation
///
/// An error value displayed by a referenced cell cannot take part in
/// arithmetic. Lookup failures still propagate as their own error value.
fn evaluate_operand(expr: &FormulaExpr, ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    let Some(index) = expr.as_reference() else {
        return evaluate(expr, ctx);
    };

    match ctx.lookup(index) {
        Err(e) => Ok(FormulaValue::Error(e)),
        Ok(FormulaValue::Error(e)) => Err(FormulaError::TypeMismatch(format!(
            "{} holds the error {}",
            index, e
        ))),
        Ok(value) => Ok(value),
    }
}

/// Evaluate a binary operation
fn evaluate_binary_op(
    op: BinaryOperator,
    left: &FormulaExpr,
    right: &FormulaExpr,
    ctx: &EvaluationContext,
) -> FormulaResult<FormulaValue> {
    // Evaluate operands first
    let left_val = evaluate_operand(left, ctx)?;
    let right_val = evaluate_operand(right, ctx)?;

    // Propagate errors
    if let Some(e) = left_val.get_error() {
        return Ok(FormulaValue::Error(e));
    }
    if let Some(e) = right_val.get_error() {
        return Ok(FormulaValue::Error(e));
    }

    if let (BinaryOperator::Add, FormulaValue::String(l), FormulaValue::String(r)) =
        (op, &left_val, &right_val)
    {
        return Ok(FormulaValue::String(format!("{}{}", l, r)));
    }

    let l = left_val.to_number()?;
    let r = right_val.to_number()?;

    let result = match op {
        BinaryOperator::Add => l + r,
        BinaryOperator::Subtract => l - r,
        BinaryOperator::Multiply => l * r,
        BinaryOperator::Divide => {
            if r == 0.0 {
                return Ok(FormulaValue::Error(CellError::Div0));
            }
            l / r
        }
    };

    if !result.is_finite() {
        return Err(FormulaError::Evaluation(format!(
            "{} {} {} is out of range",
            l, op, r
        )));
    }

    Ok(FormulaValue::Number(result))
}

/// Evaluate a function call
fn evaluate_function(
    name: &str,
    args: &[FormulaExpr],
    ctx: &EvaluationContext,
) -> FormulaResult<FormulaValue> {
    let registry = get_function_registry();

    let func = registry
        .get(name)
        .ok_or_else(|| FormulaError::UnknownFunction(name.to_string()))?;

    // Check argument count
    if args.len() < func.min_args {
        return Err(FormulaError::ArgumentCount {
            function: name.to_string(),
            expected: format!("at least {}", func.min_args),
            actual: args.len(),
        });
    }

    if let Some(max) = func.max_args {
        if args.len() > max {
            return Err(FormulaError::ArgumentCount {
                function: name.to_string(),
                expected: format!("at most {}", max),
                actual: args.len(),
            });
        }
    }

    // Evaluate arguments, expanding range literals to their cells
    let mut evaluated_args = Vec::with_capacity(args.len());
    for arg in args {
        let value = match arg.as_range() {
            Some(range) => ctx.range_values(&range),
            None => evaluate(arg, ctx)?,
        };
        evaluated_args.push(value);
    }

    // Call the function
    match (func.implementation)(&evaluated_args, ctx)? {
        FormulaValue::Number(n) if !n.is_finite() => Err(FormulaError::Evaluation(format!(
            "{} result is out of range",
            func.name
        ))),
        value => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slate_sheets_core::{Cell, FormatKind};
    use std::collections::HashMap;

    fn sheet(cells: &[(&str, &str)]) -> HashMap<Index, Cell> {
        cells
            .iter()
            .map(|(label, raw)| (Index::parse(label).unwrap(), Cell::new(*raw)))
            .collect()
    }

    fn get(cells: &HashMap<Index, Cell>, label: &str) -> String {
        evaluate_cell(cells, Index::parse(label).unwrap())
    }

    fn eval(formula: &str) -> String {
        get(&sheet(&[("A1", formula)]), "A1")
    }

    #[test]
    fn test_evaluate_arithmetic() {
        assert_eq!(eval("=1 + 2"), "3");
        assert_eq!(eval("=2 * 3 + 1"), "7");
        assert_eq!(eval("=10 - 4 - 3"), "3");
        assert_eq!(eval("=1 / 2"), "0.5");
        assert_eq!(eval("=(1 + 2) * 3"), "9");
        assert_eq!(eval("=2 + -1"), "1");
        assert_eq!(eval("=6.02e23 / 6.02e23"), "1");
    }

    #[test]
    fn test_plain_values_are_verbatim() {
        assert_eq!(eval("007"), "007");
        assert_eq!(eval("hello world"), "hello world");
        assert_eq!(eval(""), "");
    }

    #[test]
    fn test_absent_cell_is_empty() {
        assert_eq!(get(&sheet(&[]), "C3"), "");
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(eval("=1/0"), "#DIV/0!");
        assert_eq!(eval("=1 / (2 - 2)"), "#DIV/0!");
    }

    #[test]
    fn test_text() {
        assert_eq!(eval("=\"abc\""), "abc");
        assert_eq!(eval("=\"abc\" + \"def\""), "abcdef");
        assert_eq!(eval("=\"abc\" * 2"), "#ERROR!");
        assert_eq!(eval("=\"abc\" + 1"), "#ERROR!");
    }

    #[test]
    fn test_bad_formulas_are_generic_errors() {
        assert_eq!(eval("=abc"), "#ERROR!");
        assert_eq!(eval("=1 +"), "#ERROR!");
        assert_eq!(eval("=1 $ 2"), "#ERROR!");
        assert_eq!(eval("=A1:A2"), "#ERROR!");
        assert_eq!(eval("=nosuchfunction(1)"), "#ERROR!");
        assert_eq!(eval("=abs(1, 2)"), "#ERROR!");
        assert_eq!(eval("=1e308 * 10"), "#ERROR!");
    }

    #[test]
    fn test_references() {
        let cells = sheet(&[("A1", "=A2 + A3"), ("A2", "1"), ("A3", "=A2 * 10")]);
        assert_eq!(get(&cells, "A1"), "11");
        assert_eq!(get(&cells, "A3"), "10");
    }

    #[test]
    fn test_references_are_case_insensitive() {
        let cells = sheet(&[("A1", "=b1 + 1"), ("B1", "2")]);
        assert_eq!(get(&cells, "A1"), "3");
    }

    #[test]
    fn test_text_reference() {
        let cells = sheet(&[
            ("A1", "=A2"),
            ("A2", "2018-01-01"),
            ("B1", "=A2 + \"!\""),
            ("C1", "=A2 + 1"),
        ]);
        assert_eq!(get(&cells, "A1"), "2018-01-01");
        assert_eq!(get(&cells, "B1"), "2018-01-01!");
        assert_eq!(get(&cells, "C1"), "#ERROR!");
    }

    #[test]
    fn test_circular_reference() {
        let cells = sheet(&[("A1", "=A2"), ("A2", "=A1")]);
        assert_eq!(get(&cells, "A1"), "#CIRCULAR#");
        assert_eq!(get(&cells, "A2"), "#CIRCULAR#");

        let cells = sheet(&[("A1", "=A1 + 1")]);
        assert_eq!(get(&cells, "A1"), "#CIRCULAR#");

        let cells = sheet(&[("A1", "=A2 + 1"), ("A2", "=A3"), ("A3", "=A1")]);
        assert_eq!(get(&cells, "A1"), "#CIRCULAR#");
    }

    #[test]
    fn test_diamond_is_not_circular() {
        let cells = sheet(&[("A1", "=A2 + A2"), ("A2", "=A3 * A3"), ("A3", "3")]);
        assert_eq!(get(&cells, "A1"), "18");
    }

    #[test]
    fn test_missing_reference() {
        let cells = sheet(&[("A1", "=A2")]);
        assert_eq!(get(&cells, "A1"), "#REF!");

        let cells = sheet(&[("A1", "=A2 + 1")]);
        assert_eq!(get(&cells, "A1"), "#REF!");
    }

    #[test]
    fn test_invalid_reference_shape() {
        // Mixed letters never name a column
        assert_eq!(eval("=AB1"), "#REF!");
        assert_eq!(eval("=AB1:A2"), "#REF!");
    }

    #[test]
    fn test_empty_reference() {
        let cells = sheet(&[("A1", "=A2"), ("A2", "")]);
        assert_eq!(get(&cells, "A1"), "#NULL!");
    }

    #[test]
    fn test_error_propagation() {
        let cells = sheet(&[("A1", "=A2"), ("A2", "=1/0"), ("A3", "=A2 + 1")]);
        assert_eq!(get(&cells, "A1"), "#DIV/0!");
        assert_eq!(get(&cells, "A3"), "#ERROR!");
    }

    #[test]
    fn test_formats_apply_to_results() {
        let mut cells = sheet(&[("A1", "=A2 / 3"), ("A2", "1")]);
        let a1 = Index::parse("A1").unwrap();
        cells
            .get_mut(&a1)
            .unwrap()
            .set_format(CellFormat::new(FormatKind::Number, Some("%.2f")).unwrap());
        assert_eq!(evaluate_cell(&cells, a1), "0.33");
    }

    #[test]
    fn test_referenced_value_is_formatted() {
        let mut cells = sheet(&[("B1", "=A2 * 2"), ("A2", "1.234")]);
        cells.get_mut(&Index::parse("A2").unwrap()).unwrap().set_format(
            CellFormat::new(FormatKind::Number, Some("%.0f")).unwrap(),
        );
        assert_eq!(get(&cells, "B1"), "2");
    }

    #[test]
    fn test_format_failure_is_value_error() {
        let mut cells = sheet(&[("A1", "abc"), ("B1", "=A1")]);
        cells.get_mut(&Index::parse("A1").unwrap()).unwrap().set_format(
            CellFormat::new(FormatKind::Number, Some("%.2f")).unwrap(),
        );
        assert_eq!(get(&cells, "A1"), "#VALUE!");
        assert_eq!(get(&cells, "B1"), "#VALUE!");
    }

    #[test]
    fn test_functions_over_ranges() {
        let cells = sheet(&[
            ("A1", "1"),
            ("A2", "2"),
            ("A3", "=A1 + A2"),
            ("B1", "=sum(A1:A3)"),
            ("B2", "=SUM(A1:A3, 10)"),
            ("B3", "=average(A1:A4)"),
            ("B4", "=count(A1:C1)"),
        ]);
        assert_eq!(get(&cells, "B1"), "6");
        assert_eq!(get(&cells, "B2"), "16");
        assert_eq!(get(&cells, "B3"), "2");
        assert_eq!(get(&cells, "B4"), "2");
    }

    #[test]
    fn test_range_error_propagates() {
        let cells = sheet(&[("A1", "1"), ("A2", "=1/0"), ("B1", "=sum(A1:A2)")]);
        assert_eq!(get(&cells, "B1"), "#DIV/0!");
    }

    #[test]
    fn test_range_containing_self_is_circular() {
        let cells = sheet(&[("A1", "1"), ("A2", "=sum(A1:A2)")]);
        assert_eq!(get(&cells, "A2"), "#CIRCULAR#");
    }

    #[test]
    fn test_hyphenated_subtraction() {
        let cells = sheet(&[
            ("A1", "5"),
            ("A2", "3"),
            ("B1", "=A1-A2"),
            ("B2", "=2-1"),
            ("B3", "=-A1"),
            ("B4", "=A1-A2-1 + 10"),
            ("B5", "=A1-C9"),
            ("B6", "=2018-01-01"),
        ]);
        assert_eq!(get(&cells, "B1"), "2");
        assert_eq!(get(&cells, "B2"), "1");
        assert_eq!(get(&cells, "B3"), "-5");
        assert_eq!(get(&cells, "B4"), "11");
        assert_eq!(get(&cells, "B5"), "#REF!");
        assert_eq!(get(&cells, "B6"), "#ERROR!");
    }

    #[test]
    fn test_deep_reference_chain_is_bounded() {
        let mut cells = sheet(&[("A1", "1")]);
        for row in 1..1000u32 {
            cells.insert(Index::new(row, 0), Cell::new(format!("=A{} + 1", row)));
        }

        let deepest = Index::new(MAX_DEPTH as u32 - 1, 0);
        assert_eq!(evaluate_cell(&cells, deepest), MAX_DEPTH.to_string());
        assert_eq!(evaluate_cell(&cells, Index::new(MAX_DEPTH as u32, 0)), "#ERROR!");
        assert_eq!(evaluate_cell(&cells, Index::new(999, 0)), "#ERROR!");
    }

    #[test]
    fn test_sparse_range() {
        let cells = sheet(&[
            ("A1", "1"),
            ("A5", "2"),
            ("B1", "=sum(A1:A4000000000)"),
            ("B2", "=count(A1:ZZ4000000000)"),
        ]);
        assert_eq!(get(&cells, "B1"), "3");
        assert_eq!(get(&cells, "B2"), "3");
    }

    #[test]
    fn test_function_result_out_of_range() {
        assert_eq!(eval("=sum(1e308, 1e308)"), "#ERROR!");
        assert_eq!(eval("=average(1e308, 1e308)"), "#ERROR!");
        assert_eq!(eval("=sum(1e308, -1e308)"), "0");
    }

    #[test]
    fn test_value_from_resolved() {
        assert_eq!(FormulaValue::from_resolved("3.5"), FormulaValue::Number(3.5));
        assert_eq!(FormulaValue::from_resolved(" 2 "), FormulaValue::Number(2.0));
        assert_eq!(
            FormulaValue::from_resolved("inf"),
            FormulaValue::String("inf".into())
        );
        assert_eq!(FormulaValue::from_resolved("  "), FormulaValue::Empty);
    }

    #[test]
    fn test_number_display() {
        assert_eq!(FormulaValue::Number(3.0).as_string(), "3");
        assert_eq!(FormulaValue::Number(-0.25).as_string(), "-0.25");
        assert_eq!(FormulaValue::Error(CellError::Null).as_string(), "#NULL!");
    }
}
