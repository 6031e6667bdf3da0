//! Math and aggregate functions

use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::{EvaluationContext, FormulaValue};
use slate_sheets_core::CellError;

/// Gather the numbers of every argument, flattening ranges
///
/// Text and empty values are skipped. The first error value found is returned
/// instead.
fn collect_numbers(args: &[FormulaValue]) -> Result<Vec<f64>, CellError> {
    let mut numbers = Vec::new();
    for arg in args {
        match arg {
            FormulaValue::Number(n) => numbers.push(*n),
            FormulaValue::Error(e) => return Err(*e),
            FormulaValue::Array(arr) => {
                for cell in arr.iter().flatten() {
                    match cell {
                        FormulaValue::Number(n) => numbers.push(*n),
                        FormulaValue::Error(e) => return Err(*e),
                        // Skip non-numeric values (text, empty)
                        _ => {}
                    }
                }
            }
            // Skip non-numeric values
            _ => {}
        }
    }
    Ok(numbers)
}

fn type_mismatch(name: &str) -> FormulaError {
    FormulaError::TypeMismatch(format!("{} expects a number", name))
}

/// SUM function
pub fn fn_sum(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    Ok(match collect_numbers(args) {
        Ok(numbers) => FormulaValue::Number(numbers.iter().sum()),
        Err(e) => FormulaValue::Error(e),
    })
}

/// AVERAGE function
///
/// No numbers at all is a division by zero.
pub fn fn_average(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    Ok(match collect_numbers(args) {
        Ok(numbers) if numbers.is_empty() => FormulaValue::Error(CellError::Div0),
        Ok(numbers) => FormulaValue::Number(numbers.iter().sum::<f64>() / numbers.len() as f64),
        Err(e) => FormulaValue::Error(e),
    })
}

/// MIN function
pub fn fn_min(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    Ok(match collect_numbers(args) {
        Ok(numbers) => FormulaValue::Number(numbers.into_iter().reduce(f64::min).unwrap_or(0.0)),
        Err(e) => FormulaValue::Error(e),
    })
}

/// MAX function
pub fn fn_max(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    Ok(match collect_numbers(args) {
        Ok(numbers) => FormulaValue::Number(numbers.into_iter().reduce(f64::max).unwrap_or(0.0)),
        Err(e) => FormulaValue::Error(e),
    })
}

/// COUNT function
pub fn fn_count(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    Ok(match collect_numbers(args) {
        Ok(numbers) => FormulaValue::Number(numbers.len() as f64),
        Err(e) => FormulaValue::Error(e),
    })
}

/// ABS(number)
pub fn fn_abs(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    match args.first() {
        Some(FormulaValue::Number(n)) => Ok(FormulaValue::Number(n.abs())),
        Some(FormulaValue::Error(e)) => Ok(FormulaValue::Error(*e)),
        _ => Err(type_mismatch("ABS")),
    }
}

/// SQRT(number)
pub fn fn_sqrt(args: &[FormulaValue], _ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    match args.first() {
        Some(FormulaValue::Number(n)) if *n >= 0.0 => Ok(FormulaValue::Number(n.sqrt())),
        Some(FormulaValue::Number(n)) => Err(FormulaError::Evaluation(format!(
            "SQRT of negative number {}",
            n
        ))),
        Some(FormulaValue::Error(e)) => Ok(FormulaValue::Error(*e)),
        _ => Err(type_mismatch("SQRT")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn with_ctx<T>(f: impl FnOnce(&EvaluationContext) -> T) -> T {
        let cells: HashMap<slate_sheets_core::Index, slate_sheets_core::Cell> = HashMap::new();
        let ctx = EvaluationContext::new(&cells);
        f(&ctx)
    }

    fn num(n: f64) -> FormulaValue {
        FormulaValue::Number(n)
    }

    fn range(values: Vec<FormulaValue>) -> FormulaValue {
        FormulaValue::Array(vec![values])
    }

    #[test]
    fn test_sum() {
        with_ctx(|ctx| {
            let result = fn_sum(&[num(1.0), num(2.0), num(3.0)], ctx).unwrap();
            assert_eq!(result, num(6.0));

            let result = fn_sum(
                &[
                    range(vec![num(1.0), FormulaValue::Empty, FormulaValue::String("x".into())]),
                    num(4.0),
                ],
                ctx,
            )
            .unwrap();
            assert_eq!(result, num(5.0));
        });
    }

    #[test]
    fn test_error_propagates() {
        with_ctx(|ctx| {
            let args = [num(1.0), range(vec![FormulaValue::Error(CellError::Div0)])];
            assert_eq!(
                fn_sum(&args, ctx).unwrap(),
                FormulaValue::Error(CellError::Div0)
            );
            assert_eq!(
                fn_count(&args, ctx).unwrap(),
                FormulaValue::Error(CellError::Div0)
            );
        });
    }

    #[test]
    fn test_average() {
        with_ctx(|ctx| {
            assert_eq!(fn_average(&[num(1.0), num(2.0)], ctx).unwrap(), num(1.5));
            assert_eq!(
                fn_average(&[range(vec![FormulaValue::Empty])], ctx).unwrap(),
                FormulaValue::Error(CellError::Div0)
            );
        });
    }

    #[test]
    fn test_min_max() {
        with_ctx(|ctx| {
            let args = [range(vec![num(3.0), num(-1.0)]), num(2.0)];
            assert_eq!(fn_min(&args, ctx).unwrap(), num(-1.0));
            assert_eq!(fn_max(&args, ctx).unwrap(), num(3.0));
            assert_eq!(fn_max(&[FormulaValue::Empty], ctx).unwrap(), num(0.0));
        });
    }

    #[test]
    fn test_count() {
        with_ctx(|ctx| {
            let args = [
                range(vec![num(3.0), FormulaValue::String("a".into()), FormulaValue::Empty]),
                num(2.0),
            ];
            assert_eq!(fn_count(&args, ctx).unwrap(), num(2.0));
        });
    }

    #[test]
    fn test_abs_sqrt() {
        with_ctx(|ctx| {
            assert_eq!(fn_abs(&[num(-2.5)], ctx).unwrap(), num(2.5));
            assert_eq!(fn_sqrt(&[num(9.0)], ctx).unwrap(), num(3.0));
            assert!(fn_sqrt(&[num(-1.0)], ctx).is_err());
            assert!(fn_abs(&[FormulaValue::String("x".into())], ctx).is_err());
            assert!(fn_abs(&[range(vec![num(1.0)])], ctx).is_err());
            assert_eq!(
                fn_abs(&[FormulaValue::Error(CellError::Ref)], ctx).unwrap(),
                FormulaValue::Error(CellError::Ref)
            );
        });
    }
}
