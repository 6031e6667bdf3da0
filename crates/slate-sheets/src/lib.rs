//! # slate-sheets
//!
//! A small spreadsheet engine: cells addressed as `A1`, formulas with
//! `+ - * /` and a handful of functions, and number/date display formats.
//!
//! ## Features
//!
//! - Formula parsing with precise error messages
//! - On-demand evaluation with circular reference detection
//! - Error values (`#REF!`, `#DIV/0!`, `#CIRCULAR#`, ...) instead of panics
//! - Number and date formats, per cell or per range
//! - Copying ranges with reference shifting, sorting rows
//! - CSV import and export (`csv` feature, on by default)
//!
//! ## Example
//!
//! ```rust
//! use slate_sheets::prelude::*;
//!
//! let mut sheet = Spreadsheet::new();
//! sheet.set(Index::parse("A1").unwrap(), "3.14159");
//! sheet.set(Index::parse("A2").unwrap(), "=A1 * 2");
//! sheet
//!     .set_format(Index::parse("A2").unwrap(), FormatKind::Number, Some("%.2f"))
//!     .unwrap();
//!
//! assert_eq!(sheet.get_formatted(Index::parse("A2").unwrap()), "6.28");
//! assert_eq!(sheet.get_raw(Index::parse("A2").unwrap()), "=A1 * 2");
//! ```

pub mod error;
pub mod prelude;
mod spreadsheet;

pub use error::{SheetError, SheetResult};
pub use spreadsheet::Spreadsheet;

// Re-export core types
pub use slate_sheets_core::{
    Cell, CellError, CellFormat, CellSource, Error, FormatKind, Index, Range, Result, Worksheet,
};

// Re-export formula types
pub use slate_sheets_formula::{
    evaluate, evaluate_cell, parse, parse_formula, shift_references, tokenize, EvaluationContext,
    FormulaError, FormulaExpr, FormulaValue, ParseError, Token, TokenKind,
};

// Re-export I/O types
#[cfg(feature = "csv")]
pub use slate_sheets_csv::{
    CsvError, CsvReadOptions, CsvReader, CsvValues, CsvWriteOptions, CsvWriter, LineTerminator,
};
