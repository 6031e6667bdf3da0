//! # slate-sheets-formula
//!
//! Formula language for slate-sheets.
//!
//! This crate provides:
//! - Tokenizing (text → tokens, whitespace kept)
//! - Formula parsing (tokens → AST), with precise error messages
//! - Formula evaluation (AST → value) with circular reference detection
//! - A fixed table of built-in functions
//! - Reference shifting for copied formulas
//!
//! ## Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use slate_sheets_core::{Cell, Index};
//! use slate_sheets_formula::{evaluate_cell, parse};
//!
//! let ast = parse("A1 + A2 * 2").unwrap();
//! assert_eq!(ast.to_sexpr(), "(+ A1 (* A2 2))");
//!
//! let mut cells = HashMap::new();
//! cells.insert(Index::new(0, 0), Cell::new("=A2"));
//! cells.insert(Index::new(1, 0), Cell::new("=A1"));
//! assert_eq!(evaluate_cell(&cells, Index::new(0, 0)), "#CIRCULAR#");
//! ```

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod lexer;
pub mod parser;
pub mod references;
pub mod token;

pub use ast::{is_reference_shaped, BinaryOperator, FormulaExpr};
pub use error::{FormulaError, FormulaResult, ParseError};
pub use evaluator::{evaluate, evaluate_cell, EvaluationContext, FormulaValue};
pub use functions::FunctionRegistry;
pub use lexer::tokenize;
pub use parser::{parse, parse_formula};
pub use references::{references, shift_references};
pub use token::{Token, TokenKind};
