//! # slate-sheets-core
//!
//! Core data structures for the slate-sheets formula engine.
//!
//! This crate provides the types shared by every layer:
//! - [`Index`] and [`Range`] - Cell addressing and ranges
//! - [`Cell`] - Raw text plus format for one cell
//! - [`CellError`] - The six error values a cell can display
//! - [`CellFormat`] and [`FormatKind`] - Number/date formatting
//! - [`Worksheet`] - The cell store, readable through [`CellSource`]
//!
//! ## Example
//!
//! ```rust
//! use slate_sheets_core::{FormatKind, Index, Worksheet};
//!
//! let mut sheet = Worksheet::new();
//! let a1 = Index::parse("A1").unwrap();
//!
//! sheet.set(a1, "3.14159");
//! sheet.set_format(a1, FormatKind::Number, Some("%.2f")).unwrap();
//!
//! assert_eq!(sheet.format(a1).apply(sheet.raw(a1)).unwrap(), "3.14");
//! ```

pub mod cell;
pub mod error;
pub mod format;
pub mod worksheet;

// Re-exports for convenience
pub use cell::{Cell, CellError, CellSource, Index, Range, RangeIndices};
pub use error::{Error, Result};
pub use format::{CellFormat, FormatKind};
pub use worksheet::Worksheet;
