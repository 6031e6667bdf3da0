//! Cell-related types and utilities
//!
//! This module contains:
//! - [`Index`] - A cell's location (e.g., "A1")
//! - [`Range`] - A rectangular block of cells (e.g., "A1:B3")
//! - [`Cell`] - Raw text plus format for one cell
//! - [`CellError`] - The error values a cell can display

mod address;
pub(crate) mod storage;
mod value;

pub use address::{Index, Range, RangeIndices};
pub use storage::{Cell, CellSource};
pub use value::CellError;
