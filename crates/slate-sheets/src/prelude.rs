//! Prelude module - common imports for slate-sheets users
//!
//! ```rust
//! use slate_sheets::prelude::*;
//! ```

pub use crate::{
    // Addressing
    Index,
    Range,

    // Cells and formats
    Cell,
    CellError,
    CellFormat,
    FormatKind,

    // Main types
    Spreadsheet,
    Worksheet,

    // Error types
    SheetError,
    SheetResult,
};

#[cfg(feature = "csv")]
pub use crate::{CsvReadOptions, CsvValues, CsvWriteOptions};
