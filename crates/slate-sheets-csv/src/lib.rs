//! # slate-sheets-csv
//!
//! CSV reader and writer for slate-sheets.
//!
//! Every field is stored as a cell's raw text; formulas stay formulas. The
//! writer emits either that raw text or each cell's evaluated value.

mod error;
mod options;
mod reader;
mod writer;

pub use error::{CsvError, CsvResult};
pub use options::{CsvReadOptions, CsvValues, CsvWriteOptions, LineTerminator};
pub use reader::CsvReader;
pub use writer::CsvWriter;
