//! Failures while moving a sheet in or out of CSV

use thiserror::Error;

pub type CsvResult<T> = std::result::Result<T, CsvError>;

#[derive(Debug, Error)]
pub enum CsvError {
    /// Opening, reading or writing the file failed
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV, or a record the csv crate could not write
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A field sits past the last row or column a sheet can address.
    /// Positions are the zero-based record and field numbers of the input.
    #[error("field at record {row}, position {column} does not fit on a sheet")]
    OutOfSheet { row: usize, column: usize },
}
