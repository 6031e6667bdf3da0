//! Error types for the slate-sheets facade

use thiserror::Error;

#[cfg(feature = "csv")]
use slate_sheets_csv::CsvError;

/// Result type alias using [`SheetError`]
pub type SheetResult<T> = std::result::Result<T, SheetError>;

/// Errors returned by [`Spreadsheet`](crate::Spreadsheet) operations
#[derive(Debug, Error)]
pub enum SheetError {
    /// Invalid index, range or format
    #[error(transparent)]
    Core(#[from] slate_sheets_core::Error),

    /// CSV import or export failed
    #[cfg(feature = "csv")]
    #[error(transparent)]
    Csv(#[from] CsvError),
}
