//! Error types for slate-sheets-core

use thiserror::Error;

use crate::format::FormatKind;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in slate-sheets-core
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    /// Invalid cell label
    #[error("{0} is not a valid spreadsheet index")]
    InvalidIndex(String),

    /// Invalid range notation
    #[error("{0} is not a valid range")]
    InvalidRange(String),

    /// Unknown format kind name
    #[error("Invalid format type '{0}'")]
    InvalidFormatKind(String),

    /// Format spec not allowed for the format kind
    #[error("Invalid format spec {spec:?} for type '{kind}'")]
    InvalidFormat {
        kind: FormatKind,
        spec: Option<String>,
    },

    /// A value cannot be rendered with the requested format
    #[error("Value error: {0}")]
    Value(String),
}
