//! Cell error values

use std::fmt;

/// Error values a cell can display in place of a result
///
/// These are values, not failures: a cell that evaluates to one of them still
/// has a well-defined display string, and cells referencing it can see and
/// propagate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellError {
    /// #CIRCULAR# - The cell depends on itself
    Circular,
    /// #REF! - Reference to a cell that does not exist
    Ref,
    /// #NULL! - Reference to a cell whose value is empty
    Null,
    /// #DIV/0! - Division by zero
    Div0,
    /// #VALUE! - The value cannot be rendered with the cell's format
    Value,
    /// #ERROR! - Any other evaluation failure
    Generic,
}

impl CellError {
    /// Get the display string for this error
    pub fn as_str(&self) -> &'static str {
        match self {
            CellError::Circular => "#CIRCULAR#",
            CellError::Ref => "#REF!",
            CellError::Null => "#NULL!",
            CellError::Div0 => "#DIV/0!",
            CellError::Value => "#VALUE!",
            CellError::Generic => "#ERROR!",
        }
    }

    /// Parse an error string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "#CIRCULAR#" => Some(CellError::Circular),
            "#REF!" => Some(CellError::Ref),
            "#NULL!" => Some(CellError::Null),
            "#DIV/0!" => Some(CellError::Div0),
            "#VALUE!" => Some(CellError::Value),
            "#ERROR!" => Some(CellError::Generic),
            _ => None,
        }
    }

    /// All error kinds, in declaration order
    pub fn all() -> [CellError; 6] {
        [
            CellError::Circular,
            CellError::Ref,
            CellError::Null,
            CellError::Div0,
            CellError::Value,
            CellError::Generic,
        ]
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
