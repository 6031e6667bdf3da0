//! Cell index and range types
//!
//! Column labels use a repeated-letter scheme rather than the usual base-26
//! progression: columns 0..=25 are `A`..`Z`, columns 26..=51 are `AA`..`ZZ`
//! (the same letter twice), columns 52..=77 are `AAA`..`ZZZ`, and so on.

use crate::error::{Error, Result};
use lazy_regex::regex;
use std::fmt;
use std::str::FromStr;

/// Number of distinct column letters
const LETTERS: u32 = 26;

/// A zero-based cell index (e.g. "A1" is row 0, column 0)
///
/// Ordering is row-major, so a sorted collection of indices walks the sheet
/// the same way a reader does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Index {
    /// Row index (0-based internally, 1-based in labels)
    pub row: u32,
    /// Column index (0-based, A=0, B=1, ..., Z=25, AA=26, BB=27)
    pub col: u32,
}

impl Index {
    /// Create a new index
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Parse an index from a label like `A1` or `bb10`
    ///
    /// Case-insensitive. The column part must be a run of one repeated letter.
    ///
    /// # Examples
    /// ```
    /// use slate_sheets_core::Index;
    ///
    /// assert_eq!(Index::parse("A1").unwrap(), Index::new(0, 0));
    /// assert_eq!(Index::parse("bb10").unwrap(), Index::new(9, 27));
    /// assert!(Index::parse("AB1").is_err());
    /// ```
    pub fn parse(label: &str) -> Result<Self> {
        let invalid = || Error::InvalidIndex(label.to_string());

        let caps = regex!(r"^(?P<col>[A-Za-z]+)(?P<row>[0-9]+)$")
            .captures(label)
            .ok_or_else(invalid)?;

        let letters = caps["col"].to_ascii_uppercase();
        let first = letters.as_bytes()[0];
        if letters.bytes().any(|b| b != first) {
            return Err(invalid());
        }

        let reps = u32::try_from(letters.len()).map_err(|_| invalid())?;
        let col = (reps - 1)
            .checked_mul(LETTERS)
            .and_then(|c| c.checked_add(u32::from(first - b'A')))
            .ok_or_else(invalid)?;

        let row: u32 = caps["row"].parse().map_err(|_| invalid())?;
        // Labels are 1-based
        let row = row.checked_sub(1).ok_or_else(invalid)?;

        Ok(Self { row, col })
    }

    /// The human readable column label (`B`, `BB`, `BBB`, ...)
    pub fn column_label(&self) -> String {
        let reps = (self.col / LETTERS) as usize + 1;
        let letter = (b'A' + (self.col % LETTERS) as u8) as char;
        std::iter::repeat(letter).take(reps).collect()
    }

    /// The human readable row label (1-based)
    pub fn row_label(&self) -> String {
        (u64::from(self.row) + 1).to_string()
    }

    /// Move this index by a signed row/column delta
    ///
    /// Returns `None` if the result would fall off the top or left of the sheet.
    pub fn offset(&self, delta_row: i64, delta_col: i64) -> Option<Index> {
        let row = u32::try_from(i64::from(self.row) + delta_row).ok()?;
        let col = u32::try_from(i64::from(self.col) + delta_col).ok()?;
        Some(Index { row, col })
    }

    /// Component-wise minimum
    pub fn min(self, other: Index) -> Index {
        Index::new(self.row.min(other.row), self.col.min(other.col))
    }

    /// Component-wise maximum
    pub fn max(self, other: Index) -> Index {
        Index::new(self.row.max(other.row), self.col.max(other.col))
    }
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column_label(), self.row_label())
    }
}

impl FromStr for Index {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<(u32, u32)> for Index {
    fn from((row, col): (u32, u32)) -> Self {
        Index::new(row, col)
    }
}

/// An inclusive rectangular range of cells (e.g. "A1:B3")
///
/// Both `first` and `last` are included. Construction normalizes the corners,
/// so `first` is always the top-left and `last` the bottom-right cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    /// Top-left cell
    pub first: Index,
    /// Bottom-right cell, still part of the range
    pub last: Index,
}

impl Range {
    /// Create a range from two corners given in any order
    pub fn new(a: Index, b: Index) -> Self {
        Self {
            first: a.min(b),
            last: a.max(b),
        }
    }

    /// A range covering a single cell
    pub fn single(index: Index) -> Self {
        Self {
            first: index,
            last: index,
        }
    }

    /// Parse a range from `A1:B3` notation
    ///
    /// Exactly one `:` is required.
    pub fn parse(desc: &str) -> Result<Self> {
        let mut parts = desc.split(':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(first), Some(last), None) => {
                Ok(Self::new(Index::parse(first)?, Index::parse(last)?))
            }
            _ => Err(Error::InvalidRange(desc.to_string())),
        }
    }

    /// Check if an index lies within this range
    pub fn contains(&self, index: Index) -> bool {
        (self.first.row..=self.last.row).contains(&index.row)
            && (self.first.col..=self.last.col).contains(&index.col)
    }

    /// Number of rows in the range
    pub fn height(&self) -> u32 {
        self.last.row - self.first.row + 1
    }

    /// Number of columns in the range
    pub fn width(&self) -> u32 {
        self.last.col - self.first.col + 1
    }

    /// Total number of cells in the range
    pub fn cell_count(&self) -> u64 {
        u64::from(self.height()) * u64::from(self.width())
    }

    /// Iterate over the indices of the `i`-th row of the range
    pub fn row(&self, i: u32) -> impl Iterator<Item = Index> {
        let row = self.first.row + i;
        let valid = i < self.height();
        (self.first.col..=self.last.col)
            .filter(move |_| valid)
            .map(move |col| Index::new(row, col))
    }

    /// Iterate over all indices in the range, row by row
    pub fn indices(&self) -> RangeIndices {
        RangeIndices {
            range: *self,
            next: Some(self.first),
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.first, self.last)
    }
}

impl FromStr for Range {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Row-major iterator over the indices of a [`Range`]
pub struct RangeIndices {
    range: Range,
    next: Option<Index>,
}

impl Iterator for RangeIndices {
    type Item = Index;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;

        self.next = if current.col < self.range.last.col {
            Some(Index::new(current.row, current.col + 1))
        } else if current.row < self.range.last.row {
            Some(Index::new(current.row + 1, self.range.first.col))
        } else {
            None
        };

        Some(current)
    }
}
