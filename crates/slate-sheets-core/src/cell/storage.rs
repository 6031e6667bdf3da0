//! Cell records and the lookup contract the evaluator reads through

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use super::{Index, Range};
use crate::format::CellFormat;

/// Complete data for a single cell
///
/// A cell that is not present in a store behaves exactly like `Cell::default()`:
/// empty raw text and the default format.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    /// The text the user entered, possibly a formula starting with `=`
    pub raw_data: String,
    /// How the resolved value is rendered
    pub format: CellFormat,
}

impl Cell {
    /// Create a cell with raw text and the default format
    pub fn new<S: Into<String>>(raw: S) -> Self {
        Self {
            raw_data: raw.into(),
            format: CellFormat::default(),
        }
    }

    /// Create a cell with raw text and a format
    pub fn with_format<S: Into<String>>(raw: S, format: CellFormat) -> Self {
        Self {
            raw_data: raw.into(),
            format,
        }
    }

    /// Replace the raw text
    pub fn set_data<S: Into<String>>(&mut self, raw: S) {
        self.raw_data = raw.into();
        debug!(raw = %self.raw_data, "setting cell data");
    }

    /// Replace the format
    pub fn set_format(&mut self, format: CellFormat) {
        debug!(kind = %format.kind(), spec = ?format.spec(), "setting cell format");
        self.format = format;
    }

    /// The raw text as entered
    pub fn raw(&self) -> &str {
        &self.raw_data
    }

    /// Check if the raw text is a formula
    pub fn is_formula(&self) -> bool {
        self.raw_data.starts_with('=')
    }

    /// The formula body (without the leading `=`), if this is a formula cell
    pub fn formula(&self) -> Option<&str> {
        self.raw_data.strip_prefix('=')
    }
}

/// Read access to a cell store keyed by [`Index`]
///
/// The evaluator only needs to look cells up. Absence is not an error here;
/// callers decide what a missing cell means.
pub trait CellSource {
    /// Get the cell at `index`, if one has been stored
    fn cell(&self, index: Index) -> Option<&Cell>;

    /// Stored cells inside `range`, in row-major order
    fn cells_in(&self, range: &Range) -> Vec<(Index, &Cell)>;
}

impl CellSource for HashMap<Index, Cell> {
    fn cell(&self, index: Index) -> Option<&Cell> {
        self.get(&index)
    }

    fn cells_in(&self, range: &Range) -> Vec<(Index, &Cell)> {
        let mut cells: Vec<(Index, &Cell)> = self
            .iter()
            .filter(|(index, _)| range.contains(**index))
            .map(|(index, cell)| (*index, cell))
            .collect();
        cells.sort_unstable_by_key(|(index, _)| *index);
        cells
    }
}

impl CellSource for BTreeMap<Index, Cell> {
    fn cell(&self, index: Index) -> Option<&Cell> {
        self.get(&index)
    }

    fn cells_in(&self, range: &Range) -> Vec<(Index, &Cell)> {
        ordered_cells_in(self, range).collect()
    }
}

/// Row-major walk over the keys between the corners of `range`
///
/// Keys in the rows between the corners but outside the columns are skipped.
pub(crate) fn ordered_cells_in<'a>(
    cells: &'a BTreeMap<Index, Cell>,
    range: &Range,
) -> impl Iterator<Item = (Index, &'a Cell)> + 'a {
    let range = *range;
    cells
        .range(range.first..=range.last)
        .filter(move |(index, _)| range.contains(**index))
        .map(|(index, cell)| (*index, cell))
}
