//! Worksheet type

use std::collections::BTreeMap;

use tracing::debug;

use crate::cell::storage::ordered_cells_in;
use crate::cell::{Cell, CellSource, Index, Range};
use crate::error::Result;
use crate::format::{CellFormat, FormatKind};

/// The cell store: a sparse mapping from [`Index`] to [`Cell`]
///
/// Cells are created on first write and mutated in place afterwards. Keys are
/// kept ordered (row-major), so iteration and [`Worksheet::used_range`] are
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Worksheet {
    cells: BTreeMap<Index, Cell>,
}

impl Worksheet {
    /// Create an empty worksheet
    pub fn new() -> Self {
        Self::default()
    }

    // === Cell Access ===

    /// Get the cell at `index`, if present
    pub fn cell(&self, index: Index) -> Option<&Cell> {
        self.cells.get(&index)
    }

    /// Get a mutable reference to the cell at `index`, if present
    pub fn cell_mut(&mut self, index: Index) -> Option<&mut Cell> {
        self.cells.get_mut(&index)
    }

    /// Raw text of the cell at `index` (empty when absent)
    pub fn raw(&self, index: Index) -> &str {
        self.cells.get(&index).map(Cell::raw).unwrap_or("")
    }

    /// Format of the cell at `index` (default when absent)
    pub fn format(&self, index: Index) -> CellFormat {
        self.cells
            .get(&index)
            .map(|cell| cell.format.clone())
            .unwrap_or_default()
    }

    /// Check if a cell has been stored at `index`
    pub fn contains(&self, index: Index) -> bool {
        self.cells.contains_key(&index)
    }

    // === Cell Modification ===

    /// Set the raw text of a cell, creating it if needed
    ///
    /// An existing cell keeps its format.
    pub fn set<S: Into<String>>(&mut self, index: Index, raw: S) {
        let raw = raw.into();
        debug!(%index, %raw, "set");
        self.cells.entry(index).or_default().set_data(raw);
    }

    /// Validate and apply a format to a cell, creating the cell if needed
    ///
    /// On failure the cell is left exactly as it was.
    pub fn set_format(&mut self, index: Index, kind: FormatKind, spec: Option<&str>) -> Result<()> {
        let format = CellFormat::new(kind, spec)?;
        self.set_cell_format(index, format);
        Ok(())
    }

    /// Apply an already validated format to a cell, creating the cell if needed
    pub fn set_cell_format(&mut self, index: Index, format: CellFormat) {
        debug!(%index, "set_format");
        self.cells.entry(index).or_default().set_format(format);
    }

    /// Store a complete cell, returning the previous one
    pub fn insert(&mut self, index: Index, cell: Cell) -> Option<Cell> {
        self.cells.insert(index, cell)
    }

    /// Remove a cell, returning it if it was present
    pub fn remove(&mut self, index: Index) -> Option<Cell> {
        self.cells.remove(&index)
    }

    /// Remove every cell inside `range`
    pub fn clear_range(&mut self, range: &Range) {
        self.cells.retain(|index, _| !range.contains(*index));
    }

    // === Iteration ===

    /// Number of stored cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if no cells are stored
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate over stored cells in row-major order
    pub fn cells(&self) -> impl Iterator<Item = (Index, &Cell)> {
        self.cells.iter().map(|(index, cell)| (*index, cell))
    }

    /// Iterate over stored formula cells in row-major order
    pub fn formula_cells(&self) -> impl Iterator<Item = (Index, &str)> {
        self.cells
            .iter()
            .filter_map(|(index, cell)| cell.formula().map(|f| (*index, f)))
    }

    /// The smallest range covering every stored cell, anchored at `A1`
    ///
    /// Returns `None` for an empty worksheet.
    pub fn used_range(&self) -> Option<Range> {
        let last = self
            .cells
            .keys()
            .copied()
            .reduce(|acc, index| acc.max(index))?;
        Some(Range::new(Index::new(0, 0), last))
    }
}

impl CellSource for Worksheet {
    fn cell(&self, index: Index) -> Option<&Cell> {
        self.cells.get(&index)
    }

    fn cells_in(&self, range: &Range) -> Vec<(Index, &Cell)> {
        ordered_cells_in(&self.cells, range).collect()
    }
}

impl FromIterator<(Index, Cell)> for Worksheet {
    fn from_iter<T: IntoIterator<Item = (Index, Cell)>>(iter: T) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}
