//! The caller-facing spreadsheet

use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::{debug, info};

use slate_sheets_core::{Cell, CellFormat, CellSource, Error, FormatKind, Index, Range, Worksheet};
use slate_sheets_formula::{
    evaluate_cell, parse_formula, references, shift_references, EvaluationContext, FormulaValue,
};

use crate::error::SheetResult;

/// Largest range, in cells, that formatting and sorting will walk
pub const MAX_RANGE_CELLS: u64 = 1 << 24;

/// A single sheet of cells with formula evaluation and formatting
///
/// Values are never cached: every read evaluates the cell afresh.
#[derive(Debug, Clone, Default)]
pub struct Spreadsheet {
    sheet: Worksheet,
}

impl Spreadsheet {
    /// Create an empty spreadsheet
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing cell store
    pub fn from_worksheet(sheet: Worksheet) -> Self {
        Self { sheet }
    }

    /// The underlying cell store
    pub fn worksheet(&self) -> &Worksheet {
        &self.sheet
    }

    /// Unwrap into the underlying cell store
    pub fn into_worksheet(self) -> Worksheet {
        self.sheet
    }

    // === Cell access ===

    /// The evaluated, formatted value of a cell
    ///
    /// Errors are returned as their display markers (`#REF!`, `#DIV/0!`, ...).
    /// An absent cell reads as the empty string.
    pub fn get_formatted(&self, index: Index) -> String {
        evaluate_cell(&self.sheet, index)
    }

    /// The text that was entered into a cell, `""` if absent
    pub fn get_raw(&self, index: Index) -> &str {
        self.sheet.raw(index)
    }

    /// Set the raw text of a cell, keeping its format
    pub fn set<S: Into<String>>(&mut self, index: Index, raw: S) {
        self.sheet.set(index, raw);
    }

    /// Set the format of a cell
    ///
    /// An invalid kind/spec combination is rejected and the cell is left as
    /// it was.
    pub fn set_format(&mut self, index: Index, kind: FormatKind, spec: Option<&str>) -> SheetResult<()> {
        Ok(self.sheet.set_format(index, kind, spec)?)
    }

    /// The cells a formula cell reads, in order of first appearance
    ///
    /// Single references are listed whether or not the cell exists; a range
    /// contributes only its stored cells, row by row. Empty for plain values
    /// and for formulas that do not parse.
    pub fn precedents(&self, index: Index) -> Vec<Index> {
        let Some(expr) = self
            .sheet
            .cell(index)
            .and_then(|cell| cell.formula())
            .and_then(|formula| parse_formula(formula).ok())
        else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for range in references(&expr) {
            let cells: Vec<Index> = if range.cell_count() == 1 {
                vec![range.first]
            } else {
                self.sheet.cells_in(&range).into_iter().map(|(index, _)| index).collect()
            };
            out.extend(cells.into_iter().filter(|index| seen.insert(*index)));
        }
        out
    }

    // === Range operations ===

    /// Apply one format to every cell of a range
    ///
    /// The format is validated once up front; on failure no cell changes.
    /// Every position gets the format, stored or not, so ranges larger than
    /// [`MAX_RANGE_CELLS`] are rejected.
    pub fn set_range_format(
        &mut self,
        range: &Range,
        kind: FormatKind,
        spec: Option<&str>,
    ) -> SheetResult<()> {
        check_size(range)?;
        let format = CellFormat::new(kind, spec)?;
        debug!(%range, %kind, ?spec, "set_range_format");
        for index in range.indices() {
            self.sheet.set_cell_format(index, format.clone());
        }
        Ok(())
    }

    /// Copy the cells of `src` so that its top-left cell lands on `dest`
    ///
    /// Raw text and format are copied together. References inside formulas
    /// move by the same offset; a reference moved off the sheet becomes
    /// `#REF!`. Source positions without a cell clear the matching
    /// destination cell. The source is read in full before anything is
    /// written, so the two ranges may overlap. Only stored cells are
    /// visited, so the size of `src` does not matter.
    pub fn copy(&mut self, src: &Range, dest: Index) -> SheetResult<()> {
        let delta_row = i64::from(dest.row) - i64::from(src.first.row);
        let delta_col = i64::from(dest.col) - i64::from(src.first.col);

        let last = src
            .last
            .offset(delta_row, delta_col)
            .ok_or_else(|| Error::InvalidRange(format!("{} copied to {}", src, dest)))?;
        let target = Range::new(dest, last);

        // Every source cell lands inside `target`, so the offsets cannot fail
        let moves: Vec<(Index, Cell)> = self
            .sheet
            .cells_in(src)
            .into_iter()
            .filter_map(|(index, cell)| {
                let moved = index.offset(delta_row, delta_col)?;
                Some((moved, shifted_cell(cell, delta_row, delta_col)))
            })
            .collect();

        info!(%src, %dest, cells = moves.len(), "copy");
        self.sheet.clear_range(&target);
        for (index, cell) in moves {
            self.sheet.insert(index, cell);
        }
        Ok(())
    }

    /// Reorder the rows of `range` by the evaluated value in `column`
    ///
    /// Numbers sort before text and error markers sort last; descending order
    /// is the exact reverse. The sort is stable. Whole rows move, raw text and
    /// format together, and formulas are moved verbatim.
    pub fn sort(&mut self, range: &Range, column: u32, ascending: bool) -> SheetResult<()> {
        check_size(range)?;
        if !(range.first.col..=range.last.col).contains(&column) {
            return Err(Error::InvalidRange(format!(
                "column {} is outside {}",
                Index::new(0, column).column_label(),
                range
            ))
            .into());
        }

        let mut rows: Vec<(SortKey, Vec<Option<Cell>>)> = (0..range.height())
            .map(|i| {
                let row = range.first.row + i;
                let key = SortKey::of(&self.sheet, Index::new(row, column));
                let cells = range.row(i).map(|index| self.sheet.cell(index).cloned()).collect();
                (key, cells)
            })
            .collect();

        if ascending {
            rows.sort_by(|a, b| a.0.compare(&b.0));
        } else {
            rows.sort_by(|a, b| b.0.compare(&a.0));
        }

        info!(%range, column, ascending, "sort");
        for (i, (_, cells)) in (0u32..).zip(rows) {
            for (index, cell) in range.row(i).zip(cells) {
                match cell {
                    Some(cell) => {
                        self.sheet.insert(index, cell);
                    }
                    None => {
                        self.sheet.remove(index);
                    }
                }
            }
        }
        Ok(())
    }
}

fn check_size(range: &Range) -> SheetResult<()> {
    if range.cell_count() > MAX_RANGE_CELLS {
        return Err(Error::InvalidRange(format!(
            "{} has more than {} cells",
            range, MAX_RANGE_CELLS
        ))
        .into());
    }
    Ok(())
}

fn shifted_cell(cell: &Cell, delta_row: i64, delta_col: i64) -> Cell {
    let raw = match cell.formula() {
        Some(formula) => match shift_references(formula, delta_row, delta_col) {
            Ok(shifted) => format!("={}", shifted),
            // Unlexable formulas evaluate to an error wherever they land
            Err(_) => cell.raw().to_string(),
        },
        None => cell.raw().to_string(),
    };
    Cell::with_format(raw, cell.format.clone())
}

/// Ordering key of one row in [`Spreadsheet::sort`]
#[derive(Debug, Clone, PartialEq)]
enum SortKey {
    Number(f64),
    Text(String),
    Error,
}

impl SortKey {
    fn of(sheet: &Worksheet, index: Index) -> Self {
        match EvaluationContext::new(sheet).resolve(index) {
            Err(_) => SortKey::Error,
            Ok(text) => match FormulaValue::from_resolved(&text) {
                FormulaValue::Number(n) => SortKey::Number(n),
                _ => SortKey::Text(text),
            },
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Number(_) => 0,
            SortKey::Text(_) => 1,
            SortKey::Error => 2,
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

#[cfg(feature = "csv")]
mod csv_io {
    use std::io::{Read, Write};
    use std::path::Path;

    use slate_sheets_csv::{CsvReadOptions, CsvReader, CsvWriteOptions, CsvWriter};

    use super::Spreadsheet;
    use crate::error::SheetResult;

    impl Spreadsheet {
        /// Load a spreadsheet from a CSV file, one cell per field
        pub fn open_csv<P: AsRef<Path>>(path: P, options: &CsvReadOptions) -> SheetResult<Self> {
            Ok(CsvReader::read_file(path, options)?.into())
        }

        /// Load a spreadsheet from CSV text
        pub fn read_csv<R: Read>(reader: R, options: &CsvReadOptions) -> SheetResult<Self> {
            Ok(CsvReader::read(reader, options)?.into())
        }

        /// Save the used range to a CSV file
        pub fn save_csv<P: AsRef<Path>>(&self, path: P, options: &CsvWriteOptions) -> SheetResult<()> {
            Ok(CsvWriter::write_file(&self.sheet, path, options)?)
        }

        /// Write the used range as CSV
        pub fn write_csv<W: Write>(&self, writer: W, options: &CsvWriteOptions) -> SheetResult<()> {
            Ok(CsvWriter::write(&self.sheet, writer, options)?)
        }
    }
}

impl From<Worksheet> for Spreadsheet {
    fn from(sheet: Worksheet) -> Self {
        Self::from_worksheet(sheet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn idx(label: &str) -> Index {
        Index::parse(label).unwrap()
    }

    #[test]
    fn test_sort_key_order() {
        let mut keys = vec![
            SortKey::Error,
            SortKey::Text("b".into()),
            SortKey::Number(10.0),
            SortKey::Text("a".into()),
            SortKey::Number(-2.0),
        ];
        keys.sort_by(|a, b| a.compare(b));
        assert_eq!(
            keys,
            vec![
                SortKey::Number(-2.0),
                SortKey::Number(10.0),
                SortKey::Text("a".into()),
                SortKey::Text("b".into()),
                SortKey::Error,
            ]
        );
    }

    #[test]
    fn test_precedents() {
        let mut sheet = Spreadsheet::new();
        sheet.set(idx("A1"), "=B1 + sum(C1:C4000000) + B1-D1");
        sheet.set(idx("A2"), "12");
        sheet.set(idx("A3"), "=1 +");
        sheet.set(idx("C2"), "4");
        sheet.set(idx("C900"), "5");

        assert_eq!(
            sheet.precedents(idx("A1")),
            vec![idx("B1"), idx("C2"), idx("C900"), idx("D1")]
        );
        assert!(sheet.precedents(idx("A2")).is_empty());
        assert!(sheet.precedents(idx("A3")).is_empty());
        assert!(sheet.precedents(idx("Z9")).is_empty());
    }

    #[test]
    fn test_shifted_cell_keeps_format() {
        let format = CellFormat::new(FormatKind::Number, Some("%.2f")).unwrap();
        let cell = Cell::with_format("=A1 * 2", format.clone());
        let moved = shifted_cell(&cell, 1, 0);
        assert_eq!(moved.raw(), "=A2 * 2");
        assert_eq!(moved.format, format);

        let text = Cell::new("A1");
        assert_eq!(shifted_cell(&text, 1, 1).raw(), "A1");
    }
}
