//! CSV reader

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::options::CsvReadOptions;
use slate_sheets_core::{Index, Worksheet};

/// CSV file reader
pub struct CsvReader;

impl CsvReader {
    /// Read CSV file into a worksheet
    pub fn read_file<P: AsRef<Path>>(path: P, options: &CsvReadOptions) -> CsvResult<Worksheet> {
        let file = File::open(path)?;
        Self::read(file, options)
    }

    /// Read CSV from a reader into a worksheet
    ///
    /// Field `c` of record `r` becomes the raw text of `Index(r, c)`. Empty
    /// fields leave their cell absent. Records may have different lengths.
    pub fn read<R: Read>(reader: R, options: &CsvReadOptions) -> CsvResult<Worksheet> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .has_headers(options.has_header)
            .flexible(true)
            .from_reader(reader);

        let mut worksheet = Worksheet::new();

        for (row, result) in csv_reader.records().enumerate() {
            let record = result?;

            for (col, field) in record.iter().enumerate() {
                if field.is_empty() {
                    continue;
                }
                worksheet.set(Self::index(row, col)?, field);
            }
        }

        Ok(worksheet)
    }

    fn index(row: usize, col: usize) -> CsvResult<Index> {
        match (u32::try_from(row), u32::try_from(col)) {
            (Ok(r), Ok(c)) => Ok(Index::new(r, c)),
            _ => Err(CsvError::OutOfSheet { row, column: col }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_read_raw_text() {
        let data = "1,2,=A1+B1\nhello,,2018-01-01\n";
        let sheet = CsvReader::read(data.as_bytes(), &CsvReadOptions::default()).unwrap();

        assert_eq!(sheet.raw(Index::new(0, 2)), "=A1+B1");
        assert_eq!(sheet.raw(Index::new(1, 0)), "hello");
        assert_eq!(sheet.raw(Index::new(1, 2)), "2018-01-01");
        assert!(!sheet.contains(Index::new(1, 1)));
        assert_eq!(sheet.len(), 5);
    }

    #[test]
    fn test_read_ragged_rows_and_header() {
        let data = "name,value\na\nb,2,extra\n";
        let options = CsvReadOptions {
            has_header: true,
            ..Default::default()
        };
        let sheet = CsvReader::read(data.as_bytes(), &options).unwrap();

        assert_eq!(sheet.raw(Index::new(0, 0)), "a");
        assert_eq!(sheet.raw(Index::new(1, 2)), "extra");
    }

    #[test]
    fn test_read_custom_delimiter() {
        let options = CsvReadOptions {
            delimiter: b';',
            ..Default::default()
        };
        let sheet = CsvReader::read("\"a;b\";c".as_bytes(), &options).unwrap();
        assert_eq!(sheet.raw(Index::new(0, 0)), "a;b");
        assert_eq!(sheet.raw(Index::new(0, 1)), "c");
    }
}
