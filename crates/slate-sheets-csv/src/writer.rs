//! CSV writer

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::CsvResult;
use crate::options::{CsvValues, CsvWriteOptions, LineTerminator};
use slate_sheets_core::Worksheet;
use slate_sheets_formula::evaluate_cell;

/// CSV file writer
pub struct CsvWriter;

impl CsvWriter {
    /// Write a worksheet to a CSV file
    pub fn write_file<P: AsRef<Path>>(
        worksheet: &Worksheet,
        path: P,
        options: &CsvWriteOptions,
    ) -> CsvResult<()> {
        let file = File::create(path)?;
        Self::write(worksheet, file, options)
    }

    /// Write a worksheet to a writer
    ///
    /// Covers the used range from `A1`; absent cells become empty fields.
    pub fn write<W: Write>(
        worksheet: &Worksheet,
        writer: W,
        options: &CsvWriteOptions,
    ) -> CsvResult<()> {
        let terminator = match options.line_terminator {
            LineTerminator::LF => csv::Terminator::Any(b'\n'),
            LineTerminator::CRLF => csv::Terminator::CRLF,
        };

        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .quote(options.quote)
            .terminator(terminator)
            .from_writer(writer);

        if let Some(range) = worksheet.used_range() {
            for i in 0..range.height() {
                let record: Vec<String> = range
                    .row(i)
                    .map(|index| match options.values {
                        CsvValues::Raw => worksheet.raw(index).to_string(),
                        CsvValues::Formatted => evaluate_cell(worksheet, index),
                    })
                    .collect();

                csv_writer.write_record(&record)?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use slate_sheets_core::{FormatKind, Index};

    fn sheet() -> Worksheet {
        let mut sheet = Worksheet::new();
        sheet.set(Index::new(0, 0), "1");
        sheet.set(Index::new(0, 1), "=A1 / 4");
        sheet.set(Index::new(1, 1), "a,b");
        sheet
            .set_format(Index::new(0, 1), FormatKind::Number, Some("%.2f"))
            .unwrap();
        sheet
    }

    fn write(sheet: &Worksheet, options: &CsvWriteOptions) -> String {
        let mut out = Vec::new();
        CsvWriter::write(sheet, &mut out, options).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_write_formatted() {
        assert_eq!(
            write(&sheet(), &CsvWriteOptions::default()),
            "1,0.25\n,\"a,b\"\n"
        );
    }

    #[test]
    fn test_write_raw() {
        let options = CsvWriteOptions {
            values: CsvValues::Raw,
            line_terminator: LineTerminator::CRLF,
            ..Default::default()
        };
        assert_eq!(write(&sheet(), &options), "1,=A1 / 4\r\n,\"a,b\"\r\n");
    }

    #[test]
    fn test_write_empty_sheet() {
        assert_eq!(write(&Worksheet::new(), &CsvWriteOptions::default()), "");
    }
}
