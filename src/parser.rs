//! Reading the tabular data produced by prioritization methods and the HPO reference
//!
//! All inputs are loaded into a [`Table`] of string cells. Interpreting the
//! cells (numbers, flags, gene IDs) is left to the callers.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use flate2::read::MultiGzDecoder;
use tracing::{debug, trace};

use crate::{PrioError, PrioResult};

/// The field separator of a delimited text file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Delimiter {
    Comma,
    Tab,
    /// Any run of whitespace, as used by MAGMA's `genes.out`
    Whitespace,
}

impl Delimiter {
    fn as_byte(self) -> Option<u8> {
        match self {
            Delimiter::Comma => Some(b','),
            Delimiter::Tab => Some(b'\t'),
            Delimiter::Whitespace => None,
        }
    }
}

/// A table with a header row and string cells
#[derive(Debug, Default, Clone)]
pub(crate) struct Table {
    source: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Reads a delimited text file, decompressing it if the file name ends with `.gz`
    pub fn from_delimited<P: AsRef<Path>>(path: P, delimiter: Delimiter) -> PrioResult<Self> {
        let source = path.as_ref().display().to_string();
        let reader = open_reader(path.as_ref())?;
        let table = Self::from_reader(reader, delimiter, &source)?;
        debug!(
            "Read {} rows and {} columns from {}",
            table.len(),
            table.headers.len(),
            source
        );
        Ok(table)
    }

    /// Reads a delimited table from any reader
    ///
    /// `source` is only used to label errors
    pub fn from_reader<R: Read>(reader: R, delimiter: Delimiter, source: &str) -> PrioResult<Self> {
        match delimiter.as_byte() {
            Some(byte) => Self::from_csv(reader, byte, source),
            None => Self::from_whitespace(reader, source),
        }
    }

    fn from_csv<R: Read>(reader: R, delimiter: u8, source: &str) -> PrioResult<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }
        Ok(Table {
            source: source.to_string(),
            headers,
            rows,
        })
    }

    fn from_whitespace<R: Read>(reader: R, source: &str) -> PrioResult<Self> {
        let mut lines = BufReader::new(reader).lines();
        let header = loop {
            match lines.next() {
                Some(line) => {
                    let line = line?;
                    if !line.trim().is_empty() {
                        break line;
                    }
                }
                None => return Err(PrioError::InvalidInput(format!("{source} is empty"))),
            }
        };
        let headers = header.split_whitespace().map(str::to_string).collect();

        let mut rows = Vec::new();
        for line in lines {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            rows.push(line.split_whitespace().map(str::to_string).collect());
        }
        Ok(Table {
            source: source.to_string(),
            headers,
            rows,
        })
    }

    /// Reads a single sheet of a spreadsheet workbook (xlsx, xls, ods)
    ///
    /// The first row of the sheet is used as header
    pub fn from_sheet<P: AsRef<Path>>(path: P, sheet: &str) -> PrioResult<Self> {
        let source = path.as_ref().display().to_string();
        let mut workbook = open_workbook_auto(path.as_ref())?;
        let range = workbook.worksheet_range(sheet)?;

        let mut sheet_rows = range.rows();
        let Some(header) = sheet_rows.next() else {
            return Err(PrioError::InvalidInput(format!(
                "sheet {sheet} of {source} is empty"
            )));
        };
        let headers = header.iter().map(cell_to_string).collect();
        let rows = sheet_rows
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect();

        let table = Table {
            source,
            headers,
            rows,
        };
        debug!("Read {} rows from sheet {} of {}", table.len(), sheet, table.source);
        Ok(table)
    }

    /// Constructs a table from in-memory headers and rows
    #[cfg(test)]
    pub fn new(source: &str, headers: &[&str], rows: &[&[&str]]) -> Self {
        Table {
            source: source.to_string(),
            headers: headers.iter().map(|h| (*h).to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|c| (*c).to_string()).collect())
                .collect(),
        }
    }

    /// The name of the file the table was read from
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Removes trailing whitespace from all header names
    pub fn trim_headers(&mut self) {
        for header in &mut self.headers {
            let trimmed = header.trim_end().len();
            header.truncate(trimmed);
        }
    }

    /// Returns the index of the required column `name`
    ///
    /// # Errors
    ///
    /// [`PrioError::FileFormat`] if the column does not exist
    pub fn column(&self, name: &str) -> PrioResult<usize> {
        self.optional_column(name)
            .ok_or_else(|| PrioError::FileFormat {
                file: self.source.clone(),
                column: name.to_string(),
            })
    }

    /// Returns the index of the column `name`, if present
    pub fn optional_column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// Iterates all data rows
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|cells| Row { cells })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A single data row of a [`Table`]
#[derive(Debug, Clone, Copy)]
pub(crate) struct Row<'a> {
    cells: &'a [String],
}

impl<'a> Row<'a> {
    /// Returns the raw cell at `idx`
    ///
    /// Rows that are shorter than the header return an empty cell
    pub fn get(&self, idx: usize) -> &'a str {
        self.cells.get(idx).map_or("", String::as_str)
    }

    /// Parses the cell at `idx` as `f64`, see [`parse_float`]
    pub fn float(&self, idx: usize) -> f64 {
        parse_float(self.get(idx))
    }

    /// Parses the cell at `idx` as flag, see [`parse_flag`]
    pub fn flag(&self, idx: usize) -> bool {
        parse_flag(self.get(idx))
    }
}

/// Parses a numeric cell
///
/// Empty cells, missing-value markers and all other unparsable
/// content are returned as `NaN`.
pub(crate) fn parse_float(value: &str) -> f64 {
    let value = value.trim();
    match value.parse::<f64>() {
        Ok(number) => number,
        Err(_) => {
            trace!("Unable to parse '{}' as number", value);
            f64::NAN
        }
    }
}

/// Parses a boolean cell
///
/// `Yes`, `True` and `1` (in any case) are `true`, everything else is `false`
pub(crate) fn parse_flag(value: &str) -> bool {
    let value = value.trim();
    value.eq_ignore_ascii_case("yes") || value.eq_ignore_ascii_case("true") || value == "1"
}

/// Opens a file and decompresses it on the fly if it ends with `.gz`
pub(crate) fn open_reader(path: &Path) -> PrioResult<Box<dyn Read>> {
    let filename = path.display().to_string();
    let file = File::open(path).map_err(|_| PrioError::CannotOpenFile(filename))?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(MultiGzDecoder::new(file)))
    } else {
        Ok(Box::new(file))
    }
}

/// Returns `true` if the file is a spreadsheet workbook, based on its extension
pub(crate) fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            matches!(
                ext.to_ascii_lowercase().as_str(),
                "xlsx" | "xlsm" | "xlsb" | "xls" | "ods"
            )
        })
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn read_csv() {
        let data = "ensemble_id,label,netwas_score\nGeneA,1,0.6\nGeneB,1,0.3\n";
        let table = Table::from_reader(data.as_bytes(), Delimiter::Comma, "test").unwrap();
        assert_eq!(table.headers(), ["ensemble_id", "label", "netwas_score"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.column("netwas_score").unwrap(), 2);

        let first = table.rows().next().unwrap();
        assert_eq!(first.get(0), "GeneA");
        assert!((first.float(2) - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn read_whitespace() {
        let data = "GENE       CHR      START       STOP  NSNPS        P\n\
                    ENSG1        1      11869      14412      2   0.00001\n\
                    \n\
                    ENSG2        1      14363      29806      5   0.52\n";
        let table = Table::from_reader(data.as_bytes(), Delimiter::Whitespace, "test").unwrap();
        assert_eq!(table.headers().len(), 6);
        assert_eq!(table.len(), 2);
        let p = table.column("P").unwrap();
        let pvalues: Vec<f64> = table.rows().map(|row| row.float(p)).collect();
        assert_eq!(pvalues, vec![0.00001, 0.52]);
    }

    #[test]
    fn empty_whitespace_file() {
        let result = Table::from_reader("\n\n".as_bytes(), Delimiter::Whitespace, "test");
        assert!(matches!(result, Err(PrioError::InvalidInput(_))));
    }

    #[test]
    fn missing_column() {
        let table = Table::new("foo.tsv", &["a", "b"], &[&["1", "2"]]);
        match table.column("c") {
            Err(PrioError::FileFormat { file, column }) => {
                assert_eq!(file, "foo.tsv");
                assert_eq!(column, "c");
            }
            _ => panic!("expected a format error"),
        }
        assert!(table.optional_column("c").is_none());
    }

    #[test]
    fn short_rows_yield_empty_cells() {
        let table = Table::new("foo.tsv", &["a", "b"], &[&["1"]]);
        let row = table.rows().next().unwrap();
        assert_eq!(row.get(1), "");
        assert!(row.float(1).is_nan());
    }

    #[test]
    fn trim_headers() {
        let mut table = Table::new("depict", &["Ensembl Gene ID  ", "Nominal P value\t"], &[]);
        table.trim_headers();
        assert_eq!(table.headers(), ["Ensembl Gene ID", "Nominal P value"]);
    }

    #[test]
    fn floats() {
        assert!((parse_float(" 1.5 ") - 1.5).abs() < f64::EPSILON);
        assert!((parse_float("1e-4") - 0.0001).abs() < f64::EPSILON);
        assert!(parse_float("NA").is_nan());
        assert!(parse_float("").is_nan());
        assert!(parse_float("<0.001").is_nan());
    }

    #[test]
    fn flags() {
        assert!(parse_flag("Yes"));
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("true "));
        assert!(parse_flag("1"));
        assert!(!parse_flag("No"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn spreadsheet_extensions() {
        assert!(is_spreadsheet(Path::new("result.xlsx")));
        assert!(is_spreadsheet(Path::new("result.XLS")));
        assert!(!is_spreadsheet(Path::new("result.txt")));
        assert!(!is_spreadsheet(Path::new("result")));
    }
}
