use std::fs::File;
use std::io::Read;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use tracing::debug;

use crate::error::TableError;

/// File extensions read through the workbook adapter; everything else is CSV.
const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// One cell of a course table.
///
/// Text cells keep what was written, so a course called "01" stays "01".
/// `Number` is only produced by sources that type their cells, such as a
/// workbook's numeric cells.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Classify raw cell text: blank, or the trimmed text as written.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(trimmed.to_string())
        }
    }

    /// The cell as a finite number, if it is one or its text reads as one.
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            Cell::Empty => return None,
            Cell::Number(n) => *n,
            Cell::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        n.is_finite().then_some(n)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::Int(n) => Cell::Number(*n as f64),
            Data::Float(n) if n.is_finite() => Cell::Number(*n),
            Data::String(s) => Cell::parse(s),
            other => Cell::parse(&other.to_string()),
        }
    }
}

/// A materialized table: rows of cells, header rows included.
///
/// Rows may have different lengths; a cell past the end of a row reads as empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    rows: Vec<Vec<Cell>>,
}

impl Table {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Read a table from disk, picking the adapter by file extension.
    pub fn from_path(path: &Path) -> Result<Self, TableError> {
        let is_workbook = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                WORKBOOK_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            })
            .unwrap_or(false);

        if is_workbook {
            Self::from_workbook_path(path)
        } else {
            Self::from_csv_path(path)
        }
    }

    /// Read the first worksheet of a spreadsheet workbook.
    ///
    /// Row and column indices stay absolute: a sheet whose data starts at B2
    /// still has its first cell at row 1, column 1.
    pub fn from_workbook_path(path: &Path) -> Result<Self, TableError> {
        if !path.exists() {
            return Err(TableError::Open {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }

        let mut workbook = open_workbook_auto(path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| TableError::NoWorksheet {
                path: path.to_path_buf(),
            })??;

        let (start_row, start_col) = range
            .start()
            .map(|(row, col)| (row as usize, col as usize))
            .unwrap_or((0, 0));

        let mut rows = vec![Vec::new(); start_row];
        for sheet_row in range.rows() {
            let mut row = vec![Cell::Empty; start_col];
            row.extend(sheet_row.iter().map(Cell::from));
            rows.push(row);
        }

        let table = Self { rows };
        debug!(path = %path.display(), rows = table.len(), "read course workbook");
        Ok(table)
    }

    /// Read a CSV file into a table
    pub fn from_csv_path(path: &Path) -> Result<Self, TableError> {
        let file = File::open(path).map_err(|source| TableError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_reader(file)?;
        debug!(path = %path.display(), rows = table.len(), "read course table");
        Ok(table)
    }

    /// Read CSV data from any reader. No row is treated as a header here;
    /// header skipping belongs to the column roles.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TableError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(record.iter().map(Cell::parse).collect());
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
