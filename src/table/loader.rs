use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::source::{Cell, Table};
use crate::error::RowError;
use crate::grading::{ColumnRoles, GradingConfig};

/// Where a record's percentage score came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScoreSource {
    Percentage,
    /// Resolved from this category label
    Category(String),
}

/// A validated course row.
///
/// `score` is always a percentage in 0-100 and `credit` is always positive
/// for records produced by [`load`].
#[derive(Debug, Clone, PartialEq)]
pub struct CourseRecord {
    pub name: String,
    pub score: f64,
    pub source: ScoreSource,
    pub credit: f64,
    /// 1-based row number in the source table
    pub row: usize,
}

/// A row that was skipped, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// 1-based row number in the source table
    pub row: usize,
    pub course: Option<String>,
    pub reason: RowError,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.course {
            Some(course) => write!(f, "row {} ({}): {}", self.row, course, self.reason),
            None => write!(f, "row {}: {}", self.row, self.reason),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// Every course row was usable
    Clean,
    /// Some rows were skipped but at least one record remains
    Partial { skipped: usize },
    /// Nothing usable remains
    NoUsableData { skipped: usize },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub records: Vec<CourseRecord>,
    pub diagnostics: Vec<Diagnostic>,
}

impl LoadReport {
    pub fn status(&self) -> LoadStatus {
        let skipped = self.diagnostics.len();
        if self.records.is_empty() {
            LoadStatus::NoUsableData { skipped }
        } else if skipped > 0 {
            LoadStatus::Partial { skipped }
        } else {
            LoadStatus::Clean
        }
    }

    pub fn has_usable_data(&self) -> bool {
        !self.records.is_empty()
    }
}

/// Turn a table into validated course records plus per-row diagnostics.
///
/// Rows inside `columns.header_rows` are skipped, as are rows with no content
/// at all. Every other row either becomes a [`CourseRecord`] or a
/// [`Diagnostic`]; a bad row never stops the rest of the table from loading.
pub fn load(table: &Table, grading: &GradingConfig, columns: &ColumnRoles) -> LoadReport {
    let mut report = LoadReport::default();

    for (index, row) in table.rows().iter().enumerate().skip(columns.header_rows) {
        let row_number = index + 1;

        if row.iter().all(Cell::is_empty) {
            debug!(row = row_number, "skipping blank row");
            continue;
        }

        match parse_row(row, row_number, grading, columns) {
            Ok(record) => report.records.push(record),
            Err(diagnostic) => {
                debug!(row = row_number, reason = %diagnostic.reason, "skipping invalid row");
                report.diagnostics.push(diagnostic);
            }
        }
    }

    match report.status() {
        LoadStatus::NoUsableData { skipped } => {
            warn!(skipped, "course table has no usable rows")
        }
        LoadStatus::Partial { skipped } => info!(
            records = report.records.len(),
            skipped, "loaded course table with skipped rows"
        ),
        LoadStatus::Clean => info!(records = report.records.len(), "loaded course table"),
    }

    report
}

fn parse_row(
    row: &[Cell],
    row_number: usize,
    grading: &GradingConfig,
    columns: &ColumnRoles,
) -> Result<CourseRecord, Diagnostic> {
    let name = course_name(cell_at(row, columns.name));
    let fail = |reason: RowError| Diagnostic {
        row: row_number,
        course: name.clone(),
        reason,
    };

    let Some(course) = name.clone() else {
        return Err(fail(RowError::MissingName));
    };
    let (score, source) = resolve_score(cell_at(row, columns.score), grading).map_err(fail)?;
    let credit = resolve_credit(cell_at(row, columns.credit)).map_err(fail)?;

    Ok(CourseRecord {
        name: course,
        score,
        source,
        credit,
        row: row_number,
    })
}

fn cell_at(row: &[Cell], column: usize) -> &Cell {
    row.get(column).unwrap_or(&Cell::Empty)
}

/// The course name exactly as the table holds it.
fn course_name(cell: &Cell) -> Option<String> {
    (!cell.is_empty()).then(|| raw_text(cell))
}

fn resolve_score(cell: &Cell, grading: &GradingConfig) -> Result<(f64, ScoreSource), RowError> {
    if cell.is_empty() {
        return Err(RowError::MissingScore);
    }
    if let Some(n) = cell.as_number() {
        return check_range(n).map(|n| (n, ScoreSource::Percentage));
    }

    let label = match cell {
        Cell::Text(s) => s.as_str(),
        other => return Err(RowError::MalformedScore(raw_text(other))),
    };
    match grading.resolve_category(label) {
        Some(category) => check_range(category.score)
            .map(|score| (score, ScoreSource::Category(category.label.clone()))),
        None if looks_numeric(label) => Err(RowError::MalformedScore(label.to_string())),
        None => Err(RowError::UnrecognizedCategory(label.to_string())),
    }
}

fn check_range(score: f64) -> Result<f64, RowError> {
    if (0.0..=100.0).contains(&score) {
        Ok(score)
    } else {
        Err(RowError::ScoreOutOfRange(score))
    }
}

/// Text that starts like a number ("95分", "95%", "-3 pts") was meant as a
/// score, not a category label.
fn looks_numeric(text: &str) -> bool {
    text.trim_start_matches(['+', '-', '.'])
        .starts_with(|c: char| c.is_ascii_digit())
}

fn resolve_credit(cell: &Cell) -> Result<f64, RowError> {
    match cell.as_number() {
        Some(n) if n > 0.0 => Ok(n),
        _ => Err(RowError::InvalidCredit(raw_text(cell))),
    }
}

fn raw_text(cell: &Cell) -> String {
    match cell {
        Cell::Empty => String::new(),
        Cell::Number(n) => n.to_string(),
        Cell::Text(s) => s.clone(),
    }
}
