//! Raw tabular data: student records and a column-keyed frame.
//!
//! [`RawFrame`] is the boundary type between files on disk and the feature
//! pipeline. Columns are addressed by name, so the pipeline never depends on
//! the order in which a CSV file or caller happened to lay them out.

mod generate;
mod split;

pub use generate::{generate_records, FEEDBACK_SAMPLES};
pub use split::{train_test_split, SplitIndices};

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::path::Path;
use thiserror::Error;

pub const STUDENT_ID: &str = "student_id";
pub const ATTENDANCE: &str = "attendance";
pub const ASSIGNMENTS_COMPLETED: &str = "assignments_completed";
pub const MIDTERM_SCORE: &str = "midterm_score";
pub const FINAL_SCORE: &str = "final_score";
pub const FEEDBACK: &str = "feedback";
pub const PASSED: &str = "passed";

/// Error type for raw data handling.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("row {row} has {got} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        got: usize,
    },
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),
}

/// One student observation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<u32>,
    /// Attendance percentage.
    pub attendance: f64,
    /// Assignments completed, out of 10.
    pub assignments_completed: f64,
    pub midterm_score: f64,
    pub final_score: f64,
    pub feedback: String,
    /// Target label (1 = passed). Absent for inference inputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed: Option<u8>,
}

impl StudentRecord {
    /// Build an inference record (no id, no target).
    pub fn new(
        attendance: f64,
        assignments_completed: f64,
        midterm_score: f64,
        final_score: f64,
        feedback: impl Into<String>,
    ) -> Self {
        Self {
            student_id: None,
            attendance,
            assignments_completed,
            midterm_score,
            final_score,
            feedback: feedback.into(),
            passed: None,
        }
    }
}

/// A single cell of a [`RawFrame`].
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
    Missing,
}

impl Cell {
    /// Interpret a raw CSV field: empty is missing, anything else is kept
    /// verbatim as text. Numeric columns are parsed when read as numbers, so
    /// free text such as "1e3" survives unchanged.
    pub fn parse(raw: &str) -> Self {
        if raw.trim().is_empty() {
            Cell::Missing
        } else {
            Cell::Text(raw.to_string())
        }
    }

    /// Numeric view of the cell; text is parsed after trimming.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            Cell::Text(s) => s.trim().parse().ok(),
            Cell::Missing => None,
        }
    }

    /// Text view of the cell; numbers are rendered back to text.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Cell::Text(s) => Some(Cow::Borrowed(s)),
            Cell::Number(v) => Some(Cow::Owned(v.to_string())),
            Cell::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(v) => write!(f, "{}", v),
            Cell::Text(s) => f.write_str(s),
            Cell::Missing => Ok(()),
        }
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

/// Row-major table with named columns.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawFrame {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl RawFrame {
    /// Create an empty frame with the given column names.
    pub fn new<I, S>(columns: I) -> Result<Self, DataError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        for (i, name) in columns.iter().enumerate() {
            if columns[..i].contains(name) {
                return Err(DataError::DuplicateColumn(name.clone()));
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    /// Append a row; its width must match the column count.
    pub fn push_row(&mut self, row: Vec<Cell>) -> Result<(), DataError> {
        if row.len() != self.columns.len() {
            return Err(DataError::RaggedRow {
                row: self.rows.len(),
                expected: self.columns.len(),
                got: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cells of the named column, top to bottom.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Cell> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Keep only the given rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            columns: self.columns.clone(),
            rows: indices.iter().map(|&i| self.rows[i].clone()).collect(),
        }
    }

    /// Drop rows containing any missing cell; returns how many were dropped.
    pub fn drop_incomplete_rows(&mut self) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| !row.iter().any(Cell::is_missing));
        before - self.rows.len()
    }

    /// Build a frame from typed records using the canonical column layout.
    pub fn from_records(records: &[StudentRecord]) -> Self {
        let with_target = records.iter().any(|r| r.passed.is_some());
        let mut columns = vec![
            STUDENT_ID,
            ATTENDANCE,
            ASSIGNMENTS_COMPLETED,
            MIDTERM_SCORE,
            FINAL_SCORE,
            FEEDBACK,
        ];
        if with_target {
            columns.push(PASSED);
        }

        let rows = records
            .iter()
            .map(|r| {
                let mut row = vec![
                    r.student_id.map_or(Cell::Missing, |id| Cell::Number(id as f64)),
                    Cell::Number(r.attendance),
                    Cell::Number(r.assignments_completed),
                    Cell::Number(r.midterm_score),
                    Cell::Number(r.final_score),
                    Cell::Text(r.feedback.clone()),
                ];
                if with_target {
                    row.push(r.passed.map_or(Cell::Missing, |p| Cell::Number(p as f64)));
                }
                row
            })
            .collect();

        Self {
            columns: columns.into_iter().map(String::from).collect(),
            rows,
        }
    }

    /// Read a CSV file with a header row.
    pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)?;
        let headers = reader.headers()?.clone();
        let mut frame = Self::new(headers.iter().map(|h| h.trim()))?;

        for result in reader.records() {
            let record = result?;
            frame.push_row(record.iter().map(Cell::parse).collect())?;
        }
        Ok(frame)
    }

    /// Write the frame as CSV with a header row.
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), DataError> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(|c| c.to_string()))?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Write typed records to CSV.
pub fn write_records<P: AsRef<Path>>(path: P, records: &[StudentRecord]) -> Result<(), DataError> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_records() -> Vec<StudentRecord> {
        vec![
            StudentRecord {
                student_id: Some(1),
                attendance: 90.0,
                assignments_completed: 9.0,
                midterm_score: 80.0,
                final_score: 85.0,
                feedback: "Excellent engagement".to_string(),
                passed: Some(1),
            },
            StudentRecord {
                student_id: Some(2),
                attendance: 72.0,
                assignments_completed: 5.0,
                midterm_score: 55.0,
                final_score: 50.0,
                feedback: "Struggles with assignments".to_string(),
                passed: Some(0),
            },
        ]
    }

    #[test]
    fn test_cell_parse() {
        assert_eq!(Cell::parse(""), Cell::Missing);
        assert_eq!(Cell::parse("  "), Cell::Missing);
        assert_eq!(Cell::parse("72.5"), Cell::Text("72.5".to_string()));
        assert_eq!(Cell::parse("Good"), Cell::Text("Good".to_string()));
    }

    #[test]
    fn test_cell_views() {
        assert_eq!(Cell::parse(" 72.5 ").as_number(), Some(72.5));
        assert_eq!(Cell::parse("Good").as_number(), None);
        assert_eq!(Cell::Number(3.0).as_number(), Some(3.0));
        assert_eq!(Cell::Missing.as_number(), None);
        assert_eq!(Cell::parse("1e3").as_text().as_deref(), Some("1e3"));
        assert_eq!(Cell::Missing.as_text(), None);
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let result = RawFrame::new(["a", "b", "a"]);
        assert!(matches!(result, Err(DataError::DuplicateColumn(c)) if c == "a"));
    }

    #[test]
    fn test_ragged_row_rejected() {
        let mut frame = RawFrame::new(["a", "b"]).unwrap();
        let result = frame.push_row(vec![Cell::Number(1.0)]);
        assert!(matches!(result, Err(DataError::RaggedRow { .. })));
    }

    #[test]
    fn test_from_records_layout() {
        let frame = RawFrame::from_records(&sample_records());
        assert_eq!(frame.columns().last().map(String::as_str), Some(PASSED));
        assert_eq!(frame.n_rows(), 2);

        let attendance: Vec<f64> = frame
            .column(ATTENDANCE)
            .unwrap()
            .filter_map(Cell::as_number)
            .collect();
        assert_eq!(attendance, vec![90.0, 72.0]);
    }

    #[test]
    fn test_from_records_without_target() {
        let frame = RawFrame::from_records(&[StudentRecord::new(80.0, 7.0, 70.0, 72.0, "Good")]);
        assert!(frame.column_index(PASSED).is_none());
    }

    #[test]
    fn test_drop_incomplete_rows() {
        let mut frame = RawFrame::new(["a", "b"]).unwrap();
        frame.push_row(vec![1.0.into(), "x".into()]).unwrap();
        frame.push_row(vec![Cell::Missing, "y".into()]).unwrap();
        assert_eq!(frame.drop_incomplete_rows(), 1);
        assert_eq!(frame.n_rows(), 1);
    }

    #[test]
    fn test_csv_round_trip_through_typed_writer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students.csv");
        write_records(&path, &sample_records()).unwrap();

        let frame = RawFrame::read_csv(&path).unwrap();
        let expected = RawFrame::from_records(&sample_records());
        assert_eq!(frame.columns(), expected.columns());
        for (read, typed) in frame.rows().iter().zip(expected.rows()) {
            for (a, b) in read.iter().zip(typed) {
                match b {
                    Cell::Number(v) => assert_eq!(a.as_number(), Some(*v)),
                    other => assert_eq!(a, other),
                }
            }
        }
    }

    #[test]
    fn test_numeric_looking_feedback_kept_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("students.csv");
        std::fs::write(&path, "attendance,feedback\n90,1e3\n85,infinity\n").unwrap();

        let frame = RawFrame::read_csv(&path).unwrap();
        let feedback: Vec<String> = frame
            .column(FEEDBACK)
            .unwrap()
            .filter_map(|c| c.as_text().map(|t| t.into_owned()))
            .collect();
        assert_eq!(feedback, vec!["1e3", "infinity"]);
        let attendance: Vec<f64> = frame
            .column(ATTENDANCE)
            .unwrap()
            .filter_map(Cell::as_number)
            .collect();
        assert_eq!(attendance, vec![90.0, 85.0]);
    }
}
