use serde::{Deserialize, Serialize};

use crate::error::{DrilldownError, Result};

/// A single raw attribute value as it arrives from a source table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Missing,
}

impl CellValue {
    /// Numeric reading of the cell, if it has one.
    ///
    /// Text that parses as a float counts as numeric; a missing cell reads as NaN.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse::<f64>().ok(),
            CellValue::Missing => Some(f64::NAN),
        }
    }

    /// Category label of the cell
    pub fn as_category(&self) -> String {
        match self {
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Missing => "nan".to_string(),
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Missing)
    }
}

/// Column-major attribute table, optionally labeled
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataTable {
    columns: Vec<Vec<CellValue>>,
    labels: Option<Vec<String>>,
}

impl DataTable {
    /// Create an empty labeled table
    pub fn new() -> Self {
        Self { columns: Vec::new(), labels: Some(Vec::new()) }
    }

    /// Create a labeled table from (name, values) pairs
    pub fn labeled<S, I>(columns: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, Vec<CellValue>)>,
    {
        let (labels, columns): (Vec<String>, Vec<Vec<CellValue>>) =
            columns.into_iter().map(|(name, values)| (name.into(), values)).unzip();
        Self { columns, labels: Some(labels) }
    }

    /// Create an unlabeled table from raw columns
    pub fn unlabeled(columns: Vec<Vec<CellValue>>) -> Self {
        Self { columns, labels: None }
    }

    /// Create an unlabeled table from a row-major matrix
    pub fn from_rows(rows: Vec<Vec<CellValue>>) -> Result<Self> {
        let width = rows.first().map(Vec::len).unwrap_or(0);
        let mut columns = vec![Vec::with_capacity(rows.len()); width];

        for (row_index, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(DrilldownError::LengthMismatch {
                    what: format!("data row {}", row_index),
                    expected: width,
                    found: row.len(),
                });
            }
            for (column, value) in columns.iter_mut().zip(row) {
                column.push(value);
            }
        }

        Ok(Self { columns, labels: None })
    }

    /// Append a named column
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<CellValue>) -> Self {
        self.labels.get_or_insert_with(Vec::new).push(name.into());
        self.columns.push(values);
        self
    }

    /// Column labels, present only for self-describing tables
    pub fn labels(&self) -> Option<&[String]> {
        match &self.labels {
            Some(labels) if labels.len() == self.columns.len() => Some(labels),
            _ => None,
        }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Vec<CellValue>] {
        &self.columns
    }

    /// Keep only the rows flagged `true`, in every column
    pub fn retain_rows(&mut self, keep: &[bool]) {
        for column in &mut self.columns {
            let mut flags = keep.iter();
            column.retain(|_| flags.next().copied().unwrap_or(false));
        }
    }

    pub fn into_columns(self) -> Vec<Vec<CellValue>> {
        self.columns
    }
}
