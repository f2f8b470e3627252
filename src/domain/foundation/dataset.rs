//! Dataset - Immutable snapshot of named columns and row-major cells.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::{AnalysisError, ValidationError};

/// A single cell of the dataset.
///
/// Serializes as a bare JSON number, string or `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    #[default]
    Empty,
}

impl CellValue {
    /// Returns the numeric value of the cell, if it has one.
    ///
    /// Text cells are parsed after trimming. NaN and infinities are not
    /// numeric data.
    pub fn as_number(&self) -> Option<f64> {
        let value = match self {
            CellValue::Number(n) => *n,
            CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
            CellValue::Empty => return None,
        };
        value.is_finite().then_some(value)
    }

    /// Returns the cell rendered as a label, or `None` for blank cells.
    pub fn as_label(&self) -> Option<String> {
        match self {
            CellValue::Number(n) if n.is_finite() => Some(n.to_string()),
            CellValue::Number(_) | CellValue::Empty => None,
            CellValue::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
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
        value.map(Into::into).unwrap_or(CellValue::Empty)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Empty => Ok(()),
        }
    }
}

/// A named, order-preserving run of finite numbers taken from one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSeries {
    pub name: String,
    pub values: Vec<f64>,
}

impl NumericSeries {
    /// Creates a series from a name and values.
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Returns the number of observations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the series has no observations.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns true if every observation is strictly positive.
    pub fn all_positive(&self) -> bool {
        !self.values.is_empty() && self.values.iter().all(|&v| v > 0.0)
    }
}

/// Read-only snapshot of a table: unique column names plus fixed-width rows.
///
/// The engine never mutates a dataset; every analysis borrows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDataset", into = "RawDataset")]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
    index: HashMap<String, usize>,
}

#[derive(Serialize, Deserialize)]
struct RawDataset {
    columns: Vec<String>,
    #[serde(default)]
    rows: Vec<Vec<CellValue>>,
}

impl TryFrom<RawDataset> for Dataset {
    type Error = ValidationError;

    fn try_from(raw: RawDataset) -> Result<Self, Self::Error> {
        Dataset::new(raw.columns, raw.rows)
    }
}

impl From<Dataset> for RawDataset {
    fn from(dataset: Dataset) -> Self {
        RawDataset {
            columns: dataset.columns,
            rows: dataset.rows,
        }
    }
}

impl Dataset {
    /// Creates a dataset, validating column uniqueness and row width.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self, ValidationError> {
        let mut index = HashMap::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(ValidationError::empty_field("column name"));
            }
            if index.insert(name.clone(), i).is_some() {
                return Err(ValidationError::invalid_format(
                    "columns",
                    format!("duplicate column name '{}'", name),
                ));
            }
        }

        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(ValidationError::invalid_format(
                    "rows",
                    format!("row {} has {} cells, expected {}", i, row.len(), columns.len()),
                ));
            }
        }

        Ok(Self {
            columns,
            rows,
            index,
        })
    }

    /// Creates a builder for constructing a dataset.
    pub fn builder() -> DatasetBuilder {
        DatasetBuilder::new()
    }

    /// Returns the column names in order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the rows in input order.
    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Returns the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Looks up a column position by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Returns the column position or a data error naming the column.
    pub fn require_column(&self, name: &str) -> Result<usize, AnalysisError> {
        self.column_index(name)
            .ok_or_else(|| AnalysisError::column_not_found(name))
    }

    /// Returns a single cell.
    pub fn cell(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    /// Extracts the numeric cells of a column, dropping everything else.
    ///
    /// # Errors
    /// - `ColumnNotFound` if the column is absent
    /// - `EmptyVariable` if no cell parses as a finite number
    pub fn numeric_series(&self, name: &str) -> Result<NumericSeries, AnalysisError> {
        let column = self.require_column(name)?;
        let values: Vec<f64> = self
            .rows
            .iter()
            .filter_map(|row| row[column].as_number())
            .collect();

        if values.is_empty() {
            return Err(AnalysisError::empty_variable(name));
        }

        Ok(NumericSeries::new(name, values))
    }
}

/// Builder for constructing Dataset instances.
#[derive(Debug, Default)]
pub struct DatasetBuilder {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl DatasetBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the column names.
    pub fn columns(mut self, names: Vec<impl Into<String>>) -> Self {
        self.columns = names.into_iter().map(|s| s.into()).collect();
        self
    }

    /// Appends a row.
    pub fn row(mut self, cells: Vec<CellValue>) -> Self {
        self.rows.push(cells);
        self
    }

    /// Builds the dataset.
    pub fn build(self) -> Result<Dataset, ValidationError> {
        Dataset::new(self.columns, self.rows)
    }
}
