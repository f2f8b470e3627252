//! Criteria Matrix - Raw criterion values per alternative.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::foundation::{AnalysisError, Dataset, WeightMap};

/// Alternatives × criteria table of raw values, aligned positionally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CriteriaMatrix {
    /// Alternatives in input order.
    pub alternatives: Vec<String>,
    /// Criteria in selection order.
    pub criteria: Vec<String>,
    /// One row per alternative, one value per criterion.
    pub values: Vec<Vec<f64>>,
}

impl CriteriaMatrix {
    /// Creates a builder for constructing a matrix.
    pub fn builder() -> CriteriaMatrixBuilder {
        CriteriaMatrixBuilder::new()
    }

    /// Extracts the matrix from a dataset.
    ///
    /// Rows with a blank identifier are skipped. A non-numeric criterion
    /// cell in a kept row counts as 0.
    ///
    /// # Errors
    /// - `ColumnNotFound` if the identifier or a criterion column is absent
    /// - `EmptyVariable` if a criterion column has no numeric value in any
    ///   kept row
    pub fn from_dataset<S: AsRef<str>>(
        dataset: &Dataset,
        identifier_column: &str,
        criteria: &[S],
    ) -> Result<Self, AnalysisError> {
        let id_index = dataset.require_column(identifier_column)?;
        let criterion_indices = criteria
            .iter()
            .map(|c| dataset.require_column(c.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut alternatives = Vec::new();
        let mut values = Vec::new();
        let mut numeric_seen = vec![false; criteria.len()];

        for (row_number, row) in dataset.rows().iter().enumerate() {
            let Some(alternative) = row[id_index].as_label() else {
                continue;
            };

            let mut row_values = Vec::with_capacity(criteria.len());
            for (k, &column) in criterion_indices.iter().enumerate() {
                match row[column].as_number() {
                    Some(value) => {
                        numeric_seen[k] = true;
                        row_values.push(value);
                    }
                    None => {
                        debug!(
                            row = row_number,
                            criterion = criteria[k].as_ref(),
                            "Non-numeric criterion value counted as 0"
                        );
                        row_values.push(0.0);
                    }
                }
            }

            alternatives.push(alternative);
            values.push(row_values);
        }

        if let Some(k) = numeric_seen.iter().position(|seen| !seen) {
            return Err(AnalysisError::empty_variable(criteria[k].as_ref()));
        }

        Ok(Self {
            alternatives,
            criteria: criteria.iter().map(|c| c.as_ref().to_string()).collect(),
            values,
        })
    }

    /// Returns true if the matrix has no alternatives.
    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }

    /// Returns the number of alternatives.
    pub fn alternative_count(&self) -> usize {
        self.alternatives.len()
    }

    /// Returns the number of criteria.
    pub fn criterion_count(&self) -> usize {
        self.criteria.len()
    }

    /// Returns the position of a criterion.
    pub fn criterion_index(&self, criterion: &str) -> Option<usize> {
        self.criteria.iter().position(|c| c == criterion)
    }

    /// Gets a raw value by alternative and criterion.
    pub fn get(&self, alternative: &str, criterion: &str) -> Option<f64> {
        let row = self.alternatives.iter().position(|a| a == alternative)?;
        let column = self.criterion_index(criterion)?;
        self.values.get(row)?.get(column).copied()
    }

    /// Returns one criterion's values across all alternatives.
    pub fn column(&self, index: usize) -> Vec<f64> {
        self.values
            .iter()
            .map(|row| row.get(index).copied().unwrap_or(0.0))
            .collect()
    }

    /// Weighted sum of raw values per alternative.
    ///
    /// Criteria absent from `weights` contribute nothing.
    pub fn weighted_sums(&self, weights: &WeightMap) -> Vec<f64> {
        let column_weights: Vec<f64> = self
            .criteria
            .iter()
            .map(|c| weights.get(c).unwrap_or(0.0))
            .collect();

        self.values
            .iter()
            .map(|row| row.iter().zip(&column_weights).map(|(v, w)| v * w).sum())
            .collect()
    }
}

/// Builder for constructing CriteriaMatrix instances.
#[derive(Debug, Default)]
pub struct CriteriaMatrixBuilder {
    alternatives: Vec<String>,
    criteria: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl CriteriaMatrixBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the criteria.
    pub fn criteria(mut self, names: Vec<impl Into<String>>) -> Self {
        self.criteria = names.into_iter().map(|s| s.into()).collect();
        self
    }

    /// Adds an alternative with its raw values, one per criterion.
    pub fn alternative(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.alternatives.push(name.into());
        self.values.push(values);
        self
    }

    /// Builds the matrix.
    pub fn build(self) -> CriteriaMatrix {
        CriteriaMatrix {
            alternatives: self.alternatives,
            criteria: self.criteria,
            values: self.values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::CellValue;

    fn suppliers() -> Dataset {
        Dataset::builder()
            .columns(vec!["Supplier", "Cost", "Quality", "Notes"])
            .row(vec!["A".into(), 10.0.into(), 7.0.into(), "ok".into()])
            .row(vec![CellValue::Empty, 3.0.into(), 9.0.into(), "orphan".into()])
            .row(vec!["B".into(), "n/a".into(), 8.0.into(), "late".into()])
            .build()
            .unwrap()
    }

    #[test]
    fn extraction_skips_rows_without_identifier() {
        let matrix = CriteriaMatrix::from_dataset(&suppliers(), "Supplier", &["Cost", "Quality"]).unwrap();
        assert_eq!(matrix.alternatives, vec!["A", "B"]);
        assert_eq!(matrix.criteria, vec!["Cost", "Quality"]);
    }

    #[test]
    fn non_numeric_cells_count_as_zero() {
        let matrix = CriteriaMatrix::from_dataset(&suppliers(), "Supplier", &["Cost", "Quality"]).unwrap();
        assert_eq!(matrix.get("B", "Cost"), Some(0.0));
        assert_eq!(matrix.get("B", "Quality"), Some(8.0));
    }

    #[test]
    fn missing_identifier_column_fails() {
        let err = CriteriaMatrix::from_dataset(&suppliers(), "Vendor", &["Cost"]).unwrap_err();
        assert_eq!(err, AnalysisError::column_not_found("Vendor"));
    }

    #[test]
    fn missing_criterion_column_fails() {
        let err = CriteriaMatrix::from_dataset(&suppliers(), "Supplier", &["Cost", "Speed"]).unwrap_err();
        assert_eq!(err, AnalysisError::column_not_found("Speed"));
    }

    #[test]
    fn text_criterion_column_fails() {
        let err = CriteriaMatrix::from_dataset(&suppliers(), "Supplier", &["Notes"]).unwrap_err();
        assert_eq!(err, AnalysisError::empty_variable("Notes"));
    }

    #[test]
    fn weighted_sums_use_raw_values() {
        let matrix = CriteriaMatrix::builder()
            .criteria(vec!["x", "y"])
            .alternative("A", vec![10.0, 2.0])
            .alternative("B", vec![4.0, 6.0])
            .build();
        let weights = WeightMap::try_from_pairs(vec![("x", 0.25), ("y", 0.75)]).unwrap();
        assert_eq!(matrix.weighted_sums(&weights), vec![4.0, 5.5]);
        assert_eq!(matrix.column(1), vec![2.0, 6.0]);
    }
}
