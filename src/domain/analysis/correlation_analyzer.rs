//! Correlation Analyzer - Pearson correlation matrix over per-variable
//! power-transformed series.
//!
//! Each variable gets its own transform: series that are not approximately
//! normal and strictly positive are Box-Cox transformed with their rounded
//! optimal lambda, everything else is left as is. Significance uses a coarse
//! banding of the t statistic rather than an exact Student-t CDF.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

use super::statistics_engine::{scale_by_max_abs, StatisticsEngine, VariableStatistics};
use crate::domain::foundation::{AnalysisError, Dataset};

/// Default significance level for the correlation flag.
pub const DEFAULT_SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Power transform chosen for one variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PowerTransform {
    Identity,
    BoxCox { lambda: f64 },
}

impl PowerTransform {
    /// Builds the transform for a lambda; lambda 1 is the identity.
    pub fn from_lambda(lambda: f64) -> Self {
        if lambda == 1.0 {
            PowerTransform::Identity
        } else {
            PowerTransform::BoxCox { lambda }
        }
    }

    /// Returns the lambda this transform applies.
    pub fn lambda(&self) -> f64 {
        match self {
            PowerTransform::Identity => 1.0,
            PowerTransform::BoxCox { lambda } => *lambda,
        }
    }

    /// Transforms a series.
    pub fn apply(&self, values: &[f64]) -> Vec<f64> {
        StatisticsEngine::apply_power_transform(values, self.lambda())
    }
}

/// The statistics and transform decision recorded for a variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableTransform {
    pub statistics: VariableStatistics,
    pub transform: PowerTransform,
}

/// One entry of the correlation matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationCell {
    /// Pearson coefficient in [-1, 1].
    pub coefficient: f64,
    /// Approximate two-tailed p-value.
    pub p_value: f64,
    pub significant: bool,
}

impl CorrelationCell {
    /// The fixed diagonal entry.
    pub fn diagonal() -> Self {
        Self {
            coefficient: 1.0,
            p_value: 0.0,
            significant: true,
        }
    }
}

/// A pair of distinct variables with their correlation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelatedPair {
    pub first: String,
    pub second: String,
    pub cell: CorrelationCell,
}

/// Symmetric correlation matrix with the per-variable transforms used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    /// Variables in selection order; rows and columns follow this order.
    pub variables: Vec<String>,
    pub cells: Vec<Vec<CorrelationCell>>,
    pub transforms: BTreeMap<String, VariableTransform>,
}

impl CorrelationMatrix {
    /// Returns the number of variables.
    pub fn size(&self) -> usize {
        self.variables.len()
    }

    /// Looks up the cell for two variables by name.
    pub fn get(&self, first: &str, second: &str) -> Option<&CorrelationCell> {
        let i = self.variables.iter().position(|v| v == first)?;
        let j = self.variables.iter().position(|v| v == second)?;
        Some(&self.cells[i][j])
    }

    /// Returns the lambda applied to a variable.
    pub fn lambda_for(&self, variable: &str) -> Option<f64> {
        self.transforms.get(variable).map(|t| t.transform.lambda())
    }

    /// Significant off-diagonal pairs, strongest |r| first.
    pub fn significant_pairs(&self) -> Vec<CorrelatedPair> {
        let mut pairs = Vec::new();
        for i in 0..self.size() {
            for j in (i + 1)..self.size() {
                let cell = self.cells[i][j];
                if cell.significant {
                    pairs.push(CorrelatedPair {
                        first: self.variables[i].clone(),
                        second: self.variables[j].clone(),
                        cell,
                    });
                }
            }
        }
        pairs.sort_by(|a, b| b.cell.coefficient.abs().total_cmp(&a.cell.coefficient.abs()));
        pairs
    }
}

/// Builds correlation matrices from dataset columns.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationAnalyzer {
    significance_level: f64,
}

impl Default for CorrelationAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_SIGNIFICANCE_LEVEL)
    }
}

impl CorrelationAnalyzer {
    /// Creates an analyzer flagging cells with p <= `significance_level`.
    pub fn new(significance_level: f64) -> Self {
        Self { significance_level }
    }

    /// Returns the significance level.
    pub fn significance_level(&self) -> f64 {
        self.significance_level
    }

    /// Correlates the selected columns.
    ///
    /// Repeated selections are ignored.
    ///
    /// # Errors
    /// - `InsufficientSelection` if fewer than 2 distinct variables are selected
    /// - `ColumnNotFound` / `EmptyVariable` naming the offending column
    pub fn analyze<S: AsRef<str>>(
        &self,
        dataset: &Dataset,
        selected: &[S],
    ) -> Result<CorrelationMatrix, AnalysisError> {
        let mut seen = HashSet::new();
        let variables: Vec<String> = selected
            .iter()
            .map(|s| s.as_ref().to_string())
            .filter(|s| seen.insert(s.clone()))
            .collect();

        if variables.len() < 2 {
            return Err(AnalysisError::insufficient("variables", 2, variables.len()));
        }

        let mut transforms = BTreeMap::new();
        let mut series = Vec::with_capacity(variables.len());

        for name in &variables {
            let raw = dataset.numeric_series(name)?;
            let statistics = StatisticsEngine::describe(&raw.values);

            let transform = if !statistics.approximately_normal && raw.all_positive() {
                PowerTransform::from_lambda(statistics.rounded_lambda)
            } else {
                PowerTransform::Identity
            };

            debug!(
                variable = %name,
                observations = raw.len(),
                skewness = statistics.skewness,
                kurtosis = statistics.kurtosis,
                lambda = transform.lambda(),
                "Selected power transform"
            );

            series.push(transform.apply(&raw.values));
            transforms.insert(
                name.clone(),
                VariableTransform {
                    statistics,
                    transform,
                },
            );
        }

        let k = variables.len();
        let mut cells = vec![vec![CorrelationCell::diagonal(); k]; k];
        for i in 0..k {
            for j in (i + 1)..k {
                let cell = self.correlate(&series[i], &series[j]);
                cells[i][j] = cell;
                cells[j][i] = cell;
            }
        }

        Ok(CorrelationMatrix {
            variables,
            cells,
            transforms,
        })
    }

    fn correlate(&self, x: &[f64], y: &[f64]) -> CorrelationCell {
        let n = x.len().min(y.len());
        let coefficient = pearson(x, y);
        let p_value = approximate_p_value(coefficient, n);
        CorrelationCell {
            coefficient,
            p_value,
            significant: p_value <= self.significance_level,
        }
    }
}

/// Pearson correlation over the first `min(len)` paired observations.
///
/// Returns 0 when either side has zero variance. Each side is scaled by its
/// largest magnitude first, which leaves r unchanged.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n == 0 {
        return 0.0;
    }
    let (x, y) = (&x[..n], &y[..n]);

    if is_constant(x) || is_constant(y) {
        return 0.0;
    }
    let (x, y) = (scale_by_max_abs(x), scale_by_max_abs(y));

    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(&y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denominator = (var_x * var_y).sqrt();
    if denominator < 1e-300 {
        return 0.0;
    }
    (cov / denominator).clamp(-1.0, 1.0)
}

/// Approximate two-tailed p-value for a correlation from `n` pairs.
///
/// Bands `t = r * sqrt(n - 2) / sqrt(1 - r^2)`: |t| < 1 gives 0.5, < 2 gives
/// 0.2, < 2.5 gives 0.05, < 3 gives 0.01, < 4 gives 0.001, otherwise 0.0001.
/// Fewer than one degree of freedom gives 1.
pub fn approximate_p_value(r: f64, n: usize) -> f64 {
    if n < 3 || r.is_nan() {
        return 1.0;
    }
    let df = (n - 2) as f64;
    let t = (r * df.sqrt() / (1.0 - r * r).sqrt()).abs();

    if t < 1.0 {
        0.5
    } else if t < 2.0 {
        0.2
    } else if t < 2.5 {
        0.05
    } else if t < 3.0 {
        0.01
    } else if t < 4.0 {
        0.001
    } else {
        0.0001
    }
}

fn is_constant(values: &[f64]) -> bool {
    values.iter().all(|&v| v == values[0])
}
