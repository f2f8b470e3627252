//! Statistics Engine - Descriptive statistics and Box-Cox lambda search.
//!
//! Moments use the population convention (divisor n). Skewness is the third
//! standardized moment and kurtosis is the fourth standardized moment minus 3.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::CandidateGrid;

/// Lambdas evaluated by the Box-Cox likelihood search, in scan order.
pub const LAMBDA_SEARCH_GRID: CandidateGrid =
    CandidateGrid::new(&[-2.0, -1.5, -1.0, -0.5, 0.0, 0.5, 1.0, 1.5, 2.0]);

/// Lambdas with a conventional reading (inverse square, inverse, log, ...).
pub const INTERPRETABLE_LAMBDAS: CandidateGrid =
    CandidateGrid::new(&[-2.0, -1.0, -0.5, 0.0, 0.5, 1.0, 2.0, 3.0]);

/// Lambdas closer to zero than this use the log transform.
pub const LOG_LAMBDA_EPSILON: f64 = 1e-10;

/// Bound on |skewness| and |excess kurtosis| for "approximately normal".
pub const NORMALITY_BOUND: f64 = 1.0;

/// Per-series summary statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableStatistics {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub skewness: f64,
    /// Excess kurtosis.
    pub kurtosis: f64,
    pub approximately_normal: bool,
    pub optimal_lambda: f64,
    pub rounded_lambda: f64,
}

impl VariableStatistics {
    /// Statistics reported for a series without observations.
    pub fn empty() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            std_dev: 0.0,
            min: 0.0,
            max: 0.0,
            skewness: 0.0,
            kurtosis: 0.0,
            approximately_normal: false,
            optimal_lambda: 1.0,
            rounded_lambda: 1.0,
        }
    }
}

/// Descriptive statistics and power transforms.
pub struct StatisticsEngine;

impl StatisticsEngine {
    /// Summarizes a series.
    ///
    /// # Edge Cases
    /// - Empty input: zeroed record, not normal, lambda 1
    /// - Constant input: std dev, skewness and kurtosis are all 0
    pub fn describe(values: &[f64]) -> VariableStatistics {
        if values.is_empty() {
            return VariableStatistics::empty();
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let (std_dev, skewness, kurtosis) = if max == min {
            (0.0, 0.0, 0.0)
        } else {
            let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
            let std_dev = variance.sqrt();
            let m3 = values
                .iter()
                .map(|x| ((x - mean) / std_dev).powi(3))
                .sum::<f64>()
                / n;
            let m4 = values
                .iter()
                .map(|x| ((x - mean) / std_dev).powi(4))
                .sum::<f64>()
                / n;
            (std_dev, m3, m4 - 3.0)
        };

        let optimal_lambda = Self::find_optimal_lambda(values);

        VariableStatistics {
            count: values.len(),
            mean,
            std_dev,
            min,
            max,
            skewness,
            kurtosis,
            approximately_normal: skewness.abs() < NORMALITY_BOUND
                && kurtosis.abs() < NORMALITY_BOUND,
            optimal_lambda,
            rounded_lambda: Self::round_to_interpretable(optimal_lambda),
        }
    }

    /// Searches [`LAMBDA_SEARCH_GRID`] for the lambda maximizing the Box-Cox
    /// log-likelihood `-n * ln(sd(T)) + (lambda - 1) * sum(ln x)`.
    ///
    /// Returns 1 (no transform) unless every value is strictly positive and
    /// the series is not constant. Candidates with a non-finite likelihood
    /// are skipped; among equal likelihoods the lowest lambda wins.
    pub fn find_optimal_lambda(values: &[f64]) -> f64 {
        if values.is_empty() || values.iter().any(|&x| x <= 0.0) {
            return 1.0;
        }
        if values.iter().all(|&x| x == values[0]) {
            return 1.0;
        }

        let n = values.len() as f64;
        let log_sum: f64 = values.iter().map(|x| x.ln()).sum();

        LAMBDA_SEARCH_GRID
            .argmax_by(|lambda| {
                let transformed: Vec<f64> = values.iter().map(|&x| box_cox(x, lambda)).collect();
                let sd = population_variance(&transformed).sqrt();
                -n * sd.ln() + (lambda - 1.0) * log_sum
            })
            .map(|(lambda, _)| lambda)
            .unwrap_or(1.0)
    }

    /// Snaps a lambda to the nearest of [`INTERPRETABLE_LAMBDAS`]; on an
    /// exact tie the smaller value wins.
    pub fn round_to_interpretable(lambda: f64) -> f64 {
        INTERPRETABLE_LAMBDAS.nearest(lambda).unwrap_or(1.0)
    }

    /// Applies the Box-Cox transform with the given lambda.
    ///
    /// Lambda 1 returns the input unchanged. Otherwise non-positive values
    /// map to 0.
    pub fn apply_power_transform(values: &[f64], lambda: f64) -> Vec<f64> {
        if lambda == 1.0 {
            return values.to_vec();
        }
        values
            .iter()
            .map(|&x| if x <= 0.0 { 0.0 } else { box_cox(x, lambda) })
            .collect()
    }
}

/// Box-Cox transform of a single positive value.
fn box_cox(x: f64, lambda: f64) -> f64 {
    if lambda.abs() < LOG_LAMBDA_EPSILON {
        x.ln()
    } else {
        (x.powf(lambda) - 1.0) / lambda
    }
}

/// Divides every value by the largest magnitude in the series.
///
/// Squares of the result stay finite for any finite input. An all-zero
/// series is returned unchanged.
pub(crate) fn scale_by_max_abs(values: &[f64]) -> Vec<f64> {
    let scale = values.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
    if scale == 0.0 || !scale.is_finite() {
        return values.to_vec();
    }
    values.iter().map(|v| v / scale).collect()
}

fn population_variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn describe_empty_returns_zeroed_record() {
        let stats = StatisticsEngine::describe(&[]);
        assert_eq!(stats, VariableStatistics::empty());
        assert!(!stats.approximately_normal);
        assert_eq!(stats.optimal_lambda, 1.0);
    }

    #[test]
    fn describe_constant_series_is_normal_with_zero_moments() {
        let stats = StatisticsEngine::describe(&[0.1, 0.1, 0.1]);
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.skewness, 0.0);
        assert_eq!(stats.kurtosis, 0.0);
        assert!(stats.approximately_normal);
    }

    #[test]
    fn describe_uses_population_moments() {
        let stats = StatisticsEngine::describe(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(stats.count, 5);
        assert!(approx(stats.mean, 3.0));
        assert!(approx(stats.std_dev, 2.0_f64.sqrt()));
        assert!(approx(stats.skewness, 0.0));
        assert!(approx(stats.kurtosis, -1.3));
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 5.0);
        assert!(!stats.approximately_normal);
    }

    #[test]
    fn describe_flags_skewed_series() {
        let stats = StatisticsEngine::describe(&[1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 50.0]);
        assert!(stats.skewness > 1.0);
        assert!(!stats.approximately_normal);
    }

    #[test]
    fn optimal_lambda_requires_positive_values() {
        assert_eq!(StatisticsEngine::find_optimal_lambda(&[1.0, 0.0, 3.0]), 1.0);
        assert_eq!(StatisticsEngine::find_optimal_lambda(&[-1.0, 2.0, 3.0]), 1.0);
        assert_eq!(StatisticsEngine::find_optimal_lambda(&[]), 1.0);
    }

    #[test]
    fn optimal_lambda_for_log_symmetric_data_is_log() {
        let values: Vec<f64> = [-2.0_f64, -1.0, 0.0, 1.0, 2.0].iter().map(|t| t.exp()).collect();
        assert_eq!(StatisticsEngine::find_optimal_lambda(&values), 0.0);
    }

    #[test]
    fn optimal_lambda_for_constant_series_falls_back_to_one() {
        assert_eq!(StatisticsEngine::find_optimal_lambda(&[3.0, 3.0, 3.0]), 1.0);
    }

    #[test]
    fn rounding_snaps_to_interpretable_values() {
        assert_eq!(StatisticsEngine::round_to_interpretable(-1.5), -2.0);
        assert_eq!(StatisticsEngine::round_to_interpretable(0.1), 0.0);
        assert_eq!(StatisticsEngine::round_to_interpretable(0.75), 0.5);
        assert_eq!(StatisticsEngine::round_to_interpretable(1.4), 1.0);
        assert_eq!(StatisticsEngine::round_to_interpretable(9.0), 3.0);
    }

    #[test]
    fn rounding_ties_favor_the_smaller_value() {
        assert_eq!(StatisticsEngine::round_to_interpretable(0.25), 0.0);
        assert_eq!(StatisticsEngine::round_to_interpretable(1.5), 1.0);
        assert_eq!(StatisticsEngine::round_to_interpretable(2.5), 2.0);
    }

    #[test]
    fn power_transform_uses_log_near_zero() {
        let out = StatisticsEngine::apply_power_transform(&[1.0, std::f64::consts::E], 0.0);
        assert!(approx(out[0], 0.0));
        assert!(approx(out[1], 1.0));
    }

    #[test]
    fn power_transform_floors_non_positive_values() {
        let out = StatisticsEngine::apply_power_transform(&[-4.0, 0.0, 4.0], 0.5);
        assert_eq!(out[0], 0.0);
        assert_eq!(out[1], 0.0);
        assert!(approx(out[2], 2.0));
    }

    proptest! {
        #[test]
        fn lambda_one_is_identity(values in proptest::collection::vec(-1e6_f64..1e6, 0..40)) {
            let out = StatisticsEngine::apply_power_transform(&values, 1.0);
            prop_assert_eq!(out, values);
        }

        #[test]
        fn rounded_lambda_is_interpretable(values in proptest::collection::vec(0.01_f64..1e4, 3..40)) {
            let stats = StatisticsEngine::describe(&values);
            prop_assert!(INTERPRETABLE_LAMBDAS.values().contains(&stats.rounded_lambda));
            prop_assert!(LAMBDA_SEARCH_GRID.values().contains(&stats.optimal_lambda));
        }
    }
}
