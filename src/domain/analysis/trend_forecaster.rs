//! Trend Forecaster - Exponential smoothing per (alternative, category)
//! history with trend classification and letter grading.
//!
//! # Algorithm
//!
//! ```text
//! F_0 = x_0
//! F_i = α x_{i-1} + (1 - α) F_{i-1}
//! forecast = α x_last + (1 - α) F_last
//! ```
//!
//! Histories follow input row order; the time column only labels points.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::domain::foundation::{AnalysisError, Dataset, LetterGrade, ValidationError};

/// Histories shorter than this are not forecast.
pub const MIN_HISTORY: usize = 3;

/// Direction of the one-step forecast relative to the last fitted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

/// Threshold rule deciding between up, down and stable.
///
/// `Up` and `Down` mean a literal increase or decrease of more than the
/// threshold percentage. Whether an increase is good or bad is left to the
/// caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPolicy {
    threshold_pct: f64,
}

impl TrendPolicy {
    /// Creates a policy; the threshold must be a non-negative percentage.
    pub fn new(threshold_pct: f64) -> Result<Self, ValidationError> {
        if !threshold_pct.is_finite() || threshold_pct < 0.0 {
            return Err(ValidationError::out_of_range(
                "trend threshold",
                0.0,
                f64::MAX,
                threshold_pct,
            ));
        }
        Ok(Self { threshold_pct })
    }

    /// Returns the threshold percentage.
    pub fn threshold_pct(&self) -> f64 {
        self.threshold_pct
    }

    /// Classifies the move from `previous` to `next`.
    ///
    /// A zero `previous` has no defined percent change and is stable.
    pub fn classify(&self, previous: f64, next: f64) -> Trend {
        if previous == 0.0 {
            return Trend::Stable;
        }
        let change_pct = (next - previous) / previous.abs() * 100.0;
        if change_pct > self.threshold_pct {
            Trend::Up
        } else if change_pct < -self.threshold_pct {
            Trend::Down
        } else {
            Trend::Stable
        }
    }

    /// Classifies the last step of a sequence; fewer than 2 points is stable.
    pub fn classify_sequence(&self, sequence: &[f64]) -> Trend {
        match sequence {
            [.., previous, next] => self.classify(*previous, *next),
            _ => Trend::Stable,
        }
    }
}

/// Ordered observations of one category for one alternative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierHistory {
    pub alternative: String,
    pub category: String,
    pub values: Vec<f64>,
    pub time_labels: Vec<String>,
}

impl SupplierHistory {
    fn new(alternative: String, category: String) -> Self {
        Self {
            alternative,
            category,
            values: Vec::new(),
            time_labels: Vec::new(),
        }
    }

    /// Returns the number of observations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if nothing was observed.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Forecast for one (alternative, category) history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub alternative: String,
    pub category: String,
    pub time_labels: Vec<String>,
    pub observed: Vec<f64>,
    pub fitted: Vec<f64>,
    /// One-step-ahead forecast.
    pub forecast: f64,
    /// 100 minus the mean absolute fit error; not clamped.
    pub accuracy: f64,
    pub trend: Trend,
    pub observed_grade: LetterGrade,
    pub fitted_grade: LetterGrade,
}

impl PredictionResult {
    /// Returns true if the fitted grade matches the observed grade.
    pub fn grade_matches(&self) -> bool {
        self.observed_grade == self.fitted_grade
    }
}

/// A history left out for lack of observations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedSeries {
    pub alternative: String,
    pub category: String,
    pub observations: usize,
}

/// Grade agreement across all forecasts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracySummary {
    pub total: usize,
    pub matches: usize,
    /// Percentage of forecasts whose fitted grade equals the observed grade.
    pub match_rate: Option<f64>,
    /// Forecasts whose observed grade is C or D.
    pub at_risk_total: usize,
    pub at_risk_matches: usize,
    pub at_risk_match_rate: Option<f64>,
}

impl AccuracySummary {
    /// Summarizes grade agreement over `predictions`.
    pub fn from_predictions(predictions: &[PredictionResult]) -> Self {
        let total = predictions.len();
        let matches = predictions.iter().filter(|p| p.grade_matches()).count();

        let at_risk: Vec<&PredictionResult> = predictions
            .iter()
            .filter(|p| p.observed_grade.is_at_risk())
            .collect();
        let at_risk_matches = at_risk.iter().filter(|p| p.grade_matches()).count();

        Self {
            total,
            matches,
            match_rate: rate(matches, total),
            at_risk_total: at_risk.len(),
            at_risk_matches,
            at_risk_match_rate: rate(at_risk_matches, at_risk.len()),
        }
    }
}

fn rate(hits: usize, total: usize) -> Option<f64> {
    (total > 0).then(|| hits as f64 / total as f64 * 100.0)
}

/// Everything produced by one forecasting run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    /// Down-trending entries first, then by alternative.
    pub predictions: Vec<PredictionResult>,
    pub skipped: Vec<SkippedSeries>,
    pub accuracy: AccuracySummary,
}

/// Columns a forecast reads from the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastColumns {
    pub time_column: String,
    pub identifier_column: String,
    pub categories: Vec<String>,
}

/// Exponential smoothing forecaster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendForecaster {
    alpha: f64,
    policy: TrendPolicy,
    min_history: usize,
}

impl TrendForecaster {
    /// Creates a forecaster.
    ///
    /// # Parameters
    /// - `alpha`: smoothing factor in [0, 1]
    /// - `threshold_pct`: non-negative trend threshold in percent
    pub fn new(alpha: f64, threshold_pct: f64) -> Result<Self, ValidationError> {
        if !alpha.is_finite() || !(0.0..=1.0).contains(&alpha) {
            return Err(ValidationError::out_of_range("alpha", 0.0, 1.0, alpha));
        }
        Ok(Self {
            alpha,
            policy: TrendPolicy::new(threshold_pct)?,
            min_history: MIN_HISTORY,
        })
    }

    /// Overrides the minimum history length (at least 1).
    pub fn with_min_history(mut self, min_history: usize) -> Self {
        self.min_history = min_history.max(1);
        self
    }

    /// Returns the smoothing factor.
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Returns the trend policy.
    pub fn policy(&self) -> TrendPolicy {
        self.policy
    }

    /// Groups, smooths and grades every eligible history.
    ///
    /// # Errors
    /// - `MissingSelection` if no category is selected
    /// - `ColumnNotFound` / `EmptyVariable` naming the offending column
    pub fn forecast(
        &self,
        dataset: &Dataset,
        columns: &ForecastColumns,
    ) -> Result<ForecastReport, AnalysisError> {
        let histories = Self::group_histories(dataset, columns)?;

        let mut predictions = Vec::new();
        let mut skipped = Vec::new();
        for history in histories {
            if history.len() < self.min_history {
                debug!(
                    alternative = %history.alternative,
                    category = %history.category,
                    observations = history.len(),
                    "Skipping history too short to forecast"
                );
                skipped.push(SkippedSeries {
                    alternative: history.alternative,
                    category: history.category,
                    observations: history.values.len(),
                });
                continue;
            }
            predictions.push(self.predict(history));
        }

        predictions.sort_by(|a, b| {
            (a.trend != Trend::Down)
                .cmp(&(b.trend != Trend::Down))
                .then_with(|| a.alternative.cmp(&b.alternative))
        });
        let accuracy = AccuracySummary::from_predictions(&predictions);

        Ok(ForecastReport {
            predictions,
            skipped,
            accuracy,
        })
    }

    /// Builds per-(alternative, category) histories in row order.
    ///
    /// A row contributes when its identifier and time cells are filled and
    /// at least one category cell is numeric; each numeric category cell
    /// extends that category's history.
    pub fn group_histories(
        dataset: &Dataset,
        columns: &ForecastColumns,
    ) -> Result<Vec<SupplierHistory>, AnalysisError> {
        if columns.categories.is_empty() {
            return Err(AnalysisError::missing_selection("category"));
        }
        let time_index = dataset.require_column(&columns.time_column)?;
        let id_index = dataset.require_column(&columns.identifier_column)?;
        let category_indices = columns
            .categories
            .iter()
            .map(|c| {
                dataset.numeric_series(c)?;
                dataset.require_column(c)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut histories: Vec<SupplierHistory> = Vec::new();
        let mut positions: HashMap<(String, String), usize> = HashMap::new();

        for row in dataset.rows() {
            let (Some(alternative), Some(time_label)) =
                (row[id_index].as_label(), row[time_index].as_label())
            else {
                continue;
            };

            for (category, &column) in columns.categories.iter().zip(&category_indices) {
                let Some(value) = row[column].as_number() else {
                    continue;
                };
                let key = (alternative.clone(), category.clone());
                let position = *positions.entry(key).or_insert_with(|| {
                    histories.push(SupplierHistory::new(alternative.clone(), category.clone()));
                    histories.len() - 1
                });
                histories[position].values.push(value);
                histories[position].time_labels.push(time_label.clone());
            }
        }

        Ok(histories)
    }

    /// Fitted sequence and one-step forecast for a series.
    ///
    /// Returns empty fitted values and a forecast of 0 for an empty series.
    pub fn smooth(&self, observed: &[f64]) -> (Vec<f64>, f64) {
        let Some(&first) = observed.first() else {
            return (Vec::new(), 0.0);
        };

        let mut fitted = Vec::with_capacity(observed.len());
        fitted.push(first);
        for i in 1..observed.len() {
            let next = self.alpha * observed[i - 1] + (1.0 - self.alpha) * fitted[i - 1];
            fitted.push(next);
        }

        let last = observed.len() - 1;
        let forecast = self.alpha * observed[last] + (1.0 - self.alpha) * fitted[last];
        (fitted, forecast)
    }

    fn predict(&self, history: SupplierHistory) -> PredictionResult {
        let (fitted, forecast) = self.smooth(&history.values);
        let accuracy = fit_accuracy(&history.values, &fitted);

        let mut sequence = fitted.clone();
        sequence.push(forecast);
        let trend = self.policy.classify_sequence(&sequence);

        let last_observed = history.values.last().copied().unwrap_or(0.0);
        let last_fitted = fitted.last().copied().unwrap_or(0.0);

        PredictionResult {
            alternative: history.alternative,
            category: history.category,
            time_labels: history.time_labels,
            observed: history.values,
            fitted,
            forecast,
            accuracy,
            trend,
            observed_grade: LetterGrade::from_score(last_observed),
            fitted_grade: LetterGrade::from_score(last_fitted),
        }
    }
}

/// 100 minus the mean absolute error between observed and fitted values.
pub fn fit_accuracy(observed: &[f64], fitted: &[f64]) -> f64 {
    let n = observed.len().min(fitted.len());
    if n == 0 {
        return 100.0;
    }
    let mae = observed
        .iter()
        .zip(fitted)
        .map(|(o, f)| (o - f).abs())
        .sum::<f64>()
        / n as f64;
    100.0 - mae
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::CellValue;
    use proptest::prelude::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn columns(categories: &[&str]) -> ForecastColumns {
        ForecastColumns {
            time_column: "Month".to_string(),
            identifier_column: "Supplier".to_string(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn history_dataset() -> Dataset {
        let rows: Vec<(&str, &str, CellValue, CellValue)> = vec![
            ("Acme", "Jan", 90.0.into(), 70.0.into()),
            ("Bolt", "Jan", 10.0.into(), CellValue::Empty),
            ("Acme", "Feb", 80.0.into(), 72.0.into()),
            ("", "Feb", 55.0.into(), 1.0.into()),
            ("Bolt", "", 11.0.into(), 1.0.into()),
            ("Bolt", "Feb", 12.0.into(), "x".into()),
            ("Acme", "Mar", 60.0.into(), 74.0.into()),
            ("Bolt", "Mar", 13.0.into(), CellValue::Empty),
            ("Cato", "Mar", "n/a".into(), 50.0.into()),
        ];
        rows.into_iter()
            .fold(
                Dataset::builder().columns(vec!["Supplier", "Month", "Quality", "Delivery"]),
                |b, (s, m, q, d)| b.row(vec![s.into(), m.into(), q, d]),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn repeated_forecast_is_identical() {
        let forecaster = TrendForecaster::new(0.4, 5.0).unwrap().with_min_history(2);
        let cols = columns(&["Quality", "Delivery"]);
        let first = forecaster.forecast(&history_dataset(), &cols).unwrap();
        let second = forecaster.forecast(&history_dataset(), &cols).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
        assert_eq!(forecaster.alpha(), 0.4);
        assert_eq!(forecaster.policy().threshold_pct(), 5.0);
    }

    #[test]
    fn smoothing_follows_lagged_recurrence() {
        let forecaster = TrendForecaster::new(0.3, 5.0).unwrap();
        let (fitted, forecast) = forecaster.smooth(&[10.0, 12.0, 13.0, 11.0, 14.0]);
        let expected = [10.0, 10.0, 10.6, 11.32, 11.224];
        for (f, e) in fitted.iter().zip(expected) {
            assert!(approx(*f, e));
        }
        assert!(approx(forecast, 12.0568));
    }

    #[test]
    fn alpha_zero_never_adapts() {
        let forecaster = TrendForecaster::new(0.0, 5.0).unwrap();
        let (fitted, forecast) = forecaster.smooth(&[4.0, 9.0, 1.0, 7.0]);
        assert_eq!(fitted, vec![4.0; 4]);
        assert_eq!(forecast, 4.0);
    }

    #[test]
    fn alpha_one_repeats_previous_observation() {
        let forecaster = TrendForecaster::new(1.0, 5.0).unwrap();
        let (fitted, forecast) = forecaster.smooth(&[4.0, 9.0, 1.0, 7.0]);
        assert_eq!(fitted, vec![4.0, 4.0, 9.0, 1.0]);
        assert_eq!(forecast, 7.0);
    }

    #[test]
    fn accuracy_is_not_clamped() {
        assert!(approx(fit_accuracy(&[10.0, 12.0], &[10.0, 10.0]), 99.0));
        assert!(approx(fit_accuracy(&[0.0, 400.0], &[0.0, 0.0]), -100.0));
    }

    #[test]
    fn policy_classifies_percent_change() {
        let policy = TrendPolicy::new(5.0).unwrap();
        assert_eq!(policy.classify(100.0, 106.0), Trend::Up);
        assert_eq!(policy.classify(100.0, 105.0), Trend::Stable);
        assert_eq!(policy.classify(100.0, 94.0), Trend::Down);
        assert_eq!(policy.classify(-100.0, -90.0), Trend::Up);
        assert_eq!(policy.classify(0.0, 50.0), Trend::Stable);
        assert_eq!(policy.classify_sequence(&[7.0]), Trend::Stable);
        assert_eq!(policy.classify_sequence(&[]), Trend::Stable);
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        assert!(TrendForecaster::new(1.5, 5.0).is_err());
        assert!(TrendForecaster::new(f64::NAN, 5.0).is_err());
        assert!(TrendForecaster::new(0.5, -1.0).is_err());
    }

    #[test]
    fn grouping_follows_row_order_and_skips_incomplete_rows() {
        let histories =
            TrendForecaster::group_histories(&history_dataset(), &columns(&["Quality", "Delivery"])).unwrap();

        let keys: Vec<(&str, &str, usize)> = histories
            .iter()
            .map(|h| (h.alternative.as_str(), h.category.as_str(), h.len()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("Acme", "Quality", 3),
                ("Acme", "Delivery", 3),
                ("Bolt", "Quality", 3),
                ("Cato", "Delivery", 1),
            ]
        );
        assert_eq!(histories[0].values, vec![90.0, 80.0, 60.0]);
        assert_eq!(histories[2].time_labels, vec!["Jan", "Feb", "Mar"]);
    }

    #[test]
    fn forecast_skips_short_histories_and_sorts_down_first() {
        let forecaster = TrendForecaster::new(0.5, 5.0).unwrap();
        let report = forecaster
            .forecast(&history_dataset(), &columns(&["Quality", "Delivery"]))
            .unwrap();

        assert_eq!(
            report.skipped,
            vec![SkippedSeries {
                alternative: "Cato".to_string(),
                category: "Delivery".to_string(),
                observations: 1,
            }]
        );

        let order: Vec<(&str, &str, Trend)> = report
            .predictions
            .iter()
            .map(|p| (p.alternative.as_str(), p.category.as_str(), p.trend))
            .collect();
        assert_eq!(
            order,
            vec![
                ("Acme", "Quality", Trend::Down),
                ("Acme", "Delivery", Trend::Stable),
                ("Bolt", "Quality", Trend::Up),
            ]
        );
    }

    #[test]
    fn prediction_grades_last_observed_and_fitted_values() {
        let forecaster = TrendForecaster::new(0.5, 5.0).unwrap();
        let report = forecaster
            .forecast(&history_dataset(), &columns(&["Quality"]))
            .unwrap();
        let acme = &report.predictions[0];

        assert_eq!(acme.fitted, vec![90.0, 90.0, 85.0]);
        assert_eq!(acme.forecast, 72.5);
        assert_eq!(acme.observed_grade, LetterGrade::C);
        assert_eq!(acme.fitted_grade, LetterGrade::A);
        assert!(approx(acme.accuracy, 100.0 - 35.0 / 3.0));
    }

    #[test]
    fn accuracy_summary_counts_matches() {
        let forecaster = TrendForecaster::new(0.5, 5.0).unwrap();
        let report = forecaster
            .forecast(&history_dataset(), &columns(&["Quality", "Delivery"]))
            .unwrap();
        let summary = &report.accuracy;

        // Acme/Quality C vs A, Acme/Delivery B vs B, Bolt/Quality D vs D
        assert_eq!(summary.total, 3);
        assert_eq!(summary.matches, 2);
        assert!(approx(summary.match_rate.unwrap(), 200.0 / 3.0));
        assert_eq!(summary.at_risk_total, 2);
        assert_eq!(summary.at_risk_matches, 1);
        assert_eq!(summary.at_risk_match_rate, Some(50.0));
    }

    #[test]
    fn empty_summary_has_no_rates() {
        let summary = AccuracySummary::from_predictions(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.match_rate, None);
        assert_eq!(summary.at_risk_match_rate, None);
    }

    #[test]
    fn missing_category_selection_is_rejected() {
        let forecaster = TrendForecaster::new(0.5, 5.0).unwrap();
        let err = forecaster.forecast(&history_dataset(), &columns(&[])).unwrap_err();
        assert_eq!(err, AnalysisError::missing_selection("category"));
    }

    #[test]
    fn missing_columns_are_named() {
        let forecaster = TrendForecaster::new(0.5, 5.0).unwrap();
        let mut cols = columns(&["Quality"]);
        cols.time_column = "Week".to_string();
        let err = forecaster.forecast(&history_dataset(), &cols).unwrap_err();
        assert_eq!(err, AnalysisError::column_not_found("Week"));

        let err = forecaster
            .forecast(&history_dataset(), &columns(&["Supplier"]))
            .unwrap_err();
        assert_eq!(err, AnalysisError::empty_variable("Supplier"));
    }

    proptest! {
        #[test]
        fn fitted_values_stay_within_observed_range(
            observed in proptest::collection::vec(-1e3_f64..1e3, 1..40),
            alpha in 0.0_f64..=1.0,
        ) {
            let forecaster = TrendForecaster::new(alpha, 5.0).unwrap();
            let (fitted, forecast) = forecaster.smooth(&observed);
            let min = observed.iter().copied().fold(f64::INFINITY, f64::min);
            let max = observed.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            prop_assert_eq!(fitted.len(), observed.len());
            for v in fitted.iter().chain(std::iter::once(&forecast)) {
                prop_assert!(*v >= min - 1e-9 && *v <= max + 1e-9);
            }
        }
    }
}
