//! AnalysisService - Entry point callers use to run analyses over a dataset.
//!
//! Each operation takes a command describing the selection plus optional
//! overrides, fills the gaps from [`AppConfig`], and delegates to the pure
//! analyzers in [`crate::domain::analysis`].

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{AppConfig, ConfigError};
use crate::domain::analysis::{
    CorrelationAnalyzer, CorrelationMatrix, CriteriaMatrix, DecisionRankingEngine,
    ForecastColumns, ForecastReport, OptimizationGoal, RankingMethod, RankingResult, ScoreShift,
    SensitivityResult, TrendForecaster, WeightSensitivityOptimizer,
};
use crate::domain::foundation::{AnalysisError, Dataset, ValidationError, WeightMap};

/// Command to correlate dataset columns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorrelationCommand {
    pub variables: Vec<String>,
    /// Overrides the configured significance level.
    #[serde(default)]
    pub significance_level: Option<f64>,
}

/// Command to rank alternatives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingCommand {
    pub identifier_column: String,
    pub weights: WeightMap,
    /// Overrides the configured ranking method.
    #[serde(default)]
    pub method: Option<RankingMethod>,
}

/// Command to forecast per-alternative category histories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastCommand {
    #[serde(flatten)]
    pub columns: ForecastColumns,
    /// Overrides the configured smoothing factor.
    #[serde(default)]
    pub alpha: Option<f64>,
    /// Overrides the configured trend threshold, in percent.
    #[serde(default)]
    pub trend_threshold_pct: Option<f64>,
}

/// Command to test how rankings respond to one criterion's weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityCommand {
    pub identifier_column: String,
    pub weights: WeightMap,
    pub target: String,
    pub goal: OptimizationGoal,
}

/// Result of a sensitivity run with the rescored alternatives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityOutcome {
    pub result: SensitivityResult,
    /// Ordered by new rank.
    pub shifts: Vec<ScoreShift>,
}

/// Runs analyses with configuration-backed defaults.
#[derive(Debug, Clone)]
pub struct AnalysisService {
    config: AppConfig,
}

impl AnalysisService {
    /// Creates a service after validating the configuration.
    pub fn new(config: AppConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the configuration in use.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Builds the correlation matrix of the selected variables.
    pub fn correlate(
        &self,
        dataset: &Dataset,
        cmd: &CorrelationCommand,
    ) -> Result<CorrelationMatrix, AnalysisError> {
        let significance_level = match cmd.significance_level {
            Some(level) if !(level > 0.0 && level < 1.0) => {
                return Err(log_failure(
                    "correlation",
                    ValidationError::out_of_range("significance_level", 0.0, 1.0, level).into(),
                ));
            }
            Some(level) => level,
            None => self.config.correlation.significance_level,
        };

        let analyzer = CorrelationAnalyzer::new(significance_level);
        let matrix = analyzer
            .analyze(dataset, &cmd.variables)
            .map_err(|e| log_failure("correlation", e))?;

        info!(
            variables = matrix.size(),
            significant_pairs = matrix.significant_pairs().len(),
            significance_level = analyzer.significance_level(),
            "Correlation matrix computed"
        );
        Ok(matrix)
    }

    /// Ranks the alternatives on the weighted criteria.
    pub fn rank(
        &self,
        dataset: &Dataset,
        cmd: &RankingCommand,
    ) -> Result<RankingResult, AnalysisError> {
        let method = cmd.method.unwrap_or(self.config.ranking.method);

        let result = DecisionRankingEngine::rank(dataset, &cmd.identifier_column, &cmd.weights, method)
            .map_err(|e| log_failure("ranking", e))?;

        info!(
            method = method.label(),
            criteria = cmd.weights.len(),
            alternatives = result.scores.len(),
            leader = result.top().map(|s| s.alternative.as_str()).unwrap_or(""),
            "Alternatives ranked"
        );
        Ok(result)
    }

    /// Smooths and grades every (alternative, category) history.
    pub fn forecast(
        &self,
        dataset: &Dataset,
        cmd: &ForecastCommand,
    ) -> Result<ForecastReport, AnalysisError> {
        let defaults = &self.config.forecast;
        let alpha = cmd.alpha.unwrap_or(defaults.alpha);
        let threshold = cmd.trend_threshold_pct.unwrap_or(defaults.trend_threshold_pct);

        let forecaster = TrendForecaster::new(alpha, threshold)
            .map(|f| f.with_min_history(defaults.min_history))
            .map_err(|e| log_failure("forecast", e.into()))?;
        debug!(
            alpha = forecaster.alpha(),
            threshold_pct = forecaster.policy().threshold_pct(),
            min_history = defaults.min_history,
            "Forecasting"
        );

        let report = forecaster
            .forecast(dataset, &cmd.columns)
            .map_err(|e| log_failure("forecast", e))?;

        info!(
            predictions = report.predictions.len(),
            skipped = report.skipped.len(),
            grade_matches = report.accuracy.matches,
            "Forecast completed"
        );
        Ok(report)
    }

    /// Reallocates weights toward the goal and rescores the alternatives.
    ///
    /// Weight errors are reported before the dataset is read.
    pub fn sensitivity(
        &self,
        dataset: &Dataset,
        cmd: &SensitivityCommand,
    ) -> Result<SensitivityOutcome, AnalysisError> {
        let result = WeightSensitivityOptimizer::optimize(&cmd.weights, &cmd.target, cmd.goal)
            .map_err(|e| log_failure("sensitivity", e))?;

        let matrix =
            CriteriaMatrix::from_dataset(dataset, &cmd.identifier_column, &cmd.weights.criteria())
                .map_err(|e| log_failure("sensitivity", e))?;
        let shifts = result.rescore(&matrix);

        info!(
            target = %result.target,
            goal = ?result.goal,
            alternatives = shifts.len(),
            reordered = shifts.iter().filter(|s| s.old_rank != s.new_rank).count(),
            "Weight sensitivity computed"
        );
        Ok(SensitivityOutcome { result, shifts })
    }
}

fn log_failure(module: &'static str, error: AnalysisError) -> AnalysisError {
    warn!(
        module,
        code = %error.code(),
        category = ?error.category(),
        error = %error,
        "Analysis failed"
    );
    error
}
