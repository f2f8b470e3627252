//! Analysis Module - Pure domain services for tabular data analysis.
//!
//! This module contains stateless engines that operate on a [`Dataset`]
//! or on values extracted from it and return plain result records.
//!
//! # Components
//!
//! - `StatisticsEngine` - Descriptive statistics and Box-Cox power transforms
//! - `CorrelationAnalyzer` - Pairwise Pearson correlation on transformed variables
//! - `CriteriaMatrix` - Raw criterion values per alternative
//! - `DecisionRankingEngine` - TOPSIS / Euclidean weighted ranking
//! - `TrendForecaster` - Exponential smoothing, trend and grade per history
//! - `WeightSensitivityOptimizer` - Doubling/halving weight reallocation
//!
//! # Design Philosophy
//!
//! All functions are pure apart from `tracing` events. They take domain
//! objects as input and return computed results. No ports or adapters needed
//! since there's no I/O or external dependencies.
//!
//! [`Dataset`]: crate::domain::foundation::Dataset

mod correlation_analyzer;
mod criteria_matrix;
mod ranking_engine;
mod statistics_engine;
mod trend_forecaster;
mod weight_optimizer;

// Re-export all public types
pub use correlation_analyzer::{
    approximate_p_value, pearson, CorrelatedPair, CorrelationAnalyzer, CorrelationCell,
    CorrelationMatrix, PowerTransform, VariableTransform, DEFAULT_SIGNIFICANCE_LEVEL,
};
pub use criteria_matrix::{CriteriaMatrix, CriteriaMatrixBuilder};
pub use ranking_engine::{
    CriterionScore, CriterionScorer, DecisionRankingEngine, EuclideanScorer, RankingMethod,
    RankingResult, SupplierScore, TopsisScorer, CONSTANT_COLUMN_SCORE,
};
pub use statistics_engine::{
    StatisticsEngine, VariableStatistics, INTERPRETABLE_LAMBDAS, LAMBDA_SEARCH_GRID,
    LOG_LAMBDA_EPSILON, NORMALITY_BOUND,
};
pub use trend_forecaster::{
    fit_accuracy, AccuracySummary, ForecastColumns, ForecastReport, PredictionResult,
    SkippedSeries, SupplierHistory, Trend, TrendForecaster, TrendPolicy, MIN_HISTORY,
};
pub use weight_optimizer::{
    OptimizationGoal, ScoreShift, SensitivityResult, WeightAdjustment,
    WeightSensitivityOptimizer, TARGET_WEIGHT_CEILING, TARGET_WEIGHT_FLOOR,
};
