//! Analysis defaults: correlation, ranking and forecasting

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::analysis::{RankingMethod, DEFAULT_SIGNIFICANCE_LEVEL, MIN_HISTORY};

/// Correlation configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CorrelationConfig {
    /// Two-sided p-value below which a coefficient is significant
    #[serde(default = "default_significance_level")]
    pub significance_level: f64,
}

impl CorrelationConfig {
    /// Validate correlation configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        let level = self.significance_level;
        if !(level > 0.0 && level < 1.0) {
            return Err(ValidationError::InvalidSignificanceLevel(level));
        }
        Ok(())
    }
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            significance_level: default_significance_level(),
        }
    }
}

/// Ranking configuration
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RankingConfig {
    /// Method used when a request does not name one
    #[serde(default)]
    pub method: RankingMethod,
}

/// Forecast configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ForecastConfig {
    /// Exponential smoothing factor
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Relative change, in percent, beyond which a trend is up or down
    #[serde(default = "default_trend_threshold_pct")]
    pub trend_threshold_pct: f64,

    /// Histories shorter than this are skipped
    #[serde(default = "default_min_history")]
    pub min_history: usize,
}

impl ForecastConfig {
    /// Validate forecast configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(ValidationError::InvalidAlpha(self.alpha));
        }
        if !self.trend_threshold_pct.is_finite() || self.trend_threshold_pct < 0.0 {
            return Err(ValidationError::InvalidTrendThreshold(self.trend_threshold_pct));
        }
        if self.min_history == 0 {
            return Err(ValidationError::InvalidMinHistory);
        }
        Ok(())
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            trend_threshold_pct: default_trend_threshold_pct(),
            min_history: default_min_history(),
        }
    }
}

fn default_significance_level() -> f64 {
    DEFAULT_SIGNIFICANCE_LEVEL
}

fn default_alpha() -> f64 {
    0.3
}

fn default_trend_threshold_pct() -> f64 {
    5.0
}

fn default_min_history() -> usize {
    MIN_HISTORY
}
