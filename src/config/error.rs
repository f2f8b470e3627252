//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Significance level must be strictly between 0 and 1, got {0}")]
    InvalidSignificanceLevel(f64),

    #[error("Smoothing factor must be within [0, 1], got {0}")]
    InvalidAlpha(f64),

    #[error("Trend threshold must be a non-negative percentage, got {0}")]
    InvalidTrendThreshold(f64),

    #[error("Minimum forecast history must be at least 1")]
    InvalidMinHistory,
}
