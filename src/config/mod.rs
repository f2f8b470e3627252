//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `DATA_SHERPA_` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use data_sherpa::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Smoothing factor {}", config.forecast.alpha);
//! ```

mod analysis;
mod error;
mod logging;

pub use analysis::{CorrelationConfig, ForecastConfig, RankingConfig};
pub use error::{ConfigError, ValidationError};
pub use logging::LoggingConfig;

use serde::Deserialize;
use std::path::Path;

const ENV_PREFIX: &str = "DATA_SHERPA";
const ENV_SEPARATOR: &str = "__";

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a usable
/// configuration. Load using [`AppConfig::load()`] or
/// [`AppConfig::load_from_file()`].
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Logging configuration (filter directive, output format)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Correlation defaults (significance level)
    #[serde(default)]
    pub correlation: CorrelationConfig,

    /// Ranking defaults (method)
    #[serde(default)]
    pub ranking: RankingConfig,

    /// Forecast defaults (alpha, trend threshold, minimum history)
    #[serde(default)]
    pub forecast: ForecastConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `DATA_SHERPA` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `DATA_SHERPA__FORECAST__ALPHA=0.5` -> `forecast.alpha = 0.5`
    /// - `DATA_SHERPA__RANKING__METHOD=euclidean` -> `ranking.method = Euclidean`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(Self::environment())
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load configuration from a file, with environment variables layered on top
    ///
    /// The format (TOML, YAML, JSON, ...) is inferred from the file extension.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing or unparsable, or if
    /// values cannot be parsed into expected types.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(Self::environment())
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.logging.validate()?;
        self.correlation.validate()?;
        self.forecast.validate()?;
        Ok(())
    }

    fn environment() -> config::Environment {
        config::Environment::default()
            .prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
    }
}
