//! Application layer - Commands and the service that runs them.
//!
//! This layer resolves configuration defaults, validates selections and
//! delegates to the pure analyzers of the domain layer.

mod analysis_service;

pub use analysis_service::{
    AnalysisService, CorrelationCommand, ForecastCommand, RankingCommand, SensitivityCommand,
    SensitivityOutcome,
};
