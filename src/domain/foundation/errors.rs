//! Error types for the analytical engine.

use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        actual: f64,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: f64, max: f64, actual: f64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Broad classes of analysis failure.
///
/// Configuration errors are detected before any computation starts; data
/// errors abort the invocation once the offending column is inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Configuration,
    Data,
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Configuration errors
    ValidationFailed,
    InsufficientSelection,
    MissingSelection,
    MissingWeight,
    UnknownCriterion,
    WeightsNotNormalized,

    // Data errors
    ColumnNotFound,
    EmptyVariable,
}

impl ErrorCode {
    /// Returns the category this code belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ErrorCode::ColumnNotFound | ErrorCode::EmptyVariable => ErrorCategory::Data,
            _ => ErrorCategory::Configuration,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::InsufficientSelection => "INSUFFICIENT_SELECTION",
            ErrorCode::MissingSelection => "MISSING_SELECTION",
            ErrorCode::MissingWeight => "MISSING_WEIGHT",
            ErrorCode::UnknownCriterion => "UNKNOWN_CRITERION",
            ErrorCode::WeightsNotNormalized => "WEIGHTS_NOT_NORMALIZED",
            ErrorCode::ColumnNotFound => "COLUMN_NOT_FOUND",
            ErrorCode::EmptyVariable => "EMPTY_VARIABLE",
        };
        write!(f, "{}", s)
    }
}

/// Failure of a single analysis invocation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("At least {required} {field} must be selected, got {actual}")]
    InsufficientSelection {
        field: String,
        required: usize,
        actual: usize,
    },

    #[error("No {field} selected")]
    MissingSelection { field: String },

    #[error("No weight assigned to criterion '{criterion}'")]
    MissingWeight { criterion: String },

    #[error("Criterion '{criterion}' is not part of the weight set")]
    UnknownCriterion { criterion: String },

    #[error("Weights must sum to 1, got {sum}")]
    WeightsNotNormalized { sum: f64 },

    #[error("Column '{column}' not found in dataset")]
    ColumnNotFound { column: String },

    #[error("Column '{column}' contains no numeric data")]
    EmptyVariable { column: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl AnalysisError {
    /// Creates a selection error for fewer than `required` items.
    pub fn insufficient(field: impl Into<String>, required: usize, actual: usize) -> Self {
        AnalysisError::InsufficientSelection {
            field: field.into(),
            required,
            actual,
        }
    }

    /// Creates a missing selection error.
    pub fn missing_selection(field: impl Into<String>) -> Self {
        AnalysisError::MissingSelection { field: field.into() }
    }

    /// Creates a column not found error.
    pub fn column_not_found(column: impl Into<String>) -> Self {
        AnalysisError::ColumnNotFound {
            column: column.into(),
        }
    }

    /// Creates an empty variable error.
    pub fn empty_variable(column: impl Into<String>) -> Self {
        AnalysisError::EmptyVariable {
            column: column.into(),
        }
    }

    /// Returns the error code for this failure.
    pub fn code(&self) -> ErrorCode {
        match self {
            AnalysisError::InsufficientSelection { .. } => ErrorCode::InsufficientSelection,
            AnalysisError::MissingSelection { .. } => ErrorCode::MissingSelection,
            AnalysisError::MissingWeight { .. } => ErrorCode::MissingWeight,
            AnalysisError::UnknownCriterion { .. } => ErrorCode::UnknownCriterion,
            AnalysisError::WeightsNotNormalized { .. } => ErrorCode::WeightsNotNormalized,
            AnalysisError::ColumnNotFound { .. } => ErrorCode::ColumnNotFound,
            AnalysisError::EmptyVariable { .. } => ErrorCode::EmptyVariable,
            AnalysisError::Validation(_) => ErrorCode::ValidationFailed,
        }
    }

    /// Returns the category of this failure.
    pub fn category(&self) -> ErrorCategory {
        self.code().category()
    }

    /// Returns the offending column for data errors.
    pub fn column(&self) -> Option<&str> {
        match self {
            AnalysisError::ColumnNotFound { column } | AnalysisError::EmptyVariable { column } => {
                Some(column)
            }
            _ => None,
        }
    }
}
