//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, error types and small helpers that form the
//! vocabulary of the analytical engine.

mod candidates;
mod dataset;
mod errors;
mod grade;
mod weight;

pub use candidates::CandidateGrid;
pub use dataset::{CellValue, Dataset, DatasetBuilder, NumericSeries};
pub use errors::{AnalysisError, ErrorCategory, ErrorCode, ValidationError};
pub use grade::LetterGrade;
pub use weight::{CriterionWeight, WeightMap, WEIGHT_SUM_TOLERANCE};

pub(crate) use weight::proportional_shares;
