//! Domain layer containing analysis logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (dataset, weights, grades, errors)
//! - `analysis` - Pure domain services (statistics, correlation, ranking,
//!   forecasting, weight sensitivity)

pub mod analysis;
pub mod foundation;
