//! Data Sherpa - Analytical engine for tabular supplier data
//!
//! This crate provides descriptive statistics with Box-Cox normalization,
//! pairwise correlation, TOPSIS / Euclidean multi-criteria ranking,
//! exponential-smoothing forecasts with letter grades, and weight
//! sensitivity analysis over an immutable in-memory dataset.

pub mod application;
pub mod config;
pub mod domain;
pub mod telemetry;
