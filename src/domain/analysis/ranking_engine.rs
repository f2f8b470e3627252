//! Decision Ranking Engine - Weighted multi-criteria ranking of alternatives.
//!
//! Two scoring strategies share one shell: each criterion column is scored
//! per alternative on [0, 1], the overall score is the weighted sum of those
//! scores, and alternatives are ordered by overall score (stable on ties).
//!
//! Rank change is reported against a baseline ranking built from the
//! weighted sum of the raw, untransformed criterion values.

use serde::{Deserialize, Serialize};

use super::statistics_engine::scale_by_max_abs;
use super::CriteriaMatrix;
use crate::domain::foundation::{AnalysisError, Dataset, WeightMap};

/// Selects the per-criterion scoring strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingMethod {
    #[default]
    Topsis,
    Euclidean,
}

impl RankingMethod {
    /// Returns the scorer implementing this method.
    pub fn scorer(&self) -> &'static dyn CriterionScorer {
        match self {
            RankingMethod::Topsis => &TopsisScorer,
            RankingMethod::Euclidean => &EuclideanScorer,
        }
    }

    /// Returns the display label for this method.
    pub fn label(&self) -> &'static str {
        match self {
            RankingMethod::Topsis => "TOPSIS",
            RankingMethod::Euclidean => "Euclidean distance",
        }
    }
}

/// Scores one criterion column, one value per alternative.
pub trait CriterionScorer: Sync {
    /// Maps raw values to per-alternative scores in [0, 1].
    fn score_column(&self, values: &[f64]) -> Vec<f64>;

    /// Whether this strategy reports a weighted distance to the ideal point.
    fn reports_distance(&self) -> bool {
        false
    }
}

/// TOPSIS closeness per criterion.
///
/// Values are divided by the column's Euclidean norm; the score is the
/// distance to the column minimum over the sum of distances to the minimum
/// and the maximum.
#[derive(Debug, Clone, Copy, Default)]
pub struct TopsisScorer;

impl CriterionScorer for TopsisScorer {
    fn score_column(&self, values: &[f64]) -> Vec<f64> {
        let values = scale_by_max_abs(values);
        let norm = values.iter().map(|v| v * v).sum::<f64>().sqrt();
        let normalized: Vec<f64> = if norm == 0.0 {
            vec![0.0; values.len()]
        } else {
            values.iter().map(|v| v / norm).collect()
        };

        let ideal = normalized.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let anti_ideal = normalized.iter().copied().fold(f64::INFINITY, f64::min);

        normalized
            .iter()
            .map(|&v| {
                let to_ideal = (v - ideal).abs();
                let to_anti_ideal = (v - anti_ideal).abs();
                let total = to_ideal + to_anti_ideal;
                if total == 0.0 {
                    to_anti_ideal
                } else {
                    to_anti_ideal / total
                }
            })
            .collect()
    }
}

/// Closeness to a fixed ideal of 1 after min-max normalization.
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanScorer;

/// Normalized value given to every alternative of a constant column.
pub const CONSTANT_COLUMN_SCORE: f64 = 0.5;

impl CriterionScorer for EuclideanScorer {
    fn score_column(&self, values: &[f64]) -> Vec<f64> {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        // Halved so the range of any finite column stays finite.
        let half_range = max / 2.0 - min / 2.0;

        values
            .iter()
            .map(|&v| {
                let normalized = if max == min {
                    CONSTANT_COLUMN_SCORE
                } else {
                    (v / 2.0 - min / 2.0) / half_range
                };
                1.0 - (normalized - 1.0).abs()
            })
            .collect()
    }

    fn reports_distance(&self) -> bool {
        true
    }
}

/// Score of one alternative on one criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub criterion: String,
    pub score: f64,
}

/// One ranked alternative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierScore {
    pub alternative: String,
    /// Weighted sum of the criterion scores.
    pub score: f64,
    pub criterion_scores: Vec<CriterionScore>,
    /// Weighted distance to the ideal point, for methods that report one.
    pub distance: Option<f64>,
    /// 1-based rank in the raw weighted-sum baseline.
    pub original_rank: usize,
    /// 1-based rank by `score`.
    pub rank: usize,
    /// `original_rank - rank`; positive means the alternative moved up.
    pub rank_change: i64,
}

/// Outcome of a ranking run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingResult {
    pub method: RankingMethod,
    pub weights: WeightMap,
    /// Alternatives ordered best first.
    pub scores: Vec<SupplierScore>,
}

impl RankingResult {
    /// Returns the best-ranked alternative.
    pub fn top(&self) -> Option<&SupplierScore> {
        self.scores.first()
    }

    /// Looks up an alternative's result.
    pub fn find(&self, alternative: &str) -> Option<&SupplierScore> {
        self.scores.iter().find(|s| s.alternative == alternative)
    }
}

/// Weighted multi-criteria ranking.
pub struct DecisionRankingEngine;

impl DecisionRankingEngine {
    /// Ranks the alternatives of `identifier_column` on the weighted criteria.
    ///
    /// Criteria are the entries of `weights`, in order. A criterion cell
    /// that is blank or not a number is scored as 0 for that alternative.
    ///
    /// # Errors
    /// - `MissingSelection` if no criteria are weighted
    /// - `WeightsNotNormalized` unless the weights sum to 1 (within 1e-3)
    /// - `ColumnNotFound` / `EmptyVariable` naming the offending column
    pub fn rank(
        dataset: &Dataset,
        identifier_column: &str,
        weights: &WeightMap,
        method: RankingMethod,
    ) -> Result<RankingResult, AnalysisError> {
        Self::validate_weights(weights)?;
        let matrix = CriteriaMatrix::from_dataset(dataset, identifier_column, &weights.criteria())?;
        Self::rank_matrix(&matrix, weights, method)
    }

    /// Ranks an already extracted matrix.
    ///
    /// # Errors
    /// - `MissingSelection` / `WeightsNotNormalized` as for [`Self::rank`]
    /// - `MissingWeight` if a matrix criterion has no weight
    pub fn rank_matrix(
        matrix: &CriteriaMatrix,
        weights: &WeightMap,
        method: RankingMethod,
    ) -> Result<RankingResult, AnalysisError> {
        Self::validate_weights(weights)?;
        let column_weights = matrix
            .criteria
            .iter()
            .map(|c| weights.require(c))
            .collect::<Result<Vec<_>, _>>()?;

        let scorer = method.scorer();
        let columns: Vec<Vec<f64>> = (0..matrix.criterion_count())
            .map(|k| scorer.score_column(&matrix.column(k)))
            .collect();

        let count = matrix.alternative_count();
        let mut overall = vec![0.0; count];
        let mut distances = vec![0.0; count];
        for (column, &weight) in columns.iter().zip(&column_weights) {
            for (i, &score) in column.iter().enumerate() {
                overall[i] += weight * score;
                distances[i] += weight * (1.0 - score);
            }
        }

        let baseline_ranks = ranks_descending(&matrix.weighted_sums(weights));
        let ranks = ranks_descending(&overall);

        let mut scores: Vec<SupplierScore> = (0..count)
            .map(|i| SupplierScore {
                alternative: matrix.alternatives[i].clone(),
                score: overall[i],
                criterion_scores: matrix
                    .criteria
                    .iter()
                    .zip(&columns)
                    .map(|(criterion, column)| CriterionScore {
                        criterion: criterion.clone(),
                        score: column[i],
                    })
                    .collect(),
                distance: scorer.reports_distance().then_some(distances[i]),
                original_rank: baseline_ranks[i],
                rank: ranks[i],
                rank_change: baseline_ranks[i] as i64 - ranks[i] as i64,
            })
            .collect();
        scores.sort_by_key(|s| s.rank);

        Ok(RankingResult {
            method,
            weights: weights.clone(),
            scores,
        })
    }

    fn validate_weights(weights: &WeightMap) -> Result<(), AnalysisError> {
        if weights.is_empty() {
            return Err(AnalysisError::missing_selection("criteria"));
        }
        weights.ensure_normalized()
    }
}

/// 1-based ranks by descending value; equal values keep input order.
pub(crate) fn ranks_descending(values: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));

    let mut ranks = vec![0; values.len()];
    for (position, &index) in order.iter().enumerate() {
        ranks[index] = position + 1;
    }
    ranks
}
