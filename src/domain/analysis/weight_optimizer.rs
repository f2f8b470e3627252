//! Weight Sensitivity Optimizer - Closed-form reallocation of the weight
//! simplex toward one target criterion.
//!
//! This is a fixed rule, not a search: the target weight is doubled
//! (maximize) or halved (minimize), kept within [0.1, 0.9], and the rest of
//! the unit budget is shared by the other criteria in proportion to their
//! original weights.

use serde::{Deserialize, Serialize};

use super::ranking_engine::ranks_descending;
use super::CriteriaMatrix;
use crate::domain::foundation::{proportional_shares, AnalysisError, CriterionWeight, WeightMap};

/// Lowest weight the target criterion can be given.
pub const TARGET_WEIGHT_FLOOR: f64 = 0.1;

/// Highest weight the target criterion can be given.
pub const TARGET_WEIGHT_CEILING: f64 = 0.9;

/// Direction in which to move the target criterion's weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationGoal {
    Maximize,
    Minimize,
}

/// Weight change for one criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightAdjustment {
    pub criterion: String,
    pub old_weight: f64,
    pub new_weight: f64,
    /// |new_weight - old_weight|
    pub change: f64,
}

/// Score and rank of one alternative before and after reweighting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreShift {
    pub alternative: String,
    pub old_score: f64,
    pub new_score: f64,
    pub old_rank: usize,
    pub new_rank: usize,
}

/// Outcome of a sensitivity run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityResult {
    pub target: String,
    pub goal: OptimizationGoal,
    pub original: WeightMap,
    pub adjusted: WeightMap,
    /// One entry per criterion, in weight-map order.
    pub adjustments: Vec<WeightAdjustment>,
}

impl SensitivityResult {
    /// Recomputes alternative scores as plain weighted sums of the raw
    /// values, before and after reweighting. Ordered by new rank.
    pub fn rescore(&self, matrix: &CriteriaMatrix) -> Vec<ScoreShift> {
        let old_scores = matrix.weighted_sums(&self.original);
        let new_scores = matrix.weighted_sums(&self.adjusted);
        let old_ranks = ranks_descending(&old_scores);
        let new_ranks = ranks_descending(&new_scores);

        let mut shifts: Vec<ScoreShift> = matrix
            .alternatives
            .iter()
            .enumerate()
            .map(|(i, alternative)| ScoreShift {
                alternative: alternative.clone(),
                old_score: old_scores[i],
                new_score: new_scores[i],
                old_rank: old_ranks[i],
                new_rank: new_ranks[i],
            })
            .collect();
        shifts.sort_by_key(|s| s.new_rank);
        shifts
    }

    /// Returns the adjustment for a criterion.
    pub fn adjustment(&self, criterion: &str) -> Option<&WeightAdjustment> {
        self.adjustments.iter().find(|a| a.criterion == criterion)
    }
}

/// Doubling/halving weight sensitivity rule.
pub struct WeightSensitivityOptimizer;

impl WeightSensitivityOptimizer {
    /// New weight for the target criterion.
    ///
    /// Maximize doubles the weight and caps it at 0.9; minimize halves it and
    /// floors it at 0.1. The result is always within [0.1, 0.9].
    pub fn target_weight(current: f64, goal: OptimizationGoal) -> f64 {
        let proposed = match goal {
            OptimizationGoal::Maximize => (current * 2.0).min(TARGET_WEIGHT_CEILING),
            OptimizationGoal::Minimize => (current / 2.0).max(TARGET_WEIGHT_FLOOR),
        };
        proposed.clamp(TARGET_WEIGHT_FLOOR, TARGET_WEIGHT_CEILING)
    }

    /// Reallocates `weights` toward `goal` on `target`.
    ///
    /// # Errors
    /// - `MissingSelection` if `target` is blank
    /// - `InsufficientSelection` with fewer than 2 criteria
    /// - `UnknownCriterion` if `target` is not weighted
    /// - `WeightsNotNormalized` unless the weights sum to 1
    pub fn optimize(
        weights: &WeightMap,
        target: &str,
        goal: OptimizationGoal,
    ) -> Result<SensitivityResult, AnalysisError> {
        if target.trim().is_empty() {
            return Err(AnalysisError::missing_selection("target criterion"));
        }
        if weights.len() < 2 {
            return Err(AnalysisError::insufficient("criteria", 2, weights.len()));
        }
        let current = weights.get(target).ok_or_else(|| AnalysisError::UnknownCriterion {
            criterion: target.to_string(),
        })?;
        weights.ensure_normalized()?;

        let target_weight = Self::target_weight(current, goal);

        let others: Vec<f64> = weights
            .entries()
            .iter()
            .filter(|e| e.criterion != target)
            .map(|e| e.weight)
            .collect();
        let mut shares = proportional_shares(&others, 1.0 - target_weight).into_iter();

        let mut adjusted = Vec::with_capacity(weights.len());
        let mut adjustments = Vec::with_capacity(weights.len());
        for entry in weights.entries() {
            let new_weight = if entry.criterion == target {
                target_weight
            } else {
                shares.next().unwrap_or(0.0)
            };
            adjustments.push(WeightAdjustment {
                criterion: entry.criterion.clone(),
                old_weight: entry.weight,
                new_weight,
                change: (new_weight - entry.weight).abs(),
            });
            adjusted.push(CriterionWeight {
                criterion: entry.criterion.clone(),
                weight: new_weight,
            });
        }

        Ok(SensitivityResult {
            target: target.to_string(),
            goal,
            original: weights.clone(),
            adjusted: WeightMap::try_from(adjusted)?,
            adjustments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn weights(pairs: &[(&str, f64)]) -> WeightMap {
        WeightMap::try_from_pairs(pairs.iter().map(|(c, w)| (*c, *w))).unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn maximize_doubles_target_and_shares_remainder_proportionally() {
        let result = WeightSensitivityOptimizer::optimize(
            &weights(&[("Cost", 0.5), ("Quality", 0.3), ("Speed", 0.2)]),
            "Quality",
            OptimizationGoal::Maximize,
        )
        .unwrap();

        assert!(approx(result.adjusted.get("Quality").unwrap(), 0.6));
        assert!(approx(result.adjusted.get("Cost").unwrap(), 0.4 * 5.0 / 7.0));
        assert!(approx(result.adjusted.get("Speed").unwrap(), 0.4 * 2.0 / 7.0));
        assert!((result.adjusted.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn target_weight_rule_is_pinned() {
        use OptimizationGoal::*;
        assert!(approx(WeightSensitivityOptimizer::target_weight(0.3, Maximize), 0.6));
        assert_eq!(WeightSensitivityOptimizer::target_weight(0.6, Maximize), 0.9);
        assert_eq!(WeightSensitivityOptimizer::target_weight(0.02, Maximize), 0.1);
        assert!(approx(WeightSensitivityOptimizer::target_weight(0.3, Minimize), 0.15));
        assert_eq!(WeightSensitivityOptimizer::target_weight(0.15, Minimize), 0.1);
        assert!(approx(WeightSensitivityOptimizer::target_weight(0.95, Minimize), 0.475));
    }

    #[test]
    fn zero_weight_others_split_equally() {
        let result = WeightSensitivityOptimizer::optimize(
            &weights(&[("T", 1.0), ("A", 0.0), ("B", 0.0)]),
            "T",
            OptimizationGoal::Minimize,
        )
        .unwrap();
        assert_eq!(result.adjusted.get("T"), Some(0.5));
        assert_eq!(result.adjusted.get("A"), Some(0.25));
        assert_eq!(result.adjusted.get("B"), Some(0.25));
    }

    #[test]
    fn adjustments_report_absolute_change() {
        let result = WeightSensitivityOptimizer::optimize(
            &weights(&[("A", 0.5), ("B", 0.5)]),
            "A",
            OptimizationGoal::Minimize,
        )
        .unwrap();
        let a = result.adjustment("A").unwrap();
        let b = result.adjustment("B").unwrap();
        assert_eq!((a.old_weight, a.new_weight, a.change), (0.5, 0.25, 0.25));
        assert_eq!((b.old_weight, b.new_weight, b.change), (0.5, 0.75, 0.25));
    }

    #[test]
    fn invalid_requests_are_rejected() {
        let w = weights(&[("A", 0.5), ("B", 0.5)]);
        assert_eq!(
            WeightSensitivityOptimizer::optimize(&w, " ", OptimizationGoal::Maximize).unwrap_err(),
            AnalysisError::missing_selection("target criterion")
        );
        assert_eq!(
            WeightSensitivityOptimizer::optimize(&w, "C", OptimizationGoal::Maximize).unwrap_err(),
            AnalysisError::UnknownCriterion {
                criterion: "C".to_string()
            }
        );
        assert_eq!(
            WeightSensitivityOptimizer::optimize(&weights(&[("A", 1.0)]), "A", OptimizationGoal::Maximize)
                .unwrap_err(),
            AnalysisError::insufficient("criteria", 2, 1)
        );
        assert!(matches!(
            WeightSensitivityOptimizer::optimize(&weights(&[("A", 0.2), ("B", 0.2)]), "A", OptimizationGoal::Maximize),
            Err(AnalysisError::WeightsNotNormalized { .. })
        ));
    }

    #[test]
    fn repeated_optimization_is_identical() {
        let w = weights(&[("Cost", 0.45), ("Quality", 0.35), ("Speed", 0.2)]);
        let matrix = CriteriaMatrix::builder()
            .criteria(vec!["Cost", "Quality", "Speed"])
            .alternative("North", vec![8.0, 2.0, 5.0])
            .alternative("South", vec![3.0, 6.0, 7.0])
            .build();
        for goal in [OptimizationGoal::Maximize, OptimizationGoal::Minimize] {
            let first = WeightSensitivityOptimizer::optimize(&w, "Speed", goal).unwrap();
            let second = WeightSensitivityOptimizer::optimize(&w, "Speed", goal).unwrap();
            assert_eq!(first, second);
            assert_eq!(first.rescore(&matrix), second.rescore(&matrix));
        }
    }

    #[test]
    fn rescore_uses_raw_weighted_sums() {
        let matrix = CriteriaMatrix::builder()
            .criteria(vec!["Cost", "Quality"])
            .alternative("North", vec![8.0, 2.0])
            .alternative("South", vec![3.0, 6.0])
            .build();
        let result = WeightSensitivityOptimizer::optimize(
            &weights(&[("Cost", 0.5), ("Quality", 0.5)]),
            "Quality",
            OptimizationGoal::Maximize,
        )
        .unwrap();

        let shifts = result.rescore(&matrix);
        assert_eq!(shifts[0].alternative, "South");
        assert!(approx(shifts[0].new_score, 0.1 * 3.0 + 0.9 * 6.0));
        assert_eq!((shifts[0].old_rank, shifts[0].new_rank), (2, 1));
        assert_eq!(shifts[1].alternative, "North");
        assert!(approx(shifts[1].old_score, 5.0));
        assert_eq!((shifts[1].old_rank, shifts[1].new_rank), (1, 2));
    }

    proptest! {
        #[test]
        fn reallocation_stays_on_the_simplex(
            raw in proptest::collection::vec(0.0_f64..10.0, 2..8),
            target_index in 0usize..8,
            maximize in any::<bool>(),
        ) {
            let total: f64 = raw.iter().sum();
            prop_assume!(total > 0.0);
            let names: Vec<String> = (0..raw.len()).map(|i| format!("c{}", i)).collect();
            let map = WeightMap::try_from_pairs(
                names.iter().cloned().zip(raw.iter().map(|w| w / total)),
            ).unwrap();
            let target = &names[target_index % names.len()];
            let goal = if maximize { OptimizationGoal::Maximize } else { OptimizationGoal::Minimize };

            let result = WeightSensitivityOptimizer::optimize(&map, target, goal).unwrap();
            prop_assert!((result.adjusted.sum() - 1.0).abs() < 1e-6);
            let t = result.adjusted.get(target).unwrap();
            prop_assert!((TARGET_WEIGHT_FLOOR..=TARGET_WEIGHT_CEILING).contains(&t));
            prop_assert!(result.adjustments.iter().all(|a| a.change >= 0.0));
        }
    }
}
