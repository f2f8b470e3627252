//! Criterion weights and the weight simplex.

use serde::{Deserialize, Serialize};

use super::{AnalysisError, ValidationError};

/// Tolerance used when checking that weights sum to 1.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-3;

/// A weight in [0, 1] assigned to one criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionWeight {
    pub criterion: String,
    pub weight: f64,
}

impl CriterionWeight {
    /// Creates a weight, returning error if it falls outside [0, 1].
    pub fn try_new(criterion: impl Into<String>, weight: f64) -> Result<Self, ValidationError> {
        let criterion = criterion.into();
        if criterion.trim().is_empty() {
            return Err(ValidationError::empty_field("criterion"));
        }
        if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
            return Err(ValidationError::out_of_range(
                format!("weight of '{}'", criterion),
                0.0,
                1.0,
                weight,
            ));
        }
        Ok(Self { criterion, weight })
    }
}

/// Ordered set of criterion weights.
///
/// Construction only validates each weight individually. Whether the set sums
/// to 1 is checked by [`WeightMap::ensure_normalized`]; nothing rescales
/// weights implicitly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CriterionWeight>", into = "Vec<CriterionWeight>")]
pub struct WeightMap {
    entries: Vec<CriterionWeight>,
}

impl TryFrom<Vec<CriterionWeight>> for WeightMap {
    type Error = ValidationError;

    fn try_from(entries: Vec<CriterionWeight>) -> Result<Self, Self::Error> {
        WeightMap::try_from_pairs(entries.into_iter().map(|e| (e.criterion, e.weight)))
    }
}

impl From<WeightMap> for Vec<CriterionWeight> {
    fn from(map: WeightMap) -> Self {
        map.entries
    }
}

impl WeightMap {
    /// Builds a map from (criterion, weight) pairs.
    ///
    /// Rejects weights outside [0, 1] and repeated criteria.
    pub fn try_from_pairs<S, I>(pairs: I) -> Result<Self, ValidationError>
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, f64)>,
    {
        let mut entries: Vec<CriterionWeight> = Vec::new();
        for (criterion, weight) in pairs {
            let entry = CriterionWeight::try_new(criterion, weight)?;
            if entries.iter().any(|e| e.criterion == entry.criterion) {
                return Err(ValidationError::invalid_format(
                    "weights",
                    format!("criterion '{}' appears more than once", entry.criterion),
                ));
            }
            entries.push(entry);
        }
        Ok(Self { entries })
    }

    /// Uniform weights over the given criteria.
    pub fn equal(criteria: &[impl AsRef<str>]) -> Self {
        let share = if criteria.is_empty() {
            0.0
        } else {
            1.0 / criteria.len() as f64
        };
        Self {
            entries: criteria
                .iter()
                .map(|c| CriterionWeight {
                    criterion: c.as_ref().to_string(),
                    weight: share,
                })
                .collect(),
        }
    }

    /// Returns the entries in order.
    pub fn entries(&self) -> &[CriterionWeight] {
        &self.entries
    }

    /// Returns the criterion names in order.
    pub fn criteria(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.criterion.as_str()).collect()
    }

    /// Returns the number of criteria.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no criteria are weighted.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up the weight of a criterion.
    pub fn get(&self, criterion: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|e| e.criterion == criterion)
            .map(|e| e.weight)
    }

    /// Returns true if the criterion is weighted.
    pub fn contains(&self, criterion: &str) -> bool {
        self.get(criterion).is_some()
    }

    /// Sum of all weights.
    pub fn sum(&self) -> f64 {
        self.entries.iter().map(|e| e.weight).sum()
    }

    /// Returns true if the weights sum to 1 within [`WEIGHT_SUM_TOLERANCE`].
    pub fn is_normalized(&self) -> bool {
        (self.sum() - 1.0).abs() <= WEIGHT_SUM_TOLERANCE
    }

    /// Fails with `WeightsNotNormalized` unless the weights sum to 1.
    pub fn ensure_normalized(&self) -> Result<(), AnalysisError> {
        if self.is_normalized() {
            Ok(())
        } else {
            Err(AnalysisError::WeightsNotNormalized { sum: self.sum() })
        }
    }

    /// Returns the weight for `criterion` or a `MissingWeight` error.
    pub fn require(&self, criterion: &str) -> Result<f64, AnalysisError> {
        self.get(criterion).ok_or_else(|| AnalysisError::MissingWeight {
            criterion: criterion.to_string(),
        })
    }

    /// Rescales the weights so they sum to 1.
    ///
    /// A map whose weights total 0 becomes uniform.
    pub fn normalized(&self) -> WeightMap {
        let total = self.sum();
        if total <= 0.0 {
            return WeightMap::equal(&self.criteria());
        }
        Self {
            entries: self
                .entries
                .iter()
                .map(|e| CriterionWeight {
                    criterion: e.criterion.clone(),
                    weight: e.weight / total,
                })
                .collect(),
        }
    }

    /// Pins `criterion` to `weight` and spreads `1 - weight` across the other
    /// criteria in proportion to their current weights.
    ///
    /// When the other criteria currently total 0 the remainder is split
    /// equally among them.
    ///
    /// # Errors
    /// - `UnknownCriterion` if `criterion` is not part of the map
    /// - `Validation` if `weight` is outside [0, 1]
    pub fn with_adjusted(&self, criterion: &str, weight: f64) -> Result<WeightMap, AnalysisError> {
        if !self.contains(criterion) {
            return Err(AnalysisError::UnknownCriterion {
                criterion: criterion.to_string(),
            });
        }
        let pinned = CriterionWeight::try_new(criterion, weight)?;

        let others: Vec<&CriterionWeight> = self
            .entries
            .iter()
            .filter(|e| e.criterion != criterion)
            .collect();
        let shares = proportional_shares(
            &others.iter().map(|e| e.weight).collect::<Vec<_>>(),
            1.0 - pinned.weight,
        );

        let mut shares = shares.into_iter();
        let entries = self
            .entries
            .iter()
            .map(|e| {
                let weight = if e.criterion == criterion {
                    pinned.weight
                } else {
                    shares.next().unwrap_or(0.0)
                };
                CriterionWeight {
                    criterion: e.criterion.clone(),
                    weight,
                }
            })
            .collect();

        Ok(Self { entries })
    }
}

/// Splits `total` across slots in proportion to `weights`.
///
/// Falls back to an equal split when the weights total 0.
pub(crate) fn proportional_shares(weights: &[f64], total: f64) -> Vec<f64> {
    if weights.is_empty() {
        return Vec::new();
    }
    let sum: f64 = weights.iter().sum();
    if sum <= 0.0 {
        let share = total / weights.len() as f64;
        return vec![share; weights.len()];
    }
    weights.iter().map(|w| total * w / sum).collect()
}
