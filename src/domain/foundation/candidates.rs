//! Ordered candidate grids with first-match-wins selection.

/// A fixed, ordered list of candidate values.
///
/// Both selections scan the list front to back and only replace the current
/// pick on a strict improvement, so on ties the earliest candidate wins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidateGrid {
    values: &'static [f64],
}

impl CandidateGrid {
    /// Creates a grid over the given values, scanned in the given order.
    pub const fn new(values: &'static [f64]) -> Self {
        Self { values }
    }

    /// Returns the candidates in scan order.
    pub fn values(&self) -> &'static [f64] {
        self.values
    }

    /// Returns the candidate closest to `target` by absolute difference.
    ///
    /// Returns `None` only for an empty grid.
    pub fn nearest(&self, target: f64) -> Option<f64> {
        let mut best: Option<(f64, f64)> = None;
        for &candidate in self.values {
            let distance = (candidate - target).abs();
            if best.map_or(true, |(_, best_distance)| distance < best_distance) {
                best = Some((candidate, distance));
            }
        }
        best.map(|(candidate, _)| candidate)
    }

    /// Returns the candidate maximizing `score`, with its score.
    ///
    /// Non-finite scores never win. Returns `None` if no candidate has a
    /// finite score.
    pub fn argmax_by<F>(&self, mut score: F) -> Option<(f64, f64)>
    where
        F: FnMut(f64) -> f64,
    {
        let mut best: Option<(f64, f64)> = None;
        for &candidate in self.values {
            let value = score(candidate);
            if !value.is_finite() {
                continue;
            }
            if best.map_or(true, |(_, best_value)| value > best_value) {
                best = Some((candidate, value));
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRID: CandidateGrid = CandidateGrid::new(&[-1.0, 0.0, 1.0, 2.0]);

    #[test]
    fn nearest_picks_closest_value() {
        assert_eq!(GRID.nearest(0.9), Some(1.0));
        assert_eq!(GRID.nearest(7.0), Some(2.0));
        assert_eq!(GRID.nearest(-3.0), Some(-1.0));
    }

    #[test]
    fn nearest_tie_goes_to_earlier_candidate() {
        assert_eq!(GRID.nearest(0.5), Some(0.0));
        assert_eq!(GRID.nearest(-0.5), Some(-1.0));
    }

    #[test]
    fn nearest_on_empty_grid_is_none() {
        assert_eq!(CandidateGrid::new(&[]).nearest(1.0), None);
    }

    #[test]
    fn argmax_keeps_first_of_equal_scores() {
        let (best, score) = GRID.argmax_by(|x| if x >= 1.0 { 5.0 } else { 1.0 }).unwrap();
        assert_eq!(best, 1.0);
        assert_eq!(score, 5.0);
    }

    #[test]
    fn argmax_skips_non_finite_scores() {
        let best = GRID.argmax_by(|x| if x == 0.0 { f64::INFINITY } else { -x });
        assert_eq!(best, Some((-1.0, 1.0)));
        assert_eq!(GRID.argmax_by(|_| f64::NAN), None);
    }
}
