//! Letter grade value object (A-D scale).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Letter grade derived from a 0-100 style score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LetterGrade {
    A,
    B,
    C,
    D,
}

impl LetterGrade {
    /// Grades a score: >= 85 is A, >= 70 is B, >= 50 is C, anything else D.
    pub fn from_score(score: f64) -> Self {
        if score >= 85.0 {
            LetterGrade::A
        } else if score >= 70.0 {
            LetterGrade::B
        } else if score >= 50.0 {
            LetterGrade::C
        } else {
            LetterGrade::D
        }
    }

    /// Returns true for grades C and D.
    pub fn is_at_risk(&self) -> bool {
        matches!(self, LetterGrade::C | LetterGrade::D)
    }

    /// Returns the display label.
    pub fn label(&self) -> &'static str {
        match self {
            LetterGrade::A => "A",
            LetterGrade::B => "B",
            LetterGrade::C => "C",
            LetterGrade::D => "D",
        }
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
