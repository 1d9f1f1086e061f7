//! Descriptive statistics over the scores for one vendor/criterion pair

use crate::Score;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse disagreement label among evaluators
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceTier {
    Low,
    Medium,
    High,
}

impl fmt::Display for VarianceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarianceTier::Low => write!(f, "low"),
            VarianceTier::Medium => write!(f, "medium"),
            VarianceTier::High => write!(f, "high"),
        }
    }
}

/// Upper bounds (inclusive) of the low and medium tiers
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VarianceThresholds {
    pub low_max: f64,
    pub medium_max: f64,
}

impl Default for VarianceThresholds {
    fn default() -> Self {
        Self {
            low_max: 0.5,
            medium_max: 2.0,
        }
    }
}

impl VarianceThresholds {
    pub fn classify(&self, variance: f64) -> VarianceTier {
        if variance <= self.low_max {
            VarianceTier::Low
        } else if variance <= self.medium_max {
            VarianceTier::Medium
        } else {
            VarianceTier::High
        }
    }
}

/// Statistics for a pair that has at least one score.
///
/// `variance` is the range `max - min`, not the statistical variance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreComparison {
    pub scores: Vec<Score>,
    pub count: usize,
    pub average: f64,
    pub min: u8,
    pub max: u8,
    pub variance: f64,
    pub tier: VarianceTier,
}

/// Result of comparing the scores of a pair
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Comparison {
    /// Nobody has scored the pair yet. Not comparable, not an error.
    NoScores,
    Scored(ScoreComparison),
}

impl Comparison {
    pub fn scored(&self) -> Option<&ScoreComparison> {
        match self {
            Comparison::NoScores => None,
            Comparison::Scored(c) => Some(c),
        }
    }

    pub fn scores(&self) -> &[Score] {
        self.scored().map_or(&[], |c| c.scores.as_slice())
    }

    pub fn count(&self) -> usize {
        self.scored().map_or(0, |c| c.count)
    }

    pub fn is_comparable(&self) -> bool {
        matches!(self, Comparison::Scored(_))
    }
}
