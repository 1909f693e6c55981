//! Distribution analysis queries and results.

use serde::{Deserialize, Serialize};

/// Which parametric distribution an analysis assumes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    /// Certificates issued among `trials` simulated patients
    Binomial,
    /// Respiratory cases per shift
    Poisson,
}

/// One interaction's worth of slider state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DistributionQuery {
    /// Distribution to use
    pub kind: AnalysisKind,
    /// Number of trials (binomial only)
    pub trials: u32,
    /// Threshold for the "at least" tail
    pub target_count: u32,
}

impl DistributionQuery {
    /// Query for the binomial panel.
    pub fn binomial(trials: u32, target_count: u32) -> Self {
        Self {
            kind: AnalysisKind::Binomial,
            trials,
            target_count,
        }
    }

    /// Query for the Poisson panel. `trials` is unused.
    pub fn poisson(target_count: u32) -> Self {
        Self {
            kind: AnalysisKind::Poisson,
            trials: 0,
            target_count,
        }
    }
}

/// Probability of a single outcome.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct MassPoint {
    /// Outcome value
    pub outcome: u32,
    /// P(X = outcome)
    pub probability: f64,
    /// Whether the outcome falls in the tail (outcome >= target)
    pub highlighted: bool,
}

/// Result of a distribution analysis. Recomputed on every query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DistributionResult {
    /// Distribution used
    pub kind: AnalysisKind,
    /// Threshold the tail was computed for
    pub target_count: u32,
    /// Mass table, ordered by outcome starting at 0
    pub probability_mass: Vec<MassPoint>,
    /// P(X >= target_count)
    pub tail_probability: f64,
    /// Success probability (binomial) or mean rate (Poisson) estimated from data
    pub empirical_rate: f64,
}

impl DistributionResult {
    /// Sum of the mass table.
    pub fn total_mass(&self) -> f64 {
        self.probability_mass.iter().map(|p| p.probability).sum()
    }

    /// Mass of the highlighted outcomes only.
    pub fn highlighted_mass(&self) -> f64 {
        self.probability_mass
            .iter()
            .filter(|p| p.highlighted)
            .map(|p| p.probability)
            .sum()
    }
}
