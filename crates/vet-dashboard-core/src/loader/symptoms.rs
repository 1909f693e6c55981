//! Respiratory symptom flags.
//!
//! The clinic sheet has no respiratory column yet, so the dashboard draws a
//! placeholder flag per visit. These values carry no clinical signal; any
//! sheet that includes a real symptom column replaces them.

use rand::distributions::{Bernoulli, Distribution};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::{LoadError, LoadResult};

/// Where the respiratory flags of a loaded dataset came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SymptomOrigin {
    /// Read from the sheet's own symptom column
    Column,
    /// Drawn by [`SyntheticSymptoms`]
    Synthetic,
}

/// Seeded Bernoulli draw of placeholder symptom flags.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticSymptoms {
    seed: u64,
    probability: f64,
}

impl SyntheticSymptoms {
    /// Create a source drawing `true` with the given probability.
    pub fn new(seed: u64, probability: f64) -> LoadResult<Self> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(LoadError::InvalidOption(format!(
                "symptom probability {} is outside [0, 1]",
                probability
            )));
        }
        Ok(Self { seed, probability })
    }

    /// Draw one flag per row. The same seed always yields the same flags.
    pub fn draw(&self, rows: usize) -> Vec<bool> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        // Range was checked in `new`.
        match Bernoulli::new(self.probability) {
            Ok(dist) => (0..rows).map(|_| dist.sample(&mut rng)).collect(),
            Err(_) => vec![false; rows],
        }
    }
}

impl Default for SyntheticSymptoms {
    fn default() -> Self {
        Self {
            seed: 42,
            probability: 0.3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_is_deterministic() {
        let source = SyntheticSymptoms::default();
        assert_eq!(source.draw(50), source.draw(50));
        assert_eq!(source.draw(50).len(), 50);
    }

    #[test]
    fn test_draw_extremes() {
        let never = SyntheticSymptoms::new(7, 0.0).unwrap();
        assert!(never.draw(100).iter().all(|f| !f));

        let always = SyntheticSymptoms::new(7, 1.0).unwrap();
        assert!(always.draw(100).iter().all(|f| *f));
    }

    #[test]
    fn test_draw_rate_is_plausible() {
        let source = SyntheticSymptoms::new(42, 0.3).unwrap();
        let hits = source.draw(10_000).iter().filter(|f| **f).count();
        assert!((2_500..3_500).contains(&hits), "hits = {}", hits);
    }

    #[test]
    fn test_rejects_bad_probability() {
        assert!(SyntheticSymptoms::new(1, 1.5).is_err());
        assert!(SyntheticSymptoms::new(1, -0.1).is_err());
        assert!(SyntheticSymptoms::new(1, f64::NAN).is_err());
    }
}
