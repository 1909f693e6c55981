//! Shared mass-table and tail-probability helpers.

use statrs::distribution::{Binomial, Discrete, DiscreteCDF, Poisson};

use crate::models::MassPoint;

/// A distribution over non-negative counts.
pub(crate) trait CountDistribution {
    /// P(X = k)
    fn pmf(&self, k: u64) -> f64;
    /// P(X <= k)
    fn cdf(&self, k: u64) -> f64;
}

impl CountDistribution for Binomial {
    fn pmf(&self, k: u64) -> f64 {
        Discrete::pmf(self, k)
    }

    fn cdf(&self, k: u64) -> f64 {
        DiscreteCDF::cdf(self, k)
    }
}

impl CountDistribution for Poisson {
    fn pmf(&self, k: u64) -> f64 {
        Discrete::pmf(self, k)
    }

    fn cdf(&self, k: u64) -> f64 {
        DiscreteCDF::cdf(self, k)
    }
}

/// All mass at zero. Stands in for Poisson(0), which statrs rejects.
pub(crate) struct PointMassAtZero;

impl CountDistribution for PointMassAtZero {
    fn pmf(&self, k: u64) -> f64 {
        if k == 0 {
            1.0
        } else {
            0.0
        }
    }

    fn cdf(&self, _k: u64) -> f64 {
        1.0
    }
}

/// P(X >= target) = 1 - CDF(target - 1).
///
/// `target == 0` is certain and returns exactly 1.0 without touching the CDF.
pub(crate) fn tail_probability<D: CountDistribution + ?Sized>(dist: &D, target: u32) -> f64 {
    if target == 0 {
        return 1.0;
    }
    (1.0 - dist.cdf(u64::from(target) - 1)).clamp(0.0, 1.0)
}

/// Mass table for outcomes `0..=max_outcome`, highlighting `outcome >= target`.
pub(crate) fn mass_table<D: CountDistribution + ?Sized>(
    dist: &D,
    max_outcome: u32,
    target: u32,
) -> Vec<MassPoint> {
    (0..=max_outcome)
        .map(|outcome| MassPoint {
            outcome,
            probability: dist.pmf(u64::from(outcome)),
            highlighted: outcome >= target,
        })
        .collect()
}
