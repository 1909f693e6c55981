//! Binomial panel: probability of at least `k` certificates among `n` patients.

use statrs::distribution::Binomial;
use tracing::debug;

use crate::models::{AnalysisKind, Dataset, DistributionResult};

use super::tail::{mass_table, tail_probability};
use super::{AnalysisError, AnalysisResult, DistributionEngine};

/// Smallest accepted number of simulated patients.
pub const MIN_TRIALS: u32 = 5;

/// Largest accepted number of simulated patients.
pub const MAX_TRIALS: u32 = 50;

/// Share of all visits with a certificate issued.
///
/// Visits with an unknown certificate flag count in the denominator.
pub fn certificate_rate(dataset: &Dataset) -> AnalysisResult<f64> {
    if dataset.is_empty() {
        return Err(AnalysisError::InsufficientData(
            "no visits to estimate a certificate rate from".into(),
        ));
    }
    let issued = dataset.iter().filter(|r| r.has_certificate()).count();
    Ok(issued as f64 / dataset.len() as f64)
}

impl<'a> DistributionEngine<'a> {
    /// P(at least `target_count` certificates in `trials` visits).
    pub fn binomial_analysis(
        &self,
        trials: u32,
        target_count: u32,
    ) -> AnalysisResult<DistributionResult> {
        if !(MIN_TRIALS..=MAX_TRIALS).contains(&trials) {
            return Err(AnalysisError::InvalidParameter(format!(
                "number of patients must be between {} and {}, got {}",
                MIN_TRIALS, MAX_TRIALS, trials
            )));
        }
        if target_count > trials {
            return Err(AnalysisError::InvalidParameter(format!(
                "desired certificates ({}) cannot exceed the number of patients ({})",
                target_count, trials
            )));
        }

        let p = certificate_rate(self.dataset)?;
        debug!(p, trials, target_count, "Binomial analysis");

        let dist = Binomial::new(p, u64::from(trials))
            .map_err(|e| AnalysisError::InvalidParameter(e.to_string()))?;

        Ok(DistributionResult {
            kind: AnalysisKind::Binomial,
            target_count,
            probability_mass: mass_table(&dist, trials, target_count),
            tail_probability: tail_probability(&dist, target_count),
            empirical_rate: p,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VisitRecord;

    fn make_dataset(issued: usize, total: usize) -> Dataset {
        let records = (0..total)
            .map(|i| {
                let mut r = VisitRecord::new(format!("pet-{}", i));
                r.certificate_issued = Some(i < issued);
                r
            })
            .collect();
        Dataset::new(records)
    }

    #[test]
    fn test_certificate_rate() {
        assert_eq!(certificate_rate(&make_dataset(3, 10)).unwrap(), 0.3);
        assert_eq!(certificate_rate(&make_dataset(0, 4)).unwrap(), 0.0);
        assert!(matches!(
            certificate_rate(&Dataset::default()),
            Err(AnalysisError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_unknown_flags_count_as_visits() {
        let mut records = make_dataset(1, 2).records().to_vec();
        records.push(VisitRecord::new("unknown"));
        let dataset = Dataset::new(records);

        assert!((certificate_rate(&dataset).unwrap() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_reference_scenario() {
        let dataset = make_dataset(3, 10);
        let engine = DistributionEngine::new(&dataset);
        let result = engine.binomial_analysis(10, 5).unwrap();

        assert_eq!(result.empirical_rate, 0.3);
        assert_eq!(result.probability_mass.len(), 11);
        assert!((result.tail_probability - 0.150268).abs() < 1e-3);
        assert!((result.total_mass() - 1.0).abs() < 1e-9);
        assert!((result.highlighted_mass() - result.tail_probability).abs() < 1e-9);
    }

    #[test]
    fn test_highlight_boundary() {
        let dataset = make_dataset(3, 10);
        let engine = DistributionEngine::new(&dataset);
        let result = engine.binomial_analysis(8, 3).unwrap();

        assert!(!result.probability_mass[2].highlighted);
        assert!(result.probability_mass[3].highlighted);
        assert!(result.probability_mass[8].highlighted);
    }

    #[test]
    fn test_zero_target_is_certain() {
        let dataset = make_dataset(3, 10);
        let engine = DistributionEngine::new(&dataset);
        assert_eq!(engine.binomial_analysis(20, 0).unwrap().tail_probability, 1.0);
    }

    #[test]
    fn test_target_exceeding_trials() {
        let dataset = make_dataset(3, 10);
        let engine = DistributionEngine::new(&dataset);

        assert!(matches!(
            engine.binomial_analysis(5, 6),
            Err(AnalysisError::InvalidParameter(_))
        ));
        assert!(engine.binomial_analysis(5, 5).is_ok());
    }

    #[test]
    fn test_trials_out_of_range() {
        let dataset = make_dataset(3, 10);
        let engine = DistributionEngine::new(&dataset);

        assert!(matches!(
            engine.binomial_analysis(4, 1),
            Err(AnalysisError::InvalidParameter(_))
        ));
        assert!(matches!(
            engine.binomial_analysis(51, 1),
            Err(AnalysisError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_degenerate_rates() {
        let none = make_dataset(0, 10);
        let result = DistributionEngine::new(&none).binomial_analysis(10, 1).unwrap();
        assert!(result.tail_probability.abs() < 1e-12);
        assert!((result.probability_mass[0].probability - 1.0).abs() < 1e-12);

        let all = make_dataset(10, 10);
        let result = DistributionEngine::new(&all).binomial_analysis(10, 10).unwrap();
        assert!((result.tail_probability - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_dataset() {
        let dataset = Dataset::default();
        assert!(matches!(
            DistributionEngine::new(&dataset).binomial_analysis(10, 5),
            Err(AnalysisError::InsufficientData(_))
        ));
    }
}
