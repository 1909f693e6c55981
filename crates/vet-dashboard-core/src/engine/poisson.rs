//! Poisson panel: probability of at least `k` respiratory cases in one shift.

use std::collections::BTreeMap;

use statrs::distribution::Poisson;
use tracing::debug;

use crate::models::{AnalysisKind, Dataset, DistributionResult};

use super::tail::{mass_table, tail_probability, PointMassAtZero};
use super::{AnalysisError, AnalysisResult, DistributionEngine};

/// Largest outcome in the Poisson mass table (and largest accepted target).
pub const POISSON_MAX_OUTCOME: u32 = 10;

/// Respiratory cases per shift period.
///
/// Visits with no shift are left out; unknown symptom flags count as zero.
pub fn shift_case_totals(dataset: &Dataset) -> BTreeMap<&str, u32> {
    let mut totals = BTreeMap::new();
    for record in dataset {
        if let Some(shift) = record.shift.as_deref() {
            *totals.entry(shift).or_insert(0) += u32::from(record.has_respiratory_symptom());
        }
    }
    totals
}

/// Mean respiratory cases per shift period.
pub fn respiratory_rate_per_shift(dataset: &Dataset) -> AnalysisResult<f64> {
    let totals = shift_case_totals(dataset);
    if totals.is_empty() {
        return Err(AnalysisError::InsufficientData(
            "no shift periods to average respiratory cases over".into(),
        ));
    }
    let cases: u32 = totals.values().sum();
    Ok(f64::from(cases) / totals.len() as f64)
}

impl<'a> DistributionEngine<'a> {
    /// P(at least `target_count` respiratory cases in a shift).
    pub fn poisson_analysis(&self, target_count: u32) -> AnalysisResult<DistributionResult> {
        if target_count > POISSON_MAX_OUTCOME {
            return Err(AnalysisError::InvalidParameter(format!(
                "desired cases must be between 0 and {}, got {}",
                POISSON_MAX_OUTCOME, target_count
            )));
        }

        let lambda = respiratory_rate_per_shift(self.dataset)?;
        debug!(lambda, target_count, "Poisson analysis");

        let (probability_mass, tail) = if lambda > 0.0 {
            let dist = Poisson::new(lambda)
                .map_err(|e| AnalysisError::InvalidParameter(e.to_string()))?;
            (
                mass_table(&dist, POISSON_MAX_OUTCOME, target_count),
                tail_probability(&dist, target_count),
            )
        } else {
            (
                mass_table(&PointMassAtZero, POISSON_MAX_OUTCOME, target_count),
                tail_probability(&PointMassAtZero, target_count),
            )
        };

        Ok(DistributionResult {
            kind: AnalysisKind::Poisson,
            target_count,
            probability_mass,
            tail_probability: tail,
            empirical_rate: lambda,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VisitRecord;

    fn visit(shift: Option<&str>, symptom: Option<bool>) -> VisitRecord {
        let mut r = VisitRecord::new("pet");
        r.shift = shift.map(String::from);
        r.respiratory_symptom = symptom;
        r
    }

    /// Two shifts with 2 and 4 cases.
    fn make_dataset() -> Dataset {
        let mut records = Vec::new();
        for i in 0..3 {
            records.push(visit(Some("Manhã"), Some(i < 2)));
        }
        for _ in 0..4 {
            records.push(visit(Some("Tarde"), Some(true)));
        }
        Dataset::new(records)
    }

    #[test]
    fn test_shift_case_totals() {
        let dataset = make_dataset();
        let totals = shift_case_totals(&dataset);

        assert_eq!(totals.len(), 2);
        assert_eq!(totals["Manhã"], 2);
        assert_eq!(totals["Tarde"], 4);
    }

    #[test]
    fn test_reference_scenario() {
        let dataset = make_dataset();
        let engine = DistributionEngine::new(&dataset);
        let result = engine.poisson_analysis(3).unwrap();

        assert_eq!(result.empirical_rate, 3.0);
        assert_eq!(result.probability_mass.len(), 11);
        assert!((result.tail_probability - 0.576810).abs() < 1e-3);
    }

    #[test]
    fn test_unknown_shift_and_symptom() {
        let mut records = make_dataset().records().to_vec();
        records.push(visit(None, Some(true)));
        records.push(visit(Some("Noite"), None));
        let dataset = Dataset::new(records);

        // Noite joins as a group with zero cases; the shiftless visit is dropped.
        assert_eq!(respiratory_rate_per_shift(&dataset).unwrap(), 2.0);
    }

    #[test]
    fn test_zero_target_is_certain() {
        let dataset = make_dataset();
        let engine = DistributionEngine::new(&dataset);
        assert_eq!(engine.poisson_analysis(0).unwrap().tail_probability, 1.0);
    }

    #[test]
    fn test_no_cases_is_point_mass() {
        let dataset = Dataset::new(vec![visit(Some("Manhã"), Some(false))]);
        let engine = DistributionEngine::new(&dataset);

        let result = engine.poisson_analysis(1).unwrap();
        assert_eq!(result.empirical_rate, 0.0);
        assert_eq!(result.tail_probability, 0.0);
        assert_eq!(result.probability_mass[0].probability, 1.0);
        assert_eq!(engine.poisson_analysis(0).unwrap().tail_probability, 1.0);
    }

    #[test]
    fn test_no_shifts_is_insufficient() {
        let dataset = Dataset::new(vec![visit(None, Some(true))]);
        assert!(matches!(
            DistributionEngine::new(&dataset).poisson_analysis(2),
            Err(AnalysisError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_target_out_of_range() {
        let dataset = make_dataset();
        assert!(matches!(
            DistributionEngine::new(&dataset).poisson_analysis(11),
            Err(AnalysisError::InvalidParameter(_))
        ));
    }
}
