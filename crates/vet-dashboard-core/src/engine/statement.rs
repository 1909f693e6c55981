//! Text statements shown beside the probability charts.

use serde::{Deserialize, Serialize};

use crate::models::{AnalysisKind, DistributionResult};

/// Format a fraction as a percentage with fixed precision, e.g. `0.1503` → `15.03%`.
pub fn format_percent(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, value * 100.0)
}

/// Rendered text for one analysis result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbabilityStatement {
    /// Empirical rate, formatted
    pub rate_text: String,
    /// Tail probability, formatted
    pub probability_text: String,
    /// Full sentences
    pub lines: Vec<String>,
}

impl ProbabilityStatement {
    /// Describe a binomial result for `trials` simulated patients.
    pub fn binomial(result: &DistributionResult, trials: u32) -> Self {
        let rate_text = format_percent(result.empirical_rate, 1);
        let probability_text = format_percent(result.tail_probability, 2);
        let lines = vec![
            format!("Based on an observed certificate rate of {},", rate_text),
            format!(
                "the probability of at least {} certificates among {} patients is {}.",
                result.target_count, trials, probability_text
            ),
        ];
        Self {
            rate_text,
            probability_text,
            lines,
        }
    }

    /// Describe a Poisson result.
    pub fn poisson(result: &DistributionResult) -> Self {
        let rate_text = format!("{:.2}", result.empirical_rate);
        let probability_text = format_percent(result.tail_probability, 2);
        let lines = vec![
            format!("The mean number of respiratory cases per shift is {}.", rate_text),
            format!(
                "The probability of at least {} cases in one shift is {}.",
                result.target_count, probability_text
            ),
        ];
        Self {
            rate_text,
            probability_text,
            lines,
        }
    }

    /// Describe any result. `trials` is only read for binomial results.
    pub fn for_result(result: &DistributionResult, trials: u32) -> Self {
        match result.kind {
            AnalysisKind::Binomial => Self::binomial(result, trials),
            AnalysisKind::Poisson => Self::poisson(result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_result(kind: AnalysisKind, rate: f64, tail: f64) -> DistributionResult {
        DistributionResult {
            kind,
            target_count: 5,
            probability_mass: Vec::new(),
            tail_probability: tail,
            empirical_rate: rate,
        }
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.150268, 2), "15.03%");
        assert_eq!(format_percent(0.3, 1), "30.0%");
        assert_eq!(format_percent(1.0, 2), "100.00%");
        assert_eq!(format_percent(0.0, 2), "0.00%");
    }

    #[test]
    fn test_binomial_statement() {
        let result = make_result(AnalysisKind::Binomial, 0.3, 0.150268);
        let statement = ProbabilityStatement::binomial(&result, 10);

        assert_eq!(statement.rate_text, "30.0%");
        assert_eq!(statement.probability_text, "15.03%");
        assert!(statement.lines[1].contains("at least 5 certificates among 10 patients"));
    }

    #[test]
    fn test_poisson_statement() {
        let result = make_result(AnalysisKind::Poisson, 3.0, 0.57681);
        let statement = ProbabilityStatement::for_result(&result, 0);

        assert_eq!(statement.rate_text, "3.00");
        assert_eq!(statement.probability_text, "57.68%");
        assert!(statement.lines[0].contains("3.00"));
    }
}
