//! Descriptive summaries for the dashboard's metric cards and count charts.
//!
//! Provides:
//! - Metric cards (mean age, certificates issued, respiratory cases)
//! - Category counts (visits per doctor, shift, gender)
//! - Age histogram of respiratory cases

use serde::{Deserialize, Serialize};

use crate::models::{CategoryField, Dataset};

/// Number of bins in the respiratory-case age histogram.
pub const AGE_HISTOGRAM_BINS: usize = 10;

/// Headline metrics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardSummary {
    /// Number of visits
    pub visits: usize,
    /// Mean pet age over visits with a known age
    pub mean_age: Option<f64>,
    /// Visits with a certificate issued
    pub certificates_issued: usize,
    /// Visits with a respiratory symptom
    pub respiratory_cases: usize,
}

impl DashboardSummary {
    /// Compute the headline metrics.
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let ages: Vec<f64> = dataset.iter().filter_map(|r| r.age).collect();
        let mean_age = if ages.is_empty() {
            None
        } else {
            Some(ages.iter().sum::<f64>() / ages.len() as f64)
        };

        Self {
            visits: dataset.len(),
            mean_age,
            certificates_issued: dataset.iter().filter(|r| r.has_certificate()).count(),
            respiratory_cases: dataset.iter().filter(|r| r.has_respiratory_symptom()).count(),
        }
    }
}

/// Ordering of bars in a count chart.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CountOrder {
    /// Order of first appearance in the dataset
    FirstSeen,
    /// Highest count first; ties keep first-appearance order
    Descending,
}

impl CountOrder {
    /// Chart ordering used by the dashboard for each category.
    pub fn for_field(field: CategoryField) -> Self {
        match field {
            CategoryField::Shift => CountOrder::Descending,
            CategoryField::Doctor | CategoryField::Gender => CountOrder::FirstSeen,
        }
    }
}

/// Count of visits for one category value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryCount {
    pub value: String,
    pub count: usize,
}

/// Visit counts per category value. Unknown values are left out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryCounts {
    pub field: CategoryField,
    pub counts: Vec<CategoryCount>,
}

impl CategoryCounts {
    /// Count visits per value of `field`, ordered the way the dashboard charts it.
    pub fn from_dataset(dataset: &Dataset, field: CategoryField) -> Self {
        Self::with_order(dataset, field, CountOrder::for_field(field))
    }

    /// Count visits per value of `field` with an explicit ordering.
    pub fn with_order(dataset: &Dataset, field: CategoryField, order: CountOrder) -> Self {
        let mut counts: Vec<CategoryCount> = Vec::new();
        for value in dataset.iter().filter_map(|r| field.value_of(r)) {
            match counts.iter_mut().find(|c| c.value == value) {
                Some(existing) => existing.count += 1,
                None => counts.push(CategoryCount {
                    value: value.to_string(),
                    count: 1,
                }),
            }
        }

        if order == CountOrder::Descending {
            // Stable sort keeps first-seen order among ties.
            counts.sort_by(|a, b| b.count.cmp(&a.count));
        }

        Self { field, counts }
    }

    /// Total counted visits.
    pub fn total(&self) -> usize {
        self.counts.iter().map(|c| c.count).sum()
    }

    /// Count for a single value.
    pub fn get(&self, value: &str) -> usize {
        self.counts
            .iter()
            .find(|c| c.value == value)
            .map(|c| c.count)
            .unwrap_or(0)
    }
}

/// One histogram bin, `[lower, upper)` except the last which is closed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Equal-width histogram.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgeHistogram {
    pub bins: Vec<HistogramBin>,
}

impl AgeHistogram {
    /// Ages of respiratory cases, split into [`AGE_HISTOGRAM_BINS`] bins.
    pub fn respiratory_cases(dataset: &Dataset) -> Self {
        let ages: Vec<f64> = dataset
            .iter()
            .filter(|r| r.has_respiratory_symptom())
            .filter_map(|r| r.age)
            .collect();
        Self::from_values(&ages, AGE_HISTOGRAM_BINS)
    }

    /// Histogram of `values` over `[min, max]` with `bins` equal-width bins.
    ///
    /// When every value is equal the range is widened by 0.5 on each side.
    /// No values gives no bins.
    pub fn from_values(values: &[f64], bins: usize) -> Self {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() || bins == 0 {
            return Self { bins: Vec::new() };
        }

        let mut min = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let mut max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if min == max {
            min -= 0.5;
            max += 0.5;
        }
        let width = (max - min) / bins as f64;

        let mut out: Vec<HistogramBin> = (0..bins)
            .map(|i| HistogramBin {
                lower: min + width * i as f64,
                upper: if i + 1 == bins {
                    max
                } else {
                    min + width * (i + 1) as f64
                },
                count: 0,
            })
            .collect();

        for value in finite {
            let index = (((value - min) / width) as usize).min(bins - 1);
            out[index].count += 1;
        }

        Self { bins: out }
    }

    /// Total counted values.
    pub fn total(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VisitRecord;

    fn visit(age: Option<f64>, doctor: &str, shift: &str, cert: bool, resp: bool) -> VisitRecord {
        let mut r = VisitRecord::new("pet");
        r.age = age;
        r.doctor = Some(doctor.into());
        r.shift = Some(shift.into());
        r.certificate_issued = Some(cert);
        r.respiratory_symptom = Some(resp);
        r
    }

    fn make_dataset() -> Dataset {
        Dataset::new(vec![
            visit(Some(2.0), "Dr. Paulo", "Tarde", true, true),
            visit(Some(4.0), "Dra. Ana", "Manhã", false, false),
            visit(None, "Dr. Paulo", "Manhã", true, true),
            visit(Some(6.0), "Dra. Ana", "Manhã", false, true),
        ])
    }

    #[test]
    fn test_summary_metrics() {
        let summary = DashboardSummary::from_dataset(&make_dataset());

        assert_eq!(summary.visits, 4);
        assert_eq!(summary.mean_age, Some(4.0));
        assert_eq!(summary.certificates_issued, 2);
        assert_eq!(summary.respiratory_cases, 3);
    }

    #[test]
    fn test_summary_empty() {
        let summary = DashboardSummary::from_dataset(&Dataset::default());
        assert_eq!(summary.mean_age, None);
        assert_eq!(summary.visits, 0);
    }

    #[test]
    fn test_counts_first_seen() {
        let counts = CategoryCounts::from_dataset(&make_dataset(), CategoryField::Doctor);

        assert_eq!(counts.counts[0].value, "Dr. Paulo");
        assert_eq!(counts.get("Dra. Ana"), 2);
        assert_eq!(counts.get("Dr. Nobody"), 0);
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn test_counts_descending() {
        let counts = CategoryCounts::from_dataset(&make_dataset(), CategoryField::Shift);

        assert_eq!(counts.counts[0].value, "Manhã");
        assert_eq!(counts.counts[0].count, 3);
        assert_eq!(counts.counts[1].value, "Tarde");
    }

    #[test]
    fn test_counts_skip_unknown() {
        let counts = CategoryCounts::from_dataset(&make_dataset(), CategoryField::Gender);
        assert!(counts.counts.is_empty());
    }

    #[test]
    fn test_respiratory_age_histogram() {
        let histogram = AgeHistogram::respiratory_cases(&make_dataset());

        assert_eq!(histogram.bins.len(), AGE_HISTOGRAM_BINS);
        assert_eq!(histogram.total(), 2);
        assert_eq!(histogram.bins[0].count, 1);
        assert_eq!(histogram.bins[9].count, 1);
        assert_eq!(histogram.bins[9].upper, 6.0);
    }

    #[test]
    fn test_histogram_single_value() {
        let histogram = AgeHistogram::from_values(&[3.0, 3.0], 10);
        assert_eq!(histogram.total(), 2);
        assert_eq!(histogram.bins[0].lower, 2.5);
        assert_eq!(histogram.bins[9].upper, 3.5);
    }

    #[test]
    fn test_histogram_empty() {
        assert!(AgeHistogram::from_values(&[], 10).bins.is_empty());
    }
}
