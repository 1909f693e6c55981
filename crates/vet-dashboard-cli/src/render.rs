//! Plain-text rendering of dashboard panels.

use vet_dashboard_core::engine::{format_percent, ProbabilityStatement};
use vet_dashboard_core::models::{AnalysisKind, CategoryField, DistributionResult};
use vet_dashboard_core::summary::{AgeHistogram, CategoryCounts, DashboardSummary};

/// Widest bar, in characters.
const BAR_WIDTH: usize = 40;

const TAIL_BAR: char = '#';
const BODY_BAR: char = '-';

/// Metric cards line.
pub fn render_summary(summary: &DashboardSummary) -> String {
    let mean_age = summary
        .mean_age
        .map(|age| format!("{:.1} years", age))
        .unwrap_or_else(|| "n/a".to_string());

    let mut out = String::new();
    out.push_str("## Visit summary\n");
    out.push_str(&format!("Mean age:             {}\n", mean_age));
    out.push_str(&format!("Certificates issued:  {}\n", summary.certificates_issued));
    out.push_str(&format!("Respiratory cases:    {}\n", summary.respiratory_cases));
    out
}

/// Chart title for a category.
pub fn category_title(field: CategoryField) -> &'static str {
    match field {
        CategoryField::Doctor => "Visits per doctor",
        CategoryField::Shift => "Visits per shift",
        CategoryField::Gender => "Visits per gender",
    }
}

/// Horizontal bar chart of category counts.
pub fn render_counts(counts: &CategoryCounts) -> String {
    let rows: Vec<(String, usize)> = counts
        .counts
        .iter()
        .map(|c| (c.value.clone(), c.count))
        .collect();
    render_count_bars(category_title(counts.field), &rows)
}

/// Horizontal bar chart of the respiratory-case age histogram.
pub fn render_histogram(histogram: &AgeHistogram) -> String {
    let rows: Vec<(String, usize)> = histogram
        .bins
        .iter()
        .map(|b| (format!("{:>5.1}-{:<5.1}", b.lower, b.upper), b.count))
        .collect();
    render_count_bars("Respiratory cases by age", &rows)
}

fn render_count_bars(title: &str, rows: &[(String, usize)]) -> String {
    let mut out = format!("### {}\n", title);
    if rows.is_empty() {
        out.push_str("(no data)\n");
        return out;
    }

    let label_width = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    let max = rows.iter().map(|(_, c)| *c).max().unwrap_or(0).max(1);

    for (label, count) in rows {
        let len = count * BAR_WIDTH / max;
        let pad = label_width - label.chars().count();
        out.push_str(&format!(
            "{}{} | {} {}\n",
            label,
            " ".repeat(pad),
            "=".repeat(len),
            count
        ));
    }
    out
}

/// Statement plus mass chart, tail outcomes drawn with `#`.
pub fn render_distribution(result: &DistributionResult, statement: &ProbabilityStatement) -> String {
    let title = match result.kind {
        AnalysisKind::Binomial => "Binomial distribution (certificates)",
        AnalysisKind::Poisson => "Poisson distribution (respiratory cases per shift)",
    };

    let mut out = format!("### {}\n", title);
    for line in &statement.lines {
        out.push_str(line);
        out.push('\n');
    }
    out.push('\n');

    let max = result
        .probability_mass
        .iter()
        .map(|p| p.probability)
        .fold(0.0_f64, f64::max);
    let outcome_width = result
        .probability_mass
        .last()
        .map(|p| p.outcome.to_string().len())
        .unwrap_or(1);

    for point in &result.probability_mass {
        let len = if max > 0.0 {
            (point.probability / max * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let bar = if point.highlighted { TAIL_BAR } else { BODY_BAR };
        out.push_str(&format!(
            "{:>width$} | {:<bar_width$} {}\n",
            point.outcome,
            bar.to_string().repeat(len),
            format_percent(point.probability, 2),
            width = outcome_width,
            bar_width = BAR_WIDTH,
        ));
    }
    out.push_str(&format!(
        "({} = at least {}, {} = below)\n",
        TAIL_BAR, result.target_count, BODY_BAR
    ));
    out
}
