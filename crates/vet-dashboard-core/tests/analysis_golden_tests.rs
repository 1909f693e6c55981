//! Golden tests for the statistical panels.
//!
//! Expected values come from the closed-form binomial and Poisson CDFs.

use vet_dashboard_core::engine::{
    certificate_rate, respiratory_rate_per_shift, AnalysisError, DistributionEngine,
    ProbabilityStatement,
};
use vet_dashboard_core::loader::Loader;
use vet_dashboard_core::models::{AnalysisKind, Dataset, DistributionQuery};

/// Ten visits, three with certificates, two shifts with 2 and 4 respiratory cases.
const SHEET: &str = "Pet;Idade;Gênero;Medico;Atestado;VetAnimais;Turno;Sindrespiratoria
Rex;3;Macho;Dr. Paulo;Sim;Não;Manhã;1
Mia;2;Fêmea;Dra. Ana;Sim;Sim;Manhã;1
Bob;7;Macho;Dr. Paulo;Sim;Não;Manhã;0
Lua;1;Fêmea;Dra. Ana;Não;Não;Manhã;0
Thor;5;Macho;Dr. Paulo;Não;Sim;Tarde;1
Nina;4;Fêmea;Dra. Ana;Não;Não;Tarde;1
Max;6;Macho;Dr. Paulo;Não;Não;Tarde;1
Luna;8;Fêmea;Dra. Ana;Não;Sim;Tarde;1
Toby;2;Macho;Dr. Paulo;Não;Não;Tarde;0
Mel;9;Fêmea;Dra. Ana;Não;Não;Tarde;0
";

fn load() -> Dataset {
    Loader::default().load_str(SHEET).unwrap().dataset
}

struct GoldenCase {
    id: &'static str,
    query: DistributionQuery,
    expected_tail: f64,
}

fn get_golden_cases() -> Vec<GoldenCase> {
    vec![
        GoldenCase {
            id: "binomial-10-5",
            query: DistributionQuery::binomial(10, 5),
            // 1 - BinomialCDF(4; 10, 0.3)
            expected_tail: 0.150268,
        },
        GoldenCase {
            id: "binomial-10-1",
            query: DistributionQuery::binomial(10, 1),
            // 1 - 0.7^10
            expected_tail: 0.971752,
        },
        GoldenCase {
            id: "binomial-5-5",
            query: DistributionQuery::binomial(5, 5),
            // 0.3^5
            expected_tail: 0.00243,
        },
        GoldenCase {
            id: "binomial-20-6",
            query: DistributionQuery::binomial(20, 6),
            // 1 - BinomialCDF(5; 20, 0.3)
            expected_tail: 0.583629,
        },
        GoldenCase {
            id: "poisson-3",
            query: DistributionQuery::poisson(3),
            // 1 - PoissonCDF(2; 3.0)
            expected_tail: 0.576810,
        },
        GoldenCase {
            id: "poisson-1",
            query: DistributionQuery::poisson(1),
            // 1 - e^-3
            expected_tail: 0.950213,
        },
        GoldenCase {
            id: "poisson-10",
            query: DistributionQuery::poisson(10),
            // 1 - PoissonCDF(9; 3.0)
            expected_tail: 0.001102,
        },
    ]
}

#[test]
fn test_dataset_rates() {
    let dataset = load();
    assert_eq!(dataset.len(), 10);
    assert_eq!(certificate_rate(&dataset).unwrap(), 0.3);
    assert_eq!(respiratory_rate_per_shift(&dataset).unwrap(), 3.0);
}

#[test]
fn test_golden_cases() {
    let dataset = load();
    let engine = DistributionEngine::new(&dataset);

    for case in get_golden_cases() {
        let result = engine.analyze(&case.query).unwrap();
        assert!(
            (result.tail_probability - case.expected_tail).abs() < 1e-3,
            "{}: got {}, expected {}",
            case.id,
            result.tail_probability,
            case.expected_tail
        );
        assert_eq!(result.kind, case.query.kind, "{}", case.id);
        assert_eq!(result.target_count, case.query.target_count, "{}", case.id);
    }
}

#[test]
fn test_chart_consistent_with_tail() {
    let dataset = load();
    let engine = DistributionEngine::new(&dataset);

    for case in get_golden_cases() {
        let result = engine.analyze(&case.query).unwrap();
        let highlighted = result.highlighted_mass();
        let expected_len = match result.kind {
            AnalysisKind::Binomial => case.query.trials as usize + 1,
            AnalysisKind::Poisson => 11,
        };

        assert_eq!(result.probability_mass.len(), expected_len, "{}", case.id);
        assert!(
            result
                .probability_mass
                .iter()
                .all(|p| p.highlighted == (p.outcome >= case.query.target_count)),
            "{}",
            case.id
        );
        if result.kind == AnalysisKind::Binomial {
            assert!((highlighted - result.tail_probability).abs() < 1e-9, "{}", case.id);
        } else {
            // Mass beyond outcome 10 is not charted.
            assert!(highlighted <= result.tail_probability + 1e-12, "{}", case.id);
        }
    }
}

#[test]
fn test_statement_text() {
    let dataset = load();
    let engine = DistributionEngine::new(&dataset);

    let result = engine.binomial_analysis(10, 5).unwrap();
    let statement = ProbabilityStatement::binomial(&result, 10);
    assert_eq!(statement.rate_text, "30.0%");
    assert_eq!(statement.probability_text, "15.03%");

    let result = engine.poisson_analysis(3).unwrap();
    let statement = ProbabilityStatement::poisson(&result);
    assert_eq!(statement.rate_text, "3.00");
    assert_eq!(statement.probability_text, "57.68%");
}

#[test]
fn test_invalid_query_leaves_engine_usable() {
    let dataset = load();
    let engine = DistributionEngine::new(&dataset);

    assert!(matches!(
        engine.binomial_analysis(10, 12),
        Err(AnalysisError::InvalidParameter(_))
    ));
    assert!(engine.binomial_analysis(10, 5).is_ok());
}
