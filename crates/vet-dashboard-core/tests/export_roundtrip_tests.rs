//! Load → export → reload integration tests.

use vet_dashboard_core::config::{DashboardConfig, SymptomSourceKind, TextEncoding};
use vet_dashboard_core::export::TableExporter;
use vet_dashboard_core::loader::{Loader, LoaderOptions, SymptomOrigin, SyntheticSymptoms};
use vet_dashboard_core::models::VisitRecord;

/// Source sheet as the clinic exports it: Latin-1, original headers, Sim/Não flags.
const SOURCE: &str = "NOME DO PET;IDADE DO PET;GÊNERO DO PET;VETERINÁRIO;ATESTADO;VET ANIMAIS;TURNO
Rex;3;Macho;Dr. Paulo;Sim;Não;Manhã
Mia;2,5;Fêmea;Dra. Ana;Não;Sim;Tarde
Bob;;Macho;Dr. Paulo;Talvez;Sim;
\"Pé; de Moleque\";11;Fêmea;Dra. Ana;Sim;Sim;Noite
";

fn latin1(text: &str) -> Vec<u8> {
    text.chars().map(|c| c as u32 as u8).collect()
}

fn non_synthetic(record: &VisitRecord) -> VisitRecord {
    VisitRecord {
        respiratory_symptom: None,
        ..record.clone()
    }
}

#[test]
fn test_export_reload_preserves_fields() {
    let dir = tempfile::tempdir().unwrap();
    let source_path = dir.path().join("Petiscos.csv");
    std::fs::write(&source_path, latin1(SOURCE)).unwrap();

    let original = Loader::default().load_path(&source_path).unwrap();
    assert_eq!(original.report.symptom_origin, SymptomOrigin::Synthetic);
    assert_eq!(original.report.issues.len(), 1);

    let export = TableExporter::new(&original.dataset).export().unwrap();
    let export_path = dir.path().join(&export.file_name);
    std::fs::write(&export_path, &export.bytes).unwrap();

    // Default options expect Latin-1; the BOM marks the export as UTF-8.
    let reloaded = Loader::default().load_path(&export_path).unwrap();

    assert!(reloaded.report.is_clean(), "{:?}", reloaded.report);
    assert_eq!(reloaded.report.symptom_origin, SymptomOrigin::Column);
    assert_eq!(reloaded.dataset.len(), original.dataset.len());

    for (before, after) in original.dataset.iter().zip(reloaded.dataset.iter()) {
        assert_eq!(non_synthetic(before), non_synthetic(after));
    }
}

#[test]
fn test_export_reload_keeps_symptom_column() {
    let original = Loader::default().load_bytes(&latin1(SOURCE)).unwrap();
    let export = TableExporter::new(&original.dataset).export().unwrap();

    for encoding in [TextEncoding::Latin1, TextEncoding::Utf8, TextEncoding::Auto] {
        let options = LoaderOptions {
            encoding,
            ..LoaderOptions::default()
        };
        let reloaded = Loader::new(options).load_bytes(&export.bytes).unwrap();
        assert_eq!(reloaded.dataset, original.dataset, "{:?}", encoding);
    }
}

#[test]
fn test_synthetic_flags_follow_seed() {
    let config = DashboardConfig::from_toml_str(
        "[symptoms]\nsource = \"synthetic\"\nseed = 42\nprobability = 0.3\n",
    )
    .unwrap();
    let options = LoaderOptions::from_config(&config).unwrap();
    assert_eq!(options.symptom_source, SymptomSourceKind::Synthetic);

    let first = Loader::new(options.clone()).load_bytes(&latin1(SOURCE)).unwrap();
    let second = Loader::new(options).load_bytes(&latin1(SOURCE)).unwrap();
    assert_eq!(first.dataset, second.dataset);

    let expected = SyntheticSymptoms::new(42, 0.3).unwrap().draw(4);
    let drawn: Vec<bool> = first
        .dataset
        .iter()
        .map(|r| r.respiratory_symptom.unwrap())
        .collect();
    assert_eq!(drawn, expected);
}

#[test]
fn test_quoted_delimiter_survives() {
    let loaded = Loader::default().load_bytes(&latin1(SOURCE)).unwrap();
    assert_eq!(loaded.dataset.records()[3].pet_name, "Pé; de Moleque");

    let export = TableExporter::new(&loaded.dataset).export().unwrap();
    assert!(export.text().contains("\"Pé; de Moleque\""));
}
