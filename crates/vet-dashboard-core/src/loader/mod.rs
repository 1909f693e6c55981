//! Visit sheet loader.
//!
//! Pipeline: bytes → text decoding → header resolution → per-cell
//! normalization → symptom flags → [`Dataset`]
//!
//! Malformed cells never abort a load. The cell becomes unknown and a
//! [`MalformedRecord`] is added to the [`LoadReport`].

mod symptoms;
mod vocabulary;

pub use symptoms::*;
pub use vocabulary::*;

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::{DashboardConfig, SymptomSourceKind, TextEncoding};
use crate::models::{Dataset, VisitRecord};

/// Byte-order mark for UTF-8.
pub(crate) const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Load errors. Only whole-file problems end up here.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Sheet is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("No recognised columns in header: {0}")]
    NoRecognizedColumns(String),

    #[error("Invalid loader option: {0}")]
    InvalidOption(String),
}

pub type LoadResult<T> = Result<T, LoadError>;

/// A cell that failed validation and was coerced to unknown.
///
/// `row` is the zero-based index of the record in the dataset.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MalformedRecord {
    #[error("row {row}: {column} is missing")]
    MissingField { row: usize, column: Column },

    #[error("row {row}: {column} value {value:?} is outside the yes/no vocabulary")]
    UnmappedFlag {
        row: usize,
        column: Column,
        value: String,
    },

    #[error("row {row}: {column} value {value:?} is not a valid age")]
    InvalidAge {
        row: usize,
        column: Column,
        value: String,
    },
}

impl MalformedRecord {
    /// Row the issue was found in.
    pub fn row(&self) -> usize {
        match self {
            MalformedRecord::MissingField { row, .. }
            | MalformedRecord::UnmappedFlag { row, .. }
            | MalformedRecord::InvalidAge { row, .. } => *row,
        }
    }

    /// Column the issue was found in.
    pub fn column(&self) -> Column {
        match self {
            MalformedRecord::MissingField { column, .. }
            | MalformedRecord::UnmappedFlag { column, .. }
            | MalformedRecord::InvalidAge { column, .. } => *column,
        }
    }
}

/// What happened during a load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoadReport {
    /// Number of records loaded
    pub rows: usize,
    /// Required columns absent from the header
    pub missing_columns: Vec<Column>,
    /// Headers resolved only by fuzzy match
    pub fuzzy_headers: Vec<HeaderMatch>,
    /// Cells coerced to unknown
    pub issues: Vec<MalformedRecord>,
    /// Source of the respiratory flags
    pub symptom_origin: SymptomOrigin,
}

impl LoadReport {
    /// True when every header matched exactly and every cell parsed.
    pub fn is_clean(&self) -> bool {
        self.missing_columns.is_empty() && self.fuzzy_headers.is_empty() && self.issues.is_empty()
    }
}

/// A dataset together with its load report.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub dataset: Dataset,
    pub report: LoadReport,
}

/// Loader options.
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderOptions {
    /// Field separator
    pub delimiter: u8,
    /// Text encoding
    pub encoding: TextEncoding,
    /// Whether a symptom column in the sheet is honored
    pub symptom_source: SymptomSourceKind,
    /// Synthetic symptom draw used when the column is not honored
    pub synthetic: SyntheticSymptoms,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            delimiter: b';',
            encoding: TextEncoding::Latin1,
            symptom_source: SymptomSourceKind::ColumnOrSynthetic,
            synthetic: SyntheticSymptoms::default(),
        }
    }
}

impl LoaderOptions {
    /// Build loader options from the dashboard configuration.
    pub fn from_config(config: &DashboardConfig) -> LoadResult<Self> {
        let delimiter = u8::try_from(config.data.delimiter).map_err(|_| {
            LoadError::InvalidOption(format!(
                "delimiter {:?} is not a single byte",
                config.data.delimiter
            ))
        })?;

        Ok(Self {
            delimiter,
            encoding: config.data.encoding,
            symptom_source: config.symptoms.source,
            synthetic: SyntheticSymptoms::new(config.symptoms.seed, config.symptoms.probability)?,
        })
    }
}

/// Reads visit sheets into a [`Dataset`].
pub struct Loader {
    options: LoaderOptions,
    vocabulary: Vocabulary,
}

impl Default for Loader {
    fn default() -> Self {
        Self::new(LoaderOptions::default())
    }
}

impl Loader {
    /// Create a loader with the default vocabulary.
    pub fn new(options: LoaderOptions) -> Self {
        Self {
            options,
            vocabulary: Vocabulary::new(),
        }
    }

    /// Create a loader with a custom vocabulary.
    pub fn with_vocabulary(options: LoaderOptions, vocabulary: Vocabulary) -> Self {
        Self {
            options,
            vocabulary,
        }
    }

    /// Load a sheet from disk.
    pub fn load_path<P: AsRef<Path>>(&self, path: P) -> LoadResult<LoadedDataset> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let loaded = self.load_bytes(&bytes)?;
        info!(
            path = %path.display(),
            rows = loaded.report.rows,
            issues = loaded.report.issues.len(),
            "Loaded visit sheet"
        );
        Ok(loaded)
    }

    /// Load a sheet from raw bytes.
    pub fn load_bytes(&self, bytes: &[u8]) -> LoadResult<LoadedDataset> {
        let text = decode(bytes, self.options.encoding)?;
        self.load_str(&text)
    }

    /// Load a sheet from already-decoded text.
    pub fn load_str(&self, text: &str) -> LoadResult<LoadedDataset> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.options.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = reader.headers()?.clone();
        let slots = self.vocabulary.resolve_headers(headers.iter());

        if slots.iter().all(Option::is_none) {
            return Err(LoadError::NoRecognizedColumns(
                headers.iter().collect::<Vec<_>>().join(", "),
            ));
        }

        let fuzzy_headers: Vec<HeaderMatch> = slots
            .iter()
            .flatten()
            .filter(|m| !m.is_exact())
            .cloned()
            .collect();
        for found in &fuzzy_headers {
            warn!(
                header = %found.header,
                column = %found.column,
                similarity = found.similarity,
                "Header resolved by fuzzy match"
            );
        }

        let position = |column: Column| {
            slots
                .iter()
                .position(|slot| slot.as_ref().map(|m| m.column) == Some(column))
        };

        let missing_columns: Vec<Column> = Column::ALL
            .iter()
            .copied()
            .filter(|c| c.is_required() && position(*c).is_none())
            .collect();
        for column in &missing_columns {
            warn!(column = %column, "Required column missing; values will be unknown");
        }

        let symptom_column = match self.options.symptom_source {
            SymptomSourceKind::ColumnOrSynthetic => position(Column::RespiratorySymptom),
            SymptomSourceKind::Synthetic => None,
        };

        let mut records = Vec::new();
        let mut issues = Vec::new();

        for (row, result) in reader.records().enumerate() {
            let raw = result?;
            let mut cells = RowCells {
                raw: &raw,
                row,
                issues: &mut issues,
            };

            let mut record = VisitRecord::new(
                cells
                    .get(position(Column::PetName), Column::PetName)
                    .map(|s| s.trim().to_string())
                    .unwrap_or_default(),
            );
            record.age = cells
                .get(position(Column::Age), Column::Age)
                .and_then(|s| cells.age(s));
            record.gender = cells
                .get(position(Column::Gender), Column::Gender)
                .and_then(category);
            record.doctor = cells
                .get(position(Column::Doctor), Column::Doctor)
                .and_then(category);
            record.shift = cells
                .get(position(Column::Shift), Column::Shift)
                .and_then(category);
            record.certificate_issued = cells
                .get(position(Column::Certificate), Column::Certificate)
                .and_then(|s| cells.flag(&self.vocabulary, s, Column::Certificate));
            record.cross_species_vet = cells
                .get(position(Column::CrossSpeciesVet), Column::CrossSpeciesVet)
                .and_then(|s| cells.flag(&self.vocabulary, s, Column::CrossSpeciesVet));
            if symptom_column.is_some() {
                record.respiratory_symptom = cells
                    .get(symptom_column, Column::RespiratorySymptom)
                    .and_then(|s| cells.flag(&self.vocabulary, s, Column::RespiratorySymptom));
            }

            records.push(record);
        }

        let symptom_origin = if symptom_column.is_some() {
            SymptomOrigin::Column
        } else {
            let flags = self.options.synthetic.draw(records.len());
            for (record, flag) in records.iter_mut().zip(flags) {
                record.respiratory_symptom = Some(flag);
            }
            SymptomOrigin::Synthetic
        };

        for issue in &issues {
            warn!(%issue, "Coerced malformed cell to unknown");
        }

        let report = LoadReport {
            rows: records.len(),
            missing_columns,
            fuzzy_headers,
            issues,
            symptom_origin,
        };

        Ok(LoadedDataset {
            dataset: Dataset::new(records),
            report,
        })
    }
}

/// Per-row cell access that records issues as it goes.
struct RowCells<'r, 'i> {
    raw: &'r csv::StringRecord,
    row: usize,
    issues: &'i mut Vec<MalformedRecord>,
}

impl<'r, 'i> RowCells<'r, 'i> {
    /// Fetch the cell at `index`. A short row records a missing field;
    /// an absent column (`index == None`) was already reported once.
    fn get(&mut self, index: Option<usize>, column: Column) -> Option<&'r str> {
        let index = index?;
        match self.raw.get(index) {
            Some(value) => Some(value),
            None => {
                self.issues.push(MalformedRecord::MissingField {
                    row: self.row,
                    column,
                });
                None
            }
        }
    }

    fn age(&mut self, raw: &str) -> Option<f64> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        match trimmed.replace(',', ".").parse::<f64>() {
            Ok(age) if age.is_finite() && age >= 0.0 => Some(age),
            _ => {
                self.issues.push(MalformedRecord::InvalidAge {
                    row: self.row,
                    column: Column::Age,
                    value: trimmed.to_string(),
                });
                None
            }
        }
    }

    fn flag(&mut self, vocabulary: &Vocabulary, raw: &str, column: Column) -> Option<bool> {
        match vocabulary.parse_flag(raw) {
            FlagValue::Known(value) => Some(value),
            FlagValue::Empty => None,
            FlagValue::Unmapped => {
                self.issues.push(MalformedRecord::UnmappedFlag {
                    row: self.row,
                    column,
                    value: raw.trim().to_string(),
                });
                None
            }
        }
    }
}

/// Trimmed category, `None` when blank.
fn category(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Decode sheet bytes to text.
///
/// A UTF-8 byte-order mark wins over the configured encoding, so exported
/// tables load back under any setting.
pub fn decode(bytes: &[u8], encoding: TextEncoding) -> LoadResult<String> {
    if let Some(body) = bytes.strip_prefix(UTF8_BOM) {
        return Ok(String::from_utf8(body.to_vec())?);
    }
    match encoding {
        TextEncoding::Latin1 => Ok(decode_latin1(bytes)),
        TextEncoding::Utf8 => Ok(String::from_utf8(bytes.to_vec())?),
        TextEncoding::Auto => match std::str::from_utf8(bytes) {
            Ok(text) => Ok(text.to_string()),
            Err(_) => Ok(decode_latin1(bytes)),
        },
    }
}

/// ISO-8859-1 maps each byte to the code point of the same value.
fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}
