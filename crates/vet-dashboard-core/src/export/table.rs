//! Delimited-text export of the full visit table.
//!
//! Output is UTF-8 with a byte-order mark so spreadsheet tools pick the
//! right encoding, one row per visit, headers from [`Column::export_header`].

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::info;

use crate::config::ExportConfig;
use crate::loader::{Column, UTF8_BOM};
use crate::models::{Dataset, VisitRecord};

/// Export errors.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to flush export buffer: {0}")]
    Flush(String),

    #[error("Invalid export option: {0}")]
    InvalidOption(String),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// A finished export, ready to hand to the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportFile {
    /// Suggested file name
    pub file_name: String,
    /// File contents (BOM included)
    pub bytes: Vec<u8>,
    /// Number of data rows
    pub row_count: usize,
    /// Hex SHA-256 of `bytes`
    pub sha256: String,
    /// Export timestamp
    pub exported_at: String,
}

impl ExportFile {
    /// Contents as text, without the byte-order mark.
    pub fn text(&self) -> String {
        let body = self.bytes.strip_prefix(UTF8_BOM).unwrap_or(&self.bytes[..]);
        String::from_utf8_lossy(body).into_owned()
    }
}

/// Writes a dataset as delimited text.
pub struct TableExporter<'a> {
    dataset: &'a Dataset,
    file_name: String,
    delimiter: u8,
}

impl<'a> TableExporter<'a> {
    /// Create an exporter with the default file name and `;` separator.
    pub fn new(dataset: &'a Dataset) -> Self {
        let defaults = ExportConfig::default();
        Self {
            dataset,
            file_name: defaults.file_name,
            delimiter: b';',
        }
    }

    /// Create an exporter from the export configuration.
    pub fn with_config(dataset: &'a Dataset, config: &ExportConfig) -> ExportResult<Self> {
        let delimiter = u8::try_from(config.delimiter).map_err(|_| {
            ExportError::InvalidOption(format!(
                "delimiter {:?} is not a single byte",
                config.delimiter
            ))
        })?;
        Ok(Self {
            dataset,
            file_name: config.file_name.clone(),
            delimiter,
        })
    }

    /// Export every record.
    pub fn export(&self) -> ExportResult<ExportFile> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(UTF8_BOM.to_vec());

        writer.write_record(Column::ALL.iter().map(|c| c.export_header()))?;
        for record in self.dataset {
            writer.write_record(row_fields(record))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| ExportError::Flush(e.to_string()))?;
        let sha256 = hex::encode(Sha256::digest(&bytes));

        info!(
            file_name = %self.file_name,
            rows = self.dataset.len(),
            bytes = bytes.len(),
            "Exported visit table"
        );

        Ok(ExportFile {
            file_name: self.file_name.clone(),
            bytes,
            row_count: self.dataset.len(),
            sha256,
            exported_at: chrono::Utc::now().to_rfc3339(),
        })
    }
}

/// Cells of one record, in [`Column::ALL`] order.
fn row_fields(record: &VisitRecord) -> [String; 8] {
    [
        record.pet_name.clone(),
        record.age.map(|a| a.to_string()).unwrap_or_default(),
        record.gender.clone().unwrap_or_default(),
        record.doctor.clone().unwrap_or_default(),
        flag_cell(record.certificate_issued),
        flag_cell(record.cross_species_vet),
        record.shift.clone().unwrap_or_default(),
        flag_cell(record.respiratory_symptom),
    ]
}

fn flag_cell(flag: Option<bool>) -> String {
    match flag {
        Some(true) => "1".into(),
        Some(false) => "0".into(),
        None => String::new(),
    }
}
