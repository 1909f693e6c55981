//! Dashboard configuration.
//!
//! Read from TOML. Every section and field has a default, so an empty file
//! (or no file at all) gives the clinic's standard setup.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DashboardConfig {
    /// Input sheet settings
    pub data: DataConfig,
    /// Respiratory symptom source
    pub symptoms: SymptomConfig,
    /// Table export settings
    pub export: ExportConfig,
    /// Initial slider positions for the shell
    pub sliders: SliderDefaults,
}

impl DashboardConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check values serde cannot check.
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.data.delimiter.is_ascii() {
            return Err(ConfigError::Invalid(format!(
                "data.delimiter {:?} must be a single ASCII character",
                self.data.delimiter
            )));
        }
        if !self.export.delimiter.is_ascii() {
            return Err(ConfigError::Invalid(format!(
                "export.delimiter {:?} must be a single ASCII character",
                self.export.delimiter
            )));
        }
        if !(0.0..=1.0).contains(&self.symptoms.probability) {
            return Err(ConfigError::Invalid(format!(
                "symptoms.probability {} must be within [0, 1]",
                self.symptoms.probability
            )));
        }
        if self.export.file_name.trim().is_empty() {
            return Err(ConfigError::Invalid("export.file_name is empty".into()));
        }
        Ok(())
    }
}

/// Text encoding of the input sheet.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TextEncoding {
    /// ISO-8859-1, as the clinic's spreadsheet exports
    #[default]
    #[serde(rename = "latin-1", alias = "latin1", alias = "iso-8859-1")]
    Latin1,
    /// UTF-8, with or without a byte-order mark
    #[serde(rename = "utf-8", alias = "utf8")]
    Utf8,
    /// UTF-8 when the bytes allow it, Latin-1 otherwise
    Auto,
}

/// Input sheet configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DataConfig {
    /// Path to the visit sheet
    pub path: Option<PathBuf>,
    /// Field separator
    pub delimiter: char,
    /// Text encoding
    pub encoding: TextEncoding,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: None,
            delimiter: ';',
            encoding: TextEncoding::Latin1,
        }
    }
}

/// Where respiratory symptom flags come from.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SymptomSourceKind {
    /// Use the sheet's symptom column when present, else draw synthetic flags
    #[default]
    ColumnOrSynthetic,
    /// Always draw synthetic flags
    Synthetic,
}

/// Respiratory symptom configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SymptomConfig {
    /// Source selection
    pub source: SymptomSourceKind,
    /// RNG seed for synthetic flags
    pub seed: u64,
    /// Probability of a synthetic flag being set
    pub probability: f64,
}

impl Default for SymptomConfig {
    fn default() -> Self {
        Self {
            source: SymptomSourceKind::ColumnOrSynthetic,
            seed: 42,
            probability: 0.3,
        }
    }
}

/// Table export configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    /// Suggested download file name
    pub file_name: String,
    /// Field separator
    pub delimiter: char,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: "atendimentos_export.csv".into(),
            delimiter: ';',
        }
    }
}

/// Initial slider positions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SliderDefaults {
    /// Simulated patients for the binomial panel
    pub trials: u32,
    /// "At least" threshold for the binomial panel
    pub binomial_target: u32,
    /// "At least" threshold for the Poisson panel
    pub poisson_target: u32,
}

impl Default for SliderDefaults {
    fn default() -> Self {
        Self {
            trials: 10,
            binomial_target: 5,
            poisson_target: 3,
        }
    }
}
