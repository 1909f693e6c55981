//! Vet-Dashboard Core Library
//!
//! Clinic visit dashboard: descriptive summaries plus binomial and Poisson
//! "at least k" explorers driven by rates estimated from the visit sheet.
//!
//! # Architecture
//!
//! ```text
//!   Visit sheet (;-separated, Latin-1)
//!            │
//!       [loader] decode → resolve headers → normalize cells → symptom flags
//!            │
//!     Arc<Dataset>  (immutable, shared read-only)
//!            │
//!     ┌──────┼─────────────────────┬──────────────────┐
//!     ▼      ▼                     ▼                  ▼
//!  summary  engine::binomial   engine::poisson    export
//!  cards    P(X >= k), n, p    P(X >= k), λ       CSV + BOM
//! ```
//!
//! Every interaction is a plain function call over the shared dataset.
//! Nothing is recomputed behind the caller's back and nothing is mutated
//! after load.
//!
//! # Modules
//!
//! - [`config`]: TOML configuration
//! - [`models`]: Domain types (VisitRecord, Dataset, DistributionResult, etc.)
//! - [`loader`]: Sheet loading, locale vocabulary, synthetic symptom flags
//! - [`summary`]: Metric cards, category counts, age histogram
//! - [`engine`]: Binomial and Poisson analyses
//! - [`export`]: Table export

pub mod config;
pub mod engine;
pub mod export;
pub mod loader;
pub mod models;
pub mod summary;

// Re-export commonly used types
pub use config::DashboardConfig;
pub use engine::{AnalysisError, DistributionEngine, ProbabilityStatement};
pub use export::{ExportFile, TableExporter};
pub use loader::{LoadReport, LoadedDataset, Loader, LoaderOptions, MalformedRecord};
pub use models::{
    AnalysisKind, CategoryField, Dataset, DistributionQuery, DistributionResult, MassPoint,
    VisitRecord,
};
pub use summary::{AgeHistogram, CategoryCounts, DashboardSummary};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::path::Path;
use std::sync::Arc;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum DashboardError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Load error: {0}")]
    LoadError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Export error: {0}")]
    ExportError(String),
}

impl From<engine::AnalysisError> for DashboardError {
    fn from(e: engine::AnalysisError) -> Self {
        match e {
            engine::AnalysisError::InvalidParameter(msg) => DashboardError::InvalidParameter(msg),
            engine::AnalysisError::InsufficientData(msg) => DashboardError::InsufficientData(msg),
        }
    }
}

impl From<loader::LoadError> for DashboardError {
    fn from(e: loader::LoadError) -> Self {
        DashboardError::LoadError(e.to_string())
    }
}

impl From<config::ConfigError> for DashboardError {
    fn from(e: config::ConfigError) -> Self {
        DashboardError::ConfigError(e.to_string())
    }
}

impl From<export::ExportError> for DashboardError {
    fn from(e: export::ExportError) -> Self {
        DashboardError::ExportError(e.to_string())
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Load the visit sheet at `path` with the default configuration.
#[uniffi::export]
pub fn open_dashboard(path: String) -> Result<Arc<DashboardCore>, DashboardError> {
    DashboardCore::open(&path, DashboardConfig::default()).map(Arc::new)
}

/// Load the visit sheet at `path` with a TOML configuration document.
#[uniffi::export]
pub fn open_dashboard_with_config(
    path: String,
    config_toml: String,
) -> Result<Arc<DashboardCore>, DashboardError> {
    let config = DashboardConfig::from_toml_str(&config_toml)?;
    DashboardCore::open(&path, config).map(Arc::new)
}

// =========================================================================
// Main API Object
// =========================================================================

/// A loaded dashboard. Read-only after construction, so it is safe to
/// share across threads without locking.
#[derive(uniffi::Object)]
pub struct DashboardCore {
    dataset: Arc<Dataset>,
    report: LoadReport,
    config: DashboardConfig,
}

impl DashboardCore {
    /// Load a sheet from disk.
    pub fn open<P: AsRef<Path>>(path: P, config: DashboardConfig) -> Result<Self, DashboardError> {
        let loader = Loader::new(LoaderOptions::from_config(&config)?);
        let LoadedDataset { dataset, report } = loader.load_path(path)?;
        Ok(Self {
            dataset: Arc::new(dataset),
            report,
            config,
        })
    }

    /// Wrap an already-built dataset.
    pub fn from_loaded(loaded: LoadedDataset, config: DashboardConfig) -> Self {
        Self {
            dataset: Arc::new(loaded.dataset),
            report: loaded.report,
            config,
        }
    }

    /// Shared handle to the dataset.
    pub fn dataset(&self) -> Arc<Dataset> {
        Arc::clone(&self.dataset)
    }

    /// Load report.
    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    /// Active configuration.
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }
}

#[uniffi::export]
impl DashboardCore {
    // =========================================================================
    // Summary Operations
    // =========================================================================

    /// Headline metric cards.
    pub fn summary(&self) -> FfiSummary {
        DashboardSummary::from_dataset(&self.dataset).into()
    }

    /// Visit counts for a category, in chart order.
    pub fn category_counts(&self, field: FfiCategoryField) -> Vec<FfiCategoryCount> {
        CategoryCounts::from_dataset(&self.dataset, field.into())
            .counts
            .into_iter()
            .map(|c| c.into())
            .collect()
    }

    /// Age histogram of respiratory cases.
    pub fn respiratory_age_histogram(&self) -> Vec<FfiHistogramBin> {
        AgeHistogram::respiratory_cases(&self.dataset)
            .bins
            .into_iter()
            .map(|b| b.into())
            .collect()
    }

    /// Cells coerced to unknown during load, as messages.
    pub fn load_issues(&self) -> Vec<String> {
        self.report.issues.iter().map(|i| i.to_string()).collect()
    }

    // =========================================================================
    // Analysis Operations
    // =========================================================================

    /// Binomial panel.
    pub fn binomial_analysis(
        &self,
        trials: u32,
        target_count: u32,
    ) -> Result<FfiDistributionResult, DashboardError> {
        let engine = DistributionEngine::new(&self.dataset);
        let result = engine.binomial_analysis(trials, target_count)?;
        let statement = ProbabilityStatement::binomial(&result, trials);
        Ok(FfiDistributionResult::new(result, statement))
    }

    /// Poisson panel.
    pub fn poisson_analysis(
        &self,
        target_count: u32,
    ) -> Result<FfiDistributionResult, DashboardError> {
        let engine = DistributionEngine::new(&self.dataset);
        let result = engine.poisson_analysis(target_count)?;
        let statement = ProbabilityStatement::poisson(&result);
        Ok(FfiDistributionResult::new(result, statement))
    }

    // =========================================================================
    // Export Operations
    // =========================================================================

    /// Export the full table.
    pub fn export_csv(&self) -> Result<FfiExportFile, DashboardError> {
        let exporter = TableExporter::with_config(&self.dataset, &self.config.export)?;
        Ok(exporter.export()?.into())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe category selector.
#[derive(Debug, Clone, Copy, uniffi::Enum)]
pub enum FfiCategoryField {
    Doctor,
    Gender,
    Shift,
}

impl From<FfiCategoryField> for CategoryField {
    fn from(field: FfiCategoryField) -> Self {
        match field {
            FfiCategoryField::Doctor => CategoryField::Doctor,
            FfiCategoryField::Gender => CategoryField::Gender,
            FfiCategoryField::Shift => CategoryField::Shift,
        }
    }
}

/// FFI-safe metric cards.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSummary {
    pub visits: u64,
    pub mean_age: Option<f64>,
    pub certificates_issued: u64,
    pub respiratory_cases: u64,
}

impl From<DashboardSummary> for FfiSummary {
    fn from(summary: DashboardSummary) -> Self {
        Self {
            visits: summary.visits as u64,
            mean_age: summary.mean_age,
            certificates_issued: summary.certificates_issued as u64,
            respiratory_cases: summary.respiratory_cases as u64,
        }
    }
}

/// FFI-safe category count.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCategoryCount {
    pub value: String,
    pub count: u64,
}

impl From<summary::CategoryCount> for FfiCategoryCount {
    fn from(count: summary::CategoryCount) -> Self {
        Self {
            value: count.value,
            count: count.count as u64,
        }
    }
}

/// FFI-safe histogram bin.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiHistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: u64,
}

impl From<summary::HistogramBin> for FfiHistogramBin {
    fn from(bin: summary::HistogramBin) -> Self {
        Self {
            lower: bin.lower,
            upper: bin.upper,
            count: bin.count as u64,
        }
    }
}

/// FFI-safe mass point.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMassPoint {
    pub outcome: u32,
    pub probability: f64,
    pub highlighted: bool,
}

impl From<MassPoint> for FfiMassPoint {
    fn from(point: MassPoint) -> Self {
        Self {
            outcome: point.outcome,
            probability: point.probability,
            highlighted: point.highlighted,
        }
    }
}

/// FFI-safe analysis result with its rendered statement.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDistributionResult {
    pub kind: String,
    pub target_count: u32,
    pub probability_mass: Vec<FfiMassPoint>,
    pub tail_probability: f64,
    pub empirical_rate: f64,
    pub probability_text: String,
    pub statement: Vec<String>,
}

impl FfiDistributionResult {
    fn new(result: DistributionResult, statement: ProbabilityStatement) -> Self {
        Self {
            kind: format!("{:?}", result.kind),
            target_count: result.target_count,
            probability_mass: result.probability_mass.into_iter().map(|p| p.into()).collect(),
            tail_probability: result.tail_probability,
            empirical_rate: result.empirical_rate,
            probability_text: statement.probability_text,
            statement: statement.lines,
        }
    }
}

/// FFI-safe export file.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiExportFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub row_count: u64,
    pub sha256: String,
    pub exported_at: String,
}

impl From<ExportFile> for FfiExportFile {
    fn from(file: ExportFile) -> Self {
        Self {
            file_name: file.file_name,
            bytes: file.bytes,
            row_count: file.row_count as u64,
            sha256: file.sha256,
            exported_at: file.exported_at,
        }
    }
}
