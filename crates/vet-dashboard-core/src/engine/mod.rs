//! Distribution engine for the statistical panels.
//!
//! Each analysis estimates a rate from the dataset, builds the mass table of
//! the assumed distribution, and computes the "at least `target`" tail:
//!
//! - [`DistributionEngine::binomial_analysis`]: certificates among `trials` patients
//! - [`DistributionEngine::poisson_analysis`]: respiratory cases in one shift
//!
//! The engine holds only a shared reference to the dataset. Calls are pure:
//! the same dataset and parameters always give the same result.

mod binomial;
mod poisson;
mod statement;
mod tail;

pub use binomial::*;
pub use poisson::*;
pub use statement::*;

use thiserror::Error;

use crate::models::{AnalysisKind, Dataset, DistributionQuery, DistributionResult};

/// Analysis errors. Both are recoverable: the shell reports them inline
/// and keeps accepting input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Computes distribution analyses over a read-only dataset.
pub struct DistributionEngine<'a> {
    dataset: &'a Dataset,
}

impl<'a> DistributionEngine<'a> {
    /// Create an engine over a dataset.
    pub fn new(dataset: &'a Dataset) -> Self {
        Self { dataset }
    }

    /// Run whichever analysis the query names.
    pub fn analyze(&self, query: &DistributionQuery) -> AnalysisResult<DistributionResult> {
        match query.kind {
            AnalysisKind::Binomial => self.binomial_analysis(query.trials, query.target_count),
            AnalysisKind::Poisson => self.poisson_analysis(query.target_count),
        }
    }
}
