//! Domain models for the vet-dashboard system.

mod analysis;
mod visit;

pub use analysis::*;
pub use visit::*;
