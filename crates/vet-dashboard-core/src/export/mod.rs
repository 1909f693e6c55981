//! Export of the normalized visit table.

mod table;

pub use table::*;
