//! Domain models for ABG analysis.

mod analysis;
mod assessment;
mod measurement;

pub use analysis::*;
pub use assessment::*;
pub use measurement::*;
