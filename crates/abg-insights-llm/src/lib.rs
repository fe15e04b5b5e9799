//! Language-model side of ABG analysis.
//!
//! This crate builds the analysis prompts, splits a model reply into its
//! interpretation, conditions and treatment sections, and defines the
//! [`TextGenerator`] seam a provider transport plugs into.

pub mod generator;
pub mod prompts;
pub mod sections;

pub use generator::*;
pub use prompts::*;
pub use sections::*;
