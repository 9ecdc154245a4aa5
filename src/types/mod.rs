//! This module defines the core, strongly-typed data representations shared by
//! the reader, the encoders and the chunk pipeline.
//!
//! It includes the closed set of phonetic `Algorithm` ids, the per-job
//! `AlgorithmSelection`, the deterministic `DerivedColumnSet` naming scheme and
//! the `ColumnSet` used to carry computed columns between components.

pub mod algorithm;
pub mod column_set;

// Re-export the main type(s) for easier access.
pub use algorithm::{Algorithm, AlgorithmSelection, DerivedColumnSet};
pub use column_set::{ColumnSet, NamedColumn};
