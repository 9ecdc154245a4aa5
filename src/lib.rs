//! This file is the root of the `phonex_augment` crate: a chunked CSV
//! augmentation engine that derives phonetic columns through native encoders.
//!
//! Its responsibilities are strictly limited to:
//! 1.  Declaring the top-level modules and the public API re-exports.
//! 2.  Defining the `#[pymodule]` (feature `python`) which acts as the entry
//!     point when the compiled library is imported into Python.

//==================================================================================
// 0. Constants
//==================================================================================
/// The crate version, automatically set from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//==================================================================================
// 1. Module Declarations
//==================================================================================
#[macro_use]
mod observability; // Make macros available throughout the crate

pub mod chunk_pipeline;
pub mod config;
pub mod error;
pub mod native;
pub mod orchestrator;
pub mod phonetic;
pub mod tabular;
pub mod types;

#[cfg(feature = "python")]
mod ffi;

#[cfg(test)]
mod test_support;

// Used by `log_metric!` expansions in downstream crates.
#[doc(hidden)]
pub use log;

pub use crate::chunk_pipeline::{ChunkReport, ChunkTransformApplier, ColumnInjectionBuilder};
pub use crate::config::PhonexConfig;
pub use crate::error::PhonexError;
pub use crate::observability::enable_verbose_logging;
pub use crate::orchestrator::{PhonexCsvModifier, PhoneticFileCreator, PhoneticRequest};
pub use crate::phonetic::{PhoneticChunkEncoder, PhoneticEngine};
pub use crate::tabular::{ReaderOptions, TabularChunkReader};
pub use crate::types::{Algorithm, AlgorithmSelection, ColumnSet, DerivedColumnSet};

//==================================================================================
// 2. Python Module Definition
//==================================================================================
#[cfg(feature = "python")]
use pyo3::prelude::*;

/// The `phonex_augment` Python module.
#[cfg(feature = "python")]
#[pymodule]
fn phonex_augment(_py: Python, m: &PyModule) -> PyResult<()> {
    // --- Column and job entry points ---
    m.add_function(wrap_pyfunction!(ffi::encode_column_py, m)?)?;
    m.add_function(wrap_pyfunction!(ffi::create_phonetic_file_py, m)?)?;
    m.add_function(wrap_pyfunction!(ffi::modify_file_py, m)?)?;

    // --- Expose version string as a module attribute ---
    m.add("__version__", VERSION)?;

    // --- Logging ---
    m.add_function(wrap_pyfunction!(ffi::enable_verbose_logging_py, m)?)?;

    Ok(())
}
