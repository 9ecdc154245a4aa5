// In: src/error.rs

//! This module defines the single, unified error type for the entire phonex library.
//! It uses the `thiserror` crate to provide ergonomic, context-aware error handling.

use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PhonexError {
    // =========================================================================
    // === File & Schema Errors (fatal for a job)
    // =========================================================================
    /// The file is missing, empty, oversized, not a regular file or undecodable.
    #[error("Structural error in '{path}': {reason}")]
    Structural { path: String, reason: String },

    /// A requested column is absent, or a column batch is malformed.
    #[error("Schema error: {0}")]
    Schema(String),

    #[error(
        "Injection range [{start_row}, {end_row}) exceeds the {total_rows} data rows of the output file"
    )]
    Range {
        start_row: usize,
        end_row: usize,
        total_rows: usize,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),

    // =========================================================================
    // === Native Boundary Errors
    // =========================================================================
    #[error("Failed to load native library '{path}': {reason}")]
    LibraryLoad { path: String, reason: String },

    #[error("Required native function '{name}' is missing: {reason}")]
    MissingSymbol { name: String, reason: String },

    /// The native encoder returned a null output handle. Nothing was released.
    #[error("Native allocation failed: {0}")]
    NativeAllocation(String),

    #[error("Native output could not be decoded: {0}")]
    NativeDecode(String),

    #[error("Native encoder returned {actual} values for {expected} inputs")]
    NativeOutputMismatch { expected: usize, actual: usize },

    #[error("Invalid encoder input: {0}")]
    InvalidInput(String),

    #[error("Internal logic error (this is a bug): {0}")]
    InternalError(String),

    // =========================================================================
    // === External Error Wrappers (Using #[from] for automatic conversion)
    // =========================================================================
    /// An error originating from the underlying I/O subsystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the CSV writer.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// An error from the Serde JSON library, typically while loading a config or request.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// An error for Python FFI (Foreign Function Interface) operations.
    #[cfg(feature = "python")]
    #[error("FFI operation failed: {0}")]
    FfiError(String), // PyErr doesn't impl Error, so we can't use #[from] here.
}

impl PhonexError {
    pub fn structural(path: &Path, reason: impl Into<String>) -> Self {
        PhonexError::Structural {
            path: path.display().to_string(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// === Manual `From` Implementations ===
// =============================================================================

impl From<tempfile::PersistError> for PhonexError {
    fn from(err: tempfile::PersistError) -> Self {
        PhonexError::Io(err.error)
    }
}

#[cfg(feature = "python")]
impl From<pyo3::PyErr> for PhonexError {
    fn from(err: pyo3::PyErr) -> Self {
        PhonexError::FfiError(err.to_string())
    }
}

#[cfg(feature = "python")]
impl From<PhonexError> for pyo3::PyErr {
    fn from(err: PhonexError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
