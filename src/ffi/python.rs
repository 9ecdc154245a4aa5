// In: src/ffi/python.rs

//! The functions the Python request layer calls.
//!
//! Job functions keep the request layer's contract: a filename (or a report)
//! on success and `False` on any failure, with the failure logged. Only
//! malformed arguments raise.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::chunk_pipeline::ChunkReport;
use crate::config::PhonexConfig;
use crate::error::PhonexError;
use crate::observability;
use crate::orchestrator::{normalize_separator, PhonexCsvModifier, PhoneticFileCreator, PhoneticRequest};
use crate::phonetic::{PhoneticChunkEncoder, PhoneticEngine};
use crate::types::AlgorithmSelection;

/// Defaults (or the given JSON) with the deployment's environment overrides applied.
fn load_config(config_json: Option<&str>) -> Result<PhonexConfig, PhonexError> {
    let config = match config_json {
        Some(json) => PhonexConfig::from_json_str(json)?,
        None => PhonexConfig::default(),
    };
    config.with_env_overrides()
}

fn report_to_dict(py: Python, report: &ChunkReport) -> PyResult<PyObject> {
    let dict = PyDict::new(py);
    dict.set_item("chunks_total", report.chunks_total)?;
    dict.set_item("chunks_transformed", report.chunks_transformed)?;
    dict.set_item("chunks_passed_through", report.chunks_passed_through)?;
    dict.set_item("chunks_dropped", report.chunks_dropped)?;
    dict.set_item("rows_written", report.rows_written)?;
    dict.set_item("output_path", report.output_path.display().to_string())?;

    let skipped = PyList::empty(py);
    for chunk in &report.skipped {
        let entry = PyDict::new(py);
        entry.set_item("chunk_index", chunk.chunk_index)?;
        entry.set_item("reason", chunk.reason.to_string())?;
        entry.set_item("rows_passed_through", chunk.rows_passed_through)?;
        skipped.append(entry)?;
    }
    dict.set_item("skipped", skipped)?;
    Ok(dict.to_object(py))
}

//==================================================================================
// I. Column-Level API
//==================================================================================

/// Encodes one column of values and returns `{column_name: [codes...]}`.
///
/// `None` values are treated as empty strings.
#[pyfunction]
#[pyo3(
    name = "encode_column",
    signature = (values, algorithms, source_column = "value", include_source_column = false, config_json = None)
)]
pub fn encode_column_py(
    py: Python,
    values: Vec<Option<String>>,
    algorithms: HashMap<String, bool>,
    source_column: &str,
    include_source_column: bool,
    config_json: Option<&str>,
) -> PyResult<PyObject> {
    let config = load_config(config_json)?;
    let selection = AlgorithmSelection::from_map(&algorithms);

    let columns = py.allow_threads(|| {
        let engine = Arc::new(PhoneticEngine::load(&config, &selection)?);
        let encoder = PhoneticChunkEncoder::new(engine, selection, source_column, include_source_column)?;
        encoder.encode_optional(&values)
    })?;

    let dict = PyDict::new(py);
    for column in columns.columns() {
        dict.set_item(&column.name, &column.values)?;
    }
    Ok(dict.to_object(py))
}

//==================================================================================
// II. Job-Level API
//==================================================================================

/// Runs a `PhoneticFileCreator` job described by a JSON request.
///
/// Returns the created file name, or `False` on failure.
#[pyfunction]
#[pyo3(name = "create_phonetic_file", signature = (request_json, config_json = None))]
pub fn create_phonetic_file_py(py: Python, request_json: &str, config_json: Option<&str>) -> PyResult<PyObject> {
    let prepared = load_config(config_json).and_then(|config| {
        let request = PhoneticRequest::from_json_str(request_json)?;
        Ok((request, Arc::new(config)))
    });
    let (request, config) = match prepared {
        Ok(prepared) => prepared,
        Err(err) => {
            log::error!("Invalid phonetic file request: {}", err);
            return Ok(false.into_py(py));
        }
    };

    // The creator logs its own failures.
    match py.allow_threads(|| PhoneticFileCreator::new(request, config).create()) {
        Ok(created) => Ok(created.filename.into_py(py)),
        Err(_) => Ok(false.into_py(py)),
    }
}

/// Adds phonetic columns to `filepath`, in place or into `<stem>_modified.csv`.
///
/// Returns the chunk report as a dict, or `False` on failure.
#[pyfunction]
#[pyo3(
    name = "modify_file",
    signature = (filepath, column, algorithms, sep = None, same_file = true, config_json = None)
)]
pub fn modify_file_py(
    py: Python,
    filepath: PathBuf,
    column: String,
    algorithms: HashMap<String, bool>,
    sep: Option<&str>,
    same_file: bool,
    config_json: Option<&str>,
) -> PyResult<PyObject> {
    let config = match load_config(config_json) {
        Ok(config) => Arc::new(config),
        Err(err) => {
            log::error!("Invalid phonex configuration: {}", err);
            return Ok(false.into_py(py));
        }
    };
    let modifier = PhonexCsvModifier::new(
        filepath,
        normalize_separator(sep),
        column,
        AlgorithmSelection::from_map(&algorithms),
        config,
    )
    .same_file(same_file);

    match py.allow_threads(|| modifier.process()) {
        Ok(report) => report_to_dict(py, &report),
        Err(_) => Ok(false.into_py(py)),
    }
}

//==================================================================================
// III. Diagnostics
//==================================================================================

/// Turns on `[LEVEL] message` logging to stderr, or to `log_file` when given.
#[pyfunction]
#[pyo3(name = "enable_verbose_logging", signature = (log_file = None))]
pub fn enable_verbose_logging_py(log_file: Option<PathBuf>) -> PyResult<()> {
    observability::enable_verbose_logging(log_file.as_deref())?;
    Ok(())
}
