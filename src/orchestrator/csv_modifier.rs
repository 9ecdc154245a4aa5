// In: src/orchestrator/csv_modifier.rs

//! Adds phonetic columns to an existing file, in place or next to it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use encoding_rs::Encoding;

use crate::chunk_pipeline::{ChunkReport, ChunkTransformApplier};
use crate::config::PhonexConfig;
use crate::error::PhonexError;
use crate::orchestrator::request::PhoneticRequest;
use crate::phonetic::{PhoneticChunkEncoder, PhoneticEngine};
use crate::tabular::{ReaderOptions, TabularChunkReader};
use crate::types::AlgorithmSelection;

pub struct PhonexCsvModifier {
    filepath: PathBuf,
    separator: Option<u8>,
    encoding: Option<&'static Encoding>,
    source_column: String,
    selection: AlgorithmSelection,
    same_file: bool,
    config: Arc<PhonexConfig>,
    engine: Option<Arc<PhoneticEngine>>,
}

impl PhonexCsvModifier {
    /// A modifier rewriting `filepath` in place. `separator = None` detects it.
    pub fn new(
        filepath: impl Into<PathBuf>,
        separator: Option<u8>,
        source_column: impl Into<String>,
        selection: AlgorithmSelection,
        config: Arc<PhonexConfig>,
    ) -> Self {
        Self {
            filepath: filepath.into(),
            separator,
            encoding: None,
            source_column: source_column.into(),
            selection,
            same_file: true,
            config,
            engine: None,
        }
    }

    pub fn from_request(request: &PhoneticRequest, config: Arc<PhonexConfig>) -> Result<Self, PhonexError> {
        Ok(Self::new(
            request.filepath.clone(),
            request.separator(),
            request.column.clone(),
            request.phonetic,
            config,
        )
        .with_encoding(request.resolved_encoding()?))
    }

    /// `false` writes to `<stem>_modified.csv` next to the input instead.
    pub fn same_file(mut self, same_file: bool) -> Self {
        self.same_file = same_file;
        self
    }

    pub fn with_encoding(mut self, encoding: Option<&'static Encoding>) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_engine(mut self, engine: Arc<PhoneticEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn modified_path(filepath: &Path) -> PathBuf {
        let stem = filepath
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        filepath.with_file_name(format!("{stem}_modified.csv"))
    }

    /// Runs the job and returns the per-chunk report.
    pub fn process(&self) -> Result<ChunkReport, PhonexError> {
        self.run().map_err(|err| {
            log::error!(
                "Phonetic modification of '{}' failed: {}",
                self.filepath.display(),
                err
            );
            err
        })
    }

    fn run(&self) -> Result<ChunkReport, PhonexError> {
        // 1. Something must be produced.
        if !self.selection.any() {
            return Err(PhonexError::Configuration(
                "no phonetic algorithm selected".to_string(),
            ));
        }

        // 2. Open the file and check the source column.
        let options = ReaderOptions::from_config(&self.config)?
            .with_separator(self.separator)
            .with_encoding(self.encoding);
        let reader = TabularChunkReader::open(&self.filepath, &options)?;
        if !reader.column_exists(&self.source_column) {
            return Err(PhonexError::Schema(format!(
                "source column '{}' not found in '{}'",
                self.source_column,
                self.filepath.display()
            )));
        }

        // 3. Bind the encoders; derived columns only, the source stays in place.
        let engine = match &self.engine {
            Some(engine) => Arc::clone(engine),
            None => Arc::new(PhoneticEngine::load(&self.config, &self.selection)?),
        };
        let encoder = PhoneticChunkEncoder::new(engine, self.selection, &self.source_column, false)?;

        // 4. Run the chunk loop.
        let output_path = if self.same_file {
            None
        } else {
            Some(Self::modified_path(reader.filepath()))
        };
        let report = ChunkTransformApplier::new(&reader, self.source_column.as_str())
            .with_output_columns(encoder.output_columns())
            .with_quoting(self.config.output_quoting)
            .process_and_save(|values| encoder.encode(values), output_path.as_deref())?;

        if !report.is_complete() {
            log::warn!(
                "'{}': {} of {} chunks kept without phonetic codes (chunks {:?})",
                report.output_path.display(),
                report.skipped.len(),
                report.chunks_total,
                report.skipped_indices()
            );
        }
        Ok(report)
    }
}
