// In: src/orchestrator/file_creator.rs

//! Builds a new file holding the source column and its phonetic codes.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use uuid::Uuid;

use crate::chunk_pipeline::ColumnInjectionBuilder;
use crate::config::PhonexConfig;
use crate::error::PhonexError;
use crate::orchestrator::request::PhoneticRequest;
use crate::phonetic::{PhoneticChunkEncoder, PhoneticEngine};
use crate::tabular::{ReaderOptions, TabularChunkReader};

/// A random `<uuid-v4><extension>` file name.
pub fn generate_filename(extension: &str) -> String {
    format!("{}{}", Uuid::new_v4(), extension)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedFile {
    pub filename: String,
    pub path: PathBuf,
    pub rows: usize,
}

pub struct PhoneticFileCreator {
    request: PhoneticRequest,
    config: Arc<PhonexConfig>,
    engine: Option<Arc<PhoneticEngine>>,
}

impl PhoneticFileCreator {
    pub fn new(request: PhoneticRequest, config: Arc<PhonexConfig>) -> Self {
        Self {
            request,
            config,
            engine: None,
        }
    }

    /// Uses an already loaded engine instead of loading the configured libraries.
    pub fn with_engine(mut self, engine: Arc<PhoneticEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Runs the job. Every failure is logged before being returned.
    pub fn create(&self) -> Result<CreatedFile, PhonexError> {
        self.run().map_err(|err| {
            log::error!(
                "Phonetic file creation from '{}' failed: {}",
                self.request.filepath.display(),
                err
            );
            err
        })
    }

    fn run(&self) -> Result<CreatedFile, PhonexError> {
        let request = &self.request;
        let column = request.column.as_str();

        // 1. Reject what can be rejected before touching the disk.
        request.validate()?;

        // 2. Open the source file and check the column.
        let options = ReaderOptions::from_config(&self.config)?
            .with_separator(request.separator())
            .with_encoding(request.resolved_encoding()?);
        let reader = TabularChunkReader::open(&request.filepath, &options)?;
        if !reader.column_exists(column) {
            return Err(PhonexError::Schema(format!(
                "column '{}' not found in '{}'",
                column,
                request.filepath.display()
            )));
        }

        // 3. Bind the encoders of the selected algorithms.
        let engine = match &self.engine {
            Some(engine) => Arc::clone(engine),
            None => Arc::new(PhoneticEngine::load(&self.config, &request.phonetic)?),
        };
        let encoder = PhoneticChunkEncoder::new(engine, request.phonetic, column, true)?;

        // 4. Build the placeholder file.
        fs::create_dir_all(&self.config.completions_folder)?;
        let filename = request
            .filename
            .clone()
            .unwrap_or_else(|| generate_filename(".csv"));
        let path = self.config.completions_folder.join(&filename);
        let builder = ColumnInjectionBuilder::new(&reader, &path).with_quoting(self.config.output_quoting);
        let rows = builder.create(column, encoder.derived_columns().names())?;

        // 5. Encode chunk by chunk and inject at the running row offset.
        if let Err(err) = self.inject_all(&reader, &encoder, &builder) {
            if let Err(remove_err) = fs::remove_file(&path) {
                log::warn!("Could not remove partial file '{}': {}", path.display(), remove_err);
            }
            return Err(err);
        }

        log_metric!("event" = "phonetic_file_created", "file" = &filename, "rows" = rows);
        log::info!(
            "Created '{}' with {} rows from column '{}'",
            path.display(),
            rows,
            column
        );
        Ok(CreatedFile {
            filename,
            path,
            rows,
        })
    }

    fn inject_all(
        &self,
        reader: &TabularChunkReader,
        encoder: &PhoneticChunkEncoder,
        builder: &ColumnInjectionBuilder<'_>,
    ) -> Result<(), PhonexError> {
        let mut offset = 0;
        for chunk_index in 0..reader.num_chunks()? {
            let chunk = reader.get_column_chunk(encoder.source_column(), chunk_index)?;
            let encoded = encoder.encode(&chunk)?;
            builder.inject(&encoded, offset)?;
            offset += encoded.num_rows();
        }
        Ok(())
    }
}
