// In: src/chunk_pipeline/applier.rs

//! Applies a column transform to every chunk of a file and splices the result
//! in after the source column.
//!
//! Chunks are best-effort: a failing or malformed transform result does not
//! stop the loop. Such a chunk is written with its original cells and empty
//! derived cells, and recorded in the returned `ChunkReport`. Only I/O and
//! structural errors abort.

use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::chunk_pipeline::report::{ChunkReport, SkipReason};
use crate::chunk_pipeline::sink::{commit, same_file, staging_dir, ChunkSink};
use crate::config::OutputQuoting;
use crate::error::PhonexError;
use crate::tabular::{RowBatch, TabularChunkReader};
use crate::types::ColumnSet;

pub struct ChunkTransformApplier<'r> {
    reader: &'r TabularChunkReader,
    source_column: String,
    output_columns: Option<Vec<String>>,
    quoting: OutputQuoting,
}

impl<'r> ChunkTransformApplier<'r> {
    pub fn new(reader: &'r TabularChunkReader, source_column: impl Into<String>) -> Self {
        Self {
            reader,
            source_column: source_column.into(),
            output_columns: None,
            quoting: OutputQuoting::default(),
        }
    }

    /// Declares the derived column names. A transform result with a different
    /// column count is rejected; a matching one is renamed to these names.
    pub fn with_output_columns(mut self, names: Vec<String>) -> Self {
        self.output_columns = Some(names);
        self
    }

    pub fn with_quoting(mut self, quoting: OutputQuoting) -> Self {
        self.quoting = quoting;
        self
    }

    /// Runs `transform` over every chunk and writes the augmented file.
    ///
    /// `output_path = None` (or the input path itself) rewrites the input via a
    /// temp file renamed over it at the end. When no derived names are declared,
    /// the first successful transform fixes them for the rest of the file.
    pub fn process_and_save<F>(&self, mut transform: F, output_path: Option<&Path>) -> Result<ChunkReport, PhonexError>
    where
        F: FnMut(&[String]) -> Result<ColumnSet, PhonexError>,
    {
        let input_path = self.reader.filepath();
        let target: PathBuf = output_path.unwrap_or(input_path).to_path_buf();
        let staging = if same_file(&target, input_path) {
            Some(NamedTempFile::new_in(staging_dir(input_path))?)
        } else {
            None
        };
        let write_path = staging
            .as_ref()
            .map(|file| file.path().to_path_buf())
            .unwrap_or_else(|| target.clone());

        let num_chunks = self.reader.num_chunks()?;
        let mut sink = ChunkSink::new(&write_path, self.reader.format(self.quoting));
        let mut report = ChunkReport {
            chunks_total: num_chunks,
            output_path: target.clone(),
            ..ChunkReport::default()
        };
        let mut derived_names = self.output_columns.clone();
        // Rejected chunks seen before the derived names are known.
        let mut pending: Vec<(usize, SkipReason)> = Vec::new();

        log::info!(
            "Transforming column '{}' of '{}' in {} chunks",
            self.source_column,
            input_path.display(),
            num_chunks
        );

        for chunk_index in 0..num_chunks {
            let batch = self.reader.get_chunk(chunk_index)?;
            let Some(source_index) = batch.column_index(&self.source_column) else {
                log::warn!(
                    "Chunk {}: column '{}' not found, chunk skipped",
                    chunk_index,
                    self.source_column
                );
                report.record_skip(chunk_index, SkipReason::MissingSourceColumn, 0);
                continue;
            };
            let source_values: Vec<String> = batch
                .rows()
                .iter()
                .map(|row| row[source_index].clone())
                .collect();

            let columns = match transform(&source_values) {
                Ok(columns) => self.conform(columns, derived_names.as_deref(), batch.num_rows()),
                Err(err) => Err(SkipReason::TransformFailed {
                    message: err.to_string(),
                }),
            };

            match columns {
                Ok(columns) => {
                    if derived_names.is_none() {
                        derived_names = Some(columns.names());
                        for (pending_index, reason) in pending.drain(..) {
                            self.pass_through(&mut sink, &mut report, pending_index, reason, &columns.names())?;
                        }
                    }
                    sink.write(&batch.splice_after(source_index, &columns)?)?;
                    report.chunks_transformed += 1;
                }
                Err(reason) => {
                    log::warn!("Chunk {}: {}; original rows kept", chunk_index, reason);
                    match derived_names.as_deref() {
                        Some(names) => {
                            let rows = batch.num_rows();
                            sink.write(&batch.pad_after(source_index, names))?;
                            report.record_skip(chunk_index, reason, rows);
                        }
                        None => pending.push((chunk_index, reason)),
                    }
                }
            }
        }

        // Every chunk failed: the file is kept as it was.
        for (pending_index, reason) in pending.drain(..) {
            self.pass_through(&mut sink, &mut report, pending_index, reason, &[])?;
        }

        if !sink.started() {
            if num_chunks > 0 {
                log::warn!(
                    "No chunk of '{}' could be written, output left untouched",
                    input_path.display()
                );
                return Ok(report);
            }
            sink.write(&self.header_only(derived_names.as_deref().unwrap_or(&[])))?;
        }

        if let Some(staging) = staging {
            commit(staging, &target)?;
        }
        report.rows_written = sink.rows_written();
        report.skipped.sort_by_key(|skipped| skipped.chunk_index);

        log::info!(
            "Wrote '{}': {} rows, {}/{} chunks transformed",
            target.display(),
            report.rows_written,
            report.chunks_transformed,
            report.chunks_total
        );
        Ok(report)
    }

    /// Checks a transform result against the expected shape and names it.
    fn conform(
        &self,
        mut columns: ColumnSet,
        expected_names: Option<&[String]>,
        expected_rows: usize,
    ) -> Result<ColumnSet, SkipReason> {
        if let Some(names) = expected_names {
            if columns.num_columns() != names.len() {
                return Err(SkipReason::ColumnCountMismatch {
                    expected: names.len(),
                    actual: columns.num_columns(),
                });
            }
            columns.rename(names).map_err(|err| SkipReason::TransformFailed {
                message: err.to_string(),
            })?;
        }
        if columns.num_rows() != expected_rows {
            return Err(SkipReason::RowCountMismatch {
                expected: expected_rows,
                actual: columns.num_rows(),
            });
        }
        Ok(columns)
    }

    fn pass_through(
        &self,
        sink: &mut ChunkSink,
        report: &mut ChunkReport,
        chunk_index: usize,
        reason: SkipReason,
        names: &[String],
    ) -> Result<(), PhonexError> {
        let batch = self.reader.get_chunk(chunk_index)?;
        let rows = batch.num_rows();
        let source_index = batch.column_index(&self.source_column).ok_or_else(|| {
            PhonexError::InternalError(format!("chunk {chunk_index} lost its source column"))
        })?;
        sink.write(&batch.pad_after(source_index, names))?;
        report.record_skip(chunk_index, reason, rows);
        Ok(())
    }

    fn header_only(&self, names: &[String]) -> RowBatch {
        let batch = RowBatch::empty(self.reader.headers().to_vec());
        match batch.column_index(&self.source_column) {
            Some(source_index) => batch.pad_after(source_index, names),
            None => batch,
        }
    }
}
