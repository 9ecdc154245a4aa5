// In: src/chunk_pipeline/injection.rs

//! Placeholder output files filled in by repeated, range-scoped injections.
//!
//! `create` writes the source column followed by empty placeholder columns.
//! Each `inject` call then rewrites the whole output into a sibling temp file,
//! filling only still-empty cells inside its row range, and renames the temp
//! file over the output once the rewrite is complete. Memory stays bounded by
//! one chunk; each call costs one pass over the output file.

use std::fs;
use std::path::PathBuf;

use tempfile::NamedTempFile;

use crate::chunk_pipeline::sink::{commit, same_file, staging_dir, ChunkSink};
use crate::config::OutputQuoting;
use crate::error::PhonexError;
use crate::tabular::{ReaderOptions, RowBatch, TabularChunkReader};
use crate::types::ColumnSet;

pub struct ColumnInjectionBuilder<'r> {
    reader: &'r TabularChunkReader,
    output_path: PathBuf,
    quoting: OutputQuoting,
}

impl<'r> ColumnInjectionBuilder<'r> {
    pub fn new(reader: &'r TabularChunkReader, output_path: impl Into<PathBuf>) -> Self {
        Self {
            reader,
            output_path: output_path.into(),
            quoting: OutputQuoting::default(),
        }
    }

    pub fn with_quoting(mut self, quoting: OutputQuoting) -> Self {
        self.quoting = quoting;
        self
    }

    /// Writes `source_column` plus one empty column per `new_columns` entry,
    /// row for row. Returns the number of data rows written.
    ///
    /// The output may not be the input file. On failure the partial output is
    /// removed.
    pub fn create(&self, source_column: &str, new_columns: &[String]) -> Result<usize, PhonexError> {
        if same_file(&self.output_path, self.reader.filepath()) {
            return Err(PhonexError::Configuration(format!(
                "output '{}' is the input file",
                self.output_path.display()
            )));
        }
        if !self.reader.column_exists(source_column) {
            return Err(PhonexError::Schema(format!(
                "column '{}' not found in '{}'",
                source_column,
                self.reader.filepath().display()
            )));
        }
        let mut headers = Vec::with_capacity(new_columns.len() + 1);
        headers.push(source_column.to_string());
        for name in new_columns {
            if headers.contains(name) {
                return Err(PhonexError::Schema(format!("duplicate output column '{name}'")));
            }
            headers.push(name.clone());
        }

        let mut sink = ChunkSink::new(&self.output_path, self.reader.format(self.quoting));
        let rows = match self.write_placeholders(&mut sink, source_column, headers) {
            Ok(rows) => rows,
            Err(err) => {
                if sink.started() {
                    if let Err(remove_err) = fs::remove_file(&self.output_path) {
                        log::warn!(
                            "Could not remove partial file '{}': {}",
                            self.output_path.display(),
                            remove_err
                        );
                    }
                }
                return Err(err);
            }
        };

        log::info!(
            "Created placeholder file '{}' ({} rows, {} new columns)",
            self.output_path.display(),
            rows,
            new_columns.len()
        );
        Ok(rows)
    }

    fn write_placeholders(
        &self,
        sink: &mut ChunkSink,
        source_column: &str,
        headers: Vec<String>,
    ) -> Result<usize, PhonexError> {
        let width = headers.len();
        let num_chunks = self.reader.num_chunks()?;
        if num_chunks == 0 {
            sink.write(&RowBatch::empty(headers.clone()))?;
        }
        for chunk_index in 0..num_chunks {
            let rows = self
                .reader
                .get_column_chunk(source_column, chunk_index)?
                .into_iter()
                .map(|value| {
                    let mut row = Vec::with_capacity(width);
                    row.push(value);
                    row.resize(width, String::new());
                    row
                })
                .collect();
            sink.write(&RowBatch::new(headers.clone(), rows))?;
        }
        Ok(sink.rows_written())
    }

    /// Fills rows `[start_row, start_row + values.num_rows())` of every column
    /// in `values`, leaving already populated cells untouched.
    ///
    /// Returns the number of cells that changed.
    pub fn inject(&self, values: &ColumnSet, start_row: usize) -> Result<usize, PhonexError> {
        let output = self.open_output()?;
        let total_rows = output.total_rows()?;
        let end_row = start_row
            .checked_add(values.num_rows())
            .filter(|end_row| *end_row <= total_rows)
            .ok_or(PhonexError::Range {
                start_row,
                end_row: start_row.saturating_add(values.num_rows()),
                total_rows,
            })?;

        let mut targets: Vec<(usize, &[String])> = Vec::with_capacity(values.num_columns());
        for column in values.columns() {
            let position = output.column_index(&column.name).ok_or_else(|| {
                PhonexError::Schema(format!(
                    "column '{}' not found in '{}'",
                    column.name,
                    self.output_path.display()
                ))
            })?;
            targets.push((position, column.values.as_slice()));
        }
        if values.num_rows() == 0 || targets.is_empty() {
            return Ok(0);
        }

        let staging = NamedTempFile::new_in(staging_dir(&self.output_path))?;
        let mut sink = ChunkSink::new(staging.path(), output.format(self.quoting));
        let mut changed = 0;

        for chunk_index in 0..output.num_chunks()? {
            let batch = output.get_chunk(chunk_index)?;
            let first_row = chunk_index * output.chunk_size();
            let last_row = first_row + batch.num_rows();
            if last_row <= start_row || first_row >= end_row {
                sink.write(&batch)?;
                continue;
            }

            let (headers, mut rows) = batch.into_parts();
            for (offset, row) in rows.iter_mut().enumerate() {
                let row_number = first_row + offset;
                if row_number < start_row || row_number >= end_row {
                    continue;
                }
                for (position, column_values) in &targets {
                    let cell = &mut row[*position];
                    let value = &column_values[row_number - start_row];
                    if cell.is_empty() && !value.is_empty() {
                        cell.clone_from(value);
                        changed += 1;
                    }
                }
            }
            sink.write(&RowBatch::new(headers, rows))?;
        }

        commit(staging, &self.output_path)?;
        log::debug!(
            "Injected rows [{}, {}) into '{}': {} cells filled",
            start_row,
            end_row,
            self.output_path.display(),
            changed
        );
        Ok(changed)
    }

    /// The output file, read back in the input's dialect.
    fn open_output(&self) -> Result<TabularChunkReader, PhonexError> {
        let options = ReaderOptions {
            separator: Some(self.reader.separator()),
            encoding: Some(self.reader.encoding()),
            chunk_size: self.reader.chunk_size(),
            max_file_size: u64::MAX,
            default_separator: self.reader.separator(),
        };
        TabularChunkReader::open(&self.output_path, &options)
    }
}
