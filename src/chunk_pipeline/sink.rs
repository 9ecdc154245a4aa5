//! Chunk-at-a-time output: the first chunk creates the file with its header,
//! every later chunk is appended without one.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PhonexError;
use crate::tabular::{RowBatch, TabularFormat, TabularWriter, WriteMode};

#[derive(Debug)]
pub(crate) struct ChunkSink {
    path: PathBuf,
    format: TabularFormat,
    started: bool,
    rows_written: usize,
}

impl ChunkSink {
    pub(crate) fn new(path: &Path, format: TabularFormat) -> Self {
        Self {
            path: path.to_path_buf(),
            format,
            started: false,
            rows_written: 0,
        }
    }

    pub(crate) fn write(&mut self, batch: &RowBatch) -> Result<(), PhonexError> {
        let mode = if self.started {
            WriteMode::Append
        } else {
            WriteMode::Create
        };
        let mut writer = TabularWriter::open(&self.path, mode, self.format)?;
        // The file exists from here on, even if the write below fails.
        self.started = true;
        writer.write_batch(batch, mode == WriteMode::Create)?;
        let rows = writer.rows_written();
        writer.finish()?;

        self.rows_written += rows;
        log_metric!("event" = "chunk_written", "rows" = rows, "mode" = format!("{:?}", mode));
        Ok(())
    }

    /// True once the output file has been created.
    pub(crate) fn started(&self) -> bool {
        self.started
    }

    pub(crate) fn rows_written(&self) -> usize {
        self.rows_written
    }
}

/// Directory in which a sibling temp file of `path` can be created.
pub(crate) fn staging_dir(path: &Path) -> &Path {
    path.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

/// Renames a fully written temp file over `target`, keeping `target`'s permissions.
pub(crate) fn commit(staging: tempfile::NamedTempFile, target: &Path) -> Result<(), PhonexError> {
    if let Ok(metadata) = fs::metadata(target) {
        fs::set_permissions(staging.path(), metadata.permissions())?;
    }
    staging.persist(target)?;
    Ok(())
}

pub(crate) fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
