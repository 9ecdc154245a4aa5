//! What a chunk loop did, chunk by chunk.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Why a chunk was not transformed.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    MissingSourceColumn,
    TransformFailed { message: String },
    ColumnCountMismatch { expected: usize, actual: usize },
    RowCountMismatch { expected: usize, actual: usize },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingSourceColumn => write!(f, "source column missing"),
            SkipReason::TransformFailed { message } => write!(f, "transform failed: {message}"),
            SkipReason::ColumnCountMismatch { expected, actual } => {
                write!(f, "transform returned {actual} columns, expected {expected}")
            }
            SkipReason::RowCountMismatch { expected, actual } => {
                write!(f, "transform returned {actual} rows, expected {expected}")
            }
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SkippedChunk {
    pub chunk_index: usize,
    pub reason: SkipReason,
    /// Rows written with their original cells and empty derived cells. Zero
    /// when the chunk was dropped.
    pub rows_passed_through: usize,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkReport {
    pub chunks_total: usize,
    pub chunks_transformed: usize,
    pub chunks_passed_through: usize,
    pub chunks_dropped: usize,
    pub rows_written: usize,
    pub skipped: Vec<SkippedChunk>,
    pub output_path: PathBuf,
}

impl ChunkReport {
    /// True when every chunk went through the transform.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    pub fn skipped_indices(&self) -> Vec<usize> {
        self.skipped.iter().map(|skipped| skipped.chunk_index).collect()
    }

    pub(crate) fn record_skip(&mut self, chunk_index: usize, reason: SkipReason, rows_passed_through: usize) {
        if rows_passed_through > 0 {
            self.chunks_passed_through += 1;
        } else {
            self.chunks_dropped += 1;
        }
        self.skipped.push(SkippedChunk {
            chunk_index,
            reason,
            rows_passed_through,
        });
    }
}
