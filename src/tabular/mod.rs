//! Chunked access to delimited text files.
//!
//! The reader owns a file handle description (path, separator, encoding,
//! headers) and exposes random-access row windows; the writer emits row windows
//! in the same separator and encoding, either creating a file (with header) or
//! appending to it. Everything above this module works on `RowBatch`es and
//! never sees raw bytes.

//==================================================================================
// 1. Module Declarations
//==================================================================================
pub mod detect;
pub mod reader;
pub mod row_batch;
pub mod writer;

//==================================================================================
// 2. Public API Re-exports
//==================================================================================
pub use self::reader::{resolve_encoding, ReaderOptions, TabularChunkReader};
pub use self::row_batch::{spliced_headers, RowBatch};
pub use self::writer::{TabularFormat, TabularWriter, WriteMode};
