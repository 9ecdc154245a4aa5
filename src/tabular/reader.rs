// In: src/tabular/reader.rs

//! Random-access chunk reader over one delimited text file.
//!
//! Opening validates the file, sniffs its encoding and separator, and reads the
//! header. The first call needing the row count makes a single pass over the
//! records and remembers the byte position where every chunk starts, so later
//! `get_chunk` calls seek straight to their window instead of re-scanning.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ByteRecord, Position};
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use once_cell::unsync::OnceCell;

use crate::config::{separator_byte, OutputQuoting, PhonexConfig};
use crate::error::PhonexError;
use crate::tabular::detect::{detect_encoding, detect_separator, is_utf8_stream, SAMPLE_BYTES};
use crate::tabular::row_batch::RowBatch;
use crate::tabular::writer::TabularFormat;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

//==================================================================================
// 1. Options
//==================================================================================

#[derive(Debug, Clone)]
pub struct ReaderOptions {
    /// Forced separator. `None` sniffs it from the first bytes of the file.
    pub separator: Option<u8>,
    /// Forced encoding. `None` sniffs it.
    pub encoding: Option<&'static Encoding>,
    pub chunk_size: usize,
    pub max_file_size: u64,
    pub default_separator: u8,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            separator: None,
            encoding: None,
            chunk_size: 100_000,
            max_file_size: 1024 * 1024 * 1024,
            default_separator: b',',
        }
    }
}

impl ReaderOptions {
    pub fn from_config(config: &PhonexConfig) -> Result<Self, PhonexError> {
        Ok(Self {
            separator: None,
            encoding: None,
            chunk_size: config.chunk_size_rows,
            max_file_size: config.max_file_size_bytes,
            default_separator: separator_byte(config.default_separator)?,
        })
    }

    pub fn with_separator(mut self, separator: Option<u8>) -> Self {
        self.separator = separator;
        self
    }

    pub fn with_encoding(mut self, encoding: Option<&'static Encoding>) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }
}

/// Resolves a WHATWG encoding label such as `"utf-8"` or `"latin1"`.
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding, PhonexError> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| PhonexError::Configuration(format!("unknown encoding label {:?}", label)))
}

//==================================================================================
// 2. The Reader
//==================================================================================

/// Where each chunk starts, computed once per reader.
#[derive(Debug, Clone)]
struct RowIndex {
    total_rows: usize,
    chunk_starts: Vec<Position>,
}

#[derive(Debug)]
pub struct TabularChunkReader {
    filepath: PathBuf,
    separator: u8,
    separator_detected: bool,
    encoding: &'static Encoding,
    headers: Vec<String>,
    chunk_size: usize,
    index: OnceCell<RowIndex>,
}

impl TabularChunkReader {
    pub fn open(path: impl AsRef<Path>, options: &ReaderOptions) -> Result<Self, PhonexError> {
        let filepath = path.as_ref().to_path_buf();
        if options.chunk_size == 0 {
            return Err(PhonexError::Configuration(
                "chunk size must be positive".to_string(),
            ));
        }
        let file_len = validate_file(&filepath, options.max_file_size)?;

        let sample = read_sample(&filepath)?;
        let truncated = file_len > sample.len() as u64;
        let encoding = match options.encoding {
            Some(encoding) => encoding,
            None => sniff_encoding(&filepath, &sample, truncated)?,
        };
        if !encoding.is_ascii_compatible() {
            return Err(PhonexError::structural(
                &filepath,
                format!("encoding {} is not supported", encoding.name()),
            ));
        }

        let (separator, separator_detected) = match options.separator {
            Some(separator) => (separator, false),
            None => {
                let text = decode_sample(&filepath, encoding, &sample, truncated)?;
                (detect_separator(&text, options.default_separator), true)
            }
        };

        let mut reader = Self {
            filepath,
            separator,
            separator_detected,
            encoding,
            headers: Vec::new(),
            chunk_size: options.chunk_size,
            index: OnceCell::new(),
        };
        reader.headers = reader.read_headers()?;

        log::info!(
            "Opened '{}' (separator {:?}{}, encoding {}, {} columns)",
            reader.filepath.display(),
            reader.separator as char,
            if reader.separator_detected { " detected" } else { "" },
            reader.encoding.name(),
            reader.headers.len()
        );
        Ok(reader)
    }

    // --- Accessors ---

    pub fn filepath(&self) -> &Path {
        &self.filepath
    }

    pub fn separator(&self) -> u8 {
        self.separator
    }

    pub fn separator_was_detected(&self) -> bool {
        self.separator_detected
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn column_exists(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// The dialect to use for files derived from this one.
    pub fn format(&self, quoting: OutputQuoting) -> TabularFormat {
        TabularFormat {
            separator: self.separator,
            encoding: self.encoding,
            quoting,
        }
    }

    /// Number of data rows, excluding the header.
    pub fn total_rows(&self) -> Result<usize, PhonexError> {
        Ok(self.index()?.total_rows)
    }

    /// `ceil(total_rows / chunk_size)`; zero for a header-only file.
    pub fn num_chunks(&self) -> Result<usize, PhonexError> {
        Ok(self.index()?.chunk_starts.len())
    }

    // --- Chunk access ---

    /// Rows `[i * chunk_size, min((i + 1) * chunk_size, total_rows))`.
    ///
    /// An index past the end yields an empty batch that still carries the headers.
    pub fn get_chunk(&self, chunk_index: usize) -> Result<RowBatch, PhonexError> {
        let width = self.headers.len();
        let mut rows = Vec::new();
        self.for_each_record(chunk_index, |record, row_number| {
            let mut row = Vec::with_capacity(width);
            for field in record.iter() {
                row.push(self.decode_field(field, row_number)?);
            }
            row.resize(width, String::new());
            rows.push(row);
            Ok(())
        })?;
        Ok(RowBatch::new(self.headers.clone(), rows))
    }

    /// One column of chunk `chunk_index`. An unknown column is a `Schema` error.
    pub fn get_column_chunk(&self, column: &str, chunk_index: usize) -> Result<Vec<String>, PhonexError> {
        let position = self.column_index(column).ok_or_else(|| {
            PhonexError::Schema(format!(
                "column '{}' not found in '{}'",
                column,
                self.filepath.display()
            ))
        })?;
        let mut values = Vec::new();
        self.for_each_record(chunk_index, |record, row_number| {
            let value = match record.get(position) {
                Some(field) => self.decode_field(field, row_number)?,
                None => String::new(),
            };
            values.push(value);
            Ok(())
        })?;
        Ok(values)
    }

    //==============================================================================
    // 3. Internals
    //==============================================================================

    fn csv_reader(&self) -> Result<csv::Reader<File>, PhonexError> {
        let file = File::open(&self.filepath)
            .map_err(|err| PhonexError::structural(&self.filepath, format!("cannot open file: {err}")))?;
        Ok(csv::ReaderBuilder::new()
            .delimiter(self.separator)
            .has_headers(false)
            .flexible(true)
            .from_reader(file))
    }

    fn read_headers(&self) -> Result<Vec<String>, PhonexError> {
        let mut reader = self.csv_reader()?;
        let mut record = ByteRecord::new();
        if !reader
            .read_byte_record(&mut record)
            .map_err(|err| self.csv_error(err))?
        {
            return Err(PhonexError::structural(&self.filepath, "file has no header line"));
        }

        let mut headers = Vec::with_capacity(record.len());
        for (position, field) in record.iter().enumerate() {
            let field = if position == 0 {
                field.strip_prefix(UTF8_BOM).unwrap_or(field)
            } else {
                field
            };
            let mut name = self.decode_field(field, 0)?;
            if position == 0 {
                if let Some(stripped) = name.strip_prefix('\u{feff}') {
                    name = stripped.to_string();
                }
            }
            if headers.contains(&name) {
                return Err(PhonexError::structural(
                    &self.filepath,
                    format!("duplicate column name '{}' in header", name),
                ));
            }
            headers.push(name);
        }
        Ok(headers)
    }

    fn index(&self) -> Result<&RowIndex, PhonexError> {
        self.index.get_or_try_init(|| self.build_index())
    }

    fn build_index(&self) -> Result<RowIndex, PhonexError> {
        let mut reader = self.csv_reader()?;
        let mut record = ByteRecord::new();
        let mut total_rows = 0;
        let mut chunk_starts = Vec::new();

        // Header.
        if !reader
            .read_byte_record(&mut record)
            .map_err(|err| self.csv_error(err))?
        {
            return Ok(RowIndex { total_rows, chunk_starts });
        }

        loop {
            let position = reader.position().clone();
            if !reader
                .read_byte_record(&mut record)
                .map_err(|err| self.csv_error(err))?
            {
                break;
            }
            if total_rows % self.chunk_size == 0 {
                chunk_starts.push(position);
            }
            total_rows += 1;
        }

        log::debug!(
            "Indexed '{}': {} rows in {} chunks of {}",
            self.filepath.display(),
            total_rows,
            chunk_starts.len(),
            self.chunk_size
        );
        Ok(RowIndex { total_rows, chunk_starts })
    }

    /// Feeds every record of one chunk, with its 1-based data row number, to `visit`.
    fn for_each_record<F>(&self, chunk_index: usize, mut visit: F) -> Result<(), PhonexError>
    where
        F: FnMut(&ByteRecord, usize) -> Result<(), PhonexError>,
    {
        let index = self.index()?;
        let Some(start) = index.chunk_starts.get(chunk_index) else {
            return Ok(());
        };
        let first_row = chunk_index * self.chunk_size;
        let expected = self.chunk_size.min(index.total_rows - first_row);

        let mut reader = self.csv_reader()?;
        reader
            .seek(start.clone())
            .map_err(|err| self.csv_error(err))?;

        let mut record = ByteRecord::new();
        let mut seen = 0;
        while seen < expected {
            if !reader
                .read_byte_record(&mut record)
                .map_err(|err| self.csv_error(err))?
            {
                return Err(PhonexError::structural(
                    &self.filepath,
                    "file shrank while it was being read",
                ));
            }
            let row_number = first_row + seen + 1;
            if record.len() > self.headers.len() {
                return Err(PhonexError::structural(
                    &self.filepath,
                    format!(
                        "row {} has {} fields but the header has {}",
                        row_number,
                        record.len(),
                        self.headers.len()
                    ),
                ));
            }
            visit(&record, row_number)?;
            seen += 1;
        }
        Ok(())
    }

    fn decode_field(&self, field: &[u8], row_number: usize) -> Result<String, PhonexError> {
        if self.encoding == UTF_8 {
            return std::str::from_utf8(field).map(str::to_string).map_err(|_| {
                PhonexError::structural(
                    &self.filepath,
                    format!("row {} is not valid UTF-8", row_number),
                )
            });
        }
        self.encoding
            .decode_without_bom_handling_and_without_replacement(field)
            .map(|text| text.into_owned())
            .ok_or_else(|| {
                PhonexError::structural(
                    &self.filepath,
                    format!("row {} cannot be decoded as {}", row_number, self.encoding.name()),
                )
            })
    }

    fn csv_error(&self, err: csv::Error) -> PhonexError {
        PhonexError::structural(&self.filepath, err.to_string())
    }
}

fn validate_file(path: &Path, max_file_size: u64) -> Result<u64, PhonexError> {
    let metadata = fs::metadata(path)
        .map_err(|err| PhonexError::structural(path, format!("cannot access file: {err}")))?;
    if !metadata.is_file() {
        return Err(PhonexError::structural(path, "not a regular file"));
    }
    if metadata.len() == 0 {
        return Err(PhonexError::structural(path, "file is empty"));
    }
    if metadata.len() > max_file_size {
        return Err(PhonexError::structural(
            path,
            format!(
                "file is {} bytes, above the {} byte limit",
                metadata.len(),
                max_file_size
            ),
        ));
    }
    Ok(metadata.len())
}

/// Detects the encoding from the sample, confirming a UTF-8 verdict over the
/// rest of the file when the sample did not cover all of it.
fn sniff_encoding(path: &Path, sample: &[u8], truncated: bool) -> Result<&'static Encoding, PhonexError> {
    let encoding = detect_encoding(sample);
    if encoding != UTF_8 || !truncated || sample.starts_with(UTF8_BOM) {
        return Ok(encoding);
    }
    let file = File::open(path)
        .map_err(|err| PhonexError::structural(path, format!("cannot open file: {err}")))?;
    if is_utf8_stream(file)? {
        Ok(UTF_8)
    } else {
        log::info!(
            "'{}' is not UTF-8 past its first {} bytes, reading it as {}",
            path.display(),
            SAMPLE_BYTES,
            WINDOWS_1252.name()
        );
        Ok(WINDOWS_1252)
    }
}

fn read_sample(path: &Path) -> Result<Vec<u8>, PhonexError> {
    let file = File::open(path)
        .map_err(|err| PhonexError::structural(path, format!("cannot open file: {err}")))?;
    let mut sample = Vec::with_capacity(SAMPLE_BYTES);
    file.take(SAMPLE_BYTES as u64).read_to_end(&mut sample)?;
    Ok(sample)
}

/// Decodes the sample, cutting a truncated one at its last line feed so no
/// multi-byte character or partial line reaches the sniffer.
fn decode_sample(
    path: &Path,
    encoding: &'static Encoding,
    sample: &[u8],
    truncated: bool,
) -> Result<String, PhonexError> {
    let mut bytes = sample;
    if encoding == UTF_8 {
        bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    }
    if truncated {
        if let Some(last_newline) = bytes.iter().rposition(|&byte| byte == b'\n') {
            bytes = &bytes[..last_newline];
        }
    }
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or_else(|| {
            PhonexError::structural(path, format!("content cannot be decoded as {}", encoding.name()))
        })
}
