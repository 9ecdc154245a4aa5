//! Emits row windows in a file's separator and encoding.

use std::borrow::Cow;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use encoding_rs::{Encoding, UTF_8};

use crate::config::OutputQuoting;
use crate::error::PhonexError;
use crate::tabular::row_batch::RowBatch;

/// Whether a write starts a new file (header included) or extends one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Create,
    Append,
}

/// The dialect every output file shares with the file it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabularFormat {
    pub separator: u8,
    pub encoding: &'static Encoding,
    pub quoting: OutputQuoting,
}

impl TabularFormat {
    pub fn utf8(separator: u8) -> Self {
        Self {
            separator,
            encoding: UTF_8,
            quoting: OutputQuoting::default(),
        }
    }

    pub fn with_quoting(mut self, quoting: OutputQuoting) -> Self {
        self.quoting = quoting;
        self
    }
}

pub struct TabularWriter<W: Write> {
    inner: csv::Writer<W>,
    encoding: &'static Encoding,
    target: PathBuf,
    rows_written: usize,
}

impl TabularWriter<File> {
    /// `Create` truncates, `Append` requires the file to already exist.
    pub fn open(path: &Path, mode: WriteMode, format: TabularFormat) -> Result<Self, PhonexError> {
        let file = match mode {
            WriteMode::Create => File::create(path)?,
            WriteMode::Append => OpenOptions::new().append(true).open(path)?,
        };
        let mut writer = Self::from_writer(file, format);
        writer.target = path.to_path_buf();
        Ok(writer)
    }
}

impl<W: Write> TabularWriter<W> {
    pub fn from_writer(writer: W, format: TabularFormat) -> Self {
        let inner = csv::WriterBuilder::new()
            .delimiter(format.separator)
            .quote_style(format.quoting.to_csv())
            .terminator(csv::Terminator::Any(b'\n'))
            .has_headers(false)
            .from_writer(writer);
        Self {
            inner,
            encoding: format.encoding,
            target: PathBuf::from("<stream>"),
            rows_written: 0,
        }
    }

    pub fn write_row<S: AsRef<str>>(&mut self, fields: &[S]) -> Result<(), PhonexError> {
        let encoded = fields
            .iter()
            .map(|field| self.encode_field(field.as_ref()))
            .collect::<Result<Vec<Cow<'_, [u8]>>, PhonexError>>()?;
        self.inner.write_record(&encoded)?;
        Ok(())
    }

    /// Writes the batch rows, preceded by its header when `include_header` is set.
    pub fn write_batch(&mut self, batch: &RowBatch, include_header: bool) -> Result<(), PhonexError> {
        if include_header {
            self.write_row(batch.headers())?;
        }
        for row in batch.rows() {
            self.write_row(row)?;
            self.rows_written += 1;
        }
        Ok(())
    }

    /// Data rows written through `write_batch` so far.
    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flushes everything and returns the underlying writer.
    pub fn finish(self) -> Result<W, PhonexError> {
        self.inner
            .into_inner()
            .map_err(|err| PhonexError::Io(std::io::Error::new(err.error().kind(), err.to_string())))
    }

    fn encode_field<'a>(&self, field: &'a str) -> Result<Cow<'a, [u8]>, PhonexError> {
        if self.encoding == UTF_8 {
            return Ok(Cow::Borrowed(field.as_bytes()));
        }
        let (bytes, _, unmappable) = self.encoding.encode(field);
        if unmappable {
            return Err(PhonexError::structural(
                &self.target,
                format!("value {:?} cannot be represented in {}", field, self.encoding.name()),
            ));
        }
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::WINDOWS_1252;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_write_batch_with_header_and_lf_terminator() {
        let batch = RowBatch::new(
            strings(&["id", "name"]),
            vec![strings(&["1", "Dupont; Jean"]), strings(&["2", ""])],
        );
        let mut writer = TabularWriter::from_writer(Vec::new(), TabularFormat::utf8(b';'));
        writer.write_batch(&batch, true).unwrap();
        assert_eq!(writer.rows_written(), 2);
        let bytes = writer.finish().unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "id;name\n1;\"Dupont; Jean\"\n2;\n");
    }

    #[test]
    fn test_quote_all() {
        let format = TabularFormat::utf8(b',').with_quoting(OutputQuoting::Always);
        let mut writer = TabularWriter::from_writer(Vec::new(), format);
        writer.write_row(&["a", "b"]).unwrap();
        let bytes = writer.finish().unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "\"a\",\"b\"\n");
    }

    #[test]
    fn test_non_utf8_encoding_round_trips_bytes() {
        let format = TabularFormat {
            separator: b',',
            encoding: WINDOWS_1252,
            quoting: OutputQuoting::Necessary,
        };
        let mut writer = TabularWriter::from_writer(Vec::new(), format);
        writer.write_row(&["Hélène"]).unwrap();
        assert_eq!(writer.finish().unwrap(), b"H\xe9l\xe8ne\n".to_vec());
    }

    #[test]
    fn test_unmappable_value_is_rejected() {
        let format = TabularFormat {
            separator: b',',
            encoding: WINDOWS_1252,
            quoting: OutputQuoting::Necessary,
        };
        let mut writer = TabularWriter::from_writer(Vec::new(), format);
        assert!(matches!(
            writer.write_row(&["日本"]),
            Err(PhonexError::Structural { .. })
        ));
    }

    #[test]
    fn test_append_requires_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.csv");
        let result = TabularWriter::open(&path, WriteMode::Append, TabularFormat::utf8(b','));
        assert!(matches!(result, Err(PhonexError::Io(_))));
    }
}
