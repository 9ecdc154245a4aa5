//! In-memory representation of one chunk: the header plus its rows.

use crate::error::PhonexError;
use crate::types::ColumnSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowBatch {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RowBatch {
    /// Every row must already be as wide as `headers`.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn empty(headers: Vec<String>) -> Self {
        Self::new(headers, Vec::new())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Vec<String>>) {
        (self.headers, self.rows)
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// A copy of one column's values, or `None` when the column is absent.
    pub fn column(&self, name: &str) -> Option<Vec<String>> {
        let index = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[index].clone()).collect())
    }

    /// Inserts `columns` immediately after the column at `index`.
    pub fn splice_after(self, index: usize, columns: &ColumnSet) -> Result<Self, PhonexError> {
        if columns.num_rows() != self.rows.len() {
            return Err(PhonexError::Schema(format!(
                "cannot splice {} rows into a batch of {} rows",
                columns.num_rows(),
                self.rows.len()
            )));
        }
        let headers = spliced_headers(&self.headers, index, &columns.names());
        let rows = self
            .rows
            .into_iter()
            .enumerate()
            .map(|(row_index, row)| {
                splice_row(row, index, columns.row(row_index).map(str::to_string))
            })
            .collect();
        Ok(Self { headers, rows })
    }

    /// Inserts empty cells for `names` immediately after the column at `index`.
    pub fn pad_after(self, index: usize, names: &[String]) -> Self {
        let headers = spliced_headers(&self.headers, index, names);
        let rows = self
            .rows
            .into_iter()
            .map(|row| splice_row(row, index, names.iter().map(|_| String::new())))
            .collect();
        Self { headers, rows }
    }
}

/// `headers[..=index] + names + headers[index + 1..]`.
pub fn spliced_headers(headers: &[String], index: usize, names: &[String]) -> Vec<String> {
    let split = (index + 1).min(headers.len());
    let mut spliced = Vec::with_capacity(headers.len() + names.len());
    spliced.extend_from_slice(&headers[..split]);
    spliced.extend_from_slice(names);
    spliced.extend_from_slice(&headers[split..]);
    spliced
}

fn splice_row(
    mut row: Vec<String>,
    index: usize,
    inserted: impl Iterator<Item = String>,
) -> Vec<String> {
    let split = (index + 1).min(row.len());
    let tail = row.split_off(split);
    row.extend(inserted);
    row.extend(tail);
    row
}
