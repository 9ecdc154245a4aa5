//! An ordered, rectangular set of named string columns.
//!
//! This is the unit exchanged between a transform and the chunk pipeline: the
//! phonetic encoder produces one, `ChunkTransformApplier` splices one into a
//! row batch, and `ColumnInjectionBuilder::inject` patches one into a file.

use crate::error::PhonexError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedColumn {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSet {
    columns: Vec<NamedColumn>,
    num_rows: usize,
}

impl ColumnSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style `push`.
    pub fn with_column(
        mut self,
        name: impl Into<String>,
        values: Vec<String>,
    ) -> Result<Self, PhonexError> {
        self.push(name, values)?;
        Ok(self)
    }

    /// Appends a column. Names must be unique and lengths must agree.
    pub fn push(&mut self, name: impl Into<String>, values: Vec<String>) -> Result<(), PhonexError> {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(PhonexError::Schema(format!("duplicate column '{name}'")));
        }
        if !self.columns.is_empty() && values.len() != self.num_rows {
            return Err(PhonexError::Schema(format!(
                "column '{}' has {} values, expected {}",
                name,
                values.len(),
                self.num_rows
            )));
        }
        self.num_rows = values.len();
        self.columns.push(NamedColumn { name, values });
        Ok(())
    }

    /// Concatenates `other` column-wise after the existing columns.
    pub fn append(&mut self, other: ColumnSet) -> Result<(), PhonexError> {
        for column in other.columns {
            self.push(column.name, column.values)?;
        }
        Ok(())
    }

    /// Replaces every column name, keeping the values in place.
    pub fn rename(&mut self, names: &[String]) -> Result<(), PhonexError> {
        if names.len() != self.columns.len() {
            return Err(PhonexError::Schema(format!(
                "cannot rename {} columns with {} names",
                self.columns.len(),
                names.len()
            )));
        }
        for (column, name) in self.columns.iter_mut().zip(names) {
            column.name = name.clone();
        }
        Ok(())
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|column| column.name.clone()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.columns
            .iter()
            .find(|column| column.name == name)
            .map(|column| column.values.as_slice())
    }

    pub fn columns(&self) -> &[NamedColumn] {
        &self.columns
    }

    /// The cells of row `index`, in column order.
    pub fn row(&self, index: usize) -> impl Iterator<Item = &str> + '_ {
        self.columns
            .iter()
            .map(move |column| column.values[index].as_str())
    }
}
