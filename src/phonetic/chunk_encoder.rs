// In: src/phonetic/chunk_encoder.rs

//! Turns one window of a source column into its derived phonetic columns.

use std::sync::Arc;

use crate::error::PhonexError;
use crate::phonetic::engine::PhoneticEngine;
use crate::types::{AlgorithmSelection, ColumnSet, DerivedColumnSet};

#[derive(Debug, Clone)]
pub struct PhoneticChunkEncoder {
    engine: Arc<PhoneticEngine>,
    selection: AlgorithmSelection,
    derived: DerivedColumnSet,
    include_source_column: bool,
}

impl PhoneticChunkEncoder {
    /// Fails with `Configuration` when there is nothing to produce, or when an
    /// enabled algorithm has no loaded strategy in `engine`.
    pub fn new(
        engine: Arc<PhoneticEngine>,
        selection: AlgorithmSelection,
        source_column: &str,
        include_source_column: bool,
    ) -> Result<Self, PhonexError> {
        if !selection.any() && !include_source_column {
            return Err(PhonexError::Configuration(
                "no phonetic algorithm enabled and source column not requested".to_string(),
            ));
        }
        if let Some(missing) = selection
            .enabled()
            .find(|algorithm| engine.strategy(*algorithm).is_none())
        {
            return Err(PhonexError::Configuration(format!(
                "{} is enabled but its encoder is not loaded",
                missing
            )));
        }
        Ok(Self {
            engine,
            selection,
            derived: DerivedColumnSet::new(source_column, &selection),
            include_source_column,
        })
    }

    pub fn source_column(&self) -> &str {
        self.derived.source()
    }

    pub fn derived_columns(&self) -> &DerivedColumnSet {
        &self.derived
    }

    /// Names of the columns `encode` emits, in order.
    pub fn output_columns(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.derived.len() + 1);
        if self.include_source_column {
            names.push(self.derived.source().to_string());
        }
        names.extend_from_slice(self.derived.names());
        names
    }

    pub fn encode(&self, chunk: &[String]) -> Result<ColumnSet, PhonexError> {
        let cleaned: Vec<String> = chunk.iter().map(|value| value.trim().to_string()).collect();
        self.encode_cleaned(cleaned)
    }

    /// Like `encode`, with missing values treated as empty strings.
    pub fn encode_optional(&self, chunk: &[Option<String>]) -> Result<ColumnSet, PhonexError> {
        let cleaned: Vec<String> = chunk
            .iter()
            .map(|value| value.as_deref().map(str::trim).unwrap_or_default().to_string())
            .collect();
        self.encode_cleaned(cleaned)
    }

    fn encode_cleaned(&self, cleaned: Vec<String>) -> Result<ColumnSet, PhonexError> {
        let mut columns = ColumnSet::new();
        if cleaned.is_empty() {
            for name in self.output_columns() {
                columns.push(name, Vec::new())?;
            }
            return Ok(columns);
        }

        for algorithm in self.selection.enabled() {
            let names = DerivedColumnSet::names_for(self.derived.source(), algorithm);
            let encoded = self.engine.encode(algorithm, &cleaned)?;
            for (name, values) in names.into_iter().zip(encoded) {
                columns.push(name, values)?;
            }
        }

        if self.include_source_column {
            let mut with_source = ColumnSet::new();
            with_source.push(self.derived.source(), cleaned)?;
            with_source.append(columns)?;
            return Ok(with_source);
        }
        Ok(columns)
    }
}
