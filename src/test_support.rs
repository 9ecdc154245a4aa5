//! Fixture helpers shared by the unit test modules.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::native::{mock, NativeEncoderBinding};
use crate::phonetic::{
    EncodeOptions, Metaphone3Strategy, MetaphoneStrategy, PhonexStrategy, PhoneticEngine,
    PhoneticStrategy,
};
use crate::tabular::ReaderOptions;

const NAMES: [&str; 6] = ["dupont", "durand", "martin", "bernard", "petit", "leroy"];
const CITIES: [&str; 3] = ["paris", "lyon", "nantes"];

pub(crate) fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    write_bytes(dir, name, content.as_bytes())
}

pub(crate) fn write_bytes(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// `id<sep>name<sep>city` followed by `rows` deterministic data rows.
pub(crate) fn people_csv(rows: usize, separator: char) -> String {
    let mut content = format!("id{separator}name{separator}city\n");
    for i in 0..rows {
        content.push_str(&format!(
            "{i}{separator}{}{separator}{}\n",
            NAMES[i % NAMES.len()],
            CITIES[i % CITIES.len()]
        ));
    }
    content
}

/// Every record of a file, header included.
pub(crate) fn read_records(path: &Path, separator: u8) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(separator)
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .unwrap();
    reader
        .records()
        .map(|record| record.unwrap().iter().map(str::to_string).collect())
        .collect()
}

pub(crate) fn options(chunk_size: usize) -> ReaderOptions {
    ReaderOptions::default().with_chunk_size(chunk_size)
}

pub(crate) fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

/// An engine with all three algorithms bound to the in-process mocks.
pub(crate) fn mock_engine() -> Arc<PhoneticEngine> {
    Arc::new(PhoneticEngine::from_strategies(
        [
            PhoneticStrategy::Soundex(PhonexStrategy::new(NativeEncoderBinding::from_symbols(
                mock::phonex_symbols(),
            ))),
            PhoneticStrategy::Metaphone(MetaphoneStrategy::new(NativeEncoderBinding::from_symbols(
                mock::metaphone_symbols(),
            ))),
            PhoneticStrategy::Metaphone3(Metaphone3Strategy::new(
                NativeEncoderBinding::from_symbols(mock::metaphone3_symbols()),
            )),
        ],
        EncodeOptions::default(),
    ))
}
