// In: src/config.rs

//! The single source of truth for all phonex augmentation settings.
//!
//! `PhonexConfig` is created once at the application boundary (from a JSON
//! file, a JSON string handed over by the request layer, or plain defaults plus
//! environment overrides) and then passed down as a shared, read-only
//! `Arc<PhonexConfig>`.

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::PhonexError;
use crate::types::Algorithm;

//==================================================================================
// I. Core Configuration Enums & Structs
//==================================================================================

/// Quoting discipline for every file this crate writes.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputQuoting {
    /// Quote only fields that contain the separator, a quote or a line break.
    #[default]
    Necessary,
    /// Quote every field.
    Always,
}

impl OutputQuoting {
    pub(crate) fn to_csv(self) -> csv::QuoteStyle {
        match self {
            OutputQuoting::Necessary => csv::QuoteStyle::Necessary,
            OutputQuoting::Always => csv::QuoteStyle::Always,
        }
    }
}

/// Paths of the three native phonetic libraries, one per algorithm.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LibraryPaths {
    #[serde(default = "default_soundex_lib")]
    pub soundex: PathBuf,
    #[serde(default = "default_metaphone_lib")]
    pub metaphone: PathBuf,
    #[serde(default = "default_metaphone3_lib")]
    pub metaphone3: PathBuf,
}

impl LibraryPaths {
    pub fn path_for(&self, algorithm: Algorithm) -> &Path {
        match algorithm {
            Algorithm::Soundex => &self.soundex,
            Algorithm::Metaphone => &self.metaphone,
            Algorithm::Metaphone3 => &self.metaphone3,
        }
    }
}

impl Default for LibraryPaths {
    fn default() -> Self {
        Self {
            soundex: default_soundex_lib(),
            metaphone: default_metaphone_lib(),
            metaphone3: default_metaphone3_lib(),
        }
    }
}

/// Arguments forwarded to every native encode call.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EncoderSettings {
    /// Joins batch inputs and splits native outputs. Must be a single ASCII byte.
    #[serde(default = "default_encoder_separator")]
    pub separator: char,

    /// Maximum length of one phonetic code.
    #[serde(default = "default_max_length")]
    pub max_length: usize,

    #[serde(default)]
    pub metaphone3_encode_vowels: bool,

    #[serde(default = "default_true")]
    pub metaphone3_encode_exact: bool,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            separator: default_encoder_separator(),
            max_length: default_max_length(),
            metaphone3_encode_vowels: false,
            metaphone3_encode_exact: true,
        }
    }
}

//==================================================================================
// II. The Unified PhonexConfig
//==================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct PhonexConfig {
    /// **The number of data rows per chunk.** Every reader, writer and
    /// injection pass works on windows of at most this many rows.
    #[serde(default = "default_chunk_size_rows")]
    pub chunk_size_rows: usize,

    /// Files larger than this are rejected before any read.
    #[serde(default = "default_max_file_size_bytes")]
    pub max_file_size_bytes: u64,

    /// Used when separator sniffing finds no candidate in the sample.
    #[serde(default = "default_separator")]
    pub default_separator: char,

    /// Folder receiving the files built by `PhoneticFileCreator`.
    #[serde(default = "default_completions_folder")]
    pub completions_folder: PathBuf,

    #[serde(default)]
    pub output_quoting: OutputQuoting,

    #[serde(default)]
    pub libraries: LibraryPaths,

    #[serde(default)]
    pub encoder: EncoderSettings,
}

impl Default for PhonexConfig {
    fn default() -> Self {
        Self {
            chunk_size_rows: default_chunk_size_rows(),
            max_file_size_bytes: default_max_file_size_bytes(),
            default_separator: default_separator(),
            completions_folder: default_completions_folder(),
            output_quoting: OutputQuoting::default(),
            libraries: LibraryPaths::default(),
            encoder: EncoderSettings::default(),
        }
    }
}

impl PhonexConfig {
    /// Parses a JSON document; absent fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, PhonexError> {
        let config: PhonexConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, PhonexError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Applies the environment variables understood by the deployment scripts.
    pub fn with_env_overrides(mut self) -> Result<Self, PhonexError> {
        if let Some(value) = env_var("FILE_CHUNK_SIZE") {
            self.chunk_size_rows = parse_env("FILE_CHUNK_SIZE", &value)?;
        }
        if let Some(value) = env_var("MAX_CSV_FILE_SIZE") {
            self.max_file_size_bytes = parse_env("MAX_CSV_FILE_SIZE", &value)?;
        }
        if let Some(value) = env_var("DEFAULT_SEP") {
            self.default_separator = parse_env("DEFAULT_SEP", &value)?;
        }
        if let Some(value) = env_var("COMPLETIONS_FOLDER") {
            self.completions_folder = PathBuf::from(value);
        }
        if let Some(value) = env_var("PHONEX_LIB_SOUNDEX") {
            self.libraries.soundex = PathBuf::from(value);
        }
        if let Some(value) = env_var("PHONEX_LIB_METAPHONE") {
            self.libraries.metaphone = PathBuf::from(value);
        }
        if let Some(value) = env_var("PHONEX_LIB_METAPHONE3") {
            self.libraries.metaphone3 = PathBuf::from(value);
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), PhonexError> {
        if self.chunk_size_rows == 0 {
            return Err(PhonexError::Configuration(
                "chunk_size_rows must be positive".to_string(),
            ));
        }
        separator_byte(self.default_separator)?;
        separator_byte(self.encoder.separator)?;
        if self.encoder.max_length == 0 {
            return Err(PhonexError::Configuration(
                "encoder.max_length must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Converts a separator character into the single byte the CSV layer expects.
pub fn separator_byte(separator: char) -> Result<u8, PhonexError> {
    if separator.is_ascii() && separator != '\0' && separator != '\n' && separator != '\r' {
        Ok(separator as u8)
    } else {
        Err(PhonexError::Configuration(format!(
            "separator {:?} must be a single printable ASCII character",
            separator
        )))
    }
}

fn env_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, PhonexError> {
    value.trim().parse().map_err(|_| {
        PhonexError::Configuration(format!("environment variable {key}={value:?} is invalid"))
    })
}

/// Helper for `serde` to default a boolean field to true.
fn default_true() -> bool {
    true
}

fn default_chunk_size_rows() -> usize {
    100_000
}

fn default_max_file_size_bytes() -> u64 {
    1024 * 1024 * 1024
}

fn default_separator() -> char {
    ','
}

fn default_encoder_separator() -> char {
    '|'
}

fn default_max_length() -> usize {
    8
}

fn default_completions_folder() -> PathBuf {
    PathBuf::from("files").join("completions")
}

fn default_library(name: &str) -> PathBuf {
    PathBuf::from("lib").join(libloading::library_filename(name))
}

fn default_soundex_lib() -> PathBuf {
    default_library("phonex")
}

fn default_metaphone_lib() -> PathBuf {
    default_library("metaphone")
}

fn default_metaphone3_lib() -> PathBuf {
    default_library("metaphone3")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = PhonexConfig::from_json_str(
            r#"{"chunk_size_rows": 500, "encoder": {"max_length": 6}}"#,
        )
        .unwrap();
        assert_eq!(config.chunk_size_rows, 500);
        assert_eq!(config.encoder.max_length, 6);
        assert_eq!(config.encoder.separator, '|');
        assert!(config.encoder.metaphone3_encode_exact);
        assert!(!config.encoder.metaphone3_encode_vowels);
        assert_eq!(config.default_separator, ',');
        assert_eq!(config.output_quoting, OutputQuoting::Necessary);
    }

    #[test]
    fn test_zero_chunk_size_is_rejected() {
        let result = PhonexConfig::from_json_str(r#"{"chunk_size_rows": 0}"#);
        assert!(matches!(result, Err(PhonexError::Configuration(_))));
    }

    #[test]
    fn test_non_ascii_separator_is_rejected() {
        let result = PhonexConfig::from_json_str(r#"{"default_separator": "é"}"#);
        assert!(matches!(result, Err(PhonexError::Configuration(_))));
    }

    #[test]
    fn test_library_paths_resolve_per_algorithm() {
        let libraries = LibraryPaths {
            soundex: PathBuf::from("a.so"),
            metaphone: PathBuf::from("b.so"),
            metaphone3: PathBuf::from("c.so"),
        };
        assert_eq!(libraries.path_for(Algorithm::Metaphone), Path::new("b.so"));
        assert_eq!(libraries.path_for(Algorithm::Metaphone3), Path::new("c.so"));
    }
}
