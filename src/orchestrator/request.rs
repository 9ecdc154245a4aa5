// In: src/orchestrator/request.rs

//! The job request handed over by the request layer.

use std::path::{Path, PathBuf};

use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};

use crate::error::PhonexError;
use crate::tabular::resolve_encoding;
use crate::types::AlgorithmSelection;

/// Separators a request may name. Anything else means "detect it".
pub const VALID_SEPARATORS: [&str; 6] = [",", ", ", ";", "; ", "\t", "|"];

/// Maps a request separator to its single byte, or `None` for auto-detection.
pub fn normalize_separator(separator: Option<&str>) -> Option<u8> {
    separator
        .filter(|separator| VALID_SEPARATORS.contains(separator))
        .and_then(|separator| separator.trim_matches(' ').bytes().next())
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PhoneticRequest {
    pub filepath: PathBuf,
    pub column: String,
    pub phonetic: AlgorithmSelection,
    pub sep: Option<String>,
    /// Name of the created file inside the completions folder.
    pub filename: Option<String>,
    /// WHATWG label such as `"utf-8"` or `"latin1"`.
    pub encoding: Option<String>,
}

impl PhoneticRequest {
    pub fn from_json_str(json: &str) -> Result<Self, PhonexError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Checks everything that can be checked without touching the disk.
    pub fn validate(&self) -> Result<(), PhonexError> {
        if !self.phonetic.any() {
            return Err(PhonexError::Configuration(
                "no phonetic algorithm selected".to_string(),
            ));
        }
        if self.filepath.as_os_str().is_empty() {
            return Err(PhonexError::Configuration("filepath is missing".to_string()));
        }
        if self.column.trim().is_empty() {
            return Err(PhonexError::Configuration("column is missing".to_string()));
        }
        if let Some(filename) = &self.filename {
            let plain = Path::new(filename)
                .file_name()
                .map_or(false, |name| name == filename.as_str());
            if !plain {
                return Err(PhonexError::Configuration(format!(
                    "filename {:?} must be a plain file name",
                    filename
                )));
            }
        }
        self.resolved_encoding()?;
        Ok(())
    }

    pub fn separator(&self) -> Option<u8> {
        normalize_separator(self.sep.as_deref())
    }

    pub fn resolved_encoding(&self) -> Result<Option<&'static Encoding>, PhonexError> {
        self.encoding.as_deref().map(resolve_encoding).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_separator_normalisation() {
        assert_eq!(normalize_separator(Some("; ")), Some(b';'));
        assert_eq!(normalize_separator(Some("\t")), Some(b'\t'));
        assert_eq!(normalize_separator(Some("|")), Some(b'|'));
        assert_eq!(normalize_separator(Some("::")), None);
        assert_eq!(normalize_separator(None), None);
    }

    #[test]
    fn test_request_from_json_ignores_unknown_algorithms() {
        let request = PhoneticRequest::from_json_str(
            r#"{"filepath": "data/people.csv", "column": "name",
                "phonetic": {"metaphone3": true, "caverphone": true}, "sep": ", "}"#,
        )
        .unwrap();
        assert!(request.phonetic.metaphone3);
        assert!(!request.phonetic.soundex);
        assert_eq!(request.separator(), Some(b','));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_validation_failures() {
        let valid = PhoneticRequest {
            filepath: PathBuf::from("people.csv"),
            column: "name".to_string(),
            phonetic: AlgorithmSelection::all(),
            ..PhoneticRequest::default()
        };
        assert!(valid.validate().is_ok());

        let cases = [
            PhoneticRequest { phonetic: AlgorithmSelection::default(), ..valid.clone() },
            PhoneticRequest { column: "  ".to_string(), ..valid.clone() },
            PhoneticRequest { filepath: PathBuf::new(), ..valid.clone() },
            PhoneticRequest { filename: Some("../escape.csv".to_string()), ..valid.clone() },
            PhoneticRequest { encoding: Some("klingon".to_string()), ..valid.clone() },
        ];
        for request in cases {
            assert!(
                matches!(request.validate(), Err(PhonexError::Configuration(_))),
                "{:?} should be rejected",
                request
            );
        }
    }
}
