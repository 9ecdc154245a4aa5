//! Algorithm ids, the user's selection of them, and the derived column names.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The closed set of phonetic algorithms backed by a native library.
///
/// The declaration order is the emission order: derived columns always appear
/// as soundex, metaphone, metaphone3.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    Soundex,
    Metaphone,
    Metaphone3,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::Soundex, Algorithm::Metaphone, Algorithm::Metaphone3];

    /// The id used in requests and in derived column names.
    pub fn id(&self) -> &'static str {
        match self {
            Algorithm::Soundex => "soundex",
            Algorithm::Metaphone => "metaphone",
            Algorithm::Metaphone3 => "metaphone3",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|algorithm| algorithm.id() == id)
    }

    /// Suffixes appended to the source column name, one per emitted column.
    pub fn column_suffixes(&self) -> &'static [&'static str] {
        match self {
            Algorithm::Soundex => &["soundex"],
            Algorithm::Metaphone => &["metaphone"],
            Algorithm::Metaphone3 => &["metaphone3_primary", "metaphone3_secondary"],
        }
    }

    /// Number of derived columns this algorithm emits.
    pub fn width(&self) -> usize {
        self.column_suffixes().len()
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Which algorithms a job runs. Every key not given defaults to `false`, and
/// unknown keys are ignored.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AlgorithmSelection {
    pub soundex: bool,
    pub metaphone: bool,
    pub metaphone3: bool,
}

impl AlgorithmSelection {
    /// Builds a selection from a loosely-typed map such as a request payload.
    pub fn from_map(map: &HashMap<String, bool>) -> Self {
        let flag = |algorithm: Algorithm| map.get(algorithm.id()).copied().unwrap_or(false);
        Self {
            soundex: flag(Algorithm::Soundex),
            metaphone: flag(Algorithm::Metaphone),
            metaphone3: flag(Algorithm::Metaphone3),
        }
    }

    pub fn only(algorithm: Algorithm) -> Self {
        Self::default().with(algorithm)
    }

    pub fn all() -> Self {
        Self {
            soundex: true,
            metaphone: true,
            metaphone3: true,
        }
    }

    pub fn with(mut self, algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Soundex => self.soundex = true,
            Algorithm::Metaphone => self.metaphone = true,
            Algorithm::Metaphone3 => self.metaphone3 = true,
        }
        self
    }

    pub fn is_enabled(&self, algorithm: Algorithm) -> bool {
        match algorithm {
            Algorithm::Soundex => self.soundex,
            Algorithm::Metaphone => self.metaphone,
            Algorithm::Metaphone3 => self.metaphone3,
        }
    }

    /// Enabled algorithms in emission order.
    pub fn enabled(&self) -> impl Iterator<Item = Algorithm> + '_ {
        Algorithm::ALL
            .into_iter()
            .filter(move |algorithm| self.is_enabled(*algorithm))
    }

    pub fn any(&self) -> bool {
        self.enabled().next().is_some()
    }
}

/// The ordered names of the columns derived from `source` for a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedColumnSet {
    source: String,
    names: Vec<String>,
}

impl DerivedColumnSet {
    pub fn new(source: &str, selection: &AlgorithmSelection) -> Self {
        let names = selection
            .enabled()
            .flat_map(|algorithm| Self::names_for(source, algorithm))
            .collect();
        Self {
            source: source.to_string(),
            names,
        }
    }

    /// Names emitted by a single algorithm, e.g. `city_metaphone3_primary`.
    pub fn names_for(source: &str, algorithm: Algorithm) -> Vec<String> {
        algorithm
            .column_suffixes()
            .iter()
            .map(|suffix| format!("{source}_{suffix}"))
            .collect()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn into_names(self) -> Vec<String> {
        self.names
    }
}
