//! The set of loaded strategies one job encodes with.

use std::collections::BTreeMap;

use crate::config::PhonexConfig;
use crate::error::PhonexError;
use crate::phonetic::strategies::{EncodeOptions, PhoneticStrategy};
use crate::types::{Algorithm, AlgorithmSelection};

#[derive(Debug)]
pub struct PhoneticEngine {
    strategies: BTreeMap<Algorithm, PhoneticStrategy>,
    options: EncodeOptions,
}

impl PhoneticEngine {
    /// Loads the library of every enabled algorithm. The first load failure
    /// aborts, since a job never continues past a native failure.
    pub fn load(config: &PhonexConfig, selection: &AlgorithmSelection) -> Result<Self, PhonexError> {
        let mut strategies = BTreeMap::new();
        for algorithm in selection.enabled() {
            let path = config.libraries.path_for(algorithm);
            let strategy = PhoneticStrategy::load(algorithm, path)?;
            log::info!("{} encoder ready ('{}')", algorithm, path.display());
            strategies.insert(algorithm, strategy);
        }
        Ok(Self {
            strategies,
            options: EncodeOptions::from(&config.encoder),
        })
    }

    pub fn from_strategies(
        strategies: impl IntoIterator<Item = PhoneticStrategy>,
        options: EncodeOptions,
    ) -> Self {
        Self {
            strategies: strategies
                .into_iter()
                .map(|strategy| (strategy.algorithm(), strategy))
                .collect(),
            options,
        }
    }

    pub fn options(&self) -> &EncodeOptions {
        &self.options
    }

    pub fn strategy(&self, algorithm: Algorithm) -> Option<&PhoneticStrategy> {
        self.strategies.get(&algorithm)
    }

    /// `algorithm.width()` columns, each as long as `values`.
    pub fn encode(&self, algorithm: Algorithm, values: &[String]) -> Result<Vec<Vec<String>>, PhonexError> {
        let strategy = self.strategy(algorithm).ok_or_else(|| {
            PhonexError::Configuration(format!("{} encoder is not loaded", algorithm))
        })?;
        strategy.encode_values(values, &self.options)
    }
}
