//! Phonetic encoding over the native libraries.
//!
//! `strategies` adapts each library's call shape to one `encode` contract,
//! `engine` holds the loaded strategies for a job, and `chunk_encoder` turns
//! one column window into the derived column set.

pub mod chunk_encoder;
pub mod engine;
pub mod strategies;

pub use self::chunk_encoder::PhoneticChunkEncoder;
pub use self::engine::PhoneticEngine;
pub use self::strategies::{
    EncodeInput, EncodeOptions, Encoded, Metaphone3Strategy, MetaphoneStrategy, PhonexStrategy,
    PhoneticEncode, PhoneticStrategy,
};

#[cfg(test)]
mod tests;
