// In: src/phonetic/strategies.rs

//! One strategy per native library behind the shared `PhoneticEncode` trait.
//!
//! Every `encode` call follows the same protocol: validate and join the input,
//! make one native call, decode the owned output buffer and parse it. The
//! buffer is released when it goes out of scope, on success and on every error.

use std::ffi::CString;
use std::path::Path;

use crate::config::{separator_byte, EncoderSettings};
use crate::error::PhonexError;
use crate::native::{
    Metaphone3Symbols, MetaphoneSymbols, NativeEncoderBinding, PhonexSymbols,
};
use crate::types::Algorithm;

/// Column separator inside metaphone3 result lines.
const METAPHONE3_FIELD_SEPARATOR: char = '|';

//==================================================================================
// 1. Inputs, Outputs & Options
//==================================================================================

#[derive(Debug, Clone, Copy)]
pub enum EncodeInput<'a> {
    Single(&'a str),
    Batch(&'a [String]),
}

impl<'a> EncodeInput<'a> {
    pub fn len(&self) -> usize {
        match self {
            EncodeInput::Single(_) => 1,
            EncodeInput::Batch(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The NUL-terminated string handed to the native call.
    fn to_native(self, separator: char) -> Result<CString, PhonexError> {
        let joined = match self {
            EncodeInput::Single(value) if value.is_empty() => {
                return Err(PhonexError::InvalidInput("input string is empty".to_string()))
            }
            EncodeInput::Single(value) => value.to_string(),
            EncodeInput::Batch([]) => {
                return Err(PhonexError::InvalidInput("input batch is empty".to_string()))
            }
            EncodeInput::Batch(values) => values.join(&separator.to_string()),
        };
        CString::new(joined)
            .map_err(|_| PhonexError::InvalidInput("input contains a NUL byte".to_string()))
    }
}

/// Output of the single-code strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoded {
    Scalar(String),
    List(Vec<String>),
}

impl Encoded {
    /// Splits on `separator` when present, else keeps the scalar.
    fn parse(text: String, separator: char) -> Self {
        if text.contains(separator) {
            Encoded::List(text.split(separator).map(str::to_string).collect())
        } else {
            Encoded::Scalar(text)
        }
    }

    pub fn into_vec(self) -> Vec<String> {
        match self {
            Encoded::Scalar(code) => vec![code],
            Encoded::List(codes) => codes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    pub separator: char,
    pub max_length: usize,
    pub encode_vowels: bool,
    pub encode_exact: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self::from(&EncoderSettings::default())
    }
}

impl From<&EncoderSettings> for EncodeOptions {
    fn from(settings: &EncoderSettings) -> Self {
        Self {
            separator: settings.separator,
            max_length: settings.max_length,
            encode_vowels: settings.metaphone3_encode_vowels,
            encode_exact: settings.metaphone3_encode_exact,
        }
    }
}

impl EncodeOptions {
    fn separator_cstring(&self) -> Result<CString, PhonexError> {
        CString::new(vec![separator_byte(self.separator)?])
            .map_err(|_| PhonexError::Configuration("separator is a NUL byte".to_string()))
    }
}

//==================================================================================
// 2. The Strategy Contract
//==================================================================================

pub trait PhoneticEncode {
    type Output;

    fn algorithm(&self) -> Algorithm;

    fn encode(&self, input: EncodeInput<'_>, options: &EncodeOptions) -> Result<Self::Output, PhonexError>;
}

#[derive(Debug)]
pub struct PhonexStrategy {
    binding: NativeEncoderBinding<PhonexSymbols>,
}

impl PhonexStrategy {
    pub fn new(binding: NativeEncoderBinding<PhonexSymbols>) -> Self {
        Self { binding }
    }
}

impl PhoneticEncode for PhonexStrategy {
    type Output = Encoded;

    fn algorithm(&self) -> Algorithm {
        Algorithm::Soundex
    }

    fn encode(&self, input: EncodeInput<'_>, options: &EncodeOptions) -> Result<Encoded, PhonexError> {
        let native_input = input.to_native(options.separator)?;
        let separator = options.separator_cstring()?;
        let buffer = self
            .binding
            .call_encode(&native_input, &separator, options.max_length)?;
        Ok(Encoded::parse(buffer.to_text()?, options.separator))
    }
}

#[derive(Debug)]
pub struct MetaphoneStrategy {
    binding: NativeEncoderBinding<MetaphoneSymbols>,
}

impl MetaphoneStrategy {
    pub fn new(binding: NativeEncoderBinding<MetaphoneSymbols>) -> Self {
        Self { binding }
    }
}

impl PhoneticEncode for MetaphoneStrategy {
    type Output = Encoded;

    fn algorithm(&self) -> Algorithm {
        Algorithm::Metaphone
    }

    fn encode(&self, input: EncodeInput<'_>, options: &EncodeOptions) -> Result<Encoded, PhonexError> {
        let native_input = input.to_native(options.separator)?;
        let separator = options.separator_cstring()?;
        let buffer = self
            .binding
            .call_encode(&native_input, &separator, options.max_length)?;
        Ok(Encoded::parse(buffer.to_text()?, options.separator))
    }
}

#[derive(Debug)]
pub struct Metaphone3Strategy {
    binding: NativeEncoderBinding<Metaphone3Symbols>,
}

impl Metaphone3Strategy {
    pub fn new(binding: NativeEncoderBinding<Metaphone3Symbols>) -> Self {
        Self { binding }
    }

    /// Each line is `input|primary|secondary`; missing codes become empty strings.
    pub(crate) fn parse(text: &str) -> Vec<(String, String)> {
        text.lines()
            .filter(|line| !line.is_empty())
            .map(|line| {
                let mut fields = line.split(METAPHONE3_FIELD_SEPARATOR).skip(1);
                let primary = fields.next().unwrap_or_default().to_string();
                let secondary = fields.next().unwrap_or_default().to_string();
                (primary, secondary)
            })
            .collect()
    }
}

impl PhoneticEncode for Metaphone3Strategy {
    type Output = Vec<(String, String)>;

    fn algorithm(&self) -> Algorithm {
        Algorithm::Metaphone3
    }

    fn encode(&self, input: EncodeInput<'_>, options: &EncodeOptions) -> Result<Self::Output, PhonexError> {
        let native_input = input.to_native(options.separator)?;
        let buffer = self.binding.call_encode(
            &native_input,
            separator_byte(options.separator)?,
            options.max_length,
            options.encode_vowels,
            options.encode_exact,
        )?;
        Ok(Self::parse(&buffer.to_text()?))
    }
}

//==================================================================================
// 3. The Closed Strategy Set
//==================================================================================

#[derive(Debug)]
pub enum PhoneticStrategy {
    Soundex(PhonexStrategy),
    Metaphone(MetaphoneStrategy),
    Metaphone3(Metaphone3Strategy),
}

impl PhoneticStrategy {
    /// Loads and binds the library for `algorithm`.
    pub fn load(algorithm: Algorithm, library_path: &Path) -> Result<Self, PhonexError> {
        Ok(match algorithm {
            Algorithm::Soundex => {
                PhoneticStrategy::Soundex(PhonexStrategy::new(NativeEncoderBinding::load(library_path)?))
            }
            Algorithm::Metaphone => PhoneticStrategy::Metaphone(MetaphoneStrategy::new(
                NativeEncoderBinding::load(library_path)?,
            )),
            Algorithm::Metaphone3 => PhoneticStrategy::Metaphone3(Metaphone3Strategy::new(
                NativeEncoderBinding::load(library_path)?,
            )),
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            PhoneticStrategy::Soundex(strategy) => strategy.algorithm(),
            PhoneticStrategy::Metaphone(strategy) => strategy.algorithm(),
            PhoneticStrategy::Metaphone3(strategy) => strategy.algorithm(),
        }
    }

    /// Encodes one column of values into `algorithm().width()` columns of the
    /// same length.
    ///
    /// Blank values are not sent to the library and yield blank codes. Values
    /// are sanitised so they cannot split into extra tokens on the native side.
    pub fn encode_values(&self, values: &[String], options: &EncodeOptions) -> Result<Vec<Vec<String>>, PhonexError> {
        let width = self.algorithm().width();
        let mut columns = vec![vec![String::new(); values.len()]; width];

        let positions: Vec<usize> = values
            .iter()
            .enumerate()
            .filter(|(_, value)| !value.trim().is_empty())
            .map(|(position, _)| position)
            .collect();
        if positions.is_empty() {
            return Ok(columns);
        }
        let batch: Vec<String> = positions
            .iter()
            .map(|&position| sanitize(&values[position], options.separator))
            .collect();
        let input = EncodeInput::Batch(&batch);

        let rows: Vec<Vec<String>> = match self {
            PhoneticStrategy::Soundex(strategy) => single_codes(strategy.encode(input, options)?),
            PhoneticStrategy::Metaphone(strategy) => single_codes(strategy.encode(input, options)?),
            PhoneticStrategy::Metaphone3(strategy) => strategy
                .encode(input, options)?
                .into_iter()
                .map(|(primary, secondary)| vec![primary, secondary])
                .collect(),
        };
        if rows.len() != batch.len() {
            return Err(PhonexError::NativeOutputMismatch {
                expected: batch.len(),
                actual: rows.len(),
            });
        }

        for (position, row) in positions.into_iter().zip(rows) {
            for (column, code) in columns.iter_mut().zip(row) {
                column[position] = code;
            }
        }
        Ok(columns)
    }
}

fn single_codes(encoded: Encoded) -> Vec<Vec<String>> {
    encoded.into_vec().into_iter().map(|code| vec![code]).collect()
}

fn sanitize(value: &str, separator: char) -> String {
    value
        .trim()
        .chars()
        .map(|c| match c {
            '\n' | '\r' | '\0' | METAPHONE3_FIELD_SEPARATOR => ' ',
            c if c == separator => ' ',
            c => c,
        })
        .collect()
}
