//! End-to-end jobs: validate a request, then build or patch one output file.
//!
//! Both orchestrators report a definite outcome. Fatal errors are logged and
//! returned as `Err`; per-chunk failures of the modifier are visible in the
//! returned `ChunkReport`.

pub mod csv_modifier;
pub mod file_creator;
pub mod request;

pub use self::csv_modifier::PhonexCsvModifier;
pub use self::file_creator::{generate_filename, CreatedFile, PhoneticFileCreator};
pub use self::request::{normalize_separator, PhoneticRequest, VALID_SEPARATORS};
