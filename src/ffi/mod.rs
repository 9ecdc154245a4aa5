pub mod python;

pub use self::python::{
    create_phonetic_file_py, enable_verbose_logging_py, encode_column_py, modify_file_py,
};
