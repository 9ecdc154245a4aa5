// In: src/native/binding.rs

//! One loaded, bound and ready native encoder library.
//!
//! The typed `call_*` methods perform exactly one native call and hand back the
//! output as an owned `NativeBuffer`. Input joining and output parsing belong
//! to the strategies in `crate::phonetic`.

use std::ffi::CStr;
use std::fmt;
use std::os::raw::{c_char, c_int};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::Library;

use crate::error::PhonexError;
use crate::native::buffer::{NativeBuffer, Release};
use crate::native::registry;
use crate::native::symbols::{Metaphone3Symbols, MetaphoneSymbols, PhonexSymbols, SymbolTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    Unloaded,
    Loaded,
    Bound,
    Ready,
    Errored,
}

impl fmt::Display for BindingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BindingState::Unloaded => "unloaded",
            BindingState::Loaded => "loaded",
            BindingState::Bound => "bound",
            BindingState::Ready => "ready",
            BindingState::Errored => "errored",
        };
        f.write_str(name)
    }
}

pub struct NativeEncoderBinding<S: SymbolTable> {
    library_path: PathBuf,
    state: BindingState,
    symbols: S,
    // Keeps the function pointers in `symbols` valid.
    _library: Option<Arc<Library>>,
}

impl<S: SymbolTable> fmt::Debug for NativeEncoderBinding<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeEncoderBinding")
            .field("library", &S::LIBRARY)
            .field("library_path", &self.library_path)
            .field("state", &self.state)
            .finish()
    }
}

fn transition(library: &str, path: &Path, state: &mut BindingState, next: BindingState) {
    log::debug!(
        "Native binding {} ('{}'): {} -> {}",
        library,
        path.display(),
        state,
        next
    );
    *state = next;
}

impl<S: SymbolTable> NativeEncoderBinding<S> {
    /// Opens (or reuses) the library at `path` and binds every declared function.
    pub fn load(path: &Path) -> Result<Self, PhonexError> {
        let mut state = BindingState::Unloaded;

        let library = match registry::load_library(path) {
            Ok(library) => library,
            Err(err) => {
                transition(S::LIBRARY, path, &mut state, BindingState::Errored);
                return Err(err);
            }
        };
        transition(S::LIBRARY, path, &mut state, BindingState::Loaded);

        // SAFETY: the table declares the exported C signatures, and `library` is
        // stored next to it for the binding's whole lifetime.
        let symbols = match unsafe { S::bind(&library) } {
            Ok(symbols) => symbols,
            Err(err) => {
                transition(S::LIBRARY, path, &mut state, BindingState::Errored);
                return Err(err);
            }
        };
        for signature in S::SIGNATURES {
            log::debug!(
                "Bound {} {}({}) from {}",
                signature.ret,
                signature.name,
                signature.args.join(", "),
                S::LIBRARY
            );
        }
        transition(S::LIBRARY, path, &mut state, BindingState::Bound);
        transition(S::LIBRARY, path, &mut state, BindingState::Ready);

        Ok(Self {
            library_path: path.to_path_buf(),
            state,
            symbols,
            _library: Some(library),
        })
    }

    /// A binding over functions already linked into the process.
    pub fn from_symbols(symbols: S) -> Self {
        Self {
            library_path: PathBuf::from("<in-process>"),
            state: BindingState::Ready,
            symbols,
            _library: None,
        }
    }

    pub fn state(&self) -> BindingState {
        self.state
    }
}

fn c_length(max_length: usize) -> Result<c_int, PhonexError> {
    c_int::try_from(max_length)
        .map_err(|_| PhonexError::InvalidInput(format!("max length {} is out of range", max_length)))
}

impl NativeEncoderBinding<PhonexSymbols> {
    pub fn call_encode(&self, input: &CStr, separator: &CStr, max_length: usize) -> Result<NativeBuffer, PhonexError> {
        let max_length = c_length(max_length)?;
        // SAFETY: both strings are NUL-terminated and outlive the call.
        unsafe {
            let output = (self.symbols.encode)(input.as_ptr(), separator.as_ptr(), max_length);
            NativeBuffer::from_raw(output, Release::Char(self.symbols.free), "phonex_auto_alloc")
        }
    }
}

impl NativeEncoderBinding<MetaphoneSymbols> {
    pub fn call_encode(&self, input: &CStr, separator: &CStr, max_length: usize) -> Result<NativeBuffer, PhonexError> {
        let max_length = c_length(max_length)?;
        let mut output: *mut c_char = std::ptr::null_mut();
        // SAFETY: `output` is a valid out-parameter; the library stores its
        // allocation there or leaves it null.
        unsafe {
            (self.symbols.encode)(input.as_ptr(), &mut output, separator.as_ptr(), max_length);
            NativeBuffer::from_raw(output, Release::Char(self.symbols.free), "metaphone_api")
        }
    }
}

impl NativeEncoderBinding<Metaphone3Symbols> {
    pub fn call_encode(
        &self,
        input: &CStr,
        separator: u8,
        max_length: usize,
        encode_vowels: bool,
        encode_exact: bool,
    ) -> Result<NativeBuffer, PhonexError> {
        let max_length = c_length(max_length)?;
        // SAFETY: `input` is NUL-terminated; the returned handle is a
        // NUL-terminated text buffer released by `free_result_str`.
        unsafe {
            let output = (self.symbols.encode)(
                input.as_ptr(),
                separator as c_char,
                max_length,
                c_int::from(encode_vowels),
                c_int::from(encode_exact),
            );
            NativeBuffer::from_raw(
                output.cast(),
                Release::Void(self.symbols.free),
                "metaphone3_encode_multi_str",
            )
        }
    }
}
