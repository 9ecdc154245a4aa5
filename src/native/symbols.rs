// In: src/native/symbols.rs

//! Declared signatures of every native function and their typed lookup.
//!
//! The table types hold plain function pointers. They are only sound to call
//! while the `Library` they were resolved from is alive, which
//! `NativeEncoderBinding` guarantees by holding the library next to them.

use std::os::raw::{c_char, c_int, c_void};

use libloading::Library;

use crate::error::PhonexError;

//==================================================================================
// 1. Function Pointer Types
//==================================================================================

/// `char* phonex_auto_alloc(const char* in, const char* sep, int len)`
pub type PhonexEncodeFn =
    unsafe extern "C" fn(input: *const c_char, separator: *const c_char, max_length: c_int) -> *mut c_char;

/// `void metaphone_api(const char* in, char** out, const char* sep, int len)`
pub type MetaphoneEncodeFn = unsafe extern "C" fn(
    input: *const c_char,
    output: *mut *mut c_char,
    separator: *const c_char,
    max_length: c_int,
);

/// `void* metaphone3_encode_multi_str(const char* in, char sep, int len, int vowels, int exact)`
pub type Metaphone3EncodeFn = unsafe extern "C" fn(
    input: *const c_char,
    separator: c_char,
    max_length: c_int,
    encode_vowels: c_int,
    encode_exact: c_int,
) -> *mut c_void;

pub type CharFreeFn = unsafe extern "C" fn(*mut c_char);
pub type VoidFreeFn = unsafe extern "C" fn(*mut c_void);

extern "C" {
    #[link_name = "free"]
    fn libc_free(ptr: *mut c_void);
}

/// Used when a library does not export its own release function.
pub unsafe extern "C" fn fallback_free_char(ptr: *mut c_char) {
    libc_free(ptr.cast());
}

pub unsafe extern "C" fn fallback_free_void(ptr: *mut c_void) {
    libc_free(ptr);
}

//==================================================================================
// 2. Signature Declarations
//==================================================================================

/// One native function as declared to the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionSignature {
    pub name: &'static str,
    pub args: &'static [&'static str],
    pub ret: &'static str,
    /// A missing optional symbol falls back to a default instead of failing the bind.
    pub required: bool,
}

/// The set of functions one native library must export.
pub trait SymbolTable: Copy + Send + Sync + 'static {
    /// Short library name used in logs.
    const LIBRARY: &'static str;
    const SIGNATURES: &'static [FunctionSignature];

    /// Resolves every declared function from `library`.
    ///
    /// # Safety
    /// The declared signatures must match what the library actually exports, and
    /// the returned table must not be used after `library` is dropped.
    unsafe fn bind(library: &Library) -> Result<Self, PhonexError>;
}

/// Looks up one declared function. A missing optional one yields `None`.
unsafe fn resolve<T: Copy>(library: &Library, signature: &FunctionSignature) -> Result<Option<T>, PhonexError> {
    match library.get::<T>(signature.name.as_bytes()) {
        Ok(symbol) => Ok(Some(*symbol)),
        Err(err) if signature.required => Err(PhonexError::MissingSymbol {
            name: signature.name.to_string(),
            reason: err.to_string(),
        }),
        Err(_) => {
            log::debug!(
                "Optional native function '{}' not exported, using libc free",
                signature.name
            );
            Ok(None)
        }
    }
}

unsafe fn required<T: Copy>(library: &Library, signature: &FunctionSignature) -> Result<T, PhonexError> {
    resolve(library, signature)?.ok_or_else(|| {
        PhonexError::InternalError(format!("'{}' is declared optional", signature.name))
    })
}

//==================================================================================
// 3. Concrete Tables
//==================================================================================

#[derive(Debug, Clone, Copy)]
pub struct PhonexSymbols {
    pub encode: PhonexEncodeFn,
    pub free: CharFreeFn,
}

const PHONEX_ENCODE: FunctionSignature = FunctionSignature {
    name: "phonex_auto_alloc",
    args: &["const char*", "const char*", "int"],
    ret: "char*",
    required: true,
};

const PHONEX_FREE: FunctionSignature = FunctionSignature {
    name: "phonex_free",
    args: &["char*"],
    ret: "void",
    required: false,
};

impl SymbolTable for PhonexSymbols {
    const LIBRARY: &'static str = "soundex";
    const SIGNATURES: &'static [FunctionSignature] = &[PHONEX_ENCODE, PHONEX_FREE];

    unsafe fn bind(library: &Library) -> Result<Self, PhonexError> {
        Ok(Self {
            encode: required(library, &PHONEX_ENCODE)?,
            free: resolve(library, &PHONEX_FREE)?.unwrap_or(fallback_free_char as CharFreeFn),
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MetaphoneSymbols {
    pub encode: MetaphoneEncodeFn,
    pub free: CharFreeFn,
}

const METAPHONE_ENCODE: FunctionSignature = FunctionSignature {
    name: "metaphone_api",
    args: &["const char*", "char**", "const char*", "int"],
    ret: "void",
    required: true,
};

const METAPHONE_FREE: FunctionSignature = FunctionSignature {
    name: "free_output",
    args: &["char*"],
    ret: "void",
    required: false,
};

impl SymbolTable for MetaphoneSymbols {
    const LIBRARY: &'static str = "metaphone";
    const SIGNATURES: &'static [FunctionSignature] = &[METAPHONE_ENCODE, METAPHONE_FREE];

    unsafe fn bind(library: &Library) -> Result<Self, PhonexError> {
        Ok(Self {
            encode: required(library, &METAPHONE_ENCODE)?,
            free: resolve(library, &METAPHONE_FREE)?.unwrap_or(fallback_free_char as CharFreeFn),
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Metaphone3Symbols {
    pub encode: Metaphone3EncodeFn,
    pub free: VoidFreeFn,
}

const METAPHONE3_ENCODE: FunctionSignature = FunctionSignature {
    name: "metaphone3_encode_multi_str",
    args: &["const char*", "char", "int", "int", "int"],
    ret: "void*",
    required: true,
};

const METAPHONE3_FREE: FunctionSignature = FunctionSignature {
    name: "free_result_str",
    args: &["void*"],
    ret: "void",
    required: false,
};

impl SymbolTable for Metaphone3Symbols {
    const LIBRARY: &'static str = "metaphone3";
    const SIGNATURES: &'static [FunctionSignature] = &[METAPHONE3_ENCODE, METAPHONE3_FREE];

    unsafe fn bind(library: &Library) -> Result<Self, PhonexError> {
        Ok(Self {
            encode: required(library, &METAPHONE3_ENCODE)?,
            free: resolve(library, &METAPHONE3_FREE)?.unwrap_or(fallback_free_void as VoidFreeFn),
        })
    }
}
