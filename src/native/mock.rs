//! In-process stand-ins for the native encoders.
//!
//! Codes are the ASCII letters of a token, upper-cased and truncated to the
//! requested length. Allocation and release calls are counted per thread so a
//! test can check that every buffer was freed exactly once.

use std::cell::Cell;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int, c_void};

use crate::native::symbols::{Metaphone3Symbols, MetaphoneSymbols, PhonexSymbols};

thread_local! {
    static ALLOCATIONS: Cell<usize> = Cell::new(0);
    static FREES: Cell<usize> = Cell::new(0);
    static CALLS: Cell<usize> = Cell::new(0);
    static FAIL_NEXT: Cell<bool> = Cell::new(false);
    static DROP_LAST_NEXT: Cell<bool> = Cell::new(false);
}

pub(crate) fn reset_counters() {
    ALLOCATIONS.with(|c| c.set(0));
    FREES.with(|c| c.set(0));
    CALLS.with(|c| c.set(0));
    FAIL_NEXT.with(|c| c.set(false));
    DROP_LAST_NEXT.with(|c| c.set(false));
}

pub(crate) fn allocations() -> usize {
    ALLOCATIONS.with(Cell::get)
}

pub(crate) fn frees() -> usize {
    FREES.with(Cell::get)
}

pub(crate) fn calls() -> usize {
    CALLS.with(Cell::get)
}

/// The next encode call returns a null handle.
pub(crate) fn fail_next_call() {
    FAIL_NEXT.with(|c| c.set(true));
}

/// The next encode call returns one code fewer than it received.
pub(crate) fn drop_last_code_next_call() {
    DROP_LAST_NEXT.with(|c| c.set(true));
}

pub(crate) fn allocate(bytes: &[u8]) -> *mut c_char {
    ALLOCATIONS.with(|c| c.set(c.get() + 1));
    CString::new(bytes).unwrap().into_raw()
}

pub(crate) unsafe extern "C" fn mock_free_char(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
        FREES.with(|c| c.set(c.get() + 1));
    }
}

pub(crate) unsafe extern "C" fn mock_free_void(ptr: *mut c_void) {
    mock_free_char(ptr.cast());
}

/// The code the mocks produce for one token.
pub(crate) fn code(token: &str, max_length: usize) -> String {
    token
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .take(max_length)
        .collect()
}

/// Mock metaphone3 omits the secondary code for tokens of odd length.
pub(crate) fn metaphone3_codes(token: &str, max_length: usize) -> (String, String) {
    let primary = code(token, max_length);
    let secondary = if token.len() % 2 == 0 {
        primary.chars().rev().collect()
    } else {
        String::new()
    };
    (primary, secondary)
}

fn begin_call() -> bool {
    CALLS.with(|c| c.set(c.get() + 1));
    !FAIL_NEXT.with(|c| c.replace(false))
}

fn tokens(input: &str, separator: &str) -> Vec<String> {
    let mut tokens: Vec<String> = if input.contains(separator) {
        input.split(separator).map(str::to_string).collect()
    } else {
        vec![input.to_string()]
    };
    if DROP_LAST_NEXT.with(|c| c.replace(false)) {
        tokens.pop();
    }
    tokens
}

unsafe extern "C" fn mock_phonex(input: *const c_char, separator: *const c_char, max_length: c_int) -> *mut c_char {
    if !begin_call() {
        return std::ptr::null_mut();
    }
    let input = CStr::from_ptr(input).to_str().unwrap();
    let separator = CStr::from_ptr(separator).to_str().unwrap();
    let codes: Vec<String> = tokens(input, separator)
        .iter()
        .map(|token| code(token, max_length as usize))
        .collect();
    allocate(codes.join(separator).as_bytes())
}

unsafe extern "C" fn mock_metaphone(
    input: *const c_char,
    output: *mut *mut c_char,
    separator: *const c_char,
    max_length: c_int,
) {
    if !begin_call() {
        *output = std::ptr::null_mut();
        return;
    }
    let input = CStr::from_ptr(input).to_str().unwrap();
    let separator = CStr::from_ptr(separator).to_str().unwrap();
    let codes: Vec<String> = tokens(input, separator)
        .iter()
        .map(|token| code(token, max_length as usize))
        .collect();
    *output = allocate(codes.join(separator).as_bytes());
}

unsafe extern "C" fn mock_metaphone3(
    input: *const c_char,
    separator: c_char,
    max_length: c_int,
    _encode_vowels: c_int,
    _encode_exact: c_int,
) -> *mut c_void {
    if !begin_call() {
        return std::ptr::null_mut();
    }
    let input = CStr::from_ptr(input).to_str().unwrap();
    let separator = (separator as u8 as char).to_string();
    let mut lines = String::new();
    for token in tokens(input, &separator) {
        let (primary, secondary) = metaphone3_codes(&token, max_length as usize);
        if secondary.is_empty() {
            lines.push_str(&format!("{token}|{primary}\n"));
        } else {
            lines.push_str(&format!("{token}|{primary}|{secondary}\n"));
        }
    }
    allocate(lines.as_bytes()).cast()
}

pub(crate) fn phonex_symbols() -> PhonexSymbols {
    PhonexSymbols {
        encode: mock_phonex,
        free: mock_free_char,
    }
}

pub(crate) fn metaphone_symbols() -> MetaphoneSymbols {
    MetaphoneSymbols {
        encode: mock_metaphone,
        free: mock_free_char,
    }
}

pub(crate) fn metaphone3_symbols() -> Metaphone3Symbols {
    Metaphone3Symbols {
        encode: mock_metaphone3,
        free: mock_free_void,
    }
}
