//! The foreign-function boundary to the three native phonetic libraries.
//!
//! A binding walks `Unloaded -> Loaded -> Bound -> Ready` once; every native
//! output handle is wrapped in a `NativeBuffer` whose destructor calls the
//! library's free function, so no exit path can leak or double-free it.

pub mod binding;
pub mod buffer;
pub mod registry;
pub mod symbols;

#[cfg(test)]
pub(crate) mod mock;

pub use self::binding::{BindingState, NativeEncoderBinding};
pub use self::buffer::{NativeBuffer, Release};
pub use self::symbols::{
    FunctionSignature, Metaphone3Symbols, MetaphoneSymbols, PhonexSymbols, SymbolTable,
};
