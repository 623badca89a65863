//! # A Rust procedural macro for AIS bit-layout decoding
//!
//! `aivdm-derive` provides the `BitParse` derive attribute used by [`aivdm-parser`] to
//! describe AIS message layouts declaratively: each field names its width in bits and,
//! optionally, how the raw value is converted into the field type.
//!
//! It is not meant to be used on its own, the generated code refers to the
//! `aivdm_parser::BitParse`, `aivdm_parser::FromBits` and `aivdm_parser::BitReader` items.
//!
//! [`aivdm-parser`]: https://crates.io/crates/aivdm-parser

use proc_macro::TokenStream;
use syn::{DeriveInput, Error, parse_macro_input};

mod attr;
mod expand;
mod field;

#[doc = include_str!("../README.md")]
#[proc_macro_derive(BitParse, attributes(ais))]
pub fn derive_bit_parse(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    expand::expand(&input)
        .unwrap_or_else(Error::into_compile_error)
        .into()
}
