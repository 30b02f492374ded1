//! Document rewrite pipeline
//!
//! Turns the bytes of an archived HTML capture into the text served for a
//! version: decode, tokenize, normalize charset and language, relocate tag
//! attributes, rewrite inline scripts, serialize.

pub mod decode;
pub mod locale;
pub mod pipeline;

pub use decode::{
    DecodeOptions, decode_document, decode_with_label, encoding_for_label, sniff_charset,
};
pub use locale::{apply_language, is_charset_meta, normalize_charset, normalize_locale};
pub use pipeline::{
    render_document, render_document_with, rewrite_document, rewrite_inline_scripts,
    tokenize_document,
};
