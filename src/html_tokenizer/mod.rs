//! Lossless HTML tokenizer and serializer.
//!
//! The tokenizer favors permissive reconstruction over conformance: any
//! input tokenizes, and serializing the unmodified tokens reproduces it.

pub mod attributes;
pub mod serializer;
pub mod stream;
pub mod tokenizer;
pub mod types;

pub use attributes::{
    ParsedAttributes, attribute_value, get_attribute, get_attribute_mut, parse_attributes,
    set_attribute_value,
};
pub use serializer::serialize;
pub use stream::TokenStream;
pub use tokenizer::tokenize;
pub use types::{Attribute, RawTextElement, TagClose, TagOpen, Token};
