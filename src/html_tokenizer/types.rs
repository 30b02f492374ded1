//! Token model shared by the tokenizer, serializer and rewriters.
//!
//! Every token keeps the exact source text it was cut from, so an unmodified
//! sequence serializes back to the original input byte for byte.

use std::ops::Range;

/// One lexical unit of an HTML document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A run of characters not starting with `<`.
    Text(String),
    TagOpen(TagOpen),
    TagClose(TagClose),
    /// `<!-- ... -->`, possibly unterminated.
    Comment(String),
    /// `<!doctype ...>`
    Doctype(String),
    /// Inline `<script>` block; scripts with `src` are plain [`Token::TagOpen`].
    Script(RawTextElement),
    Style(RawTextElement),
}

impl Token {
    /// Lowercased element name for tag-like tokens.
    pub fn name(&self) -> Option<&str> {
        match self {
            Token::TagOpen(tag) => Some(&tag.name),
            Token::TagClose(tag) => Some(&tag.name),
            Token::Script(el) | Token::Style(el) => Some(&el.open.name),
            _ => None,
        }
    }

    pub fn as_tag_open(&self) -> Option<&TagOpen> {
        match self {
            Token::TagOpen(tag) => Some(tag),
            _ => None,
        }
    }

    pub fn as_tag_open_mut(&mut self) -> Option<&mut TagOpen> {
        match self {
            Token::TagOpen(tag) => Some(tag),
            _ => None,
        }
    }

    /// True for a text token made only of whitespace (including the empty string).
    pub fn is_blank_text(&self) -> bool {
        matches!(self, Token::Text(raw) if raw.trim().is_empty())
    }
}

/// An opening tag, reconstructed as `prefix + attrs + suffix`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagOpen {
    /// Lowercased tag name.
    pub name: String,
    /// Tag name as written in the source.
    pub raw_name: String,
    pub attrs: Vec<Attribute>,
    /// Source text from `<` up to the first attribute (everything but the
    /// closing `>`/`/>` when there are no attributes).
    pub prefix: Option<String>,
    /// Source text after the last attribute, including `>` or `/>`.
    pub suffix: Option<String>,
    pub self_closing: bool,
}

impl TagOpen {
    /// Synthesize a tag with no captured source text.
    ///
    /// Serialization falls back to `<raw_name attrs>`.
    pub fn new(raw_name: impl Into<String>, attrs: Vec<Attribute>) -> Self {
        let raw_name = raw_name.into();
        Self {
            name: raw_name.to_ascii_lowercase(),
            raw_name,
            attrs,
            prefix: None,
            suffix: None,
            self_closing: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagClose {
    pub raw: String,
    pub name: String,
    pub raw_name: String,
}

/// A `script` or `style` element whose body is raw text.
///
/// The body is kept apart from the attributes so only the payload is subject
/// to script rewriting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTextElement {
    pub open: TagOpen,
    pub raw_content: String,
    /// Closing tag as written; empty when the element runs to end of input.
    pub raw_close: String,
}

/// One attribute of an opening tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Exact source slice, including any leading whitespace.
    pub raw: String,
    pub raw_name: String,
    /// Lowercased name for comparisons.
    pub name: String,
    /// `None` for boolean attributes.
    pub value: Option<String>,
    pub quote: Option<char>,
    /// Byte range of `raw` inside the tag's source text.
    pub span: Range<usize>,
}

impl Attribute {
    /// Build a new double-quoted attribute for insertion into a tag.
    pub fn new(name: &str, value: &str) -> Self {
        let value = value.replace('"', "&quot;");
        let raw = format!(" {name}=\"{value}\"");
        Self {
            span: 0..raw.len(),
            raw,
            raw_name: name.to_string(),
            name: name.to_ascii_lowercase(),
            value: Some(value),
            quote: Some('"'),
        }
    }
}
