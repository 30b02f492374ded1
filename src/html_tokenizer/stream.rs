//! Read-only navigation helpers over a token sequence.

use super::attributes::attribute_value;
use super::types::{TagOpen, Token};

/// Borrowed view over tokens with lookup helpers.
#[derive(Debug, Clone, Copy)]
pub struct TokenStream<'a> {
    tokens: &'a [Token],
}

impl<'a> TokenStream<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens }
    }

    /// First opening tag whose `id` attribute equals `id` exactly.
    pub fn find_by_id(&self, id: &str) -> Option<&'a TagOpen> {
        self.tokens
            .iter()
            .filter_map(Token::as_tag_open)
            .find(|tag| attribute_value(tag, "id") == Some(id))
    }

    /// Opening tags with the given name, compared case-insensitively.
    pub fn filter_by_tag(&self, name: &'a str) -> impl Iterator<Item = &'a TagOpen> + 'a {
        self.tokens
            .iter()
            .filter_map(Token::as_tag_open)
            .filter(move |tag| tag.name.eq_ignore_ascii_case(name))
    }

    pub fn next(&self, index: usize) -> Option<&'a Token> {
        self.tokens.get(index + 1)
    }

    pub fn prev(&self, index: usize) -> Option<&'a Token> {
        index.checked_sub(1).and_then(|i| self.tokens.get(i))
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html_tokenizer::tokenize;

    #[test]
    fn finds_tags_by_id_and_name() {
        let tokens = tokenize(r#"<div id=main><IMG src=a.gif><img src=b.gif></div>"#);
        let stream = TokenStream::new(&tokens);
        assert_eq!(stream.find_by_id("main").map(|t| t.name.as_str()), Some("div"));
        assert_eq!(stream.filter_by_tag("img").count(), 2);
        assert!(stream.prev(0).is_none());
        assert_eq!(stream.next(0).and_then(Token::name), Some("img"));
    }
}
