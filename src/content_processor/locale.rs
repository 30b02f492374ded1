//! Charset and language normalization of a token sequence.
//!
//! Replayed pages are always served as UTF-8, so every charset declaration
//! is dropped and a single canonical one takes the place of the first.

use crate::archive::VersionSettings;
use crate::html_tokenizer::{
    Attribute, TagOpen, Token, attribute_value, get_attribute_mut, set_attribute_value, tokenize,
};
use crate::utils::CANONICAL_CHARSET_META;

/// True for `<meta>` tags that declare a document charset.
pub fn is_charset_meta(tag: &TagOpen) -> bool {
    if tag.name != "meta" {
        return false;
    }
    let content = attribute_value(tag, "content");
    let http_equiv = attribute_value(tag, "http-equiv")
        .is_some_and(|v| v.eq_ignore_ascii_case("content-type"))
        && content.is_some_and(|c| c.to_ascii_lowercase().contains("charset="));
    let named = attribute_value(tag, "name").is_some_and(|v| v.eq_ignore_ascii_case("charset"))
        && content.is_some_and(|c| !c.is_empty());
    let charset = attribute_value(tag, "charset").is_some_and(|c| !c.is_empty());
    http_equiv || named || charset
}

/// Replace all charset declarations with one canonical UTF-8 declaration.
///
/// The canonical tag goes where the first declaration was; a blank text
/// token right after that first declaration is dropped with it. Documents
/// without a declaration get none.
pub fn normalize_charset(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len() + 2);
    let mut first_removed = None;
    let mut after_first = false;
    for token in tokens {
        let follows_first = std::mem::take(&mut after_first);
        if token.as_tag_open().is_some_and(is_charset_meta) {
            if first_removed.is_none() {
                first_removed = Some(out.len());
                after_first = true;
            }
            continue;
        }
        if follows_first && token.is_blank_text() {
            continue;
        }
        out.push(token);
    }
    if let Some(at) = first_removed {
        out.splice(at..at, tokenize(CANONICAL_CHARSET_META));
    }
    out
}

/// Set `lang` on the first `<html>` tag from the configured language.
pub fn apply_language(tokens: &mut [Token], settings: &VersionSettings) {
    let Some(language) = settings.language.as_deref() else {
        return;
    };
    let Some(html) = tokens
        .iter_mut()
        .filter_map(Token::as_tag_open_mut)
        .find(|tag| tag.name == "html")
    else {
        return;
    };
    match get_attribute_mut(html, "lang") {
        Some(attr) => set_attribute_value(attr, language),
        None => html.attrs.push(Attribute::new("lang", language)),
    }
}

/// Charset then language normalization.
pub fn normalize_locale(tokens: Vec<Token>, settings: &VersionSettings) -> Vec<Token> {
    let mut tokens = normalize_charset(tokens);
    apply_language(&mut tokens, settings);
    tokens
}
