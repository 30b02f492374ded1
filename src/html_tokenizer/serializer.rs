//! Inverse of the tokenizer.

use super::types::{TagOpen, Token};

/// Reassemble markup from tokens.
///
/// A freshly tokenized, unmodified sequence serializes to its exact input.
pub fn serialize(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        write_token(&mut out, token);
    }
    out
}

fn write_token(out: &mut String, token: &Token) {
    match token {
        Token::TagOpen(tag) => write_open_tag(out, tag),
        Token::Script(el) | Token::Style(el) => {
            write_open_tag(out, &el.open);
            out.push_str(&el.raw_content);
            out.push_str(&el.raw_close);
        }
        Token::TagClose(close) => out.push_str(&close.raw),
        Token::Text(raw) | Token::Comment(raw) | Token::Doctype(raw) => out.push_str(raw),
    }
}

fn write_open_tag(out: &mut String, tag: &TagOpen) {
    match (&tag.prefix, &tag.suffix) {
        (Some(prefix), Some(suffix)) => {
            out.push_str(prefix);
            for attr in &tag.attrs {
                out.push_str(&attr.raw);
            }
            out.push_str(suffix);
        }
        _ => {
            // Synthesized tag without captured source text.
            out.push('<');
            out.push_str(&tag.raw_name);
            for attr in &tag.attrs {
                out.push_str(&attr.raw);
            }
            if tag.self_closing {
                out.push_str(" /");
            }
            out.push('>');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html_tokenizer::{Attribute, tokenize};

    #[test]
    fn round_trips_messy_markup() {
        let html = "<!DOCTYPE html>\n<HTML><body BGCOLOR=#fff>\n<a href=\"x\"class=y>t</a>\
                    <script>document.write('<b>')</script><!-- open";
        assert_eq!(serialize(&tokenize(html)), html);
    }

    #[test]
    fn synthesized_tag_uses_fallback() {
        let tag = TagOpen::new("meta", vec![Attribute::new("charset", "utf-8")]);
        assert_eq!(serialize(&[Token::TagOpen(tag)]), "<meta charset=\"utf-8\">");
    }
}
