//! Permissive, lossless HTML tokenizer.
//!
//! Scans left to right and never fails: unterminated comments, doctypes,
//! tags and script/style bodies run to end of input. Slices are only cut at
//! ASCII structural bytes, so every cut is a UTF-8 character boundary.

use super::attributes::parse_attributes;
use super::types::{RawTextElement, TagClose, TagOpen, Token};
use crate::utils::{is_html_space, skip_spaces, starts_with_ignore_ascii_case};

const COMMENT_START: &str = "<!--";
const COMMENT_END: &str = "-->";
const DOCTYPE_START: &str = "<!doctype";

/// Tokenize `html` so that `serialize(&tokenize(html)) == html`.
pub fn tokenize(html: &str) -> Vec<Token> {
    let bytes = html.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] != b'<' {
            let start = pos;
            while pos < bytes.len() && bytes[pos] != b'<' {
                pos += 1;
            }
            tokens.push(Token::Text(html[start..pos].to_string()));
            continue;
        }

        let rest = &html[pos..];

        if rest.starts_with(COMMENT_START) {
            // Searched from the `<` itself, so `<!-->` is a complete comment.
            let end = rest
                .find(COMMENT_END)
                .map(|e| e + COMMENT_END.len())
                .unwrap_or(rest.len());
            tokens.push(Token::Comment(rest[..end].to_string()));
            pos += end;
            continue;
        }

        if starts_with_ignore_ascii_case(rest, DOCTYPE_START) {
            let end = tag_end(rest);
            tokens.push(Token::Doctype(rest[..end].to_string()));
            pos += end;
            continue;
        }

        if is_closing_tag(rest) {
            let end = tag_end(rest);
            let raw = &rest[..end];
            let raw_name = closing_tag_name(raw).to_string();
            tokens.push(Token::TagClose(TagClose {
                raw: raw.to_string(),
                name: raw_name.to_ascii_lowercase(),
                raw_name,
            }));
            pos += end;
            continue;
        }

        let end = tag_end(rest);
        let raw = &rest[..end];
        let raw_name = opening_tag_name(raw).to_string();
        let name = raw_name.to_ascii_lowercase();
        let parsed = parse_attributes(raw);
        let open = TagOpen {
            name,
            raw_name,
            attrs: parsed.attrs,
            prefix: Some(parsed.prefix),
            suffix: Some(parsed.suffix),
            self_closing: parsed.self_closing,
        };
        pos += end;

        let is_script = open.name == "script";
        if !(is_script || open.name == "style") {
            tokens.push(Token::TagOpen(open));
            continue;
        }

        // A script with `src` has an external body; keep it an ordinary tag.
        if is_script && open.attrs.iter().any(|a| a.name == "src") {
            tokens.push(Token::TagOpen(open));
            continue;
        }

        let body = &html[pos..];
        let (content_len, close_len) = match find_raw_text_close(body, &open.name) {
            Some((at, len)) => (at, len),
            None => (body.len(), 0),
        };
        let element = RawTextElement {
            open,
            raw_content: body[..content_len].to_string(),
            raw_close: body[content_len..content_len + close_len].to_string(),
        };
        tokens.push(if is_script {
            Token::Script(element)
        } else {
            Token::Style(element)
        });
        pos += content_len + close_len;
    }

    tokens
}

/// Length of a tag-like construct: through the next `>`, or to end of input.
fn tag_end(rest: &str) -> usize {
    rest.find('>').map(|e| e + 1).unwrap_or(rest.len())
}

/// `</` followed by optional whitespace and at least one `[\w:-]` character.
fn is_closing_tag(rest: &str) -> bool {
    if !rest.starts_with("</") {
        return false;
    }
    let i = skip_spaces(rest, 2);
    rest.as_bytes().get(i).is_some_and(|b| is_name_byte(*b))
}

#[inline]
fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b':' | b'-')
}

fn closing_tag_name(raw: &str) -> &str {
    let inner = raw.strip_prefix("</").unwrap_or(raw);
    let inner = inner.strip_suffix('>').unwrap_or(inner);
    first_word(inner)
}

fn opening_tag_name(raw: &str) -> &str {
    let inner = raw.strip_prefix('<').unwrap_or(raw);
    let inner = match inner.strip_suffix('>') {
        Some(s) => s.strip_suffix('/').unwrap_or(s),
        None => inner,
    };
    first_word(inner)
}

fn first_word(s: &str) -> &str {
    s.split(is_html_space)
        .find(|word| !word.is_empty())
        .unwrap_or("")
}

/// Locate `</name\s*>` case-insensitively; returns (offset, length).
fn find_raw_text_close(body: &str, name: &str) -> Option<(usize, usize)> {
    let bytes = body.as_bytes();
    let mut from = 0;
    while let Some(at) = body[from..].find("</").map(|i| i + from) {
        let i = skip_spaces(body, at + 2);
        if starts_with_ignore_ascii_case(&body[i..], name) {
            let j = skip_spaces(body, i + name.len());
            if j < bytes.len() && bytes[j] == b'>' {
                return Some((at, j + 1 - at));
            }
        }
        from = at + 2;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_text_tags_and_comments() {
        let tokens = tokenize("a<!-- c --><B>x</B >");
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[0], Token::Text("a".into()));
        assert_eq!(tokens[1], Token::Comment("<!-- c -->".into()));
        assert_eq!(tokens[2].name(), Some("b"));
        match &tokens[4] {
            Token::TagClose(close) => {
                assert_eq!(close.raw_name, "B");
                assert_eq!(close.raw, "</B >");
            }
            other => panic!("expected close tag, got {other:?}"),
        }
    }

    #[test]
    fn unterminated_comment_consumes_rest() {
        let tokens = tokenize("<!-- never closed <p>");
        assert_eq!(tokens, vec![Token::Comment("<!-- never closed <p>".into())]);
    }

    #[test]
    fn doctype_is_case_insensitive() {
        let tokens = tokenize("<!DocType html><html>");
        assert_eq!(tokens[0], Token::Doctype("<!DocType html>".into()));
        assert_eq!(tokens[1].name(), Some("html"));
    }

    #[test]
    fn inline_script_keeps_body_separate() {
        let tokens = tokenize("<SCRIPT language=javascript>if (a<b) x();</Script >rest");
        match &tokens[0] {
            Token::Script(el) => {
                assert_eq!(el.open.raw_name, "SCRIPT");
                assert_eq!(el.raw_content, "if (a<b) x();");
                assert_eq!(el.raw_close, "</Script >");
            }
            other => panic!("expected script, got {other:?}"),
        }
        assert_eq!(tokens[1], Token::Text("rest".into()));
    }

    #[test]
    fn script_with_src_is_plain_tag() {
        let tokens = tokenize(r#"<script SRC="a.js"></script>"#);
        assert!(matches!(tokens[0], Token::TagOpen(_)));
        assert!(matches!(tokens[1], Token::TagClose(_)));
    }

    #[test]
    fn unterminated_style_runs_to_end() {
        let tokens = tokenize("<style>body{}");
        match &tokens[0] {
            Token::Style(el) => {
                assert_eq!(el.raw_content, "body{}");
                assert!(el.raw_close.is_empty());
            }
            other => panic!("expected style, got {other:?}"),
        }
    }

    #[test]
    fn opening_tag_names() {
        assert_eq!(opening_tag_name("<br/>"), "br");
        assert_eq!(opening_tag_name("< IMG src=x>"), "IMG");
        assert_eq!(opening_tag_name("<"), "");
        assert_eq!(opening_tag_name("<img\u{a0}src=a.gif>"), "img");
    }

    #[test]
    fn unicode_spaces_inside_tags() {
        let html = "<script>x();</script\u{a0}></\u{2028}B>";
        let tokens = tokenize(html);
        match &tokens[0] {
            Token::Script(el) => {
                assert_eq!(el.raw_content, "x();");
                assert_eq!(el.raw_close, "</script\u{a0}>");
            }
            other => panic!("expected script, got {other:?}"),
        }
        match &tokens[1] {
            Token::TagClose(close) => assert_eq!(close.raw_name, "B"),
            other => panic!("expected close tag, got {other:?}"),
        }
    }
}
