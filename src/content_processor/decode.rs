//! Byte-to-text decoding for archived documents.
//!
//! The first bytes of a page are read as windows-1252 and searched for a
//! charset declaration, which takes precedence over the version's configured
//! encoding.

use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::utils::{CHARSET_SNIFF_BYTES, DEFAULT_ENCODING};

static META_CHARSET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta\s+charset=["']?([^"'>\s]+)"#)
        .expect("META_CHARSET_RE: hardcoded regex is valid")
});

static META_HTTP_EQUIV_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)<meta\s+http-equiv=["']?Content-Type["']?\s+content=["'][^"']*charset=([^"'>\s]+)"#,
    )
    .expect("META_HTTP_EQUIV_RE: hardcoded regex is valid")
});

static META_NAME_CHARSET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta\s+name=["']?charset["']?\s+content=["']?([^"'>\s]+)"#)
        .expect("META_NAME_CHARSET_RE: hardcoded regex is valid")
});

/// How document bytes are turned into text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Encoding label used when the version configures none.
    pub fallback_encoding: String,
    /// Leading bytes searched for a charset declaration.
    pub sniff_bytes: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            fallback_encoding: DEFAULT_ENCODING.to_string(),
            sniff_bytes: CHARSET_SNIFF_BYTES,
        }
    }
}

/// Charset label declared by a `<meta>` tag within the first `limit` bytes.
pub fn sniff_charset(bytes: &[u8], limit: usize) -> Option<String> {
    let head = &bytes[..bytes.len().min(limit)];
    let (preview, _) = WINDOWS_1252.decode_without_bom_handling(head);
    [&*META_CHARSET_RE, &*META_HTTP_EQUIV_RE, &*META_NAME_CHARSET_RE]
        .iter()
        .find_map(|re| re.captures(&preview))
        .map(|caps| caps[1].to_string())
}

/// Look up an encoding by WHATWG label.
pub fn encoding_for_label(label: &str) -> Option<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
}

/// Decode `bytes` with the encoding named by `label`.
///
/// Unknown labels fall back to UTF-8 with a warning.
pub fn decode_with_label(bytes: &[u8], label: &str) -> String {
    let encoding = encoding_for_label(label).unwrap_or_else(|| {
        warn!("Unknown encoding '{label}', decoding as UTF-8");
        UTF_8
    });
    decode_with(bytes, encoding)
}

fn decode_with(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        debug!("Malformed {} input replaced during decoding", used.name());
    }
    text.into_owned()
}

/// Decode an archived HTML document.
///
/// A sniffed declaration wins over `configured`; a sniffed label that names
/// no known encoding is ignored with a warning.
pub fn decode_document(bytes: &[u8], configured: Option<&str>, options: &DecodeOptions) -> String {
    let configured = configured.unwrap_or(&options.fallback_encoding);
    let encoding = match sniff_charset(bytes, options.sniff_bytes) {
        Some(declared) => encoding_for_label(&declared).or_else(|| {
            warn!("Document declares unknown charset '{declared}', using '{configured}'");
            None
        }),
        None => None,
    };
    match encoding {
        Some(encoding) => decode_with(bytes, encoding),
        None => decode_with_label(bytes, configured),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_all_declaration_shapes() {
        assert_eq!(
            sniff_charset(br#"<html><META CHARSET="Shift_JIS">"#, 1024).as_deref(),
            Some("Shift_JIS")
        );
        assert_eq!(
            sniff_charset(
                br#"<meta http-equiv="Content-Type" content="text/html; charset=iso-8859-1">"#,
                1024
            )
            .as_deref(),
            Some("iso-8859-1")
        );
        assert_eq!(
            sniff_charset(br#"<meta name=charset content=euc-kr>"#, 1024).as_deref(),
            Some("euc-kr")
        );
        assert_eq!(sniff_charset(b"<p>no declaration</p>", 1024), None);
    }

    #[test]
    fn declaration_past_limit_is_ignored() {
        let mut doc = vec![b' '; 2000];
        doc.extend_from_slice(br#"<meta charset="windows-1252">"#);
        assert_eq!(sniff_charset(&doc, 1024), None);
    }

    #[test]
    fn declared_charset_overrides_configured() {
        let mut doc = br#"<meta charset="windows-1252"><p>"#.to_vec();
        doc.push(0xE9);
        let text = decode_document(&doc, Some("utf-8"), &DecodeOptions::default());
        assert!(text.ends_with("<p>é"));
    }

    #[test]
    fn configured_encoding_used_without_declaration() {
        let text = decode_document(&[b'a', 0xE9], Some("windows-1252"), &DecodeOptions::default());
        assert_eq!(text, "aé");
        let text = decode_document("aé".as_bytes(), None, &DecodeOptions::default());
        assert_eq!(text, "aé");
    }

    #[test]
    fn unknown_labels_fall_back() {
        let doc = br#"<meta charset="x-no-such-charset">ok"#;
        let text = decode_document(doc, Some("utf-8"), &DecodeOptions::default());
        assert!(text.ends_with("ok"));
        assert_eq!(decode_with_label(b"abc", "bogus"), "abc");
    }
}
