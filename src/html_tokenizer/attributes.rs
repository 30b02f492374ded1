//! Attribute parsing and in-place editing.
//!
//! Parsing partitions a tag's source text into `prefix`, one raw slice per
//! attribute, and `suffix`. The partition is contiguous: concatenating the
//! pieces yields the tag text exactly, stray `/` or `=` characters included.

use super::types::{Attribute, TagOpen};
use crate::utils::{is_html_space, skip_spaces, space_len_at};

/// Result of splitting one tag's source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAttributes {
    pub attrs: Vec<Attribute>,
    pub prefix: String,
    pub suffix: String,
    pub self_closing: bool,
}

/// True when the tag text ends in `/` followed by optional whitespace and `>`.
fn is_self_closing(tag_raw: &str) -> bool {
    tag_raw
        .strip_suffix('>')
        .is_some_and(|body| body.trim_end_matches(is_html_space).ends_with('/'))
}

/// Parse the attributes of a raw opening tag such as `<div id="x"class='y'>`.
pub fn parse_attributes(tag_raw: &str) -> ParsedAttributes {
    let self_closing = is_self_closing(tag_raw);
    let inner_end = if self_closing {
        // Drop the last two characters: `/>`, or the space before `>`.
        tag_raw
            .char_indices()
            .nth_back(1)
            .map(|(idx, _)| idx)
            .unwrap_or(0)
    } else {
        // Drop the final character: `>` normally, or whatever ends an
        // unterminated tag at end of input.
        tag_raw
            .char_indices()
            .next_back()
            .map(|(idx, _)| idx)
            .unwrap_or(0)
    };
    let inner_start = 1.min(inner_end);
    let inner = &tag_raw[inner_start..inner_end];
    let bytes = inner.as_bytes();

    // Tag name
    let mut i = skip_spaces(inner, 0);
    while i < bytes.len() && space_len_at(inner, i) == 0 && bytes[i] != b'/' {
        i += 1;
    }

    let mut attrs = Vec::new();
    let mut pos = i;
    // Start of the slice owned by the next attribute. Stray characters that
    // cannot start a name stay attached to the attribute that follows them.
    let mut pending_start = pos;

    while pos < bytes.len() {
        let mut tmp = skip_spaces(inner, pos);
        if tmp >= bytes.len() {
            break;
        }

        let name_start = tmp;
        while tmp < bytes.len()
            && bytes[tmp] != b'='
            && space_len_at(inner, tmp) == 0
            && bytes[tmp] != b'/'
        {
            tmp += 1;
        }
        if tmp == name_start {
            // Stray `=` or `/`: consume it and keep scanning.
            pos = tmp + 1;
            continue;
        }
        let raw_name = &inner[name_start..tmp];

        let mut value = None;
        let mut quote = None;
        let mut new_pos = skip_spaces(inner, tmp);

        if new_pos < bytes.len() && bytes[new_pos] == b'=' {
            new_pos = skip_spaces(inner, new_pos + 1);
            if new_pos < bytes.len() && (bytes[new_pos] == b'"' || bytes[new_pos] == b'\'') {
                let q = bytes[new_pos];
                let v_start = new_pos + 1;
                match bytes[v_start..].iter().position(|&b| b == q) {
                    Some(rel) => {
                        value = Some(inner[v_start..v_start + rel].to_string());
                        new_pos = v_start + rel + 1;
                    }
                    None => {
                        // Unterminated quote runs to the end of the tag.
                        value = Some(inner[v_start..].to_string());
                        new_pos = bytes.len();
                    }
                }
                quote = Some(q as char);
            } else {
                let v_start = new_pos;
                while new_pos < bytes.len()
                    && space_len_at(inner, new_pos) == 0
                    && bytes[new_pos] != b'>'
                {
                    new_pos += 1;
                }
                value = Some(inner[v_start..new_pos].to_string());
            }
        } else {
            new_pos = tmp;
        }

        let start = inner_start + pending_start;
        let end = inner_start + new_pos;
        attrs.push(Attribute {
            raw: tag_raw[start..end].to_string(),
            raw_name: raw_name.to_string(),
            name: raw_name.to_ascii_lowercase(),
            value,
            quote,
            span: start..end,
        });

        pos = new_pos;
        pending_start = new_pos;
    }

    let (prefix, suffix) = match (attrs.first(), attrs.last()) {
        (Some(first), Some(last)) => (
            tag_raw[..first.span.start].to_string(),
            tag_raw[last.span.end..].to_string(),
        ),
        _ => (
            tag_raw[..inner_end].to_string(),
            tag_raw[inner_end..].to_string(),
        ),
    };

    ParsedAttributes {
        attrs,
        prefix,
        suffix,
        self_closing,
    }
}

/// First attribute with the given name, compared case-insensitively.
pub fn get_attribute<'a>(tag: &'a TagOpen, name: &str) -> Option<&'a Attribute> {
    tag.attrs.iter().find(|a| a.name.eq_ignore_ascii_case(name))
}

pub fn get_attribute_mut<'a>(tag: &'a mut TagOpen, name: &str) -> Option<&'a mut Attribute> {
    tag.attrs.iter_mut().find(|a| a.name.eq_ignore_ascii_case(name))
}

/// Value of the first attribute named `name`; `None` when absent or boolean.
pub fn attribute_value<'a>(tag: &'a TagOpen, name: &str) -> Option<&'a str> {
    get_attribute(tag, name).and_then(|a| a.value.as_deref())
}

/// Replace an attribute's value, keeping as much of its source formatting as possible.
///
/// - quoted: the text between the quotes is replaced
/// - unquoted: the bare token after `=` is replaced, whitespace around `=` kept
/// - boolean: becomes `name="value"` with the original leading whitespace
pub fn set_attribute_value(attr: &mut Attribute, new_value: &str) {
    let name_idx = attr.raw.find(attr.raw_name.as_str());

    if attr.value.is_some() {
        if let Some(q) = attr.quote {
            let after_name = name_idx.map(|n| n + attr.raw_name.len()).unwrap_or(0);
            if let Some(qi) = attr.raw[after_name..].find(q).map(|i| i + after_name) {
                let close = attr.raw[qi + 1..].find(q).map(|j| j + qi + 1);
                // An unterminated quote owns the rest of the slice.
                let qj = close.unwrap_or(attr.raw.len());
                attr.raw = format!("{}{}{}", &attr.raw[..=qi], new_value, &attr.raw[qj..]);
                attr.value = Some(new_value.to_string());
                return;
            }
        }

        if let Some(name_idx) = name_idx {
            let search_from = name_idx + attr.raw_name.len();
            if let Some(eq) = attr.raw[search_from..].find('=').map(|i| i + search_from) {
                let v_start = skip_spaces(&attr.raw, eq + 1);
                let mut v_end = v_start;
                while v_end < attr.raw.len() && space_len_at(&attr.raw, v_end) == 0 {
                    v_end += 1;
                }
                attr.raw = format!("{}{}{}", &attr.raw[..v_start], new_value, &attr.raw[v_end..]);
                attr.value = Some(new_value.to_string());
                return;
            }
        }
    }

    let leading = name_idx.map(|n| &attr.raw[..n]).unwrap_or("");
    attr.raw = format!("{leading}{}=\"{new_value}\"", attr.raw_name);
    attr.quote = Some('"');
    attr.value = Some(new_value.to_string());
}
