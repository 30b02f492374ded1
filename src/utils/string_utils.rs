//! String helpers: ASCII case-insensitive matching and markup whitespace
//!
//! URL rewriting compares prefixes case-insensitively but slices the original
//! string by the matched length. Folding only ASCII keeps byte lengths stable,
//! so a prefix match on the lowered form is always a valid slice of the source.

/// Returns true when `haystack` starts with `prefix`, ignoring ASCII case.
///
/// # Examples
/// ```
/// # use kodegen_tools_archive_replay::utils::string_utils::starts_with_ignore_ascii_case;
/// assert!(starts_with_ignore_ascii_case("/Archive/Page.html", "/archive/"));
/// assert!(!starts_with_ignore_ascii_case("/arc", "/archive/"));
/// ```
#[inline]
pub fn starts_with_ignore_ascii_case(haystack: &str, prefix: &str) -> bool {
    haystack.len() >= prefix.len()
        && haystack.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Strip `prefix` from `haystack` ignoring ASCII case.
pub fn strip_prefix_ignore_ascii_case<'a>(haystack: &'a str, prefix: &str) -> Option<&'a str> {
    if starts_with_ignore_ascii_case(haystack, prefix) {
        haystack.get(prefix.len()..)
    } else {
        None
    }
}

/// Slice `s` from byte `start`, moving forward to the next char boundary
/// when `start` lands inside a multi-byte character.
///
/// Never panics; an out-of-range start yields an empty slice.
pub fn slice_from(s: &str, start: usize) -> &str {
    let mut idx = start.min(s.len());
    while !s.is_char_boundary(idx) {
        idx += 1;
    }
    &s[idx..]
}

/// ASCII whitespace as the script lexer understands it.
#[inline]
pub fn is_ascii_ws(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0c | 0x0b)
}

/// Whitespace in markup: the JavaScript `\s` class, Unicode spaces such as
/// U+00A0 and U+2028 included.
#[inline]
pub fn is_html_space(c: char) -> bool {
    (c.is_whitespace() && c != '\u{85}') || c == '\u{feff}'
}

/// Byte length of the whitespace character starting at byte `i` of `s`;
/// 0 when there is none, including when `i` is not a char boundary.
pub fn space_len_at(s: &str, i: usize) -> usize {
    match s.as_bytes().get(i) {
        Some(&b) if b.is_ascii() => usize::from(is_ascii_ws(b)),
        Some(_) => s
            .get(i..)
            .and_then(|rest| rest.chars().next())
            .filter(|c| is_html_space(*c))
            .map_or(0, char::len_utf8),
        None => 0,
    }
}

/// First byte at or after `i` that does not start a whitespace character.
pub fn skip_spaces(s: &str, mut i: usize) -> usize {
    loop {
        match space_len_at(s, i) {
            0 => return i,
            n => i += n,
        }
    }
}
