//! Lossless JavaScript lexer.
//!
//! Every byte of the input belongs to exactly one token, so spans can be
//! spliced back into the source. Whether `/` starts a regular expression is
//! decided from the previous significant token.

use std::ops::Range;

use super::errors::{ScriptError, ScriptResult};
use crate::utils::is_ascii_ws;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Whitespace,
    /// `//`, `<!--` anywhere, or `-->` at the start of a line.
    LineComment,
    BlockComment,
    /// Identifier or keyword.
    Ident,
    Number,
    Str,
    Template,
    Regex,
    Punct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsToken {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

impl JsToken {
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.span.clone()]
    }

    pub fn is_trivia(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Whitespace | TokenKind::LineComment | TokenKind::BlockComment
        )
    }
}

/// Longest punctuators first.
const PUNCTUATORS: &[&str] = &[
    ">>>=", "...", "===", "!==", "**=", "<<=", ">>=", ">>>", "&&=", "||=", "??=", "=>", "==",
    "!=", "<=", ">=", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=",
    "|=", "^=", "<<", ">>", "**",
];

/// Keywords after which `/` begins a regular expression.
const REGEX_PRECEDING_KEYWORDS: &[&str] = &[
    "return", "typeof", "instanceof", "in", "of", "new", "delete", "void", "throw", "case", "do",
    "else", "yield", "await",
];

#[inline]
fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

struct Lexer<'s> {
    source: &'s str,
    bytes: &'s [u8],
    pos: usize,
    tokens: Vec<JsToken>,
    /// Only whitespace and comments seen since the last line break.
    at_line_start: bool,
}

/// Split `source` into tokens covering it completely.
pub fn lex(source: &str) -> ScriptResult<Vec<JsToken>> {
    let mut lexer = Lexer {
        source,
        bytes: source.as_bytes(),
        pos: 0,
        tokens: Vec::new(),
        at_line_start: true,
    };
    lexer.run()?;
    Ok(lexer.tokens)
}

impl<'s> Lexer<'s> {
    fn run(&mut self) -> ScriptResult<()> {
        while self.pos < self.bytes.len() {
            let start = self.pos;
            let b = self.bytes[start];
            let kind = if is_ascii_ws(b) {
                while self.pos < self.bytes.len() && is_ascii_ws(self.bytes[self.pos]) {
                    if matches!(self.bytes[self.pos], b'\n' | b'\r') {
                        self.at_line_start = true;
                    }
                    self.pos += 1;
                }
                TokenKind::Whitespace
            } else if self.starts_with("//") || self.starts_with("<!--") {
                self.skip_line();
                TokenKind::LineComment
            } else if self.at_line_start && self.starts_with("-->") {
                self.skip_line();
                TokenKind::LineComment
            } else if self.starts_with("/*") {
                let end = self.source[start + 2..]
                    .find("*/")
                    .ok_or(ScriptError::UnterminatedComment(start))?;
                self.pos = start + 2 + end + 2;
                if self.source[start..self.pos].contains(['\n', '\r']) {
                    self.at_line_start = true;
                }
                TokenKind::BlockComment
            } else {
                self.at_line_start = false;
                self.significant(b)?
            };
            self.tokens.push(JsToken {
                kind,
                span: start..self.pos,
            });
        }
        Ok(())
    }

    fn significant(&mut self, b: u8) -> ScriptResult<TokenKind> {
        let start = self.pos;
        match b {
            b'"' | b'\'' => {
                self.skip_string(b)?;
                Ok(TokenKind::Str)
            }
            b'`' => {
                self.pos += 1;
                self.skip_template(start)?;
                Ok(TokenKind::Template)
            }
            b'0'..=b'9' => {
                self.skip_number();
                Ok(TokenKind::Number)
            }
            b'.' if self.bytes.get(start + 1).is_some_and(u8::is_ascii_digit) => {
                self.skip_number();
                Ok(TokenKind::Number)
            }
            b'/' if self.regex_allowed() => {
                self.skip_regex()?;
                Ok(TokenKind::Regex)
            }
            _ if is_ident_byte(b) => {
                while self.pos < self.bytes.len() && is_ident_byte(self.bytes[self.pos]) {
                    self.pos += 1;
                }
                Ok(TokenKind::Ident)
            }
            _ => {
                let len = PUNCTUATORS
                    .iter()
                    .find(|p| self.starts_with(p))
                    .map_or(1, |p| p.len());
                // `\` or a stray non-ASCII start never reaches here, but keep
                // the cut on a char boundary regardless.
                self.pos += len;
                while !self.source.is_char_boundary(self.pos) {
                    self.pos += 1;
                }
                Ok(TokenKind::Punct)
            }
        }
    }

    fn starts_with(&self, pat: &str) -> bool {
        self.bytes[self.pos..].starts_with(pat.as_bytes())
    }

    fn skip_line(&mut self) {
        while self.pos < self.bytes.len() && !matches!(self.bytes[self.pos], b'\n' | b'\r') {
            self.pos += 1;
        }
    }

    fn skip_string(&mut self, quote: u8) -> ScriptResult<()> {
        let start = self.pos;
        self.pos += 1;
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'\\' => {
                    self.pos += 1;
                    // Line continuation may be `\r\n`.
                    if self.bytes.get(self.pos) == Some(&b'\r')
                        && self.bytes.get(self.pos + 1) == Some(&b'\n')
                    {
                        self.pos += 1;
                    }
                    self.pos += 1;
                }
                b'\n' | b'\r' => return Err(ScriptError::UnterminatedString(start)),
                b if b == quote => {
                    self.pos += 1;
                    return Ok(());
                }
                _ => self.pos += 1,
            }
        }
        Err(ScriptError::UnterminatedString(start))
    }

    /// Skip a template body; `pos` is just past the opening backtick.
    fn skip_template(&mut self, start: usize) -> ScriptResult<()> {
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'\\' => self.pos += 2,
                b'`' => {
                    self.pos += 1;
                    return Ok(());
                }
                b'$' if self.bytes.get(self.pos + 1) == Some(&b'{') => {
                    self.pos += 2;
                    self.skip_substitution(start)?;
                }
                _ => self.pos += 1,
            }
        }
        Err(ScriptError::UnterminatedTemplate(start))
    }

    /// Skip a `${ ... }` substitution up to and including its closing brace.
    fn skip_substitution(&mut self, start: usize) -> ScriptResult<()> {
        let mut depth = 1usize;
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'{' => {
                    depth += 1;
                    self.pos += 1;
                }
                b'}' => {
                    depth -= 1;
                    self.pos += 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                q @ (b'"' | b'\'') => self.skip_string(q)?,
                b'`' => {
                    let nested = self.pos;
                    self.pos += 1;
                    self.skip_template(nested)?;
                }
                _ => self.pos += 1,
            }
        }
        Err(ScriptError::UnterminatedTemplate(start))
    }

    fn skip_number(&mut self) {
        let mut prev = 0u8;
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            let exponent_sign = matches!(b, b'+' | b'-') && matches!(prev, b'e' | b'E');
            if b.is_ascii_alphanumeric() || b == b'.' || b == b'_' || exponent_sign {
                prev = b;
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn skip_regex(&mut self) -> ScriptResult<()> {
        let start = self.pos;
        self.pos += 1;
        let mut in_class = false;
        loop {
            match self.bytes.get(self.pos) {
                None | Some(b'\n') | Some(b'\r') => {
                    return Err(ScriptError::UnterminatedRegex(start));
                }
                Some(b'\\') => self.pos += 2,
                Some(b'[') => {
                    in_class = true;
                    self.pos += 1;
                }
                Some(b']') => {
                    in_class = false;
                    self.pos += 1;
                }
                Some(b'/') if !in_class => {
                    self.pos += 1;
                    break;
                }
                Some(_) => self.pos += 1,
            }
        }
        while self.pos < self.bytes.len() && is_ident_byte(self.bytes[self.pos]) {
            self.pos += 1;
        }
        Ok(())
    }

    /// `/` is a regex unless the previous significant token ends an operand.
    fn regex_allowed(&self) -> bool {
        let Some(prev) = self.tokens.iter().rev().find(|t| !t.is_trivia()) else {
            return true;
        };
        let text = prev.text(self.source);
        match prev.kind {
            TokenKind::Ident => REGEX_PRECEDING_KEYWORDS.contains(&text),
            TokenKind::Number | TokenKind::Str | TokenKind::Template | TokenKind::Regex => false,
            TokenKind::Punct => !matches!(text, ")" | "]" | "++" | "--"),
            _ => true,
        }
    }
}

/// Decode the value of a quoted string literal, escapes included.
pub fn decode_string_literal(raw: &str) -> String {
    let inner = raw
        .get(1..raw.len().saturating_sub(1))
        .unwrap_or_default();
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(esc) = chars.next() else {
            break;
        };
        match esc {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' if !chars.peek().is_some_and(char::is_ascii_digit) => out.push('\0'),
            '\n' | '\u{2028}' | '\u{2029}' => {}
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            'x' => push_hex_escape(&mut out, &mut chars, 2, 'x'),
            'u' if chars.peek() == Some(&'{') => {
                chars.next();
                let digits: String = chars.by_ref().take_while(|c| *c != '}').collect();
                match u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32) {
                    Some(ch) => out.push(ch),
                    None => {
                        out.push_str("u{");
                        out.push_str(&digits);
                        out.push('}');
                    }
                }
            }
            'u' => push_hex_escape(&mut out, &mut chars, 4, 'u'),
            other => out.push(other),
        }
    }
    out
}

fn push_hex_escape(
    out: &mut String,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    len: usize,
    marker: char,
) {
    let mut digits = String::with_capacity(len);
    while digits.len() < len {
        match chars.peek() {
            Some(c) if c.is_ascii_hexdigit() => {
                digits.push(*c);
                chars.next();
            }
            _ => break,
        }
    }
    let decoded = (digits.len() == len)
        .then(|| u32::from_str_radix(&digits, 16).ok())
        .flatten()
        .and_then(char::from_u32);
    match decoded {
        Some(ch) => out.push(ch),
        None => {
            out.push(marker);
            out.push_str(&digits);
        }
    }
}
